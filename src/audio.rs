//! Audio backend seam.
//!
//! The playback core only sees the traits in `backend`; `rodio_backend`
//! provides the real output device and decoder, and `fake` (tests only)
//! provides a controllable stand-in.

mod backend;
mod rodio_backend;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{AudioBackend, AudioHandle, OutputChannel};
pub use rodio_backend::{OutputDevice, RodioBackend};
