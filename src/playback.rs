//! Trigger routing and playback-session management.
//!
//! `TrackRegistry` owns the tracks (and through them, their sessions),
//! `TriggerRouter` maps OSC addresses onto track ids, and `PlaybackEngine`
//! ties both together for the runtime. Everything here is driven from a
//! single owning thread; nothing in this module locks.

mod cursor;
mod engine;
mod registry;
mod router;
mod session;
mod snapshot;
mod track;

pub use cursor::{CursorPosition, CursorReporter};
pub use engine::{PlaybackEngine, TriggerResult};
pub use registry::TrackRegistry;
pub use router::TriggerRouter;
pub use session::{PlaybackSession, StartOutcome, effective_volume};
pub use snapshot::{PLACEHOLDER_ADDRESS, Snapshot, TrackDescriptor, is_routable};
pub use track::{Track, TrackId};

#[cfg(test)]
mod tests;
