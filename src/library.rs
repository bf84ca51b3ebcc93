//! Audio directory listing.
//!
//! Lists files a track can be pointed at, with their durations when the
//! container tells us.

mod scan;

pub use scan::{AudioFile, scan};
