use std::time::Instant;

use super::registry::TrackRegistry;
use super::track::TrackId;

/// Playback position of one sounding track, as a fraction of its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPosition {
    pub id: TrackId,
    pub fraction: f64,
}

/// Samples positions of every active session for the renderer.
#[derive(Debug, Default)]
pub struct CursorReporter;

impl CursorReporter {
    pub fn new() -> Self {
        Self
    }

    /// Positions at `now` for tracks with a sounding session. Tracks whose
    /// content length is unknown are skipped.
    pub fn sample(&self, registry: &TrackRegistry, now: Instant) -> Vec<CursorPosition> {
        registry
            .iter()
            .filter(|t| t.is_active())
            .filter_map(|t| {
                let fraction = t.session()?.fraction(now)?;
                Some(CursorPosition {
                    id: t.id(),
                    fraction,
                })
            })
            .collect()
    }
}
