use std::time::{Duration, Instant};

use crate::audio::{AudioHandle, OutputChannel};

/// What a start request did when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session began.
    Started,
    /// A session was already running; duplicate triggers are ignored.
    AlreadyPlaying,
    /// The track is muted; nothing was started.
    Muted,
}

/// Volume actually sent to the output: track volume scaled by master, or
/// silence when muted.
pub fn effective_volume(volume: f32, muted: bool, master: f32) -> f32 {
    if muted {
        0.0
    } else {
        (volume * master).clamp(0.0, 1.0)
    }
}

/// Runtime state of one in-progress playback.
pub struct PlaybackSession {
    channel: Box<dyn OutputChannel>,
    started_at: Instant,
    duration: Duration,
}

impl PlaybackSession {
    /// Start `handle` at `volume`. `None` when the backend had no channel.
    pub(crate) fn begin(handle: &dyn AudioHandle, volume: f32, now: Instant) -> Option<Self> {
        let channel = handle.play(volume)?;
        Some(Self {
            channel,
            started_at: now,
            duration: handle.length(),
        })
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the output is still producing sound.
    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    /// Fraction of the content played at `now`, clamped to [0, 1].
    /// `None` when the duration is unknown (zero).
    pub fn fraction(&self, now: Instant) -> Option<f64> {
        let total = self.duration.as_secs_f64();
        if total <= 0.0 {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        Some((elapsed / total).clamp(0.0, 1.0))
    }

    pub(crate) fn set_volume(&self, volume: f32) {
        self.channel.set_volume(volume);
    }

    pub(crate) fn stop(self) {
        self.channel.stop();
    }
}
