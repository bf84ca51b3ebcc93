use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AudioError;

/// Something that can turn a file into playable audio.
///
/// Implementations must be shareable with the loader thread.
pub trait AudioBackend: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn AudioHandle>, AudioError>;
}

/// Decoded, replayable audio content.
pub trait AudioHandle: Send + Sync {
    /// Start a new output of this content at `volume`.
    ///
    /// Returns `None` when the backend has no channel to play it on.
    fn play(&self, volume: f32) -> Option<Box<dyn OutputChannel>>;

    /// Total length of the content.
    fn length(&self) -> Duration;
}

/// A live output of one [`AudioHandle`]. The backend never pushes completion,
/// callers poll [`OutputChannel::is_busy`].
pub trait OutputChannel {
    fn is_busy(&self) -> bool;
    fn set_volume(&self, volume: f32);
    fn stop(&self);
}
