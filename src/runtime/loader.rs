use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::audio::{AudioBackend, AudioHandle};
use crate::error::AudioError;
use crate::playback::TrackId;

/// A finished decode, delivered back to the event loop.
pub struct LoadResult {
    pub id: TrackId,
    pub generation: u64,
    pub result: Result<Arc<dyn AudioHandle>, AudioError>,
}

/// Decodes files off the event-loop thread.
pub struct Loader {
    backend: Arc<dyn AudioBackend>,
    tx: Sender<LoadResult>,
}

impl Loader {
    pub fn new(backend: Arc<dyn AudioBackend>, tx: Sender<LoadResult>) -> Self {
        Self { backend, tx }
    }

    pub fn request(&self, id: TrackId, generation: u64, path: PathBuf) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        debug!(track = %id, path = %path.display(), "loading audio");

        let spawned = thread::Builder::new()
            .name("audio-loader".to_string())
            .spawn(move || {
                let result = backend.load(&path);
                let _ = tx.send(LoadResult {
                    id,
                    generation,
                    result,
                });
            });
        if let Err(e) = spawned {
            warn!(track = %id, "couldn't start loader thread: {e}");
        }
    }
}
