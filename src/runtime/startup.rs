use std::path::Path;

use tracing::info;

use crate::playback::{PlaybackEngine, TrackDescriptor};

use super::loader::Loader;

/// Recreate the configured tracks in order and queue their audio for decoding.
pub fn restore_tracks(
    engine: &mut PlaybackEngine,
    loader: &Loader,
    tracks: &[TrackDescriptor],
    audio_dir: &Path,
) {
    for desc in tracks {
        let id = engine.add_track(desc);
        let Some(track) = engine.registry().get(id) else {
            continue;
        };
        if let Some(file) = track.file() {
            loader.request(id, track.load_generation(), audio_dir.join(file));
        }
    }

    // Restoring is not a change worth re-emitting.
    engine.take_dirty();
    info!(
        tracks = engine.registry().len(),
        routes = engine.router().addresses().len(),
        "tracks restored"
    );
}
