//! Error types shared across the playback core and its collaborators.

use std::path::PathBuf;

use crate::playback::TrackId;

/// Failures while preparing audio content for a track.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid audio file {path:?}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("audio device error: {0}")]
    Device(String),
}

/// Failures of a playback request. Duplicate and muted starts are not errors,
/// see [`crate::playback::StartOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("track {0} has no audio loaded")]
    NoAudioLoaded(TrackId),

    #[error("track {0} does not exist")]
    UnknownTrack(TrackId),

    #[error("no output channel available for track {0}")]
    NoFreeChannel(TrackId),
}

/// Failures of the OSC listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind OSC listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OSC socket error: {0}")]
    Socket(#[from] std::io::Error),
}

impl ListenerError {
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
