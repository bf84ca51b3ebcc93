//! Persisted shape of the track list.
//!
//! The program never writes this to disk itself; the runtime renders it as
//! TOML laid out like `config.toml`, so it can be pasted in as is.

use serde::{Deserialize, Serialize};

/// Address a freshly added track starts with. Tracks still on it are neither
/// routed nor persisted.
pub const PLACEHOLDER_ADDRESS: &str = "/trigger";

/// Whether `address` takes part in routing and persistence.
pub fn is_routable(address: &str) -> bool {
    let address = address.trim();
    !address.is_empty() && address != PLACEHOLDER_ADDRESS
}

/// One track as stored in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDescriptor {
    /// File name inside the audio directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub volume: f32,
    pub mute: bool,
    pub osc_message: String,
}

impl Default for TrackDescriptor {
    fn default() -> Self {
        Self {
            file: None,
            volume: 1.0,
            mute: false,
            osc_message: PLACEHOLDER_ADDRESS.to_string(),
        }
    }
}

impl TrackDescriptor {
    /// Worth persisting: has a file and a real trigger address.
    pub fn is_persistable(&self) -> bool {
        self.file.as_deref().is_some_and(|f| !f.trim().is_empty()) && is_routable(&self.osc_message)
    }
}

/// Everything needed to restore the current setup, in the `[osc]`,
/// `[audio]` and `[[tracks]]` sections the settings loader reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub osc: OscSnapshot,
    pub audio: AudioSnapshot,
    pub tracks: Vec<TrackDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OscSnapshot {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioSnapshot {
    pub master_volume: f32,
}

impl Snapshot {
    pub fn new(osc_port: u16, master_volume: f32, tracks: Vec<TrackDescriptor>) -> Self {
        Self {
            osc: OscSnapshot { port: osc_port },
            audio: AudioSnapshot { master_volume },
            tracks,
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
