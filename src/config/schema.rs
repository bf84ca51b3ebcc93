use std::path::PathBuf;

use serde::Deserialize;

use crate::playback::TrackDescriptor;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/oscue/config.toml` or `~/.config/oscue/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `OSCUE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub osc: OscSettings,
    pub audio: AudioSettings,
    pub timing: TimingSettings,
    pub log: LogSettings,
    /// Tracks restored at startup, in display order.
    pub tracks: Vec<TrackDescriptor>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            osc: OscSettings::default(),
            audio: AudioSettings::default(),
            timing: TimingSettings::default(),
            log: LogSettings::default(),
            tracks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OscSettings {
    /// Interface to listen on. `0.0.0.0` accepts triggers from any host.
    pub bind_address: String,
    /// UDP port the listener binds.
    pub port: u16,
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Directory track files are resolved against and picked from.
    pub directory: PathBuf,
    /// Master volume applied on top of every track volume (0.0 - 1.0).
    pub master_volume: f32,
    /// File extensions to offer when picking a file (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to look into subdirectories when listing files.
    pub recursive: bool,
    /// Whether to list hidden files (dotfiles).
    pub include_hidden: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Audio"),
            master_volume: 1.0,
            extensions: vec!["wav".into(), "mp3".into(), "flac".into(), "ogg".into()],
            recursive: false,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// How often finished sessions are detected (milliseconds).
    pub completion_poll_ms: u64,
    /// How often playback cursors are sampled for display (milliseconds).
    pub cursor_tick_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            completion_poll_ms: 100,
            cursor_tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `oscue=debug`.
    /// `OSCUE_LOG` takes precedence when set.
    pub level: String,
    /// Lines kept in the on-screen log pane.
    pub max_lines: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            max_lines: 200,
        }
    }
}
