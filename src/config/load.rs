use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `OSCUE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("OSCUE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.master_volume) {
            return Err("audio.master_volume must be between 0.0 and 1.0".to_string());
        }
        if self.timing.completion_poll_ms == 0 {
            return Err("timing.completion_poll_ms must be >= 1".to_string());
        }
        if self.timing.cursor_tick_ms == 0 {
            return Err("timing.cursor_tick_ms must be >= 1".to_string());
        }
        if self.log.max_lines == 0 {
            return Err("log.max_lines must be >= 1".to_string());
        }
        if let Some(t) = self.tracks.iter().find(|t| !(0.0..=1.0).contains(&t.volume)) {
            return Err(format!(
                "track volume for {:?} must be between 0.0 and 1.0",
                t.osc_message
            ));
        }
        Ok(())
    }

    /// Directory tracks are loaded from. Relative paths are taken from the
    /// config file's directory when one exists, else the working directory.
    pub fn audio_dir(&self) -> PathBuf {
        if self.audio.directory.is_absolute() {
            return self.audio.directory.clone();
        }
        resolve_config_path()
            .filter(|p| p.exists())
            .and_then(|p| p.parent().map(|d| d.join(&self.audio.directory)))
            .unwrap_or_else(|| self.audio.directory.clone())
    }
}

/// Resolve the config path from `OSCUE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("OSCUE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/oscue/config.toml`
/// or `~/.config/oscue/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("oscue").join("config.toml"))
}
