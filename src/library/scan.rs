use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile as _;
use walkdir::WalkDir;

use crate::config::AudioSettings;

/// A file in the audio directory.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFile {
    pub path: PathBuf,
    /// Path relative to the scanned directory; this is what tracks store.
    pub name: String,
    pub duration: Option<Duration>,
}

pub(super) fn is_audio_file(path: &Path, settings: &AudioSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List audio files under `dir`, sorted case-insensitively by name.
/// A missing directory yields an empty list.
pub fn scan(dir: &Path, settings: &AudioSettings) -> Vec<AudioFile> {
    let mut files: Vec<AudioFile> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(true);
    // Non-recursive = only the root directory.
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let Some(name) = path
            .strip_prefix(dir)
            .ok()
            .and_then(|p| p.to_str())
            .map(|s| s.replace('\\', "/"))
        else {
            continue;
        };

        let duration = lofty::read_from_path(path)
            .ok()
            .map(|tagged| tagged.properties().duration());

        files.push(AudioFile {
            path: path.to_path_buf(),
            name,
            duration,
        });
    }

    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    files
}
