//! Application model types: `App`, edits and listener status.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PlaybackError;
use crate::library::AudioFile;
use crate::playback::{CursorPosition, StartOutcome, TrackId, TrackRegistry};

/// What the edit line is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Address(TrackId),
    Port,
}

/// A draft that only takes effect on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub target: EditTarget,
    pub draft: String,
}

/// A committed edit, ready to hand to the engine or runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Address(TrackId, String),
    Port(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerStatus {
    Listening(SocketAddr),
    Failed(String),
}

/// The main application model.
pub struct App {
    pub selected: usize,
    pub edit: Option<Edit>,
    pub library: Vec<AudioFile>,
    pub audio_dir: PathBuf,
    pub osc_port: u16,
    pub listener: ListenerStatus,
    /// Feedback for the last manual play that failed, shown on the edit line.
    pub notice: Option<String>,
    cursors: HashMap<TrackId, f64>,
}

impl App {
    pub fn new(osc_port: u16, audio_dir: PathBuf, library: Vec<AudioFile>) -> Self {
        Self {
            selected: 0,
            edit: None,
            library,
            audio_dir,
            osc_port,
            listener: ListenerStatus::Failed("not started".to_string()),
            notice: None,
            cursors: HashMap::new(),
        }
    }

    /// Id of the highlighted track, if any.
    pub fn selected_id(&self, registry: &TrackRegistry) -> Option<TrackId> {
        registry.iter().nth(self.selected).map(|t| t.id())
    }

    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Keep the selection inside a list that may have shrunk.
    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn begin_address_edit(&mut self, id: TrackId, current: &str) {
        self.edit = Some(Edit {
            target: EditTarget::Address(id),
            draft: current.to_string(),
        });
    }

    pub fn begin_port_edit(&mut self) {
        self.edit = Some(Edit {
            target: EditTarget::Port,
            draft: self.osc_port.to_string(),
        });
    }

    pub fn push_char(&mut self, c: char) {
        let Some(edit) = self.edit.as_mut() else {
            return;
        };
        let accept = match edit.target {
            EditTarget::Port => c.is_ascii_digit() && edit.draft.len() < 5,
            EditTarget::Address(_) => !c.is_control() && !c.is_whitespace(),
        };
        if accept {
            edit.draft.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(edit) = self.edit.as_mut() {
            edit.draft.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Finish the current edit. A port draft that is not a valid non-zero
    /// port is rejected and the edit stays open.
    pub fn commit_edit(&mut self) -> Result<Option<Commit>, String> {
        let Some(edit) = self.edit.as_ref() else {
            return Ok(None);
        };
        let commit = match edit.target {
            EditTarget::Address(id) => Commit::Address(id, edit.draft.trim().to_string()),
            EditTarget::Port => match edit.draft.parse::<u16>() {
                Ok(port) if port > 0 => Commit::Port(port),
                _ => return Err(format!("invalid port {:?}", edit.draft)),
            },
        };
        self.edit = None;
        Ok(Some(commit))
    }

    /// The library file after `current` (wrapping), or the first one.
    pub fn next_file(&self, current: Option<&str>) -> Option<&AudioFile> {
        if self.library.is_empty() {
            return None;
        }
        let next = current
            .and_then(|c| self.library.iter().position(|f| f.name == c))
            .map(|i| (i + 1) % self.library.len())
            .unwrap_or(0);
        self.library.get(next)
    }

    /// Record the result of a manual play: failures become the notice,
    /// anything else clears it.
    pub fn note_play_result(&mut self, result: Result<StartOutcome, PlaybackError>) {
        self.notice = result.err().map(|e| e.to_string());
    }

    /// Length of a library file, when its container reports one.
    pub fn file_duration(&self, name: &str) -> Option<Duration> {
        self.library
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.duration)
    }

    pub fn set_cursors(&mut self, positions: &[CursorPosition]) {
        self.cursors.clear();
        self.cursors
            .extend(positions.iter().map(|p| (p.id, p.fraction)));
    }

    pub fn cursor(&self, id: TrackId) -> Option<f64> {
        self.cursors.get(&id).copied()
    }
}
