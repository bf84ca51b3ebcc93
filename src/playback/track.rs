use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::audio::AudioHandle;
use crate::error::PlaybackError;

use super::session::{PlaybackSession, StartOutcome, effective_volume};
use super::snapshot::{TrackDescriptor, is_routable};

/// Stable identity of a track. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub(crate) u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One configured track and, while it sounds, its playback session.
pub struct Track {
    id: TrackId,
    file: Option<String>,
    audio: Option<Arc<dyn AudioHandle>>,
    volume: f32,
    muted: bool,
    trigger_address: String,
    session: Option<PlaybackSession>,
    load_generation: u64,
}

impl Track {
    pub(crate) fn new(id: TrackId, desc: &TrackDescriptor) -> Self {
        Self {
            id,
            file: desc.file.clone().filter(|f| !f.trim().is_empty()),
            audio: None,
            volume: desc.volume.clamp(0.0, 1.0),
            muted: desc.mute,
            trigger_address: desc.osc_message.clone(),
            session: None,
            load_generation: 0,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn trigger_address(&self) -> &str {
        &self.trigger_address
    }

    /// The trimmed address if this track takes part in routing.
    pub fn routable_address(&self) -> Option<&str> {
        let addr = self.trigger_address.trim();
        is_routable(addr).then_some(addr)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// A session exists (it may have run dry since the last completion poll).
    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    /// A session exists and its output still produces sound.
    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(PlaybackSession::is_busy)
    }

    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    pub fn effective_volume(&self, master: f32) -> f32 {
        effective_volume(self.volume, self.muted, master)
    }

    pub fn start(&mut self, master: f32) -> Result<StartOutcome, PlaybackError> {
        self.start_at(master, Instant::now())
    }

    pub(crate) fn start_at(
        &mut self,
        master: f32,
        now: Instant,
    ) -> Result<StartOutcome, PlaybackError> {
        if self.session.is_some() {
            return Ok(StartOutcome::AlreadyPlaying);
        }
        if self.muted {
            return Ok(StartOutcome::Muted);
        }
        let Some(audio) = self.audio.as_ref() else {
            return Err(PlaybackError::NoAudioLoaded(self.id));
        };

        let volume = self.effective_volume(master);
        let session = PlaybackSession::begin(audio.as_ref(), volume, now)
            .ok_or(PlaybackError::NoFreeChannel(self.id))?;
        self.session = Some(session);
        Ok(StartOutcome::Started)
    }

    /// Halt output and drop the session. Returns whether one existed.
    pub fn stop(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.stop();
                true
            }
            None => false,
        }
    }

    /// Push the current effective volume to a live session.
    pub fn apply_volume(&self, master: f32) {
        if let Some(session) = &self.session {
            session.set_volume(self.effective_volume(master));
        }
    }

    /// Clear the session if its output ran dry. Returns whether it did.
    pub fn poll_completion(&mut self) -> bool {
        if self.session.as_ref().is_some_and(|s| !s.is_busy()) {
            self.session = None;
            return true;
        }
        false
    }

    pub(crate) fn set_volume(&mut self, volume: f32, master: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume(master);
    }

    /// Muting silences a running session but keeps it alive.
    pub(crate) fn set_muted(&mut self, muted: bool, master: f32) {
        self.muted = muted;
        self.apply_volume(master);
    }

    pub(crate) fn set_trigger_address(&mut self, address: &str) {
        self.trigger_address = address.trim().to_string();
    }

    /// Point the track at a new file. Previously loaded audio is dropped and
    /// the returned generation identifies the load that may attach next.
    pub(crate) fn assign_file(&mut self, file: String) -> u64 {
        self.file = Some(file);
        self.audio = None;
        self.load_generation += 1;
        self.load_generation
    }

    /// Attach decoded audio if it belongs to the latest assigned file.
    pub(crate) fn attach_audio(&mut self, generation: u64, audio: Arc<dyn AudioHandle>) -> bool {
        if generation != self.load_generation {
            return false;
        }
        self.audio = Some(audio);
        true
    }

    pub(crate) fn descriptor(&self) -> TrackDescriptor {
        TrackDescriptor {
            file: self.file.clone(),
            volume: self.volume,
            mute: self.muted,
            osc_message: self.trigger_address.trim().to_string(),
        }
    }
}
