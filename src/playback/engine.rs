use std::sync::Arc;
use std::time::Instant;

use rosc::OscType;
use tracing::{debug, info, warn};

use crate::audio::AudioHandle;
use crate::error::{AudioError, PlaybackError};

use super::registry::TrackRegistry;
use super::router::TriggerRouter;
use super::session::StartOutcome;
use super::snapshot::{Snapshot, TrackDescriptor};
use super::track::TrackId;

/// Outcome of starting one track matched by a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerResult {
    pub id: TrackId,
    pub outcome: Result<StartOutcome, PlaybackError>,
}

/// Owns the registry and router and keeps them consistent.
///
/// Every mutation that changes what a snapshot would contain sets the dirty
/// flag; the runtime drains it with [`PlaybackEngine::take_dirty`].
pub struct PlaybackEngine {
    registry: TrackRegistry,
    router: TriggerRouter,
    dirty: bool,
}

impl PlaybackEngine {
    pub fn new(master_volume: f32) -> Self {
        Self {
            registry: TrackRegistry::new(master_volume),
            router: TriggerRouter::new(),
            dirty: false,
        }
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn router(&self) -> &TriggerRouter {
        &self.router
    }

    /// Route an inbound trigger and start every bound track. The message
    /// arguments do not take part in routing.
    pub fn on_trigger(&mut self, address: &str, args: &[OscType]) -> Vec<TriggerResult> {
        let matched = self.router.dispatch(address);
        if matched.is_empty() {
            debug!(address, "no track bound to trigger");
            return Vec::new();
        }
        debug!(address, ?args, tracks = matched.len(), "trigger matched");

        let now = Instant::now();
        matched
            .into_iter()
            .map(|id| TriggerResult {
                id,
                outcome: self.start_track(id, now),
            })
            .collect()
    }

    /// Start one track directly, bypassing routing.
    pub fn on_manual_play(&mut self, id: TrackId) -> Result<StartOutcome, PlaybackError> {
        self.start_track(id, Instant::now())
    }

    fn start_track(&mut self, id: TrackId, now: Instant) -> Result<StartOutcome, PlaybackError> {
        let master = self.registry.master_volume();
        let track = self
            .registry
            .get_mut(id)
            .ok_or(PlaybackError::UnknownTrack(id))?;

        let outcome = track.start_at(master, now);
        let file = track.file().unwrap_or("-");
        match &outcome {
            Ok(StartOutcome::Started) => info!(track = %id, file, "playing"),
            Ok(StartOutcome::AlreadyPlaying) => debug!(track = %id, "already playing, trigger ignored"),
            Ok(StartOutcome::Muted) => debug!(track = %id, "muted, trigger ignored"),
            Err(e) => warn!(track = %id, "cannot play: {e}"),
        }
        outcome
    }

    pub fn add_track(&mut self, desc: &TrackDescriptor) -> TrackId {
        let id = self.registry.add(desc);
        self.router.rebuild(&self.registry);
        self.dirty = true;
        debug!(track = %id, address = %desc.osc_message, "track added");
        id
    }

    /// Stop and remove a track; its address stops routing immediately.
    pub fn remove_track(&mut self, id: TrackId) -> bool {
        if !self.registry.remove(id) {
            return false;
        }
        self.router.rebuild(&self.registry);
        self.dirty = true;
        info!(track = %id, "track removed");
        true
    }

    /// Rebind a track. In-flight playback is untouched.
    pub fn commit_address(&mut self, id: TrackId, address: &str) -> bool {
        let Some(track) = self.registry.get_mut(id) else {
            return false;
        };
        track.set_trigger_address(address);
        info!(track = %id, address = %track.trigger_address(), "trigger address set");
        self.router.rebuild(&self.registry);
        self.dirty = true;
        true
    }

    pub fn set_volume(&mut self, id: TrackId, volume: f32) -> bool {
        let master = self.registry.master_volume();
        let Some(track) = self.registry.get_mut(id) else {
            return false;
        };
        track.set_volume(volume, master);
        self.dirty = true;
        true
    }

    pub fn set_muted(&mut self, id: TrackId, muted: bool) -> bool {
        let master = self.registry.master_volume();
        let Some(track) = self.registry.get_mut(id) else {
            return false;
        };
        track.set_muted(muted, master);
        self.dirty = true;
        true
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.registry.set_master_volume(volume);
        self.dirty = true;
    }

    pub fn stop_track(&mut self, id: TrackId) -> bool {
        self.registry.get_mut(id).is_some_and(|t| t.stop())
    }

    pub fn stop_all(&mut self) {
        for track in self.registry.iter_mut() {
            track.stop();
        }
    }

    /// Record a new file for `id` and return the generation the loader must
    /// hand back to [`PlaybackEngine::finish_load`].
    pub fn assign_file(&mut self, id: TrackId, file: impl Into<String>) -> Option<u64> {
        let track = self.registry.get_mut(id)?;
        let generation = track.assign_file(file.into());
        self.dirty = true;
        Some(generation)
    }

    /// Attach the result of an off-thread decode. Results for removed tracks
    /// or superseded files are dropped.
    pub fn finish_load(
        &mut self,
        id: TrackId,
        generation: u64,
        result: Result<Arc<dyn AudioHandle>, AudioError>,
    ) -> bool {
        let Some(track) = self.registry.get_mut(id) else {
            debug!(track = %id, "load finished for removed track");
            return false;
        };
        match result {
            Ok(audio) => {
                let attached = track.attach_audio(generation, audio);
                if attached {
                    info!(track = %id, file = track.file().unwrap_or("-"), "audio loaded");
                } else {
                    debug!(track = %id, generation, "stale load discarded");
                }
                attached
            }
            Err(e) => {
                if generation == track.load_generation() {
                    warn!(track = %id, "couldn't load audio: {e}");
                }
                false
            }
        }
    }

    /// Clear sessions whose output has run dry; returns the finished tracks.
    pub fn poll_completions(&mut self) -> Vec<TrackId> {
        let mut finished = Vec::new();
        for track in self.registry.iter_mut() {
            if track.poll_completion() {
                finished.push(track.id());
            }
        }
        for id in &finished {
            debug!(track = %id, "playback finished");
        }
        finished
    }

    pub fn snapshot(&self, osc_port: u16) -> Snapshot {
        Snapshot::new(
            osc_port,
            self.registry.master_volume(),
            self.registry.descriptors(),
        )
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the snapshot changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
