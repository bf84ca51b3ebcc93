use super::snapshot::TrackDescriptor;
use super::track::{Track, TrackId};

/// Ordered set of tracks plus the master volume they all play under.
///
/// Insertion order is display order and is what the snapshot preserves.
pub struct TrackRegistry {
    tracks: Vec<Track>,
    next_id: u64,
    master_volume: f32,
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl TrackRegistry {
    pub fn new(master_volume: f32) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            master_volume: master_volume.clamp(0.0, 1.0),
        }
    }

    /// Append a track built from `desc` and return its fresh id.
    pub fn add(&mut self, desc: &TrackDescriptor) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracks.push(Track::new(id, desc));
        id
    }

    /// Stop any session of `id`, then drop the track. Unknown ids are ignored.
    pub fn remove(&mut self, id: TrackId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let mut track = self.tracks.remove(pos);
        track.stop();
        true
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id() == id)
    }

    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(Track::id).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Store a new master volume and reapply it to every live session.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        for track in self.tracks.iter().filter(|t| t.is_playing()) {
            track.apply_volume(self.master_volume);
        }
    }

    /// Descriptors of every track worth persisting, in display order.
    pub fn descriptors(&self) -> Vec<TrackDescriptor> {
        self.tracks
            .iter()
            .map(Track::descriptor)
            .filter(TrackDescriptor::is_persistable)
            .collect()
    }
}
