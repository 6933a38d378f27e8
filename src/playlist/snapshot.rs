use crate::types::TrackRecord;

/// The playlist being annotated during one session, in playlist order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    tracks: Vec<TrackRecord>,
}

impl Snapshot {
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        Self { tracks }
    }

    /// Index of the track with `id`. The last one wins when a playlist holds
    /// the same track twice.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tracks.iter().rposition(|track| track.id == id)
    }

    /// Adds one play to the track at `index` and returns its new count.
    pub fn record_play(&mut self, index: usize) -> Option<u32> {
        let track = self.tracks.get_mut(index)?;
        track.play_count += 1;
        Some(track.play_count)
    }

    pub fn total_plays(&self) -> u32 {
        self.tracks.iter().map(|track| track.play_count).sum()
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&TrackRecord> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
