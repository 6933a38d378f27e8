use crate::{playlist::Snapshot, types::Observation};

/// Which previous id an observation is compared with to detect a new play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// Compare with the last track that was counted. An off-playlist track
    /// does not reset the reference, so replaying the previously counted
    /// track right after it is not counted again.
    #[default]
    LastCounted,
    /// Compare with the last observation of any track. A replay after an
    /// off-playlist track is counted.
    LastObserved,
}

/// What a single observation did to the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new play of the snapshot track at `index`.
    Counted { index: usize, play_count: u32 },
    /// Same id as the reference, the track is still the latest play.
    Repeat,
    /// A new play of a track outside the playlist.
    OffPlaylist,
    /// The listening history was empty.
    NoHistory,
    /// The sample could not be read and was skipped.
    Malformed,
}

/// Edge detector turning consecutive observations into play counts.
#[derive(Debug, Clone)]
pub struct PlayCounter {
    snapshot: Snapshot,
    policy: RepeatPolicy,
    last_counted_id: Option<String>,
    last_observed_id: Option<String>,
    transitions: u32,
}

impl PlayCounter {
    pub fn new(snapshot: Snapshot, policy: RepeatPolicy) -> Self {
        Self {
            snapshot,
            policy,
            last_counted_id: None,
            last_observed_id: None,
            transitions: 0,
        }
    }

    pub fn observe(&mut self, observation: &Observation) -> Outcome {
        let reference = match self.policy {
            RepeatPolicy::LastCounted => &self.last_counted_id,
            RepeatPolicy::LastObserved => &self.last_observed_id,
        };
        let is_repeat = reference.as_deref() == Some(observation.id.as_str());
        self.last_observed_id = Some(observation.id.clone());

        if is_repeat {
            return Outcome::Repeat;
        }

        let Some(index) = self.snapshot.position(&observation.id) else {
            return Outcome::OffPlaylist;
        };

        let play_count = self.snapshot.record_play(index).unwrap_or_default();
        self.last_counted_id = Some(observation.id.clone());
        self.transitions += 1;
        Outcome::Counted { index, play_count }
    }

    /// Number of counted plays so far. Always equals the snapshot's total.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }
}
