//! # Play-Count Monitor
//!
//! The Spotify API has no play event stream, only the single most recently
//! played track. The monitor samples it on every tick and treats a change of
//! id as a new play:
//!
//! ```text
//!            tick()                     sample + observe
//! WAITING ─────────────▶ COUNTING ──────────────────────────▶ WAITING
//!                           │
//!                           └── counted plays == max_plays ──▶ FINISHED
//! ```
//!
//! Accuracy depends on the tick interval: two plays of the same track
//! between two samples look like one.

mod counter;
mod ticker;

pub use counter::{Outcome, PlayCounter, RepeatPolicy};
pub use ticker::{IntervalTicker, Ticker};

use crate::{
    Result,
    playlist::{Snapshot, normalize},
    retry::RetryPolicy,
    spotify::SpotifyApi,
    types::Observation,
    warning,
};

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// The session ends after this many counted plays.
    pub max_plays: u32,
    pub repeat_policy: RepeatPolicy,
    /// Applied to every sample.
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting,
    Counting,
    Finished,
}

/// Result of one [`Monitor::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Observed {
        observation: Option<Observation>,
        outcome: Outcome,
    },
    Finished,
}

pub struct Monitor<'a, T: Ticker> {
    api: &'a dyn SpotifyApi,
    ticker: T,
    counter: PlayCounter,
    config: MonitorConfig,
    phase: Phase,
}

impl<'a, T: Ticker> Monitor<'a, T> {
    pub fn new(api: &'a dyn SpotifyApi, ticker: T, snapshot: Snapshot, config: MonitorConfig) -> Self {
        let phase = if config.max_plays == 0 {
            Phase::Finished
        } else {
            Phase::Waiting
        };

        Self {
            api,
            ticker,
            counter: PlayCounter::new(snapshot, config.repeat_policy),
            config,
            phase,
        }
    }

    /// Waits for the next tick and processes one sample.
    ///
    /// A sample that still fails after the retry policy gave up is returned
    /// as an error; the monitor stays usable and the counts so far are kept.
    pub async fn step(&mut self) -> Result<Step> {
        loop {
            match self.phase {
                Phase::Finished => return Ok(Step::Finished),
                Phase::Waiting => {
                    self.ticker.tick().await;
                    self.phase = Phase::Counting;
                }
                Phase::Counting => {
                    self.phase = Phase::Waiting;
                    let api = self.api;
                    let sample = self.config.retry.run(|| api.recently_played()).await?;

                    let (observation, outcome) = match sample {
                        None => (None, Outcome::NoHistory),
                        Some(history) => match normalize::observation(&history) {
                            Ok(observation) => {
                                let outcome = self.counter.observe(&observation);
                                (Some(observation), outcome)
                            }
                            Err(e) => {
                                warning!("Skipping sample played at {}: {}", history.played_at, e);
                                (None, Outcome::Malformed)
                            }
                        },
                    };

                    if self.counter.transitions() >= self.config.max_plays {
                        self.phase = Phase::Finished;
                    }
                    return Ok(Step::Observed {
                        observation,
                        outcome,
                    });
                }
            }
        }
    }

    /// Steps until `max_plays` plays were counted.
    pub async fn run(&mut self) -> Result<()> {
        while let Step::Observed { .. } = self.step().await? {}
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn transitions(&self) -> u32 {
        self.counter.transitions()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.counter.snapshot()
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.counter.into_snapshot()
    }
}
