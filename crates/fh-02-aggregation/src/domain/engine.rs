//! # Window Engine
//!
//! Synchronous core of the aggregation stage. Each pushed event may release
//! buffered events past the watermark and close windows; closed windows come
//! back as an `EngineOutput` in time order.

use shared_types::{CountRecord, LeaderboardEntry, LeaderboardKind, RawEvent};

use super::config::AggregationConfig;
use super::errors::AggregationError;
use super::hopping::{HoppingAggregator, HoppingWindow};
use super::reorder::ReorderBuffer;
use super::topk::select_top;
use super::tumbling::TumblingCounter;

/// Closed-window results of one engine step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub tumbling_counts: Vec<CountRecord>,
    pub hopping_counts: Vec<CountRecord>,
    /// Final leaderboards, one bounded array per hop boundary.
    pub mentions: Vec<Vec<LeaderboardEntry>>,
    pub hashtags: Vec<Vec<LeaderboardEntry>>,
    pub retweets: Vec<Vec<LeaderboardEntry>>,
    /// Events in this step that were moved forward to the watermark.
    pub late_adjusted: u64,
}

impl EngineOutput {
    pub fn is_empty(&self) -> bool {
        self.tumbling_counts.is_empty()
            && self.hopping_counts.is_empty()
            && self.mentions.is_empty()
            && self.hashtags.is_empty()
            && self.retweets.is_empty()
    }

    pub fn leaderboards(&self, kind: LeaderboardKind) -> &[Vec<LeaderboardEntry>] {
        match kind {
            LeaderboardKind::Mentions => &self.mentions,
            LeaderboardKind::Hashtags => &self.hashtags,
            LeaderboardKind::Retweets => &self.retweets,
        }
    }

    /// Append `other`, keeping each stream in time order.
    pub fn extend(&mut self, other: EngineOutput) {
        self.tumbling_counts.extend(other.tumbling_counts);
        self.hopping_counts.extend(other.hopping_counts);
        self.mentions.extend(other.mentions);
        self.hashtags.extend(other.hashtags);
        self.retweets.extend(other.retweets);
        self.late_adjusted += other.late_adjusted;
    }
}

pub struct WindowEngine {
    config: AggregationConfig,
    reorder: ReorderBuffer,
    tumbling: TumblingCounter,
    hopping: HoppingAggregator,
}

impl WindowEngine {
    pub fn new(config: AggregationConfig) -> Result<Self, AggregationError> {
        config.validate()?;
        Ok(Self {
            reorder: ReorderBuffer::new(config.disorder, config.punctuation),
            tumbling: TumblingCounter::new(config.window),
            hopping: HoppingAggregator::new(config.window, config.hop, config.max_samples),
            config,
        })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn push(&mut self, event: RawEvent) -> EngineOutput {
        let adjusted = self.reorder.push(event);
        self.absorb_ready();

        let mut output = match self.reorder.watermark() {
            Some(watermark) => {
                let counts = self.tumbling.close_until(watermark);
                let windows = self.hopping.close_until(watermark);
                self.collect(counts, windows)
            }
            None => EngineOutput::default(),
        };
        output.late_adjusted = u64::from(adjusted);
        output
    }

    /// End of input: release everything and close every open window.
    pub fn flush(&mut self) -> EngineOutput {
        for released in self.reorder.drain_all() {
            self.tumbling.add(released.event.event_time);
            self.hopping.add(&released.event, released.seq);
        }
        let counts = self.tumbling.flush();
        let windows = self.hopping.flush();
        self.collect(counts, windows)
    }

    fn absorb_ready(&mut self) {
        for released in self.reorder.drain_ready() {
            self.tumbling.add(released.event.event_time);
            self.hopping.add(&released.event, released.seq);
        }
    }

    fn collect(
        &self,
        tumbling_counts: Vec<CountRecord>,
        windows: Vec<HoppingWindow>,
    ) -> EngineOutput {
        let mut output = EngineOutput {
            tumbling_counts,
            ..EngineOutput::default()
        };

        for mut window in windows {
            output.hopping_counts.push(CountRecord {
                window_time: window.boundary.end_time,
                count: window.count,
            });
            for kind in LeaderboardKind::ALL {
                let top = select_top(window.take_entries(kind), self.config.max_entries);
                if top.is_empty() {
                    continue;
                }
                match kind {
                    LeaderboardKind::Mentions => output.mentions.push(top),
                    LeaderboardKind::Hashtags => output.hashtags.push(top),
                    LeaderboardKind::Retweets => output.retweets.push(top),
                }
            }
        }

        output
    }
}
