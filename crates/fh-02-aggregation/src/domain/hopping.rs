//! # Hopping Windows
//!
//! A window of width `W` slides by hop `H`. Events land in panes of width `H`
//! keyed by pane end; the window ending at `e` is the merge of the panes with
//! ends in `(e - W, e]`. Panes that no later window covers are evicted as soon
//! as a window closes.
//!
//! Windows that contain no events are skipped entirely.

use std::collections::{BTreeMap, HashMap};

use shared_types::{align_down, LeaderboardEntry, LeaderboardKind, RawEvent, Ticks, WindowBoundary};

use super::kinds::LeaderboardRules;
use super::partial::PartialEntry;

type Board = HashMap<String, PartialEntry>;

#[derive(Default)]
struct Pane {
    count: u64,
    boards: [Board; 3],
}

fn board_index(kind: LeaderboardKind) -> usize {
    match kind {
        LeaderboardKind::Mentions => 0,
        LeaderboardKind::Hashtags => 1,
        LeaderboardKind::Retweets => 2,
    }
}

/// Everything one hopping window produced, before top-K selection.
#[derive(Debug, Clone)]
pub struct HoppingWindow {
    pub boundary: WindowBoundary,
    pub count: u64,
    /// One entry per active key, unordered.
    pub mentions: Vec<LeaderboardEntry>,
    pub hashtags: Vec<LeaderboardEntry>,
    pub retweets: Vec<LeaderboardEntry>,
}

impl HoppingWindow {
    pub fn entries(&self, kind: LeaderboardKind) -> &[LeaderboardEntry] {
        match kind {
            LeaderboardKind::Mentions => &self.mentions,
            LeaderboardKind::Hashtags => &self.hashtags,
            LeaderboardKind::Retweets => &self.retweets,
        }
    }

    pub fn take_entries(&mut self, kind: LeaderboardKind) -> Vec<LeaderboardEntry> {
        match kind {
            LeaderboardKind::Mentions => std::mem::take(&mut self.mentions),
            LeaderboardKind::Hashtags => std::mem::take(&mut self.hashtags),
            LeaderboardKind::Retweets => std::mem::take(&mut self.retweets),
        }
    }
}

pub struct HoppingAggregator {
    window: Ticks,
    hop: Ticks,
    sample_limit: usize,
    panes: BTreeMap<Ticks, Pane>,
    next_end: Option<Ticks>,
}

impl HoppingAggregator {
    pub fn new(window: Ticks, hop: Ticks, sample_limit: usize) -> Self {
        Self {
            window,
            hop,
            sample_limit,
            panes: BTreeMap::new(),
            next_end: None,
        }
    }

    pub fn open_panes(&self) -> usize {
        self.panes.len()
    }

    pub fn add(&mut self, event: &RawEvent, seq: u64) {
        let pane_end = align_down(event.event_time, self.hop).saturating_add(self.hop);
        let pane = self.panes.entry(pane_end).or_default();
        pane.count += 1;

        for kind in LeaderboardKind::ALL {
            let keys = kind.keys(event);
            if keys.is_empty() {
                continue;
            }
            let board = &mut pane.boards[board_index(kind)];
            for key in keys {
                board.entry(key).or_default().add(
                    kind,
                    event.sample(),
                    event.event_time,
                    seq,
                    self.sample_limit,
                );
            }
        }
    }

    /// Close every non-empty window whose end is at or below `watermark`.
    pub fn close_until(&mut self, watermark: Ticks) -> Vec<HoppingWindow> {
        let mut closed = Vec::new();

        loop {
            let Some(&first_pane) = self.panes.keys().next() else {
                self.next_end = None;
                break;
            };
            let end = match self.next_end {
                Some(end) if end >= first_pane => end,
                _ => first_pane,
            };
            if end > watermark {
                self.next_end = Some(end);
                break;
            }

            let start = end.saturating_sub(self.window);
            let covered = self.panes.range(start + 1..=end).next().is_some();
            if covered {
                closed.push(self.merge(WindowBoundary::ending_at(end, self.window)));
            }

            let Some(next_end) = end.checked_add(self.hop) else {
                self.panes.clear();
                self.next_end = None;
                break;
            };
            // Panes ending at or before this cutoff fall outside every later window.
            let cutoff = next_end - self.window;
            self.panes = self.panes.split_off(&(cutoff + 1));
            self.next_end = Some(next_end);
        }

        closed
    }

    pub fn flush(&mut self) -> Vec<HoppingWindow> {
        self.close_until(Ticks::MAX)
    }

    fn merge(&self, boundary: WindowBoundary) -> HoppingWindow {
        let mut count = 0;
        let mut merged: [Board; 3] = Default::default();

        for pane in self
            .panes
            .range(boundary.start_time + 1..=boundary.end_time)
            .map(|(_, pane)| pane)
        {
            count += pane.count;
            for (index, board) in pane.boards.iter().enumerate() {
                for (key, partial) in board {
                    merged[index].entry(key.clone()).or_default().merge(partial);
                }
            }
        }

        let [mentions, hashtags, retweets] = merged;
        let finish = |kind: LeaderboardKind, board: Board| -> Vec<LeaderboardEntry> {
            board
                .into_iter()
                .map(|(key, partial)| {
                    partial.into_entry(boundary.end_time, kind, key, self.sample_limit)
                })
                .collect()
        };

        HoppingWindow {
            boundary,
            count,
            mentions: finish(LeaderboardKind::Mentions, mentions),
            hashtags: finish(LeaderboardKind::Hashtags, hashtags),
            retweets: finish(LeaderboardKind::Retweets, retweets),
        }
    }
}
