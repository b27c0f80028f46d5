//! # Disorder Handling
//!
//! Events may arrive up to `disorder` behind the highest time seen and are
//! reordered. Anything older is moved forward to the watermark rather than
//! dropped.
//!
//! The watermark is `align_down(max_seen - disorder, punctuation)` and never
//! moves backwards. Every event at or below it is released in time order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use shared_types::{align_down, RawEvent, Ticks};

/// An event waiting for the watermark, ordered by (time, arrival).
struct Pending {
    event: RawEvent,
    seq: u64,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.event.event_time, self.seq).cmp(&(other.event.event_time, other.seq))
    }
}

/// An event released past the watermark with its arrival sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    pub event: RawEvent,
    pub seq: u64,
}

pub struct ReorderBuffer {
    disorder: Ticks,
    punctuation: Ticks,
    heap: BinaryHeap<Reverse<Pending>>,
    max_seen: Option<Ticks>,
    watermark: Option<Ticks>,
    next_seq: u64,
}

impl ReorderBuffer {
    pub fn new(disorder: Ticks, punctuation: Ticks) -> Self {
        Self {
            disorder,
            punctuation,
            heap: BinaryHeap::new(),
            max_seen: None,
            watermark: None,
            next_seq: 0,
        }
    }

    pub fn watermark(&self) -> Option<Ticks> {
        self.watermark
    }

    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    /// Buffer an event. Returns `true` when it arrived too late and its time
    /// was moved to the watermark.
    pub fn push(&mut self, mut event: RawEvent) -> bool {
        let mut adjusted = false;
        if let Some(watermark) = self.watermark {
            if event.event_time < watermark {
                event.event_time = watermark;
                adjusted = true;
            }
        }

        let time = event.event_time;
        self.max_seen = Some(self.max_seen.map_or(time, |max| max.max(time)));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Pending { event, seq }));

        if let Some(max_seen) = self.max_seen {
            let candidate = align_down(max_seen.saturating_sub(self.disorder), self.punctuation);
            if self.watermark.map_or(true, |w| candidate > w) {
                self.watermark = Some(candidate);
            }
        }

        adjusted
    }

    /// Release every buffered event at or below the watermark, oldest first.
    pub fn drain_ready(&mut self) -> Vec<Released> {
        let Some(watermark) = self.watermark else {
            return Vec::new();
        };
        let mut ready = Vec::new();
        while let Some(Reverse(next)) = self.heap.peek() {
            if next.event.event_time > watermark {
                break;
            }
            if let Some(Reverse(pending)) = self.heap.pop() {
                ready.push(Released {
                    event: pending.event,
                    seq: pending.seq,
                });
            }
        }
        ready
    }

    /// Release everything, oldest first (end of input).
    pub fn drain_all(&mut self) -> Vec<Released> {
        let mut all = Vec::with_capacity(self.heap.len());
        while let Some(Reverse(pending)) = self.heap.pop() {
            all.push(Released {
                event: pending.event,
                seq: pending.seq,
            });
        }
        all
    }
}
