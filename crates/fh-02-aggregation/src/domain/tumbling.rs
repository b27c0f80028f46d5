//! Tumbling window counts on the epoch grid.

use std::collections::BTreeMap;

use shared_types::{align_down, CountRecord, Ticks};

pub struct TumblingCounter {
    size: Ticks,
    /// Window end -> events seen.
    open: BTreeMap<Ticks, u64>,
}

impl TumblingCounter {
    pub fn new(size: Ticks) -> Self {
        Self {
            size,
            open: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, event_time: Ticks) {
        let end = align_down(event_time, self.size).saturating_add(self.size);
        *self.open.entry(end).or_default() += 1;
    }

    /// Close every window whose end is at or below `watermark`, oldest first.
    pub fn close_until(&mut self, watermark: Ticks) -> Vec<CountRecord> {
        let still_open = match watermark.checked_add(1) {
            Some(bound) => self.open.split_off(&bound),
            None => BTreeMap::new(),
        };
        let closed = std::mem::replace(&mut self.open, still_open);
        closed
            .into_iter()
            .map(|(window_time, count)| CountRecord { window_time, count })
            .collect()
    }

    pub fn flush(&mut self) -> Vec<CountRecord> {
        self.close_until(Ticks::MAX)
    }
}
