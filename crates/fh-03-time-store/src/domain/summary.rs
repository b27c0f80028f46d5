//! Fold of the counts namespace into one overview.

use serde::Serialize;

use shared_types::{duration_from_ticks, CountRecord, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreSummary {
    pub min_time: Option<Ticks>,
    pub max_time: Option<Ticks>,
    /// `max_time - min_time`, zero for an empty store.
    pub duration: Ticks,
    pub window_count: u64,
    pub total_event_count: u64,
}

impl StoreSummary {
    /// Add one count record. Records may arrive in any order.
    pub fn add(&mut self, record: &CountRecord) {
        let time = record.window_time;
        self.min_time = Some(self.min_time.map_or(time, |min| min.min(time)));
        self.max_time = Some(self.max_time.map_or(time, |max| max.max(time)));
        self.duration = match (self.min_time, self.max_time) {
            (Some(min), Some(max)) => max - min,
            _ => 0,
        };
        self.window_count += 1;
        self.total_event_count += record.count;
    }

    pub fn span(&self) -> std::time::Duration {
        duration_from_ticks(self.duration)
    }
}

impl<'a> FromIterator<&'a CountRecord> for StoreSummary {
    fn from_iter<I: IntoIterator<Item = &'a CountRecord>>(iter: I) -> Self {
        let mut summary = StoreSummary::default();
        for record in iter {
            summary.add(record);
        }
        summary
    }
}
