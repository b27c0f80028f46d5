//! # Time-Indexed Store
//!
//! Typed writes and queries over an `OrderedKeyValueStore`.
//!
//! | Namespace | Key | Value |
//! |-----------|-----|-------|
//! | counts | `time` | u64 LE |
//! | mentions | `time` + screen name | one JSON entry |
//! | hashtags | `time` + hashtag | one JSON entry |
//! | retweets | `time` | JSON array of entries |
//!
//! `range_scan` takes an optional seek hint that is appended to the start
//! key. The hint only moves the starting position; it does not filter. The
//! typed entity queries do filter.

use std::sync::Arc;

use shared_types::{CountRecord, LeaderboardEntry, LeaderboardKind, Ticks};

use crate::adapters::{open_backend, StoreConfig};
use crate::domain::payload::{decode_board, decode_count, decode_entry, encode_count, encode_json};
use crate::domain::{decode_key, encode_key, encode_time_key, Namespace, StoreError, StoreSummary};
use crate::ports::{BatchOperation, OrderedKeyValueStore, ScanControl};

/// A raw entry read back from a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub time: Ticks,
    pub subkey: Option<String>,
    pub payload: Vec<u8>,
}

/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct TimeIndexedStore {
    kv: Arc<dyn OrderedKeyValueStore>,
}

impl TimeIndexedStore {
    pub fn new(kv: Arc<dyn OrderedKeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(open_backend(config)?))
    }

    pub fn backend(&self) -> &dyn OrderedKeyValueStore {
        self.kv.as_ref()
    }

    pub fn describe(&self) -> String {
        self.kv.describe()
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    pub fn put_count(&self, record: &CountRecord) -> Result<(), StoreError> {
        let key = encode_time_key(record.window_time)?;
        self.kv
            .put(Namespace::Counts, key.as_bytes(), &encode_count(record.count))?;
        Ok(())
    }

    /// Persist the final leaderboard of one boundary as a single atomic batch.
    /// Entries must all share one `window_time`.
    pub fn put_leaderboard(
        &self,
        kind: LeaderboardKind,
        board: &[LeaderboardEntry],
    ) -> Result<(), StoreError> {
        let Some(first) = board.first() else {
            return Ok(());
        };
        let namespace = Namespace::from(kind);

        let operations = if namespace.has_subkey() {
            board
                .iter()
                .map(|entry| {
                    Ok(BatchOperation::put(
                        encode_key(entry.window_time, &entry.key)?,
                        encode_json(namespace, entry)?,
                    ))
                })
                .collect::<Result<Vec<_>, StoreError>>()?
        } else {
            vec![BatchOperation::put(
                encode_time_key(first.window_time)?,
                encode_json(namespace, board)?,
            )]
        };

        self.kv.write_batch(namespace, operations)?;
        Ok(())
    }

    // =========================================================================
    // RAW SCANS
    // =========================================================================

    /// Entries with `start <= time < end`, ascending. `seek_hint` is appended
    /// to the start key before seeking.
    pub fn range_scan(
        &self,
        namespace: Namespace,
        start: Ticks,
        end: Ticks,
        seek_hint: Option<&str>,
    ) -> Result<Vec<StoredEntry>, StoreError> {
        let from = encode_key(start, seek_hint.unwrap_or(""))?;
        let mut entries = Vec::new();
        let mut failure = None;

        self.kv
            .scan_forward(namespace, from.as_bytes(), &mut |key, value| {
                match decode_key(namespace, key) {
                    Ok(decoded) if decoded.time >= end => ScanControl::Stop,
                    Ok(decoded) => {
                        entries.push(StoredEntry {
                            time: decoded.time,
                            subkey: decoded.subkey,
                            payload: value.to_vec(),
                        });
                        ScanControl::Continue
                    }
                    Err(e) => {
                        failure = Some(e);
                        ScanControl::Stop
                    }
                }
            })?;

        match failure {
            Some(e) => Err(e),
            None => Ok(entries),
        }
    }

    /// Up to `count` most recent entries, newest first.
    pub fn recent_scan(
        &self,
        namespace: Namespace,
        count: usize,
    ) -> Result<Vec<StoredEntry>, StoreError> {
        let mut entries = Vec::with_capacity(count.min(1024));
        let mut failure = None;
        if count == 0 {
            return Ok(entries);
        }

        self.kv.scan_reverse(namespace, &mut |key, value| {
            match decode_key(namespace, key) {
                Ok(decoded) => {
                    entries.push(StoredEntry {
                        time: decoded.time,
                        subkey: decoded.subkey,
                        payload: value.to_vec(),
                    });
                    if entries.len() >= count {
                        ScanControl::Stop
                    } else {
                        ScanControl::Continue
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    ScanControl::Stop
                }
            }
        })?;

        match failure {
            Some(e) => Err(e),
            None => Ok(entries),
        }
    }

    /// Fold every tumbling count into a summary.
    pub fn summarize(&self) -> Result<StoreSummary, StoreError> {
        let records = self.counts(0, Ticks::MAX)?;
        Ok(records.iter().collect())
    }

    // =========================================================================
    // TYPED QUERIES
    // =========================================================================

    pub fn counts(&self, start: Ticks, end: Ticks) -> Result<Vec<CountRecord>, StoreError> {
        self.range_scan(Namespace::Counts, start, end, None)?
            .into_iter()
            .map(to_count)
            .collect()
    }

    pub fn recent_counts(&self, count: usize) -> Result<Vec<CountRecord>, StoreError> {
        self.recent_scan(Namespace::Counts, count)?
            .into_iter()
            .map(to_count)
            .collect()
    }

    /// Mention entries in range; with `screen_name`, only that name's entries.
    pub fn top_mentions(
        &self,
        start: Ticks,
        end: Ticks,
        screen_name: Option<&str>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.entity_entries(Namespace::Mentions, start, end, screen_name)
    }

    pub fn top_hashtags(
        &self,
        start: Ticks,
        end: Ticks,
        hashtag: Option<&str>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.entity_entries(Namespace::Hashtags, start, end, hashtag)
    }

    /// One leaderboard per boundary in range.
    pub fn top_retweets(
        &self,
        start: Ticks,
        end: Ticks,
    ) -> Result<Vec<Vec<LeaderboardEntry>>, StoreError> {
        self.range_scan(Namespace::Retweets, start, end, None)?
            .into_iter()
            .map(|stored| decode_board(Namespace::Retweets, &stored.payload))
            .collect()
    }

    pub fn recent_mentions(&self, count: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.recent_entries(Namespace::Mentions, count)
    }

    pub fn recent_hashtags(&self, count: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.recent_entries(Namespace::Hashtags, count)
    }

    pub fn recent_retweets(&self, count: usize) -> Result<Vec<Vec<LeaderboardEntry>>, StoreError> {
        self.recent_scan(Namespace::Retweets, count)?
            .into_iter()
            .map(|stored| decode_board(Namespace::Retweets, &stored.payload))
            .collect()
    }

    fn entity_entries(
        &self,
        namespace: Namespace,
        start: Ticks,
        end: Ticks,
        entity: Option<&str>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.range_scan(namespace, start, end, entity)?
            .into_iter()
            .filter(|stored| match entity {
                Some(entity) => stored.subkey.as_deref() == Some(entity),
                None => true,
            })
            .map(|stored| decode_entry(namespace, &stored.payload))
            .collect()
    }

    fn recent_entries(
        &self,
        namespace: Namespace,
        count: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.recent_scan(namespace, count)?
            .into_iter()
            .map(|stored| decode_entry(namespace, &stored.payload))
            .collect()
    }
}

fn to_count(stored: StoredEntry) -> Result<CountRecord, StoreError> {
    Ok(CountRecord {
        window_time: stored.time,
        count: decode_count(&stored.payload)?,
    })
}
