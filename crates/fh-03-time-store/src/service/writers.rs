//! # Store Writers
//!
//! One writer per aggregate stream plus a heartbeat, run as a `TaskGroup`.
//!
//! ```text
//! tumbling_counts ──► counts writer   ──┐
//! mentions        ──► mentions writer ──┤
//! hashtags        ──► hashtags writer ──┼──► TimeIndexedStore
//! retweets        ──► retweets writer ──┘
//! hopping_counts  ──► heartbeat (log only)
//! ```
//!
//! Writers drain their stream to the end. A failed write cancels the whole
//! group and surfaces as the group's error.

use std::future::Future;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fh_02_aggregation::AggregateStreams;
use fh_telemetry::{HistogramTimer, STORE_WRITES, STORE_WRITE_DURATION};
use shared_bus::TaskGroup;
use shared_types::{format_ticks, CountRecord, LeaderboardEntry, LeaderboardKind};

use crate::domain::{Namespace, StoreError};
use crate::service::store::TimeIndexedStore;

pub struct StoreWriters {
    store: TimeIndexedStore,
}

impl StoreWriters {
    pub fn new(store: TimeIndexedStore) -> Self {
        Self { store }
    }

    /// Run until every stream ends, a write fails, or `parent` is cancelled.
    pub async fn run(
        self,
        streams: AggregateStreams,
        parent: &CancellationToken,
    ) -> anyhow::Result<()> {
        let mut group = TaskGroup::new("store-writers", parent);
        let token = group.token();

        let store = self.store.clone();
        group.spawn_feeder(
            "counts",
            drain(streams.tumbling_counts, token.clone(), move |record| {
                let store = store.clone();
                write(Namespace::Counts, move || store.put_count(&record))
            }),
        );

        let boards = [
            (LeaderboardKind::Mentions, streams.mentions),
            (LeaderboardKind::Hashtags, streams.hashtags),
            (LeaderboardKind::Retweets, streams.retweets),
        ];
        for (kind, rx) in boards {
            let store = self.store.clone();
            group.spawn_feeder(
                kind.as_str(),
                drain(rx, token.clone(), move |board: Vec<LeaderboardEntry>| {
                    let store = store.clone();
                    write(Namespace::from(kind), move || {
                        store.put_leaderboard(kind, &board)
                    })
                }),
            );
        }

        group.spawn_feeder("heartbeat", async move {
            heartbeat(streams.hopping_counts, token).await?;
            Ok(())
        });

        group.join().await
    }
}

/// Receive until the stream ends or `token` fires, handing each item to `f`.
async fn drain<T, F, Fut>(
    mut rx: mpsc::Receiver<T>,
    token: CancellationToken,
    mut f: F,
) -> anyhow::Result<()>
where
    T: Send + 'static,
    F: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    loop {
        let item = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            item = rx.recv() => item,
        };
        match item {
            Some(item) => f(item).await?,
            None => return Ok(()),
        }
    }
}

/// Run one store call on the blocking pool.
async fn write<W>(namespace: Namespace, op: W) -> anyhow::Result<()>
where
    W: FnOnce() -> Result<(), StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _timer = HistogramTimer::new(&STORE_WRITE_DURATION);
        op()
    })
    .await
    .with_context(|| format!("{namespace} writer task aborted"))?
    .with_context(|| format!("write to {namespace} failed"))?;

    STORE_WRITES.with_label_values(&[namespace.as_str()]).inc();
    debug!("[fh-03] Wrote to {}", namespace);
    Ok(())
}

/// Log every hopping window and the running event total. Returns the total.
async fn heartbeat(
    mut rx: mpsc::Receiver<CountRecord>,
    token: CancellationToken,
) -> anyhow::Result<u64> {
    let mut windows = 0u64;
    let mut total = 0u64;
    loop {
        let record = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            record = rx.recv() => record,
        };
        let Some(record) = record else {
            break;
        };
        windows += 1;
        total = total.saturating_add(record.count);
        info!(
            "[fh-03] Heartbeat: window ending {} holds {} events ({} events over {} windows)",
            format_ticks(record.window_time),
            record.count,
            total,
            windows
        );
    }
    Ok(total)
}
