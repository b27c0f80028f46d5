//! # Engine Task
//!
//! Async shell around `WindowEngine`: drains framed lines, decodes them, and
//! forwards every closed window to its own bounded output channel.
//!
//! ```text
//! mpsc<String> ──► decode ──► WindowEngine ──┬──► tumbling_counts
//!                                            ├──► hopping_counts
//!                                            ├──► mentions
//!                                            ├──► hashtags
//!                                            └──► retweets
//! ```
//!
//! The task ends when the line channel closes (after flushing every open
//! window), when `cancel` fires, or when any output receiver is dropped.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fh_telemetry::{DECODE_SKIPS, EVENTS_DECODED, LATE_EVENTS_ADJUSTED, WINDOWS_CLOSED};
use shared_types::{format_ticks, CountRecord, LeaderboardEntry};

use crate::adapters::decode;
use crate::domain::{EngineOutput, WindowEngine};

/// Sending halves of the five output streams.
#[derive(Debug, Clone)]
pub struct AggregateSenders {
    pub tumbling_counts: mpsc::Sender<CountRecord>,
    pub hopping_counts: mpsc::Sender<CountRecord>,
    pub mentions: mpsc::Sender<Vec<LeaderboardEntry>>,
    pub hashtags: mpsc::Sender<Vec<LeaderboardEntry>>,
    pub retweets: mpsc::Sender<Vec<LeaderboardEntry>>,
}

/// Receiving halves of the five output streams, each in time order.
#[derive(Debug)]
pub struct AggregateStreams {
    pub tumbling_counts: mpsc::Receiver<CountRecord>,
    pub hopping_counts: mpsc::Receiver<CountRecord>,
    pub mentions: mpsc::Receiver<Vec<LeaderboardEntry>>,
    pub hashtags: mpsc::Receiver<Vec<LeaderboardEntry>>,
    pub retweets: mpsc::Receiver<Vec<LeaderboardEntry>>,
}

pub fn aggregate_channels(capacity: usize) -> (AggregateSenders, AggregateStreams) {
    let (tumbling_tx, tumbling_rx) = mpsc::channel(capacity);
    let (hopping_tx, hopping_rx) = mpsc::channel(capacity);
    let (mentions_tx, mentions_rx) = mpsc::channel(capacity);
    let (hashtags_tx, hashtags_rx) = mpsc::channel(capacity);
    let (retweets_tx, retweets_rx) = mpsc::channel(capacity);

    (
        AggregateSenders {
            tumbling_counts: tumbling_tx,
            hopping_counts: hopping_tx,
            mentions: mentions_tx,
            hashtags: hashtags_tx,
            retweets: retweets_tx,
        },
        AggregateStreams {
            tumbling_counts: tumbling_rx,
            hopping_counts: hopping_rx,
            mentions: mentions_rx,
            hashtags: hashtags_rx,
            retweets: retweets_rx,
        },
    )
}

/// Summary of an engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineReport {
    pub lines: u64,
    pub events: u64,
    pub skipped: u64,
    pub late_adjusted: u64,
    pub windows_closed: u64,
}

enum Delivery {
    Delivered,
    Stopped,
}

async fn deliver<T>(
    tx: &mpsc::Sender<T>,
    item: T,
    cancel: &CancellationToken,
    stream: &str,
) -> Delivery {
    let sent = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Delivery::Stopped,
        sent = tx.send(item) => sent,
    };
    match sent {
        Ok(()) => {
            WINDOWS_CLOSED.with_label_values(&[stream]).inc();
            Delivery::Delivered
        }
        Err(_) => {
            debug!("[fh-02] Receiver for {} gone, stopping engine", stream);
            Delivery::Stopped
        }
    }
}

async fn forward(
    senders: &AggregateSenders,
    output: EngineOutput,
    cancel: &CancellationToken,
    report: &mut EngineReport,
) -> Delivery {
    report.late_adjusted += output.late_adjusted;
    LATE_EVENTS_ADJUSTED.inc_by(output.late_adjusted);

    for record in output.tumbling_counts {
        debug!(
            "[fh-02] Tumbling window {} closed with {} events",
            format_ticks(record.window_time),
            record.count
        );
        if let Delivery::Stopped =
            deliver(&senders.tumbling_counts, record, cancel, "tumbling_counts").await
        {
            return Delivery::Stopped;
        }
        report.windows_closed += 1;
    }
    for record in output.hopping_counts {
        if let Delivery::Stopped =
            deliver(&senders.hopping_counts, record, cancel, "hopping_counts").await
        {
            return Delivery::Stopped;
        }
    }

    let boards = [
        (&senders.mentions, output.mentions, "mentions"),
        (&senders.hashtags, output.hashtags, "hashtags"),
        (&senders.retweets, output.retweets, "retweets"),
    ];
    for (tx, boards, stream) in boards {
        for board in boards {
            if let Delivery::Stopped = deliver(tx, board, cancel, stream).await {
                return Delivery::Stopped;
            }
        }
    }

    Delivery::Delivered
}

/// Drive `engine` from `lines` until input ends, `cancel` fires, or a
/// downstream receiver is dropped. Output senders drop on return.
pub async fn run_engine(
    mut engine: WindowEngine,
    mut lines: mpsc::Receiver<String>,
    senders: AggregateSenders,
    cancel: CancellationToken,
) -> EngineReport {
    let mut report = EngineReport::default();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[fh-02] Engine cancelled after {} lines", report.lines);
                return report;
            }
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            break;
        };
        report.lines += 1;

        let Some(event) = decode(&line).filter(|event| event.event_time > 0) else {
            report.skipped += 1;
            DECODE_SKIPS.inc();
            continue;
        };
        report.events += 1;
        EVENTS_DECODED.inc();

        let output = engine.push(event);
        if output.is_empty() && output.late_adjusted == 0 {
            continue;
        }
        if let Delivery::Stopped = forward(&senders, output, &cancel, &mut report).await {
            return report;
        }
    }

    let output = engine.flush();
    let _ = forward(&senders, output, &cancel, &mut report).await;

    info!(
        "[fh-02] Input ended: {} lines, {} events, {} skipped, {} late-adjusted, {} tumbling windows",
        report.lines, report.events, report.skipped, report.late_adjusted, report.windows_closed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AggregationConfig;
    use shared_types::{ticks_from_unix_millis, UNIX_EPOCH_TICKS};

    /// 2020-09-13T12:30:00Z, aligned to ten minutes.
    const BASE_MILLIS: i64 = 1_600_000_200_000;

    fn line(id: i64, offset_secs: i64, mention: &str, followers: i64) -> String {
        format!(
            r#"{{"id":{id},"text":"t{id}","timestamp_ms":"{}","user":{{"screen_name":"u{id}","followers_count":{followers}}},"entities":{{"hashtags":[],"user_mentions":[{{"screen_name":"{mention}"}}]}}}}"#,
            BASE_MILLIS + offset_secs * 1_000
        )
    }

    fn engine() -> WindowEngine {
        WindowEngine::new(AggregationConfig::default()).unwrap()
    }

    async fn drain<T>(rx: &mut mpsc::Receiver<T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_base_is_window_aligned() {
        let ticks = ticks_from_unix_millis(BASE_MILLIS).unwrap();
        assert_eq!((ticks - UNIX_EPOCH_TICKS) % (10 * 60 * 10_000_000), 0);
    }

    #[tokio::test]
    async fn test_lines_become_windows_and_flush_at_end() {
        let (line_tx, line_rx) = mpsc::channel(16);
        let (senders, mut streams) = aggregate_channels(64);
        let task = tokio::spawn(run_engine(
            engine(),
            line_rx,
            senders,
            CancellationToken::new(),
        ));

        line_tx.send(line(1, 0, "a", 100)).await.unwrap();
        line_tx.send("not json".to_string()).await.unwrap();
        line_tx.send(r#"{"delete":{}}"#.to_string()).await.unwrap();
        line_tx.send(line(2, 30, "a", 50)).await.unwrap();
        drop(line_tx);

        let report = task.await.unwrap();
        assert_eq!(report.lines, 4);
        assert_eq!(report.events, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.windows_closed, 1);

        let counts = drain(&mut streams.tumbling_counts).await;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 2);

        let mentions = drain(&mut streams.mentions).await;
        assert_eq!(mentions.len(), 10);
        assert!(mentions.iter().all(|board| board[0].score == 150));
        assert_eq!(drain(&mut streams.hopping_counts).await.len(), 10);
        assert!(drain(&mut streams.hashtags).await.is_empty());
        assert!(drain(&mut streams.retweets).await.is_empty());
    }

    #[tokio::test]
    async fn test_untimed_records_are_skipped() {
        let (line_tx, line_rx) = mpsc::channel(4);
        let (senders, _streams) = aggregate_channels(4);
        let task = tokio::spawn(run_engine(
            engine(),
            line_rx,
            senders,
            CancellationToken::new(),
        ));

        line_tx
            .send(r#"{"id":1,"user":{"screen_name":"a","followers_count":1}}"#.to_string())
            .await
            .unwrap();
        drop(line_tx);

        let report = task.await.unwrap();
        assert_eq!(report.events, 0);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_timestamp_beyond_calendar_is_skipped() {
        let (line_tx, line_rx) = mpsc::channel(4);
        let (senders, mut streams) = aggregate_channels(64);
        let skips_before = DECODE_SKIPS.get();
        let task = tokio::spawn(run_engine(
            engine(),
            line_rx,
            senders,
            CancellationToken::new(),
        ));

        line_tx
            .send(
                r#"{"id":9,"user":{"screen_name":"x","followers_count":1},"timestamp_ms":"860201606885477"}"#
                    .to_string(),
            )
            .await
            .unwrap();
        line_tx.send(line(1, 0, "a", 10)).await.unwrap();
        drop(line_tx);

        let report = task.await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.events, 1);
        assert!(DECODE_SKIPS.get() > skips_before);

        let counts = drain(&mut streams.tumbling_counts).await;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_engine() {
        let (_line_tx, line_rx) = mpsc::channel::<String>(4);
        let (senders, _streams) = aggregate_channels(4);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_engine(engine(), line_rx, senders, cancel.clone()));

        cancel.cancel();
        let report = task.await.unwrap();
        assert_eq!(report, EngineReport::default());
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_engine() {
        let (line_tx, line_rx) = mpsc::channel(16);
        let (senders, streams) = aggregate_channels(1);
        drop(streams);
        let task = tokio::spawn(run_engine(
            engine(),
            line_rx,
            senders,
            CancellationToken::new(),
        ));

        line_tx.send(line(1, 0, "a", 1)).await.unwrap();
        line_tx.send(line(2, 700, "a", 1)).await.unwrap();

        let report = task.await.unwrap();
        assert_eq!(report.windows_closed, 0);
        assert_eq!(report.events, 2);
    }
}
