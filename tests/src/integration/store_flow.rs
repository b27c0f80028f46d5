//! # Store Flow
//!
//! `run_aggregate` into an on-disk store, then the read-side commands
//! against a read-only reopen.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use fh_03_time_store::{KVStoreError, StoreConfig, StoreError, TimeIndexedStore};
use fh_runtime::commands::{
    parse_time, query, recent_report, run_aggregate, AggregateArgs, QueryTarget, SourceArg,
};
use fh_runtime::FirehoseConfig;
use shared_types::TICKS_PER_MINUTE;

use crate::fixtures::{base_ticks, feed, FeedLine};

fn config(db: &Path) -> FirehoseConfig {
    let mut config = FirehoseConfig::default();
    config.storage.path = db.to_path_buf();
    config
}

fn read_only(db: &Path) -> TimeIndexedStore {
    TimeIndexedStore::open(&StoreConfig {
        path: db.to_path_buf(),
        read_only: true,
        ..StoreConfig::default()
    })
    .unwrap()
}

async fn aggregate(db: &Path, feed_path: &Path) {
    let args = AggregateArgs {
        source: SourceArg::File(feed_path.to_path_buf()),
        capture: None,
    };
    run_aggregate(config(db), args, &CancellationToken::new())
        .await
        .unwrap();
}

fn write_feed(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("feed.jsonl");
    let lines = [
        FeedLine::new(1, 0).author("alice", 10).hashtag("Rust"),
        FeedLine::new(2, 10).author("bob", 30).hashtag("tokio"),
        FeedLine::new(3, 20).author("carol", 20).hashtag("tokio"),
    ];
    std::fs::write(&path, feed(&lines)).unwrap();
    path
}

#[tokio::test]
async fn test_query_command_reads_persisted_windows() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db");
    aggregate(&db, &write_feed(dir.path())).await;

    let store = read_only(&db);
    let from = parse_time("2020-09-13T12:30:00Z").unwrap();
    assert_eq!(from, base_ticks());
    let to = from + 2 * TICKS_PER_MINUTE;

    let tokio = query(&store, QueryTarget::Hashtags, from, to, Some("tokio")).unwrap();
    let entries = tokio.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["key"], "tokio");
    assert_eq!(entries[0]["score"], 50);
    assert_eq!(entries[0]["item_count"], 2);

    // Hashtags are case sensitive.
    let rust = query(&store, QueryTarget::Hashtags, from, to, Some("rust")).unwrap();
    assert!(rust.as_array().unwrap().is_empty());

    let until = from + 10 * TICKS_PER_MINUTE + 1;
    let counts = query(&store, QueryTarget::Counts, from, until, None).unwrap();
    assert_eq!(counts[0]["count"], 3);

    assert!(query(&store, QueryTarget::Retweets, from, to, Some("x")).is_err());
}

#[tokio::test]
async fn test_recent_report_summarizes_store() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db");
    aggregate(&db, &write_feed(dir.path())).await;

    let report = recent_report(&read_only(&db), 3).unwrap();
    assert_eq!(report["counts"].as_array().unwrap().len(), 1);
    assert_eq!(report["hashtags"].as_array().unwrap().len(), 3);
    assert!(report["retweets"].as_array().unwrap().is_empty());
    assert_eq!(report["summary"]["window_count"], 1);
    assert_eq!(report["summary"]["total_event_count"], 3);
}

#[tokio::test]
async fn test_replaying_same_feed_overwrites_windows() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db");
    let feed_path = write_feed(dir.path());

    aggregate(&db, &feed_path).await;
    aggregate(&db, &feed_path).await;

    let summary = read_only(&db).summarize().unwrap();
    assert_eq!(summary.window_count, 1);
    assert_eq!(summary.total_event_count, 3);
}

#[tokio::test]
async fn test_second_writer_is_locked_out() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db");
    let _writer = TimeIndexedStore::open(&config(&db).storage).unwrap();

    let err = TimeIndexedStore::open(&config(&db).storage).err().unwrap();
    assert!(matches!(
        err,
        StoreError::Backend(KVStoreError::AlreadyLocked { .. })
    ));

    let args = AggregateArgs {
        source: SourceArg::File(write_feed(dir.path())),
        capture: None,
    };
    assert!(run_aggregate(config(&db), args, &CancellationToken::new())
        .await
        .is_err());

    // Readers are not blocked by the writer lock.
    assert!(read_only(&db).recent_counts(1).unwrap().is_empty());
}
