//! # Replay Pipeline Flow
//!
//! A captured feed file replayed through the whole pipeline into a file-log
//! store, then read back through the typed queries.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fh_01_ingestion::FileSourceFactory;
use fh_03_time_store::{StoreConfig, TimeIndexedStore};
use fh_runtime::{FirehoseConfig, Pipeline};
use shared_types::{Ticks, TICKS_PER_MINUTE};

use crate::fixtures::{base_ticks, feed, FeedLine};

fn sample_feed() -> String {
    let lines = [
        FeedLine::new(1, 0)
            .author("alice", 100)
            .mention("a")
            .hashtag("rust"),
        FeedLine::new(2, 30).author("bob", 50).mention("a"),
        FeedLine::new(3, 40).author("carol", 20).retweet_of(99),
        FeedLine::new(4, 700).author("dave", 7).mention("b"),
    ];
    let mut text = feed(&lines);
    text.push_str("not json\n");
    text.push_str("{\"id\":5,\"user\":{\"screen_name\":\"eve\",\"followers_count\":1}}\n");
    text
}

fn open_store(dir: &Path, read_only: bool) -> TimeIndexedStore {
    TimeIndexedStore::open(&StoreConfig {
        path: dir.to_path_buf(),
        read_only,
        ..StoreConfig::default()
    })
    .unwrap()
}

async fn replay(feed_path: &Path, store: TimeIndexedStore, capture: Option<&Path>) {
    let source = Arc::new(FileSourceFactory::new(feed_path));
    let mut pipeline = Pipeline::new(FirehoseConfig::default(), source, store);
    if let Some(path) = capture {
        pipeline = pipeline.with_capture(path);
    }
    pipeline.run(&CancellationToken::new()).await.unwrap();
}

#[tokio::test]
async fn test_replay_fills_every_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let feed_path = dir.path().join("feed.jsonl");
    std::fs::write(&feed_path, sample_feed()).unwrap();
    let db = dir.path().join("db");

    let store = open_store(&db, false);
    replay(&feed_path, store.clone(), None).await;
    let base = base_ticks();

    let counts = store.counts(0, Ticks::MAX).unwrap();
    let windows: Vec<_> = counts.iter().map(|c| (c.window_time, c.count)).collect();
    assert_eq!(
        windows,
        vec![
            (base + 10 * TICKS_PER_MINUTE, 3),
            (base + 20 * TICKS_PER_MINUTE, 1)
        ]
    );

    let a = store.top_mentions(0, Ticks::MAX, Some("a")).unwrap();
    assert_eq!(a.len(), 10);
    assert!(a.iter().all(|e| e.key == "a" && e.score == 150 && e.item_count == 2));
    assert!(a.windows(2).all(|w| w[0].window_time < w[1].window_time));

    let b = store.top_mentions(0, Ticks::MAX, Some("b")).unwrap();
    assert_eq!(b.len(), 10);
    assert!(b.iter().all(|e| e.score == 7));

    let rust = store.top_hashtags(0, Ticks::MAX, Some("rust")).unwrap();
    assert_eq!(rust.len(), 10);
    assert_eq!(rust[0].samples[0].author, "alice");
    assert!(store.top_hashtags(0, Ticks::MAX, Some("rus")).unwrap().is_empty());

    let boards = store.top_retweets(0, Ticks::MAX).unwrap();
    assert_eq!(boards.len(), 10);
    for board in &boards {
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].key, "99");
        assert_eq!(board[0].text.as_deref(), Some("t3"));
        assert_eq!(board[0].top_users(), vec!["carol"]);
    }

    let summary = store.summarize().unwrap();
    assert_eq!(summary.window_count, 2);
    assert_eq!(summary.total_event_count, 4);
}

#[tokio::test]
async fn test_replayed_store_reopens_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let feed_path = dir.path().join("feed.jsonl");
    std::fs::write(&feed_path, sample_feed()).unwrap();
    let db = dir.path().join("db");

    replay(&feed_path, open_store(&db, false), None).await;

    let reader = open_store(&db, true);
    assert_eq!(reader.recent_counts(10).unwrap().len(), 2);
    assert_eq!(reader.recent_mentions(1).unwrap()[0].key, "b");
    assert!(reader.put_count(&shared_types::CountRecord {
        window_time: 1,
        count: 1
    })
    .is_err());
}

#[tokio::test]
async fn test_capture_mirrors_input() {
    let dir = tempfile::tempdir().unwrap();
    let feed_path = dir.path().join("feed.jsonl");
    let input = sample_feed();
    std::fs::write(&feed_path, &input).unwrap();
    let capture = dir.path().join("capture.jsonl");

    let store = open_store(&dir.path().join("db"), false);
    replay(&feed_path, store.clone(), Some(&capture)).await;

    assert_eq!(std::fs::read_to_string(&capture).unwrap(), input);
    assert_eq!(store.recent_counts(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_feed_fails_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir.path().join("db"), false);
    let source = Arc::new(FileSourceFactory::new(dir.path().join("absent.jsonl")));

    let result = Pipeline::new(FirehoseConfig::default(), source, store.clone())
        .run(&CancellationToken::new())
        .await;

    assert!(result.is_err());
    assert!(store.recent_counts(1).unwrap().is_empty());
}
