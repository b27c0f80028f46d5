//! # Ingestion Flow
//!
//! A scripted live source driven through pump, pipe and framer, covering
//! reconnects, torn records and the minimum-connection-age rule.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use fh_01_ingestion::{
    pipe, BoxedSource, IngestError, IngestionPump, LineFramer, PumpConfig, PumpState,
    SourceFactory,
};

/// Serves one scripted chunk per connection, then refuses to connect.
struct ScriptedFeed {
    chunks: Mutex<VecDeque<&'static str>>,
    connects: Mutex<u32>,
}

impl ScriptedFeed {
    fn new(chunks: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: Mutex::new(chunks.iter().copied().collect()),
            connects: Mutex::new(0),
        })
    }

    fn connects(&self) -> u32 {
        *self.connects.lock()
    }
}

#[async_trait]
impl SourceFactory for ScriptedFeed {
    async fn connect(&self) -> Result<BoxedSource, IngestError> {
        *self.connects.lock() += 1;
        match self.chunks.lock().pop_front() {
            Some(chunk) => Ok(Box::new(Cursor::new(chunk.as_bytes()))),
            None => Err(IngestError::connect(self.describe(), "script exhausted")),
        }
    }

    fn is_reconnectable(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

struct Outcome {
    pump: Result<(), IngestError>,
    final_state: PumpState,
    lines: Vec<String>,
}

async fn run(feed: Arc<ScriptedFeed>, min_connection: Duration) -> Outcome {
    let config = PumpConfig {
        read_buffer_bytes: 8,
        min_connection,
        ..PumpConfig::default()
    };
    let pump = IngestionPump::new(feed, config);
    let state = pump.subscribe_state();
    let (writer, reader) = pipe(4);
    let (line_tx, mut line_rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();

    let framer = tokio::spawn(LineFramer::new(reader).run(line_tx, cancel.clone()));
    let pump = pump.run(writer, cancel).await.map(|_| ());
    framer.await.unwrap();

    let mut lines = Vec::new();
    while let Some(line) = line_rx.recv().await {
        lines.push(line);
    }
    let final_state = *state.borrow();
    Outcome {
        pump,
        final_state,
        lines,
    }
}

#[tokio::test]
async fn test_reconnect_drops_torn_record_and_continues() {
    let feed = ScriptedFeed::new(&["first\nsecond-", "half\nthird\n"]);

    let outcome = run(feed.clone(), Duration::ZERO).await;

    assert_eq!(outcome.lines, vec!["first", "half", "third"]);
    assert_eq!(feed.connects(), 3);
    assert!(matches!(outcome.pump, Err(IngestError::Connect { .. })));
    assert_eq!(outcome.final_state, PumpState::Failing);
}

#[tokio::test]
async fn test_early_close_is_fatal_and_partial_record_dropped() {
    let feed = ScriptedFeed::new(&["kept\ntorn", "never read\n"]);

    let outcome = run(feed.clone(), Duration::from_secs(60)).await;

    assert_eq!(outcome.lines, vec!["kept"]);
    assert_eq!(feed.connects(), 1);
    assert!(matches!(
        outcome.pump,
        Err(IngestError::ZeroByteStall { .. })
    ));
}
