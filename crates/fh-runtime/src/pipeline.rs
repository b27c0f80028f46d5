//! # Pipeline Wiring
//!
//! ```text
//! SourceFactory ─► pump ─► pipe ─► framer ─► lines ─┬─────────────► engine ─► 5 streams ─► store writers
//!                                                   └─ (fan-out) ─► capture file
//! ```
//!
//! Every stage runs in one `TaskGroup`. Upstream stages are feeders: when
//! they finish cleanly, their output closes and the next stage drains what
//! is left. The store writers are the terminal member; their completion ends
//! the group. Any failure cancels everything.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fh_01_ingestion::{pipe, IngestionPump, LineFramer, SourceFactory};
use fh_02_aggregation::{aggregate_channels, run_engine, WindowEngine};
use fh_03_time_store::{StoreWriters, TimeIndexedStore};
use shared_bus::{FanOut, TaskGroup};

use crate::config::FirehoseConfig;

pub struct Pipeline {
    config: FirehoseConfig,
    source: Arc<dyn SourceFactory>,
    store: TimeIndexedStore,
    capture: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        config: FirehoseConfig,
        source: Arc<dyn SourceFactory>,
        store: TimeIndexedStore,
    ) -> Self {
        Self {
            config,
            source,
            store,
            capture: None,
        }
    }

    /// Also append every raw line to `path`.
    pub fn with_capture(mut self, path: impl Into<PathBuf>) -> Self {
        self.capture = Some(path.into());
        self
    }

    /// Run to completion, failure, or cancellation of `shutdown`.
    pub async fn run(self, shutdown: &CancellationToken) -> anyhow::Result<()> {
        self.config.validate()?;
        let engine = WindowEngine::new(self.config.aggregation.clone())?;
        let capacity = self.config.ingestion.channel_capacity;

        info!(
            "[fh-runtime] Starting pipeline: source={}, store={}",
            self.source.describe(),
            self.store.describe()
        );

        let mut group = TaskGroup::new("pipeline", shutdown);
        let token = group.token();

        let (writer, reader) = pipe(self.config.ingestion.pipe_segments);
        let pump = IngestionPump::new(self.source.clone(), self.config.ingestion.pump.clone());
        let pump_token = token.clone();
        group.spawn_feeder("pump", async move {
            pump.run(writer, pump_token).await?;
            Ok(())
        });

        let (line_tx, line_rx) = mpsc::channel(capacity);
        let framer_token = token.clone();
        group.spawn_feeder("framer", async move {
            LineFramer::new(reader).run(line_tx, framer_token).await;
            Ok(())
        });

        let engine_rx = match self.capture {
            Some(path) => {
                let mut fanout = FanOut::new("lines", line_rx);
                let engine_rx = fanout.add_output("engine", capacity);
                let capture_rx = fanout.add_output("capture", capacity);
                let fanout_token = token.clone();
                group.spawn_feeder("fanout", async move {
                    fanout.run(fanout_token).await?;
                    Ok(())
                });
                group.spawn_feeder("capture", capture_lines(capture_rx, path, token.clone()));
                engine_rx
            }
            None => line_rx,
        };

        let (senders, streams) = aggregate_channels(capacity);
        let engine_token = token.clone();
        group.spawn_feeder("engine", async move {
            run_engine(engine, engine_rx, senders, engine_token).await;
            Ok(())
        });

        let writers = StoreWriters::new(self.store);
        let writers_token = token.clone();
        group.spawn("store-writers", async move {
            writers.run(streams, &writers_token).await
        });

        group.join().await
    }
}

/// Append each line plus `\n` to `path` until the stream ends.
async fn capture_lines(
    mut lines: mpsc::Receiver<String>,
    path: PathBuf,
    token: CancellationToken,
) -> anyhow::Result<()> {
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .with_context(|| format!("open capture file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut written = 0u64;

    loop {
        let line = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            break;
        };
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        written += 1;
    }

    out.flush().await?;
    info!("[fh-runtime] Captured {} lines to {}", written, path.display());
    Ok(())
}
