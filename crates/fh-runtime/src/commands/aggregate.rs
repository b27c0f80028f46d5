//! `firehose aggregate`: run the full pipeline into a store.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fh_01_ingestion::{FileSourceFactory, SourceFactory, TcpSourceFactory};
use fh_03_time_store::TimeIndexedStore;

use crate::config::FirehoseConfig;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceArg {
    /// Replay a recorded feed.
    File(PathBuf),
    /// Live newline-delimited feed at `host:port`.
    Connect(String),
}

impl SourceArg {
    pub fn factory(&self) -> Arc<dyn SourceFactory> {
        match self {
            SourceArg::File(path) => Arc::new(FileSourceFactory::new(path.clone())),
            SourceArg::Connect(address) => Arc::new(TcpSourceFactory::new(address.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregateArgs {
    pub source: SourceArg,
    pub capture: Option<PathBuf>,
}

pub async fn run_aggregate(
    config: FirehoseConfig,
    args: AggregateArgs,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let store = TimeIndexedStore::open(&config.storage)?;
    let mut pipeline = Pipeline::new(config, args.source.factory(), store);
    if let Some(path) = args.capture {
        pipeline = pipeline.with_capture(path);
    }
    pipeline.run(shutdown).await
}
