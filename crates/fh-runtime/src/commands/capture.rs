//! `firehose capture`: save a live feed to a file for a fixed duration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::info;

use fh_01_ingestion::{LineReader, SourceFactory};

#[derive(Debug, Clone)]
pub struct CaptureArgs {
    pub output: PathBuf,
    pub duration: Duration,
}

/// Copy lines from `source` to the output file until the duration elapses,
/// the source ends, or `shutdown` fires. Returns the number of lines written.
pub async fn run_capture(
    source: &dyn SourceFactory,
    args: CaptureArgs,
    shutdown: &CancellationToken,
) -> anyhow::Result<u64> {
    let mut reader = LineReader::open(source)
        .await
        .with_context(|| format!("connect to {}", source.describe()))?;
    let file = tokio::fs::File::create(&args.output)
        .await
        .with_context(|| format!("create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);

    info!(
        "[fh-runtime] Capturing {} for {:?} into {}",
        source.describe(),
        args.duration,
        args.output.display()
    );

    let deadline = tokio::time::sleep(args.duration);
    tokio::pin!(deadline);

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = &mut deadline => break,
            line = reader.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }

    out.flush().await?;
    info!("[fh-runtime] Captured {} lines", reader.lines_read());
    Ok(reader.lines_read())
}
