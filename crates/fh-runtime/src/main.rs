//! # Firehose CLI (`firehose`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `firehose aggregate` | Run pump, framer, aggregation and store writers |
//! | `firehose capture` | Save a live feed to a file for N minutes |
//! | `firehose print-db` | Print the most recent records and a summary |
//! | `firehose query` | Range query one namespace |
//!
//! ## Examples
//!
//! ```bash
//! # Replay a recorded feed into ./data/firehose
//! firehose aggregate --file feed.jsonl --db ./data/firehose
//!
//! # Aggregate a live relay and keep a raw copy
//! firehose aggregate --connect 127.0.0.1:9000 --capture raw.jsonl
//!
//! # Hashtag entries for one tag over an hour
//! firehose query hashtags --from 2020-09-13T12:00:00Z --to 2020-09-13T13:00:00Z --entity rust
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fh_01_ingestion::TcpSourceFactory;
use fh_03_time_store::{StoreConfig, TimeIndexedStore};
use fh_runtime::commands::{
    parse_time, print_db, query, run_aggregate, run_capture, AggregateArgs, CaptureArgs,
    QueryTarget, SourceArg,
};
use fh_runtime::FirehoseConfig;
use fh_telemetry::{gather_metrics, init_telemetry, TelemetryConfig};

/// Streaming leaderboards over a social-media firehose.
#[derive(Parser)]
#[command(name = "firehose", version)]
struct Cli {
    /// Log filter; overrides FH_LOG_LEVEL and RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceOpts {
    /// Replay newline-delimited records from a file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Read a live feed from host:port (reconnects on failure).
    #[arg(long)]
    connect: Option<String>,
}

impl SourceOpts {
    fn into_source(self) -> Option<SourceArg> {
        match (self.file, self.connect) {
            (Some(path), _) => Some(SourceArg::File(path)),
            (None, Some(address)) => Some(SourceArg::Connect(address)),
            (None, None) => None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline into a store.
    Aggregate {
        #[command(flatten)]
        source: SourceOpts,

        /// Store directory; overrides FH_DB_PATH.
        #[arg(long)]
        db: Option<PathBuf>,

        /// Also append every raw record to this file.
        #[arg(long)]
        capture: Option<PathBuf>,
    },

    /// Save a live feed to a file for a fixed time.
    Capture {
        /// Feed address (host:port).
        #[arg(long)]
        connect: String,

        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value_t = 10)]
        minutes: u64,
    },

    /// Print the most recent records of every namespace, plus a summary.
    PrintDb {
        #[arg(long)]
        db: Option<PathBuf>,

        /// Records per namespace.
        #[arg(long, default_value_t = 10)]
        count: usize,
    },

    /// Range query one namespace, window ends in [from, to).
    Query {
        /// counts, mentions, hashtags or retweets
        target: QueryTarget,

        #[arg(long)]
        db: Option<PathBuf>,

        /// Inclusive start (RFC 3339).
        #[arg(long)]
        from: String,

        /// Exclusive end (RFC 3339).
        #[arg(long)]
        to: String,

        /// Only this screen name or hashtag.
        #[arg(long)]
        entity: Option<String>,
    },
}

fn read_only_store(config: &FirehoseConfig, db: Option<PathBuf>) -> Result<TimeIndexedStore> {
    let storage = StoreConfig {
        path: db.unwrap_or_else(|| config.storage.path.clone()),
        read_only: true,
        ..config.storage.clone()
    };
    Ok(TimeIndexedStore::open(&storage)?)
}

fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("[fh-runtime] Ctrl-C received, shutting down");
                on_signal.cancel();
            }
            Err(e) => warn!("[fh-runtime] Cannot listen for Ctrl-C: {}", e),
        }
    });
    token
}

async fn run(cli: Cli, mut config: FirehoseConfig) -> Result<()> {
    let shutdown = shutdown_on_ctrl_c();

    match cli.command {
        Commands::Aggregate {
            source,
            db,
            capture,
        } => {
            if let Some(db) = db {
                config.storage.path = db;
            }
            let Some(source) = source.into_source() else {
                anyhow::bail!("one of --file or --connect is required");
            };
            run_aggregate(config, AggregateArgs { source, capture }, &shutdown).await
        }
        Commands::Capture {
            connect,
            output,
            minutes,
        } => {
            let args = CaptureArgs {
                output,
                duration: Duration::from_secs(minutes.saturating_mul(60)),
            };
            run_capture(&TcpSourceFactory::new(connect), args, &shutdown).await?;
            Ok(())
        }
        Commands::PrintDb { db, count } => print_db(&read_only_store(&config, db)?, count),
        Commands::Query {
            target,
            db,
            from,
            to,
            entity,
        } => {
            let store = read_only_store(&config, db)?;
            let value = query(
                &store,
                target,
                parse_time(&from)?,
                parse_time(&to)?,
                entity.as_deref(),
            )?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &cli.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    let _guard = init_telemetry(telemetry)?;

    let config = FirehoseConfig::from_env()?;
    let result = run(cli, config).await;

    match gather_metrics() {
        Ok(text) => debug!("[fh-runtime] Final metrics:\n{}", text),
        Err(e) => warn!("[fh-runtime] Metrics unavailable: {}", e),
    }

    if let Err(e) = &result {
        error!("[fh-runtime] Fatal: {:#}", e);
    }
    result
}
