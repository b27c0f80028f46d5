//! # Firehose Telemetry
//!
//! Logs and counters for every pipeline stage.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, either
//!   human-readable or as JSON lines, to stdout or a log file.
//! - **Metrics**: Prometheus counters in a process-wide registry, rendered on
//!   demand with [`gather_metrics`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fh_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Pipeline runs here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FH_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `FH_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `FH_LOG_FILE` | unset | Append logs to this file instead of stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, HistogramTimer, DECODE_SKIPS, EVENTS_DECODED,
    INGEST_BYTES_READ, INGEST_RECONNECTS, LATE_EVENTS_ADJUSTED, LINES_FRAMED, STORE_WRITES,
    STORE_WRITE_DURATION, WINDOWS_CLOSED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to open log file {path}: {reason}")]
    LogFile { path: String, reason: String },

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics, then install the log subscriber.
///
/// The returned guard should live as long as the pipeline.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(&config)?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _config: config })
}

/// Keeps telemetry active; logs a final note on drop.
pub struct TelemetryGuard {
    _config: TelemetryConfig,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Shutting down telemetry");
    }
}
