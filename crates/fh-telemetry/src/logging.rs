//! Log subscriber setup.
//!
//! Pretty output for terminals, JSON lines for log shippers. Either can be
//! redirected to a file; ANSI colours are disabled there.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::{TelemetryConfig, TelemetryError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    let fmt_layer = build_fmt_layer(config)?;

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        "Logging initialized"
    );
    Ok(())
}

fn build_fmt_layer(config: &TelemetryConfig) -> Result<BoxedLayer, TelemetryError> {
    let file = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| TelemetryError::LogFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            Some(Arc::new(file))
        }
        None => None,
    };

    let layer = match (config.json_logs, file) {
        (true, Some(file)) => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(file)
            .boxed(),
        (true, None) => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        (false, Some(file)) => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .boxed(),
        (false, None) => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .boxed(),
    };

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = TelemetryConfig::default().with_log_level("firehose=loud");
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::LoggingInit(_))
        ));
    }

    #[test]
    fn test_unwritable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = TelemetryConfig {
            log_file: Some(dir.path().join("missing").join("firehose.log")),
            ..TelemetryConfig::default()
        };
        assert!(matches!(
            build_fmt_layer(&config),
            Err(TelemetryError::LogFile { .. })
        ));
    }

    #[test]
    fn test_file_layer_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firehose.log");
        let config = TelemetryConfig {
            log_file: Some(path.clone()),
            json_logs: true,
            ..TelemetryConfig::default()
        };
        assert!(build_fmt_layer(&config).is_ok());
        assert!(path.exists());
    }
}
