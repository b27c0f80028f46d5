//! # Firehose Configuration
//!
//! Defaults come from each stage's constants; `FH_*` environment variables
//! override them; command-line flags override both.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FH_DB_PATH` | `./data/firehose` | Store directory |
//! | `FH_STORE_BACKEND` | `file` | `file`, `rocksdb` or `memory` |
//! | `FH_SYNC_WRITES` | `false` | fsync every store batch |
//! | `FH_READ_BUFFER_BYTES` | 524288 | Bytes per source read |
//! | `FH_PIPE_SEGMENTS` | 16 | Pipe capacity in segments |
//! | `FH_MIN_CONNECTION_SECS` | 60 | Connections younger than this fail fatally |
//! | `FH_DISORDER_SECS` | 5 | Disorder tolerance of event time |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use fh_01_ingestion::{PumpConfig, DEFAULT_PIPE_SEGMENTS};
use fh_02_aggregation::{AggregationConfig, AggregationError};
use fh_03_time_store::{StoreBackend, StoreConfig};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::TICKS_PER_SECOND;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid ingestion config: {0}")]
    Ingestion(String),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    pub pump: PumpConfig,
    /// Pipe capacity in flushed segments.
    pub pipe_segments: usize,
    /// Capacity of every line and output channel.
    pub channel_capacity: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            pump: PumpConfig::default(),
            pipe_segments: DEFAULT_PIPE_SEGMENTS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirehoseConfig {
    pub ingestion: IngestionConfig,
    pub aggregation: AggregationConfig,
    pub storage: StoreConfig,
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        var,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidVar {
            var,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

impl FirehoseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup("FH_DB_PATH").filter(|v| !v.is_empty()) {
            config.storage.path = PathBuf::from(path);
        }
        if let Some(backend) = lookup("FH_STORE_BACKEND") {
            config.storage.backend =
                StoreBackend::from_str(&backend).map_err(|e| ConfigError::InvalidVar {
                    var: "FH_STORE_BACKEND",
                    value: backend.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(sync) = lookup("FH_SYNC_WRITES") {
            config.storage.sync_writes = parse_bool("FH_SYNC_WRITES", sync)?;
        }
        if let Some(bytes) = lookup("FH_READ_BUFFER_BYTES") {
            config.ingestion.pump.read_buffer_bytes = parse("FH_READ_BUFFER_BYTES", bytes)?;
        }
        if let Some(segments) = lookup("FH_PIPE_SEGMENTS") {
            config.ingestion.pipe_segments = parse("FH_PIPE_SEGMENTS", segments)?;
        }
        if let Some(secs) = lookup("FH_MIN_CONNECTION_SECS") {
            let secs: u64 = parse("FH_MIN_CONNECTION_SECS", secs)?;
            config.ingestion.pump.min_connection = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup("FH_DISORDER_SECS") {
            let secs: i64 = parse("FH_DISORDER_SECS", secs)?;
            config.aggregation.disorder = secs.saturating_mul(TICKS_PER_SECOND);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingestion.pump.read_buffer_bytes == 0 {
            return Err(ConfigError::Ingestion(
                "read buffer must be at least one byte".into(),
            ));
        }
        if self.ingestion.pipe_segments == 0 || self.ingestion.channel_capacity == 0 {
            return Err(ConfigError::Ingestion(
                "pipe and channel capacities must be positive".into(),
            ));
        }
        self.aggregation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_validate() {
        let config = FirehoseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FirehoseConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let config = FirehoseConfig::from_lookup(lookup(&[
            ("FH_DB_PATH", "/tmp/fh"),
            ("FH_STORE_BACKEND", "memory"),
            ("FH_SYNC_WRITES", "true"),
            ("FH_READ_BUFFER_BYTES", "4096"),
            ("FH_PIPE_SEGMENTS", "4"),
            ("FH_MIN_CONNECTION_SECS", "30"),
            ("FH_DISORDER_SECS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/tmp/fh"));
        assert_eq!(config.storage.backend, StoreBackend::Memory);
        assert!(config.storage.sync_writes);
        assert_eq!(config.ingestion.pump.read_buffer_bytes, 4096);
        assert_eq!(config.ingestion.pipe_segments, 4);
        assert_eq!(config.ingestion.pump.min_connection, Duration::from_secs(30));
        assert_eq!(config.aggregation.disorder, 10 * TICKS_PER_SECOND);
    }

    #[test]
    fn test_bad_values_name_the_variable() {
        let err = FirehoseConfig::from_lookup(lookup(&[("FH_PIPE_SEGMENTS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("FH_PIPE_SEGMENTS"));

        let err = FirehoseConfig::from_lookup(lookup(&[("FH_STORE_BACKEND", "redis")]))
            .unwrap_err();
        assert!(err.to_string().contains("FH_STORE_BACKEND"));
    }

    #[test]
    fn test_validate_rejects_zero_pipe() {
        let mut config = FirehoseConfig::default();
        config.ingestion.pipe_segments = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Ingestion(_))));

        let mut config = FirehoseConfig::default();
        config.aggregation.hop = 7 * TICKS_PER_SECOND;
        assert!(matches!(config.validate(), Err(ConfigError::Aggregation(_))));
    }
}
