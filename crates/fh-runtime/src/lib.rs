//! # Firehose Runtime
//!
//! Configuration, pipeline wiring and operator commands for the `firehose`
//! binary.
//!
//! ## Modular Structure
//!
//! - `config` - `FirehoseConfig` defaults, `FH_*` overrides, validation
//! - `pipeline` - Stage wiring under one fail-fast task group
//! - `commands/` - aggregate, capture, print-db, query

pub mod commands;
pub mod config;
pub mod pipeline;

pub use config::{ConfigError, FirehoseConfig, IngestionConfig};
pub use pipeline::Pipeline;
