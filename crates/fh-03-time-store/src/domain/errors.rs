//! # Error Types
//!
//! `KVStoreError` comes from a backend; `StoreError` is what the query and
//! write surface reports.

use std::path::PathBuf;

use thiserror::Error;

use shared_types::Ticks;

/// Failures reported by an `OrderedKeyValueStore` backend.
#[derive(Debug, Error)]
pub enum KVStoreError {
    #[error("KV store I/O error: {message}")]
    Io { message: String },

    #[error("KV store corruption: {message}")]
    Corruption { message: String },

    #[error("Store already in use by process {pid:?} ({path})")]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("Store opened read-only")]
    ReadOnly,

    #[error("Store not found at {0}")]
    NotFound(PathBuf),
}

impl KVStoreError {
    pub fn io(context: &str, err: impl std::fmt::Display) -> Self {
        KVStoreError::Io {
            message: format!("{context}: {err}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] KVStoreError),

    #[error("Negative time cannot be encoded as a key: {0}")]
    NegativeTime(Ticks),

    #[error("Malformed key in {namespace}: {reason}")]
    MalformedKey {
        namespace: &'static str,
        reason: String,
    },

    #[error("Malformed payload in {namespace}: {reason}")]
    MalformedPayload {
        namespace: &'static str,
        reason: String,
    },

    #[error("Invalid store config: {0}")]
    InvalidConfig(String),
}
