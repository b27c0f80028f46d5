use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the ingestion stage.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The factory could not (re)establish the source.
    #[error("Failed to connect to {target}: {reason}")]
    Connect { target: String, reason: String },

    /// A read failed before the connection reached its minimum viable age.
    #[error("Read failed after {connected_for:?} connected: {source}")]
    ReadFailed {
        connected_for: Duration,
        #[source]
        source: io::Error,
    },

    /// A live source ended before the connection reached its minimum viable age.
    #[error("Source closed after only {connected_for:?} connected")]
    ZeroByteStall { connected_for: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IngestError {
    pub fn connect(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connect {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
