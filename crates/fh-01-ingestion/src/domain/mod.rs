//! Pump states, tuning knobs and errors.

pub mod errors;
pub mod state;

pub use errors::IngestError;
pub use state::{PumpReport, PumpState};

use std::time::Duration;

/// Bytes requested from the source per read.
pub const DEFAULT_READ_BUFFER_BYTES: usize = 512 * 1024;

/// Flushed segments the pipe holds before the pump blocks.
pub const DEFAULT_PIPE_SEGMENTS: usize = 16;

/// A connection younger than this that fails is treated as fatal.
pub const DEFAULT_MIN_CONNECTION: Duration = Duration::from_secs(60);

/// Width of the throughput log window.
pub const DEFAULT_THROUGHPUT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Pump tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpConfig {
    pub read_buffer_bytes: usize,
    pub min_connection: Duration,
    pub throughput_window: Duration,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            read_buffer_bytes: DEFAULT_READ_BUFFER_BYTES,
            min_connection: DEFAULT_MIN_CONNECTION,
            throughput_window: DEFAULT_THROUGHPUT_WINDOW,
        }
    }
}
