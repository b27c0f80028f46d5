//! # Error Types
//!
//! Errors shared across stages.

use thiserror::Error;

use crate::time::Ticks;

/// Tick values that cannot be represented as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Ticks out of calendar range: {ticks}")]
    OutOfRange { ticks: Ticks },
}
