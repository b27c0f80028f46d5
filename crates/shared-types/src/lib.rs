//! # Shared Types Crate
//!
//! Domain entities and time arithmetic shared by every Firehose stage.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every payload that crosses a stage boundary
//!   (decoded events, leaderboard entries, count records) is defined here.
//! - **Integer Time**: all timestamps are `Ticks` (100ns units since
//!   0001-01-01 UTC). Comparisons are exact; no floating point.
//! - **Immutable Outputs**: leaderboard entries and count records are built
//!   once at window close and never mutated afterwards.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::*;
