//! # Aggregation (fh-02)
//!
//! Windowed aggregation of decoded feed events.
//!
//! ```text
//! line ──► decode ──► ReorderBuffer ──┬──► TumblingCounter ──► tumbling counts
//!                      (watermark)     └──► HoppingAggregator ──► hopping counts
//!                                                │
//!                                                └──► select_top ──► mentions / hashtags / retweets
//! ```
//!
//! ## Watermark
//!
//! `watermark = floor(max_seen - disorder, punctuation)`. An event strictly
//! below the watermark is moved forward to it, never dropped. A window is
//! emitted once the watermark reaches its end, exactly once, and windows with
//! no events emit nothing.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Reorder buffer, windows, leaderboard kinds, engine
//! - `adapters/` - JSON record decoder
//! - `service/` - Async engine task and output channels

pub mod adapters;
pub mod domain;
pub mod service;

pub use adapters::decode;
pub use domain::{
    AggregationConfig, AggregationError, EngineOutput, LeaderboardRules, WindowEngine,
};
pub use service::{
    aggregate_channels, run_engine, AggregateSenders, AggregateStreams, EngineReport,
};
