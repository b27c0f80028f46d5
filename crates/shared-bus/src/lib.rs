//! # Shared Bus - Inter-Stage Plumbing
//!
//! Every Firehose stage talks to its neighbours through bounded channels. This
//! crate holds the two pieces of plumbing that more than one stage needs:
//!
//! - [`FanOut`]: duplicates each item of one channel into N downstream
//!   channels. Nothing flows until [`FanOut::run`] is called.
//! - [`TaskGroup`]: races a set of stage tasks under one cancellation token.
//!   A member added with `spawn` tears the group down whenever it ends; a
//!   feeder added with `spawn_feeder` does so only when it fails, so the
//!   stages after it can drain what it produced.
//!
//! ```text
//!            ┌──────────► consumer A
//! producer ──┤ FanOut
//!            └──────────► consumer B
//! ```
//!
//! Channels are lossless: a slow consumer applies backpressure to the
//! producer instead of dropping items.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod fanout;
pub mod task_group;

pub use fanout::FanOut;
pub use task_group::TaskGroup;

/// Default capacity for inter-stage channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
