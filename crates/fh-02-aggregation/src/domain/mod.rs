//! Pure windowing logic. No I/O, no async.

pub mod config;
pub mod engine;
pub mod errors;
pub mod hopping;
pub mod kinds;
pub mod partial;
pub mod reorder;
pub mod topk;
pub mod tumbling;

pub use config::AggregationConfig;
pub use engine::{EngineOutput, WindowEngine};
pub use errors::AggregationError;
pub use hopping::{HoppingAggregator, HoppingWindow};
pub use kinds::{LeaderboardRules, SampleIdentity};
pub use reorder::ReorderBuffer;
pub use topk::select_top;
pub use tumbling::TumblingCounter;
