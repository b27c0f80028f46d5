pub mod engine_task;

pub use engine_task::{
    aggregate_channels, run_engine, AggregateSenders, AggregateStreams, EngineReport,
};
