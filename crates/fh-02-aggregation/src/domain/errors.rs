use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Invalid aggregation config: {0}")]
    InvalidConfig(String),
}
