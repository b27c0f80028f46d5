pub mod framer;
pub mod line_reader;
pub mod pipe;
pub mod pump;
pub mod throughput;

pub use framer::{FramerReport, LineFramer};
pub use line_reader::LineReader;
pub use pipe::{pipe, FlushResult, PipeReader, PipeWriter, Segment};
pub use pump::IngestionPump;
pub use throughput::{ThroughputMeter, ThroughputSample};
