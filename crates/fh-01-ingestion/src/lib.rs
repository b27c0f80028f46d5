//! # Ingestion (fh-01)
//!
//! Turns an unreliable byte feed into a stream of newline-delimited records.
//!
//! ```text
//! SourceFactory ──► IngestionPump ──► pipe (bounded) ──► LineFramer ──► mpsc<String>
//!                        │
//!                        └── ThroughputMeter (kb per 5 min)
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Where |
//! |-----------|-------|
//! | Bounded in-flight memory | `pipe(capacity)` blocks the pump's flush |
//! | Fast failures are fatal | connection younger than `min_connection` |
//! | Writer always completed | `IngestionPump::run` |
//! | No partial records | `LineFramer` discards unterminated tail |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pump states, config, errors
//! - `ports/` - `SourceFactory`
//! - `adapters/` - File replay and TCP factories
//! - `service/` - Pipe, pump, throughput meter, framer, pull-based reader

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileSourceFactory, TcpSourceFactory};
pub use domain::{
    IngestError, PumpConfig, PumpReport, PumpState, DEFAULT_MIN_CONNECTION,
    DEFAULT_PIPE_SEGMENTS, DEFAULT_READ_BUFFER_BYTES, DEFAULT_THROUGHPUT_WINDOW,
};
pub use ports::{BoxedSource, SourceFactory};
pub use service::{
    pipe, FramerReport, IngestionPump, LineFramer, LineReader, PipeReader, PipeWriter, Segment,
};
