//! # Firehose Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Engine and store throughput
//! └── src/
//!     ├── fixtures.rs   # Feed line builders shared by tests and benches
//!     └── integration/  # Cross-crate flows
//!         ├── ingestion_flow.rs   # reconnecting source -> pump -> framer
//!         ├── pipeline_flow.rs    # replay file -> pipeline -> file-log store
//!         └── store_flow.rs       # persistence across reopen, read-only access
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fh-tests
//! cargo bench -p fh-tests
//! ```

pub mod fixtures;

#[cfg(test)]
mod integration;
