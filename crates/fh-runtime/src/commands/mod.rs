//! Operator commands behind the `firehose` subcommands.

pub mod aggregate;
pub mod capture;
pub mod print_db;
pub mod query;

pub use aggregate::{run_aggregate, AggregateArgs, SourceArg};
pub use capture::{run_capture, CaptureArgs};
pub use print_db::{print_db, recent_report};
pub use query::{parse_time, query, QueryTarget};
