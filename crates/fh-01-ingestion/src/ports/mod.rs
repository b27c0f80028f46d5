//! # Outbound Ports
//!
//! What the pump needs from the host: a way to (re)open the event source.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::domain::IngestError;

/// A readable byte source handed to the pump.
pub type BoxedSource = Box<dyn AsyncRead + Send + Unpin>;

/// Opens the event source. `connect` may be called once per reconnect.
///
/// Production: `TcpSourceFactory`, `FileSourceFactory` (adapters/)
#[async_trait]
pub trait SourceFactory: Send + Sync {
    async fn connect(&self) -> Result<BoxedSource, IngestError>;

    /// Live feeds reconnect on a zero-byte read; finite sources complete.
    fn is_reconnectable(&self) -> bool;

    /// Human-readable target for logs.
    fn describe(&self) -> String;
}
