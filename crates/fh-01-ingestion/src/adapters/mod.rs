//! Source factories.

mod file_source;
mod tcp_source;

pub use file_source::FileSourceFactory;
pub use tcp_source::TcpSourceFactory;
