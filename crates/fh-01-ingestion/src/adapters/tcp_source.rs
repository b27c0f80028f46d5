use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::domain::IngestError;
use crate::ports::{BoxedSource, SourceFactory};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connects to a newline-delimited feed relay over plain TCP.
#[derive(Debug, Clone)]
pub struct TcpSourceFactory {
    address: String,
    connect_timeout: Duration,
}

impl TcpSourceFactory {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl SourceFactory for TcpSourceFactory {
    async fn connect(&self) -> Result<BoxedSource, IngestError> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| IngestError::connect(self.describe(), "connect timed out"))?
            .map_err(|e| IngestError::connect(self.describe(), e))?;
        stream.set_nodelay(true)?;

        tracing::info!("[fh-01] Connected to {}", self.address);
        Ok(Box::new(stream))
    }

    fn is_reconnectable(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("tcp:{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connects_and_reads() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"hello\n").await.unwrap();
        });

        let factory = TcpSourceFactory::new(address);
        assert!(factory.is_reconnectable());

        let mut source = factory.connect().await.unwrap();
        let mut contents = String::new();
        source.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let factory = TcpSourceFactory::new(address).with_connect_timeout(Duration::from_secs(5));
        assert!(matches!(
            factory.connect().await,
            Err(IngestError::Connect { .. })
        ));
    }
}
