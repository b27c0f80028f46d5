//! Pull-based line reader.
//!
//! Each call yields the next non-blank, newline-terminated line or `None` at
//! end of stream. A reader cannot be rewound; open the source again instead.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::domain::IngestError;
use crate::ports::{BoxedSource, SourceFactory};

pub struct LineReader<R> {
    inner: R,
    buf: String,
    lines_read: u64,
}

impl LineReader<BufReader<BoxedSource>> {
    /// Open a fresh reader from a source factory.
    pub async fn open(factory: &dyn SourceFactory) -> Result<Self, IngestError> {
        let source = factory.connect().await?;
        Ok(Self::new(BufReader::new(source)))
    }
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            lines_read: 0,
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub async fn next_line(&mut self) -> Result<Option<String>, IngestError> {
        loop {
            self.buf.clear();
            let n = self.inner.read_line(&mut self.buf).await?;
            if n == 0 || !self.buf.ends_with('\n') {
                return Ok(None);
            }

            let line = self.buf.trim_end_matches(['\n', '\r']);
            if !line.trim().is_empty() {
                self.lines_read += 1;
                return Ok(Some(line.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FileSourceFactory;

    #[tokio::test]
    async fn test_yields_lines_then_none() {
        let mut reader = LineReader::new(&b"a\r\n\nb\n   \nc"[..]);
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(reader.next_line().await.unwrap(), None);
        assert_eq!(reader.lines_read(), 2);
    }

    #[tokio::test]
    async fn test_open_from_factory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.jsonl");
        std::fs::write(&path, "{\"id\":1}\n{\"id\":2}\n").unwrap();

        let factory = FileSourceFactory::new(&path);
        let mut reader = LineReader::open(&factory).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("{\"id\":1}"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("{\"id\":2}"));
        assert!(reader.next_line().await.unwrap().is_none());
    }
}
