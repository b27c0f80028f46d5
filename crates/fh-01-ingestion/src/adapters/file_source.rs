use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;

use crate::domain::IngestError;
use crate::ports::{BoxedSource, SourceFactory};

/// Replays a captured feed file once.
#[derive(Debug, Clone)]
pub struct FileSourceFactory {
    path: PathBuf,
}

impl FileSourceFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceFactory for FileSourceFactory {
    async fn connect(&self) -> Result<BoxedSource, IngestError> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| IngestError::connect(self.describe(), e))?;
        tracing::debug!("[fh-01] Opened replay file {}", self.path.display());
        Ok(Box::new(file))
    }

    fn is_reconnectable(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
