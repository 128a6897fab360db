use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::paths::BasePath;
use crate::tiles::loader::download;
use crate::{MapError, Result};

/// Where the registry document, articles and images are read from.
///
/// Paths are public-root relative, e.g. `data/points.json` or
/// `content/4.md`; a leading slash is ignored.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>>;

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let bytes = self.fetch_bytes(path).await?;
        String::from_utf8(bytes).map_err(|e| MapError::Content(format!("{} is not UTF-8: {}", path, e)))
    }

    /// Full location of `path`, for logs and cache keys
    fn locate(&self, path: &str) -> String;
}

/// Public directory served over HTTP, optionally under a base path
#[derive(Debug, Clone)]
pub struct HttpSource {
    origin: String,
    base: BasePath,
}

impl HttpSource {
    pub fn new(origin: impl Into<String>, base: BasePath) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            base,
        }
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        download(self.locate(path)).await
    }

    fn locate(&self, path: &str) -> String {
        format!("{}{}", self.origin, self.base.public_path(path))
    }
}

/// Public directory on the local disk
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(MapError::Content(format!("{} escapes the public directory", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::read(&full).await?)
    }

    fn locate(&self, path: &str) -> String {
        self.root
            .join(path.trim_start_matches('/'))
            .display()
            .to_string()
    }
}
