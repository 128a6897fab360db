use std::sync::Arc;

use crate::content::{cache::ContentCache, markdown, source::ContentSource};
use crate::registry::point::PointOfInterest;
use crate::Result;

/// A point's article, as fetched and as rendered
#[derive(Debug, Clone, PartialEq)]
pub struct PointContent {
    pub markdown: String,
    pub html: String,
    pub blocks: Vec<markdown::Block>,
}

impl PointContent {
    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        let markdown = markdown.into();
        Self {
            html: markdown::render_html(&markdown),
            blocks: markdown::blocks(&markdown),
            markdown,
        }
    }
}

/// Fetches and renders point articles, memoized in a `ContentCache`.
///
/// Cheap to clone; clones share the source and the cache.
#[derive(Clone)]
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
    cache: ContentCache,
}

impl ContentLoader {
    pub fn new(source: Arc<dyn ContentSource>, cache: ContentCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    /// `Ok(None)` when the point has no article
    pub async fn try_load(&self, point: &PointOfInterest) -> Result<Option<Arc<PointContent>>> {
        let Some(path) = point.content_path() else {
            log::warn!("point {} has no content", point.id);
            return Ok(None);
        };

        if let Some(content) = self.cache.get(&point.id) {
            return Ok(Some(content));
        }

        let text = self.source.fetch_text(&path).await?;
        let content = Arc::new(PointContent::from_markdown(text));
        self.cache.set(point.id.clone(), Arc::clone(&content));
        log::debug!("loaded content of {} from {}", point.id, self.source.locate(&path));
        Ok(Some(content))
    }

    /// Like `try_load`, but failures are logged and read as "no content"
    pub async fn load(&self, point: &PointOfInterest) -> Option<Arc<PointContent>> {
        match self.try_load(point).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("failed to load content of {}: {}", point.id, e);
                None
            }
        }
    }
}
