mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use campusmap::prelude::*;

/// In-memory source that counts every fetch
#[derive(Default)]
struct CountingSource {
    files: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl CountingSource {
    fn with_file(mut self, path: &str, body: &str) -> Self {
        self.files.insert(path.to_string(), body.as_bytes().to_vec());
        self
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for CountingSource {
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| MapError::Content(format!("{} not found", path)))
    }

    fn locate(&self, path: &str) -> String {
        format!("memory://{}", path)
    }
}

fn article_point(id: &str) -> PointOfInterest {
    let mut point = PointOfInterest::new(id, "Rectorate", LatLng::new(48.6208, 22.3006));
    point.article = true;
    point
}

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    common::init_logging();
    let source = Arc::new(CountingSource::default().with_file("content/4.md", "# Rectorate"));
    let loader = ContentLoader::new(source.clone(), ContentCache::new());

    let first = loader.load(&article_point("4")).await.unwrap();
    let second = loader.load(&article_point("4")).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_injected_cache_is_shared_between_loaders() {
    let source = Arc::new(CountingSource::default().with_file("content/4.md", "text"));
    let cache = ContentCache::new();
    let a = ContentLoader::new(source.clone(), cache.clone());
    let b = ContentLoader::new(source.clone(), cache.clone());

    a.load(&article_point("4")).await.unwrap();
    b.load(&article_point("4")).await.unwrap();

    assert_eq!(source.fetches(), 1);
    assert!(cache.contains("4"));
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let source = Arc::new(CountingSource::default());
    let loader = ContentLoader::new(source.clone(), ContentCache::new());

    assert!(loader.try_load(&article_point("9")).await.is_err());
    assert!(loader.load(&article_point("9")).await.is_none());
    assert_eq!(source.fetches(), 2);
    assert!(loader.cache().is_empty());
}

#[tokio::test]
async fn test_point_without_article_never_fetches() {
    let source = Arc::new(CountingSource::default());
    let loader = ContentLoader::new(source.clone(), ContentCache::new());
    let point = PointOfInterest::new("8", "Sports hall", LatLng::new(48.63, 22.31));

    assert!(loader.try_load(&point).await.unwrap().is_none());
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_explicit_content_file_wins() {
    let source = Arc::new(CountingSource::default().with_file("articles/library.md", "*Open* daily"));
    let loader = ContentLoader::new(source.clone(), ContentCache::new());
    let mut point = article_point("7");
    point.content_file = Some("articles/library.md".into());

    let content = loader.load(&point).await.unwrap();
    assert!(content.html.contains("<em>Open</em>"));
}

#[tokio::test]
async fn test_registry_loader_caches_success_only() {
    let source = Arc::new(CountingSource::default().with_file("data/points.json", common::POINTS));
    let loader = RegistryLoader::new(source.clone());

    let first = loader.load().await;
    let second = loader.load().await;
    assert_eq!(first.len(), 3);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.fetches(), 1);

    let missing = RegistryLoader::new(Arc::new(CountingSource::default()));
    assert!(missing.load().await.is_empty());
    assert!(missing.cached().is_none());
}
