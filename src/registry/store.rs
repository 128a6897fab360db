use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::content::source::ContentSource;
use crate::core::constants::POINTS_DOCUMENT;
use crate::prelude::HashMap;
use crate::registry::point::PointOfInterest;
use crate::Result;

/// On-disk shape of the registry document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointsDocument {
    #[serde(default)]
    pub points: Vec<PointOfInterest>,
}

/// The points of one session, one record per ID, in document order
#[derive(Debug, Clone, Default)]
pub struct PointRegistry {
    points: Vec<PointOfInterest>,
    by_id: HashMap<String, usize>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry, dropping duplicate IDs.
    ///
    /// The last record with a given ID wins but keeps the slot of the
    /// first occurrence.
    pub fn from_points(points: impl IntoIterator<Item = PointOfInterest>) -> Self {
        let mut registry = Self::new();
        for point in points {
            if registry.by_id.contains_key(&point.id) {
                log::warn!("duplicate point id {}; keeping the last record", point.id);
            }
            registry.upsert(point);
        }
        registry
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: PointsDocument = serde_json::from_str(json)?;
        Ok(Self::from_points(document.points))
    }

    fn upsert(&mut self, point: PointOfInterest) -> Option<PointOfInterest> {
        match self.by_id.get(&point.id) {
            Some(&slot) => Some(std::mem::replace(&mut self.points[slot], point)),
            None => {
                self.by_id.insert(point.id.clone(), self.points.len());
                self.points.push(point);
                None
            }
        }
    }

    /// Adds or replaces a point for this session only
    pub fn insert(&mut self, point: PointOfInterest) -> Option<PointOfInterest> {
        self.upsert(point)
    }

    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.by_id.get(id).map(|&slot| &self.points[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.points.iter()
    }

    pub fn points(&self) -> &[PointOfInterest] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn content_path(&self, id: &str) -> Option<String> {
        self.get(id)?.content_path()
    }

    pub fn image_path(&self, id: &str) -> Option<&str> {
        self.get(id)?.image.as_deref().filter(|i| !i.is_empty())
    }

    pub fn has_content(&self, id: &str) -> bool {
        self.get(id).is_some_and(PointOfInterest::has_content)
    }

    pub fn has_image(&self, id: &str) -> bool {
        self.get(id).is_some_and(PointOfInterest::has_image)
    }
}

/// Loads the registry document once per session.
///
/// A failed load is logged and yields an empty registry; it is not
/// cached, so a later call tries again.
pub struct RegistryLoader {
    source: Arc<dyn ContentSource>,
    document: String,
    cached: Mutex<Option<Arc<PointRegistry>>>,
}

impl RegistryLoader {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            document: POINTS_DOCUMENT.to_string(),
            cached: Mutex::new(None),
        }
    }

    pub fn with_document(mut self, path: impl Into<String>) -> Self {
        self.document = path.into();
        self
    }

    pub fn cached(&self) -> Option<Arc<PointRegistry>> {
        self.cached.lock().ok()?.clone()
    }

    pub fn clear(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    pub async fn try_load(&self) -> Result<Arc<PointRegistry>> {
        if let Some(registry) = self.cached() {
            return Ok(registry);
        }
        let text = self.source.fetch_text(&self.document).await?;
        let registry = Arc::new(PointRegistry::from_json(&text)?);
        log::debug!(
            "loaded {} points from {}",
            registry.len(),
            self.source.locate(&self.document)
        );
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(Arc::clone(&registry));
        }
        Ok(registry)
    }

    pub async fn load(&self) -> Arc<PointRegistry> {
        match self.try_load().await {
            Ok(registry) => registry,
            Err(e) => {
                log::error!(
                    "failed to load points from {}: {}",
                    self.source.locate(&self.document),
                    e
                );
                Arc::new(PointRegistry::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::source::FileSource;
    use crate::core::geo::LatLng;

    fn poi(id: &str, title: &str) -> PointOfInterest {
        PointOfInterest::new(id, title, LatLng::new(48.62, 22.30))
    }

    #[test]
    fn test_duplicates_keep_first_slot_and_last_value() {
        let registry = PointRegistry::from_points(vec![
            poi("1", "first"),
            poi("2", "other"),
            poi("1", "second"),
        ]);

        assert_eq!(registry.len(), 2);
        let titles: Vec<_> = registry.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "other"]);
        assert_eq!(registry.get("1").unwrap().title, "second");
    }

    thread_local! {
        static CAPTURED: std::cell::RefCell<Vec<(log::Level, String)>> = std::cell::RefCell::new(Vec::new());
    }

    /// Collects records logged on the current test thread
    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            CAPTURED.with(|c| c.borrow_mut().push((record.level(), record.args().to_string())));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    fn captured_warnings(f: impl FnOnce()) -> Vec<String> {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
        CAPTURED.with(|c| c.borrow_mut().clear());
        f();
        CAPTURED.with(|c| {
            c.borrow()
                .iter()
                .filter(|(level, _)| *level == log::Level::Warn)
                .map(|(_, message)| message.clone())
                .collect()
        })
    }

    #[test]
    fn test_duplicate_id_logs_one_warning() {
        let warnings = captured_warnings(|| {
            PointRegistry::from_points(vec![poi("17", "first"), poi("2", "other"), poi("17", "second")]);
        });
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("17"));

        let clean = captured_warnings(|| {
            PointRegistry::from_points(vec![poi("1", "a"), poi("2", "b")]);
        });
        assert!(clean.is_empty());
    }

    #[test]
    fn test_path_lookups() {
        let mut with_image = poi("1", "a");
        with_image.image = Some("images/a.jpg".into());
        let mut article = poi("2", "b");
        article.article = true;
        let mut blank = poi("3", "c");
        blank.image = Some(String::new());

        let registry = PointRegistry::from_points(vec![with_image, article, blank]);
        assert_eq!(registry.image_path("1"), Some("images/a.jpg"));
        assert!(registry.has_image("1"));
        assert!(!registry.has_image("3"));
        assert!(registry.has_content("2"));
        assert_eq!(registry.content_path("2").as_deref(), Some("content/2.md"));
        assert!(!registry.has_content("missing"));
    }

    #[test]
    fn test_insert_adds_session_point() {
        let mut registry = PointRegistry::from_points(vec![poi("1", "a")]);
        assert!(registry.insert(poi("new", "added")).is_none());
        assert_eq!(registry.len(), 2);
        assert!(registry.insert(poi("new", "again")).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_loader_reads_and_caches_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join("data/points.json"),
            r#"{"points": [{"id": "1", "lng": 22.3, "lat": 48.6, "title": "A"}]}"#,
        )
        .unwrap();

        let loader = RegistryLoader::new(Arc::new(FileSource::new(dir.path())));
        let first = loader.load().await;
        assert_eq!(first.len(), 1);

        std::fs::remove_file(dir.path().join("data/points.json")).unwrap();
        let second = loader.load().await;
        assert!(Arc::ptr_eq(&first, &second));

        loader.clear();
        assert!(loader.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_loader_absorbs_bad_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/points.json"), "{ not json").unwrap();

        let loader = RegistryLoader::new(Arc::new(FileSource::new(dir.path())));
        assert!(loader.try_load().await.is_err());
        assert!(loader.load().await.is_empty());
        assert!(loader.cached().is_none());
    }
}
