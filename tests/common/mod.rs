//! Shared fixtures: a throwaway public directory with points and articles

#![allow(dead_code)]

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use campusmap::prelude::*;
use tempfile::TempDir;

pub const POINTS: &str = r#"{
  "points": [
    {
      "id": "4",
      "lng": 22.3006,
      "lat": 48.6208,
      "title": "University rectorate",
      "address": "Universytetska St, Uzhhorod",
      "image": "images/rectorat.jpg",
      "gallery": ["images/hall.jpg", "images/yard.jpg"],
      "links": [{ "url": "https://www.uzhnu.edu.ua", "text": "Website", "icon": "globe" }],
      "article": true
    },
    {
      "id": "7",
      "lng": 22.25,
      "lat": 48.60,
      "title": "Library",
      "contentFile": "content/library.md"
    },
    {
      "id": "8",
      "lng": 22.31,
      "lat": 48.63,
      "title": "Sports hall"
    }
  ]
}"#;

pub const RECTORATE_ARTICLE: &str = "# Rectorate\n\nThe **main** building.\n\n- Hall\n- Museum\n";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Public root with `data/points.json` and the rectorate article;
/// the library article is left out on purpose
pub fn public_dir() -> TempDir {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::create_dir_all(dir.path().join("content")).unwrap();
    fs::write(dir.path().join("data/points.json"), POINTS).unwrap();
    fs::write(dir.path().join("content/4.md"), RECTORATE_ARTICLE).unwrap();
    dir
}

pub fn file_source(dir: &TempDir) -> Arc<dyn ContentSource> {
    Arc::new(FileSource::new(dir.path()))
}

pub fn map_viewer(dir: &TempDir) -> MapViewer {
    let loader = ContentLoader::new(file_source(dir), ContentCache::new());
    MapViewer::new(ViewerOptions::default(), &EnvConfig::default(), Point::new(800.0, 600.0))
        .with_content_loader(loader)
}

/// Yields to the runtime until `done` holds or two seconds pass
pub async fn wait_until(mut step: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if step() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
