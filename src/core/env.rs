use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::content::source::{ContentSource, FileSource, HttpSource};
use crate::core::paths::BasePath;

/// Deployment settings read from the environment (and a `.env` file, if any)
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub base_path: BasePath,
    pub maptiler_api_key: Option<String>,
    pub mapbox_access_token: Option<String>,
    /// HTTP origin serving the public directory; wins over `data_dir`
    pub data_origin: Option<String>,
    /// Local public directory
    pub data_dir: PathBuf,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_path = match non_empty("CAMPUSMAP_BASE_PATH") {
            Some(val) => BasePath::new(val),
            None => BasePath::default(),
        };

        let data_dir = match non_empty("CAMPUSMAP_DATA_DIR") {
            Some(val) => PathBuf::from(val),
            None => PathBuf::from("public"),
        };

        Self {
            base_path,
            maptiler_api_key: non_empty("CAMPUSMAP_MAPTILER_API_KEY"),
            mapbox_access_token: non_empty("CAMPUSMAP_MAPBOX_ACCESS_TOKEN"),
            data_origin: non_empty("CAMPUSMAP_DATA_ORIGIN"),
            data_dir,
        }
    }

    /// Where points, articles and images are read from
    pub fn content_source(&self) -> Arc<dyn ContentSource> {
        match &self.data_origin {
            Some(origin) => {
                log::debug!("reading content from {}{}", origin, self.base_path.as_str());
                Arc::new(HttpSource::new(origin.clone(), self.base_path.clone()))
            }
            None => {
                log::debug!("reading content from {}", self.data_dir.display());
                Arc::new(FileSource::new(self.data_dir.clone()))
            }
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
