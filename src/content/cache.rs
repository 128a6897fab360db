use std::sync::{Arc, Mutex};

use crate::content::loader::PointContent;
use crate::prelude::HashMap;

/// Rendered articles keyed by point ID.
///
/// Entries live until `clear`; there is no eviction. Clones share storage,
/// so one cache can be handed to several loaders or to a test.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    entries: Arc<Mutex<HashMap<String, Arc<PointContent>>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<PointContent>> {
        self.entries.lock().ok()?.get(id).cloned()
    }

    pub fn set(&self, id: impl Into<String>, content: Arc<PointContent>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id.into(), content);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(id))
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let cache = ContentCache::new();
        let shared = cache.clone();
        shared.set("4", Arc::new(PointContent::from_markdown("hello")));

        assert!(cache.contains("4"));
        assert_eq!(cache.get("4").unwrap().markdown, "hello");

        cache.clear();
        assert!(shared.is_empty());
        assert!(shared.get("4").is_none());
    }
}
