/// Prefix applied to public assets and page routes when deployed under a sub-path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath {
    base: String,
}

impl BasePath {
    /// Normalizes the prefix: no trailing slash, empty for the root
    pub fn new(base: impl AsRef<str>) -> Self {
        let trimmed = base.as_ref().trim().trim_end_matches('/');
        let base = if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') || trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self { base }
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// `{BASE}/{path}`, with any leading slash of `path` dropped
    pub fn public_path(&self, path: &str) -> String {
        let clean = path.trim_start_matches('/');
        format!("{}/{}", self.base, clean)
    }

    /// `"/"` maps to the base itself (or `/` without one), other routes are prefixed
    pub fn page_path(&self, route: &str) -> String {
        if route.is_empty() || route == "/" {
            return if self.base.is_empty() {
                "/".to_string()
            } else {
                self.base.clone()
            };
        }
        self.public_path(route)
    }
}
