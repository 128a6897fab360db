use crate::core::geo::TileCoord;

/// Anything that can produce raster tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    /// Deepest zoom the provider serves
    fn max_zoom(&self) -> u8;

    fn attribution(&self) -> &str;
}

/// Public OpenStreetMap tile servers, rotating over the a/b/c subdomains.
pub struct OpenStreetMapSource {
    subdomains: Vec<&'static str>,
}

impl OpenStreetMapSource {
    pub fn new() -> Self {
        Self {
            subdomains: vec!["a", "b", "c"],
        }
    }
}

impl Default for OpenStreetMapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OpenStreetMapSource {
    fn url(&self, coord: TileCoord) -> String {
        if self.subdomains.is_empty() {
            return format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                coord.z, coord.x, coord.y
            );
        }

        let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            self.subdomains[idx], coord.z, coord.x, coord.y
        )
    }

    fn max_zoom(&self) -> u8 {
        19
    }

    fn attribution(&self) -> &str {
        "© OpenStreetMap contributors"
    }
}

/// MapTiler's server-side raster rendering of its vector tileset
pub struct MapTilerSource {
    api_key: String,
    map: String,
}

impl MapTilerSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            map: "basic-v2".to_string(),
        }
    }
}

impl TileSource for MapTilerSource {
    fn url(&self, coord: TileCoord) -> String {
        format!(
            "https://api.maptiler.com/maps/{}/256/{}/{}/{}.png?key={}",
            self.map, coord.z, coord.x, coord.y, self.api_key
        )
    }

    fn max_zoom(&self) -> u8 {
        20
    }

    fn attribution(&self) -> &str {
        "© MapTiler © OpenStreetMap contributors"
    }
}

/// Mapbox static raster tiles of a hosted style
pub struct MapboxSource {
    access_token: String,
    style: String,
}

impl MapboxSource {
    /// Light style, as used by the commercial viewer
    pub fn light(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            style: "mapbox/light-v11".to_string(),
        }
    }
}

impl TileSource for MapboxSource {
    fn url(&self, coord: TileCoord) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/256/{}/{}/{}?access_token={}",
            self.style, coord.z, coord.x, coord.y, self.access_token
        )
    }

    fn max_zoom(&self) -> u8 {
        22
    }

    fn attribution(&self) -> &str {
        "© Mapbox © OpenStreetMap contributors"
    }
}
