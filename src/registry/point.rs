use serde::{Deserialize, Serialize};

use crate::core::constants::CONTENT_DIR;
use crate::core::geo::LatLng;

/// External link shown in the drawer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointLink {
    pub url: String,
    pub text: String,
    /// Icon name, e.g. "globe" or "facebook"
    #[serde(default)]
    pub icon: String,
}

/// A point of interest as stored in `data/points.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub id: String,
    pub lng: f64,
    pub lat: f64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<PointLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file: Option<String>,
    /// Has a Markdown article under the conventional content path
    #[serde(default)]
    pub article: bool,
}

impl PointOfInterest {
    pub fn new(id: impl Into<String>, title: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: id.into(),
            lng: position.lng,
            lat: position.lat,
            title: title.into(),
            description: None,
            address: None,
            image: None,
            gallery: Vec::new(),
            links: Vec::new(),
            content_file: None,
            article: false,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Where the article lives: `contentFile` if set, else
    /// `content/{id}.md` for article points, else nowhere
    pub fn content_path(&self) -> Option<String> {
        match &self.content_file {
            Some(file) if !file.trim().is_empty() => Some(file.clone()),
            _ if self.article => Some(format!("{}/{}.md", CONTENT_DIR, self.id)),
            _ => None,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content_path().is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }

    /// Coordinates as shown in the drawer, six decimals
    pub fn coordinates_label(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}
