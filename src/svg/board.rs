use crate::core::constants::{SVG_MARKER_IMAGE_SIZE, SVG_PIN_RADIUS};
use crate::core::geo::{LatLng, Point};
use crate::registry::point::PointOfInterest;
use crate::registry::store::PointRegistry;

/// A pin on the static campus canvas, in canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SvgMarker {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    /// Shipped with the canvas; cannot be deleted
    pub built_in: bool,
}

impl SvgMarker {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Canvas rectangle of the image drawn above the pin
    pub fn image_bounds(&self) -> Option<(Point, Point)> {
        self.image.as_ref()?;
        let half = SVG_MARKER_IMAGE_SIZE / 2.0;
        let top = self.y - SVG_MARKER_IMAGE_SIZE - 10.0;
        Some((
            Point::new(self.x - half, top),
            Point::new(self.x + half, top + SVG_MARKER_IMAGE_SIZE),
        ))
    }

    fn contains(&self, point: &Point) -> bool {
        if self.position().distance_to(point) <= SVG_PIN_RADIUS {
            return true;
        }
        self.image_bounds()
            .is_some_and(|(min, max)| point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y)
    }

    /// Drawer record: the registry entry with the same ID supplies the
    /// article, gallery and links; the marker supplies what it shows
    pub fn to_point(&self, registry: &PointRegistry) -> PointOfInterest {
        let mut point = registry
            .get(&self.id)
            .cloned()
            .unwrap_or_else(|| PointOfInterest::new(self.id.clone(), self.title.clone(), LatLng::new(0.0, 0.0)));
        point.title = self.title.clone();
        point.description = self.description.clone().or(point.description);
        point.address = self.address.clone().or(point.address);
        point.image = self.image.clone().or(point.image);
        point
    }
}

/// Markers of the SVG viewer plus the click-to-add mode
#[derive(Debug, Clone, Default)]
pub struct SvgMarkerBoard {
    markers: Vec<SvgMarker>,
    adding: bool,
    next_id: u64,
}

impl SvgMarkerBoard {
    pub fn new(markers: Vec<SvgMarker>) -> Self {
        Self {
            markers,
            adding: false,
            next_id: 1,
        }
    }

    /// The three campus buildings drawn on the canvas
    pub fn campus() -> Self {
        let building = |id: &str, x: f64, y: f64, title: &str, description: &str, address: &str, image: &str| SvgMarker {
            id: id.into(),
            x,
            y,
            title: title.into(),
            description: Some(description.into()),
            address: Some(address.into()),
            image: Some(image.into()),
            built_in: true,
        };
        Self::new(vec![
            building(
                "4",
                1330.0,
                880.0,
                "University rectorate",
                "Main teaching building of the university",
                "Universytetska St, Uzhhorod",
                "rectorat.svg",
            ),
            building(
                "5",
                1400.0,
                670.0,
                "University, Bam campus",
                "University building on Akademika Miroslava Blvd",
                "Akademika Miroslava Blvd, Uzhhorod",
                "bam.svg",
            ),
            building(
                "6",
                1650.0,
                1000.0,
                "Faculty of Physics",
                "Physics and mathematics faculty",
                "Pidhirna St, Uzhhorod",
                "fizfac.svg",
            ),
        ])
    }

    pub fn markers(&self) -> &[SvgMarker] {
        &self.markers
    }

    pub fn get(&self, id: &str) -> Option<&SvgMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    pub fn start_adding(&mut self) {
        self.adding = true;
    }

    pub fn cancel_adding(&mut self) {
        self.adding = false;
    }

    /// In add mode, places a marker at `position` and leaves the mode
    pub fn place(&mut self, position: Point) -> Option<&SvgMarker> {
        if !self.adding {
            return None;
        }
        self.adding = false;

        let mut id = format!("marker-{}", self.next_id);
        while self.get(&id).is_some() {
            self.next_id += 1;
            id = format!("marker-{}", self.next_id);
        }
        self.next_id += 1;

        self.markers.push(SvgMarker {
            id,
            x: position.x,
            y: position.y,
            title: format!("Marker {}", self.markers.len() + 1),
            description: Some("New marker on the map".into()),
            address: Some("Uzhhorod".into()),
            image: None,
            built_in: false,
        });
        log::debug!("placed marker at {:.1}, {:.1}", position.x, position.y);
        self.markers.last()
    }

    /// Removes a user-added marker; built-in markers stay
    pub fn delete(&mut self, id: &str) -> bool {
        match self.markers.iter().position(|m| m.id == id) {
            Some(index) if !self.markers[index].built_in => {
                self.markers.remove(index);
                true
            }
            Some(_) => {
                log::warn!("marker {} is built in and cannot be deleted", id);
                false
            }
            None => false,
        }
    }

    /// Topmost marker whose pin or image covers a canvas position
    pub fn hit_test(&self, position: &Point) -> Option<&SvgMarker> {
        self.markers.iter().rev().find(|m| m.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_mode_places_one_marker() {
        let mut board = SvgMarkerBoard::campus();
        assert!(board.place(Point::new(10.0, 10.0)).is_none());

        board.start_adding();
        let placed = board.place(Point::new(500.0, 400.0)).unwrap();
        assert_eq!(placed.title, "Marker 4");
        assert!(!placed.built_in);
        assert!(!board.is_adding());
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_cancel_adding() {
        let mut board = SvgMarkerBoard::campus();
        board.start_adding();
        board.cancel_adding();
        assert!(board.place(Point::new(1.0, 1.0)).is_none());
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_only_user_markers_are_deleted() {
        let mut board = SvgMarkerBoard::campus();
        assert!(!board.delete("4"));

        board.start_adding();
        let id = board.place(Point::new(5.0, 5.0)).unwrap().id.clone();
        assert!(board.delete(&id));
        assert!(!board.delete(&id));
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_hit_test_covers_pin_and_image() {
        let board = SvgMarkerBoard::campus();
        assert_eq!(board.hit_test(&Point::new(1333.0, 884.0)).unwrap().id, "4");
        // image sits above the pin
        assert_eq!(board.hit_test(&Point::new(1330.0, 840.0)).unwrap().id, "4");
        assert!(board.hit_test(&Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_to_point_merges_registry_record() {
        let mut record = PointOfInterest::new("4", "Rectorate", LatLng::new(48.62, 22.29));
        record.article = true;
        record.gallery = vec!["a.jpg".into()];
        let registry = PointRegistry::from_points(vec![record]);

        let board = SvgMarkerBoard::campus();
        let point = board.get("4").unwrap().to_point(&registry);
        assert_eq!(point.title, "University rectorate");
        assert!(point.has_content());
        assert_eq!(point.gallery.len(), 1);

        let orphan = board.get("6").unwrap().to_point(&registry);
        assert!(!orphan.has_content());
    }
}
