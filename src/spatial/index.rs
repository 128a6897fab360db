use crate::core::geo::Point;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A clickable rectangle in screen space, tagged with the item it belongs to
#[derive(Debug, Clone)]
pub struct HitBox {
    pub id: String,
    pub min: Point,
    pub max: Point,
    /// Draw order; later items sit on top
    pub order: usize,
}

impl HitBox {
    /// A square of side `size` centered on `center`
    pub fn centered(id: impl Into<String>, center: Point, size: f64, order: usize) -> Self {
        let half = size / 2.0;
        Self {
            id: id.into(),
            min: Point::new(center.x - half, center.y - half),
            max: Point::new(center.x + half, center.y + half),
            order,
        }
    }

    fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

impl PartialEq for HitBox {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.order == other.order
    }
}

impl RTreeObject for HitBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min.x, self.min.y], [self.max.x, self.max.y])
    }
}

impl PointDistance for HitBox {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let center = self.center();
        let dx = center.x - point[0];
        let dy = center.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min.x
            && point[0] <= self.max.x
            && point[1] >= self.min.y
            && point[1] <= self.max.y
    }
}

/// R-tree of marker hit boxes, rebuilt whenever the projected markers change
#[derive(Default)]
pub struct MarkerIndex {
    rtree: RTree<HitBox>,
}

impl MarkerIndex {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    /// Bulk-loads a fresh set of hit boxes, replacing the previous ones
    pub fn rebuild(&mut self, boxes: Vec<HitBox>) {
        self.rtree = RTree::bulk_load(boxes);
    }

    pub fn insert(&mut self, hit_box: HitBox) {
        self.rtree.insert(hit_box);
    }

    /// The topmost item under `point`, if any
    pub fn hit_test(&self, point: &Point) -> Option<&str> {
        self.rtree
            .locate_all_at_point(&[point.x, point.y])
            .max_by_key(|hit| hit.order)
            .map(|hit| hit.id.as_str())
    }

    /// Items whose boxes intersect the given screen rectangle
    pub fn query(&self, min: &Point, max: &Point) -> Vec<&HitBox> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}
