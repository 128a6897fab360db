//! Point registry: the `data/points.json` document and lookups by point ID

pub mod point;
pub mod store;

pub use point::{PointLink, PointOfInterest};
pub use store::{PointRegistry, PointsDocument, RegistryLoader};
