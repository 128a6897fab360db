pub mod base;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod style;
pub mod tile;

pub use base::{LayerProperties, LayerTrait, LayerType};
pub use manager::LayerManager;
pub use marker::{marker_size, MapMarker, MarkerIcon, MarkerLayer};
pub use style::{VectorOverlay, VectorStyle, VectorStyleLayer, ZoomCurve};
pub use tile::TileLayer;
