pub mod context;
pub mod raster;

pub use context::{Color, DrawCommand, RenderContext};
pub use raster::RasterImage;
