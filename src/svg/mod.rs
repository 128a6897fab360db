//! Pan/zoom over the static campus SVG and the pins drawn on it

pub mod board;
pub mod viewport;

pub use board::{SvgMarker, SvgMarkerBoard};
pub use viewport::{click_to_content, SvgTool, SvgViewport, ViewerMode};
