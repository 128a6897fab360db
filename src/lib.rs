//! # campusmap
//!
//! An interactive points-of-interest viewer for a university campus.
//!
//! The crate holds everything the viewer needs below the pixels: geographic
//! math, the map viewport and its fly-to animation, zoom-scaled marker icons,
//! a vector style overlay, a pan/zoom viewport for a static SVG campus plan,
//! point registry loading and Markdown content loading with an injectable
//! cache. The `egui` feature adds the widgets that draw all of it.
//!
//! ## Features
//!
//! * `egui` (default): the widgets.
//! * `tokio-runtime` (default): background work shares one multi-thread
//!   tokio runtime. Without it each task runs on its own thread with a
//!   current-thread runtime. `cargo test --no-default-features` checks the
//!   lean build.

pub mod animation;
pub mod content;
pub mod core;
pub mod input;
pub mod layers;
pub mod registry;
pub mod rendering;
pub mod runtime;
pub mod spatial;
pub mod svg;
pub mod tiles;
pub mod viewer;

#[cfg(feature = "egui")]
pub mod ui;

pub mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{MarkerScaling, ViewerOptions, ViewerPreset},
    controller::{MapHandle, ViewportController},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use content::{cache::ContentCache, loader::ContentLoader, source::ContentSource};

pub use layers::{base::LayerTrait, marker::MarkerLayer, style::VectorStyle, tile::TileLayer};

pub use registry::{point::PointOfInterest, store::PointRegistry};

pub use svg::{board::SvgMarkerBoard, viewport::SvgViewport};

pub use viewer::{drawer::Drawer, MapViewer, SvgViewer};

#[cfg(feature = "egui")]
pub use ui::{DrawerPanel, MapView, SvgView, TextureStore};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Content error: {0}")]
    Content(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// Error type alias for convenience
pub type Error = MapError;
