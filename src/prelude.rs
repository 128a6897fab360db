//! Prelude module for common campusmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use campusmap::prelude::*;`

pub use crate::core::{
    config::{MarkerScaling, SvgCanvasOptions, TileBackground, ViewerOptions, ViewerPreset, ZoomTrigger},
    controller::{MapHandle, ViewportController},
    env::EnvConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions},
    paths::BasePath,
    viewport::Viewport,
};

pub use crate::layers::{
    base::LayerTrait,
    manager::LayerManager,
    marker::{MarkerIcon, MarkerLayer},
    style::{VectorOverlay, VectorStyle, ZoomCurve},
    tile::TileLayer,
};

pub use crate::input::events::{EventHandled, InputEvent, KeyCode, MapEvent};

pub use crate::content::{
    cache::ContentCache,
    loader::{ContentLoader, PointContent},
    source::{ContentSource, FileSource, HttpSource},
};

pub use crate::registry::{
    point::{PointLink, PointOfInterest},
    store::{PointRegistry, RegistryLoader},
};

pub use crate::svg::{
    board::{SvgMarker, SvgMarkerBoard},
    viewport::{SvgTool, SvgViewport, ViewerMode},
};

pub use crate::viewer::{
    drawer::{ContentState, Drawer, DrawerSection, Lightbox},
    MapViewer, SvgViewer,
};

#[cfg(feature = "egui")]
pub use crate::ui::{map_action_bar, svg_toolbar, DrawerAction, DrawerPanel, MapStyle, MapView, SvgView, TextureStore};

pub use crate::rendering::context::{DrawCommand, RenderContext};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;
