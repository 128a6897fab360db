//! Configuration for the viewer
//!
//! One options object drives every viewer variant. Presets resolve to a full
//! `ViewerOptions`, the same way a performance profile resolves to concrete
//! engine settings; callers can then adjust individual fields.

use crate::core::constants::*;
use crate::core::geo::LatLng;

/// When marker icons are recomputed during a zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomTrigger {
    /// On every zoom event while the gesture runs (smoother, more work)
    Continuous,
    /// Only once the zoom gesture has ended
    GestureEnd,
}

/// Parameters of the zoom-driven marker icon size
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerScaling {
    pub base_size: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub scale_factor: f64,
    /// Duration of the visual size transition, seconds
    pub animation_duration: f64,
    pub trigger: ZoomTrigger,
}

impl MarkerScaling {
    /// Icons that never change size, whatever the zoom
    pub fn fixed(size: f64) -> Self {
        Self {
            base_size: size,
            min_size: size,
            max_size: size,
            scale_factor: 0.0,
            animation_duration: 0.0,
            trigger: ZoomTrigger::GestureEnd,
        }
    }
}

impl Default for MarkerScaling {
    fn default() -> Self {
        Self {
            base_size: MARKER_BASE_SIZE,
            min_size: MARKER_MIN_SIZE,
            max_size: MARKER_MAX_SIZE,
            scale_factor: MARKER_SCALE_FACTOR,
            animation_duration: MARKER_ANIMATION_SECS,
            trigger: ZoomTrigger::GestureEnd,
        }
    }
}

/// Map background used by a tile viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileBackground {
    /// OpenStreetMap raster tiles, with the vector style overlay available as a toggle
    OpenStreetMap,
    /// Mapbox raster tiles; requires an access token
    Mapbox,
}

/// Options of the static SVG campus canvas
#[derive(Debug, Clone, PartialEq)]
pub struct SvgCanvasOptions {
    pub content_width: f64,
    pub content_height: f64,
    pub initial_scale: f64,
    pub initial_viewer_width: f64,
    pub initial_viewer_height: f64,
    pub min_viewer_width: f64,
    pub min_viewer_height: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Path of the base SVG, relative to the public root
    pub background: String,
}

impl Default for SvgCanvasOptions {
    fn default() -> Self {
        Self {
            content_width: SVG_CONTENT_WIDTH,
            content_height: SVG_CONTENT_HEIGHT,
            initial_scale: SVG_INITIAL_SCALE,
            initial_viewer_width: SVG_INITIAL_VIEWER_WIDTH,
            initial_viewer_height: SVG_INITIAL_VIEWER_HEIGHT,
            min_viewer_width: SVG_MIN_VIEWER_WIDTH,
            min_viewer_height: SVG_MIN_VIEWER_HEIGHT,
            min_scale: SVG_MIN_SCALE,
            max_scale: SVG_MAX_SCALE,
            background: "uzhhorod-map.svg".to_string(),
        }
    }
}

/// Everything a viewer variant can be configured with
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub background: TileBackground,
    /// Start with the vector style overlay instead of greyscale raster tiles
    pub use_vector_tiles: bool,
    /// Initial state of pointer-drag panning
    pub drag_enabled: bool,
    /// Whether the user may toggle dragging from the action bar
    pub drag_toggle: bool,
    pub markers: MarkerScaling,
    pub focus_zoom: f64,
    pub fly_duration_secs: f64,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        ViewerPreset::default().resolve()
    }
}

/// Ready-made viewer configurations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewerPreset {
    /// OSM/vector tile viewer, icons resize continuously while zooming
    #[default]
    Campus,
    /// Same viewer, icons resize once the zoom gesture ends
    CampusStatic,
    /// Mapbox tiles, fixed-size icons, drag can be locked
    Commercial,
    Custom(ViewerOptions),
}

impl ViewerPreset {
    pub fn resolve(&self) -> ViewerOptions {
        let campus = ViewerOptions {
            initial_center: LatLng::new(CAMPUS_CENTER_LAT, CAMPUS_CENTER_LNG),
            initial_zoom: CAMPUS_ZOOM,
            min_zoom: 1.0,
            max_zoom: RASTER_MAX_ZOOM,
            background: TileBackground::OpenStreetMap,
            use_vector_tiles: true,
            drag_enabled: true,
            drag_toggle: false,
            markers: MarkerScaling {
                trigger: ZoomTrigger::Continuous,
                ..MarkerScaling::default()
            },
            focus_zoom: BUILDING_FOCUS_ZOOM,
            fly_duration_secs: FLY_TO_DURATION_SECS,
        };

        match self {
            Self::Campus => campus,
            Self::CampusStatic => ViewerOptions {
                markers: MarkerScaling::default(),
                ..campus
            },
            Self::Commercial => ViewerOptions {
                background: TileBackground::Mapbox,
                use_vector_tiles: false,
                drag_toggle: true,
                markers: MarkerScaling::fixed(COMMERCIAL_MARKER_SIZE),
                ..campus
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_presets() {
        let campus = ViewerPreset::Campus.resolve();
        let still = ViewerPreset::CampusStatic.resolve();
        let commercial = ViewerPreset::Commercial.resolve();

        assert_eq!(campus.initial_center, LatLng::new(48.6208, 22.3006));
        assert_eq!(campus.initial_zoom, 12.0);
        assert!(campus.use_vector_tiles);
        assert_eq!(campus.markers.trigger, ZoomTrigger::Continuous);

        assert_eq!(still.markers.trigger, ZoomTrigger::GestureEnd);
        assert_eq!(still.initial_center, campus.initial_center);

        assert_eq!(commercial.background, TileBackground::Mapbox);
        assert!(commercial.drag_toggle);
        assert_eq!(commercial.markers.min_size, commercial.markers.max_size);
    }

    #[test]
    fn test_marker_scaling_defaults() {
        let scaling = MarkerScaling::default();
        assert_eq!(scaling.base_size, 64.0);
        assert_eq!(scaling.min_size, 20.0);
        assert_eq!(scaling.max_size, 300.0);
        assert_eq!(scaling.scale_factor, 0.5);
        assert_eq!(scaling.animation_duration, 0.2);
    }

    #[test]
    fn test_custom_preset_passthrough() {
        let mut options = ViewerOptions::default();
        options.initial_zoom = 15.0;
        let resolved = ViewerPreset::Custom(options.clone()).resolve();
        assert_eq!(resolved, options);
    }
}
