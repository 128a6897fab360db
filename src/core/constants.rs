//! Engine-wide numbers: tile geometry, the campus defaults and the SVG canvas.
//! Keeping them in a single place makes it easier to tweak the viewer.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Campus center used by every viewer shell.
pub const CAMPUS_CENTER_LAT: f64 = 48.6208;
pub const CAMPUS_CENTER_LNG: f64 = 22.3006;

/// Initial zoom of the tile viewers; doubles as the marker reference zoom.
pub const CAMPUS_ZOOM: f64 = 12.0;

/// Zoom used when focusing a single building from the buildings menu.
pub const BUILDING_FOCUS_ZOOM: f64 = 17.0;

/// Highest zoom served by the raster tile providers.
pub const RASTER_MAX_ZOOM: f64 = 19.0;

/// Programmatic +/- zoom step for the zoom buttons.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Fly-to duration in seconds.
pub const FLY_TO_DURATION_SECS: f64 = 1.0;

/// A zoom gesture ends after this long without another zoom event.
pub const ZOOM_GESTURE_IDLE_MS: u64 = 150;

/// Marker icon sizing.
pub const MARKER_BASE_SIZE: f64 = 64.0;
pub const MARKER_MIN_SIZE: f64 = 20.0;
pub const MARKER_MAX_SIZE: f64 = 300.0;
pub const MARKER_SCALE_FACTOR: f64 = 0.5;
pub const MARKER_ANIMATION_SECS: f64 = 0.2;

/// Fallback marker color (#3B82F6).
pub const MARKER_FALLBACK_COLOR: [u8; 4] = [0x3B, 0x82, 0xF6, 0xFF];

/// Fixed icon size for the commercial tile viewer.
pub const COMMERCIAL_MARKER_SIZE: f64 = 160.0;

/// SVG campus canvas.
pub const SVG_CONTENT_WIDTH: f64 = 3039.0;
pub const SVG_CONTENT_HEIGHT: f64 = 2179.0;
pub const SVG_INITIAL_SCALE: f64 = 0.5;
pub const SVG_INITIAL_VIEWER_WIDTH: f64 = 800.0;
pub const SVG_INITIAL_VIEWER_HEIGHT: f64 = 600.0;
pub const SVG_MIN_VIEWER_WIDTH: f64 = 400.0;
pub const SVG_MIN_VIEWER_HEIGHT: f64 = 300.0;
pub const SVG_ZOOM_IN_FACTOR: f64 = 1.1;
pub const SVG_ZOOM_OUT_FACTOR: f64 = 0.9;
pub const SVG_WHEEL_ZOOM_FACTOR: f64 = 1.06;
pub const SVG_MIN_SCALE: f64 = 0.05;
pub const SVG_MAX_SCALE: f64 = 20.0;

/// SVG marker geometry.
pub const SVG_PIN_RADIUS: f64 = 8.0;
pub const SVG_MARKER_IMAGE_SIZE: f64 = 60.0;
pub const SVG_LABEL_OFFSET: f64 = 15.0;

/// Registry document path, relative to the public root.
pub const POINTS_DOCUMENT: &str = "data/points.json";

/// Conventional directory for point articles.
pub const CONTENT_DIR: &str = "content";
