use egui::{Color32, FontId, Stroke};

use crate::constants::MARKER_FALLBACK_COLOR;
use crate::rendering::context::Color;

/// Converts a draw-queue color into an egui color
pub fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Style configuration for the viewer widgets
#[derive(Debug, Clone)]
pub struct MapStyle {
    /// Background color when no tiles are loaded
    pub background_color: Color32,
    /// Zoom and action buttons
    pub zoom_controls: ZoomControlStyle,
    pub attribution: AttributionStyle,
    pub markers: MarkerStyle,
    pub drawer: DrawerStyle,
    pub canvas: CanvasStyle,
}

/// Style for zoom control buttons
#[derive(Debug, Clone)]
pub struct ZoomControlStyle {
    pub background_color: Color32,
    pub hover_color: Color32,
    pub text_color: Color32,
    pub border_stroke: Stroke,
    pub button_size: f32,
    /// Margin from the top-right corner
    pub margin: f32,
    pub rounding: f32,
}

/// Style for the attribution line at the bottom-left
#[derive(Debug, Clone)]
pub struct AttributionStyle {
    pub text_color: Color32,
    pub background_color: Color32,
    pub font_id: FontId,
    pub padding: f32,
    pub margin: f32,
}

/// Style for point-of-interest icons
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    /// Disc drawn while a marker has no image (or it failed to load)
    pub fallback_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    /// Ring around the selected marker
    pub selected_color: Color32,
}

#[derive(Debug, Clone)]
pub struct DrawerStyle {
    pub width: f32,
    pub thumbnail_size: f32,
    pub main_image_height: f32,
    /// Dimmed backdrop of the lightbox
    pub lightbox_backdrop: Color32,
}

/// Style of the static SVG canvas
#[derive(Debug, Clone)]
pub struct CanvasStyle {
    pub background_color: Color32,
    pub pin_color: Color32,
    pub pin_selected_color: Color32,
    pub label_color: Color32,
    pub label_font: FontId,
    /// Crosshair tint while placing a marker
    pub placing_color: Color32,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(237, 237, 237),
            zoom_controls: ZoomControlStyle::default(),
            attribution: AttributionStyle::default(),
            markers: MarkerStyle::default(),
            drawer: DrawerStyle::default(),
            canvas: CanvasStyle::default(),
        }
    }
}

impl Default for ZoomControlStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgba_unmultiplied(255, 255, 255, 220),
            hover_color: Color32::from_rgb(235, 235, 235),
            text_color: Color32::BLACK,
            border_stroke: Stroke::new(1.0, Color32::from_gray(100)),
            button_size: 30.0,
            margin: 10.0,
            rounding: 3.0,
        }
    }
}

impl Default for AttributionStyle {
    fn default() -> Self {
        Self {
            text_color: Color32::from_gray(120),
            background_color: Color32::from_rgba_unmultiplied(255, 255, 255, 160),
            font_id: FontId::proportional(10.0),
            padding: 3.0,
            margin: 5.0,
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        let [r, g, b, a] = MARKER_FALLBACK_COLOR;
        Self {
            fallback_color: Color32::from_rgba_unmultiplied(r, g, b, a),
            border_color: Color32::WHITE,
            border_width: 2.0,
            selected_color: Color32::from_rgb(250, 204, 21),
        }
    }
}

impl Default for DrawerStyle {
    fn default() -> Self {
        Self {
            width: 400.0,
            thumbnail_size: 80.0,
            main_image_height: 220.0,
            lightbox_backdrop: Color32::from_black_alpha(220),
        }
    }
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(248, 249, 250),
            pin_color: Color32::from_rgb(220, 38, 38),
            pin_selected_color: Color32::from_rgb(37, 99, 235),
            label_color: Color32::from_gray(30),
            label_font: FontId::proportional(13.0),
            placing_color: Color32::from_rgb(22, 163, 74),
        }
    }
}

/// Predefined styles
pub struct MapThemes;

impl MapThemes {
    pub fn light() -> MapStyle {
        MapStyle::default()
    }

    /// Darker chrome for the commercial variant
    pub fn dark() -> MapStyle {
        MapStyle {
            background_color: Color32::from_rgb(40, 40, 40),
            zoom_controls: ZoomControlStyle {
                background_color: Color32::from_rgb(60, 60, 60),
                hover_color: Color32::from_rgb(80, 80, 80),
                text_color: Color32::WHITE,
                border_stroke: Stroke::new(1.0, Color32::from_rgb(120, 120, 120)),
                ..ZoomControlStyle::default()
            },
            attribution: AttributionStyle {
                text_color: Color32::from_rgba_unmultiplied(255, 255, 255, 200),
                background_color: Color32::from_rgba_unmultiplied(0, 0, 0, 100),
                ..AttributionStyle::default()
            },
            ..MapStyle::default()
        }
    }
}
