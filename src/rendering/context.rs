use crate::core::geo::{Point, TileCoord};
use serde::{Deserialize, Serialize};

/// RGBA color shared by the style, the markers and the draw queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_array(rgba: [u8; 4]) -> Self {
        Self {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
        }
    }

    /// Parses `#rgb` or `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut parts = digits.chars().map(|c| {
                    let v = c.to_digit(16)? as u8;
                    Some(v * 17)
                });
                Some(Self::rgb(parts.next()??, parts.next()??, parts.next()??))
            }
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole map area
    Fill { color: Color },
    /// A raster tile, addressed by URL so the front end can fetch and cache it
    Tile {
        coord: TileCoord,
        url: String,
        bounds: (Point, Point),
        opacity: f32,
        greyscale: bool,
    },
    /// A point-of-interest icon centered on `position`
    Marker {
        id: String,
        position: Point,
        size: f64,
        image: Option<String>,
        selected: bool,
    },
}

/// Per-frame queue of drawing primitives, translated to pixels by the front end
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub drawing_queue: Vec<DrawCommand>,
    /// Viewport clipping bounds (min, max) in screen coordinates
    pub clip_bounds: Option<(Point, Point)>,
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            clip_bounds: Some((
                Point::new(0.0, 0.0),
                Point::new(width as f64, height as f64),
            )),
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    pub fn fill(&mut self, color: Color) {
        self.drawing_queue.push(DrawCommand::Fill { color });
    }

    /// Queue a tile; tiles completely outside the clip rectangle are skipped
    pub fn render_tile(
        &mut self,
        coord: TileCoord,
        url: String,
        bounds: (Point, Point),
        opacity: f32,
        greyscale: bool,
    ) {
        if !self.is_visible(bounds) {
            return;
        }
        self.drawing_queue.push(DrawCommand::Tile {
            coord,
            url,
            bounds,
            opacity: opacity.clamp(0.0, 1.0),
            greyscale,
        });
    }

    pub fn render_marker(
        &mut self,
        id: &str,
        position: Point,
        size: f64,
        image: Option<String>,
        selected: bool,
    ) {
        let half = size / 2.0;
        let bounds = (
            Point::new(position.x - half, position.y - half),
            Point::new(position.x + half, position.y + half),
        );
        if !self.is_visible(bounds) {
            return;
        }
        self.drawing_queue.push(DrawCommand::Marker {
            id: id.to_string(),
            position,
            size,
            image,
            selected,
        });
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    fn is_visible(&self, (min, max): (Point, Point)) -> bool {
        match self.clip_bounds {
            Some((clip_min, clip_max)) => {
                !(max.x < clip_min.x || min.x > clip_max.x || max.y < clip_min.y || min.y > clip_max.y)
            }
            None => true,
        }
    }
}
