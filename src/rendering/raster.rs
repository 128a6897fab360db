//! Decoding of marker images, gallery images, tiles and the SVG base map
//! into plain RGBA buffers the front end can upload as textures.

use crate::{MapError, Result};
use resvg::{tiny_skia, usvg};

/// Largest side, in pixels, an SVG document is rasterized to
pub const DEFAULT_SVG_MAX_SIDE: u32 = 4096;

/// A decoded image, straight (non-premultiplied) RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    /// Converts to luminance while keeping alpha, for the greyscale tile look
    pub fn into_greyscale(self) -> Self {
        let mut pixels = self.pixels;
        for px in pixels.chunks_exact_mut(4) {
            let luma = (0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32)
                .round()
                .clamp(0.0, 255.0) as u8;
            px[0] = luma;
            px[1] = luma;
            px[2] = luma;
        }
        Self { pixels, ..self }
    }
}

/// Whether the resource looks like an SVG document, by name or by content
pub fn is_svg(path: &str, bytes: &[u8]) -> bool {
    if path.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Decodes PNG/JPEG/WebP bytes, or rasterizes SVG documents
pub fn decode(path: &str, bytes: &[u8]) -> Result<RasterImage> {
    if is_svg(path, bytes) {
        rasterize_svg(bytes, DEFAULT_SVG_MAX_SIDE)
    } else {
        decode_bitmap(bytes)
    }
}

pub fn decode_bitmap(bytes: &[u8]) -> Result<RasterImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| MapError::Render(format!("image decode failed: {}", e)))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(RasterImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

/// Rasterizes an SVG document at its intrinsic size, scaled down so the
/// longer side does not exceed `max_side`
pub fn rasterize_svg(bytes: &[u8], max_side: u32) -> Result<RasterImage> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| MapError::Render(format!("svg parse failed: {}", e)))?;

    let size = tree.size();
    let longest = size.width().max(size.height());
    if longest <= 0.0 {
        return Err(MapError::Render("svg has an empty canvas".into()));
    }
    let scale = (max_side as f32 / longest).min(1.0);
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MapError::Render(format!("cannot allocate {}x{} pixmap", width, height)))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Ok(RasterImage {
        width,
        height,
        pixels,
    })
}
