use crate::{
    core::{
        constants::TILE_SIZE,
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::RenderContext,
    tiles::source::{MapTilerSource, MapboxSource, OpenStreetMapSource, TileSource},
    Result,
};

/// A raster tile layer; the front end fetches the URLs it queues
pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
    /// Draw tiles desaturated, the muted campus background
    greyscale: bool,
}

impl TileLayer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, source: Box<dyn TileSource>) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Tile),
            source,
            greyscale: false,
        }
    }

    /// Greyscale OpenStreetMap background
    pub fn openstreetmap() -> Self {
        Self::new("osm", "OpenStreetMap", Box::new(OpenStreetMapSource::new())).with_greyscale(true)
    }

    pub fn mapbox(access_token: &str) -> Self {
        Self::new("mapbox", "Mapbox Light", Box::new(MapboxSource::light(access_token)))
    }

    pub fn maptiler(api_key: &str) -> Self {
        Self::new("maptiler", "MapTiler", Box::new(MapTilerSource::new(api_key)))
    }

    pub fn with_greyscale(mut self, greyscale: bool) -> Self {
        self.greyscale = greyscale;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    pub fn is_greyscale(&self) -> bool {
        self.greyscale
    }

    pub fn attribution(&self) -> &str {
        self.source.attribution()
    }

    /// Tiles covering the viewport with their screen rectangles.
    /// Past the provider's deepest zoom the deepest tiles are stretched.
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<(TileCoord, (Point, Point))> {
        let zoom = viewport.zoom.max(0.0);
        let z = (zoom.floor() as u8).min(self.source.max_zoom());
        let scale = 2_f64.powf(zoom - z as f64);
        let tile_px = TILE_SIZE as f64 * scale;
        let tiles_per_axis = 1_i64 << z;

        let center = viewport.project(&viewport.center, Some(zoom));
        let half = Point::new(viewport.size.x / 2.0, viewport.size.y / 2.0);
        let origin = center.subtract(&half);

        let clamp = |v: f64| (v.floor() as i64).clamp(0, tiles_per_axis - 1);
        let (min_x, max_x) = (clamp(origin.x / tile_px), clamp((origin.x + viewport.size.x) / tile_px));
        let (min_y, max_y) = (clamp(origin.y / tile_px), clamp((origin.y + viewport.size.y) / tile_px));

        let mut tiles = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let min = Point::new(x as f64 * tile_px - origin.x, y as f64 * tile_px - origin.y);
                let max = Point::new(min.x + tile_px, min.y + tile_px);
                tiles.push((TileCoord::new(x as u32, y as u32, z), (min, max)));
            }
        }
        tiles
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        for (coord, bounds) in self.visible_tiles(viewport) {
            context.render_tile(
                coord,
                self.source.url(coord),
                bounds,
                self.properties.opacity,
                self.greyscale,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::rendering::context::DrawCommand;

    #[test]
    fn test_world_at_zoom_zero_is_one_tile() {
        let layer = TileLayer::openstreetmap();
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(256.0, 256.0));
        let tiles = layer.visible_tiles(&viewport);

        assert_eq!(tiles.len(), 1);
        let (coord, (min, max)) = tiles[0];
        assert_eq!(coord, TileCoord::new(0, 0, 0));
        assert!(min.x.abs() < 1e-9 && min.y.abs() < 1e-9);
        assert!((max.x - 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiles_cover_viewport() {
        let layer = TileLayer::openstreetmap();
        let viewport = Viewport::new(LatLng::new(48.6208, 22.3006), 12.5, Point::new(800.0, 600.0));
        let tiles = layer.visible_tiles(&viewport);

        assert!(tiles.iter().all(|(c, _)| c.z == 12));
        let min_x = tiles.iter().map(|(_, b)| b.0.x).fold(f64::MAX, f64::min);
        let max_x = tiles.iter().map(|(_, b)| b.1.x).fold(f64::MIN, f64::max);
        let min_y = tiles.iter().map(|(_, b)| b.0.y).fold(f64::MAX, f64::min);
        let max_y = tiles.iter().map(|(_, b)| b.1.y).fold(f64::MIN, f64::max);
        assert!(min_x <= 0.0 && max_x >= 800.0);
        assert!(min_y <= 0.0 && max_y >= 600.0);
    }

    #[test]
    fn test_render_queues_greyscale_tiles() {
        let mut layer = TileLayer::openstreetmap();
        let viewport = Viewport::new(LatLng::new(48.6208, 22.3006), 12.0, Point::new(800.0, 600.0));
        let mut context = RenderContext::new(800, 600);
        layer.render(&mut context, &viewport).unwrap();

        assert!(!context.get_drawing_queue().is_empty());
        assert!(context.get_drawing_queue().iter().all(|cmd| matches!(
            cmd,
            DrawCommand::Tile { greyscale: true, url, .. } if url.contains("tile.openstreetmap.org/12/")
        )));
    }
}
