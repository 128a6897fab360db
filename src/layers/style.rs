//! The campus cartographic style and the overlay that puts it on the map.
//!
//! `VectorStyle` is the declarative layer list (background, water, parks,
//! buildings, ten road classes, place labels) and serializes to a MapLibre
//! style document. Vector tiles are not decoded here: on screen the overlay
//! paints the style background and MapTiler's raster rendering of the same
//! tileset.

use serde_json::{json, Value};

use crate::{
    core::{map::Map, viewport::Viewport},
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        tile::TileLayer,
    },
    rendering::context::{Color, RenderContext},
    Result,
};

pub const VECTOR_OVERLAY_ID: &str = "vector-style";

const GLYPHS_URL: &str = "https://fonts.openmaptiles.org/{fontstack}/{range}.pbf";
const ROAD_COLOR: Color = Color::rgb(0xB5, 0xB5, 0xB5);

/// Piecewise-linear function of zoom, clamped to the end values
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomCurve {
    stops: Vec<(f64, f64)>,
}

impl ZoomCurve {
    /// Stops are sorted by zoom; an empty curve evaluates to 0
    pub fn linear(stops: &[(f64, f64)]) -> Self {
        let mut stops = stops.to_vec();
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { stops }
    }

    pub fn stops(&self) -> &[(f64, f64)] {
        &self.stops
    }

    pub fn evaluate(&self, zoom: f64) -> f64 {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return 0.0;
        };
        if zoom <= first.0 {
            return first.1;
        }
        if zoom >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let ((z0, v0), (z1, v1)) = (pair[0], pair[1]);
            if zoom <= z1 {
                if z1 == z0 {
                    return v1;
                }
                return v0 + (v1 - v0) * (zoom - z0) / (z1 - z0);
            }
        }
        last.1
    }

    /// MapLibre `interpolate` expression
    pub fn to_expression(&self) -> Value {
        let mut expr = vec![json!("interpolate"), json!(["linear"]), json!(["zoom"])];
        for (zoom, value) in &self.stops {
            expr.push(json!(zoom));
            expr.push(json!(value));
        }
        Value::Array(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleLayerKind {
    Background {
        color: Color,
    },
    Fill {
        source_layer: String,
        class: Option<String>,
        color: Color,
        outline: Option<Color>,
    },
    Line {
        source_layer: String,
        class: String,
        color: Color,
        width: ZoomCurve,
        dash: Option<[f64; 2]>,
    },
    Symbol {
        source_layer: String,
        font: String,
        size: f64,
        color: Color,
        halo_color: Color,
        halo_width: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    pub id: String,
    pub kind: StyleLayerKind,
}

impl StyleLayer {
    fn road(class: &str, stops: &[(f64, f64)], dash: Option<[f64; 2]>) -> Self {
        Self {
            id: format!("road-{}", class.replace('_', "-")),
            kind: StyleLayerKind::Line {
                source_layer: "transportation".into(),
                class: class.into(),
                color: ROAD_COLOR,
                width: ZoomCurve::linear(stops),
                dash,
            },
        }
    }

    fn to_json(&self) -> Value {
        let class_filter = |class: &str| json!(["==", "class", class]);
        match &self.kind {
            StyleLayerKind::Background { color } => json!({
                "id": self.id,
                "type": "background",
                "paint": { "background-color": color.to_hex() },
            }),
            StyleLayerKind::Fill {
                source_layer,
                class,
                color,
                outline,
            } => {
                let mut layer = json!({
                    "id": self.id,
                    "type": "fill",
                    "source": "osm",
                    "source-layer": source_layer,
                    "paint": { "fill-color": color.to_hex() },
                });
                if let Some(class) = class {
                    layer["filter"] = class_filter(class);
                }
                if let Some(outline) = outline {
                    layer["paint"]["fill-outline-color"] = json!(outline.to_hex());
                }
                layer
            }
            StyleLayerKind::Line {
                source_layer,
                class,
                color,
                width,
                dash,
            } => {
                let mut layer = json!({
                    "id": self.id,
                    "type": "line",
                    "source": "osm",
                    "source-layer": source_layer,
                    "filter": class_filter(class),
                    "paint": {
                        "line-color": color.to_hex(),
                        "line-width": width.to_expression(),
                    },
                });
                if let Some(dash) = dash {
                    layer["paint"]["line-dasharray"] = json!(dash);
                }
                layer
            }
            StyleLayerKind::Symbol {
                source_layer,
                font,
                size,
                color,
                halo_color,
                halo_width,
            } => json!({
                "id": self.id,
                "type": "symbol",
                "source": "osm",
                "source-layer": source_layer,
                "layout": {
                    "text-field": ["get", "name"],
                    "text-font": [font],
                    "text-size": size,
                },
                "paint": {
                    "text-color": color.to_hex(),
                    "text-halo-color": halo_color.to_hex(),
                    "text-halo-width": halo_width,
                },
            }),
        }
    }
}

/// Declarative cartographic style
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStyle {
    pub name: String,
    pub api_key: Option<String>,
    pub layers: Vec<StyleLayer>,
}

impl VectorStyle {
    /// The muted campus style: grey roads on a light background
    pub fn campus(api_key: Option<String>) -> Self {
        let layers = vec![
            StyleLayer {
                id: "background".into(),
                kind: StyleLayerKind::Background {
                    color: Color::rgb(0xED, 0xED, 0xED),
                },
            },
            StyleLayer {
                id: "water".into(),
                kind: StyleLayerKind::Fill {
                    source_layer: "water".into(),
                    class: None,
                    color: Color::rgb(0x29, 0x62, 0x6B),
                    outline: None,
                },
            },
            StyleLayer {
                id: "landuse-park".into(),
                kind: StyleLayerKind::Fill {
                    source_layer: "landuse".into(),
                    class: Some("park".into()),
                    color: Color::rgb(0xd6, 0xea, 0xdf),
                    outline: None,
                },
            },
            StyleLayer {
                id: "building".into(),
                kind: StyleLayerKind::Fill {
                    source_layer: "building".into(),
                    class: None,
                    color: Color::WHITE,
                    outline: Some(Color::rgb(0xd3, 0xd3, 0xd3)),
                },
            },
            StyleLayer::road("motorway", &[(8.0, 1.0), (14.0, 6.0)], None),
            StyleLayer::road("primary", &[(10.0, 1.0), (16.0, 6.0)], None),
            StyleLayer::road("secondary", &[(10.0, 0.8), (16.0, 4.0)], None),
            StyleLayer::road("tertiary", &[(10.0, 0.8), (16.0, 4.0)], None),
            StyleLayer::road("residential", &[(10.0, 0.5), (16.0, 2.5)], None),
            StyleLayer::road("service", &[(10.0, 0.4), (16.0, 1.5)], None),
            StyleLayer::road("track", &[(12.0, 0.4), (16.0, 1.5)], None),
            StyleLayer::road("path", &[(12.0, 0.3), (16.0, 1.2)], Some([1.0, 1.0])),
            StyleLayer::road("living_street", &[(12.0, 0.6), (16.0, 2.5)], None),
            StyleLayer::road("pedestrian", &[(12.0, 0.5), (16.0, 2.0)], Some([2.0, 1.0])),
            StyleLayer {
                id: "place-labels".into(),
                kind: StyleLayerKind::Symbol {
                    source_layer: "place".into(),
                    font: "Open Sans Regular".into(),
                    size: 12.0,
                    color: Color::rgb(0x33, 0x33, 0x33),
                    halo_color: Color::WHITE,
                    halo_width: 1.0,
                },
            },
        ];

        Self {
            name: "Uzhhorod Custom".into(),
            api_key,
            layers,
        }
    }

    pub fn layer(&self, id: &str) -> Option<&StyleLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn background_color(&self) -> Option<Color> {
        self.layers.iter().find_map(|l| match l.kind {
            StyleLayerKind::Background { color } => Some(color),
            _ => None,
        })
    }

    /// Stroke width of a road class at `zoom`
    pub fn road_width(&self, class: &str, zoom: f64) -> Option<f64> {
        self.layers.iter().find_map(|l| match &l.kind {
            StyleLayerKind::Line { class: c, width, .. } if c == class => Some(width.evaluate(zoom)),
            _ => None,
        })
    }

    pub fn tiles_url(&self) -> String {
        format!(
            "https://api.maptiler.com/tiles/v3/tiles.json?key={}",
            self.api_key.as_deref().unwrap_or_default()
        )
    }

    /// MapLibre style document (version 8)
    pub fn to_style_json(&self) -> Value {
        json!({
            "version": 8,
            "name": self.name,
            "glyphs": GLYPHS_URL,
            "sources": {
                "osm": {
                    "type": "vector",
                    "url": self.tiles_url(),
                    "minzoom": 0,
                    "maxzoom": 14,
                }
            },
            "layers": self.layers.iter().map(StyleLayer::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Map layer drawing a `VectorStyle`
pub struct VectorStyleLayer {
    properties: LayerProperties,
    style: VectorStyle,
    raster: Option<TileLayer>,
}

impl VectorStyleLayer {
    pub fn new(style: VectorStyle) -> Self {
        let raster = match style.api_key.as_deref() {
            Some(key) => Some(TileLayer::maptiler(key)),
            None => {
                log::warn!("no MapTiler API key; vector overlay draws its background only");
                None
            }
        };
        Self {
            properties: LayerProperties::new(VECTOR_OVERLAY_ID, style.name.clone(), LayerType::VectorStyle)
                .with_z_index(1),
            style,
            raster,
        }
    }

    pub fn style(&self) -> &VectorStyle {
        &self.style
    }

    pub fn attribution(&self) -> Option<&str> {
        self.raster.as_ref().map(|r| r.attribution())
    }
}

impl LayerTrait for VectorStyleLayer {
    crate::impl_layer_trait!(VectorStyleLayer, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        if let Some(color) = self.style.background_color() {
            context.fill(color);
        }
        if let Some(raster) = self.raster.as_mut() {
            raster.set_opacity(self.properties.opacity);
            raster.render(context, viewport)?;
        }
        Ok(())
    }
}

/// Owns the attach/detach lifecycle of the style overlay on a map
#[derive(Debug, Clone)]
pub struct VectorOverlay {
    style: VectorStyle,
    attached: bool,
}

impl VectorOverlay {
    pub fn new(style: VectorStyle) -> Self {
        Self {
            style,
            attached: false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn style(&self) -> &VectorStyle {
        &self.style
    }

    /// Adds the overlay; a second attach is a no-op
    pub fn attach(&mut self, map: &mut Map) -> Result<()> {
        if self.attached && map.has_layer(VECTOR_OVERLAY_ID) {
            return Ok(());
        }
        map.add_layer(Box::new(VectorStyleLayer::new(self.style.clone())))?;
        self.attached = true;
        log::debug!("vector overlay attached");
        Ok(())
    }

    /// Removes the overlay if the map still has it; returns whether a removal happened
    pub fn detach(&mut self, map: &mut Map) -> bool {
        self.attached = false;
        if map.has_layer(VECTOR_OVERLAY_ID) {
            log::debug!("vector overlay detached");
            map.remove_layer(VECTOR_OVERLAY_ID)
        } else {
            false
        }
    }

    pub fn set_enabled(&mut self, map: &mut Map, enabled: bool) -> Result<()> {
        if enabled {
            self.attach(map)
        } else {
            self.detach(map);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};
    use crate::input::events::MapEvent;
    use crate::rendering::context::DrawCommand;

    #[test]
    fn test_zoom_curve_clamps_and_interpolates() {
        let style = VectorStyle::campus(None);
        assert_eq!(style.road_width("motorway", 5.0), Some(1.0));
        assert_eq!(style.road_width("motorway", 8.0), Some(1.0));
        assert_eq!(style.road_width("motorway", 11.0), Some(3.5));
        assert_eq!(style.road_width("motorway", 14.0), Some(6.0));
        assert_eq!(style.road_width("motorway", 20.0), Some(6.0));
        assert_eq!(style.road_width("ferry", 12.0), None);

        assert_eq!(ZoomCurve::linear(&[]).evaluate(3.0), 0.0);
    }

    #[test]
    fn test_widths_are_monotonic() {
        let style = VectorStyle::campus(None);
        for class in ["primary", "residential", "path", "pedestrian"] {
            let mut last = 0.0;
            for step in 0..=40 {
                let width = style.road_width(class, step as f64 * 0.5).unwrap();
                assert!(width >= last);
                last = width;
            }
        }
    }

    #[test]
    fn test_style_json_shape() {
        let doc = VectorStyle::campus(Some("abc".into())).to_style_json();
        assert_eq!(doc["version"], 8);
        assert_eq!(
            doc["sources"]["osm"]["url"],
            "https://api.maptiler.com/tiles/v3/tiles.json?key=abc"
        );

        let layers = doc["layers"].as_array().unwrap();
        assert_eq!(layers.len(), 15);
        assert_eq!(layers[0]["paint"]["background-color"], "#ededed");

        let path = layers.iter().find(|l| l["id"] == "road-path").unwrap();
        assert_eq!(path["paint"]["line-dasharray"], json!([1.0, 1.0]));
        assert_eq!(path["filter"], json!(["==", "class", "path"]));
        assert_eq!(
            path["paint"]["line-width"],
            json!(["interpolate", ["linear"], ["zoom"], 12.0, 0.3, 16.0, 1.2])
        );

        let labels = layers.last().unwrap();
        assert_eq!(labels["layout"]["text-font"], json!(["Open Sans Regular"]));
        assert_eq!(labels["paint"]["text-halo-color"], "#ffffff");
    }

    #[test]
    fn test_overlay_detach_is_idempotent() {
        let mut map = Map::new(LatLng::new(48.6208, 22.3006), 12.0, Point::new(800.0, 600.0));
        let mut overlay = VectorOverlay::new(VectorStyle::campus(None));

        overlay.attach(&mut map).unwrap();
        overlay.attach(&mut map).unwrap();
        assert!(map.has_layer(VECTOR_OVERLAY_ID));

        assert!(overlay.detach(&mut map));
        assert!(!overlay.detach(&mut map));

        let removals = map
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, MapEvent::LayerRemove { .. }))
            .count();
        assert_eq!(removals, 1);
        assert!(!overlay.is_attached());
    }

    #[test]
    fn test_keyless_overlay_draws_background_only() {
        let mut layer = VectorStyleLayer::new(VectorStyle::campus(None));
        let viewport = Viewport::new(LatLng::new(48.6208, 22.3006), 12.0, Point::new(800.0, 600.0));
        let mut context = RenderContext::new(800, 600);
        layer.render(&mut context, &viewport).unwrap();

        assert_eq!(
            context.get_drawing_queue(),
            &[DrawCommand::Fill {
                color: Color::rgb(0xED, 0xED, 0xED)
            }]
        );
    }
}
