use crate::{
    animation::easing::{lerp, EasingFunction},
    core::{
        config::{MarkerScaling, ZoomTrigger},
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::events::MapEvent,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    registry::point::PointOfInterest,
    rendering::context::RenderContext,
    spatial::index::{HitBox, MarkerIndex},
    Result,
};

pub const MARKER_LAYER_ID: &str = "markers";

/// Clamp that tolerates `min > max` (the minimum wins)
fn clamp_size(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Icon edge length in pixels for `current_zoom`.
///
/// `base * 2^((current - reference) * factor)`, clamped to the configured
/// range. At the reference zoom this is the base size.
pub fn marker_size(current_zoom: f64, reference_zoom: f64, scaling: &MarkerScaling) -> f64 {
    let scale = 2_f64.powf((current_zoom - reference_zoom) * scaling.scale_factor);
    clamp_size(scaling.base_size * scale, scaling.min_size, scaling.max_size)
}

/// Square icon geometry, anchored at its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerIcon {
    pub size: f64,
    pub anchor: Point,
}

impl MarkerIcon {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            anchor: Point::new(size / 2.0, size / 2.0),
        }
    }
}

/// One point drawn by the marker layer
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: String,
    pub position: LatLng,
    /// Icon image path; `None` draws the fallback disc
    pub image: Option<String>,
}

impl MapMarker {
    pub fn from_point(point: &PointOfInterest) -> Self {
        Self {
            id: point.id.clone(),
            position: point.position(),
            image: point.image.clone(),
        }
    }
}

/// Zoom-scaled point icons
pub struct MarkerLayer {
    properties: LayerProperties,
    markers: Vec<MapMarker>,
    scaling: MarkerScaling,
    reference_zoom: f64,
    /// Size currently drawn, and the transition towards `target_size`
    displayed_size: f64,
    start_size: f64,
    target_size: f64,
    elapsed: f64,
    easing: EasingFunction,
    selected: Option<String>,
    index: MarkerIndex,
}

impl MarkerLayer {
    pub fn new(scaling: MarkerScaling, reference_zoom: f64) -> Self {
        let size = marker_size(reference_zoom, reference_zoom, &scaling);
        Self {
            properties: LayerProperties::new(MARKER_LAYER_ID, "Points of interest", LayerType::Marker)
                .with_z_index(10),
            markers: Vec::new(),
            scaling,
            reference_zoom,
            displayed_size: size,
            start_size: size,
            target_size: size,
            elapsed: 0.0,
            easing: EasingFunction::EaseInOutQuad,
            selected: None,
            index: MarkerIndex::new(),
        }
    }

    pub fn with_points<'a>(mut self, points: impl IntoIterator<Item = &'a PointOfInterest>) -> Self {
        self.set_points(points);
        self
    }

    pub fn set_points<'a>(&mut self, points: impl IntoIterator<Item = &'a PointOfInterest>) {
        self.markers = points.into_iter().map(MapMarker::from_point).collect();
        self.index.clear();
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn scaling(&self) -> &MarkerScaling {
        &self.scaling
    }

    pub fn reference_zoom(&self) -> f64 {
        self.reference_zoom
    }

    /// Icon at the size being drawn right now
    pub fn icon(&self) -> MarkerIcon {
        MarkerIcon::new(self.displayed_size)
    }

    pub fn target_size(&self) -> f64 {
        self.target_size
    }

    pub fn is_animating(&self) -> bool {
        self.displayed_size != self.target_size
    }

    fn retarget(&mut self, zoom: f64) {
        let size = marker_size(zoom, self.reference_zoom, &self.scaling);
        if size == self.target_size {
            return;
        }
        self.target_size = size;
        self.start_size = self.displayed_size;
        self.elapsed = 0.0;
        if self.scaling.animation_duration <= 0.0 {
            self.displayed_size = size;
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_selected(&mut self, id: Option<String>) {
        self.selected = id;
    }

    /// Topmost marker under a screen position, as of the last render
    pub fn hit_test(&self, pixel: &Point) -> Option<&str> {
        self.index.hit_test(pixel)
    }
}

impl LayerTrait for MarkerLayer {
    crate::impl_layer_trait!(MarkerLayer, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let size = self.displayed_size;
        let mut boxes = Vec::with_capacity(self.markers.len());

        for (order, marker) in self.markers.iter().enumerate() {
            let pixel = viewport.lat_lng_to_pixel(&marker.position);
            let selected = self.selected.as_deref() == Some(marker.id.as_str());
            context.render_marker(&marker.id, pixel, size, marker.image.clone(), selected);
            boxes.push(HitBox::centered(marker.id.clone(), pixel, size, order));
        }

        self.index.rebuild(boxes);
        Ok(())
    }

    fn on_map_event(&mut self, event: &MapEvent) {
        match (event, self.scaling.trigger) {
            (MapEvent::Zoom { zoom }, ZoomTrigger::Continuous) => self.retarget(*zoom),
            (MapEvent::ZoomEnd { zoom }, _) => self.retarget(*zoom),
            _ => {}
        }
    }

    fn update(&mut self, delta_time: f64) -> bool {
        if !self.is_animating() {
            return false;
        }
        self.elapsed += delta_time;
        let duration = self.scaling.animation_duration;
        let t = if duration > 0.0 {
            (self.elapsed / duration).min(1.0)
        } else {
            1.0
        };
        self.displayed_size = if t >= 1.0 {
            self.target_size
        } else {
            lerp(self.start_size, self.target_size, self.easing.apply(t))
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::context::DrawCommand;

    fn point(id: &str, lat: f64, lng: f64) -> PointOfInterest {
        PointOfInterest::new(id, id, LatLng::new(lat, lng))
    }

    #[test]
    fn test_size_is_base_at_reference_zoom() {
        let scaling = MarkerScaling::default();
        assert_eq!(marker_size(12.0, 12.0, &scaling), 64.0);

        let tight = MarkerScaling {
            max_size: 40.0,
            ..MarkerScaling::default()
        };
        assert_eq!(marker_size(12.0, 12.0, &tight), 40.0);
    }

    #[test]
    fn test_size_formula_and_clamp() {
        let scaling = MarkerScaling::default();
        assert!((marker_size(14.0, 12.0, &scaling) - 128.0).abs() < 1e-9);
        assert!((marker_size(10.0, 12.0, &scaling) - 32.0).abs() < 1e-9);
        assert_eq!(marker_size(30.0, 12.0, &scaling), 300.0);
        assert_eq!(marker_size(0.0, 12.0, &scaling), 20.0);
    }

    #[test]
    fn test_size_is_monotonic_in_zoom() {
        let scaling = MarkerScaling::default();
        let mut last = 0.0;
        for step in 0..=80 {
            let size = marker_size(step as f64 * 0.25, 12.0, &scaling);
            assert!(size >= last);
            last = size;
        }
    }

    #[test]
    fn test_inverted_range_does_not_panic() {
        let scaling = MarkerScaling {
            min_size: 50.0,
            max_size: 10.0,
            ..MarkerScaling::default()
        };
        assert_eq!(marker_size(12.0, 12.0, &scaling), 50.0);
    }

    #[test]
    fn test_fixed_scaling_ignores_zoom() {
        let scaling = MarkerScaling::fixed(160.0);
        assert_eq!(marker_size(3.0, 12.0, &scaling), 160.0);
        assert_eq!(marker_size(19.0, 12.0, &scaling), 160.0);
        assert_eq!(MarkerIcon::new(160.0).anchor, Point::new(80.0, 80.0));
    }

    #[test]
    fn test_gesture_end_trigger_waits_for_zoom_end() {
        let mut layer = MarkerLayer::new(MarkerScaling::default(), 12.0);
        layer.on_map_event(&MapEvent::Zoom { zoom: 14.0 });
        assert_eq!(layer.target_size(), 64.0);

        layer.on_map_event(&MapEvent::ZoomEnd { zoom: 14.0 });
        assert!((layer.target_size() - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_trigger_follows_every_zoom() {
        let scaling = MarkerScaling {
            trigger: ZoomTrigger::Continuous,
            ..MarkerScaling::default()
        };
        let mut layer = MarkerLayer::new(scaling, 12.0);
        layer.on_map_event(&MapEvent::Zoom { zoom: 10.0 });
        assert!((layer.target_size() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_transition_settles_on_target() {
        let mut layer = MarkerLayer::new(MarkerScaling::default(), 12.0);
        layer.on_map_event(&MapEvent::ZoomEnd { zoom: 14.0 });

        assert!(layer.update(0.1));
        let halfway = layer.icon().size;
        assert!(halfway > 64.0 && halfway < 128.0);

        assert!(layer.update(0.2));
        assert!((layer.icon().size - 128.0).abs() < 1e-9);
        assert!(!layer.update(0.016));
    }

    #[test]
    fn test_render_and_hit_test() {
        let viewport = Viewport::new(LatLng::new(48.6208, 22.3006), 12.0, Point::new(800.0, 600.0));
        let points = [point("a", 48.6208, 22.3006), point("b", 48.6208, 22.3006)];
        let mut layer = MarkerLayer::new(MarkerScaling::default(), 12.0).with_points(&points);
        layer.set_selected(Some("a".into()));

        let mut context = RenderContext::new(800, 600);
        layer.render(&mut context, &viewport).unwrap();

        let queue = context.get_drawing_queue();
        assert_eq!(queue.len(), 2);
        assert!(matches!(
            &queue[0],
            DrawCommand::Marker { id, selected: true, size, .. } if id == "a" && *size == 64.0
        ));

        // both icons overlap; the later one is on top
        assert_eq!(layer.hit_test(&Point::new(400.0, 300.0)), Some("b"));
        assert_eq!(layer.hit_test(&Point::new(400.0, 340.0)), None);
    }
}
