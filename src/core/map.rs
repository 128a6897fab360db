use std::time::Duration;

use crate::{
    animation::transitions::Flight,
    core::{
        constants::{DEFAULT_ZOOM_DELTA, ZOOM_GESTURE_IDLE_MS},
        controller::MapHandle,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::events::{EventHandled, InputEvent, KeyCode, MapEvent},
    layers::{base::LayerTrait, manager::LayerManager},
    rendering::context::RenderContext,
    Result,
};

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub dragging: bool,
    pub scroll_wheel_zoom: bool,
    pub keyboard: bool,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// Zoom step of the +/- buttons and keys
    pub zoom_delta: f64,
    /// Quiet period after the last zoom step before the gesture counts as ended
    pub gesture_idle: Duration,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            dragging: true,
            scroll_wheel_zoom: true,
            keyboard: true,
            min_zoom: None,
            max_zoom: None,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            gesture_idle: Duration::from_millis(ZOOM_GESTURE_IDLE_MS),
        }
    }
}

/// The geographic map: viewport, layers, animations and the event queue
pub struct Map {
    pub viewport: Viewport,
    layer_manager: LayerManager,
    options: MapOptions,
    events: Vec<MapEvent>,
    flight: Option<Flight>,
    /// Seconds since the last zoom step of the running gesture
    zoom_idle: Option<f64>,
    dragging_now: bool,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::with_options(Viewport::new(center, zoom, size), MapOptions::default())
    }

    pub fn with_options(viewport: Viewport, options: MapOptions) -> Self {
        let mut map = Self {
            viewport,
            layer_manager: LayerManager::new(),
            options,
            events: Vec::new(),
            flight: None,
            zoom_idle: None,
            dragging_now: false,
        };

        if let (Some(min), Some(max)) = (map.options.min_zoom, map.options.max_zoom) {
            map.viewport.set_zoom_limits(min, max);
        }

        map
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn center(&self) -> LatLng {
        self.viewport.center
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    /// Jumps to a view without animation; a zoom change counts as a whole gesture
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.cancel_flight();
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.viewport.set_zoom(zoom);
        self.viewport.set_center(center);

        if self.viewport.zoom != old_zoom {
            let zoom = self.viewport.zoom;
            self.emit(MapEvent::ZoomStart { zoom: old_zoom });
            self.emit(MapEvent::Zoom { zoom });
            self.emit(MapEvent::ZoomEnd { zoom });
        }
        if self.viewport.center != old_center {
            let center = self.viewport.center;
            self.emit(MapEvent::Move { center });
            self.emit(MapEvent::MoveEnd { center });
        }
    }

    /// One step of a zoom gesture, keeping `focus_point` fixed on screen
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        self.cancel_flight();
        let old_zoom = self.viewport.zoom;
        let old_center = self.viewport.center;
        self.viewport.zoom_to(zoom, focus_point);

        if self.viewport.zoom == old_zoom {
            return;
        }
        if self.zoom_idle.is_none() {
            self.emit(MapEvent::ZoomStart { zoom: old_zoom });
        }
        self.zoom_idle = Some(0.0);
        self.emit(MapEvent::Zoom {
            zoom: self.viewport.zoom,
        });
        if self.viewport.center != old_center {
            self.emit(MapEvent::Move {
                center: self.viewport.center,
            });
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom_to(self.viewport.zoom + self.options.zoom_delta, None);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_to(self.viewport.zoom - self.options.zoom_delta, None);
    }

    /// Pans by a drag delta, if dragging is enabled
    pub fn pan_by(&mut self, delta: Point) -> EventHandled {
        if !self.options.dragging {
            return EventHandled::NotHandled;
        }
        self.cancel_flight();
        self.viewport.pan(delta);
        self.dragging_now = true;
        self.emit(MapEvent::Move {
            center: self.viewport.center,
        });
        EventHandled::Handled
    }

    pub fn set_size(&mut self, size: Point) {
        self.viewport.set_size(size);
    }

    pub fn handle_input(&mut self, input: InputEvent) -> EventHandled {
        match input {
            InputEvent::Drag { delta } => self.pan_by(delta),
            InputEvent::DragEnd => {
                if !self.dragging_now {
                    return EventHandled::NotHandled;
                }
                self.dragging_now = false;
                self.emit(MapEvent::MoveEnd {
                    center: self.viewport.center,
                });
                EventHandled::Handled
            }
            InputEvent::Scroll { delta, position } => {
                if !self.options.scroll_wheel_zoom || delta == 0.0 {
                    return EventHandled::NotHandled;
                }
                self.zoom_to(self.viewport.zoom + delta, Some(position));
                EventHandled::Handled
            }
            InputEvent::Click { position } => {
                let lat_lng = self.viewport.pixel_to_lat_lng(&position);
                self.emit(MapEvent::Click {
                    lat_lng,
                    pixel: position,
                });
                EventHandled::Handled
            }
            InputEvent::KeyPress { key } if self.options.keyboard => match key {
                KeyCode::Plus => {
                    self.zoom_in();
                    EventHandled::Handled
                }
                KeyCode::Minus => {
                    self.zoom_out();
                    EventHandled::Handled
                }
                _ => EventHandled::NotHandled,
            },
            InputEvent::KeyPress { .. } => EventHandled::NotHandled,
            InputEvent::Resize { size } => {
                self.set_size(size);
                EventHandled::Handled
            }
        }
    }

    /// Advances flights, gesture detection and layer animations.
    /// Returns true while anything is still moving.
    pub fn update(&mut self, delta_time: f64) -> bool {
        let mut animating = self.advance_flight(delta_time);

        if let Some(idle) = self.zoom_idle.as_mut() {
            *idle += delta_time;
            if *idle >= self.options.gesture_idle.as_secs_f64() {
                self.zoom_idle = None;
                self.emit(MapEvent::ZoomEnd {
                    zoom: self.viewport.zoom,
                });
            } else {
                animating = true;
            }
        }

        animating |= self.layer_manager.update(delta_time);
        animating
    }

    fn advance_flight(&mut self, delta_time: f64) -> bool {
        let Some(flight) = self.flight.as_mut() else {
            return false;
        };

        let old_zoom = self.viewport.zoom;
        let running = flight.update(&mut self.viewport, delta_time);

        if self.viewport.zoom != old_zoom {
            self.emit(MapEvent::Zoom {
                zoom: self.viewport.zoom,
            });
        }
        self.emit(MapEvent::Move {
            center: self.viewport.center,
        });

        if !running {
            self.flight = None;
            self.emit(MapEvent::ZoomEnd {
                zoom: self.viewport.zoom,
            });
            self.emit(MapEvent::MoveEnd {
                center: self.viewport.center,
            });
        }
        running
    }

    fn cancel_flight(&mut self) {
        if let Some(mut flight) = self.flight.take() {
            flight.cancel();
            self.emit(MapEvent::ZoomEnd {
                zoom: self.viewport.zoom,
            });
            self.emit(MapEvent::MoveEnd {
                center: self.viewport.center,
            });
        }
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    fn emit(&mut self, event: MapEvent) {
        self.layer_manager.dispatch(&event);
        self.events.push(event);
    }

    /// Events emitted since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        self.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    /// Removes a layer; returns whether it was present
    pub fn remove_layer(&mut self, layer_id: &str) -> bool {
        if self.layer_manager.remove_layer(layer_id).is_some() {
            self.emit(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
            true
        } else {
            false
        }
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layer_manager.has_layer(layer_id)
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layer_manager.with_layer_mut(layer_id, f)
    }

    pub fn layer_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layer_manager.get_as::<T>(layer_id)
    }

    pub fn layer_as_mut<T: 'static>(&mut self, layer_id: &str) -> Option<&mut T> {
        self.layer_manager.get_as_mut::<T>(layer_id)
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    /// Queues every visible layer for the current view
    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        context.begin_frame();
        self.layer_manager.render(context, &self.viewport)
    }
}

impl MapHandle for Map {
    fn dragging_enabled(&self) -> bool {
        self.options.dragging
    }

    fn set_dragging(&mut self, enabled: bool) {
        self.options.dragging = enabled;
        if !enabled {
            self.dragging_now = false;
        }
    }

    fn fly_to(&mut self, center: LatLng, zoom: f64, duration: Duration) {
        self.cancel_flight();
        self.zoom_idle = None;
        log::debug!("flying to {:?} at zoom {}", center, zoom);
        let flight = Flight::new(&self.viewport, center, zoom, duration.as_secs_f64());
        let (_, target_zoom) = flight.target();
        if target_zoom != self.viewport.zoom {
            self.emit(MapEvent::ZoomStart {
                zoom: self.viewport.zoom,
            });
        }
        self.flight = Some(flight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus_map() -> Map {
        Map::new(LatLng::new(48.6208, 22.3006), 12.0, Point::new(800.0, 600.0))
    }

    fn count(events: &[MapEvent], pred: impl Fn(&MapEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_zoom_gesture_ends_after_idle() {
        let mut map = campus_map();
        map.zoom_to(12.5, Some(Point::new(100.0, 100.0)));
        map.zoom_to(13.0, Some(Point::new(100.0, 100.0)));
        map.update(0.05);

        let events = map.drain_events();
        assert_eq!(count(&events, |e| matches!(e, MapEvent::ZoomStart { .. })), 1);
        assert_eq!(count(&events, |e| matches!(e, MapEvent::Zoom { .. })), 2);
        assert_eq!(count(&events, |e| matches!(e, MapEvent::ZoomEnd { .. })), 0);

        map.update(0.2);
        let events = map.drain_events();
        assert_eq!(events, vec![MapEvent::ZoomEnd { zoom: 13.0 }]);
    }

    #[test]
    fn test_dragging_respects_option() {
        let mut map = campus_map();
        map.set_dragging(false);
        assert_eq!(
            map.handle_input(InputEvent::Drag {
                delta: Point::new(10.0, 0.0)
            }),
            EventHandled::NotHandled
        );
        assert_eq!(map.center(), LatLng::new(48.6208, 22.3006));

        map.set_dragging(true);
        assert!(map
            .handle_input(InputEvent::Drag {
                delta: Point::new(10.0, 0.0)
            })
            .is_handled());
        assert!(map.handle_input(InputEvent::DragEnd).is_handled());
        let events = map.drain_events();
        assert!(matches!(events.last(), Some(MapEvent::MoveEnd { .. })));
    }

    #[test]
    fn test_fly_to_emits_zoom_events_and_lands() {
        let mut map = campus_map();
        let target = LatLng::new(48.6150, 22.2950);
        map.fly_to(target, 17.0, Duration::from_secs(1));

        let mut frames = 0;
        while map.update(1.0 / 30.0) {
            frames += 1;
            assert!(frames < 100);
        }

        assert_eq!(map.zoom(), 17.0);
        assert!((map.center().lat - target.lat).abs() < 1e-9);

        let events = map.drain_events();
        assert_eq!(events.first(), Some(&MapEvent::ZoomStart { zoom: 12.0 }));
        assert_eq!(count(&events, |e| matches!(e, MapEvent::ZoomEnd { .. })), 1);
        assert!(count(&events, |e| matches!(e, MapEvent::Zoom { .. })) > 1);
    }

    #[test]
    fn test_keyboard_zoom_and_clicks() {
        let mut map = campus_map();
        map.handle_input(InputEvent::KeyPress { key: KeyCode::Plus });
        assert_eq!(map.zoom(), 13.0);

        map.handle_input(InputEvent::Click {
            position: Point::new(400.0, 300.0),
        });
        let events = map.drain_events();
        let click = events.iter().find_map(|e| match e {
            MapEvent::Click { lat_lng, .. } => Some(*lat_lng),
            _ => None,
        });
        let click = click.unwrap();
        assert!((click.lat - 48.6208).abs() < 1e-9);
    }

    #[test]
    fn test_set_view_is_a_complete_gesture() {
        let mut map = campus_map();
        map.set_view(LatLng::new(48.0, 22.0), 15.0);
        let events = map.drain_events();
        assert_eq!(count(&events, |e| matches!(e, MapEvent::ZoomStart { .. })), 1);
        assert_eq!(count(&events, |e| matches!(e, MapEvent::ZoomEnd { .. })), 1);
        assert_eq!(count(&events, |e| matches!(e, MapEvent::MoveEnd { .. })), 1);
    }
}
