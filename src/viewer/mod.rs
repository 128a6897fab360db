//! The tile-map viewer: one state machine behind every map variant.
//!
//! `MapViewer` owns the map and the marker/overlay layers, turns user
//! intent into viewport commands through the `ViewportController`, and keeps
//! the drawer in sync with the selected point. It is driven by the front end
//! once per frame through `handle_input` and `update`.

pub mod drawer;
pub mod svg;

use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    content::{cache::ContentCache, loader::ContentLoader},
    core::{
        config::{TileBackground, ViewerOptions},
        controller::ViewportController,
        env::EnvConfig,
        geo::Point,
        map::{Map, MapOptions},
        viewport::Viewport,
    },
    input::events::{EventHandled, InputEvent, KeyCode, MapEvent},
    layers::{
        base::LayerTrait,
        marker::{MarkerLayer, MARKER_LAYER_ID},
        style::{VectorOverlay, VectorStyle, VECTOR_OVERLAY_ID},
        tile::TileLayer,
    },
    registry::{point::PointOfInterest, store::PointRegistry, store::RegistryLoader},
    rendering::context::RenderContext,
    Result,
};

pub use drawer::{ContentRequests, ContentState, Drawer, DrawerSection, Lightbox};
pub use svg::SvgViewer;

pub(crate) fn spawn_registry_load(loader: Arc<RegistryLoader>) -> Receiver<Arc<PointRegistry>> {
    let (tx, rx) = bounded(1);
    crate::runtime::spawn(async move {
        let _ = tx.send(loader.load().await);
    });
    rx
}

/// The finished registry, if any. A load whose task went away is
/// forgotten so callers stop waiting for it.
pub(crate) fn take_registry(pending: &mut Option<Receiver<Arc<PointRegistry>>>) -> Option<Arc<PointRegistry>> {
    let result = pending.as_ref()?.try_recv();
    match result {
        Ok(registry) => {
            *pending = None;
            Some(registry)
        }
        Err(crossbeam_channel::TryRecvError::Empty) => None,
        Err(crossbeam_channel::TryRecvError::Disconnected) => {
            log::warn!("registry load ended without a result");
            *pending = None;
            None
        }
    }
}

pub struct MapViewer {
    options: ViewerOptions,
    map: Map,
    controller: ViewportController,
    overlay: VectorOverlay,
    /// Raster background layer, if the provider could be set up
    base_layer: Option<String>,
    registry: Arc<PointRegistry>,
    pending_registry: Option<Receiver<Arc<PointRegistry>>>,
    drawer: Drawer,
    requests: ContentRequests,
    buildings_menu_open: bool,
    events: Vec<MapEvent>,
}

impl MapViewer {
    pub fn new(options: ViewerOptions, env: &EnvConfig, size: Point) -> Self {
        let map_options = MapOptions {
            dragging: options.drag_enabled,
            min_zoom: Some(options.min_zoom),
            max_zoom: Some(options.max_zoom),
            ..MapOptions::default()
        };
        let viewport = Viewport::new(options.initial_center, options.initial_zoom, size);
        let mut map = Map::with_options(viewport, map_options);

        let base = match options.background {
            TileBackground::OpenStreetMap => Some(TileLayer::openstreetmap()),
            TileBackground::Mapbox => match env.mapbox_access_token.as_deref() {
                Some(token) => Some(TileLayer::mapbox(token)),
                None => {
                    log::error!("no Mapbox access token configured; the map background will not be drawn");
                    None
                }
            },
        };
        let base_layer = base.and_then(|layer| {
            let id = layer.id().to_string();
            match map.add_layer(Box::new(layer)) {
                Ok(()) => Some(id),
                Err(e) => {
                    log::error!("failed to add the base layer: {}", e);
                    None
                }
            }
        });

        let markers = MarkerLayer::new(options.markers.clone(), options.initial_zoom);
        if let Err(e) = map.add_layer(Box::new(markers)) {
            log::error!("failed to add the marker layer: {}", e);
        }

        let controller = ViewportController::new(options.drag_enabled)
            .with_fly_duration(Duration::from_secs_f64(options.fly_duration_secs));
        let loader = ContentLoader::new(env.content_source(), ContentCache::new());

        let mut viewer = Self {
            overlay: VectorOverlay::new(VectorStyle::campus(env.maptiler_api_key.clone())),
            options,
            map,
            controller,
            base_layer,
            registry: Arc::new(PointRegistry::new()),
            pending_registry: None,
            drawer: Drawer::new(),
            requests: ContentRequests::new(loader),
            buildings_menu_open: false,
            events: Vec::new(),
        };

        if viewer.options.use_vector_tiles {
            viewer.set_vector_tiles(true);
        }
        viewer
    }

    /// Replaces the article loader, e.g. to share a cache between viewers
    pub fn with_content_loader(mut self, loader: ContentLoader) -> Self {
        self.requests = ContentRequests::new(loader);
        self
    }

    pub fn with_registry(mut self, registry: Arc<PointRegistry>) -> Self {
        self.set_registry(registry);
        self
    }

    pub fn set_registry(&mut self, registry: Arc<PointRegistry>) {
        if let Some(markers) = self.map.layer_as_mut::<MarkerLayer>(MARKER_LAYER_ID) {
            markers.set_points(registry.iter());
        }
        self.registry = registry;
    }

    /// Loads the registry in the background; it is applied by `update`
    pub fn load_registry(&mut self, loader: Arc<RegistryLoader>) {
        self.pending_registry = Some(spawn_registry_load(loader));
    }

    fn poll_registry(&mut self) -> bool {
        match take_registry(&mut self.pending_registry) {
            Some(registry) => {
                self.set_registry(registry);
                true
            }
            None => false,
        }
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn registry(&self) -> &Arc<PointRegistry> {
        &self.registry
    }

    pub fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    pub fn drawer_mut(&mut self) -> &mut Drawer {
        &mut self.drawer
    }

    pub fn content_loader(&self) -> &ContentLoader {
        self.requests.loader()
    }

    pub fn has_base_layer(&self) -> bool {
        self.base_layer.is_some()
    }

    pub fn markers(&self) -> Option<&MarkerLayer> {
        self.map.layer_as::<MarkerLayer>(MARKER_LAYER_ID)
    }

    /// Map events of the last `update`
    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    fn open_point(&mut self, point: PointOfInterest) {
        let id = point.id.clone();
        if let Some(ticket) = self.drawer.select(point.clone()) {
            self.requests.request(ticket, point);
        }
        if let Some(markers) = self.map.layer_as_mut::<MarkerLayer>(MARKER_LAYER_ID) {
            markers.set_selected(Some(id));
        }
    }

    /// Opens the drawer on a registry point
    pub fn select_point(&mut self, id: &str) -> bool {
        match self.registry.get(id).cloned() {
            Some(point) => {
                self.open_point(point);
                true
            }
            None => {
                log::warn!("no point with id {}", id);
                false
            }
        }
    }

    pub fn close_drawer(&mut self) {
        self.drawer.close();
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        if self.drawer.is_open() {
            return;
        }
        if let Some(markers) = self.map.layer_as_mut::<MarkerLayer>(MARKER_LAYER_ID) {
            markers.set_selected(None);
        }
    }

    /// Click on a marker opens it; anything else goes to the map
    pub fn click(&mut self, position: Point) -> EventHandled {
        let hit = self
            .markers()
            .and_then(|m| m.hit_test(&position))
            .map(str::to_string);
        match hit {
            Some(id) => {
                self.select_point(&id);
                EventHandled::Handled
            }
            None => self.map.handle_input(InputEvent::Click { position }),
        }
    }

    pub fn handle_input(&mut self, input: InputEvent) -> EventHandled {
        match input {
            InputEvent::KeyPress { key } => self.handle_key(key),
            InputEvent::Click { position } => self.click(position),
            other => self.map.handle_input(other),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> EventHandled {
        if self.drawer.handle_key(key).is_handled() {
            self.sync_selection();
            return EventHandled::Handled;
        }
        if key == KeyCode::Escape && self.buildings_menu_open {
            self.buildings_menu_open = false;
            return EventHandled::Handled;
        }
        self.map.handle_input(InputEvent::KeyPress { key })
    }

    pub fn is_vector_tiles(&self) -> bool {
        self.overlay.is_attached()
    }

    /// Swaps the greyscale raster background for the vector style overlay
    pub fn set_vector_tiles(&mut self, enabled: bool) {
        if self.options.background != TileBackground::OpenStreetMap {
            log::warn!("vector tiles are only available over the OpenStreetMap background");
            return;
        }
        if let Err(e) = self.overlay.set_enabled(&mut self.map, enabled) {
            log::error!("failed to toggle the vector overlay: {}", e);
        }
        let show_raster = !self.overlay.is_attached();
        if let Some(id) = self.base_layer.clone() {
            self.map.with_layer_mut(&id, |layer| layer.set_visible(show_raster));
        }
    }

    pub fn toggle_vector_tiles(&mut self) {
        let enabled = self.is_vector_tiles();
        self.set_vector_tiles(!enabled);
    }

    pub fn drag_enabled(&self) -> bool {
        self.controller.drag_enabled()
    }

    /// Flips pointer dragging where the variant allows it
    pub fn toggle_dragging(&mut self) -> bool {
        if !self.options.drag_toggle {
            return false;
        }
        let enabled = self.controller.drag_enabled();
        self.controller.set_drag_enabled(!enabled);
        true
    }

    /// Flies back to the initial view
    pub fn recenter(&mut self) {
        self.controller
            .center_on(self.options.initial_center, self.options.initial_zoom);
    }

    pub fn zoom_in(&mut self) {
        self.map.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.map.zoom_out();
    }

    pub fn buildings_menu_open(&self) -> bool {
        self.buildings_menu_open
    }

    pub fn toggle_buildings_menu(&mut self) {
        self.buildings_menu_open = !self.buildings_menu_open;
    }

    /// Buildings menu choice: fly to the point, open it, close the menu
    pub fn focus_building(&mut self, id: &str) -> bool {
        let Some(point) = self.registry.get(id).cloned() else {
            log::warn!("no building with id {}", id);
            return false;
        };
        self.controller.center_on(point.position(), self.options.focus_zoom);
        self.open_point(point);
        self.buildings_menu_open = false;
        true
    }

    /// Applies pending commands and finished work, then advances
    /// animations. Returns true while a repaint is needed.
    pub fn update(&mut self, delta_time: f64) -> bool {
        let mut changed = self.poll_registry();
        self.controller.apply(&mut self.map);
        changed |= self.requests.poll_into(&mut self.drawer);
        let animating = self.map.update(delta_time);
        self.events = self.map.drain_events();
        changed || animating || self.drawer.is_loading() || self.pending_registry.is_some()
    }

    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        self.map.render(context)
    }

    /// "Longitude: 22.3006 | Latitude: 48.6208 | Zoom: 12.00"
    pub fn status(&self) -> String {
        let center = self.map.center();
        format!(
            "Longitude: {:.4} | Latitude: {:.4} | Zoom: {:.2}",
            center.lng,
            center.lat,
            self.map.zoom()
        )
    }

    pub fn attribution(&self) -> Option<String> {
        if self.overlay.is_attached() {
            return self
                .map
                .layer_as::<crate::layers::style::VectorStyleLayer>(VECTOR_OVERLAY_ID)
                .and_then(|layer| layer.attribution())
                .map(str::to_string);
        }
        let id = self.base_layer.as_deref()?;
        self.map
            .layer_as::<TileLayer>(id)
            .map(|layer| layer.attribution().to_string())
    }
}
