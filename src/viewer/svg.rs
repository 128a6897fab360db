//! The static-canvas viewer: SVG pan/zoom, campus pins and the drawer

use std::sync::Arc;

use crate::{
    content::loader::ContentLoader,
    core::{config::SvgCanvasOptions, geo::Point},
    input::events::{EventHandled, InputEvent, KeyCode},
    registry::store::{PointRegistry, RegistryLoader},
    svg::{
        board::{SvgMarker, SvgMarkerBoard},
        viewport::{SvgTool, SvgViewport, ViewerMode},
    },
    viewer::{
        drawer::{ContentRequests, Drawer},
        spawn_registry_load, take_registry,
    },
};
use crossbeam_channel::Receiver;

pub struct SvgViewer {
    viewport: SvgViewport,
    board: SvgMarkerBoard,
    registry: Arc<PointRegistry>,
    pending_registry: Option<Receiver<Arc<PointRegistry>>>,
    drawer: Drawer,
    requests: ContentRequests,
    selected: Option<String>,
}

impl SvgViewer {
    pub fn new(options: SvgCanvasOptions, loader: ContentLoader) -> Self {
        Self {
            viewport: SvgViewport::new(options),
            board: SvgMarkerBoard::campus(),
            registry: Arc::new(PointRegistry::new()),
            pending_registry: None,
            drawer: Drawer::without_coordinates(),
            requests: ContentRequests::new(loader),
            selected: None,
        }
    }

    pub fn with_board(mut self, board: SvgMarkerBoard) -> Self {
        self.board = board;
        self
    }

    /// Registry records supply articles for pins with the same ID
    pub fn set_registry(&mut self, registry: Arc<PointRegistry>) {
        self.registry = registry;
    }

    /// Loads the registry in the background; it is applied by `update`
    pub fn load_registry(&mut self, loader: Arc<RegistryLoader>) {
        self.pending_registry = Some(spawn_registry_load(loader));
    }

    pub fn is_loading_registry(&self) -> bool {
        self.pending_registry.is_some()
    }

    pub fn viewport(&self) -> &SvgViewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut SvgViewport {
        &mut self.viewport
    }

    pub fn board(&self) -> &SvgMarkerBoard {
        &self.board
    }

    pub fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    pub fn drawer_mut(&mut self) -> &mut Drawer {
        &mut self.drawer
    }

    pub fn selected(&self) -> Option<&SvgMarker> {
        self.board.get(self.selected.as_deref()?)
    }

    pub fn set_tool(&mut self, tool: SvgTool) {
        self.viewport.set_tool(tool);
    }

    pub fn start_adding(&mut self) {
        self.board.start_adding();
    }

    pub fn cancel_adding(&mut self) {
        self.board.cancel_adding();
    }

    fn open_marker(&mut self, id: String) {
        let Some(marker) = self.board.get(&id) else {
            return;
        };
        let point = marker.to_point(&self.registry);
        if let Some(ticket) = self.drawer.select(point.clone()) {
            self.requests.request(ticket, point);
        }
        self.selected = Some(id);
    }

    pub fn select_marker(&mut self, id: &str) -> bool {
        if self.board.get(id).is_none() {
            return false;
        }
        self.open_marker(id.to_string());
        true
    }

    /// Deletes the selected pin (user-added ones only) and closes the drawer
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected.clone() else {
            return false;
        };
        if !self.board.delete(&id) {
            return false;
        }
        self.selected = None;
        self.drawer.close();
        true
    }

    /// Screen click: places a pin in add mode, opens a pin under the
    /// cursor, or zooms with the zoom tools
    pub fn click(&mut self, position: Point) -> EventHandled {
        if self.board.is_adding() {
            let content = self.viewport.place_click(position);
            self.board.place(content);
            return EventHandled::Handled;
        }

        if matches!(self.viewport.tool(), SvgTool::Select | SvgTool::Pan) {
            let content = self.viewport.screen_to_content(position);
            if let Some(id) = self.board.hit_test(&content).map(|m| m.id.clone()) {
                self.open_marker(id);
                return EventHandled::Handled;
            }
        }
        self.viewport.click(position)
    }

    /// Escape closes the lightbox, then the drawer, then leaves add mode
    pub fn handle_key(&mut self, key: KeyCode) -> EventHandled {
        if self.drawer.handle_key(key).is_handled() {
            return EventHandled::Handled;
        }
        if key == KeyCode::Escape && self.board.is_adding() {
            self.board.cancel_adding();
            return EventHandled::Handled;
        }
        match key {
            KeyCode::Plus => self.viewport.zoom_in(),
            KeyCode::Minus => self.viewport.zoom_out(),
            _ => return EventHandled::NotHandled,
        }
        EventHandled::Handled
    }

    pub fn handle_input(&mut self, input: InputEvent) -> EventHandled {
        match input {
            InputEvent::Click { position } => self.click(position),
            InputEvent::Drag { delta } => self.viewport.drag(delta),
            InputEvent::DragEnd => {
                self.viewport.settle();
                EventHandled::Handled
            }
            InputEvent::Scroll { delta, position } => {
                self.viewport.scroll(delta, position);
                EventHandled::Handled
            }
            InputEvent::KeyPress { key } => self.handle_key(key),
            InputEvent::Resize { size } => {
                self.viewport.resize(size.x, size.y);
                EventHandled::Handled
            }
        }
    }

    /// Applies finished article requests; true while a repaint is needed
    pub fn update(&mut self) -> bool {
        let mut changed = false;
        if let Some(registry) = take_registry(&mut self.pending_registry) {
            self.set_registry(registry);
            changed = true;
        }
        changed |= self.requests.poll_into(&mut self.drawer);
        changed || self.drawer.is_loading() || self.pending_registry.is_some()
    }

    /// "Tool: Pan • panning | Markers: 3"
    pub fn status(&self) -> String {
        let activity = match self.viewport.mode() {
            ViewerMode::Idle => "",
            ViewerMode::Panning => " • panning",
            ViewerMode::Zooming => " • zooming",
        };
        format!(
            "Tool: {}{} | Markers: {}",
            self.viewport.tool().label(),
            activity,
            self.board.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{cache::ContentCache, source::FileSource};

    fn viewer() -> SvgViewer {
        let loader = ContentLoader::new(Arc::new(FileSource::new("public")), ContentCache::new());
        SvgViewer::new(SvgCanvasOptions::default(), loader)
    }

    #[test]
    fn test_click_selects_pin_under_cursor() {
        let mut viewer = viewer();
        let pin = viewer.viewport().content_to_screen(Point::new(1650.0, 1000.0));

        assert!(viewer.click(pin).is_handled());
        assert_eq!(viewer.selected().unwrap().id, "6");
        assert!(viewer.drawer().is_open());
        assert!(viewer.drawer().sections().iter().all(|s| !matches!(
            s,
            crate::viewer::drawer::DrawerSection::Coordinates(_)
        )));
    }

    #[test]
    fn test_add_mode_then_escape_order() {
        let mut viewer = viewer();
        viewer.start_adding();
        viewer.click(Point::new(100.0, 100.0));
        assert_eq!(viewer.board().len(), 4);
        assert!(!viewer.board().is_adding());

        viewer.start_adding();
        viewer.select_marker("4");
        viewer.handle_key(KeyCode::Escape);
        assert!(!viewer.drawer().is_open());
        assert!(viewer.board().is_adding());
        viewer.handle_key(KeyCode::Escape);
        assert!(!viewer.board().is_adding());
    }

    #[test]
    fn test_delete_selected_user_marker() {
        let mut viewer = viewer();
        viewer.start_adding();
        viewer.click(Point::new(100.0, 100.0));
        let id = viewer.board().markers()[3].id.clone();

        viewer.select_marker("4");
        assert!(!viewer.delete_selected());

        viewer.select_marker(&id);
        assert!(viewer.delete_selected());
        assert!(!viewer.drawer().is_open());
        assert_eq!(viewer.board().len(), 3);
    }

    #[test]
    fn test_status_reflects_tool_and_mode() {
        let mut viewer = viewer();
        assert_eq!(viewer.status(), "Tool: Select | Markers: 3");

        viewer.set_tool(SvgTool::Pan);
        viewer.handle_input(InputEvent::Drag {
            delta: Point::new(3.0, 0.0),
        });
        assert_eq!(viewer.status(), "Tool: Pan • panning | Markers: 3");
        viewer.handle_input(InputEvent::DragEnd);
        assert_eq!(viewer.status(), "Tool: Pan | Markers: 3");
    }
}
