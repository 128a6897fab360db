use std::sync::Arc;

use egui::{Color32, Rect, Response, Sense, Stroke, Ui, Vec2, Widget};

use crate::{
    content::source::ContentSource,
    core::geo::Point,
    input::events::InputEvent,
    rendering::context::{DrawCommand, RenderContext},
    tiles::loader::TilePriority,
    ui::{
        pressed_keys,
        style::{color32, MapStyle},
        textures::TextureStore,
        to_local, to_screen,
    },
    viewer::MapViewer,
};

/// Zoom levels per point of wheel scroll
const SCROLL_ZOOM_PER_POINT: f64 = 1.0 / 120.0;

const FULL_UV: Rect = Rect::from_min_max(egui::Pos2::ZERO, egui::Pos2::new(1.0, 1.0));

/// Map widget: forwards pointer and keyboard input to a `MapViewer`,
/// advances it and paints its draw queue.
///
/// ```ignore
/// ui.add(MapView::new(&mut viewer, &mut textures));
/// ```
pub struct MapView<'a> {
    viewer: &'a mut MapViewer,
    textures: &'a mut TextureStore,
    style: MapStyle,
    show_controls: bool,
    show_attribution: bool,
}

impl<'a> MapView<'a> {
    pub fn new(viewer: &'a mut MapViewer, textures: &'a mut TextureStore) -> Self {
        Self {
            viewer,
            textures,
            style: MapStyle::default(),
            show_controls: true,
            show_attribution: true,
        }
    }

    pub fn style(mut self, style: MapStyle) -> Self {
        self.style = style;
        self
    }

    /// Show the +/− buttons (default: true)
    pub fn controls(mut self, show: bool) -> Self {
        self.show_controls = show;
        self
    }

    pub fn attribution(mut self, show: bool) -> Self {
        self.show_attribution = show;
        self
    }

    fn zoom_rects(&self, rect: Rect) -> [Rect; 2] {
        let s = &self.style.zoom_controls;
        let x = -(s.margin + s.button_size);
        [
            Rect::from_min_size(rect.right_top() + Vec2::new(x, s.margin), Vec2::splat(s.button_size)),
            Rect::from_min_size(
                rect.right_top() + Vec2::new(x, s.margin + s.button_size + 5.0),
                Vec2::splat(s.button_size),
            ),
        ]
    }

    fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let controls = self.zoom_rects(rect);
        let show_controls = self.show_controls;
        let on_controls = |pos: egui::Pos2| show_controls && controls.iter().any(|r| r.contains(pos));

        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.viewer.handle_input(InputEvent::Drag {
                    delta: Point::new(delta.x as f64, delta.y as f64),
                });
            }
        }
        if response.drag_released() {
            self.viewer.handle_input(InputEvent::DragEnd);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos().filter(|p| !on_controls(*p)) {
                self.viewer.handle_input(InputEvent::Click {
                    position: to_local(rect, pos),
                });
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y) as f64;
            if scroll.abs() > 0.1 {
                if let Some(pos) = response.hover_pos() {
                    self.viewer.handle_input(InputEvent::Scroll {
                        delta: scroll * SCROLL_ZOOM_PER_POINT,
                        position: to_local(rect, pos),
                    });
                }
            }
        }
    }

    fn paint_command(&mut self, ui: &Ui, rect: Rect, source: &Arc<dyn ContentSource>, command: &DrawCommand) {
        let painter = ui.painter_at(rect);
        match command {
            DrawCommand::Fill { color } => {
                painter.rect_filled(rect, 0.0, color32(*color));
            }
            DrawCommand::Tile {
                url,
                bounds,
                opacity,
                greyscale,
                ..
            } => {
                if let Some(texture) = self.textures.tile(ui.ctx(), url, *greyscale) {
                    let tile_rect = Rect::from_two_pos(to_screen(rect, bounds.0), to_screen(rect, bounds.1));
                    painter.image(
                        texture.id(),
                        tile_rect,
                        FULL_UV,
                        Color32::WHITE.gamma_multiply(*opacity),
                    );
                }
            }
            DrawCommand::Marker {
                position,
                size,
                image,
                selected,
                ..
            } => {
                let center = to_screen(rect, *position);
                let radius = *size as f32 / 2.0;
                let style = &self.style.markers;
                let texture = image
                    .as_deref()
                    .and_then(|path| self.textures.asset(ui.ctx(), source, path, TilePriority::Background));
                match texture {
                    Some(texture) => {
                        let icon = Rect::from_center_size(center, Vec2::splat(*size as f32));
                        painter.image(texture.id(), icon, FULL_UV, Color32::WHITE);
                    }
                    None => {
                        painter.circle_filled(center, radius, style.fallback_color);
                        painter.circle_stroke(center, radius, Stroke::new(style.border_width, style.border_color));
                    }
                }
                if *selected {
                    painter.circle_stroke(center, radius + 3.0, Stroke::new(3.0, style.selected_color));
                }
            }
        }
    }

    fn paint_controls(&mut self, ui: &mut Ui, rect: Rect) {
        let s = self.style.zoom_controls.clone();
        let [zoom_in, zoom_out] = self.zoom_rects(rect);
        for (button, label) in [(zoom_in, "+"), (zoom_out, "−")] {
            let response = ui.allocate_rect(button, Sense::click());
            let fill = if response.hovered() {
                s.hover_color
            } else {
                s.background_color
            };
            ui.painter().rect_filled(button, s.rounding, fill);
            ui.painter().rect_stroke(button, s.rounding, s.border_stroke);
            ui.painter().text(
                button.center(),
                egui::Align2::CENTER_CENTER,
                label,
                egui::FontId::proportional(16.0),
                s.text_color,
            );
            if response.clicked() {
                if label == "+" {
                    self.viewer.zoom_in();
                } else {
                    self.viewer.zoom_out();
                }
            }
        }
    }

    fn paint_attribution(&self, ui: &Ui, rect: Rect) {
        let Some(text) = self.viewer.attribution() else {
            return;
        };
        let s = &self.style.attribution;
        let painter = ui.painter_at(rect);
        let anchor = rect.left_bottom() + Vec2::new(s.margin, -s.margin);
        let text_size = painter
            .layout_no_wrap(text.clone(), s.font_id.clone(), s.text_color)
            .size();
        let background = Rect::from_min_size(anchor - Vec2::new(0.0, text_size.y), text_size).expand(s.padding);
        painter.rect_filled(background, 2.0, s.background_color);
        painter.text(anchor, egui::Align2::LEFT_BOTTOM, text, s.font_id.clone(), s.text_color);
    }
}

impl Widget for MapView<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        let size = Point::new(rect.width() as f64, rect.height() as f64);
        if self.viewer.map().viewport.size != size {
            self.viewer.handle_input(InputEvent::Resize { size });
        }

        self.handle_pointer(ui, rect, &response);
        for key in pressed_keys(ui.ctx()) {
            self.viewer.handle_input(InputEvent::KeyPress { key });
        }

        let dt = ui.input(|i| i.stable_dt) as f64;
        let mut busy = self.viewer.update(dt);
        busy |= self.textures.poll();

        let mut context = RenderContext::new(rect.width().max(1.0) as u32, rect.height().max(1.0) as u32);
        if let Err(e) = self.viewer.render(&mut context) {
            log::error!("map render failed: {}", e);
        }

        ui.painter().rect_filled(rect, 0.0, self.style.background_color);
        let source = Arc::clone(self.viewer.content_loader().source());
        for command in context.get_drawing_queue() {
            self.paint_command(ui, rect, &source, command);
        }

        if self.show_controls {
            self.paint_controls(ui, rect);
        }
        if self.show_attribution {
            self.paint_attribution(ui, rect);
        }

        if busy || self.textures.is_loading() {
            ui.ctx().request_repaint();
        }
        response
    }
}
