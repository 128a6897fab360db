use std::sync::Arc;

use egui::{Align2, Color32, CursorIcon, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2, Widget};

use crate::{
    constants::{SVG_LABEL_OFFSET, SVG_PIN_RADIUS},
    content::source::ContentSource,
    core::geo::Point,
    input::events::InputEvent,
    svg::viewport::{SvgTool, ViewerMode},
    tiles::loader::TilePriority,
    ui::{pressed_keys, style::MapStyle, textures::TextureStore, to_local, to_screen},
    viewer::SvgViewer,
};

/// Wheel steps per point of scroll
const SCROLL_STEPS_PER_POINT: f64 = 1.0 / 50.0;

const FULL_UV: Rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

/// Canvas widget for the static campus plan and its pins
pub struct SvgView<'a> {
    viewer: &'a mut SvgViewer,
    textures: &'a mut TextureStore,
    source: Arc<dyn ContentSource>,
    style: MapStyle,
}

impl<'a> SvgView<'a> {
    pub fn new(viewer: &'a mut SvgViewer, textures: &'a mut TextureStore, source: Arc<dyn ContentSource>) -> Self {
        Self {
            viewer,
            textures,
            source,
            style: MapStyle::default(),
        }
    }

    pub fn style(mut self, style: MapStyle) -> Self {
        self.style = style;
        self
    }

    fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &Response) {
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
            if let Some(pos) = response.interact_pointer_pos() {
                self.viewer.handle_input(InputEvent::Click {
                    position: to_local(rect, pos),
                });
            }
        }

        let scroll = if response.hovered() {
            ui.input(|i| i.raw_scroll_delta.y) as f64
        } else {
            0.0
        };
        match response.hover_pos() {
            Some(pos) if scroll.abs() > 0.1 => {
                self.viewer.handle_input(InputEvent::Scroll {
                    delta: scroll * SCROLL_STEPS_PER_POINT,
                    position: to_local(rect, pos),
                });
            }
            _ if self.viewer.viewport().mode() == ViewerMode::Zooming => {
                self.viewer.viewport_mut().settle();
            }
            _ => {}
        }
    }

    fn paint(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let canvas = &self.style.canvas;
        painter.rect_filled(rect, 0.0, canvas.background_color);

        let viewport = self.viewer.viewport();
        let scale = viewport.scale() as f32;
        let (min, max) = viewport.content_screen_bounds();
        let plan_rect = Rect::from_two_pos(to_screen(rect, min), to_screen(rect, max));
        let background = viewport.options().background.clone();
        match self
            .textures
            .asset(ui.ctx(), &self.source, &background, TilePriority::Visible)
        {
            Some(texture) => {
                painter.image(texture.id(), plan_rect, FULL_UV, Color32::WHITE);
            }
            None => {
                painter.rect_stroke(plan_rect, 0.0, Stroke::new(1.0, Color32::from_gray(200)));
            }
        }

        let selected = self.viewer.selected().map(|m| m.id.clone());
        for marker in self.viewer.board().markers() {
            let pin = to_screen(rect, viewport.content_to_screen(marker.position()));

            if let Some((image_min, image_max)) = marker.image_bounds() {
                let image_rect = Rect::from_two_pos(
                    to_screen(rect, viewport.content_to_screen(image_min)),
                    to_screen(rect, viewport.content_to_screen(image_max)),
                );
                let path = marker.image.as_deref().unwrap_or_default();
                match self.textures.asset(ui.ctx(), &self.source, path, TilePriority::Background) {
                    Some(texture) => painter.image(texture.id(), image_rect, FULL_UV, Color32::WHITE),
                    None => painter.rect_filled(image_rect, 4.0 * scale, Color32::from_gray(225)),
                };
            }

            let fill = if selected.as_deref() == Some(marker.id.as_str()) {
                canvas.pin_selected_color
            } else {
                canvas.pin_color
            };
            let radius = SVG_PIN_RADIUS as f32 * scale;
            painter.circle_filled(pin, radius, fill);
            painter.circle_stroke(pin, radius, Stroke::new(2.0 * scale, Color32::WHITE));

            let mut font = canvas.label_font.clone();
            font.size = (font.size * scale * 2.0).clamp(8.0, 28.0);
            painter.text(
                pin + Vec2::new(0.0, radius + SVG_LABEL_OFFSET as f32 * scale),
                Align2::CENTER_TOP,
                &marker.title,
                font,
                canvas.label_color,
            );
        }

        if self.viewer.board().is_adding() {
            if let Some(pos) = ui.ctx().pointer_hover_pos().filter(|p| rect.contains(*p)) {
                let stroke = Stroke::new(1.0, canvas.placing_color);
                painter.line_segment([Pos2::new(rect.left(), pos.y), Pos2::new(rect.right(), pos.y)], stroke);
                painter.line_segment([Pos2::new(pos.x, rect.top()), Pos2::new(pos.x, rect.bottom())], stroke);
            }
        }
    }
}

impl Widget for SvgView<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        // The viewport clamps and floors its size, so compare against what was last requested
        let size_id = response.id.with("requested-size");
        let last = ui.ctx().memory(|mem| mem.data.get_temp::<Vec2>(size_id));
        if last != Some(rect.size()) {
            self.viewer.handle_input(InputEvent::Resize {
                size: Point::new(rect.width() as f64, rect.height() as f64),
            });
            ui.ctx().memory_mut(|mem| mem.data.insert_temp(size_id, rect.size()));
        }

        self.handle_pointer(ui, rect, &response);
        for key in pressed_keys(ui.ctx()) {
            self.viewer.handle_input(InputEvent::KeyPress { key });
        }

        let mut busy = self.viewer.update();
        busy |= self.textures.poll();
        self.paint(ui, rect);

        let cursor = if self.viewer.board().is_adding() {
            CursorIcon::Crosshair
        } else {
            match self.viewer.viewport().tool() {
                SvgTool::Pan if response.dragged() => CursorIcon::Grabbing,
                SvgTool::Pan => CursorIcon::Grab,
                SvgTool::ZoomIn => CursorIcon::ZoomIn,
                SvgTool::ZoomOut => CursorIcon::ZoomOut,
                SvgTool::Select => CursorIcon::Default,
            }
        };

        if busy || self.textures.is_loading() || self.viewer.viewport().mode() != ViewerMode::Idle {
            ui.ctx().request_repaint();
        }
        response.on_hover_cursor(cursor)
    }
}
