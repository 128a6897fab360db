use std::sync::Arc;

use egui::{Align2, Color32, FontId, Id, Order, Pos2, Rect, RichText, Sense, Ui, Vec2};

use crate::{
    content::source::ContentSource,
    tiles::loader::TilePriority,
    ui::{markdown::show_blocks, style::DrawerStyle, textures::TextureStore},
    viewer::drawer::{ContentState, Drawer, DrawerSection},
};

/// What the user asked the drawer's owner to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerAction {
    None,
    Close,
    /// Delete the selected marker (SVG canvas only)
    Delete,
}

/// Right-hand side panel with the selected point
pub struct DrawerPanel<'a> {
    drawer: &'a mut Drawer,
    textures: &'a mut TextureStore,
    source: Arc<dyn ContentSource>,
    style: DrawerStyle,
    deletable: bool,
}

impl<'a> DrawerPanel<'a> {
    pub fn new(drawer: &'a mut Drawer, textures: &'a mut TextureStore, source: Arc<dyn ContentSource>) -> Self {
        Self {
            drawer,
            textures,
            source,
            style: DrawerStyle::default(),
            deletable: false,
        }
    }

    pub fn style(mut self, style: DrawerStyle) -> Self {
        self.style = style;
        self
    }

    /// Offer a delete button for the selected point
    pub fn deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    pub fn show(mut self, ctx: &egui::Context) -> DrawerAction {
        if !self.drawer.is_open() {
            return DrawerAction::None;
        }
        let Some(point) = self.drawer.selected().cloned() else {
            return DrawerAction::None;
        };

        let mut action = DrawerAction::None;
        let mut open_image = None;
        egui::SidePanel::right("point-drawer")
            .exact_width(self.style.width)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&point.title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✕").on_hover_text("Close").clicked() {
                            action = DrawerAction::Close;
                        }
                    });
                });
                if let Some(description) = point.description.as_deref().filter(|d| !d.is_empty()) {
                    ui.label(RichText::new(description).color(Color32::from_gray(90)));
                }
                ui.separator();

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for section in self.drawer.sections() {
                        if let Some(index) = self.section(ui, section) {
                            open_image = Some(index);
                        }
                        ui.add_space(8.0);
                    }
                    if self.deletable {
                        ui.separator();
                        if ui.button("Delete marker").clicked() {
                            action = DrawerAction::Delete;
                        }
                    }
                });
            });

        if let Some(index) = open_image {
            self.drawer.open_lightbox(index);
        }
        action
    }

    /// Draws one section; returns a gallery index the user clicked
    fn section(&mut self, ui: &mut Ui, section: DrawerSection) -> Option<usize> {
        let ctx = ui.ctx().clone();
        match section {
            DrawerSection::MainImage(path) => {
                let width = ui.available_width();
                match self.textures.asset(&ctx, &self.source, &path, TilePriority::Visible) {
                    Some(texture) => {
                        let size = fit(texture.size_vec2(), Vec2::new(width, self.style.main_image_height));
                        ui.image((texture.id(), size));
                    }
                    None => placeholder(ui, Vec2::new(width, self.style.main_image_height), self.textures.has_failed(&path)),
                }
            }
            DrawerSection::Gallery(images) => {
                let mut clicked = None;
                let thumb = Vec2::splat(self.style.thumbnail_size);
                ui.label(RichText::new("Gallery").strong());
                ui.horizontal_wrapped(|ui| {
                    for (index, path) in images.iter().enumerate() {
                        let response = match self.textures.asset(&ctx, &self.source, path, TilePriority::Visible) {
                            Some(texture) => ui.add(egui::ImageButton::new((texture.id(), thumb))),
                            None => ui.add_sized(thumb, egui::Button::new("…")),
                        };
                        if response.clicked() {
                            clicked = Some(index);
                        }
                    }
                });
                return clicked;
            }
            DrawerSection::Address(address) => {
                ui.label(RichText::new("Address").strong());
                ui.label(address);
            }
            DrawerSection::Coordinates(coordinates) => {
                ui.label(RichText::new("Coordinates").strong());
                ui.monospace(coordinates);
            }
            DrawerSection::Links(links) => {
                ui.label(RichText::new("Links").strong());
                for link in links {
                    let text = if link.text.is_empty() { &link.url } else { &link.text };
                    ui.hyperlink_to(text, &link.url);
                }
            }
            DrawerSection::Article(state) => match state {
                ContentState::None => {}
                ContentState::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading…");
                    });
                }
                ContentState::Ready(content) => {
                    let textures = &mut *self.textures;
                    let source = &self.source;
                    show_blocks(ui, &content.blocks, |ui, url, alt| {
                        let width = ui.available_width();
                        match textures.asset(&ctx, source, url, TilePriority::Visible) {
                            Some(texture) => {
                                let size = fit(texture.size_vec2(), Vec2::new(width, f32::INFINITY));
                                ui.image((texture.id(), size)).on_hover_text(alt);
                            }
                            None => {
                                ui.label(RichText::new(alt).italics());
                            }
                        }
                    });
                }
                ContentState::Unavailable => {
                    ui.label(RichText::new("Content is unavailable").italics());
                }
            },
        }
        None
    }
}

/// Largest size with the image's aspect ratio inside `bounds`
fn fit(image: Vec2, bounds: Vec2) -> Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (bounds.x / image.x).min(bounds.y / image.y);
    image * scale
}

fn placeholder(ui: &mut Ui, size: Vec2, failed: bool) {
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    ui.painter().rect_filled(rect, 4.0, Color32::from_gray(230));
    let text = if failed { "Image unavailable" } else { "Loading…" };
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(12.0),
        Color32::from_gray(120),
    );
}

/// Full-screen gallery viewer over everything else
pub fn show_lightbox(
    ctx: &egui::Context,
    drawer: &mut Drawer,
    textures: &mut TextureStore,
    source: &Arc<dyn ContentSource>,
    style: &DrawerStyle,
) {
    let Some(path) = drawer.lightbox_image().map(str::to_string) else {
        return;
    };
    let counter = drawer.lightbox().counter();
    let index = drawer.lightbox().index();
    let last = drawer.lightbox().len().saturating_sub(1);

    egui::Area::new(Id::new("gallery-lightbox"))
        .order(Order::Foreground)
        .fixed_pos(Pos2::ZERO)
        .show(ctx, |ui| {
            let screen = ctx.screen_rect();
            let backdrop = ui.allocate_rect(screen, Sense::click());
            ui.painter().rect_filled(screen, 0.0, style.lightbox_backdrop);

            let image_rect = match textures.asset(ctx, source, &path, TilePriority::Visible) {
                Some(texture) => {
                    let size = fit(texture.size_vec2(), screen.size() * 0.85);
                    let rect = Rect::from_center_size(screen.center(), size);
                    ui.painter().image(
                        texture.id(),
                        rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                    rect
                }
                None => {
                    ui.put(
                        Rect::from_center_size(screen.center(), Vec2::splat(40.0)),
                        egui::Spinner::new().size(32.0),
                    );
                    Rect::NOTHING
                }
            };

            ui.painter().text(
                screen.center_bottom() - Vec2::new(0.0, 20.0),
                Align2::CENTER_BOTTOM,
                &counter,
                FontId::proportional(16.0),
                Color32::WHITE,
            );

            let button = |ui: &mut Ui, center: Pos2, label: &str| {
                ui.put(
                    Rect::from_center_size(center, Vec2::splat(44.0)),
                    egui::Button::new(RichText::new(label).size(24.0).color(Color32::WHITE)).frame(false),
                )
                .clicked()
            };
            if button(ui, screen.right_top() + Vec2::new(-32.0, 32.0), "✕") {
                drawer.close_lightbox();
                return;
            }
            if index > 0 && button(ui, screen.left_center() + Vec2::new(40.0, 0.0), "‹") {
                drawer.handle_key(crate::input::events::KeyCode::ArrowLeft);
            }
            if index < last && button(ui, screen.right_center() - Vec2::new(40.0, 0.0), "›") {
                drawer.handle_key(crate::input::events::KeyCode::ArrowRight);
            }

            let outside_image = backdrop
                .interact_pointer_pos()
                .is_some_and(|pos| !image_rect.contains(pos));
            if backdrop.clicked() && outside_image {
                drawer.close_lightbox();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let size = fit(Vec2::new(400.0, 200.0), Vec2::new(100.0, 100.0));
        assert_eq!(size, Vec2::new(100.0, 50.0));

        let tall = fit(Vec2::new(100.0, 400.0), Vec2::new(200.0, 200.0));
        assert_eq!(tall, Vec2::new(50.0, 200.0));
    }

    #[test]
    fn test_fit_ignores_empty_images() {
        assert_eq!(fit(Vec2::ZERO, Vec2::splat(10.0)), Vec2::ZERO);
    }
}
