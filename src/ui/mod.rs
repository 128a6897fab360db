//! egui front end: the map and SVG canvases, the drawer, the lightbox and
//! the action bars. Every widget only translates input and paints; state
//! lives in `MapViewer` and `SvgViewer`.

pub mod controls;
pub mod drawer;
pub mod map_view;
pub mod markdown;
pub mod style;
pub mod svg_view;
pub mod textures;

pub use controls::{map_action_bar, svg_toolbar};
pub use drawer::{show_lightbox, DrawerAction, DrawerPanel};
pub use map_view::MapView;
pub use style::{AttributionStyle, CanvasStyle, DrawerStyle, MapStyle, MapThemes, MarkerStyle, ZoomControlStyle};
pub use svg_view::SvgView;
pub use textures::TextureStore;

use egui::{Key, Pos2, Rect};

use crate::core::geo::Point;
use crate::input::events::KeyCode;

const KEY_BINDINGS: [(Key, KeyCode); 6] = [
    (Key::Escape, KeyCode::Escape),
    (Key::ArrowLeft, KeyCode::ArrowLeft),
    (Key::ArrowRight, KeyCode::ArrowRight),
    (Key::Plus, KeyCode::Plus),
    (Key::Equals, KeyCode::Plus),
    (Key::Minus, KeyCode::Minus),
];

/// Keys pressed this frame that the viewers understand
pub fn pressed_keys(ctx: &egui::Context) -> Vec<KeyCode> {
    let mut keys: Vec<KeyCode> = ctx.input(|i| {
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, code)| *code)
            .collect()
    });
    keys.dedup();
    keys
}

/// Screen position relative to the widget's top-left corner
pub fn to_local(rect: Rect, pos: Pos2) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

pub fn to_screen(rect: Rect, point: Point) -> Pos2 {
    Pos2::new(rect.min.x + point.x as f32, rect.min.y + point.y as f32)
}
