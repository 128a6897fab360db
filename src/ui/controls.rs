//! Action bars above the map and the SVG canvas

use egui::{Button, Id, Layout, Order, RichText, Ui};

use crate::{
    core::config::TileBackground,
    svg::viewport::SvgTool,
    viewer::{MapViewer, SvgViewer},
};

fn status(ui: &mut Ui, text: String) {
    ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
        ui.label(RichText::new(text).monospace().small());
    });
}

/// Vector toggle, drag lock, recenter, buildings menu and the status line
pub fn map_action_bar(ui: &mut Ui, viewer: &mut MapViewer) {
    ui.horizontal(|ui| {
        if viewer.options().background == TileBackground::OpenStreetMap {
            let label = if viewer.is_vector_tiles() {
                "Raster tiles"
            } else {
                "Vector tiles"
            };
            if ui.button(label).clicked() {
                viewer.toggle_vector_tiles();
            }
        }
        if viewer.options().drag_toggle {
            let label = if viewer.drag_enabled() {
                "Lock map"
            } else {
                "Unlock map"
            };
            if ui.button(label).clicked() {
                viewer.toggle_dragging();
            }
        }
        if ui.button("Recenter").clicked() {
            viewer.recenter();
        }
        buildings_menu(ui, viewer);
        status(ui, viewer.status());
    });
}

fn buildings_menu(ui: &mut Ui, viewer: &mut MapViewer) {
    let button = ui.button("Buildings ▾");
    if button.clicked() {
        viewer.toggle_buildings_menu();
    }
    if !viewer.buildings_menu_open() {
        return;
    }

    let mut chosen = None;
    egui::Area::new(Id::new("buildings-menu"))
        .order(Order::Foreground)
        .fixed_pos(button.rect.left_bottom())
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                let registry = viewer.registry();
                if registry.is_empty() {
                    ui.label("No buildings loaded");
                }
                for point in registry.iter() {
                    if ui.selectable_label(false, &point.title).clicked() {
                        chosen = Some(point.id.clone());
                    }
                }
            });
        });
    if let Some(id) = chosen {
        viewer.focus_building(&id);
    }
}

/// Tools, zoom, fit/reset, add/delete marker and the status line
pub fn svg_toolbar(ui: &mut Ui, viewer: &mut SvgViewer) {
    ui.horizontal(|ui| {
        let current = viewer.viewport().tool();
        for tool in SvgTool::ALL {
            if ui.selectable_label(current == tool, tool.label()).clicked() {
                viewer.set_tool(tool);
            }
        }
        ui.separator();

        if ui.button("+").on_hover_text("Zoom in").clicked() {
            viewer.viewport_mut().zoom_in();
        }
        if ui.button("−").on_hover_text("Zoom out").clicked() {
            viewer.viewport_mut().zoom_out();
        }
        if ui.button("Fit").clicked() {
            viewer.viewport_mut().fit_to_viewer();
        }
        if ui.button("Reset").clicked() {
            viewer.viewport_mut().reset();
        }
        ui.separator();

        let adding = viewer.board().is_adding();
        if ui.selectable_label(adding, "Add marker").clicked() {
            if adding {
                viewer.cancel_adding();
            } else {
                viewer.start_adding();
            }
        }
        let deletable = viewer.selected().is_some_and(|m| !m.built_in);
        if ui.add_enabled(deletable, Button::new("Delete marker")).clicked() {
            viewer.delete_selected();
        }
        status(ui, viewer.status());
    });
}
