mod common;

use campusmap::prelude::*;
use common::{file_source, public_dir, wait_until};

fn svg_viewer(dir: &tempfile::TempDir) -> SvgViewer {
    let loader = ContentLoader::new(file_source(dir), ContentCache::new());
    SvgViewer::new(SvgCanvasOptions::default(), loader)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_built_in_pin_opens_registry_article() {
    let dir = public_dir();
    let registry = RegistryLoader::new(file_source(&dir)).try_load().await.unwrap();
    let mut viewer = svg_viewer(&dir);
    viewer.set_registry(registry);

    let pin = viewer.viewport().content_to_screen(Point::new(1330.0, 880.0));
    assert!(viewer.handle_input(InputEvent::Click { position: pin }).is_handled());
    assert!(wait_until(|| {
        viewer.update();
        !viewer.drawer().is_loading()
    })
    .await);

    let point = viewer.drawer().selected().unwrap();
    assert_eq!(point.title, "University rectorate");
    assert_eq!(point.gallery.len(), 2);
    assert!(matches!(viewer.drawer().content(), ContentState::Ready(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_background_registry_feeds_pins() {
    let dir = public_dir();
    let mut viewer = svg_viewer(&dir);
    viewer.load_registry(std::sync::Arc::new(RegistryLoader::new(file_source(&dir))));
    assert!(viewer.is_loading_registry());

    assert!(wait_until(|| {
        viewer.update();
        !viewer.is_loading_registry()
    })
    .await);

    let pin = viewer.viewport().content_to_screen(Point::new(1330.0, 880.0));
    viewer.handle_input(InputEvent::Click { position: pin });
    assert_eq!(viewer.drawer().selected().unwrap().title, "University rectorate");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_registry_stops_waiting() {
    let dir = tempfile::tempdir().unwrap();
    let mut viewer = svg_viewer(&dir);
    viewer.load_registry(std::sync::Arc::new(RegistryLoader::new(file_source(&dir))));

    assert!(wait_until(|| !viewer.update()).await);
    assert!(!viewer.is_loading_registry());
}

#[test]
fn test_zoom_tool_keeps_clicked_point_fixed() {
    let dir = public_dir();
    let mut viewer = svg_viewer(&dir);
    viewer.set_tool(SvgTool::ZoomIn);

    let click = Point::new(300.0, 200.0);
    let before = viewer.viewport().screen_to_content(click);
    viewer.handle_input(InputEvent::Click { position: click });
    let after = viewer.viewport().screen_to_content(click);

    assert!((viewer.viewport().scale() - 0.55).abs() < 1e-9);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn test_pan_tool_moves_canvas_only_while_selected() {
    let dir = public_dir();
    let mut viewer = svg_viewer(&dir);
    let start = viewer.viewport().translation();

    viewer.handle_input(InputEvent::Drag {
        delta: Point::new(40.0, 0.0),
    });
    assert_eq!(viewer.viewport().translation(), start);

    viewer.set_tool(SvgTool::Pan);
    viewer.handle_input(InputEvent::Drag {
        delta: Point::new(40.0, -10.0),
    });
    viewer.handle_input(InputEvent::DragEnd);
    let (e, f) = viewer.viewport().translation();
    assert!((e - (start.0 + 40.0)).abs() < 1e-9);
    assert!((f - (start.1 - 10.0)).abs() < 1e-9);
    assert_eq!(viewer.viewport().mode(), ViewerMode::Idle);
}

#[test]
fn test_placed_marker_lands_under_cursor() {
    let dir = public_dir();
    let mut viewer = svg_viewer(&dir);
    viewer.start_adding();

    let click = Point::new(250.0, 150.0);
    let expected = viewer.viewport().screen_to_content(click);
    viewer.handle_input(InputEvent::Click { position: click });

    let placed = viewer.board().markers().last().unwrap();
    assert!(!placed.built_in);
    assert!((placed.x - expected.x).abs() < 1e-6);
    assert!((placed.y - expected.y).abs() < 1e-6);
    assert_eq!(viewer.status(), "Tool: Select | Markers: 4");
}

#[test]
fn test_resize_keeps_canvas_centered() {
    let dir = public_dir();
    let mut viewer = svg_viewer(&dir);
    viewer.handle_input(InputEvent::Resize {
        size: Point::new(1200.0, 900.0),
    });

    assert_eq!(viewer.viewport().viewer_size(), (1200.0, 900.0));
    let (min, max) = viewer.viewport().content_screen_bounds();
    assert!(((min.x + max.x) / 2.0 - 600.0).abs() < 1e-9);
    assert!(((min.y + max.y) / 2.0 - 450.0).abs() < 1e-9);
}
