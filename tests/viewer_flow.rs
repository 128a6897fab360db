mod common;

use std::sync::Arc;

use campusmap::prelude::*;
use campusmap::content::markdown::Block;
use common::{file_source, map_viewer, public_dir, wait_until};

/// End-to-end flows of the tile-map viewer against a real public directory
#[cfg(test)]
mod viewer_flow {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_registry_loads_in_background() {
        let dir = public_dir();
        let mut viewer = map_viewer(&dir);
        assert!(viewer.registry().is_empty());

        viewer.load_registry(Arc::new(RegistryLoader::new(file_source(&dir))));
        assert!(wait_until(|| {
            viewer.update(0.016);
            viewer.registry().len() == 3
        })
        .await);

        assert_eq!(viewer.markers().unwrap().markers().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_selecting_point_loads_article() {
        let dir = public_dir();
        let registry = RegistryLoader::new(file_source(&dir)).try_load().await.unwrap();
        let mut viewer = map_viewer(&dir).with_registry(registry);

        assert!(viewer.select_point("4"));
        assert!(viewer.drawer().is_loading());
        assert!(wait_until(|| {
            viewer.update(0.016);
            !viewer.drawer().is_loading()
        })
        .await);

        match viewer.drawer().content() {
            ContentState::Ready(content) => {
                assert!(matches!(content.blocks[0], Block::Heading { level: 1, .. }));
                assert!(content.html.contains("<strong>main</strong>"));
            }
            other => panic!("expected article, got {:?}", other),
        }
        assert_eq!(viewer.markers().unwrap().selected(), Some("4"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_article_reads_unavailable() {
        let dir = public_dir();
        let registry = RegistryLoader::new(file_source(&dir)).try_load().await.unwrap();
        let mut viewer = map_viewer(&dir).with_registry(registry);

        viewer.select_point("7");
        assert!(wait_until(|| {
            viewer.update(0.016);
            !viewer.drawer().is_loading()
        })
        .await);
        assert_eq!(viewer.drawer().content(), &ContentState::Unavailable);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fast_reselection_keeps_latest_point() {
        let dir = public_dir();
        let registry = RegistryLoader::new(file_source(&dir)).try_load().await.unwrap();
        let mut viewer = map_viewer(&dir).with_registry(registry);

        viewer.select_point("4");
        viewer.select_point("7");
        assert!(wait_until(|| {
            viewer.update(0.016);
            !viewer.drawer().is_loading()
        })
        .await);

        assert_eq!(viewer.drawer().selected().unwrap().id, "7");
        assert_eq!(viewer.drawer().content(), &ContentState::Unavailable);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_buildings_menu_flies_to_building() {
        let dir = public_dir();
        let registry = RegistryLoader::new(file_source(&dir)).try_load().await.unwrap();
        let mut viewer = map_viewer(&dir).with_registry(registry);

        viewer.toggle_buildings_menu();
        assert!(viewer.focus_building("8"));
        assert!(!viewer.buildings_menu_open());

        for _ in 0..120 {
            viewer.update(0.05);
        }
        let focus_zoom = viewer.options().focus_zoom;
        assert!((viewer.map().zoom() - focus_zoom).abs() < 1e-6);
        assert!((viewer.map().center().lat - 48.63).abs() < 1e-6);
        assert!((viewer.map().center().lng - 22.31).abs() < 1e-6);
        assert_eq!(viewer.drawer().selected().unwrap().id, "8");
        assert_eq!(viewer.drawer().content(), &ContentState::None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_escape_closes_drawer_and_clears_selection() {
        let dir = public_dir();
        let registry = RegistryLoader::new(file_source(&dir)).try_load().await.unwrap();
        let mut viewer = map_viewer(&dir).with_registry(registry);

        viewer.select_point("8");
        viewer.handle_input(InputEvent::KeyPress { key: KeyCode::Escape });
        assert!(!viewer.drawer().is_open());
        assert_eq!(viewer.markers().unwrap().selected(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_registry_failure_leaves_map_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = map_viewer(&dir);

        viewer.load_registry(Arc::new(RegistryLoader::new(file_source(&dir))));
        assert!(wait_until(|| !viewer.update(0.016)).await);
        assert!(viewer.registry().is_empty());
        assert_eq!(viewer.markers().unwrap().markers().len(), 0);
    }
}
