use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use campusmap::{
    content::{cache::ContentCache, loader::ContentLoader, source::ContentSource},
    core::{config::SvgCanvasOptions, env::EnvConfig, geo::Point},
    layers::style::VectorStyle,
    registry::store::RegistryLoader,
    ui::{map_action_bar, show_lightbox, svg_toolbar, DrawerAction, DrawerPanel, MapStyle, MapView, SvgView, TextureStore},
    MapViewer, SvgViewer, ViewerPreset,
};
use clap::Parser;

/// Which viewer to open
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
    /// OSM tiles with the vector style toggle; icons resize while zooming
    Tiles,
    /// Same, but icons resize once the zoom gesture ends
    Static,
    /// Mapbox tiles, fixed icons, drag lock
    Commercial,
    /// The static SVG campus plan
    Svg,
}

/// Interactive campus map
#[derive(clap::Parser, Debug)]
#[command(name = "campusmap", version, about)]
struct Cli {
    #[arg(long, value_enum, default_value_t = Variant::Tiles)]
    variant: Variant,

    /// Public directory with data/points.json, content/ and images
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    data_dir: Option<PathBuf>,

    /// Print the vector style document and exit
    #[arg(long)]
    dump_style: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut env = EnvConfig::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        env.data_dir = dir;
    }

    if cli.dump_style {
        let style = VectorStyle::campus(env.maptiler_api_key.clone());
        println!("{}", serde_json::to_string_pretty(&style.to_style_json())?);
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Campus map"),
        ..Default::default()
    };

    eframe::run_native(
        "campusmap-app",
        options,
        Box::new(move |_cc| Box::new(CampusApp::new(cli.variant, &env))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with an error: {}", e))?;

    Ok(())
}

enum Screen {
    Map(Box<MapViewer>),
    Svg(Box<SvgViewer>),
}

struct CampusApp {
    screen: Screen,
    textures: TextureStore,
    source: Arc<dyn ContentSource>,
    style: MapStyle,
}

impl CampusApp {
    fn new(variant: Variant, env: &EnvConfig) -> Self {
        let source = env.content_source();
        let loader = ContentLoader::new(Arc::clone(&source), ContentCache::new());
        let registry = Arc::new(RegistryLoader::new(Arc::clone(&source)));

        let screen = match variant {
            Variant::Svg => {
                let mut viewer = SvgViewer::new(SvgCanvasOptions::default(), loader);
                viewer.load_registry(registry);
                Screen::Svg(Box::new(viewer))
            }
            map => {
                let preset = match map {
                    Variant::Static => ViewerPreset::CampusStatic,
                    Variant::Commercial => ViewerPreset::Commercial,
                    _ => ViewerPreset::Campus,
                };
                let mut viewer =
                    MapViewer::new(preset.resolve(), env, Point::new(1200.0, 800.0)).with_content_loader(loader);
                viewer.load_registry(registry);
                Screen::Map(Box::new(viewer))
            }
        };

        let style = if variant == Variant::Commercial {
            campusmap::ui::MapThemes::dark()
        } else {
            MapStyle::default()
        };

        log::info!("opening the {:?} viewer", variant);
        Self {
            screen,
            textures: TextureStore::new(),
            source,
            style,
        }
    }
}

impl eframe::App for CampusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Self {
            screen,
            textures,
            source,
            style,
        } = self;

        match screen {
            Screen::Map(viewer) => {
                egui::TopBottomPanel::top("actions").show(ctx, |ui| map_action_bar(ui, viewer));

                let action = DrawerPanel::new(viewer.drawer_mut(), textures, Arc::clone(source))
                    .style(style.drawer.clone())
                    .show(ctx);
                if action == DrawerAction::Close {
                    viewer.close_drawer();
                }
                show_lightbox(ctx, viewer.drawer_mut(), textures, source, &style.drawer);

                egui::CentralPanel::default()
                    .frame(egui::Frame::none())
                    .show(ctx, |ui| ui.add(MapView::new(viewer, textures).style(style.clone())));
            }
            Screen::Svg(viewer) => {
                egui::TopBottomPanel::top("tools").show(ctx, |ui| svg_toolbar(ui, viewer));

                let deletable = viewer.selected().is_some_and(|m| !m.built_in);
                let action = DrawerPanel::new(viewer.drawer_mut(), textures, Arc::clone(source))
                    .style(style.drawer.clone())
                    .deletable(deletable)
                    .show(ctx);
                match action {
                    DrawerAction::Close => viewer.drawer_mut().close(),
                    DrawerAction::Delete => {
                        viewer.delete_selected();
                    }
                    DrawerAction::None => {}
                }
                show_lightbox(ctx, viewer.drawer_mut(), textures, source, &style.drawer);

                egui::CentralPanel::default()
                    .frame(egui::Frame::none())
                    .show(ctx, |ui| ui.add(SvgView::new(viewer, textures, Arc::clone(source)).style(style.clone())));
            }
        }
    }
}
