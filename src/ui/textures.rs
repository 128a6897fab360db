//! GPU textures for tiles, marker icons, gallery images and the SVG plan

use std::num::NonZeroUsize;
use std::sync::Arc;

use egui::{ColorImage, TextureHandle, TextureOptions};
use lru::LruCache;

use crate::content::source::ContentSource;
use crate::prelude::HashSet;
use crate::rendering::raster::{self, RasterImage};
use crate::tiles::{
    cache::TileCache,
    loader::{TileLoader, TileLoaderConfig, TilePriority},
};

const TEXTURE_CAPACITY: usize = 512;
const BYTE_CACHE_CAPACITY: usize = 1024;

/// Fetches, decodes and uploads images on demand.
///
/// Lookups never block: a missing texture is queued on the loader and the
/// caller draws a placeholder until `poll` has uploaded it.
pub struct TextureStore {
    loader: TileLoader,
    bytes: TileCache,
    /// Keyed by `texture_key`, so a greyscale tile and its colour twin coexist
    textures: LruCache<String, TextureHandle>,
    /// Keys looked up since the last `poll`; queued fetches outside it are dropped
    wanted: HashSet<String>,
    /// Fetched fine but could not be decoded; never re-requested
    broken: HashSet<String>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::with_loader(TileLoader::new(TileLoaderConfig::default()))
    }

    pub fn with_loader(loader: TileLoader) -> Self {
        Self {
            loader,
            bytes: TileCache::new(BYTE_CACHE_CAPACITY),
            textures: LruCache::new(NonZeroUsize::new(TEXTURE_CAPACITY).unwrap_or(NonZeroUsize::MIN)),
            wanted: HashSet::default(),
            broken: HashSet::default(),
        }
    }

    /// Raster tile by URL
    pub fn tile(&mut self, ctx: &egui::Context, url: &str, greyscale: bool) -> Option<TextureHandle> {
        self.wanted.insert(url.to_string());
        if let Some(texture) = self.lookup(ctx, url, greyscale) {
            return Some(texture);
        }
        if !self.broken.contains(url) {
            self.loader.queue_url(url, TilePriority::Background);
        }
        None
    }

    /// Image under the public root (marker icons, gallery, the SVG plan)
    pub fn asset(
        &mut self,
        ctx: &egui::Context,
        source: &Arc<dyn ContentSource>,
        path: &str,
        priority: TilePriority,
    ) -> Option<TextureHandle> {
        self.wanted.insert(path.to_string());
        if let Some(texture) = self.lookup(ctx, path, false) {
            return Some(texture);
        }
        if self.broken.contains(path) {
            return None;
        }
        let source = Arc::clone(source);
        let owned = path.to_string();
        self.loader
            .queue(path, priority, Box::pin(async move { source.fetch_bytes(&owned).await }));
        None
    }

    fn lookup(&mut self, ctx: &egui::Context, key: &str, greyscale: bool) -> Option<TextureHandle> {
        if let Some(texture) = self.textures.get(&texture_key(key, greyscale)) {
            return Some(texture.clone());
        }
        if self.broken.contains(key) {
            return None;
        }
        let bytes = self.bytes.get(key)?;
        self.upload(ctx, key, &bytes, greyscale)
    }

    fn upload(&mut self, ctx: &egui::Context, key: &str, bytes: &[u8], greyscale: bool) -> Option<TextureHandle> {
        let image = match raster::decode(key, bytes) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("cannot decode {}: {}", key, e);
                self.broken.insert(key.to_string());
                return None;
            }
        };
        let image = if greyscale { image.into_greyscale() } else { image };
        let name = texture_key(key, greyscale);
        let texture = ctx.load_texture(name.clone(), to_color_image(&image), TextureOptions::LINEAR);
        self.textures.put(name, texture.clone());
        Some(texture)
    }

    /// Drops queued fetches nobody looked up since the last call, then
    /// stores whatever finished downloading. Textures are uploaded on the
    /// next lookup. True when something arrived.
    pub fn poll(&mut self) -> bool {
        let wanted = std::mem::take(&mut self.wanted);
        self.loader.retain_queued(|key| wanted.contains(key));

        let results = self.loader.poll();
        let arrived = !results.is_empty();
        for result in results {
            if let Ok(bytes) = result.data {
                self.bytes.insert(result.key, bytes);
            }
        }
        arrived
    }

    pub fn is_loading(&self) -> bool {
        self.loader.pending_count() > 0
    }

    pub fn has_failed(&self, key: &str) -> bool {
        self.loader.has_failed(key) || self.broken.contains(key)
    }

    /// Forgets failed downloads so the next lookup tries again
    pub fn retry_failed(&mut self) {
        self.loader.retry_failed();
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn texture_key(key: &str, greyscale: bool) -> String {
    if greyscale {
        format!("{}#greyscale", key)
    } else {
        key.to_string()
    }
}

pub fn to_color_image(image: &RasterImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(image.size(), &image.pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_image_matches_raster_size() {
        let image = RasterImage {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 255, 0, 255, 0, 128],
        };
        let color = to_color_image(&image);
        assert_eq!(color.size, [2, 1]);
        assert_eq!(color.pixels.len(), 2);
    }

    #[test]
    fn test_cached_bytes_upload_without_fetch() {
        let ctx = egui::Context::default();
        let mut store = TextureStore::new();
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        store.bytes.insert("icon.png", Arc::new(png));

        assert!(store.tile(&ctx, "icon.png", true).is_some());
        assert_eq!(store.len(), 1);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_undecodable_bytes_are_marked_broken() {
        let ctx = egui::Context::default();
        let mut store = TextureStore::new();
        store.bytes.insert("bad.png", Arc::new(vec![1, 2, 3]));

        assert!(store.tile(&ctx, "bad.png", false).is_none());
        assert!(store.has_failed("bad.png"));
    }

    #[test]
    fn test_greyscale_and_colour_tiles_are_separate_textures() {
        let ctx = egui::Context::default();
        let mut store = TextureStore::new();
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(1, 1, image::Rgba([200, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        store.bytes.insert("tile.png", Arc::new(png));

        assert!(store.tile(&ctx, "tile.png", true).is_some());
        assert!(store.tile(&ctx, "tile.png", false).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_poll_drops_fetches_nobody_asked_for_again() {
        let ctx = egui::Context::default();
        let mut store = TextureStore::new();
        // Queued but not started: the loader only starts work inside poll
        store.tile(&ctx, "http://127.0.0.1:9/1/0/0.png", false);
        store.tile(&ctx, "http://127.0.0.1:9/1/1/0.png", false);
        assert!(store.is_loading());

        // Only the second tile is still on screen
        store.wanted.clear();
        store.wanted.insert("http://127.0.0.1:9/1/1/0.png".to_string());
        store.poll();

        assert!(!store.loader.is_pending("http://127.0.0.1:9/1/0/0.png"));
        assert!(store.wanted.is_empty());
    }
}
