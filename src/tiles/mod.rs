pub mod cache;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use loader::{TileLoader, TilePriority};
pub use source::{MapTilerSource, MapboxSource, OpenStreetMapSource, TileSource};
