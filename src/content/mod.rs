//! Point articles: where they come from, how they are rendered and cached

pub mod cache;
pub mod loader;
pub mod markdown;
pub mod source;

pub use cache::ContentCache;
pub use loader::{ContentLoader, PointContent};
pub use source::{ContentSource, FileSource, HttpSource};
