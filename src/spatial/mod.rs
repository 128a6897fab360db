pub mod index;

pub use index::{HitBox, MarkerIndex};
