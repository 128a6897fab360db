pub mod easing;
pub mod transitions;

pub use easing::EasingFunction;
pub use transitions::{Flight, TransitionState};
