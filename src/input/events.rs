use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Input events that can be handled by the map and the viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap
    Click { position: Point },
    /// Pointer drag in progress
    Drag { delta: Point },
    /// End of a drag operation
    DragEnd,
    /// Scroll wheel or pinch zoom; positive delta zooms in
    Scroll { delta: f64, position: Point },
    /// Keyboard input
    KeyPress { key: KeyCode },
    /// Viewport/window resize
    Resize { size: Point },
}

/// Keyboard key codes the viewers react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowLeft,
    ArrowRight,
    Plus,
    Minus,
    Escape,
    Other(u32),
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(self) -> bool {
        self == EventHandled::Handled
    }
}

/// Events emitted by the map, drained by the owner once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Center changed
    Move { center: LatLng },
    /// Pan finished
    MoveEnd { center: LatLng },
    /// Zoom level changed; fires on every step of a gesture or flight
    Zoom { zoom: f64 },
    /// First zoom change of a gesture
    ZoomStart { zoom: f64 },
    /// The zoom gesture settled
    ZoomEnd { zoom: f64 },
    /// Click on the map background
    Click { lat_lng: LatLng, pixel: Point },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position } => Some(*position),
            InputEvent::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Checks if this is a mouse/pointer event
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            InputEvent::Click { .. }
                | InputEvent::Drag { .. }
                | InputEvent::DragEnd
                | InputEvent::Scroll { .. }
        )
    }

    /// Checks if this is a keyboard event
    pub fn is_keyboard_event(&self) -> bool {
        matches!(self, InputEvent::KeyPress { .. })
    }
}

impl MapEvent {
    /// Whether this event reports a zoom change of any kind
    pub fn is_zoom_event(&self) -> bool {
        matches!(
            self,
            MapEvent::Zoom { .. } | MapEvent::ZoomStart { .. } | MapEvent::ZoomEnd { .. }
        )
    }
}
