//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s and feeds them to
//! a `GestureTracker`, which emits the camera gestures the scene consumes.

mod gesture;
mod translate;
mod types;

pub use gesture::{GestureConfig, GestureTracker};
pub(crate) use translate::translate_window_event;
pub use types::{
    Gesture,
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
};
