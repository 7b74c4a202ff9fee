use crate::coords::Vec2;

/// Keyboard key identifier.
///
/// Only the keys the overlay reacts to are named; everything else maps to
/// `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,

    /// Top-row digit `0..=9`.
    Digit(u8),

    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

/// Platform-agnostic input events emitted by the runtime.
///
/// Positions are logical pixels, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    PointerMoved(Vec2),

    PointerButton {
        button: MouseButton,
        state: MouseButtonState,
    },

    MouseWheel(MouseWheelDelta),

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

/// High-level gesture derived from raw input by
/// [`GestureTracker`](super::GestureTracker).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    Tap { at: Vec2 },
    DoubleTap { at: Vec2 },
    /// Primary-button drag between two consecutive pointer samples.
    Pan { from: Vec2, to: Vec2 },
    /// Zoom around `at`; `scale > 1` zooms in.
    Pinch { at: Vec2, scale: f32 },
    /// Rotation around `at`, radians.
    Rotate { at: Vec2, radians: f32 },
    /// Camera tilt.
    Shove { delta: f32 },
    /// Digit key `1..=4`.
    ToggleDebug(u8),
}
