use crate::coords::Vec2;

use super::types::{Gesture, InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta};

/// Tuning for [`GestureTracker`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GestureConfig {
    /// Maximum gap between two taps, in seconds, for a double tap.
    pub double_tap_secs: f64,

    /// Scale applied to a scroll step before it becomes pinch/rotate/shove.
    pub scroll_multiplier: f32,

    /// Pixel-precise wheel deltas are divided by this to get scroll lines.
    pub pixels_per_line: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_secs: 0.5,
            scroll_multiplier: 0.05,
            pixels_per_line: 20.0,
        }
    }
}

/// Turns raw input events into [`Gesture`]s.
///
/// Pure state machine: the caller passes the timestamp of every event
/// (seconds on any monotonic clock), so no clock is read here.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    modifiers: Modifiers,
    pointer: Option<Vec2>,
    primary_down: bool,

    /// Set by the first drag sample; a release while set is not a tap.
    was_panning: bool,
    last_down: Vec2,
    last_up: f64,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            modifiers: Modifiers::default(),
            pointer: None,
            primary_down: false,
            was_panning: false,
            last_down: Vec2::zero(),
            // First release can never complete a double tap.
            last_up: -config.double_tap_secs,
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    /// Feeds one event observed at time `now`. Returns the gesture it completes.
    pub fn handle(&mut self, event: &InputEvent, now: f64) -> Option<Gesture> {
        match *event {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = m;
                None
            }

            InputEvent::Focused(false) => {
                self.primary_down = false;
                self.was_panning = false;
                None
            }
            InputEvent::Focused(true) => None,

            InputEvent::PointerLeft => {
                self.pointer = None;
                None
            }

            InputEvent::PointerMoved(pos) => self.on_pointer_moved(pos),

            InputEvent::PointerButton { button: MouseButton::Left, state } => {
                self.on_primary(state, now)
            }
            InputEvent::PointerButton { .. } => None,

            InputEvent::MouseWheel(delta) => self.on_wheel(delta),

            InputEvent::Key { key: Key::Digit(n @ 1..=4), state: KeyState::Pressed, repeat: false } => {
                Some(Gesture::ToggleDebug(n))
            }
            InputEvent::Key { .. } => None,
        }
    }

    fn pointer(&self) -> Vec2 {
        self.pointer.unwrap_or_default()
    }

    fn on_pointer_moved(&mut self, pos: Vec2) -> Option<Gesture> {
        self.pointer = Some(pos);
        if !self.primary_down {
            return None;
        }

        let gesture = self.was_panning.then_some(Gesture::Pan {
            from: self.last_down,
            to: pos,
        });
        self.was_panning = true;
        self.last_down = pos;
        gesture
    }

    fn on_primary(&mut self, state: MouseButtonState, now: f64) -> Option<Gesture> {
        if self.was_panning {
            self.was_panning = false;
            self.primary_down = state == MouseButtonState::Pressed;
            return None;
        }

        let at = self.pointer();
        match state {
            MouseButtonState::Pressed => {
                self.primary_down = true;
                self.last_down = at;
                None
            }
            MouseButtonState::Released => {
                self.primary_down = false;
                let gesture = if now - self.last_up < self.config.double_tap_secs {
                    Gesture::DoubleTap { at }
                } else {
                    Gesture::Tap { at }
                };
                self.last_up = now;
                Some(gesture)
            }
        }
    }

    fn on_wheel(&mut self, delta: MouseWheelDelta) -> Option<Gesture> {
        let lines = match delta {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / self.config.pixels_per_line.max(f32::EPSILON),
        };
        if lines == 0.0 || !lines.is_finite() {
            return None;
        }

        let step = self.config.scroll_multiplier * lines;
        let at = self.pointer();
        let gesture = if self.modifiers.ctrl {
            Gesture::Shove { delta: step }
        } else if self.modifiers.alt {
            Gesture::Rotate { at, radians: step }
        } else {
            Gesture::Pinch { at, scale: 1.0 + step }
        };
        Some(gesture)
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
