//! Scene contract.
//!
//! The overlay does not own scene content. A scene renders one frame into
//! whatever target it is handed; the frame driver hands it the offscreen
//! capture, never the window.

use crate::input::Gesture;
use crate::render::{RenderCtx, RenderTarget};

/// A 3D scene driven by the frame loop.
///
/// Call order: `initialize` once, then per frame `resize` (only on size
/// change), `update`, `render`; `teardown` once at exit.
pub trait Scene {
    /// Creates GPU resources. `ctx` describes the capture target format.
    fn initialize(&mut self, ctx: &RenderCtx<'_>);

    /// Capture size changed, in device pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Advances animation by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Records one frame into `target`. `target.depth_view` is always set.
    fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>);

    /// Releases scene resources.
    fn teardown(&mut self);

    fn handle_gesture(&mut self, gesture: Gesture) {
        let _ = gesture;
    }
}
