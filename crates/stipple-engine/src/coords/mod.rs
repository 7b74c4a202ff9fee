//! Coordinate types shared by the capture, overlay and input layers.
//!
//! Canonical space:
//! - origin top-left, +X right, +Y down
//! - capture and glyph placement in device pixels
//! - grid layout and pointer input in logical pixels

mod vec2;
mod viewport;

pub use vec2::Vec2;
pub use viewport::Viewport;
