//! Stipple engine crate.
//!
//! Renders a scene offscreen, reduces each frame to luminance and redraws it
//! as a grid of glyphs whose opacity follows local brightness.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod text;
pub mod render;
pub mod scene;

pub mod capture;
pub mod luminance;
pub mod glyph;
pub mod overlay;
