//! Frame driver: the per-frame pipeline tying capture, luminance and glyph
//! sampling together.
//!
//! Frame order (see [`FramePhase`]):
//! 1. render the scene into the offscreen capture
//! 2. read the capture back into a `RawFrame`
//! 3. reduce it to a `LuminanceField`
//! 4. sample the grid into the glyph slots
//! 5. draw the glyph layer to the window and present

mod config;
mod driver;
mod phase;

pub use config::OverlayConfig;
pub use driver::FrameDriver;
pub use phase::{FramePhase, PhaseError};
