//! GPU rendering helpers.
//!
//! Convention:
//! - overlay geometry is in device pixels (top-left origin, +Y down)
//! - vertex shaders convert to NDC using a viewport uniform

mod ctx;
mod stipple;

pub use ctx::{RenderCtx, RenderTarget};
pub use stipple::{GlyphStyle, StippleRenderer};
