//! Pixel-to-luminance reduction.
//!
//! `RawFrame` holds captured pixels packed as `0xRRGGBBAA`.
//! `LuminanceField` holds one normalized intensity per pixel, same indexing.
//!
//! Both buffers are meant to be owned persistently by the frame loop and
//! reused; they only reallocate when the capture resolution changes.

mod field;
mod frame;

pub use field::{reduce, reduce_into, LuminanceField};
pub use frame::{pack_rgba, unpack_rgb, RawFrame};
