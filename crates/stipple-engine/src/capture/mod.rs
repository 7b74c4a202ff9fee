//! Offscreen capture target.
//!
//! The scene renders into a [`RenderSurface`] instead of the window; the
//! color attachment is then copied back to the CPU as a
//! [`RawFrame`](crate::luminance::RawFrame).

mod readback;
mod surface;

pub use readback::{padded_bytes_per_row, unpad_rows_into};
pub use surface::{RenderSurface, CAPTURE_DEPTH_FORMAT, CAPTURE_FORMAT};
