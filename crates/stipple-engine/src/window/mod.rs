//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the overlay window, and wires them to the
//! GPU layer and the input gesture tracker.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
