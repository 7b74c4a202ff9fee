//! Time subsystem.
//!
//! One `FrameClock` drives the overlay loop: `tick()` once per frame gives the
//! scene its `dt`, and `elapsed()` timestamps input for gesture detection.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
