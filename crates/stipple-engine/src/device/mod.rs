//! wgpu device and window swapchain.
//!
//! One device serves both the offscreen capture and the presented overlay.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
