/// Size of a render target.
///
/// Capture and overlay code works in device pixels; `logical()` converts back
/// using a device pixel ratio.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_device(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Whole logical pixels covered at `scale`. Partial pixels are dropped.
    pub fn logical(self, scale: f32) -> (u32, u32) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        (
            (self.width / scale).floor().max(0.0) as u32,
            (self.height / scale).floor().max(0.0) as u32,
        )
    }
}
