/// Packs straight RGBA bytes into the `0xRRGGBBAA` layout used by [`RawFrame`].
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_be_bytes([r, g, b, a])
}

/// Extracts `(r, g, b)` from a packed pixel. Alpha is ignored.
#[inline]
pub const fn unpack_rgb(pixel: u32) -> (u8, u8, u8) {
    let [r, g, b, _a] = pixel.to_be_bytes();
    (r, g, b)
}

/// Captured frame as packed 32-bit pixels, row-major, top row first as read.
///
/// Length is always `width * height`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RawFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frame from existing pixels.
    ///
    /// Returns `None` when `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Frame of `width * height` copies of `pixel`.
    pub fn filled(width: u32, height: u32, pixel: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Returns one row of pixels, or `None` if `y` is out of range.
    pub fn row(&self, y: u32) -> Option<&[u32]> {
        if y >= self.height {
            return None;
        }
        let w = self.width as usize;
        let start = y as usize * w;
        self.pixels.get(start..start + w)
    }

    /// Sets the frame dimensions, growing or shrinking the pixel buffer.
    ///
    /// Existing capacity is retained, so resizing back and forth between two
    /// resolutions does not allocate after the first time.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.resize((width as usize) * (height as usize), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_puts_red_in_high_byte() {
        assert_eq!(pack_rgba(0x11, 0x22, 0x33, 0x44), 0x1122_3344);
        assert_eq!(unpack_rgb(0x1122_3344), (0x11, 0x22, 0x33));
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(RawFrame::from_pixels(2, 2, vec![0; 3]).is_none());
        assert!(RawFrame::from_pixels(2, 2, vec![0; 4]).is_some());
        assert!(RawFrame::from_pixels(0, 5, Vec::new()).is_some());
    }

    #[test]
    fn row_slices_are_width_long() {
        let frame = RawFrame::from_pixels(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.row(0), Some(&[1, 2, 3][..]));
        assert_eq!(frame.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(frame.row(2), None);
    }

    #[test]
    fn resize_keeps_capacity() {
        let mut frame = RawFrame::new();
        frame.resize(64, 64);
        let cap = frame.pixels.capacity();
        frame.resize(8, 8);
        frame.resize(64, 64);
        assert_eq!(frame.pixels.capacity(), cap);
        assert_eq!(frame.pixels().len(), 64 * 64);
    }
}
