use super::frame::{unpack_rgb, RawFrame};

/// Per-pixel normalized intensity in `[0, 1]`.
///
/// Indexing matches [`RawFrame`]: the value for `(x, y)` lives at `x + y * width`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LuminanceField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl LuminanceField {
    pub fn new() -> Self {
        Self::default()
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
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Checked lookup. `None` outside `0..width` × `0..height`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(x as usize + y as usize * self.width as usize)
            .copied()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.values.resize((width as usize) * (height as usize), 0.0);
    }
}

/// Mean of the three color channels, normalized to `[0, 1]`.
#[inline]
fn pixel_luminance(pixel: u32) -> f32 {
    let (r, g, b) = unpack_rgb(pixel);
    ((r as f32 + g as f32 + b as f32) / 3.0) / 255.0
}

/// Reduces `frame` into a freshly allocated field.
///
/// See [`reduce_into`] for the flip semantics.
pub fn reduce(frame: &RawFrame, flip_vertically: bool) -> LuminanceField {
    let mut field = LuminanceField::new();
    reduce_into(frame, flip_vertically, &mut field);
    field
}

/// Reduces `frame` into `out`, reusing its allocation.
///
/// With `flip_vertically`, output row `y` is computed from source row
/// `height - 1 - y`: use it when the capture origin is bottom-left and the
/// sampler expects top-left.
///
/// A zero-sized frame produces an empty field.
pub fn reduce_into(frame: &RawFrame, flip_vertically: bool, out: &mut LuminanceField) {
    let (width, height) = (frame.width(), frame.height());
    out.resize(width, height);
    if out.values.is_empty() {
        return;
    }

    let w = width as usize;
    for (dst_y, dst_row) in out.values.chunks_exact_mut(w).enumerate() {
        let src_y = if flip_vertically {
            height as usize - 1 - dst_y
        } else {
            dst_y
        };
        let src_row = &frame.pixels()[src_y * w..(src_y + 1) * w];
        for (dst, &pixel) in dst_row.iter_mut().zip(src_row) {
            *dst = pixel_luminance(pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luminance::pack_rgba;

    fn gradient(width: u32, height: u32) -> RawFrame {
        let pixels = (0..width * height)
            .map(|i| {
                let v = (i * 37 % 256) as u8;
                pack_rgba(v, v.wrapping_mul(3), 255 - v, (i % 256) as u8)
            })
            .collect();
        RawFrame::from_pixels(width, height, pixels).unwrap()
    }

    fn reversed_rows(frame: &RawFrame) -> RawFrame {
        let pixels = (0..frame.height())
            .rev()
            .flat_map(|y| frame.row(y).unwrap().iter().copied())
            .collect();
        RawFrame::from_pixels(frame.width(), frame.height(), pixels).unwrap()
    }

    // ── shape ─────────────────────────────────────────────────────────────

    #[test]
    fn output_matches_input_size_and_range() {
        for (w, h) in [(1, 1), (7, 3), (16, 9), (31, 2)] {
            let field = reduce(&gradient(w, h), false);
            assert_eq!(field.values().len(), (w * h) as usize);
            assert!(field.values().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn zero_sized_frame_gives_empty_field() {
        assert!(reduce(&RawFrame::new(), false).is_empty());
        assert!(reduce(&RawFrame::filled(0, 4, 0xFFFF_FFFF), true).is_empty());
        assert!(reduce(&RawFrame::filled(4, 0, 0xFFFF_FFFF), false).is_empty());
    }

    // ── values ────────────────────────────────────────────────────────────

    #[test]
    fn uniform_gray_maps_to_k_over_255() {
        for k in [0u8, 1, 64, 128, 200, 255] {
            let frame = RawFrame::filled(5, 4, pack_rgba(k, k, k, 0x7F));
            let field = reduce(&frame, false);
            let expected = k as f32 / 255.0;
            assert!(field.values().iter().all(|&v| v == expected), "k = {k}");
        }
    }

    #[test]
    fn white_with_zero_alpha_is_full_intensity() {
        let frame = RawFrame::filled(4, 2, 0xFFFF_FF00);
        let field = reduce(&frame, false);
        assert_eq!(field.values(), &[1.0; 8]);
    }

    #[test]
    fn alpha_does_not_contribute() {
        let a = reduce(&RawFrame::filled(1, 1, pack_rgba(10, 20, 30, 0)), false);
        let b = reduce(&RawFrame::filled(1, 1, pack_rgba(10, 20, 30, 255)), false);
        assert_eq!(a, b);
        assert_eq!(a.get(0, 0), Some(20.0 / 255.0));
    }

    // ── flip ──────────────────────────────────────────────────────────────

    #[test]
    fn flip_equals_reducing_reversed_rows() {
        let frame = gradient(6, 5);
        assert_eq!(reduce(&frame, true), reduce(&reversed_rows(&frame), false));
    }

    #[test]
    fn flip_moves_bottom_row_to_top() {
        let mut pixels = vec![0u32; 3 * 2];
        pixels[3..].fill(0xFFFF_FFFF);
        let frame = RawFrame::from_pixels(3, 2, pixels).unwrap();

        let flipped = reduce(&frame, true);
        assert_eq!(flipped.get(0, 0), Some(1.0));
        assert_eq!(flipped.get(2, 1), Some(0.0));
    }

    // ── reuse ─────────────────────────────────────────────────────────────

    #[test]
    fn reduce_into_resizes_and_overwrites() {
        let mut field = LuminanceField::new();
        reduce_into(&RawFrame::filled(8, 8, 0xFFFF_FFFF), false, &mut field);
        reduce_into(&RawFrame::filled(2, 3, 0x0000_00FF), false, &mut field);
        assert_eq!((field.width(), field.height()), (2, 3));
        assert_eq!(field.values(), &[0.0; 6]);
    }

    #[test]
    fn get_is_bounds_checked() {
        let field = reduce(&RawFrame::filled(2, 2, 0), false);
        assert_eq!(field.get(1, 1), Some(0.0));
        assert_eq!(field.get(2, 0), None);
        assert_eq!(field.get(0, 2), None);
    }
}
