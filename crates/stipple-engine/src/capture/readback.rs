use crate::luminance::{pack_rgba, RawFrame};

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of the staging buffer: `width * 4` rounded up to
/// `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copies RGBA8 rows with pitch `padded_bpr` out of `padded` into `frame`,
/// dropping the per-row padding and packing each pixel as `0xRRGGBBAA`.
///
/// `frame` is resized to `width` × `height` first. Rows missing from a short
/// `padded` buffer are left untouched.
pub fn unpad_rows_into(
    padded: &[u8],
    width: u32,
    height: u32,
    padded_bpr: u32,
    frame: &mut RawFrame,
) {
    frame.resize(width, height);
    if frame.is_empty() {
        return;
    }

    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let pitch = padded_bpr as usize;
    let w = width as usize;

    for (y, dst_row) in frame.pixels_mut().chunks_exact_mut(w).enumerate() {
        let start = y * pitch;
        let Some(src_row) = padded.get(start..start + row_bytes) else {
            break;
        };
        for (dst, px) in dst_row.iter_mut().zip(src_row.chunks_exact(4)) {
            *dst = pack_rgba(px[0], px[1], px[2], px[3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_aligned() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(800), 3328);
    }

    #[test]
    fn padding_is_dropped_and_pixels_packed() {
        let (w, h) = (3u32, 2u32);
        let pitch = padded_bytes_per_row(w);
        let mut padded = vec![0xEEu8; (pitch * h) as usize];
        for y in 0..h {
            for x in 0..w {
                let o = (y * pitch + x * 4) as usize;
                padded[o..o + 4].copy_from_slice(&[x as u8, y as u8, 0x80, 0xFF]);
            }
        }

        let mut frame = RawFrame::new();
        unpad_rows_into(&padded, w, h, pitch, &mut frame);

        assert_eq!(frame.pixels().len(), 6);
        assert_eq!(frame.row(0), Some(&[0x0000_80FF, 0x0100_80FF, 0x0200_80FF][..]));
        assert_eq!(frame.row(1), Some(&[0x0001_80FF, 0x0101_80FF, 0x0201_80FF][..]));
    }

    #[test]
    fn zero_size_clears_frame() {
        let mut frame = RawFrame::filled(2, 2, 1);
        unpad_rows_into(&[], 0, 0, 256, &mut frame);
        assert!(frame.is_empty());
    }

    #[test]
    fn short_buffer_stops_at_last_full_row() {
        let pitch = padded_bytes_per_row(1);
        let padded = vec![0xFFu8; pitch as usize];
        let mut frame = RawFrame::new();
        unpad_rows_into(&padded, 1, 2, pitch, &mut frame);
        assert_eq!(frame.pixels(), &[0xFFFF_FFFF, 0]);
    }
}
