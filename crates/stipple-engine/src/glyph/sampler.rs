use crate::luminance::LuminanceField;

use super::grid::GridSpec;
use super::slot::GlyphSlots;

/// Outcome of one [`sample`] call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SampleStats {
    /// Grid points enumerated for the frame.
    pub points: usize,
    /// Slots written, `min(points, slots.len())`.
    pub updated: usize,
}

impl SampleStats {
    /// Grid points that had no slot left.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.points - self.updated
    }
}

/// Maps a logical coordinate to the device pixel used for both placement and lookup.
#[inline]
fn to_device(logical: u32, dpr: f32) -> u32 {
    (logical as f32 * dpr).floor() as u32
}

/// Drives `slots` from `field` over `grid`.
///
/// `logical_width`/`logical_height` bound the grid; `field` is expected at
/// device resolution (`logical * dpr`). Points are consumed in row-major order
/// and slot `i` receives point `i`. Once every slot is used the remaining
/// points are left unsampled, and slots past the point count keep their prior
/// state.
///
/// A device coordinate outside the field still consumes its slot, with
/// intensity `0`.
pub fn sample(
    field: &LuminanceField,
    logical_width: u32,
    logical_height: u32,
    device_pixel_ratio: f32,
    slots: &mut GlyphSlots,
    grid: &GridSpec,
) -> SampleStats {
    if field.is_empty() {
        return SampleStats::default();
    }

    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };

    let points = grid.points(logical_width, logical_height);
    let total = points.len();
    let mut updated = 0;

    for (slot, (lx, ly)) in slots.iter_mut().zip(points) {
        let dx = to_device(lx, dpr);
        let dy = to_device(ly, dpr);
        let intensity = field.get(dx, dy).unwrap_or(0.0);
        slot.set(dx as f32, dy as f32, 0.0, intensity);
        updated += 1;
    }

    SampleStats { points: total, updated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GlyphSlot;
    use crate::luminance::{pack_rgba, reduce, RawFrame};

    /// Field whose value at `(x, y)` is `(x + y * width) / 255`.
    fn ramp_field(width: u32, height: u32) -> LuminanceField {
        let pixels = (0..width * height)
            .map(|i| {
                let v = i as u8;
                pack_rgba(v, v, v, 255)
            })
            .collect();
        reduce(&RawFrame::from_pixels(width, height, pixels).unwrap(), false)
    }

    fn unit_grid() -> GridSpec {
        GridSpec::new(0, 0, 1, 1)
    }

    fn positions(slots: &GlyphSlots) -> Vec<(f32, f32)> {
        slots.iter().map(|s| (s.x, s.y)).collect()
    }

    // ── scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn two_by_two_grid_fills_four_slots_row_major() {
        let field = ramp_field(2, 2);
        let mut slots = GlyphSlots::with_capacity(4);

        let stats = sample(&field, 2, 2, 1.0, &mut slots, &unit_grid());

        assert_eq!(stats, SampleStats { points: 4, updated: 4 });
        assert_eq!(positions(&slots), vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        for slot in slots.iter() {
            let expected = field.get(slot.x as u32, slot.y as u32).unwrap();
            assert_eq!(slot.opacity, expected);
            assert_eq!(slot.rotation, 0.0);
        }
    }

    #[test]
    fn capacity_two_takes_first_two_points_only() {
        let field = ramp_field(2, 2);
        let mut slots = GlyphSlots::with_capacity(2);

        let stats = sample(&field, 2, 2, 1.0, &mut slots, &unit_grid());

        assert_eq!(stats.updated, 2);
        assert_eq!(stats.dropped(), 2);
        assert_eq!(positions(&slots), vec![(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(slots.get(1).unwrap().opacity, 1.0 / 255.0);
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn surplus_slots_keep_prior_state() {
        let field = ramp_field(2, 2);
        let mut slots = GlyphSlots::with_capacity(6);
        for slot in slots.iter_mut() {
            slot.set(-1.0, -1.0, 0.5, 0.25);
        }

        let stats = sample(&field, 2, 2, 1.0, &mut slots, &unit_grid());

        assert_eq!(stats, SampleStats { points: 4, updated: 4 });
        for slot in slots.iter().skip(4) {
            assert_eq!((slot.x, slot.y, slot.rotation, slot.opacity), (-1.0, -1.0, 0.5, 0.25));
        }
    }

    #[test]
    fn slot_count_bounds_updates_for_large_grids() {
        let field = ramp_field(16, 16);
        let grid = GridSpec::new(1, 1, 2, 2);
        let m = grid.point_count(16, 16);
        for s in [0, 1, m - 1, m, m + 3] {
            let mut slots = GlyphSlots::with_capacity(s);
            let stats = sample(&field, 16, 16, 1.0, &mut slots, &grid);
            assert_eq!(stats.points, m);
            assert_eq!(stats.updated, s.min(m));
        }
    }

    // ── coordinates ───────────────────────────────────────────────────────

    #[test]
    fn device_pixel_ratio_scales_position_and_lookup() {
        // Logical 2x2 at dpr 2 -> device field 4x4.
        let field = ramp_field(4, 4);
        let mut slots = GlyphSlots::with_capacity(4);

        sample(&field, 2, 2, 2.0, &mut slots, &unit_grid());

        assert_eq!(positions(&slots), vec![(0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (2.0, 2.0)]);
        let last = slots.get(3).unwrap();
        assert_eq!(last.opacity, field.get(2, 2).unwrap());
    }

    #[test]
    fn fractional_ratio_floors_to_device_pixel() {
        let field = ramp_field(8, 8);
        let mut slots = GlyphSlots::with_capacity(1);

        sample(&field, 8, 8, 1.5, &mut slots, &GridSpec::new(3, 3, 1, 1));

        let slot = slots.get(0).unwrap();
        assert_eq!((slot.x, slot.y), (4.0, 4.0));
        assert_eq!(slot.opacity, field.get(4, 4).unwrap());
    }

    #[test]
    fn points_outside_field_consume_a_hidden_slot() {
        // Grid assumes 4x1 logical pixels but the capture is only 2x1.
        let field = reduce(&RawFrame::filled(2, 1, 0xFFFF_FFFF), false);
        let mut slots = GlyphSlots::with_capacity(4);

        let stats = sample(&field, 4, 1, 1.0, &mut slots, &unit_grid());

        assert_eq!(stats.updated, 4);
        let opacities: Vec<_> = slots.iter().map(|s| s.opacity).collect();
        assert_eq!(opacities, vec![1.0, 1.0, 0.0, 0.0]);
    }

    // ── degenerate input ──────────────────────────────────────────────────

    #[test]
    fn empty_field_touches_nothing() {
        let mut slots = GlyphSlots::with_capacity(3);
        let before = slots.clone();

        let stats = sample(&LuminanceField::new(), 2, 2, 1.0, &mut slots, &unit_grid());

        assert_eq!(stats, SampleStats::default());
        assert_eq!(slots, before);
    }

    #[test]
    fn invalid_ratio_falls_back_to_one() {
        let field = ramp_field(2, 2);
        let mut a = GlyphSlots::with_capacity(4);
        let mut b = GlyphSlots::with_capacity(4);
        sample(&field, 2, 2, f32::NAN, &mut a, &unit_grid());
        sample(&field, 2, 2, 1.0, &mut b, &unit_grid());
        assert_eq!(a, b);
    }

    // ── determinism ───────────────────────────────────────────────────────

    #[test]
    fn repeated_sampling_is_identical() {
        let field = ramp_field(16, 12);
        let grid = GridSpec::new(1, 2, 3, 2);
        let mut a = GlyphSlots::with_capacity(17);
        let mut b = GlyphSlots::with_capacity(17);

        sample(&field, 16, 12, 1.0, &mut a, &grid);
        sample(&field, 16, 12, 1.0, &mut b, &grid);
        let first: Vec<GlyphSlot> = a.iter().copied().collect();
        sample(&field, 16, 12, 1.0, &mut a, &grid);

        assert_eq!(a, b);
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), first);
    }
}
