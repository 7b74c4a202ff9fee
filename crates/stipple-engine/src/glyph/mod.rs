//! Glyph slots and luminance-grid sampling.
//!
//! A fixed number of glyph slots is allocated once from a [`GlyphSubsystem`].
//! Every frame the sampler walks a [`GridSpec`] over the luminance field and
//! rewrites slot transforms; slots are never created or destroyed afterwards.

mod grid;
mod sampler;
mod slot;

pub use grid::{GridPoints, GridSpec};
pub use sampler::{sample, SampleStats};
pub use slot::{GlyphId, GlyphSlot, GlyphSlots};

use crate::render::{RenderCtx, RenderTarget};

/// Contract of the text/glyph backend that draws the overlay.
pub trait GlyphSubsystem {
    /// Reserves `count` glyph handles. Called once at start-up.
    fn allocate(&mut self, count: usize) -> Vec<GlyphId>;

    /// Updates the transform of one glyph handle.
    ///
    /// `x`/`y` are device pixels, `rotation` is in radians, `intensity` in `[0, 1]`.
    fn set_transform(&mut self, id: GlyphId, x: f32, y: f32, rotation: f32, intensity: f32);

    /// Issues the draw for all allocated glyphs into `target`.
    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>);

    /// Pushes every slot's current transform.
    fn push_slots(&mut self, slots: &GlyphSlots) {
        for slot in slots.iter() {
            self.set_transform(slot.id(), slot.x, slot.y, slot.rotation, slot.opacity);
        }
    }
}
