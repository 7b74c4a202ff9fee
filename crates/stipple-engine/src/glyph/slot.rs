/// Opaque handle to a glyph owned by a [`GlyphSubsystem`](super::GlyphSubsystem).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GlyphId(pub(crate) u32);

impl GlyphId {
    /// Raw index, only meaningful to the subsystem that issued it.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Last transform pushed to one glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphSlot {
    id: GlyphId,
    /// Device pixels.
    pub x: f32,
    /// Device pixels.
    pub y: f32,
    pub rotation: f32,
    /// `[0, 1]`.
    pub opacity: f32,
}

impl GlyphSlot {
    pub fn new(id: GlyphId) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            opacity: 0.0,
        }
    }

    #[inline]
    pub fn id(&self) -> GlyphId {
        self.id
    }

    #[inline]
    pub fn set(&mut self, x: f32, y: f32, rotation: f32, opacity: f32) {
        self.x = x;
        self.y = y;
        self.rotation = rotation;
        self.opacity = opacity;
    }
}

/// Fixed-capacity ordered glyph slots.
///
/// The slot count is decided at construction and cannot change; the frame
/// loop only rewrites transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSlots {
    slots: Box<[GlyphSlot]>,
}

impl GlyphSlots {
    /// Wraps the handles returned by `GlyphSubsystem::allocate`, in order.
    pub fn new(ids: Vec<GlyphId>) -> Self {
        Self {
            slots: ids.into_iter().map(GlyphSlot::new).collect(),
        }
    }

    /// Slots with sequential ids `0..capacity`. Handy for CPU-side use and tests.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new((0..capacity as u32).map(GlyphId).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&GlyphSlot> {
        self.slots.get(index)
    }

    /// Sets opacity to `0` for every slot at index `start` and beyond.
    /// Returns how many were visible before.
    pub fn hide_from(&mut self, start: usize) -> usize {
        let mut hidden = 0;
        for slot in self.slots.iter_mut().skip(start) {
            if slot.opacity != 0.0 {
                hidden += 1;
            }
            slot.opacity = 0.0;
        }
        hidden
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphSlot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GlyphSlot> {
        self.slots.iter_mut()
    }
}
