use std::fmt;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Coverage bitmap of one rasterized glyph.
///
/// `coverage` is `width * height` bytes, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

/// Owns the loaded fonts. Fonts are immutable after loading.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        if bytes.is_empty() {
            return Err(FontLoadError("empty font data".to_string()));
        }
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {id:?}");
        Ok(id)
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Rasterizes `ch` at `px` pixels.
    ///
    /// Returns `None` for an unknown font or a glyph without visible coverage
    /// (e.g. a space).
    pub fn rasterize(&self, id: FontId, ch: char, px: f32) -> Option<GlyphBitmap> {
        let font = self.get(id)?;
        let (metrics, coverage) = font.rasterize(ch, px.max(1.0));
        if metrics.width == 0 || metrics.height == 0 {
            return None;
        }
        Some(GlyphBitmap {
            width: metrics.width as u32,
            height: metrics.height as u32,
            coverage,
        })
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}
