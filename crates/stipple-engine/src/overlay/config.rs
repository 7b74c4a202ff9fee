use crate::glyph::GridSpec;
use crate::input::GestureConfig;
use crate::paint::Color;
use crate::render::GlyphStyle;

/// Overlay configuration, fixed at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Glyph slots allocated once; grid points past this are not drawn.
    pub glyph_capacity: usize,

    /// Sampling grid in logical pixels.
    pub grid: GridSpec,

    /// Overrides the window scale factor when set.
    pub device_pixel_ratio: Option<f32>,

    /// Mirror the luminance field vertically. Off for wgpu's top-left capture.
    pub flip_luminance: bool,

    /// Redraw every loop iteration (`true`) or only after input (`false`).
    pub continuous_rendering: bool,

    pub glyph: GlyphStyle,
    pub clear_color: Color,
    pub gestures: GestureConfig,
}

impl OverlayConfig {
    /// Effective device pixel ratio for a window scale factor.
    pub fn dpr(&self, window_scale: f32) -> f32 {
        let dpr = self.device_pixel_ratio.unwrap_or(window_scale);
        if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            glyph_capacity: 3000,
            grid: GridSpec::default(),
            device_pixel_ratio: None,
            flip_luminance: false,
            continuous_rendering: true,
            glyph: GlyphStyle::default(),
            clear_color: Color::WHITE,
            gestures: GestureConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = OverlayConfig::default();
        assert_eq!(c.glyph_capacity, 3000);
        assert_eq!(c.grid, GridSpec::new(15, 27, 12, 12));
        assert!(!c.flip_luminance);
        assert!(c.continuous_rendering);
        assert_eq!(c.glyph.ch, 'O');
        assert_eq!(c.glyph.size, 20.0);
        assert_eq!(c.glyph.color, Color::BLACK);
        assert_eq!(c.clear_color, Color::WHITE);
    }

    #[test]
    fn dpr_prefers_override() {
        let mut c = OverlayConfig::default();
        assert_eq!(c.dpr(2.0), 2.0);
        c.device_pixel_ratio = Some(1.0);
        assert_eq!(c.dpr(2.0), 1.0);
    }

    #[test]
    fn invalid_dpr_falls_back_to_one() {
        let mut c = OverlayConfig::default();
        assert_eq!(c.dpr(0.0), 1.0);
        c.device_pixel_ratio = Some(f32::NAN);
        assert_eq!(c.dpr(2.0), 1.0);
    }
}
