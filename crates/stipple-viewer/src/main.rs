mod scene;

use anyhow::{Context, Result};

use stipple_engine::device::GpuInit;
use stipple_engine::logging::{init_logging, LoggingConfig};
use stipple_engine::overlay::{FrameDriver, OverlayConfig};
use stipple_engine::render::StippleRenderer;
use stipple_engine::text::FontSystem;
use stipple_engine::window::{Runtime, RuntimeConfig};

use scene::CubeField;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let overlay = OverlayConfig::default();

    let mut fonts = FontSystem::new();
    let font = fonts
        .load_font(&load_font()?)
        .context("failed to parse overlay font")?;
    let glyphs = StippleRenderer::new(fonts, font, overlay.glyph);

    let runtime = RuntimeConfig {
        title: "stipple".to_string(),
        continuous_rendering: overlay.continuous_rendering,
        gestures: overlay.gestures,
        ..RuntimeConfig::default()
    };

    log::info!(
        "stipple: {} glyph slots, grid {:?}",
        overlay.glyph_capacity,
        overlay.grid
    );

    let driver = FrameDriver::new(overlay, CubeField::new(), glyphs);
    Runtime::run(runtime, GpuInit::default(), driver)
}

fn load_font() -> Result<Vec<u8>> {
    FONT_CANDIDATES
        .iter()
        .find_map(|p| {
            let bytes = std::fs::read(p).ok()?;
            log::debug!("using font {p}");
            Some(bytes)
        })
        .with_context(|| format!("no usable font found (tried {})", FONT_CANDIDATES.join(", ")))
}
