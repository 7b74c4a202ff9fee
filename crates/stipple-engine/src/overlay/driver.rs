use anyhow::{bail, Result};

use crate::capture::{RenderSurface, CAPTURE_DEPTH_FORMAT, CAPTURE_FORMAT};
use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx, PresentStatus};
use crate::glyph::{sample, GlyphSlots, GlyphSubsystem, SampleStats};
use crate::input::Gesture;
use crate::luminance::{reduce_into, LuminanceField, RawFrame};
use crate::render::{RenderCtx, StippleRenderer};
use crate::scene::Scene;

use super::config::OverlayConfig;
use super::phase::FramePhase;

/// Capture and grid sizes for one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct FramePlan {
    device_w: u32,
    device_h: u32,
    logical_w: u32,
    logical_h: u32,
}

impl FramePlan {
    /// `None` when either device dimension is zero.
    fn new(device_w: u32, device_h: u32, dpr: f32) -> Option<Self> {
        if device_w == 0 || device_h == 0 {
            return None;
        }
        let (logical_w, logical_h) = Viewport::from_device(device_w, device_h).logical(dpr);
        Some(Self { device_w, device_h, logical_w, logical_h })
    }
}

/// Runs scene → capture → luminance → glyph slots → window, once per frame.
///
/// Owns every per-frame resource: the capture surface, the persistent
/// [`RawFrame`] and [`LuminanceField`] (reallocated only on resize) and the
/// fixed glyph slots.
pub struct FrameDriver<S, G = StippleRenderer> {
    config: OverlayConfig,
    scene: S,
    glyphs: G,
    slots: GlyphSlots,

    capture: Option<RenderSurface>,
    frame: RawFrame,
    field: LuminanceField,

    phase: FramePhase,
    stats: SampleStats,
    scene_ready: bool,
    reported_truncation: bool,
}

impl<S, G> FrameDriver<S, G>
where
    S: Scene,
    G: GlyphSubsystem,
{
    /// Allocates `config.glyph_capacity` glyphs from `glyphs` up front.
    pub fn new(config: OverlayConfig, scene: S, mut glyphs: G) -> Self {
        let slots = GlyphSlots::new(glyphs.allocate(config.glyph_capacity));
        log::debug!("allocated {} glyph slots", slots.len());
        Self {
            config,
            scene,
            glyphs,
            slots,
            capture: None,
            frame: RawFrame::new(),
            field: LuminanceField::new(),
            phase: FramePhase::Idle,
            stats: SampleStats::default(),
            scene_ready: false,
            reported_truncation: false,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Sampling outcome of the last completed frame.
    pub fn stats(&self) -> SampleStats {
        self.stats
    }

    pub fn slots(&self) -> &GlyphSlots {
        &self.slots
    }

    pub fn field(&self) -> &LuminanceField {
        &self.field
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    fn run_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        let Some((plan, dpr)) = self.begin_frame(ctx.window.device_size(), ctx.window.scale_factor())?
        else {
            return Ok(());
        };

        {
            let device = ctx.gpu.device();
            let queue = ctx.gpu.queue();
            let capture = self.capture.get_or_insert_with(|| RenderSurface::new(device));

            if !self.scene_ready {
                let init_ctx = RenderCtx::new(
                    device,
                    queue,
                    CAPTURE_FORMAT,
                    Some(CAPTURE_DEPTH_FORMAT),
                    Viewport::from_device(plan.device_w, plan.device_h),
                    dpr,
                );
                self.scene.initialize(&init_ctx);
                self.scene_ready = true;
                log::info!("scene initialized");
            }

            if capture.configure(device, plan.device_w, plan.device_h)? {
                capture_resized(&mut self.scene, &mut self.slots, &self.config, plan);
            }

            self.scene.update(ctx.time.dt);
            let scene = &mut self.scene;
            capture.render_into(device, queue, dpr, |rctx, target| scene.render(rctx, target))?;

            self.phase.advance(FramePhase::CapturedFrame)?;
            capture.readback(device, queue, &mut self.frame)?;
        }

        self.process_capture(plan.logical_w, plan.logical_h, dpr)?;

        let glyphs = &mut self.glyphs;
        let status = ctx.present(self.config.clear_color, dpr, |rctx, target| glyphs.draw(rctx, target));
        self.finish_present(status)
    }

    /// Idle → Rendering, unless the window has no area. A skipped frame leaves
    /// the phase untouched.
    fn begin_frame(&mut self, device_size: (u32, u32), scale_factor: f32) -> Result<Option<(FramePlan, f32)>> {
        let dpr = self.config.dpr(scale_factor);
        let Some(plan) = FramePlan::new(device_size.0, device_size.1, dpr) else {
            return Ok(None);
        };
        self.phase.advance(FramePhase::Rendering)?;
        Ok(Some((plan, dpr)))
    }

    /// Sampled → Presented → Idle, or back to Idle when the window frame was
    /// not available.
    fn finish_present(&mut self, status: PresentStatus) -> Result<()> {
        match status {
            PresentStatus::Presented => {
                self.phase.advance(FramePhase::Presented)?;
                self.phase.advance(FramePhase::Idle)?;
            }
            PresentStatus::Skipped => {
                log::trace!("window surface unavailable; frame skipped");
                self.phase.reset();
            }
            PresentStatus::Lost => bail!("window surface lost"),
        }
        Ok(())
    }

    /// CapturedFrame → Reduced → Sampled: reduces the raw frame, samples the
    /// grid and pushes every slot to the glyph subsystem.
    fn process_capture(&mut self, logical_w: u32, logical_h: u32, dpr: f32) -> Result<SampleStats> {
        self.phase.advance(FramePhase::Reduced)?;
        reduce_into(&self.frame, self.config.flip_luminance, &mut self.field);

        self.phase.advance(FramePhase::Sampled)?;
        let stats = sample(&self.field, logical_w, logical_h, dpr, &mut self.slots, &self.config.grid);
        self.glyphs.push_slots(&self.slots);

        if stats.dropped() > 0 && !self.reported_truncation {
            self.reported_truncation = true;
            log::debug!(
                "grid has {} points but only {} glyph slots; {} points not drawn",
                stats.points,
                self.slots.len(),
                stats.dropped()
            );
        }

        self.stats = stats;
        Ok(stats)
    }

    /// Tears the scene down and frees the capture. Idempotent.
    pub fn shutdown(&mut self) {
        if self.scene_ready {
            self.scene.teardown();
            self.scene_ready = false;
            log::info!("scene torn down");
        }
        if let Some(mut capture) = self.capture.take() {
            capture.release();
        }
        self.phase.reset();
    }
}

/// Resizes the scene and hides slots the new grid no longer reaches, so they
/// do not keep drawing with a stale transform.
fn capture_resized<S: Scene>(scene: &mut S, slots: &mut GlyphSlots, config: &OverlayConfig, plan: FramePlan) {
    scene.resize(plan.device_w, plan.device_h);
    let hidden = slots.hide_from(config.grid.point_count(plan.logical_w, plan.logical_h));
    if hidden > 0 {
        log::debug!("capture resized; hid {hidden} slots past the new grid");
    }
}

impl<S, G> App for FrameDriver<S, G>
where
    S: Scene,
    G: GlyphSubsystem,
{
    fn on_gesture(&mut self, gesture: Gesture) {
        self.scene.handle_gesture(gesture);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        match self.run_frame(ctx) {
            Ok(()) => AppControl::Continue,
            Err(e) => {
                log::error!("overlay frame failed: {e:#}");
                self.phase.reset();
                AppControl::Exit
            }
        }
    }

    fn on_exit(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{GlyphId, GridSpec};
    use crate::luminance::pack_rgba;
    use crate::render::RenderTarget;

    #[derive(Default)]
    struct RecordingGlyphs {
        allocated: usize,
        transforms: Vec<(GlyphId, f32, f32, f32, f32)>,
    }

    impl GlyphSubsystem for RecordingGlyphs {
        fn allocate(&mut self, count: usize) -> Vec<GlyphId> {
            let start = self.allocated;
            self.allocated += count;
            (start..start + count).map(|i| GlyphId(i as u32)).collect()
        }

        fn set_transform(&mut self, id: GlyphId, x: f32, y: f32, rotation: f32, intensity: f32) {
            self.transforms.push((id, x, y, rotation, intensity));
        }

        fn draw(&mut self, _ctx: &RenderCtx<'_>, _target: &mut RenderTarget<'_>) {}
    }

    #[derive(Default)]
    struct CountingScene {
        resizes: Vec<(u32, u32)>,
        teardowns: usize,
        gestures: Vec<Gesture>,
    }

    impl Scene for CountingScene {
        fn initialize(&mut self, _ctx: &RenderCtx<'_>) {}
        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }
        fn update(&mut self, _dt: f32) {}
        fn render(&mut self, _ctx: &RenderCtx<'_>, _target: &mut RenderTarget<'_>) {}
        fn teardown(&mut self) {
            self.teardowns += 1;
        }
        fn handle_gesture(&mut self, gesture: Gesture) {
            self.gestures.push(gesture);
        }
    }

    fn driver(capacity: usize, grid: GridSpec) -> FrameDriver<CountingScene, RecordingGlyphs> {
        let config = OverlayConfig {
            glyph_capacity: capacity,
            grid,
            ..OverlayConfig::default()
        };
        FrameDriver::new(config, CountingScene::default(), RecordingGlyphs::default())
    }

    /// 2×2 frame with distinct gray levels 0, 51, 102, 153 in row-major order.
    fn gray_ramp() -> RawFrame {
        let px = |k: u8| pack_rgba(k, k, k, 0xFF);
        RawFrame::from_pixels(2, 2, vec![px(0), px(51), px(102), px(153)]).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn allocates_capacity_once() {
        let d = driver(3000, GridSpec::default());
        assert_eq!(d.slots().len(), 3000);
        assert_eq!(d.glyphs.allocated, 3000);
        assert_eq!(d.phase(), FramePhase::Idle);
    }

    fn solid(width: u32, height: u32, k: u8) -> RawFrame {
        let px = pack_rgba(k, k, k, 0xFF);
        RawFrame::from_pixels(width, height, vec![px; (width * height) as usize]).unwrap()
    }

    /// Runs the CPU side of one frame at `width` × `height` (dpr 1) the way
    /// `run_frame` does, with `resized` standing in for a reconfigured capture.
    fn cpu_frame(
        d: &mut FrameDriver<CountingScene, RecordingGlyphs>,
        frame: RawFrame,
        resized: bool,
        status: PresentStatus,
    ) -> Result<SampleStats> {
        let (plan, dpr) = d
            .begin_frame((frame.width(), frame.height()), 1.0)?
            .expect("non-empty frame");
        if resized {
            capture_resized(&mut d.scene, &mut d.slots, &d.config, plan);
        }
        d.frame = frame;
        d.phase.advance(FramePhase::CapturedFrame)?;
        let stats = d.process_capture(plan.logical_w, plan.logical_h, dpr)?;
        d.finish_present(status)?;
        Ok(stats)
    }

    // ── frame planning ────────────────────────────────────────────────────

    #[test]
    fn plan_rejects_empty_window() {
        assert_eq!(FramePlan::new(0, 600, 1.0), None);
        assert_eq!(FramePlan::new(800, 0, 2.0), None);
    }

    #[test]
    fn plan_derives_logical_size() {
        let plan = FramePlan::new(1601, 1200, 2.0).unwrap();
        assert_eq!((plan.device_w, plan.device_h), (1601, 1200));
        assert_eq!((plan.logical_w, plan.logical_h), (800, 600));
    }

    #[test]
    fn zero_sized_window_skips_frame() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        assert!(d.begin_frame((0, 480), 1.0).unwrap().is_none());
        assert_eq!(d.phase(), FramePhase::Idle);

        assert!(d.begin_frame((640, 480), 1.0).unwrap().is_some());
        assert_eq!(d.phase(), FramePhase::Rendering);
    }

    #[test]
    fn begin_frame_uses_configured_ratio() {
        let mut d = driver(4, GridSpec::default());
        d.config.device_pixel_ratio = Some(2.0);
        let (plan, dpr) = d.begin_frame((200, 100), 1.0).unwrap().unwrap();
        assert_eq!(dpr, 2.0);
        assert_eq!((plan.logical_w, plan.logical_h), (100, 50));
    }

    // ── presentation ──────────────────────────────────────────────────────

    #[test]
    fn presented_frame_returns_to_idle() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        cpu_frame(&mut d, gray_ramp(), true, PresentStatus::Presented).unwrap();
        assert_eq!(d.phase(), FramePhase::Idle);
    }

    #[test]
    fn skipped_present_resets_to_idle() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        cpu_frame(&mut d, gray_ramp(), true, PresentStatus::Skipped).unwrap();
        assert_eq!(d.phase(), FramePhase::Idle);

        // The next frame starts cleanly.
        cpu_frame(&mut d, gray_ramp(), false, PresentStatus::Presented).unwrap();
        assert_eq!(d.phase(), FramePhase::Idle);
    }

    #[test]
    fn lost_surface_is_an_error() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        assert!(cpu_frame(&mut d, gray_ramp(), true, PresentStatus::Lost).is_err());
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn scene_resized_only_on_reconfigure() {
        let mut d = driver(16, GridSpec::new(0, 0, 1, 1));
        cpu_frame(&mut d, solid(4, 4, 0), true, PresentStatus::Presented).unwrap();
        cpu_frame(&mut d, solid(4, 4, 0), false, PresentStatus::Presented).unwrap();
        cpu_frame(&mut d, solid(2, 2, 0), true, PresentStatus::Presented).unwrap();
        assert_eq!(d.scene().resizes, vec![(4, 4), (2, 2)]);
    }

    #[test]
    fn shrinking_capture_hides_slots_past_new_grid() {
        let mut d = driver(16, GridSpec::new(0, 0, 1, 1));
        let stats = cpu_frame(&mut d, solid(4, 4, 0xFF), true, PresentStatus::Presented).unwrap();
        assert_eq!(stats.updated, 16);
        assert!(d.slots().iter().all(|s| s.opacity == 1.0));

        let stats = cpu_frame(&mut d, solid(2, 2, 0), true, PresentStatus::Presented).unwrap();
        assert_eq!(stats.updated, 4);
        let lit: Vec<usize> = d
            .slots()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.opacity != 0.0)
            .map(|(i, _)| i)
            .collect();
        assert!(lit.is_empty(), "slots still lit after shrink: {lit:?}");

        // The subsystem received the hidden state too.
        let last_push = &d.glyphs.transforms[d.glyphs.transforms.len() - 16..];
        assert!(last_push.iter().all(|t| t.4 == 0.0));
    }

    #[test]
    fn unchanged_size_keeps_slots_past_grid() {
        let mut d = driver(8, GridSpec::new(0, 0, 1, 1));
        d.slots.iter_mut().for_each(|s| s.opacity = 0.5);
        cpu_frame(&mut d, solid(2, 2, 0), false, PresentStatus::Presented).unwrap();
        assert!(d.slots().iter().skip(4).all(|s| s.opacity == 0.5));
    }

    // ── capture processing ────────────────────────────────────────────────

    #[test]
    fn process_capture_drives_slots_from_frame() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        d.frame = gray_ramp();
        d.phase = FramePhase::CapturedFrame;

        let stats = d.process_capture(2, 2, 1.0).unwrap();
        assert_eq!(stats, SampleStats { points: 4, updated: 4 });
        assert_eq!(d.phase(), FramePhase::Sampled);

        let pushed: Vec<_> = d.glyphs.transforms.iter().map(|t| (t.1, t.2, t.4)).collect();
        assert_eq!(
            pushed,
            vec![
                (0.0, 0.0, 0.0),
                (1.0, 0.0, 0.2),
                (0.0, 1.0, 0.4),
                (1.0, 1.0, 0.6),
            ]
        );
    }

    #[test]
    fn process_capture_truncates_at_capacity() {
        let mut d = driver(2, GridSpec::new(0, 0, 1, 1));
        d.frame = gray_ramp();
        d.phase = FramePhase::CapturedFrame;

        let stats = d.process_capture(2, 2, 1.0).unwrap();
        assert_eq!(stats.updated, 2);
        assert_eq!(stats.dropped(), 2);
        assert_eq!(d.glyphs.transforms.len(), 2);
        assert!(d.reported_truncation);
    }

    #[test]
    fn process_capture_honours_flip() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        d.config.flip_luminance = true;
        d.frame = gray_ramp();
        d.phase = FramePhase::CapturedFrame;

        d.process_capture(2, 2, 1.0).unwrap();
        assert_eq!(d.field().values(), &[0.4, 0.6, 0.0, 0.2]);
    }

    #[test]
    fn process_capture_requires_captured_frame() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        d.frame = gray_ramp();
        assert!(d.process_capture(2, 2, 1.0).is_err());
        assert_eq!(d.phase(), FramePhase::Idle);
        assert!(d.glyphs.transforms.is_empty());
    }

    #[test]
    fn empty_capture_touches_no_slot() {
        let mut d = driver(4, GridSpec::new(0, 0, 1, 1));
        d.phase = FramePhase::CapturedFrame;
        let stats = d.process_capture(2, 2, 1.0).unwrap();
        assert_eq!(stats.updated, 0);
        assert!(d.slots().iter().all(|s| s.opacity == 0.0));
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn gestures_reach_the_scene() {
        let mut d = driver(1, GridSpec::default());
        d.on_gesture(Gesture::ToggleDebug(1));
        assert_eq!(d.scene().gestures, vec![Gesture::ToggleDebug(1)]);
    }

    #[test]
    fn shutdown_tears_scene_down_once() {
        let mut d = driver(1, GridSpec::default());
        d.scene_ready = true;
        d.on_exit();
        d.on_exit();
        assert_eq!(d.scene().teardowns, 1);
    }

    #[test]
    fn shutdown_skips_teardown_of_uninitialized_scene() {
        let mut d = driver(1, GridSpec::default());
        d.shutdown();
        assert_eq!(d.scene().teardowns, 0);
    }
}
