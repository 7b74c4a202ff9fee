use glam::{Mat4, Quat, Vec3};

const PITCH_LIMIT: f32 = 1.45;
const MIN_DISTANCE: f32 = 4.0;
const MAX_DISTANCE: f32 = 60.0;

/// Radians of orbit per logical pixel dragged.
const ORBIT_PER_PIXEL: f32 = 0.008;

/// Orbit camera around a fixed target, driven by gestures.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    /// Rotation around the view axis, radians.
    pub roll: f32,
    pub target: Vec3,
    pub fov_y: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.45,
            distance: 18.0,
            roll: 0.0,
            target: Vec3::ZERO,
            fov_y: 45f32.to_radians(),
        }
    }
}

impl OrbitCamera {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drag of `(dx, dy)` logical pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_PER_PIXEL;
        self.tilt(dy * ORBIT_PER_PIXEL);
    }

    /// `scale > 1` moves closer.
    pub fn zoom(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.distance = (self.distance / scale).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    pub fn spin(&mut self, radians: f32) {
        self.roll = (self.roll + radians) % std::f32::consts::TAU;
    }

    pub fn tilt(&mut self, radians: f32) {
        self.pitch = (self.pitch + radians).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cp * sy, sp, cp * cy)
    }

    pub fn view(&self) -> Mat4 {
        let eye = self.eye();
        let forward = (self.target - eye).normalize_or_zero();
        let up = Quat::from_axis_angle(forward, self.roll) * Vec3::Y;
        Mat4::look_at_rh(eye, self.target, up)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov_y, aspect, 0.1, 200.0) * self.view()
    }
}
