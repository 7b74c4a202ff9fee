/// What the present path does after the window surface refuses a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was configured again; the next frame can present.
    Reconfigured,
    /// Drop this frame only.
    SkipFrame,
    /// The overlay cannot keep presenting.
    Fatal,
}

impl SurfaceErrorAction {
    /// Classifies `err`. `Reconfigured` means the caller must configure the
    /// surface again before the next acquire.
    pub fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_surface_is_reconfigured() {
        assert_eq!(SurfaceErrorAction::for_error(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::for_error(&wgpu::SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
    }

    #[test]
    fn only_oom_is_fatal() {
        assert_eq!(SurfaceErrorAction::for_error(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
        assert_eq!(SurfaceErrorAction::for_error(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(SurfaceErrorAction::for_error(&wgpu::SurfaceError::Other), SurfaceErrorAction::SkipFrame);
    }
}
