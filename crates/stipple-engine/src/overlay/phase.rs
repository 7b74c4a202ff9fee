use std::fmt;

/// Where the frame driver is within one frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FramePhase {
    #[default]
    Idle,
    /// Scene is rendering into the capture.
    Rendering,
    /// Capture has been read back into the raw frame.
    CapturedFrame,
    /// Luminance field is up to date.
    Reduced,
    /// Glyph slots carry this frame's transforms.
    Sampled,
    /// Glyph layer was drawn to the window.
    Presented,
}

impl FramePhase {
    /// The only phase reachable from `self`.
    pub fn next(self) -> FramePhase {
        match self {
            FramePhase::Idle => FramePhase::Rendering,
            FramePhase::Rendering => FramePhase::CapturedFrame,
            FramePhase::CapturedFrame => FramePhase::Reduced,
            FramePhase::Reduced => FramePhase::Sampled,
            FramePhase::Sampled => FramePhase::Presented,
            FramePhase::Presented => FramePhase::Idle,
        }
    }

    /// Moves to `to` if it is the next phase; otherwise leaves `self` unchanged.
    pub fn advance(&mut self, to: FramePhase) -> Result<(), PhaseError> {
        if self.next() != to {
            return Err(PhaseError { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    /// Abandons the current frame.
    pub fn reset(&mut self) {
        *self = FramePhase::Idle;
    }
}

/// Out-of-order phase transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PhaseError {
    pub from: FramePhase,
    pub to: FramePhase,
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid frame phase transition {:?} -> {:?} (expected {:?})",
            self.from,
            self.to,
            self.from.next()
        )
    }
}

impl std::error::Error for PhaseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_returns_to_idle() {
        let mut p = FramePhase::Idle;
        for to in [
            FramePhase::Rendering,
            FramePhase::CapturedFrame,
            FramePhase::Reduced,
            FramePhase::Sampled,
            FramePhase::Presented,
            FramePhase::Idle,
        ] {
            assert_eq!(p.advance(to), Ok(()));
        }
        assert_eq!(p, FramePhase::Idle);
    }

    #[test]
    fn skipping_a_phase_is_rejected() {
        let mut p = FramePhase::Rendering;
        let err = p.advance(FramePhase::Reduced).unwrap_err();
        assert_eq!(err, PhaseError { from: FramePhase::Rendering, to: FramePhase::Reduced });
        assert_eq!(p, FramePhase::Rendering);
    }

    #[test]
    fn going_backwards_is_rejected() {
        let mut p = FramePhase::Sampled;
        assert!(p.advance(FramePhase::Reduced).is_err());
        assert!(p.advance(FramePhase::Sampled).is_err());
    }

    #[test]
    fn reset_abandons_frame() {
        let mut p = FramePhase::Reduced;
        p.reset();
        assert_eq!(p, FramePhase::Idle);
        assert!(p.advance(FramePhase::Rendering).is_ok());
    }

    #[test]
    fn error_message_names_expected_phase() {
        let err = PhaseError { from: FramePhase::Idle, to: FramePhase::Presented };
        assert!(err.to_string().contains("expected Rendering"));
    }
}
