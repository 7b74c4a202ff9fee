use core::ops::Sub;

/// Pointer position in logical window pixels, origin top-left.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Offset from `rhs` to `self`, e.g. the distance covered by a pan.
impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_offset() {
        let d = Vec2::new(30.0, 5.0) - Vec2::new(10.0, 8.0);
        assert_eq!(d, Vec2::new(20.0, -3.0));
    }
}
