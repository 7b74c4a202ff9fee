/// Regular sampling grid in logical pixels.
///
/// Points start at `(margin_x, margin_y)` and advance by `(step_x, step_y)`
/// while `x < width - margin_x` and `y < height - margin_y`.
/// A step of `0` is treated as `1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridSpec {
    pub margin_x: u32,
    pub margin_y: u32,
    pub step_x: u32,
    pub step_y: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            margin_x: 15,
            margin_y: 27,
            step_x: 12,
            step_y: 12,
        }
    }
}

impl GridSpec {
    pub const fn new(margin_x: u32, margin_y: u32, step_x: u32, step_y: u32) -> Self {
        Self { margin_x, margin_y, step_x, step_y }
    }

    /// Number of positions along one axis of length `extent`.
    fn axis_count(extent: u32, margin: u32, step: u32) -> u32 {
        let end = extent.saturating_sub(margin);
        if end <= margin {
            return 0;
        }
        (end - margin).div_ceil(step.max(1))
    }

    /// Grid points for a `width` × `height` logical frame, row-major:
    /// all points of the first row left to right, then the next row.
    pub fn points(&self, width: u32, height: u32) -> GridPoints {
        let cols = Self::axis_count(width, self.margin_x, self.step_x);
        let rows = Self::axis_count(height, self.margin_y, self.step_y);
        GridPoints {
            spec: *self,
            cols,
            total: cols as u64 * rows as u64,
            next: 0,
        }
    }

    /// Total number of points for a `width` × `height` logical frame.
    pub fn point_count(&self, width: u32, height: u32) -> usize {
        self.points(width, height).len()
    }
}

/// Row-major iterator over [`GridSpec`] points.
#[derive(Debug, Clone)]
pub struct GridPoints {
    spec: GridSpec,
    cols: u32,
    total: u64,
    next: u64,
}

impl Iterator for GridPoints {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let col = (self.next % self.cols as u64) as u32;
        let row = (self.next / self.cols as u64) as u32;
        self.next += 1;
        Some((
            self.spec.margin_x + col * self.spec.step_x.max(1),
            self.spec.margin_y + row * self.spec.step_y.max(1),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridPoints {}
