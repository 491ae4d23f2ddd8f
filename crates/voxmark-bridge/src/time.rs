//! Time cursor for playback detached from the viewer's own time.

/// Time index clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCursor {
    min: usize,
    max: usize,
    current: usize,
}

impl TimeCursor {
    /// Creates a cursor at `min`. Swapped bounds are reordered.
    pub fn new(min: usize, max: usize) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            current: min,
        }
    }

    /// Cursor spanning `count` time indices starting at 0.
    pub fn for_timepoints(count: usize) -> Self {
        Self::new(0, count.saturating_sub(1))
    }

    /// Lowest index.
    #[inline]
    pub fn min(&self) -> usize {
        self.min
    }

    /// Highest index.
    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Current index.
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Moves to `t`, clamped into range.
    pub fn set(&mut self, t: usize) -> usize {
        self.current = t.clamp(self.min, self.max);
        self.current
    }

    /// Steps back, stopping at `min`.
    pub fn prev(&mut self) -> usize {
        self.set(self.current.saturating_sub(1))
    }

    /// Steps forward, stopping at `max`.
    pub fn next(&mut self) -> usize {
        self.set(self.current.saturating_add(1))
    }

    /// Playback step: negative indices jump to `max`, others wrap past `max`
    /// back to 0.
    pub fn show(&mut self, t: i64) -> usize {
        let wrapped = match usize::try_from(t) {
            Ok(t) => t % (self.max + 1),
            Err(_) => self.max,
        };
        self.set(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_steps() {
        let mut c = TimeCursor::new(2, 5);
        assert_eq!(c.current(), 2);
        assert_eq!(c.prev(), 2);
        assert_eq!(c.set(9), 5);
        assert_eq!(c.next(), 5);
        assert_eq!(c.prev(), 4);
        assert_eq!(c.set(0), 2);
    }

    #[test]
    fn test_show_wraps() {
        let mut c = TimeCursor::for_timepoints(10);
        assert_eq!(c.show(3), 3);
        assert_eq!(c.show(9), 9);
        assert_eq!(c.show(10), 0);
        assert_eq!(c.show(23), 3);
        assert_eq!(c.show(-1), 9);
    }

    #[test]
    fn test_show_respects_min() {
        let mut c = TimeCursor::new(4, 7);
        // 9 % 8 = 1, clamped up to the lower bound
        assert_eq!(c.show(9), 4);
    }

    #[test]
    fn test_degenerate() {
        let mut c = TimeCursor::for_timepoints(0);
        assert_eq!((c.min(), c.max()), (0, 0));
        assert_eq!(c.show(5), 0);
        assert_eq!(TimeCursor::new(6, 1).min(), 1);
    }
}
