//! Display range shared by the three channel buffers.

use serde::{Deserialize, Serialize};
use voxmark_core::{Error, Result};

/// Intensity window the renderer maps to black..full brightness.
///
/// All three channels are published with the same range so the composite
/// does not shift hue when one channel is rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayRange {
    /// Value shown as black
    pub min: f32,
    /// Value shown at full brightness
    pub max: f32,
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 2110.0,
        }
    }
}

impl DisplayRange {
    /// Creates a range, requiring finite `min < max`.
    pub fn new(min: f32, max: f32) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Checks finiteness and ordering.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(Error::invalid_parameter(
                "display_range",
                format!("need finite min < max, got [{}, {}]", self.min, self.max),
            ));
        }
        Ok(())
    }

    /// Width of the window.
    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Position of `v` inside the window, clamped to `[0, 1]`.
    #[inline]
    pub fn normalize(&self, v: f32) -> f32 {
        ((v - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(DisplayRange::new(5.0, 5.0).is_err());
        assert!(DisplayRange::new(6.0, 5.0).is_err());
        assert!(DisplayRange::new(0.0, f32::INFINITY).is_err());
        assert!(DisplayRange::new(-1.0, 5.0).is_ok());
    }

    #[test]
    fn test_normalize() {
        let r = DisplayRange::new(100.0, 300.0).unwrap();
        assert_eq!(r.normalize(50.0), 0.0);
        assert_eq!(r.normalize(200.0), 0.5);
        assert_eq!(r.normalize(1000.0), 1.0);
    }
}
