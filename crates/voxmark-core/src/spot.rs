//! Annotated spots.
//!
//! A [`Spot`] is a tracked point-like object at one time index: a position
//! in physical (world) space, a physical radius and an optional color.
//! Spots are immutable snapshots for the duration of a refresh pass.

use serde::{Deserialize, Serialize};

/// Stable spot identifier assigned by the data source.
pub type SpotId = u64;

/// Linear RGB triple with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Rgb {
    /// Pure red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    /// Pure green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    /// Pure blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);

    /// Creates a color from components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decodes a packed `0xAARRGGBB` color.
    ///
    /// Packed `0` is the "no color" sentinel of colorizers and yields `None`.
    ///
    /// ```rust
    /// use voxmark_core::Rgb;
    ///
    /// assert_eq!(Rgb::from_packed(0), None);
    /// let c = Rgb::from_packed(0xFF_FF_00_00).unwrap();
    /// assert_eq!(c, Rgb::RED);
    /// ```
    pub fn from_packed(argb: u32) -> Option<Self> {
        if argb == 0 {
            return None;
        }
        Some(Self {
            r: ((argb >> 16) & 0xFF) as f32 / 255.0,
            g: ((argb >> 8) & 0xFF) as f32 / 255.0,
            b: (argb & 0xFF) as f32 / 255.0,
        })
    }

    /// Largest component.
    #[inline]
    pub fn max_component(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Returns `true` when no component is positive.
    #[inline]
    pub fn is_black(&self) -> bool {
        self.max_component() <= 0.0
    }

    /// Rescales so the largest component reaches 1.0, keeping hue ratios.
    ///
    /// Black stays black.
    pub fn boosted(&self) -> Self {
        let m = self.max_component();
        if m <= 0.0 {
            return *self;
        }
        Self::new(self.r / m, self.g / m, self.b / m)
    }

    /// Components as an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// An annotated point object at one time index.
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    /// Identifier
    pub id: SpotId,
    /// Centre in physical (world) space
    pub position: [f32; 3],
    /// Radius in physical units
    pub radius: f32,
    /// Color, or `None` for "do not imprint"
    pub color: Option<Rgb>,
}

impl Spot {
    /// Creates a spot.
    pub fn new(id: SpotId, position: [f32; 3], radius: f32, color: Option<Rgb>) -> Self {
        Self {
            id,
            position,
            radius,
            color,
        }
    }

    /// Color to imprint, or `None` when the spot must be skipped.
    ///
    /// Both the sentinel and an all-zero triple mean "skip", never "paint black".
    #[inline]
    pub fn imprint_color(&self) -> Option<Rgb> {
        self.color.filter(|c| !c.is_black())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_packed_channels() {
        let c = Rgb::from_packed(0xFF_80_40_20).unwrap();
        assert_relative_eq!(c.r, 128.0 / 255.0);
        assert_relative_eq!(c.g, 64.0 / 255.0);
        assert_relative_eq!(c.b, 32.0 / 255.0);
    }

    #[test]
    fn test_boost_preserves_ratio() {
        let c = Rgb::new(0.2, 0.1, 0.0).boosted();
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 0.5);
        assert_relative_eq!(c.b, 0.0);
        assert_eq!(Rgb::default().boosted(), Rgb::default());
    }

    #[test]
    fn test_imprint_color_skips_black() {
        let none = Spot::new(1, [0.0; 3], 1.0, None);
        let black = Spot::new(2, [0.0; 3], 1.0, Some(Rgb::default()));
        let red = Spot::new(3, [0.0; 3], 1.0, Some(Rgb::RED));
        assert!(none.imprint_color().is_none());
        assert!(black.imprint_color().is_none());
        assert_eq!(red.imprint_color(), Some(Rgb::RED));
    }
}
