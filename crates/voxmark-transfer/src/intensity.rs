//! Intensity transfer function and its runtime control.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use voxmark_core::{Error, Result, VoxelVolume};

use crate::gamma::gamma_eotf;
use crate::range::DisplayRange;

/// Tunables of the intensity curve.
///
/// Unvalidated; build a [`TransferFunction`] to check them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferParams {
    /// Multiplier applied to the raw sample
    pub contrast: f32,
    /// Offset added after the multiplier
    pub shift: f32,
    /// Output ceiling, also the normalization base of the gamma curve
    pub clamp_top: f32,
    /// Gamma exponent on the normalized value
    pub gamma: f32,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            contrast: 2.0,
            shift: 0.0,
            clamp_top: 700.0,
            gamma: 1.0,
        }
    }
}

impl TransferParams {
    /// Identity-like curve: `f(v) = clamp(v, 0, clamp_top)`.
    pub const fn identity(clamp_top: f32) -> Self {
        Self {
            contrast: 1.0,
            shift: 0.0,
            clamp_top,
            gamma: 1.0,
        }
    }

    /// Checks every parameter, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        if !self.clamp_top.is_finite() || self.clamp_top <= 0.0 {
            return Err(Error::invalid_parameter(
                "clamp_top",
                format!("must be finite and > 0, got {}", self.clamp_top),
            ));
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(Error::invalid_parameter(
                "gamma",
                format!("must be finite and > 0, got {}", self.gamma),
            ));
        }
        if !self.contrast.is_finite() {
            return Err(Error::invalid_parameter("contrast", "must be finite"));
        }
        if !self.shift.is_finite() {
            return Err(Error::invalid_parameter("shift", "must be finite"));
        }
        Ok(())
    }
}

/// Validated intensity curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferFunction {
    params: TransferParams,
}

impl TransferFunction {
    /// Validates `params`.
    ///
    /// A zero clamp ceiling is a configuration error, not a division by zero.
    pub fn new(params: TransferParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters in use.
    #[inline]
    pub const fn params(&self) -> TransferParams {
        self.params
    }

    /// Output ceiling.
    #[inline]
    pub const fn clamp_top(&self) -> f32 {
        self.params.clamp_top
    }

    /// Maps one raw sample.
    #[inline]
    pub fn apply(&self, v: f32) -> f32 {
        let p = &self.params;
        let x = (p.contrast * v + p.shift).clamp(0.0, p.clamp_top);
        // Exact comparison: gamma 1 skips pow and its rounding.
        if p.gamma == 1.0 {
            x
        } else {
            p.clamp_top * gamma_eotf(x / p.clamp_top, p.gamma)
        }
    }
}

/// Transfer parameters and display range with the auto-adjust toggle.
///
/// Auto adjust derives both from the volume maximum and remembers the
/// manual values so switching it off restores them.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityControl {
    params: TransferParams,
    range: DisplayRange,
    backup: Option<(TransferParams, DisplayRange)>,
}

impl IntensityControl {
    /// Fraction of the volume maximum used as clamp ceiling.
    pub const AUTO_CLAMP: f32 = 0.9;
    /// Fraction of the volume maximum used as display minimum.
    pub const AUTO_RANGE_MIN: f32 = 0.15;
    /// Fraction of the volume maximum used as display maximum.
    pub const AUTO_RANGE_MAX: f32 = 0.75;

    /// Creates a control with manual values.
    pub fn new(params: TransferParams, range: DisplayRange) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            range,
            backup: None,
        })
    }

    /// Current transfer parameters.
    pub fn params(&self) -> TransferParams {
        self.params
    }

    /// Current display range.
    pub fn range(&self) -> DisplayRange {
        self.range
    }

    /// Replaces the transfer parameters after validation.
    pub fn set_params(&mut self, params: TransferParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Replaces the display range.
    pub fn set_range(&mut self, range: DisplayRange) {
        self.range = range;
    }

    /// Returns `true` while auto adjust is on.
    pub fn is_auto(&self) -> bool {
        self.backup.is_some()
    }

    /// Switches auto adjust and returns the new state.
    ///
    /// Switching on needs a volume with a positive maximum; otherwise nothing
    /// changes and an error is returned.
    pub fn toggle_auto_adjust(&mut self, volume: &VoxelVolume) -> Result<bool> {
        if let Some((params, range)) = self.backup.take() {
            self.params = params;
            self.range = range;
            info!("intensity auto adjust off, manual values restored");
            return Ok(false);
        }

        let max = volume.max_value();
        if max <= 0.0 {
            return Err(Error::invalid_parameter(
                "auto_adjust",
                "volume has no positive samples",
            ));
        }
        let range = DisplayRange::new(Self::AUTO_RANGE_MIN * max, Self::AUTO_RANGE_MAX * max)?;
        let params = TransferParams {
            clamp_top: Self::AUTO_CLAMP * max,
            ..self.params
        };
        params.validate()?;

        self.backup = Some((self.params, self.range));
        self.params = params;
        self.range = range;
        debug!(max, clamp_top = params.clamp_top, ?range, "intensity auto adjust on");
        Ok(true)
    }
}
