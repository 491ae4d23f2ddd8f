//! Bridge configuration.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```yaml
//! source:
//!   resolution_level: 1
//!   voxel_size: [0.2, 0.2, 1.0]
//! transfer:
//!   contrast: 2.0
//!   shift: 0.0
//!   clamp_top: 700.0
//!   gamma: 1.0
//! imprint:
//!   enabled: true
//!   radius_scale: 3.0
//!   color_intensity: 2100.0
//!   boost: false
//! display:
//!   min: 0.0
//!   max: 2110.0
//! timing:
//!   content_quiet_ms: 10
//!   view_quiet_ms: 10
//!   spot_quiet_ms: 10
//!   settle_delay_ms: 50
//! camera:
//!   flips: { x: false, y: true, z: true }
//!   scene_scale: 1.0
//! auto_update: true
//! ```
//!
//! ```rust
//! use voxmark_bridge::BridgeConfig;
//!
//! let cfg = BridgeConfig::from_yaml_str("transfer: { gamma: 0.5 }").unwrap();
//! assert_eq!(cfg.transfer.gamma, 0.5);
//! assert_eq!(cfg.transfer.clamp_top, 700.0);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use voxmark_math::AxisFlips;
use voxmark_ops::{ImprintParams, RefreshOptions, RenderSettings};
use voxmark_transfer::{DisplayRange, TransferParams};

use crate::error::{BridgeError, BridgeResult};

/// Which part of the source is composited.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Resolution level; 0 is full resolution.
    pub resolution_level: usize,
    /// Physical voxel edge lengths, overriding the source metadata.
    pub voxel_size: Option<[f32; 3]>,
}

/// Debounce and publish timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet period of content changes.
    pub content_quiet_ms: u64,
    /// Quiet period of view changes.
    pub view_quiet_ms: u64,
    /// Quiet period of spot moves.
    pub spot_quiet_ms: u64,
    /// Pause between publishing consecutive channels.
    pub settle_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            content_quiet_ms: 10,
            view_quiet_ms: 10,
            spot_quiet_ms: 10,
            settle_delay_ms: 50,
        }
    }
}

impl TimingConfig {
    /// Content quiet period.
    pub fn content_quiet(&self) -> Duration {
        Duration::from_millis(self.content_quiet_ms)
    }

    /// View quiet period.
    pub fn view_quiet(&self) -> Duration {
        Duration::from_millis(self.view_quiet_ms)
    }

    /// Spot-moved quiet period.
    pub fn spot_quiet(&self) -> Duration {
        Duration::from_millis(self.spot_quiet_ms)
    }

    /// Channel settle delay.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Camera synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Quaternion sign flips between the two viewer conventions.
    pub flips: AxisFlips,
    /// Uniform scale of the volume node in the sink scene.
    pub scene_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            flips: AxisFlips::default(),
            scene_scale: 1.0,
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Source selection.
    pub source: SourceConfig,
    /// Intensity transfer curve.
    pub transfer: TransferParams,
    /// Spot imprinting.
    pub imprint: ImprintParams,
    /// Display range shared by the three channels.
    pub display: DisplayRange,
    /// Debounce timing.
    pub timing: TimingConfig,
    /// Camera synchronisation.
    pub camera: CameraConfig,
    /// Refresh automatically on settled content changes.
    pub auto_update: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            transfer: TransferParams::default(),
            imprint: ImprintParams::default(),
            display: DisplayRange::default(),
            timing: TimingConfig::default(),
            camera: CameraConfig::default(),
            auto_update: true,
        }
    }
}

impl BridgeConfig {
    /// Loads and validates a config file.
    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading bridge config");
        Self::from_yaml_str(&content)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> BridgeResult<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        let cfg: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> BridgeResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks every section.
    pub fn validate(&self) -> BridgeResult<()> {
        self.render_settings().validate()?;
        if let Some(size) = self.source.voxel_size {
            if size.iter().any(|s| !s.is_finite() || *s <= 0.0) {
                return Err(BridgeError::invalid_config(
                    "source.voxel_size",
                    format!("{size:?}: every edge must be finite and > 0"),
                ));
            }
        }
        let t = &self.timing;
        for (field, ms) in [
            ("timing.content_quiet_ms", t.content_quiet_ms),
            ("timing.view_quiet_ms", t.view_quiet_ms),
            ("timing.spot_quiet_ms", t.spot_quiet_ms),
        ] {
            if ms == 0 {
                return Err(BridgeError::invalid_config(field, "must be > 0"));
            }
        }
        let scale = self.camera.scene_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BridgeError::invalid_config(
                "camera.scene_scale",
                format!("{scale}: must be finite and > 0"),
            ));
        }
        Ok(())
    }

    /// Per-pass tunables for the refresh controller.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            transfer: self.transfer,
            imprint: self.imprint,
            range: self.display,
        }
    }

    /// Construction options for the refresh controller.
    pub fn refresh_options(&self) -> RefreshOptions {
        RefreshOptions {
            level: self.source.resolution_level,
            voxel_size: self.source.voxel_size,
            settle_delay: self.timing.settle_delay(),
        }
    }
}
