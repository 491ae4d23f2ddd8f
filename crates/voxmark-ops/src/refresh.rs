//! Refresh pass orchestration.
//!
//! ```text
//! Idle -> ResettingBaseline -> Compositing -> Publishing -> Idle
//! ```
//!
//! A pass fetches the source volume and the visible spots first. If either
//! fetch fails, for whatever reason, the pass is skipped and the channels keep the previous
//! pass's content. Otherwise the baseline is rebuilt, spots are imprinted,
//! and the three channels are published one after another with a settle
//! delay in between.
//!
//! Passes are serialized: a pass requested while another runs waits for it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use voxmark_core::{Channel, Error, Result};
use voxmark_math::{AxisScale, CoordinateMapper};
use voxmark_transfer::{DisplayRange, TransferFunction, TransferParams};

use crate::baseline::reset_baseline;
use crate::channels::SharedChannels;
use crate::compositor::{ImprintParams, SpotCompositor};
use crate::source::{ChannelPublisher, VolumeSource};

/// Tunables read once at the start of every pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Intensity curve
    pub transfer: TransferParams,
    /// Spot imprinting
    pub imprint: ImprintParams,
    /// Display range published with every pass
    pub range: DisplayRange,
}

impl RenderSettings {
    /// Validates all three parts.
    pub fn validate(&self) -> Result<()> {
        self.transfer.validate()?;
        self.imprint.validate()?;
        self.range.validate()
    }
}

/// Where a refresh pass currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RefreshState {
    /// No pass running
    Idle = 0,
    /// Transfer function into the channels
    ResettingBaseline = 1,
    /// Imprinting spots
    Compositing = 2,
    /// Notifying the renderer channel by channel
    Publishing = 3,
}

impl RefreshState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::ResettingBaseline,
            2 => Self::Compositing,
            3 => Self::Publishing,
            _ => Self::Idle,
        }
    }
}

/// Result of one [`RefreshController::refresh`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New content was written and published.
    Published {
        /// Channel generation after the pass
        generation: u64,
        /// Spots that were imprinted
        spots_imprinted: usize,
    },
    /// Data was unavailable; previous content kept.
    Skipped {
        /// Why the pass was skipped
        reason: String,
    },
}

impl RefreshOutcome {
    /// Returns `true` for [`RefreshOutcome::Published`].
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Construction options of a [`RefreshController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshOptions {
    /// Resolution level to composite at
    pub level: usize,
    /// Voxel size overriding the source metadata
    pub voxel_size: Option<[f32; 3]>,
    /// Pause between publishing consecutive channels
    pub settle_delay: Duration,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            level: 0,
            voxel_size: None,
            settle_delay: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LevelState {
    level: usize,
    mapper: CoordinateMapper,
}

/// Runs refresh passes against one source and one publisher.
pub struct RefreshController {
    source: Arc<dyn VolumeSource>,
    publisher: Arc<dyn ChannelPublisher>,
    channels: Arc<SharedChannels>,
    settings: RwLock<RenderSettings>,
    level: RwLock<LevelState>,
    voxel_size: Option<[f32; 3]>,
    settle_delay: Duration,
    state: AtomicU8,
    pass: Mutex<()>,
}

impl std::fmt::Debug for RefreshController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshController")
            .field("level", &self.resolution_level())
            .field("state", &self.state())
            .field("generation", &self.channels.generation())
            .finish_non_exhaustive()
    }
}

impl RefreshController {
    /// Creates a controller and allocates channels for `options.level`.
    pub fn new(
        source: Arc<dyn VolumeSource>,
        publisher: Arc<dyn ChannelPublisher>,
        settings: RenderSettings,
        options: RefreshOptions,
    ) -> Result<Self> {
        settings.validate()?;
        let (dims, scale) = level_geometry(source.as_ref(), options.level, options.voxel_size)?;
        info!(level = options.level, ?dims, scale = ?scale.as_array(), "refresh controller ready");
        Ok(Self {
            source,
            publisher,
            channels: Arc::new(SharedChannels::new(dims)?),
            settings: RwLock::new(settings),
            level: RwLock::new(LevelState {
                level: options.level,
                mapper: CoordinateMapper::new(scale),
            }),
            voxel_size: options.voxel_size,
            settle_delay: options.settle_delay,
            state: AtomicU8::new(RefreshState::Idle as u8),
            pass: Mutex::new(()),
        })
    }

    /// Channel buffers, for the renderer.
    pub fn channels(&self) -> Arc<SharedChannels> {
        Arc::clone(&self.channels)
    }

    /// Current pass state.
    pub fn state(&self) -> RefreshState {
        RefreshState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> RenderSettings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the settings after validation; takes effect at the next pass.
    pub fn set_settings(&self, settings: RenderSettings) -> Result<()> {
        settings.validate()?;
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
        Ok(())
    }

    /// Updates the settings in place after validation.
    pub fn update_settings(&self, f: impl FnOnce(&mut RenderSettings)) -> Result<()> {
        let mut next = self.settings();
        f(&mut next);
        self.set_settings(next)
    }

    /// Resolution level in use.
    pub fn resolution_level(&self) -> usize {
        self.level.read().unwrap_or_else(PoisonError::into_inner).level
    }

    /// Coordinate mapper of the current level.
    pub fn mapper(&self) -> CoordinateMapper {
        self.level.read().unwrap_or_else(PoisonError::into_inner).mapper
    }

    /// Switches resolution level, recomputing the axis scale and
    /// reallocating the channels. Waits for a running pass.
    pub fn set_resolution_level(&self, level: usize) -> Result<()> {
        let _pass = self.lock_pass();
        let (dims, scale) = level_geometry(self.source.as_ref(), level, self.voxel_size)?;
        self.channels.reallocate(dims)?;
        *self.level.write().unwrap_or_else(PoisonError::into_inner) = LevelState {
            level,
            mapper: CoordinateMapper::new(scale),
        };
        info!(level, ?dims, scale = ?scale.as_array(), "resolution level changed");
        Ok(())
    }

    /// Runs one pass for `time`.
    ///
    /// Any failure to fetch the volume or the spots yields `Ok(Skipped)`;
    /// only the controller's own configuration problems are errors.
    pub fn refresh(&self, time: usize) -> Result<RefreshOutcome> {
        let _pass = self.lock_pass();
        let settings = self.settings();
        let LevelState { level, mapper } = *self.level.read().unwrap_or_else(PoisonError::into_inner);
        let transfer = TransferFunction::new(settings.transfer)?;
        let compositor = SpotCompositor::new(mapper, transfer, settings.imprint)?;

        let source = match self.source.source_volume(time, level) {
            Ok(v) => v,
            Err(e) => return Ok(self.skip(time, e)),
        };
        let spots = if settings.imprint.enabled {
            match self.source.visible_spots(time) {
                Ok(s) => s,
                Err(e) => return Ok(self.skip(time, e)),
            }
        } else {
            Vec::new()
        };
        let dims = self.channels.dims();
        if source.dims() != dims {
            return Err(Error::dimension_mismatch(source.dims(), dims));
        }

        let _state = StateGuard(&self.state);
        let stats = {
            let mut guard = self.channels.write_all();
            self.set_state(RefreshState::ResettingBaseline);
            reset_baseline(&source, &transfer, guard.split())?;
            self.set_state(RefreshState::Compositing);
            compositor.imprint_all(&spots, &source, guard.split())?
        };
        let generation = self.channels.bump_generation();

        self.set_state(RefreshState::Publishing);
        self.publisher.set_display_range(settings.range);
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            if i > 0 && !self.settle_delay.is_zero() {
                thread::sleep(self.settle_delay);
            }
            self.publisher.publish_channel_update(channel);
        }

        debug!(time, level, generation, spots = stats.spots_imprinted, "refresh published");
        Ok(RefreshOutcome::Published {
            generation,
            spots_imprinted: stats.spots_imprinted,
        })
    }

    fn skip(&self, time: usize, err: Error) -> RefreshOutcome {
        warn!(
            time,
            transient = err.is_transient(),
            error = %err,
            "refresh skipped, keeping previous content"
        );
        RefreshOutcome::Skipped {
            reason: err.to_string(),
        }
    }

    fn set_state(&self, state: RefreshState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn lock_pass(&self) -> MutexGuard<'_, ()> {
        self.pass.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the state to idle however the pass ends.
struct StateGuard<'a>(&'a AtomicU8);

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(RefreshState::Idle as u8, Ordering::Release);
    }
}

fn level_geometry(
    source: &dyn VolumeSource,
    level: usize,
    voxel_size: Option<[f32; 3]>,
) -> Result<([usize; 3], AxisScale)> {
    let available = source.num_levels();
    if level >= available {
        return Err(Error::UnknownLevel { level, available });
    }
    let full = source.level_dims(0)?;
    let dims = source.level_dims(level)?;
    let voxel_size = voxel_size.unwrap_or_else(|| source.voxel_size());
    let scale = AxisScale::from_geometry(voxel_size, full, dims)?;
    Ok((dims, scale))
}
