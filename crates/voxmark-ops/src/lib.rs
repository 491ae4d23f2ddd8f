//! # voxmark-ops
//!
//! Volume operations behind a spot-colored RGB composite.
//!
//! # Modules
//!
//! - [`baseline`] - transfer function into red, duplicated into green/blue
//! - [`compositor`] - spot imprinting with physical-distance acceptance
//! - [`channels`] - the three channel buffers shared with the renderer
//! - [`refresh`] - one complete refresh pass and its state machine
//! - [`source`] - traits for the data source and the renderer
//! - [`synthetic`] - procedural moving-sphere source
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use voxmark_core::Channel;
//! use voxmark_ops::{ChannelPublisher, RefreshController, RefreshOptions, RenderSettings};
//! use voxmark_ops::synthetic::SphereSource;
//!
//! struct Quiet;
//! impl ChannelPublisher for Quiet {
//!     fn publish_channel_update(&self, _: Channel) {}
//! }
//!
//! let source = Arc::new(SphereSource::new([32, 32, 32], 4, 6.0).unwrap());
//! let ctl = RefreshController::new(
//!     source,
//!     Arc::new(Quiet),
//!     RenderSettings::default(),
//!     RefreshOptions { settle_delay: Default::default(), ..Default::default() },
//! )
//! .unwrap();
//! assert!(ctl.refresh(0).unwrap().is_published());
//! ```
//!
//! # Parallelism
//!
//! With the default `parallel` feature, spot windows are imprinted one z
//! plane per rayon task. The baseline always runs on rayon through
//! `voxmark-core`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod baseline;
pub mod channels;
pub mod compositor;
pub mod refresh;
pub mod source;
pub mod synthetic;

pub use baseline::reset_baseline;
pub use channels::{ChannelsMut, SharedChannels};
pub use compositor::{ImprintParams, ImprintStats, SpotCompositor};
pub use refresh::{RefreshController, RefreshOptions, RefreshOutcome, RefreshState, RenderSettings};
pub use source::{ChannelPublisher, VolumeSource};
