//! # voxmark-bridge
//!
//! Keeps a scene viewer showing a spot-colored composite in step with a
//! tracking viewer.
//!
//! # Crate Structure
//!
//! - [`config`] - YAML configuration with defaults for every field
//! - [`viewer`] - traits for both viewers and the event adapter
//! - [`time`] - clamped, wrapping playback cursor
//! - [`bridge`] - subscription, debounce thread and refresh orchestration
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voxmark_bridge::{Bridge, BridgeConfig, SceneSink, Viewer};
//! use voxmark_ops::VolumeSource;
//!
//! fn run(
//!     viewer: Arc<dyn Viewer>,
//!     source: Arc<dyn VolumeSource>,
//!     sink: Arc<impl SceneSink + 'static>,
//! ) -> voxmark_bridge::BridgeResult<()> {
//!     let config = BridgeConfig::from_file("voxmark.yaml")?;
//!     let mut bridge = Bridge::builder(config)
//!         .on_content(|u| println!("time {} -> {:?}", u.time, u.outcome))
//!         .attach(viewer, source, sink)?;
//!     bridge.request_immediate_refresh(0)?;
//!     bridge.close()
//! }
//! ```
//!
//! # Used By
//!
//! - `voxmark-cli` - headless demo and single-pass rendering

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bridge;
pub mod config;
mod error;
pub mod time;
pub mod viewer;

pub use bridge::{Bridge, BridgeBuilder, ContentUpdate};
pub use config::{BridgeConfig, CameraConfig, SourceConfig, TimingConfig};
pub use error::{BridgeError, BridgeResult};
pub use time::TimeCursor;
pub use viewer::{EventAdapter, SceneSink, SubscriptionId, Viewer, ViewerEvent, ViewerListener};
