//! CLI command implementations

pub mod config;
pub mod demo;
pub mod render;

use anyhow::{Context, Result};
use std::path::Path;
use voxmark_bridge::BridgeConfig;
use voxmark_ops::synthetic::SphereSource;

use crate::DatasetArgs;

/// Loads the config file, or defaults when none was given.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    match path {
        Some(p) => BridgeConfig::from_file(p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => Ok(BridgeConfig::default()),
    }
}

/// Builds the synthetic dataset.
pub fn sphere_source(args: DatasetArgs) -> Result<SphereSource> {
    SphereSource::new([args.size; 3], args.frames, args.radius)
        .context("Invalid dataset parameters")
}
