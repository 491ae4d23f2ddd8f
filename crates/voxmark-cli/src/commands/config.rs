//! Config command: prints the effective configuration.

use anyhow::{Context, Result};
use std::path::Path;
use voxmark_bridge::BridgeConfig;

use crate::ConfigArgs;

/// Prints the loaded (or default) configuration as YAML.
pub fn run(args: ConfigArgs, path: Option<&Path>) -> Result<()> {
    let config = if args.defaults {
        BridgeConfig::default()
    } else {
        super::load_config(path)?
    };
    let yaml = config.to_yaml().context("Failed to serialize config")?;
    print!("{yaml}");
    Ok(())
}
