//! Render command: one refresh pass, one z-slice written as PNG.

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use voxmark_bridge::BridgeConfig;
use voxmark_core::{Channel, VoxelVolume};
use voxmark_ops::{RefreshController, RefreshOutcome, SharedChannels};
use voxmark_transfer::DisplayRange;

use crate::RenderArgs;
use crate::headless::HeadlessSink;

/// Composites `args.time` and writes the requested slice.
pub fn run(args: RenderArgs, config: BridgeConfig, verbose: bool) -> Result<()> {
    let source = Arc::new(super::sphere_source(args.dataset)?);
    let sink = Arc::new(HeadlessSink::default());
    let mut options = config.refresh_options();
    options.settle_delay = Default::default();

    let ctl = RefreshController::new(source, sink, config.render_settings(), options)
        .context("Failed to set up refresh")?;
    let outcome = ctl.refresh(args.time).context("Refresh failed")?;
    let spots = match outcome {
        RefreshOutcome::Published { spots_imprinted, .. } => spots_imprinted,
        RefreshOutcome::Skipped { reason } => bail!("Nothing rendered for t={}: {reason}", args.time),
    };

    let channels = ctl.channels();
    let [w, h, d] = channels.dims();
    let z = args.slice.unwrap_or(d / 2);
    if z >= d {
        bail!("Slice {z} outside volume depth {d}");
    }
    let rgb = slice_rgb8(&channels, z, config.display);
    write_png(&args.output, w, h, &rgb)?;

    if verbose {
        println!("Time:     {}", args.time);
        println!("Level:    {} ({}x{}x{})", ctl.resolution_level(), w, h, d);
        println!("Spots:    {spots}");
    }
    println!("Wrote {} (slice z={z})", args.output.display());
    Ok(())
}

/// Interleaved 8-bit RGB of plane `z`, mapped through `range`.
pub fn slice_rgb8(channels: &SharedChannels, z: usize, range: DisplayRange) -> Vec<u8> {
    let [w, h, _] = channels.dims();
    let plane = w * h;
    let guards = Channel::ALL.map(|c| channels.read(c));
    let planes: [&[f32]; 3] = std::array::from_fn(|i| plane_of(&guards[i], z, plane));

    let mut out = Vec::with_capacity(plane * 3);
    for i in 0..plane {
        for p in &planes {
            out.push((range.normalize(p[i]) * 255.0).round() as u8);
        }
    }
    out
}

fn plane_of(volume: &VoxelVolume, z: usize, plane: usize) -> &[f32] {
    &volume.as_slice()[z * plane..(z + 1) * plane]
}

fn write_png(path: &Path, width: usize, height: usize, rgb: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
    let (w, h) = (
        u32::try_from(width).context("Slice too wide for PNG")?,
        u32::try_from(height).context("Slice too tall for PNG")?,
    );
    let mut encoder = png::Encoder::new(BufWriter::new(file), w, h);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("Failed to write PNG header")?;
    writer.write_image_data(rgb).context("Failed to write PNG data")?;
    writer.finish().context("Failed to finish PNG")?;
    debug!(path = %path.display(), width, height, "slice written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmark_ops::synthetic::SphereSource;
    use voxmark_ops::{RefreshOptions, RenderSettings};

    fn rendered(imprint: bool) -> RefreshController {
        let source = Arc::new(SphereSource::new([24, 20, 16], 30, 6.0).unwrap());
        let mut settings = RenderSettings::default();
        settings.imprint.enabled = imprint;
        let ctl = RefreshController::new(
            source,
            Arc::new(HeadlessSink::default()),
            settings,
            RefreshOptions {
                settle_delay: Default::default(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(ctl.refresh(20).unwrap().is_published());
        ctl
    }

    #[test]
    fn test_slice_is_gray_without_spots() {
        let ctl = rendered(false);
        let rgb = slice_rgb8(&ctl.channels(), 8, DisplayRange::new(0.0, 700.0).unwrap());
        assert_eq!(rgb.len(), 24 * 20 * 3);
        assert!(rgb.chunks(3).all(|px| px[0] == px[1] && px[1] == px[2]));
        assert!(rgb.iter().any(|&v| v > 0));
    }

    #[test]
    fn test_slice_is_colored_with_spots() {
        let ctl = rendered(true);
        let rgb = slice_rgb8(&ctl.channels(), 8, DisplayRange::default());
        assert!(rgb.chunks(3).any(|px| px[1] > px[0]));
    }

    #[test]
    fn test_png_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.png");
        write_png(&path, 2, 1, &[255, 0, 0, 0, 255, 0]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
