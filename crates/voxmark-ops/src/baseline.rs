//! Colorless baseline of the channel buffers.
//!
//! The transfer function runs once per source voxel into red; green and
//! blue are plain copies of red, since the baseline carries no color.

use tracing::trace;
use voxmark_core::{Result, VoxelVolume};
use voxmark_transfer::TransferFunction;

/// Resets `[red, green, blue]` to the transfer function of `source`.
///
/// All four volumes must share a shape; nothing is written otherwise.
pub fn reset_baseline(
    source: &VoxelVolume,
    transfer: &TransferFunction,
    channels: [&mut VoxelVolume; 3],
) -> Result<()> {
    let [red, green, blue] = channels;
    red.ensure_same_shape(source)?;
    green.ensure_same_shape(source)?;
    blue.ensure_same_shape(source)?;

    trace!(dims = ?source.dims(), "baseline reset");
    red.map_from(source, |v| transfer.apply(v))?;
    green.copy_from(red)?;
    blue.copy_from(red)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmark_transfer::TransferParams;

    #[test]
    fn test_baseline_replicates() {
        let src = VoxelVolume::from_fn([4, 4, 4], |x, y, z| (x + y + z) as f32 * 100.0).unwrap();
        let tf = TransferFunction::new(TransferParams::default()).unwrap();
        let mut r = VoxelVolume::new([4, 4, 4]).unwrap();
        let mut g = r.clone();
        let mut b = r.clone();
        reset_baseline(&src, &tf, [&mut r, &mut g, &mut b]).unwrap();

        assert_eq!(r.get(1, 0, 0), Some(200.0));
        assert_eq!(r.get(3, 3, 3), Some(700.0));
        assert_eq!(r, g);
        assert_eq!(r, b);
    }

    #[test]
    fn test_baseline_shape_mismatch_writes_nothing() {
        let src = VoxelVolume::from_fn([2, 2, 2], |_, _, _| 5.0).unwrap();
        let tf = TransferFunction::new(TransferParams::default()).unwrap();
        let mut r = VoxelVolume::new([2, 2, 2]).unwrap();
        let mut g = r.clone();
        let mut b = VoxelVolume::new([2, 2, 3]).unwrap();
        assert!(reset_baseline(&src, &tf, [&mut r, &mut g, &mut b]).is_err());
        assert_eq!(r.max_value(), 0.0);
    }
}
