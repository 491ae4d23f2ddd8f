//! Spot compositing scenarios checked voxel by voxel.

use voxmark_core::{Dims, Rgb, Spot, VoxelVolume};
use voxmark_math::{AxisScale, CoordinateMapper};
use voxmark_ops::{ImprintParams, SpotCompositor, reset_baseline};
use voxmark_transfer::{TransferFunction, TransferParams};

const DIMS: Dims = [10, 10, 10];

struct Scene {
    source: VoxelVolume,
    channels: [VoxelVolume; 3],
    transfer: TransferFunction,
}

impl Scene {
    /// Distinct, non-zero samples so every overwrite is observable.
    fn new() -> Self {
        let source = VoxelVolume::from_fn(DIMS, |x, y, z| (1 + x + 10 * y + 100 * z) as f32).unwrap();
        let transfer = TransferFunction::new(TransferParams::identity(2000.0)).unwrap();
        let mut channels = [
            VoxelVolume::new(DIMS).unwrap(),
            VoxelVolume::new(DIMS).unwrap(),
            VoxelVolume::new(DIMS).unwrap(),
        ];
        let [r, g, b] = &mut channels;
        reset_baseline(&source, &transfer, [r, g, b]).unwrap();
        Self {
            source,
            channels,
            transfer,
        }
    }

    fn compositor(&self) -> SpotCompositor {
        SpotCompositor::new(
            CoordinateMapper::new(AxisScale::IDENTITY),
            self.transfer,
            ImprintParams {
                radius_scale: 1.0,
                color_intensity: self.transfer.clamp_top(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn imprint(&mut self, spots: &[Spot]) {
        let comp = self.compositor();
        let [r, g, b] = &mut self.channels;
        comp.imprint_all(spots, &self.source, [r, g, b]).unwrap();
    }

    fn rgb(&self, x: usize, y: usize, z: usize) -> [f32; 3] {
        std::array::from_fn(|c| self.channels[c].get(x, y, z).unwrap())
    }
}

fn dist_sq(v: [usize; 3], c: [f32; 3]) -> f32 {
    (0..3).map(|a| (v[a] as f32 - c[a]).powi(2)).sum()
}

fn each_voxel(mut f: impl FnMut(usize, usize, usize)) {
    for z in 0..DIMS[2] {
        for y in 0..DIMS[1] {
            for x in 0..DIMS[0] {
                f(x, y, z);
            }
        }
    }
}

#[test]
fn single_red_spot_matches_brute_force_sphere() {
    let mut scene = Scene::new();
    let centre = [5.0, 5.0, 5.0];
    scene.imprint(&[Spot::new(1, centre, 2.0, Some(Rgb::RED))]);

    let mut inside = 0;
    each_voxel(|x, y, z| {
        let s = scene.source.get(x, y, z).unwrap();
        let got = scene.rgb(x, y, z);
        if dist_sq([x, y, z], centre) <= 4.0 {
            inside += 1;
            assert_eq!(got, [s, 0.0, 0.0], "inside voxel ({x}, {y}, {z})");
        } else {
            assert_eq!(got, [s, s, s], "outside voxel ({x}, {y}, {z})");
        }
    });
    // Lattice points within radius 2 of a lattice point.
    assert_eq!(inside, 33);
}

#[test]
fn overlapping_spots_last_write_wins() {
    let first = Spot::new(1, [4.0, 5.0, 5.0], 2.0, Some(Rgb::RED));
    let second = Spot::new(2, [6.0, 5.0, 5.0], 2.0, Some(Rgb::BLUE));

    let mut both = Scene::new();
    both.imprint(&[first.clone(), second.clone()]);
    let mut only_second = Scene::new();
    only_second.imprint(&[second.clone()]);

    let mut overlap = 0;
    each_voxel(|x, y, z| {
        let v = [x, y, z];
        let in_first = dist_sq(v, first.position) <= 4.0;
        let in_second = dist_sq(v, second.position) <= 4.0;
        if in_second {
            assert_eq!(both.rgb(x, y, z), only_second.rgb(x, y, z));
            if in_first {
                overlap += 1;
            }
        } else if in_first {
            let s = both.source.get(x, y, z).unwrap();
            assert_eq!(both.rgb(x, y, z), [s, 0.0, 0.0]);
        }
    });
    assert!(overlap > 0);
    let s = both.source.get(5, 5, 5).unwrap();
    assert_eq!(both.rgb(5, 5, 5), [0.0, 0.0, s]);
}

#[test]
fn uncolored_spots_leave_channels_untouched() {
    let mut scene = Scene::new();
    let before = scene.channels.clone();
    scene.imprint(&[
        Spot::new(1, [5.0, 5.0, 5.0], 3.0, None),
        Spot::new(2, [2.0, 2.0, 2.0], 2.0, Some(Rgb::default())),
        Spot::new(3, [7.0, 7.0, 7.0], 2.0, Rgb::from_packed(0)),
    ]);
    assert_eq!(scene.channels, before);
}

#[test]
fn spot_at_origin_clips_without_negative_indices() {
    let mut scene = Scene::new();
    let centre = [0.0, 0.0, 0.0];
    scene.imprint(&[Spot::new(1, centre, 3.0, Some(Rgb::GREEN))]);

    each_voxel(|x, y, z| {
        let s = scene.source.get(x, y, z).unwrap();
        let expect = if dist_sq([x, y, z], centre) <= 9.0 {
            [0.0, s, 0.0]
        } else {
            [s, s, s]
        };
        assert_eq!(scene.rgb(x, y, z), expect, "voxel ({x}, {y}, {z})");
    });
    assert_eq!(scene.rgb(2, 2, 0)[0], 0.0);
}

#[test]
fn spot_centred_outside_volume_paints_overlap_only() {
    let mut scene = Scene::new();
    let centre = [-1.0, -1.0, -1.0];
    scene.imprint(&[Spot::new(1, centre, 2.0, Some(Rgb::RED))]);

    let s = scene.source.get(0, 0, 0).unwrap();
    assert_eq!(scene.rgb(0, 0, 0), [s, 0.0, 0.0]);
    let s = scene.source.get(1, 0, 0).unwrap();
    assert_eq!(scene.rgb(1, 0, 0), [s, s, s]);
}

#[test]
fn spot_at_far_corner_clips() {
    let mut scene = Scene::new();
    let centre = [9.0, 9.0, 9.0];
    scene.imprint(&[Spot::new(1, centre, 1.0, Some(Rgb::BLUE))]);

    let mut inside = 0;
    each_voxel(|x, y, z| {
        if dist_sq([x, y, z], centre) <= 1.0 {
            inside += 1;
            assert_eq!(scene.rgb(x, y, z)[0], 0.0);
        }
    });
    // Corner voxel plus its three in-volume neighbours.
    assert_eq!(inside, 4);
}

#[test]
fn color_scaling_preserves_hue() {
    let mut scene = Scene::new();
    let color = Rgb::new(0.8, 0.4, 0.2);
    scene.imprint(&[Spot::new(1, [5.0, 5.0, 5.0], 0.0, Some(color))]);
    let [r, g, b] = scene.rgb(5, 5, 5);
    let s = scene.source.get(5, 5, 5).unwrap();
    approx::assert_relative_eq!(r, s * 0.8);
    approx::assert_relative_eq!(r / g, 2.0);
    approx::assert_relative_eq!(g / b, 2.0);
}
