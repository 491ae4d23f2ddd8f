//! Properties of the intensity transfer function over realistic 16-bit input.

use approx::assert_relative_eq;
use voxmark_transfer::{TransferFunction, TransferParams};

fn samples() -> impl Iterator<Item = f32> {
    (0..=u16::MAX as u32).step_by(97).map(|v| v as f32)
}

#[test]
fn identity_params_clamp_to_range() {
    let top = u16::MAX as f32;
    let tf = TransferFunction::new(TransferParams::identity(top)).unwrap();
    for v in samples() {
        assert_eq!(tf.apply(v), v.clamp(0.0, top));
    }
    assert_eq!(tf.apply(-3.0), 0.0);
}

#[test]
fn output_never_exceeds_clamp() {
    for gamma in [0.5, 1.0, 1.8] {
        let tf = TransferFunction::new(TransferParams {
            contrast: 3.5,
            shift: 40.0,
            clamp_top: 700.0,
            gamma,
        })
        .unwrap();
        for v in samples() {
            let out = tf.apply(v);
            assert!((0.0..=700.0).contains(&out), "gamma {gamma} v {v} -> {out}");
        }
    }
}

#[test]
fn gamma_curve_is_monotonic() {
    let tf = TransferFunction::new(TransferParams {
        contrast: 1.0,
        shift: 0.0,
        clamp_top: 4000.0,
        gamma: 2.2,
    })
    .unwrap();
    let mut prev = 0.0;
    for v in samples() {
        let out = tf.apply(v);
        assert!(out >= prev);
        prev = out;
    }
    assert_relative_eq!(prev, 4000.0, epsilon = 1e-2);
}

#[test]
fn gamma_one_matches_clamp_only_form() {
    let p = TransferParams {
        contrast: 1.7,
        shift: 12.0,
        clamp_top: 900.0,
        gamma: 1.0,
    };
    let tf = TransferFunction::new(p).unwrap();
    for v in samples() {
        assert_eq!(tf.apply(v), (p.contrast * v + p.shift).min(p.clamp_top));
    }
}
