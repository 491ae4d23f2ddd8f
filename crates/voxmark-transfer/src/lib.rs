//! # voxmark-transfer
//!
//! Mapping of raw microscope samples to displayed intensities.
//!
//! # Transfer Function
//!
//! Every source sample `v` passes through a contrast/shift/clamp/gamma curve
//! before it is replicated into the three channel buffers:
//!
//! ```text
//! x    = clamp(contrast * v + shift, 0, clamp_top)
//! f(v) = clamp_top * (x / clamp_top) ^ gamma      (gamma != 1)
//! f(v) = x                                        (gamma == 1, exact)
//! ```
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`gamma`] | power curve on normalized values |
//! | [`intensity`] | [`TransferParams`], [`TransferFunction`], [`IntensityControl`] |
//! | [`range`] | [`DisplayRange`] shared by all three channels |
//!
//! # Usage
//!
//! ```rust
//! use voxmark_transfer::{TransferFunction, TransferParams};
//!
//! let tf = TransferFunction::new(TransferParams::default()).unwrap();
//! assert_eq!(tf.apply(100.0), 200.0);
//! assert_eq!(tf.apply(1000.0), 700.0);
//! ```
//!
//! # Used By
//!
//! - `voxmark-ops` - baseline reset and spot imprint intensity
//! - `voxmark-bridge` - auto adjust and configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod gamma;
pub mod intensity;
pub mod range;

pub use gamma::gamma_eotf;
pub use intensity::{IntensityControl, TransferFunction, TransferParams};
pub use range::DisplayRange;
