//! Pure power-law gamma on normalized values.
//!
//! # Range
//!
//! - Input: normalized `[0, 1]`; non-positive inputs map to 0
//! - Output: `[0, 1]`

/// Power curve `v^gamma`, zero for `v <= 0`.
///
/// # Example
///
/// ```rust
/// use voxmark_transfer::gamma::gamma_eotf;
///
/// assert_eq!(gamma_eotf(0.25, 0.5), 0.5);
/// assert_eq!(gamma_eotf(-1.0, 2.0), 0.0);
/// ```
#[inline]
pub fn gamma_eotf(v: f32, gamma: f32) -> f32 {
    if v <= 0.0 {
        0.0
    } else {
        v.powf(gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_fixed() {
        assert_eq!(gamma_eotf(1.0, 3.0), 1.0);
        assert_eq!(gamma_eotf(0.0, 0.3), 0.0);
    }

    #[test]
    fn test_monotonic() {
        for gamma in [0.4, 1.7, 2.2] {
            let mut prev = 0.0;
            for i in 1..=20 {
                let y = gamma_eotf(i as f32 / 20.0, gamma);
                assert!(y > prev, "gamma {gamma} step {i}");
                prev = y;
            }
        }
    }
}
