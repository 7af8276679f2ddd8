//! Small DSP math helpers. Allocation-free and `no_std`.

use libm::{expf, logf, tanhf};

/// Decibels to linear gain (0 dB -> 1.0, -6 dB -> ~0.5).
///
/// ```rust
/// use stompbox_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Linear gain to decibels. Inputs are floored at 1e-10 (-200 dB).
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Symmetric tanh saturation, output in (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Asymmetric saturation: the negative half clips harder, adding even
/// harmonics like a single-ended tube stage.
#[inline]
pub fn asymmetric_clip(x: f32) -> f32 {
    if x >= 0.0 {
        tanhf(x)
    } else {
        tanhf(x * 1.5) / 1.5 * 1.2
    }
}

/// Zero out subnormal-range values that slow down recursive filters.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade: `mix = 0` is all dry, `mix = 1` is all wet.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_linear_roundtrip() {
        for db in [-60.0, -12.0, 0.0, 6.0, 24.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} -> {back}");
        }
    }

    #[test]
    fn linear_to_db_floors_silence() {
        assert!((linear_to_db(0.0) + 200.0).abs() < 1e-3);
    }

    #[test]
    fn clippers_are_bounded() {
        for x in [-100.0, -2.0, -0.5, 0.0, 0.5, 2.0, 100.0] {
            assert!(soft_clip(x).abs() <= 1.0);
            assert!(asymmetric_clip(x).abs() <= 1.0);
        }
        assert!(asymmetric_clip(-3.0).abs() < asymmetric_clip(3.0).abs() + 0.2);
    }

    #[test]
    fn flush_and_mix() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(1e-3), 1e-3);
        assert_eq!(wet_dry_mix(1.0, 0.0, 0.0), 1.0);
        assert_eq!(wet_dry_mix(1.0, 0.0, 1.0), 0.0);
        assert_eq!(ms_to_samples(10.0, 48000.0), 480.0);
    }
}
