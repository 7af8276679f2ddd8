//! Second-order IIR filter with RBJ cookbook coefficient helpers.
//!
//! Coefficient functions return `(b0, b1, b2, a0, a1, a2)`, unnormalized;
//! [`Biquad::set_coefficients`] divides through by `a0`.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

use crate::math::flush_denormal;

/// Raw coefficient tuple `(b0, b1, b2, a0, a1, a2)`.
pub type Coefficients = (f32, f32, f32, f32, f32, f32);

/// Direct Form I biquad:
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Pass-through filter.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Filter with the given coefficients.
    pub fn with_coefficients(coeffs: Coefficients) -> Self {
        let mut filter = Self::new();
        filter.set(coeffs);
        filter
    }

    /// Sets coefficients, normalizing by `a0`. State is kept so coefficient
    /// changes do not click.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Tuple form of [`set_coefficients`](Self::set_coefficients).
    pub fn set(&mut self, (b0, b1, b2, a0, a1, a2): Coefficients) {
        self.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = flush_denormal(output);
        output
    }

    /// Clears filter history.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

struct Omega {
    cos: f32,
    alpha: f32,
}

fn omega(frequency: f32, q: f32, sample_rate: f32) -> Omega {
    let w = 2.0 * PI * frequency.min(sample_rate * 0.49) / sample_rate;
    Omega {
        cos: cosf(w),
        alpha: sinf(w) / (2.0 * q),
    }
}

/// 12 dB/oct low-pass.
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let Omega { cos, alpha } = omega(frequency, q, sample_rate);
    let b1 = 1.0 - cos;
    (b1 / 2.0, b1, b1 / 2.0, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
}

/// 12 dB/oct high-pass.
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let Omega { cos, alpha } = omega(frequency, q, sample_rate);
    let b0 = (1.0 + cos) / 2.0;
    (b0, -(1.0 + cos), b0, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
}

/// Peaking bell; unity away from `frequency`.
pub fn peaking_eq_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let Omega { cos, alpha } = omega(frequency, q, sample_rate);
    (
        1.0 + alpha * a,
        -2.0 * cos,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos,
        1.0 - alpha / a,
    )
}

/// Low shelf boosting or cutting below `frequency`.
pub fn low_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let Omega { cos, alpha } = omega(frequency, q, sample_rate);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;
    (
        a * ((a + 1.0) - (a - 1.0) * cos + two_sqrt_a_alpha),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cos),
        a * ((a + 1.0) - (a - 1.0) * cos - two_sqrt_a_alpha),
        (a + 1.0) + (a - 1.0) * cos + two_sqrt_a_alpha,
        -2.0 * ((a - 1.0) + (a + 1.0) * cos),
        (a + 1.0) + (a - 1.0) * cos - two_sqrt_a_alpha,
    )
}

/// High shelf boosting or cutting above `frequency`.
pub fn high_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let Omega { cos, alpha } = omega(frequency, q, sample_rate);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;
    (
        a * ((a + 1.0) + (a - 1.0) * cos + two_sqrt_a_alpha),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cos),
        a * ((a + 1.0) + (a - 1.0) * cos - two_sqrt_a_alpha),
        (a + 1.0) - (a - 1.0) * cos + two_sqrt_a_alpha,
        2.0 * ((a - 1.0) - (a + 1.0) * cos),
        (a + 1.0) - (a - 1.0) * cos - two_sqrt_a_alpha,
    )
}
