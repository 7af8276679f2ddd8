//! Circular delay line with fractional, linearly interpolated reads.
//!
//! The buffer is allocated once at construction. Reads and writes never
//! allocate, so a delay line built at chain-assembly time is safe to use in
//! the processing context.

use alloc::vec;
use alloc::vec::Vec;

/// Heap-backed delay line.
///
/// `read(0.0)` returns the most recently written sample; `read(d)` returns
/// the sample written `d` writes ago.
///
/// ```rust
/// use stompbox_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(8);
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(1.0), 1.0);
/// assert_eq!(delay.read(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Delay line holding `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    /// Delay line long enough for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new((sample_rate * max_seconds) as usize + 1)
    }

    /// Reads `delay_samples` behind the last write, clamped to the capacity.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let read_pos = (self.write_pos + len - whole - 1) % len;
        let older = (read_pos + len - 1) % len;
        let a = self.buffer[read_pos];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Appends one sample, overwriting the oldest.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Number of samples held.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
