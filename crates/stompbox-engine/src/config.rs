//! Engine settings and the per-block time budget.

use stompbox_core::BLOCK_SIZE;

use crate::error::EngineError;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: f32 = 8000.0;
/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: f32 = 192_000.0;

/// Validated engine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Codec sample rate in Hz.
    pub sample_rate: f32,
    /// Share of the block period, in percent, a block may take before it
    /// counts as a deadline miss.
    pub deadline_margin_pct: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            deadline_margin_pct: 100.0,
        }
    }
}

impl EngineConfig {
    /// Config at `sample_rate` with the full block period as budget.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Checks both fields.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if !(1.0..=100.0).contains(&self.deadline_margin_pct) {
            return Err(EngineError::InvalidMargin(self.deadline_margin_pct));
        }
        Ok(())
    }

    /// Length of one block in seconds.
    pub fn block_period_secs(&self) -> f32 {
        BLOCK_SIZE as f32 / self.sample_rate
    }

    /// Ticks a block may take on a clock running at `ticks_per_second`.
    ///
    /// ```rust
    /// use stompbox_engine::EngineConfig;
    ///
    /// // 256 samples at 48 kHz on a microsecond clock
    /// assert_eq!(EngineConfig::new(48000.0).budget_ticks(1_000_000), 5333);
    /// ```
    pub fn budget_ticks(&self, ticks_per_second: u64) -> u64 {
        let period = BLOCK_SIZE as f64 / f64::from(self.sample_rate);
        let share = f64::from(self.deadline_margin_pct) / 100.0;
        (period * share * ticks_per_second as f64) as u64
    }
}
