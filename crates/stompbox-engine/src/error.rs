//! Engine configuration errors.

/// Rejected [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Sample rate outside the supported range or not finite.
    #[error(
        "invalid sample rate {0} Hz (supported: {min}..={max} Hz)",
        min = crate::config::MIN_SAMPLE_RATE,
        max = crate::config::MAX_SAMPLE_RATE
    )]
    InvalidSampleRate(f32),

    /// Deadline margin outside `1..=100` percent.
    #[error("invalid deadline margin {0}% (must be 1..=100)")]
    InvalidMargin(f32),
}
