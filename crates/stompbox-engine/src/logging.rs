//! Control-plane logging.

use stompbox_core::{ParamChange, ParamObserver};

/// Observer that writes every control-plane change to `tracing`.
///
/// Parameter values log at `debug`; bypass and reset requests at `info`.
///
/// ```rust
/// use stompbox_core::{ParamChange, ParamSubject};
/// use stompbox_engine::LoggingObserver;
///
/// let mut subject = ParamSubject::new();
/// subject.attach(LoggingObserver::new("pedalboard"));
/// subject.notify(&ParamChange::ChainBypass(true));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingObserver {
    source: &'static str,
}

impl LoggingObserver {
    /// Observer tagging each line with `source`.
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }
}

impl ParamObserver for LoggingObserver {
    fn on_change(&mut self, change: &ParamChange) {
        match *change {
            ParamChange::Value {
                effect,
                param,
                value,
            } => tracing::debug!(
                source = self.source,
                effect = effect.0,
                param,
                value,
                "parameter set"
            ),
            ParamChange::Bypass { effect, bypassed } => {
                tracing::info!(source = self.source, effect = effect.0, bypassed, "effect bypass");
            }
            ParamChange::ChainBypass(bypassed) => {
                tracing::info!(source = self.source, bypassed, "chain bypass");
            }
            ParamChange::Reset(effect) => {
                tracing::info!(source = self.source, effect = effect.0, "effect reset");
            }
        }
    }
}
