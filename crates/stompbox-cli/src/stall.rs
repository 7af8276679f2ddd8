//! Deliberate processing stalls for `process --slow-block`.

use std::time::Duration;

use stompbox_core::{Effect, ErrorCode, ParamDescriptor, ParameterInfo};

/// Wraps an effect and can sleep inside one chosen block, so the engine
/// sees a block overrun its deadline.
pub struct Staller<E> {
    inner: E,
    plan: Option<Plan>,
}

struct Plan {
    block: u64,
    duration: Duration,
    seen: u64,
}

impl<E> Staller<E> {
    /// Pass-through wrapper; stalls nothing until [`stall_on`](Self::stall_on).
    pub fn new(inner: E) -> Self {
        Self { inner, plan: None }
    }

    /// The wrapped effect.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Sleeps for `duration` while processing block `block` (0-based).
    pub fn stall_on(&mut self, block: u64, duration: Duration) {
        self.plan = Some(Plan {
            block,
            duration,
            seen: 0,
        });
    }

    fn tick(&mut self) {
        if let Some(plan) = &mut self.plan {
            if plan.seen == plan.block {
                std::thread::sleep(plan.duration);
            }
            plan.seen += 1;
        }
    }
}

impl<E: Effect> Effect for Staller<E> {
    fn process(&mut self, input: f32) -> f32 {
        self.inner.process(input)
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        self.tick();
        self.inner.process_block(input, output);
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        self.tick();
        self.inner.process_block_inplace(buffer);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.inner.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn latency_samples(&self) -> usize {
        self.inner.latency_samples()
    }

    fn fault(&self) -> Option<ErrorCode> {
        self.inner.fault()
    }
}

impl<E: ParameterInfo> ParameterInfo for Staller<E> {
    fn param_count(&self) -> usize {
        self.inner.param_count()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        self.inner.param_info(index)
    }

    fn get_param(&self, index: usize) -> f32 {
        self.inner.get_param(index)
    }

    fn set_param(&mut self, index: usize, value: f32) {
        self.inner.set_param(index, value);
    }
}
