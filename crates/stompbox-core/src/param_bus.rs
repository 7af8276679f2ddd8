//! Wait-free parameter hand-off from control contexts to the audio path.
//!
//! Any number of control contexts (UI task, footswitch interrupt, MIDI
//! parser) call [`ParameterBus::publish`]; the processing context drains
//! pending values for each effect at that effect's block boundary. Nothing on
//! either side blocks or allocates.
//!
//! # Storage
//!
//! Each `(effect, parameter)` pair owns an `AtomicU32` holding the `f32` bits
//! of the latest single publish, so a parameter can never be observed torn.
//! Each effect has a dirty mask (one bit per parameter):
//!
//! - publish: store value (`Relaxed`), then `fetch_or` the bit (`Release`)
//! - drain: `swap(0)` the mask (`AcqRel`), then load the flagged values
//!
//! Single publishes are applied at every boundary, whatever else is in
//! flight. Last write wins per parameter between two boundaries.
//!
//! # Groups
//!
//! [`publish_group`](ParameterBus::publish_group) stores several parameters
//! that must land together (a tone stack, a preset recall). Groups write
//! their own value slots and their own dirty mask, guarded by a per-effect
//! writer count and epoch acting as a sequence lock. The drain side
//! re-checks both after reading the group slots and, if a group write
//! overlapped, puts the group bits back and defers only the group to the
//! next boundary. A group is therefore applied entirely or not at all for a
//! given block, and never holds back single publishes.
//!
//! When a parameter has both a single and a group value pending, the later
//! publish clears the other's bit, so the most recent one lands.
//!
//! # Validation
//!
//! Ranges are captured from the chain's descriptors at registration. Values
//! outside the range are clamped, stepped parameters are rounded, and
//! non-finite values or unknown ids are rejected before anything is stored.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering, fence};

use crate::chain::{EffectChain, EffectId, MAX_EFFECTS};
use crate::effect::Effect;
use crate::param_info::{ParamFlags, ParameterInfo};

/// Maximum parameters per effect addressable through the bus.
pub const MAX_PARAMS: usize = 16;

const NO_REQUEST: u8 = 0;
const ENGAGE: u8 = 1;
const RELEASE: u8 = 2;

/// Errors returned at the bus boundary. The audio path never sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No effect registered under this id.
    UnknownEffect(EffectId),
    /// The effect has no parameter at this index.
    UnknownParameter {
        /// Target effect.
        effect: EffectId,
        /// Offending parameter index.
        param: usize,
    },
    /// NaN or infinity was published.
    NonFinite {
        /// Target effect.
        effect: EffectId,
        /// Target parameter.
        param: usize,
    },
    /// The chain holds more effects than the bus can address.
    TooManyEffects {
        /// Effects in the chain.
        count: usize,
    },
    /// An effect exposes more parameters than the bus can address.
    TooManyParams {
        /// Offending effect.
        effect: EffectId,
        /// Parameters it exposes.
        count: usize,
    },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEffect(id) => write!(f, "no effect at position {}", id.0),
            Self::UnknownParameter { effect, param } => {
                write!(f, "effect {} has no parameter {param}", effect.0)
            }
            Self::NonFinite { effect, param } => {
                write!(f, "non-finite value for effect {} parameter {param}", effect.0)
            }
            Self::TooManyEffects { count } => {
                write!(f, "{count} effects exceed bus capacity of {MAX_EFFECTS}")
            }
            Self::TooManyParams { effect, count } => write!(
                f,
                "effect {} exposes {count} parameters, bus supports {MAX_PARAMS}",
                effect.0
            ),
        }
    }
}

impl core::error::Error for BusError {}

/// Result of draining one effect's pending values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was pending.
    Idle,
    /// This many parameters were applied.
    Applied(u32),
    /// A group write overlapped; the group stays queued for the next
    /// boundary. `applied` single values landed regardless.
    Deferred {
        /// Parameters applied from single publishes.
        applied: u32,
    },
}

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f32,
    max: f32,
    stepped: bool,
}

impl Range {
    const UNUSED: Self = Self {
        min: 0.0,
        max: 0.0,
        stepped: false,
    };

    fn sanitize(self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        if self.stepped {
            libm::roundf(clamped)
        } else {
            clamped
        }
    }
}

/// Pending parameter values, bypass requests and reset requests for a chain.
///
/// Build it with [`for_chain`](Self::for_chain) (or `new` +
/// [`register_chain`](Self::register_chain)) before audio starts, then share
/// `&ParameterBus` between control contexts and the engine.
pub struct ParameterBus {
    effects: usize,
    counts: [usize; MAX_EFFECTS],
    ranges: [[Range; MAX_PARAMS]; MAX_EFFECTS],
    latest: [[AtomicU32; MAX_PARAMS]; MAX_EFFECTS],
    values: [[AtomicU32; MAX_PARAMS]; MAX_EFFECTS],
    dirty: [AtomicU32; MAX_EFFECTS],
    group_values: [[AtomicU32; MAX_PARAMS]; MAX_EFFECTS],
    group_dirty: [AtomicU32; MAX_EFFECTS],
    writers: [AtomicU32; MAX_EFFECTS],
    epochs: [AtomicU32; MAX_EFFECTS],
    bypass: [AtomicU8; MAX_EFFECTS],
    reset: [AtomicBool; MAX_EFFECTS],
    chain_bypass: AtomicU8,
}

impl ParameterBus {
    /// Empty bus with no registered effects. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            effects: 0,
            counts: [0; MAX_EFFECTS],
            ranges: [[Range::UNUSED; MAX_PARAMS]; MAX_EFFECTS],
            latest: [const { [const { AtomicU32::new(0) }; MAX_PARAMS] }; MAX_EFFECTS],
            values: [const { [const { AtomicU32::new(0) }; MAX_PARAMS] }; MAX_EFFECTS],
            dirty: [const { AtomicU32::new(0) }; MAX_EFFECTS],
            group_values: [const { [const { AtomicU32::new(0) }; MAX_PARAMS] }; MAX_EFFECTS],
            group_dirty: [const { AtomicU32::new(0) }; MAX_EFFECTS],
            writers: [const { AtomicU32::new(0) }; MAX_EFFECTS],
            epochs: [const { AtomicU32::new(0) }; MAX_EFFECTS],
            bypass: [const { AtomicU8::new(NO_REQUEST) }; MAX_EFFECTS],
            reset: [const { AtomicBool::new(false) }; MAX_EFFECTS],
            chain_bypass: AtomicU8::new(NO_REQUEST),
        }
    }

    /// Bus addressing every effect of `chain`.
    pub fn for_chain<E: Effect + ParameterInfo, const M: usize>(
        chain: &EffectChain<E, M>,
    ) -> Result<Self, BusError> {
        let mut bus = Self::new();
        bus.register_chain(chain)?;
        Ok(bus)
    }

    /// Captures parameter ranges and current values from `chain`, replacing
    /// any earlier registration and discarding pending requests.
    ///
    /// Control-plane only: requires exclusive access.
    pub fn register_chain<E: Effect + ParameterInfo, const M: usize>(
        &mut self,
        chain: &EffectChain<E, M>,
    ) -> Result<(), BusError> {
        if chain.len() > MAX_EFFECTS {
            return Err(BusError::TooManyEffects { count: chain.len() });
        }
        for (id, slot) in chain.iter() {
            let count = slot.effect().param_count();
            if count > MAX_PARAMS {
                return Err(BusError::TooManyParams { effect: id, count });
            }
        }

        *self = Self::new();
        self.effects = chain.len();
        for (id, slot) in chain.iter() {
            let effect = slot.effect();
            let e = id.0;
            self.counts[e] = effect.param_count();
            for p in 0..self.counts[e] {
                if let Some(desc) = effect.param_info(p) {
                    self.ranges[e][p] = Range {
                        min: desc.min,
                        max: desc.max,
                        stepped: desc.flags.contains(ParamFlags::STEPPED),
                    };
                }
                *self.latest[e][p].get_mut() = effect.get_param(p).to_bits();
            }
        }
        Ok(())
    }

    /// Number of registered effects.
    pub fn effect_count(&self) -> usize {
        self.effects
    }

    /// Number of addressable parameters of `effect` (0 if unknown).
    pub fn param_count(&self, effect: EffectId) -> usize {
        if effect.0 < self.effects {
            self.counts[effect.0]
        } else {
            0
        }
    }

    /// Publishes one parameter value. Returns the value actually stored
    /// after clamping.
    ///
    /// Wait-free; callable from any context.
    pub fn publish(&self, effect: EffectId, param: usize, value: f32) -> Result<f32, BusError> {
        let stored = self.validate(effect, param, value)?;
        let e = effect.0;
        let bit = 1 << param;
        self.latest[e][param].store(stored.to_bits(), Ordering::Relaxed);
        self.values[e][param].store(stored.to_bits(), Ordering::Relaxed);
        self.group_dirty[e].fetch_and(!bit, Ordering::Relaxed);
        self.dirty[e].fetch_or(bit, Ordering::Release);
        Ok(stored)
    }

    /// Publishes several parameters of one effect so they become visible at
    /// the same block boundary.
    ///
    /// All values are validated first; on error nothing is stored. Single
    /// publishes of the same effect made while the group is being written
    /// still land at the next boundary.
    pub fn publish_group(
        &self,
        effect: EffectId,
        params: &[(usize, f32)],
    ) -> Result<(), BusError> {
        let mut staged = [(0usize, 0.0f32); MAX_PARAMS];
        let mut count = 0;
        for &(param, value) in params {
            let stored = self.validate(effect, param, value)?;
            // later duplicates of the same index win
            match staged[..count].iter_mut().find(|(p, _)| *p == param) {
                Some(entry) => entry.1 = stored,
                None => {
                    staged[count] = (param, stored);
                    count += 1;
                }
            }
        }
        if count == 0 {
            return Ok(());
        }

        let e = effect.0;
        self.writers[e].fetch_add(1, Ordering::Relaxed);
        fence(Ordering::Release);

        let mut mask = 0u32;
        for &(param, stored) in &staged[..count] {
            self.latest[e][param].store(stored.to_bits(), Ordering::Relaxed);
            self.group_values[e][param].store(stored.to_bits(), Ordering::Relaxed);
            mask |= 1 << param;
        }
        self.dirty[e].fetch_and(!mask, Ordering::Relaxed);
        self.group_dirty[e].fetch_or(mask, Ordering::Release);

        self.epochs[e].fetch_add(1, Ordering::Release);
        self.writers[e].fetch_sub(1, Ordering::Release);
        Ok(())
    }

    /// Latest published (or registered) value of a parameter.
    pub fn value(&self, effect: EffectId, param: usize) -> Option<f32> {
        if param < self.param_count(effect) {
            Some(f32::from_bits(self.latest[effect.0][param].load(Ordering::Acquire)))
        } else {
            None
        }
    }

    /// True if `effect` has values waiting for its next boundary.
    pub fn is_pending(&self, effect: EffectId) -> bool {
        effect.0 < self.effects
            && (self.dirty[effect.0].load(Ordering::Acquire)
                | self.group_dirty[effect.0].load(Ordering::Acquire))
                != 0
    }

    /// Requests bypass on or off for `effect` at its next boundary.
    pub fn request_bypass(&self, effect: EffectId, bypassed: bool) -> Result<(), BusError> {
        self.check_effect(effect)?;
        let word = if bypassed { ENGAGE } else { RELEASE };
        self.bypass[effect.0].store(word, Ordering::Release);
        Ok(())
    }

    /// Requests a reset of `effect` (clears DSP state and faults).
    pub fn request_reset(&self, effect: EffectId) -> Result<(), BusError> {
        self.check_effect(effect)?;
        self.reset[effect.0].store(true, Ordering::Release);
        Ok(())
    }

    /// Requests chain-level bypass on or off at the next block.
    pub fn request_chain_bypass(&self, bypassed: bool) {
        let word = if bypassed { ENGAGE } else { RELEASE };
        self.chain_bypass.store(word, Ordering::Release);
    }

    /// Applies pending values for `effect` through `apply(param, value)`.
    ///
    /// Group values are applied before single values. Processing context
    /// only.
    pub fn drain(&self, effect: EffectId, mut apply: impl FnMut(usize, f32)) -> DrainOutcome {
        let e = effect.0;
        if e >= self.effects {
            return DrainOutcome::Idle;
        }

        let singles = self.dirty[e].swap(0, Ordering::AcqRel);
        let mut pending = [0.0f32; MAX_PARAMS];
        for param in BitIter(singles) {
            pending[param] = f32::from_bits(self.values[e][param].load(Ordering::Relaxed));
        }

        let mut grouped = [0.0f32; MAX_PARAMS];
        let (group, deferred) = self.take_group(e, singles, &mut grouped);
        for param in BitIter(group) {
            apply(param, grouped[param]);
        }
        for param in BitIter(singles) {
            apply(param, pending[param]);
        }

        let applied = (group | singles).count_ones();
        match (applied, deferred) {
            (_, true) => DrainOutcome::Deferred { applied },
            (0, false) => DrainOutcome::Idle,
            (n, false) => DrainOutcome::Applied(n),
        }
    }

    /// Copies a complete pending group of effect `e` into `out` and returns
    /// its mask, or `(0, true)` if a group write is in flight. Bits superseded
    /// by `singles` are dropped.
    fn take_group(&self, e: usize, singles: u32, out: &mut [f32; MAX_PARAMS]) -> (u32, bool) {
        if self.writers[e].load(Ordering::Acquire) != 0 {
            return (0, true);
        }
        let epoch = self.epochs[e].load(Ordering::Acquire);
        let mask = self.group_dirty[e].swap(0, Ordering::AcqRel);
        if mask == 0 {
            return (0, false);
        }
        for param in BitIter(mask) {
            out[param] = f32::from_bits(self.group_values[e][param].load(Ordering::Relaxed));
        }

        // Any slot read above that came from an in-flight group makes the
        // writer count or epoch change visible here.
        fence(Ordering::Acquire);
        if self.writers[e].load(Ordering::Acquire) != 0
            || self.epochs[e].load(Ordering::Acquire) != epoch
        {
            self.group_dirty[e].fetch_or(mask & !singles, Ordering::Release);
            return (0, true);
        }
        (mask & !singles, false)
    }

    /// Takes the pending bypass request for `effect`, if any.
    pub fn take_bypass_request(&self, effect: EffectId) -> Option<bool> {
        if effect.0 >= self.effects {
            return None;
        }
        decode_request(self.bypass[effect.0].swap(NO_REQUEST, Ordering::AcqRel))
    }

    /// Takes the pending reset request for `effect`.
    pub fn take_reset_request(&self, effect: EffectId) -> bool {
        effect.0 < self.effects && self.reset[effect.0].swap(false, Ordering::AcqRel)
    }

    /// Takes the pending chain bypass request, if any.
    pub fn take_chain_bypass_request(&self) -> Option<bool> {
        decode_request(self.chain_bypass.swap(NO_REQUEST, Ordering::AcqRel))
    }

    fn check_effect(&self, effect: EffectId) -> Result<(), BusError> {
        if effect.0 < self.effects {
            Ok(())
        } else {
            Err(BusError::UnknownEffect(effect))
        }
    }

    fn validate(&self, effect: EffectId, param: usize, value: f32) -> Result<f32, BusError> {
        self.check_effect(effect)?;
        if param >= self.counts[effect.0] {
            return Err(BusError::UnknownParameter { effect, param });
        }
        if !value.is_finite() {
            return Err(BusError::NonFinite { effect, param });
        }
        Ok(self.ranges[effect.0][param].sanitize(value))
    }
}

impl Default for ParameterBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParameterBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBus")
            .field("effects", &self.effects)
            .field("counts", &&self.counts[..self.effects])
            .finish_non_exhaustive()
    }
}

fn decode_request(word: u8) -> Option<bool> {
    match word {
        ENGAGE => Some(true),
        RELEASE => Some(false),
        _ => None,
    }
}

/// Indices of set bits, lowest first.
struct BitIter(u32);

impl Iterator for BitIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::param_info::ParamDescriptor;

    #[derive(Default)]
    struct Knobs {
        values: [f32; 3],
    }

    impl Effect for Knobs {
        fn process(&mut self, input: f32) -> f32 {
            input
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    impl ParameterInfo for Knobs {
        fn param_count(&self) -> usize {
            3
        }
        fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
            match index {
                0 => Some(ParamDescriptor::gain_db("Low", "Low", -12.0, 12.0, 0.0)),
                1 => Some(ParamDescriptor::gain_db("High", "High", -12.0, 12.0, 0.0)),
                2 => Some(ParamDescriptor::choice("Shape", "Shape", 3, 0)),
                _ => None,
            }
        }
        fn get_param(&self, index: usize) -> f32 {
            self.values.get(index).copied().unwrap_or(0.0)
        }
        fn set_param(&mut self, index: usize, value: f32) {
            if let Some(v) = self.values.get_mut(index) {
                *v = value;
            }
        }
    }

    fn bus_for(effects: usize) -> ParameterBus {
        let mut chain: EffectChain<Knobs, 4> = EffectChain::new(48000.0);
        for _ in 0..effects {
            chain.push(Knobs::default()).unwrap();
        }
        ParameterBus::for_chain(&chain).unwrap()
    }

    fn drain_all(bus: &ParameterBus, effect: EffectId) -> ([f32; 3], DrainOutcome) {
        let mut seen = [f32::NAN; 3];
        let outcome = bus.drain(effect, |p, v| seen[p] = v);
        (seen, outcome)
    }

    #[test]
    fn publish_then_drain_delivers_value_once() {
        let bus = bus_for(1);
        assert_eq!(bus.publish(EffectId(0), 1, 3.0), Ok(3.0));
        assert!(bus.is_pending(EffectId(0)));

        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(1));
        assert_eq!(seen[1], 3.0);
        assert!(seen[0].is_nan());

        assert_eq!(drain_all(&bus, EffectId(0)).1, DrainOutcome::Idle);
    }

    #[test]
    fn last_write_wins_before_boundary() {
        let bus = bus_for(1);
        bus.publish(EffectId(0), 0, 1.0).unwrap();
        bus.publish(EffectId(0), 0, -4.0).unwrap();
        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(1));
        assert_eq!(seen[0], -4.0);
    }

    #[test]
    fn out_of_range_is_clamped_and_steps_rounded() {
        let bus = bus_for(1);
        assert_eq!(bus.publish(EffectId(0), 0, 40.0), Ok(12.0));
        assert_eq!(bus.publish(EffectId(0), 2, 1.4), Ok(1.0));
        assert_eq!(bus.publish(EffectId(0), 2, 9.0), Ok(2.0));
        assert_eq!(bus.value(EffectId(0), 0), Some(12.0));
    }

    #[test]
    fn invalid_publishes_are_rejected_without_side_effects() {
        let bus = bus_for(2);
        assert_eq!(
            bus.publish(EffectId(5), 0, 0.0),
            Err(BusError::UnknownEffect(EffectId(5)))
        );
        assert_eq!(
            bus.publish(EffectId(1), 3, 0.0),
            Err(BusError::UnknownParameter {
                effect: EffectId(1),
                param: 3
            })
        );
        assert_eq!(
            bus.publish(EffectId(0), 0, f32::NAN),
            Err(BusError::NonFinite {
                effect: EffectId(0),
                param: 0
            })
        );
        assert!(!bus.is_pending(EffectId(0)));
        assert!(!bus.is_pending(EffectId(1)));
    }

    #[test]
    fn group_with_invalid_member_stores_nothing() {
        let bus = bus_for(1);
        let result = bus.publish_group(EffectId(0), &[(0, 1.0), (1, f32::INFINITY)]);
        assert!(result.is_err());
        assert!(!bus.is_pending(EffectId(0)));
    }

    #[test]
    fn group_lands_together() {
        let bus = bus_for(1);
        bus.publish_group(EffectId(0), &[(0, 2.0), (1, -2.0), (0, 5.0)])
            .unwrap();
        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(2));
        assert_eq!(seen[0], 5.0);
        assert_eq!(seen[1], -2.0);
    }

    #[test]
    fn drain_defers_only_the_group_while_its_writer_is_active() {
        let bus = bus_for(1);
        bus.publish_group(EffectId(0), &[(0, 4.0), (1, -4.0)]).unwrap();
        bus.writers[0].fetch_add(1, Ordering::Relaxed);
        assert_eq!(
            drain_all(&bus, EffectId(0)).1,
            DrainOutcome::Deferred { applied: 0 }
        );
        assert!(bus.is_pending(EffectId(0)));

        bus.writers[0].fetch_sub(1, Ordering::Relaxed);
        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(2));
        assert_eq!(seen[..2], [4.0, -4.0]);
    }

    #[test]
    fn single_publish_lands_while_group_in_flight() {
        let bus = bus_for(1);
        bus.publish_group(EffectId(0), &[(0, 3.0), (1, 3.0)]).unwrap();
        bus.writers[0].fetch_add(1, Ordering::Relaxed);
        bus.publish(EffectId(0), 2, 2.0).unwrap();

        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Deferred { applied: 1 });
        assert_eq!(seen[2], 2.0);
        assert!(seen[0].is_nan() && seen[1].is_nan());

        bus.writers[0].fetch_sub(1, Ordering::Relaxed);
        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(2));
        assert_eq!(seen[..2], [3.0, 3.0]);
        assert!(seen[2].is_nan());
    }

    #[test]
    fn later_publish_wins_between_single_and_group() {
        let bus = bus_for(1);
        bus.publish(EffectId(0), 0, 1.0).unwrap();
        bus.publish_group(EffectId(0), &[(0, 5.0), (1, 5.0)]).unwrap();
        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(2));
        assert_eq!(seen[..2], [5.0, 5.0]);

        bus.publish_group(EffectId(0), &[(0, 5.0), (1, 5.0)]).unwrap();
        bus.publish(EffectId(0), 0, -1.0).unwrap();
        let (seen, outcome) = drain_all(&bus, EffectId(0));
        assert_eq!(outcome, DrainOutcome::Applied(2));
        assert_eq!(seen[..2], [-1.0, 5.0]);
        assert_eq!(bus.value(EffectId(0), 0), Some(-1.0));
    }

    #[test]
    fn registration_captures_current_values() {
        let mut chain: EffectChain<Knobs, 2> = EffectChain::new(48000.0);
        chain
            .push(Knobs {
                values: [1.5, -3.0, 2.0],
            })
            .unwrap();
        let bus = ParameterBus::for_chain(&chain).unwrap();
        assert_eq!(bus.effect_count(), 1);
        assert_eq!(bus.param_count(EffectId(0)), 3);
        assert_eq!(bus.value(EffectId(0), 1), Some(-3.0));
        assert_eq!(bus.value(EffectId(0), 3), None);
        assert!(!bus.is_pending(EffectId(0)));
    }

    #[test]
    fn bypass_and_reset_requests_are_taken_once() {
        let bus = bus_for(2);
        assert_eq!(bus.take_bypass_request(EffectId(1)), None);
        bus.request_bypass(EffectId(1), true).unwrap();
        assert_eq!(bus.take_bypass_request(EffectId(1)), Some(true));
        assert_eq!(bus.take_bypass_request(EffectId(1)), None);

        bus.request_reset(EffectId(0)).unwrap();
        assert!(bus.take_reset_request(EffectId(0)));
        assert!(!bus.take_reset_request(EffectId(0)));

        bus.request_chain_bypass(false);
        assert_eq!(bus.take_chain_bypass_request(), Some(false));
        assert_eq!(bus.take_chain_bypass_request(), None);

        assert_eq!(
            bus.request_bypass(EffectId(2), true),
            Err(BusError::UnknownEffect(EffectId(2)))
        );
    }

    #[test]
    fn concurrent_publishers_never_tear_values() {
        let bus = bus_for(1);
        std::thread::scope(|s| {
            for t in 0..3 {
                let bus = &bus;
                s.spawn(move || {
                    for i in 0..2000 {
                        let v = if (i + t) % 2 == 0 { -7.25 } else { 6.5 };
                        bus.publish(EffectId(0), 0, v).unwrap();
                    }
                });
            }
            for _ in 0..2000 {
                bus.drain(EffectId(0), |_, v| assert!(v == -7.25 || v == 6.5 || v == 0.0));
            }
        });
    }

    #[test]
    fn bit_iter_yields_set_bits_in_order() {
        let bits: std::vec::Vec<usize> = BitIter(0b1010_0101).collect();
        assert_eq!(bits, [0, 2, 5, 7]);
    }
}
