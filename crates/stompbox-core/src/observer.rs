//! Change notification on the control plane.
//!
//! [`ParamSubject`] keeps an ordered list of observers keyed by
//! [`SubscriptionId`]. Every change is delivered synchronously to each
//! observer in registration order. Observers receive only the change; they
//! hold no reference back to the subject, and both `notify` and `detach`
//! need `&mut ParamSubject`, so an observer cannot be removed while a
//! notification is running.
//!
//! [`ControlSurface`] ties a subject to a [`ParameterBus`]: each change is
//! published to the audio path first and observers then see the value that
//! was actually stored.
//!
//! Nothing here runs in the audio path; it allocates when observers attach.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::chain::EffectId;
use crate::param_bus::{BusError, ParameterBus};

/// One control-plane change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamChange {
    /// A parameter was published.
    Value {
        /// Target effect.
        effect: EffectId,
        /// Parameter index.
        param: usize,
        /// Value stored on the bus after clamping.
        value: f32,
    },
    /// An effect's bypass was requested.
    Bypass {
        /// Target effect.
        effect: EffectId,
        /// Requested state.
        bypassed: bool,
    },
    /// Chain bypass was requested.
    ChainBypass(bool),
    /// An effect reset was requested.
    Reset(EffectId),
}

/// Receives control-plane changes.
pub trait ParamObserver {
    /// Called once per change, in registration order.
    fn on_change(&mut self, change: &ParamChange);
}

impl<F: FnMut(&ParamChange)> ParamObserver for F {
    fn on_change(&mut self, change: &ParamChange) {
        self(change);
    }
}

/// Handle returned by [`ParamSubject::attach`]; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

/// Ordered set of observers.
#[derive(Default)]
pub struct ParamSubject {
    observers: Vec<(SubscriptionId, Box<dyn ParamObserver + Send>)>,
    next_id: u32,
}

impl ParamSubject {
    /// Subject with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer at the end of the notification order.
    pub fn attach(&mut self, observer: impl ParamObserver + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer, keeping the order of the rest. Returns `false`
    /// if the id is unknown or already detached.
    pub fn detach(&mut self, id: SubscriptionId) -> bool {
        match self.observers.iter().position(|(sub, _)| *sub == id) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of attached observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True if no observer is attached.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delivers `change` to every observer in registration order.
    pub fn notify(&mut self, change: &ParamChange) {
        for (_, observer) in &mut self.observers {
            observer.on_change(change);
        }
    }
}

impl fmt::Debug for ParamSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSubject")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Control-plane front end: publishes to the bus, then notifies observers.
#[derive(Debug)]
pub struct ControlSurface<'a> {
    bus: &'a ParameterBus,
    subject: ParamSubject,
}

impl<'a> ControlSurface<'a> {
    /// Surface publishing to `bus`.
    pub fn new(bus: &'a ParameterBus) -> Self {
        Self {
            bus,
            subject: ParamSubject::new(),
        }
    }

    /// The bus changes are published to.
    pub fn bus(&self) -> &'a ParameterBus {
        self.bus
    }

    /// See [`ParamSubject::attach`].
    pub fn attach(&mut self, observer: impl ParamObserver + Send + 'static) -> SubscriptionId {
        self.subject.attach(observer)
    }

    /// See [`ParamSubject::detach`].
    pub fn detach(&mut self, id: SubscriptionId) -> bool {
        self.subject.detach(id)
    }

    /// Publishes one value and notifies observers with the stored value.
    pub fn set(&mut self, effect: EffectId, param: usize, value: f32) -> Result<f32, BusError> {
        let stored = self.bus.publish(effect, param, value)?;
        self.subject.notify(&ParamChange::Value {
            effect,
            param,
            value: stored,
        });
        Ok(stored)
    }

    /// Publishes a group that lands at one block boundary, then notifies
    /// observers once per parameter with the stored values.
    pub fn set_group(&mut self, effect: EffectId, params: &[(usize, f32)]) -> Result<(), BusError> {
        self.bus.publish_group(effect, params)?;
        for &(param, _) in params {
            if let Some(value) = self.bus.value(effect, param) {
                self.subject.notify(&ParamChange::Value {
                    effect,
                    param,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Requests bypass on or off for one effect.
    pub fn set_bypass(&mut self, effect: EffectId, bypassed: bool) -> Result<(), BusError> {
        self.bus.request_bypass(effect, bypassed)?;
        self.subject
            .notify(&ParamChange::Bypass { effect, bypassed });
        Ok(())
    }

    /// Requests chain bypass on or off.
    pub fn set_chain_bypass(&mut self, bypassed: bool) {
        self.bus.request_chain_bypass(bypassed);
        self.subject.notify(&ParamChange::ChainBypass(bypassed));
    }

    /// Requests a reset of one effect, clearing a fault.
    pub fn reset(&mut self, effect: EffectId) -> Result<(), BusError> {
        self.bus.request_reset(effect)?;
        self.subject.notify(&ParamChange::Reset(effect));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EffectChain;
    use crate::effect::Effect;
    use crate::param_info::{ParamDescriptor, ParameterInfo};
    use std::sync::{Arc, Mutex};

    struct Level(f32);

    impl Effect for Level {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    impl ParameterInfo for Level {
        fn param_count(&self) -> usize {
            1
        }
        fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
            (index == 0).then(|| ParamDescriptor::percent("Level", "Lvl", 100.0))
        }
        fn get_param(&self, _: usize) -> f32 {
            self.0
        }
        fn set_param(&mut self, _: usize, value: f32) {
            self.0 = value;
        }
    }

    fn bus() -> ParameterBus {
        let mut chain: EffectChain<Level, 2> = EffectChain::new(48000.0);
        chain.push(Level(100.0)).unwrap();
        ParameterBus::for_chain(&chain).unwrap()
    }

    fn recorder(
        log: &Arc<Mutex<Vec<(u8, ParamChange)>>>,
        tag: u8,
    ) -> impl ParamObserver + Send + 'static {
        let log = Arc::clone(log);
        move |change: &ParamChange| log.lock().unwrap().push((tag, *change))
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subject = ParamSubject::new();
        subject.attach(recorder(&log, 1));
        subject.attach(recorder(&log, 2));
        subject.attach(recorder(&log, 3));

        subject.notify(&ParamChange::ChainBypass(true));
        let tags: Vec<u8> = log.lock().unwrap().iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, [1, 2, 3]);
    }

    #[test]
    fn detach_preserves_order_and_ids_are_not_reused() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subject = ParamSubject::new();
        let a = subject.attach(recorder(&log, 1));
        let b = subject.attach(recorder(&log, 2));
        subject.attach(recorder(&log, 3));

        assert!(subject.detach(b));
        assert!(!subject.detach(b));
        let d = subject.attach(recorder(&log, 4));
        assert_ne!(d, b);
        assert_ne!(d, a);

        subject.notify(&ParamChange::Reset(EffectId(0)));
        let tags: Vec<u8> = log.lock().unwrap().iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, [1, 3, 4]);
        assert_eq!(subject.len(), 3);
    }

    #[test]
    fn surface_reports_clamped_value() {
        let bus = bus();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut surface = ControlSurface::new(&bus);
        surface.attach(recorder(&log, 0));

        assert_eq!(surface.set(EffectId(0), 0, 150.0), Ok(100.0));
        assert_eq!(
            log.lock().unwrap()[0].1,
            ParamChange::Value {
                effect: EffectId(0),
                param: 0,
                value: 100.0
            }
        );
        assert!(bus.is_pending(EffectId(0)));
    }

    #[test]
    fn rejected_change_is_not_notified() {
        let bus = bus();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut surface = ControlSurface::new(&bus);
        surface.attach(recorder(&log, 0));

        assert!(surface.set(EffectId(4), 0, 1.0).is_err());
        assert!(surface.set_bypass(EffectId(4), true).is_err());
        assert!(log.lock().unwrap().is_empty());

        surface.set_bypass(EffectId(0), true).unwrap();
        surface.set_chain_bypass(false);
        surface.reset(EffectId(0)).unwrap();
        surface.set_group(EffectId(0), &[(0, 20.0)]).unwrap();
        assert_eq!(log.lock().unwrap().len(), 4);
    }
}
