//! Wake-up hook between the interrupt and the processing context.
//!
//! The engine's only waiting point is "until the capture queue may have a
//! block". [`Notify::wait`] may return spuriously; the engine always polls
//! the queue afterwards.

/// Signal from the transfer-complete handler to the processing loop.
pub trait Notify {
    /// Blocks (or sleeps) until notified or a short timeout elapses.
    fn wait(&self);

    /// Wakes the waiter. Callable from the interrupt context.
    fn notify(&self);
}

/// Busy polling: `wait` is a spin-loop hint and `notify` does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinWait;

impl Notify for SpinWait {
    fn wait(&self) {
        core::hint::spin_loop();
    }

    fn notify(&self) {}
}

/// Thread-parking notifier for host builds.
///
/// `notify` is a flag store plus `unpark`; it never takes a lock.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct Signal {
    pending: core::sync::atomic::AtomicBool,
    waiter: std::sync::OnceLock<std::thread::Thread>,
    timeout: std::time::Duration,
}

#[cfg(feature = "std")]
impl Signal {
    /// Signal whose `wait` gives up after `timeout`.
    pub fn new(timeout: std::time::Duration) -> Self {
        Self {
            pending: core::sync::atomic::AtomicBool::new(false),
            waiter: std::sync::OnceLock::new(),
            timeout,
        }
    }
}

#[cfg(feature = "std")]
impl Default for Signal {
    fn default() -> Self {
        Self::new(std::time::Duration::from_millis(2))
    }
}

#[cfg(feature = "std")]
impl Notify for Signal {
    /// Must always be called from the same thread.
    fn wait(&self) {
        use core::sync::atomic::Ordering;

        self.waiter.get_or_init(std::thread::current);
        if !self.pending.swap(false, Ordering::Acquire) {
            std::thread::park_timeout(self.timeout);
            self.pending.store(false, Ordering::Release);
        }
    }

    fn notify(&self) {
        self.pending
            .store(true, core::sync::atomic::Ordering::Release);
        if let Some(thread) = self.waiter.get() {
            thread.unpark();
        }
    }
}
