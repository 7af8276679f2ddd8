//! Lock-free single-producer single-consumer hand-off queue.
//!
//! [`HandoffQueue`] is the only synchronization primitive crossing the
//! interrupt/processing boundary. It moves handles (in practice
//! `&mut SampleBuffer`) from one context to the other without locks,
//! compare-and-swap, or blocking.
//!
//! # Algorithm
//!
//! Storage has `N + 1` slots for a usable capacity of `N`. The read and write
//! positions are logical counters that only ever move forward, each advanced
//! by exactly one side:
//!
//! - `len = write - read`, always in `[0, N]`
//! - empty when `write == read`, full when `write - read == N`
//! - storage index is `counter % (N + 1)`
//!
//! The counters wrap at the largest multiple of `N + 1` that fits in a
//! `usize`, which keeps the storage index continuous across the wrap.
//!
//! A slot write is published by a `Release` store of the write counter and
//! observed with an `Acquire` load on the other side; the same pairing on the
//! read counter returns the slot to the producer.
//!
//! # Single producer, single consumer
//!
//! The discipline is enforced by the type system rather than by contract:
//! [`HandoffQueue::split`] borrows the queue mutably and returns exactly one
//! [`Producer`] and one [`Consumer`]. Direct `push`/`pop` on the queue take
//! `&mut self`, which is trivially single-context.
//!
//! ```rust
//! use stompbox_core::HandoffQueue;
//!
//! let mut queue: HandoffQueue<u32, 2> = HandoffQueue::new();
//! let (mut tx, mut rx) = queue.split();
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || {
//!         for n in 0..100 {
//!             let mut v = n;
//!             while let Err(back) = tx.push(v) {
//!                 v = back;
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     });
//!     let mut expected = 0;
//!     while expected < 100 {
//!         if let Some(v) = rx.pop() {
//!             assert_eq!(v, expected);
//!             expected += 1;
//!         }
//!     }
//! });
//! ```

#![allow(unsafe_code)]

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicUsize, Ordering};

struct Slot<T>(UnsafeCell<MaybeUninit<T>>);

impl<T> Slot<T> {
    const fn empty() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }
}

/// Bounded SPSC queue with capacity `N`.
///
/// `push` on a full queue and `pop` on an empty queue are ordinary polled
/// outcomes: they return immediately and leave the queue unchanged.
pub struct HandoffQueue<T, const N: usize> {
    // `N + 1` slots: `slots` plus `extra`. Stable const generics cannot
    // spell `[T; N + 1]`.
    slots: [Slot<T>; N],
    extra: Slot<T>,
    read: AtomicUsize,
    write: AtomicUsize,
}

// SAFETY: values cross contexts, so T: Send. Each counter is advanced by one
// side only, and a slot is touched by the producer strictly before the
// Release store that hands it to the consumer (and vice versa), so no slot is
// ever accessed from both sides at once.
unsafe impl<T: Send, const N: usize> Sync for HandoffQueue<T, N> {}

impl<T, const N: usize> HandoffQueue<T, N> {
    const SLOTS: usize = N + 1;
    const PERIOD: usize = (usize::MAX / Self::SLOTS) * Self::SLOTS;

    /// Creates an empty queue. Usable in `static` initializers.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const contexts) if `N == 0`.
    pub const fn new() -> Self {
        assert!(N > 0, "hand-off queue capacity must be at least 1");
        Self {
            slots: [const { Slot::empty() }; N],
            extra: Slot::empty(),
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
        }
    }

    /// Maximum number of queued values.
    #[inline]
    pub const fn max_size(&self) -> usize {
        N
    }

    /// Number of queued values.
    #[inline]
    pub fn size(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        Self::distance(read, write)
    }

    /// Alias of [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    /// True when no value is queued.
    #[inline]
    pub fn empty(&self) -> bool {
        self.size() == 0
    }

    /// Alias of [`empty`](Self::empty).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    /// True when `size() == max_size()`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() == N
    }

    /// Enqueues `value`, or hands it back if the queue is full.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), T> {
        self.push_shared(value)
    }

    /// Dequeues the oldest value, or `None` if the queue is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.pop_shared()
    }

    /// Splits the queue into its producer and consumer endpoints.
    ///
    /// The endpoints borrow the queue, so no other access is possible while
    /// they are alive. Each may be moved to a different thread or context.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let queue: &Self = self;
        (Producer { queue }, Consumer { queue })
    }

    #[inline]
    fn distance(read: usize, write: usize) -> usize {
        if write >= read {
            write - read
        } else {
            Self::PERIOD - read + write
        }
    }

    #[inline]
    fn advance(counter: usize) -> usize {
        if counter + 1 == Self::PERIOD {
            0
        } else {
            counter + 1
        }
    }

    #[inline]
    fn slot(&self, counter: usize) -> *mut MaybeUninit<T> {
        let index = counter % Self::SLOTS;
        if index < N {
            self.slots[index].0.get()
        } else {
            self.extra.0.get()
        }
    }

    // Producer side only.
    #[inline]
    fn push_shared(&self, value: T) -> Result<(), T> {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        if Self::distance(read, write) == N {
            return Err(value);
        }
        // SAFETY: only the producer writes here, and the slot at `write` is
        // outside the live range [read, write), so the consumer is not
        // reading it. The Acquire load of `read` above orders this write
        // after the consumer finished with the slot.
        unsafe {
            (*self.slot(write)).write(value);
        }
        self.write.store(Self::advance(write), Ordering::Release);
        Ok(())
    }

    // Consumer side only.
    #[inline]
    fn pop_shared(&self) -> Option<T> {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }
        // SAFETY: `read != write` means the slot at `read` was initialized by
        // the producer before its Release store of `write`, which the Acquire
        // load above synchronizes with. Only the consumer reads it, once.
        let value = unsafe { (*self.slot(read)).assume_init_read() };
        self.read.store(Self::advance(read), Ordering::Release);
        Some(value)
    }
}

impl<T, const N: usize> Default for HandoffQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for HandoffQueue<T, N> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}

impl<T, const N: usize> fmt::Debug for HandoffQueue<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffQueue")
            .field("size", &self.size())
            .field("max_size", &N)
            .finish()
    }
}

/// Producing endpoint of a split [`HandoffQueue`].
pub struct Producer<'a, T, const N: usize> {
    queue: &'a HandoffQueue<T, N>,
}

impl<T, const N: usize> Producer<'_, T, N> {
    /// Enqueues `value`, or hands it back if the queue is full.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), T> {
        self.queue.push_shared(value)
    }

    /// Number of queued values.
    #[inline]
    pub fn size(&self) -> usize {
        self.queue.size()
    }

    /// True when a push would fail.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Capacity of the underlying queue.
    #[inline]
    pub const fn max_size(&self) -> usize {
        N
    }
}

/// Consuming endpoint of a split [`HandoffQueue`].
pub struct Consumer<'a, T, const N: usize> {
    queue: &'a HandoffQueue<T, N>,
}

impl<T, const N: usize> Consumer<'_, T, N> {
    /// Dequeues the oldest value, or `None` if the queue is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_shared()
    }

    /// Number of queued values.
    #[inline]
    pub fn size(&self) -> usize {
        self.queue.size()
    }

    /// True when a pop would fail.
    #[inline]
    pub fn empty(&self) -> bool {
        self.queue.empty()
    }

    /// Capacity of the underlying queue.
    #[inline]
    pub const fn max_size(&self) -> usize {
        N
    }
}

impl<T, const N: usize> fmt::Debug for Producer<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(self.queue).finish()
    }
}

impl<T, const N: usize> fmt::Debug for Consumer<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Consumer").field(self.queue).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_four_scenario() {
        let mut q: HandoffQueue<char, 4> = HandoffQueue::new();
        for c in ['A', 'B', 'C', 'D'] {
            assert!(q.push(c).is_ok());
        }
        assert_eq!(q.push('E'), Err('E'));
        assert_eq!(q.size(), 4);

        assert_eq!(q.pop(), Some('A'));
        assert_eq!(q.pop(), Some('B'));
        assert_eq!(q.pop(), Some('C'));
        assert_eq!(q.pop(), Some('D'));
        assert_eq!(q.pop(), None);
        assert!(q.empty());
    }

    #[test]
    fn failed_ops_leave_state_unchanged() {
        let mut q: HandoffQueue<u8, 2> = HandoffQueue::new();
        assert_eq!(q.pop(), None);
        assert_eq!(q.size(), 0);

        q.push(1).unwrap();
        q.push(2).unwrap();
        assert_eq!(q.push(3), Err(3));
        assert_eq!(q.size(), 2);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
    }

    #[test]
    fn single_slot_queue() {
        let mut q: HandoffQueue<i32, 1> = HandoffQueue::new();
        q.push(42).unwrap();
        assert!(q.is_full());
        assert_eq!(q.push(99), Err(99));
        assert_eq!(q.pop(), Some(42));
        assert!(q.is_empty());
    }

    #[test]
    fn wraps_through_extra_slot() {
        let mut q: HandoffQueue<u32, 3> = HandoffQueue::new();
        for round in 0..50 {
            let base = round * 10;
            q.push(base).unwrap();
            q.push(base + 1).unwrap();
            assert_eq!(q.pop(), Some(base));
            assert_eq!(q.pop(), Some(base + 1));
        }
        assert!(q.empty());
    }

    #[test]
    fn counters_wrap_at_period() {
        type Q = HandoffQueue<u8, 3>;
        assert_eq!(Q::PERIOD % 4, 0);
        assert_eq!(Q::advance(Q::PERIOD - 1), 0);
        assert_eq!(Q::distance(Q::PERIOD - 2, 1), 3);
        assert_eq!((Q::PERIOD - 1) % 4, 3);
    }

    #[test]
    fn drop_releases_queued_values() {
        use std::rc::Rc;
        let token = Rc::new(());
        {
            let mut q: HandoffQueue<Rc<()>, 4> = HandoffQueue::new();
            q.push(Rc::clone(&token)).unwrap();
            q.push(Rc::clone(&token)).unwrap();
            assert_eq!(Rc::strong_count(&token), 3);
        }
        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn split_endpoints_share_state() {
        let mut q: HandoffQueue<u16, 2> = HandoffQueue::new();
        {
            let (mut tx, mut rx) = q.split();
            tx.push(5).unwrap();
            assert_eq!(rx.size(), 1);
            assert_eq!(rx.pop(), Some(5));
            assert!(rx.empty());
            assert_eq!(tx.max_size(), 2);
        }
        assert!(q.is_empty());
    }

    #[test]
    fn cross_thread_handoff_preserves_order() {
        let mut q: HandoffQueue<u32, 4> = HandoffQueue::new();
        let (mut tx, mut rx) = q.split();
        std::thread::scope(|s| {
            s.spawn(move || {
                for n in 0..10_000u32 {
                    let mut v = n;
                    while let Err(back) = tx.push(v) {
                        v = back;
                        std::thread::yield_now();
                    }
                }
            });
            let mut next = 0u32;
            while next < 10_000 {
                match rx.pop() {
                    Some(v) => {
                        assert_eq!(v, next);
                        next += 1;
                    }
                    None => std::thread::yield_now(),
                }
            }
        });
    }
}
