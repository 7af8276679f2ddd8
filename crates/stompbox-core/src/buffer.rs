//! Fixed-capacity sample block shared between capture and processing.
//!
//! A [`SampleBuffer`] holds exactly one block of audio. It is written by one
//! side (the codec interrupt for capture, the engine for playback), marked
//! full, and then read by the other side. Ownership moves between the two
//! sides as a `&mut SampleBuffer` handle through a
//! [`HandoffQueue`](crate::HandoffQueue); the sample array itself is never
//! copied across the boundary.
//!
//! # States
//!
//! ```text
//!            write / push / fill          mark_full
//! recycle ──► Filling ─────────────────────────────► Full ──► as_slice
//!    ▲                                                 │
//!    └─────────────────────────────────────────────────┘
//! ```
//!
//! Reading a buffer that is still filling is an error, as is writing to a
//! buffer that has been marked full.

use core::fmt;

/// Number of samples in one processing block.
pub const BLOCK_SIZE: usize = 256;

/// One block of mono `f32` audio.
pub type Block = [f32; BLOCK_SIZE];

/// Fill state of a [`SampleBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    /// Accepting writes; not readable.
    #[default]
    Filling,
    /// Sealed; readable until recycled.
    Full,
}

/// Errors returned by [`SampleBuffer`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Write index is past the end of the block.
    OutOfRange {
        /// Offending index.
        index: usize,
        /// Block capacity.
        capacity: usize,
    },
    /// Write attempted on a buffer that is already full.
    NotFilling,
    /// Read attempted on a buffer that is still filling.
    NotReady,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, capacity } => {
                write!(f, "sample index {index} out of range for block of {capacity}")
            }
            Self::NotFilling => f.write_str("buffer is full and no longer accepts writes"),
            Self::NotReady => f.write_str("buffer is still filling"),
        }
    }
}

impl core::error::Error for BufferError {}

/// One block of samples with a write cursor and a full marker.
///
/// `N` is a compile-time constant shared by producer and consumer. The
/// default instantiation, `SampleBuffer` (= `SampleBuffer<f32, 256>`), is the
/// unit moved through the audio pipeline.
///
/// # Example
///
/// ```rust
/// use stompbox_core::{SampleBuffer, BufferError};
///
/// let mut buf: SampleBuffer<f32, 4> = SampleBuffer::new();
/// buf.write(0, 0.5).unwrap();
/// assert_eq!(buf.as_slice(), Err(BufferError::NotReady));
///
/// buf.mark_full();
/// assert_eq!(buf.as_slice().unwrap(), &[0.5, 0.0, 0.0, 0.0]);
/// assert_eq!(buf.write(1, 1.0), Err(BufferError::NotFilling));
/// ```
#[derive(Clone)]
pub struct SampleBuffer<T = f32, const N: usize = BLOCK_SIZE> {
    samples: [T; N],
    cursor: usize,
    state: BufferState,
}

impl<const N: usize> SampleBuffer<f32, N> {
    /// Silent `f32` buffer, usable in `const` and `static` initializers.
    pub const fn zeroed() -> Self {
        Self {
            samples: [0.0; N],
            cursor: 0,
            state: BufferState::Filling,
        }
    }
}

impl<T: Copy + Default, const N: usize> SampleBuffer<T, N> {
    /// Creates an empty buffer in the filling state.
    pub fn new() -> Self {
        Self {
            samples: [T::default(); N],
            cursor: 0,
            state: BufferState::Filling,
        }
    }

    /// Fixed block length.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Length of the defined prefix: every sample below this index was
    /// written or zeroed since the last recycle.
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// True if nothing has been written since the last recycle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Current fill state.
    #[inline]
    pub fn state(&self) -> BufferState {
        self.state
    }

    /// True once [`mark_full`](Self::mark_full) has been called.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.state == BufferState::Full
    }

    /// Writes one sample at `index`.
    ///
    /// Writing past the cursor zeroes the skipped samples, so the block
    /// below the cursor never holds data from the previous cycle.
    #[inline]
    pub fn write(&mut self, index: usize, value: T) -> Result<(), BufferError> {
        if self.state != BufferState::Filling {
            return Err(BufferError::NotFilling);
        }
        if index >= N {
            return Err(BufferError::OutOfRange { index, capacity: N });
        }
        if index > self.cursor {
            self.samples[self.cursor..index].fill(T::default());
        }
        self.samples[index] = value;
        self.cursor = self.cursor.max(index + 1);
        Ok(())
    }

    /// Appends one sample at the cursor.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), BufferError> {
        self.write(self.cursor, value)
    }

    /// Appends as many samples from `src` as fit, returning how many were taken.
    pub fn fill_from(&mut self, src: &[T]) -> Result<usize, BufferError> {
        if self.state != BufferState::Filling {
            return Err(BufferError::NotFilling);
        }
        let count = src.len().min(N - self.cursor);
        self.samples[self.cursor..self.cursor + count].copy_from_slice(&src[..count]);
        self.cursor += count;
        Ok(count)
    }

    /// Hands the whole block to `f` for writing and moves the cursor to the end.
    ///
    /// This is how both the codec endpoint and the engine produce a block in
    /// one pass without per-sample bounds checks.
    pub fn fill(&mut self, f: impl FnOnce(&mut [T; N])) -> Result<(), BufferError> {
        if self.state != BufferState::Filling {
            return Err(BufferError::NotFilling);
        }
        f(&mut self.samples);
        self.cursor = N;
        Ok(())
    }

    /// Seals the buffer for reading.
    ///
    /// Samples past the cursor are zeroed (`T::default()`). Together with the
    /// gap zeroing in [`write`](Self::write) a sealed block never exposes
    /// data from the previous cycle. Calling it twice is a no-op.
    pub fn mark_full(&mut self) {
        if self.state == BufferState::Full {
            return;
        }
        self.samples[self.cursor..].fill(T::default());
        self.cursor = N;
        self.state = BufferState::Full;
    }

    /// Read-only view of a full block.
    #[inline]
    pub fn as_slice(&self) -> Result<&[T], BufferError> {
        self.as_block().map(|block| block.as_slice())
    }

    /// Read-only fixed-size view of a full block.
    #[inline]
    pub fn as_block(&self) -> Result<&[T; N], BufferError> {
        match self.state {
            BufferState::Full => Ok(&self.samples),
            BufferState::Filling => Err(BufferError::NotReady),
        }
    }

    /// Returns the buffer to the filling state with the cursor at zero.
    ///
    /// Sample contents are left in place; they are overwritten or zeroed by
    /// the next fill cycle.
    #[inline]
    pub fn recycle(&mut self) {
        self.cursor = 0;
        self.state = BufferState::Filling;
    }
}

impl<T: Copy + Default, const N: usize> Default for SampleBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for SampleBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("capacity", &N)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
