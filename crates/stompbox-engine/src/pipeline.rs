//! Buffer circulation between the codec interrupt and the processing task.
//!
//! A [`BufferPool`] owns `DEPTH` capture and `DEPTH` playback blocks.
//! [`AudioPipeline`] borrows them and moves `&mut SampleBuffer` handles
//! through four hand-off queues:
//!
//! ```text
//!            capture_free  <-----------  engine
//!   ISR  ->  capture_ready ----------->  engine
//!   ISR  <-  playback_ready <----------  engine
//!            playback_free ----------->  engine
//! ```
//!
//! Each buffer is in exactly one queue or held by exactly one side at any
//! instant, so no block is ever read while it is being written. Every queue
//! has room for all `DEPTH` handles of its kind, which makes the "return a
//! buffer" pushes infallible in practice.
//!
//! [`AudioPipeline::split`] hands out one [`InterruptPort`] and one
//! [`ProcessingPort`]; both are `Send`.

use stompbox_core::{BLOCK_SIZE, Block, Consumer, HandoffQueue, Producer, SampleBuffer};

use crate::stats::EngineStats;
#[cfg(feature = "tracing")]
use crate::stats::should_report;

/// Exclusive handle to one block, moved through the queues.
pub type Handle<'a> = &'a mut SampleBuffer;

const SILENCE: Block = [0.0; BLOCK_SIZE];

/// Codec side of the system.
///
/// Both calls happen inside the transfer-complete interrupt and cover one
/// whole block.
pub trait AudioInterface {
    /// Fills `block` with freshly captured samples.
    fn read_input(&mut self, block: &mut [f32]);

    /// Takes `block` for playback.
    fn write_output(&mut self, block: &[f32]);
}

impl<T: AudioInterface + ?Sized> AudioInterface for &mut T {
    fn read_input(&mut self, block: &mut [f32]) {
        (**self).read_input(block);
    }

    fn write_output(&mut self, block: &[f32]) {
        (**self).write_output(block);
    }
}

/// Statically sized storage for every block the pipeline circulates.
#[derive(Debug)]
pub struct BufferPool<const DEPTH: usize> {
    capture: [SampleBuffer; DEPTH],
    playback: [SampleBuffer; DEPTH],
}

impl<const DEPTH: usize> BufferPool<DEPTH> {
    /// Zeroed pool. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            capture: [const { SampleBuffer::<f32, BLOCK_SIZE>::zeroed() }; DEPTH],
            playback: [const { SampleBuffer::<f32, BLOCK_SIZE>::zeroed() }; DEPTH],
        }
    }
}

impl<const DEPTH: usize> Default for BufferPool<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

/// The four hand-off queues, preloaded with every pool buffer as free.
pub struct AudioPipeline<'a, const DEPTH: usize> {
    capture_ready: HandoffQueue<Handle<'a>, DEPTH>,
    capture_free: HandoffQueue<Handle<'a>, DEPTH>,
    playback_ready: HandoffQueue<Handle<'a>, DEPTH>,
    playback_free: HandoffQueue<Handle<'a>, DEPTH>,
}

impl<'a, const DEPTH: usize> AudioPipeline<'a, DEPTH> {
    /// Takes over `pool` for the life of the pipeline.
    pub fn new(pool: &'a mut BufferPool<DEPTH>) -> Self {
        let mut pipeline = Self {
            capture_ready: HandoffQueue::new(),
            capture_free: HandoffQueue::new(),
            playback_ready: HandoffQueue::new(),
            playback_free: HandoffQueue::new(),
        };
        // DEPTH handles into queues of capacity DEPTH: never full.
        for buffer in &mut pool.capture {
            let _ = pipeline.capture_free.push(buffer);
        }
        for buffer in &mut pool.playback {
            let _ = pipeline.playback_free.push(buffer);
        }
        pipeline
    }

    /// Blocks captured and waiting for the engine.
    pub fn pending_capture(&self) -> usize {
        self.capture_ready.size()
    }

    /// Processed blocks waiting for the codec.
    pub fn pending_playback(&self) -> usize {
        self.playback_ready.size()
    }

    /// Endpoints for the two contexts. Both report into `stats`.
    pub fn split<'q>(
        &'q mut self,
        stats: &'q EngineStats,
    ) -> (InterruptPort<'q, 'a, DEPTH>, ProcessingPort<'q, 'a, DEPTH>) {
        let Self {
            capture_ready,
            capture_free,
            playback_ready,
            playback_free,
        } = self;
        let (capture_tx, capture_rx) = capture_ready.split();
        let (capture_free_tx, capture_free_rx) = capture_free.split();
        let (playback_tx, playback_rx) = playback_ready.split();
        let (playback_free_tx, playback_free_rx) = playback_free.split();

        (
            InterruptPort {
                capture_free: capture_free_rx,
                capture_ready: capture_tx,
                playback_ready: playback_rx,
                playback_free: playback_free_tx,
                held: None,
                discard: SILENCE,
                primed: false,
                stats,
            },
            ProcessingPort {
                capture_ready: capture_rx,
                capture_free: capture_free_tx,
                playback_free: playback_free_rx,
                playback_ready: playback_tx,
            },
        )
    }
}

impl<const DEPTH: usize> core::fmt::Debug for AudioPipeline<'_, DEPTH> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioPipeline")
            .field("capture_ready", &self.capture_ready.size())
            .field("capture_free", &self.capture_free.size())
            .field("playback_ready", &self.playback_ready.size())
            .field("playback_free", &self.playback_free.size())
            .finish()
    }
}

/// What one transfer-complete interrupt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferReport {
    /// A processed block went to the codec (otherwise silence did).
    pub played: bool,
    /// The captured block was queued for the engine.
    pub captured: bool,
    /// Silence substituted after playback had started.
    pub underrun: bool,
    /// The captured block was dropped.
    pub overrun: bool,
}

/// Interrupt-context endpoint.
pub struct InterruptPort<'q, 'a, const DEPTH: usize> {
    capture_free: Consumer<'q, Handle<'a>, DEPTH>,
    capture_ready: Producer<'q, Handle<'a>, DEPTH>,
    playback_ready: Consumer<'q, Handle<'a>, DEPTH>,
    playback_free: Producer<'q, Handle<'a>, DEPTH>,
    /// Capture buffer kept back after an overrun, reused next time.
    held: Option<Handle<'a>>,
    discard: Block,
    primed: bool,
    stats: &'q EngineStats,
}

impl<'a, const DEPTH: usize> InterruptPort<'_, 'a, DEPTH> {
    /// Body of the codec's transfer-complete interrupt.
    ///
    /// Plays one processed block (or silence), then captures one block and
    /// queues it for the engine. Underruns count only once the first
    /// processed block has been played, so start-up latency is not an
    /// underrun. Never blocks.
    pub fn on_transfer_complete(&mut self, io: &mut impl AudioInterface) -> TransferReport {
        let mut report = TransferReport::default();

        match self.playback_ready.pop() {
            Some(buffer) => {
                match buffer.as_slice() {
                    Ok(block) => io.write_output(block),
                    Err(_) => io.write_output(&SILENCE),
                }
                buffer.recycle();
                let _ = self.playback_free.push(buffer);
                self.primed = true;
                report.played = true;
            }
            None => {
                io.write_output(&SILENCE);
                if self.primed {
                    report.underrun = true;
                    let _count = self.stats.record_underrun();
                    #[cfg(feature = "tracing")]
                    if should_report(_count) {
                        tracing::warn!(underruns = _count, "playback underrun");
                    }
                }
            }
        }

        let Some(buffer) = self.held.take().or_else(|| self.capture_free.pop()) else {
            io.read_input(&mut self.discard);
            self.overrun();
            report.overrun = true;
            return report;
        };

        buffer.recycle();
        if buffer.fill(|block| io.read_input(block)).is_err() {
            self.held = Some(buffer);
            self.overrun();
            report.overrun = true;
            return report;
        }
        buffer.mark_full();

        match self.capture_ready.push(buffer) {
            Ok(()) => report.captured = true,
            Err(buffer) => {
                self.held = Some(buffer);
                self.overrun();
                report.overrun = true;
            }
        }
        report
    }

    fn overrun(&self) {
        let _count = self.stats.record_overrun();
        #[cfg(feature = "tracing")]
        if should_report(_count) {
            tracing::warn!(overruns = _count, "capture overrun, newest block dropped");
        }
    }
}

impl<const DEPTH: usize> core::fmt::Debug for InterruptPort<'_, '_, DEPTH> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterruptPort")
            .field("held", &self.held.is_some())
            .field("primed", &self.primed)
            .finish_non_exhaustive()
    }
}

/// Processing-context endpoint, driven by
/// [`AudioEngine`](crate::AudioEngine).
pub struct ProcessingPort<'q, 'a, const DEPTH: usize> {
    capture_ready: Consumer<'q, Handle<'a>, DEPTH>,
    capture_free: Producer<'q, Handle<'a>, DEPTH>,
    playback_free: Consumer<'q, Handle<'a>, DEPTH>,
    playback_ready: Producer<'q, Handle<'a>, DEPTH>,
}

impl<'a, const DEPTH: usize> ProcessingPort<'_, 'a, DEPTH> {
    /// Next captured block, oldest first.
    pub(crate) fn take_capture(&mut self) -> Option<Handle<'a>> {
        self.capture_ready.pop()
    }

    /// Free playback block to render into.
    pub(crate) fn take_playback(&mut self) -> Option<Handle<'a>> {
        self.playback_free.pop()
    }

    /// Returns a consumed capture block to the interrupt.
    pub(crate) fn release_capture(&mut self, buffer: Handle<'a>) {
        buffer.recycle();
        let _ = self.capture_free.push(buffer);
    }

    /// Queues a rendered block for playback.
    pub(crate) fn submit_playback(&mut self, buffer: Handle<'a>) {
        let _ = self.playback_ready.push(buffer);
    }

    /// True if a captured block is waiting.
    pub fn has_capture(&self) -> bool {
        !self.capture_ready.empty()
    }
}

impl<const DEPTH: usize> core::fmt::Debug for ProcessingPort<'_, '_, DEPTH> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProcessingPort")
            .field("capture_ready", &self.capture_ready.size())
            .finish_non_exhaustive()
    }
}
