//! A WAV file standing in for the codec's DMA buffers.

use stompbox_engine::AudioInterface;

/// Feeds input samples block by block and records whatever is played.
/// Reads past the end of the input return silence.
pub struct FileCodec<'s> {
    input: &'s [f32],
    position: usize,
    played: Vec<f32>,
}

impl<'s> FileCodec<'s> {
    /// Codec over `input`, reserving room for `capacity` played samples.
    pub fn new(input: &'s [f32], capacity: usize) -> Self {
        Self {
            input,
            position: 0,
            played: Vec::with_capacity(capacity),
        }
    }

    /// Everything written to the output so far.
    pub fn into_played(self) -> Vec<f32> {
        self.played
    }
}

impl AudioInterface for FileCodec<'_> {
    fn read_input(&mut self, block: &mut [f32]) {
        let start = self.position.min(self.input.len());
        let end = (self.position + block.len()).min(self.input.len());
        let (head, tail) = block.split_at_mut(end - start);
        head.copy_from_slice(&self.input[start..end]);
        tail.fill(0.0);
        self.position += block.len();
    }

    fn write_output(&mut self, block: &[f32]) {
        self.played.extend_from_slice(block);
    }
}
