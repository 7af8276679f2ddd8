//! Low-frequency oscillator for amplitude modulation.

use core::f32::consts::PI;
use libm::sinf;

/// LFO waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Smooth sine.
    #[default]
    Sine,
    /// Linear ramps up and down.
    Triangle,
    /// Hard on/off.
    Square,
}

impl LfoWaveform {
    /// Maps a stepped parameter value (0, 1, 2) to a waveform.
    pub fn from_index(index: f32) -> Self {
        match index as u32 {
            0 => Self::Sine,
            1 => Self::Triangle,
            _ => Self::Square,
        }
    }

    /// Index used by stepped parameters.
    pub fn index(self) -> f32 {
        match self {
            Self::Sine => 0.0,
            Self::Triangle => 1.0,
            Self::Square => 2.0,
        }
    }
}

/// Phase-accumulating oscillator producing values in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
    waveform: LfoWaveform,
}

impl Lfo {
    /// Sine LFO at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
            waveform: LfoWaveform::Sine,
        }
    }

    /// Sets the rate in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Current rate in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Sets the waveform.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Keeps the rate in Hz across a sample-rate change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }

    /// Restarts at phase 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Next value in `[-1, 1]`.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = match self.waveform {
            LfoWaveform::Sine => sinf(self.phase * 2.0 * PI),
            LfoWaveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
            LfoWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        output
    }

    /// Next value mapped to `[0, 1]`.
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        (self.next() + 1.0) * 0.5
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}
