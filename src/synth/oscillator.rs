//! Phase-accumulating oscillator and noise generators

use std::f64::consts::TAU;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    /// Uniform white noise
    Noise,
    /// Leaky-integrated white noise (1/f^2)
    Rumble,
}

/// Oscillator producing samples in -1..1
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f64,
    frequency: f64,
    sample_rate: f64,
    rumble: f64,
    rng: u64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Self::seeded(waveform, frequency, sample_rate, 0x9E37_79B9_7F4A_7C15)
    }

    /// Noise waveforms with distinct seeds stay uncorrelated
    pub fn seeded(waveform: Waveform, frequency: f64, sample_rate: f64, seed: u64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency,
            sample_rate,
            rumble: 0.0,
            rng: seed.max(1),
        }
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency.max(0.0);
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Current phase, 0..1
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn generate(&mut self) -> f64 {
        let sample = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Triangle => triangle(self.phase),
            Waveform::Noise => self.white(),
            Waveform::Rumble => {
                let white = self.white();
                self.rumble = ((self.rumble + white * 0.02) * 0.999).clamp(-1.0, 1.0);
                self.rumble
            }
        };

        self.phase = (self.phase + self.frequency / self.sample_rate).fract();
        sample
    }

    /// Xorshift64
    fn white(&mut self) -> f64 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng = x;
        (x as f64 / u64::MAX as f64) * 2.0 - 1.0
    }
}

fn triangle(p: f64) -> f64 {
    if p < 0.25 {
        4.0 * p
    } else if p < 0.75 {
        2.0 - 4.0 * p
    } else {
        4.0 * p - 4.0
    }
}
