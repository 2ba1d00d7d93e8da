//! Markets layer: triangle bleeps under a tremolo

use super::layer::{Layer, TOGGLE_TAU};
use super::oscillator::{Oscillator, Waveform};
use super::ramp::Ramp;
use crate::mapping::{AudioParameterSet, ExponentialMapper, LinearMapper, Mapper};
use crate::sources::SourceKind;

const BLEEP_DECAY_SECS: f64 = 0.12;

/// Short decaying bleeps at `bleep_rate` events per second
pub struct PulseLayer {
    tone: Oscillator,
    tremolo: Oscillator,
    sample_rate: f64,
    clock: f64,
    envelope: f64,
    decay: f64,
    rate: Ramp,
    pitch: Ramp,
    level: Ramp,
    tremolo_rate: Ramp,
    tremolo_depth: Ramp,
    gate: Ramp,
    enabled: bool,
    pitch_map: ExponentialMapper,
    level_map: LinearMapper,
}

impl PulseLayer {
    pub fn new(sample_rate: f64) -> Self {
        let pitch_map = ExponentialMapper::decade("bleep_hz", 300.0, 2000.0);
        let start_hz = pitch_map.map(0.56);

        Self {
            tone: Oscillator::new(Waveform::Triangle, start_hz, sample_rate),
            tremolo: Oscillator::new(Waveform::Sine, 0.84, sample_rate),
            sample_rate,
            clock: 0.0,
            envelope: 0.0,
            decay: (-1.0 / (BLEEP_DECAY_SECS * sample_rate)).exp(),
            rate: Ramp::new(0.34, 1.5, sample_rate),
            pitch: Ramp::new(start_hz, 1.0, sample_rate),
            level: Ramp::new(0.1, 2.5, sample_rate),
            tremolo_rate: Ramp::new(0.84, 1.5, sample_rate),
            tremolo_depth: Ramp::new(0.03, 1.5, sample_rate),
            gate: Ramp::new(1.0, TOGGLE_TAU, sample_rate),
            enabled: true,
            pitch_map,
            level_map: LinearMapper::new("bleep_gain", 0.05, 0.18),
        }
    }

    /// Advance the event clock; true when a bleep starts
    fn trigger(&mut self) -> bool {
        self.clock += self.rate.next() / self.sample_rate;
        if self.clock >= 1.0 {
            self.clock -= 1.0;
            true
        } else {
            false
        }
    }
}

impl Layer for PulseLayer {
    fn source(&self) -> SourceKind {
        SourceKind::Markets
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.gate.set_target(if enabled { 1.0 } else { 0.0 });
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn update_from_data(&mut self, params: &AudioParameterSet) {
        self.rate.set_target(params.bleep_rate);
        self.pitch.set_target(self.pitch_map.map(params.bleep_pitch));
        self.level.set_target(self.level_map.map(params.bleep_level));
        self.tremolo_rate.set_target(params.tremolo_rate);
        self.tremolo_depth.set_target(params.tremolo_depth);
    }

    fn process(&mut self) -> f64 {
        if self.trigger() {
            self.envelope = 1.0;
        } else {
            self.envelope *= self.decay;
        }

        self.tone.set_frequency(self.pitch.next());
        self.tremolo.set_frequency(self.tremolo_rate.next());
        let depth = self.tremolo_depth.next();
        let tremolo = 1.0 - depth * (0.5 + 0.5 * self.tremolo.generate());

        self.tone.generate() * self.envelope * tremolo * self.level.next() * self.gate.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 8000.0;

    fn count_triggers(layer: &mut PulseLayer, secs: f64) -> usize {
        (0..(secs * SR) as usize).filter(|_| layer.trigger()).count()
    }

    #[test]
    fn test_event_rate_follows_param() {
        let mut layer = PulseLayer::new(SR);
        layer.rate.set_immediate(2.0);
        assert_eq!(count_triggers(&mut layer, 10.25), 20);

        layer.rate.set_immediate(0.5);
        assert_eq!(count_triggers(&mut layer, 10.0), 5);
    }

    #[test]
    fn test_output_bounded() {
        let mut layer = PulseLayer::new(SR);
        let mut params = crate::mapping::compute_audio_params(None, None, None, crate::mapping::Preset::Storm);
        params.bleep_level = 1.0;
        params.bleep_rate = 4.0;
        layer.update_from_data(&params);
        let peak = (0..(SR as usize * 3)).map(|_| layer.process().abs()).fold(0.0, f64::max);
        assert!(peak > 0.0 && peak <= 0.18 + 1e-9, "peak {}", peak);
    }

    #[test]
    fn test_pitch_range() {
        let layer = PulseLayer::new(SR);
        assert!((layer.pitch_map.map(0.0) - 300.0).abs() < 1e-9);
        assert!((layer.pitch_map.map(1.0) - 2000.0).abs() < 1e-9);
        assert_eq!(layer.source(), SourceKind::Markets);
    }
}
