//! Space layer: low detuned drone over a filtered rumble

use super::filter::Biquad;
use super::layer::{Layer, TOGGLE_TAU};
use super::oscillator::{Oscillator, Waveform};
use super::ramp::Ramp;
use crate::mapping::{AudioParameterSet, ExponentialMapper, LinearMapper, Mapper, MappingPipeline};
use crate::sources::SourceKind;

const LAYER_GAIN: f64 = 0.3;
const DETUNE: f64 = 1.005;
const WOBBLE_HZ: f64 = 0.02;
const WOBBLE_DEPTH_HZ: f64 = 10.0;

/// Detuned sine pair (40-220 Hz) plus low-passed rumble (40-150 Hz)
pub struct DroneLayer {
    sine_a: Oscillator,
    sine_b: Oscillator,
    rumble: Oscillator,
    wobble: Oscillator,
    tone_filter: Biquad,
    rumble_filter: Biquad,
    pitch: Ramp,
    brightness: Ramp,
    noise: Ramp,
    gate: Ramp,
    enabled: bool,
    pitch_map: MappingPipeline,
    brightness_map: ExponentialMapper,
    rumble_map: MappingPipeline,
    noise_map: LinearMapper,
}

impl DroneLayer {
    pub fn new(sample_rate: f64) -> Self {
        let pitch_map = MappingPipeline::new("drone_pitch").then(ExponentialMapper::decade("hz", 40.0, 220.0));
        let rumble_map = MappingPipeline::new("rumble_cutoff")
            .then(LinearMapper::new("floor", 0.1, 1.0))
            .then(ExponentialMapper::decade("hz", 40.0, 150.0));
        let start_hz = pitch_map.apply(0.4);

        Self {
            sine_a: Oscillator::new(Waveform::Sine, start_hz, sample_rate),
            sine_b: Oscillator::new(Waveform::Sine, start_hz * DETUNE, sample_rate),
            rumble: Oscillator::seeded(Waveform::Rumble, 0.0, sample_rate, 0x51ab),
            wobble: Oscillator::new(Waveform::Sine, WOBBLE_HZ, sample_rate),
            tone_filter: Biquad::lowpass(sample_rate, 400.0),
            rumble_filter: Biquad::lowpass(sample_rate, 120.0),
            pitch: Ramp::new(start_hz, 4.0, sample_rate),
            brightness: Ramp::new(400.0, 4.0, sample_rate),
            noise: Ramp::new(0.0, 6.0, sample_rate),
            gate: Ramp::new(1.0, TOGGLE_TAU, sample_rate),
            enabled: true,
            pitch_map,
            brightness_map: ExponentialMapper::new("tone_cutoff", 120.0, 2400.0),
            rumble_map,
            noise_map: LinearMapper::new("rumble_level", 0.0, 0.6),
        }
    }
}

impl Layer for DroneLayer {
    fn source(&self) -> SourceKind {
        SourceKind::Space
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.gate.set_target(if enabled { 1.0 } else { 0.0 });
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn update_from_data(&mut self, params: &AudioParameterSet) {
        self.pitch.set_target(self.pitch_map.apply(params.drone_pitch));
        self.brightness.set_target(self.brightness_map.map(params.drone_brightness));
        self.noise.set_target(params.noise_amount);
        self.rumble_filter.set_frequency(self.rumble_map.apply(params.noise_amount));
    }

    fn process(&mut self) -> f64 {
        let hz = self.pitch.next();
        self.sine_a.set_frequency(hz);
        self.sine_b.set_frequency(hz * DETUNE);
        let cutoff = self.brightness.next() + self.wobble.generate() * WOBBLE_DEPTH_HZ;
        self.tone_filter.set_frequency(cutoff);

        let tone = self.tone_filter.process(0.5 * (self.sine_a.generate() + self.sine_b.generate()));
        let rumble = self.rumble_filter.process(self.rumble.generate());
        let noise = self.noise_map.map(self.noise.next());

        (tone * (1.0 - 0.5 * noise) + rumble * noise * 4.0) * LAYER_GAIN * self.gate.next()
    }
}
