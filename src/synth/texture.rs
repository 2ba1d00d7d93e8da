//! Weather layer: band-passed noise with a feedback wash

use super::filter::Biquad;
use super::layer::{Layer, TOGGLE_TAU};
use super::oscillator::{Oscillator, Waveform};
use super::ramp::Ramp;
use crate::mapping::{AudioParameterSet, ExponentialMapper, LinearMapper, Mapper, MappingPipeline};
use crate::sources::SourceKind;

const WASH_DELAY_SECS: f64 = 0.137;
const WASH_FEEDBACK: f64 = 0.7;

/// Noise through a 200-800 Hz band-pass, fed into a feedback delay
pub struct TextureLayer {
    noise: Oscillator,
    band: Biquad,
    wash: Vec<f64>,
    wash_pos: usize,
    center: Ramp,
    level: Ramp,
    mix: Ramp,
    gate: Ramp,
    enabled: bool,
    center_map: MappingPipeline,
    level_map: LinearMapper,
}

impl TextureLayer {
    pub fn new(sample_rate: f64) -> Self {
        let center_map = MappingPipeline::new("texture_center")
            .then(LinearMapper::new("floor", 0.15, 1.0))
            .then(ExponentialMapper::decade("hz", 200.0, 800.0));
        let start_hz = center_map.apply(0.5);
        let wash_len = ((WASH_DELAY_SECS * sample_rate) as usize).max(1);

        Self {
            noise: Oscillator::seeded(Waveform::Noise, 0.0, sample_rate, 0x7e47),
            band: Biquad::bandpass(sample_rate, start_hz, 0.8),
            wash: vec![0.0; wash_len],
            wash_pos: 0,
            center: Ramp::new(start_hz, 2.0, sample_rate),
            level: Ramp::new(0.18, 3.0, sample_rate),
            mix: Ramp::new(0.2, 3.0, sample_rate),
            gate: Ramp::new(1.0, TOGGLE_TAU, sample_rate),
            enabled: true,
            center_map,
            level_map: LinearMapper::new("texture_gain", 0.1, 0.22),
        }
    }

    fn wash(&mut self, input: f64, mix: f64) -> f64 {
        let delayed = self.wash[self.wash_pos];
        self.wash[self.wash_pos] = input + delayed * WASH_FEEDBACK * mix;
        self.wash_pos = (self.wash_pos + 1) % self.wash.len();
        input * (1.0 - 0.5 * mix) + delayed * mix
    }
}

impl Layer for TextureLayer {
    fn source(&self) -> SourceKind {
        SourceKind::Weather
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.gate.set_target(if enabled { 1.0 } else { 0.0 });
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn update_from_data(&mut self, params: &AudioParameterSet) {
        self.center.set_target(self.center_map.apply(params.texture_tone));
        self.level.set_target(self.level_map.map(params.texture_level));
        self.mix.set_target(params.reverb_mix);
    }

    fn process(&mut self) -> f64 {
        self.band.set_frequency(self.center.next());
        let dry = self.band.process(self.noise.generate() * 0.5);
        let mix = self.mix.next();
        self.wash(dry, mix) * self.level.next() * self.gate.next()
    }
}
