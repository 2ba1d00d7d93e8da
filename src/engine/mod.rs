//! Audio engine for Aether
//!
//! A fixed graph of three layers summed into a master gain. `SharedEngine`
//! lets the data side drive the graph while an output stream pulls samples.

mod player;
mod recorder;
mod sink;

pub use player::{default_device_name, list_output_devices, AudioError, OutputConfig, Player};
pub use recorder::Recorder;
pub use sink::{AudioSink, TraceSink};

use crate::mapping::AudioParameterSet;
use crate::sources::SourceKind;
use crate::synth::{DroneLayer, Layer, PulseLayer, Ramp, TextureLayer};
use std::sync::{Arc, Mutex, MutexGuard};

const MASTER_TAU: f64 = 2.0;

/// The synthesis graph
pub struct Engine {
    layers: Vec<Box<dyn Layer>>,
    master: Ramp,
    output_trim: f64,
    sample_rate: f64,
}

impl Engine {
    pub fn new(sample_rate: f64, output_trim: f64) -> Self {
        Self {
            layers: vec![
                Box::new(DroneLayer::new(sample_rate)),
                Box::new(TextureLayer::new(sample_rate)),
                Box::new(PulseLayer::new(sample_rate)),
            ],
            master: Ramp::new(0.35, MASTER_TAU, sample_rate),
            output_trim: output_trim.clamp(0.0, 1.0),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Retarget every layer and the master gain
    pub fn apply_params(&mut self, params: &AudioParameterSet) {
        for layer in &mut self.layers {
            layer.update_from_data(params);
        }
        self.master.set_target(params.master_level);
    }

    pub fn set_layer_enabled(&mut self, source: SourceKind, enabled: bool) {
        for layer in self.layers.iter_mut().filter(|l| l.source() == source) {
            layer.set_enabled(enabled);
        }
    }

    pub fn layer_enabled(&self, source: SourceKind) -> bool {
        self.layers.iter().any(|l| l.source() == source && l.is_enabled())
    }

    /// Generate the next sample (mix of all layers)
    pub fn process(&mut self) -> f64 {
        let mix: f64 = self.layers.iter_mut().map(|layer| layer.process()).sum();
        (mix * self.master.next() * self.output_trim).clamp(-1.0, 1.0)
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

/// Engine behind a mutex, usable as an [`AudioSink`]
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Handle for the output stream
    pub fn handle(&self) -> Arc<Mutex<Engine>> {
        Arc::clone(&self.inner)
    }

    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioSink for SharedEngine {
    fn set_layer_enabled(&self, source: SourceKind, enabled: bool) {
        self.lock().set_layer_enabled(source, enabled);
    }

    fn apply_params(&self, params: &AudioParameterSet) {
        self.lock().apply_params(params);
    }
}
