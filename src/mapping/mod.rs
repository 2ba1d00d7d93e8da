//! Mapping from smoothed data channels to audio parameters
//!
//! `engine` produces the [`AudioParameterSet`] for each tick; the `Mapper`
//! family converts individual parameters into synth units.

mod curves;
mod engine;
mod exponential;
mod linear;
mod mapper;
mod params;
mod preset;

pub use curves::{ease_in_out_quad, lerp, remap01, smoothstep};
pub use engine::{compute_audio_params, MappingEngine};
pub use exponential::ExponentialMapper;
pub use linear::LinearMapper;
pub use mapper::{Mapper, MappingPipeline};
pub use params::{AudioParameterSet, ParamId};
pub use preset::{Adjustment, Preset, PresetTable};
