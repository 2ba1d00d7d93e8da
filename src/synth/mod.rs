//! Synthesis graph building blocks
//!
//! Three fixed layers, one per data source, built from oscillators,
//! biquads and parameter ramps.

mod drone;
mod filter;
mod layer;
mod oscillator;
mod pulse;
mod ramp;
mod texture;

pub use drone::DroneLayer;
pub use filter::{Biquad, FilterType};
pub use layer::{Layer, TOGGLE_TAU};
pub use oscillator::{Oscillator, Waveform};
pub use pulse::PulseLayer;
pub use ramp::Ramp;
pub use texture::TextureLayer;
