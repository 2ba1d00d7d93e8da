//! Aether - Ambient sonification of live data
//!
//! Turns space weather, terrestrial weather and market volatility into a
//! slowly evolving soundscape. Space becomes the drone, weather becomes
//! texture, markets become bleeps.

pub mod config;
pub mod sources;
pub mod normalize;
pub mod smoothing;
pub mod mapping;
pub mod controller;
pub mod scheduler;
pub mod session;
pub mod synth;
pub mod engine;

pub use config::AetherConfig;
pub use engine::Engine;
pub use session::Session;
