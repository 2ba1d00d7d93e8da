//! Layer trait for the per-source voices of the synthesis graph

use crate::mapping::AudioParameterSet;
use crate::sources::SourceKind;

/// Time constant for enable/disable fades (seconds)
pub const TOGGLE_TAU: f64 = 0.08;

/// One audible layer, driven by a single data source
pub trait Layer: Send {
    /// Source this layer sonifies
    fn source(&self) -> SourceKind;

    /// Fade the layer in or out
    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Retarget the layer's ramps from a new parameter set
    fn update_from_data(&mut self, params: &AudioParameterSet);

    /// Generate the next mono sample
    fn process(&mut self) -> f64;
}
