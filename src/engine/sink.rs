//! Audio sink seam between the data side and the synthesis graph

use crate::mapping::AudioParameterSet;
use crate::sources::SourceKind;
use tracing::info;

/// Receiver of per-tick parameter sets and layer toggles
pub trait AudioSink: Send + Sync {
    fn set_layer_enabled(&self, source: SourceKind, enabled: bool);

    fn apply_params(&self, params: &AudioParameterSet);
}

/// Sink that only logs; used when audio is off
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl AudioSink for TraceSink {
    fn set_layer_enabled(&self, source: SourceKind, enabled: bool) {
        info!(source = %source, enabled, "layer toggled");
    }

    fn apply_params(&self, params: &AudioParameterSet) {
        info!(
            drone_pitch = format_args!("{:.3}", params.drone_pitch),
            noise = format_args!("{:.3}", params.noise_amount),
            texture = format_args!("{:.3}", params.texture_level),
            bleep_rate = format_args!("{:.2}", params.bleep_rate),
            master = format_args!("{:.3}", params.master_level),
            "parameters"
        );
    }
}
