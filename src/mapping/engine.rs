//! Mapping engine: smoothed channels + preset → audio parameters

use super::curves::{ease_in_out_quad, lerp, remap01, smoothstep};
use super::params::{AudioParameterSet, ParamId};
use super::preset::{Preset, PresetTable};
use crate::normalize::{clamp01, MarketChannels, SpaceChannels, WeatherChannels};

/// Stateless mapper from channel state to an [`AudioParameterSet`]
///
/// Absent sources are replaced by their neutral channel sets, so the result
/// is always complete and in range.
#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    presets: PresetTable,
}

impl MappingEngine {
    pub fn new(presets: PresetTable) -> Self {
        Self { presets }
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Base pass, then the preset pass, then the market trend nudge
    pub fn compute(
        &self,
        space: Option<&SpaceChannels>,
        weather: Option<&WeatherChannels>,
        markets: Option<&MarketChannels>,
        preset: Preset,
    ) -> AudioParameterSet {
        map_channels(&self.presets, space, weather, markets, preset)
    }
}

/// Compute parameters with the built-in preset table
pub fn compute_audio_params(
    space: Option<&SpaceChannels>,
    weather: Option<&WeatherChannels>,
    markets: Option<&MarketChannels>,
    preset: Preset,
) -> AudioParameterSet {
    map_channels(PresetTable::builtin(), space, weather, markets, preset)
}

fn map_channels(
    presets: &PresetTable,
    space: Option<&SpaceChannels>,
    weather: Option<&WeatherChannels>,
    markets: Option<&MarketChannels>,
    preset: Preset,
) -> AudioParameterSet {
    let s = space.copied().unwrap_or(SpaceChannels::NEUTRAL);
    let w = weather.copied().unwrap_or(WeatherChannels::NEUTRAL);
    let m = markets.copied().unwrap_or(MarketChannels::NEUTRAL);

    let mut params = base_params(&s, &w, &m);
    presets.apply(preset, &mut params);

    // Trend nudge goes after the preset pass; presets never scale it
    let shift = (remap01(m.trend, -1.0, 1.0) - 0.5) * 0.1;
    params.set(ParamId::DronePitch, params.drone_pitch + shift);
    params.set(ParamId::BleepPitch, params.bleep_pitch + 0.4 * shift);
    params
}

fn base_params(s: &SpaceChannels, w: &WeatherChannels, m: &MarketChannels) -> AudioParameterSet {
    let volatility = clamp01(m.volatility_or_neutral());
    let drone_pitch = clamp01(0.4 + 0.3 * s.solar_activity);

    let mut params = AudioParameterSet {
        drone_pitch,
        drone_brightness: 1.2 * s.proton_flux,
        noise_amount: 1.4 * s.geomagnetic_storm,
        reverb_mix: 0.7 * w.cloud_cover + 0.3 * s.geomagnetic_storm,
        texture_tone: w.intensity(),
        texture_level: 0.3 + 0.4 * w.storminess + 0.2 * w.temp_anomaly,
        bleep_rate: 0.1 + 3.0 * ease_in_out_quad(volatility),
        bleep_pitch: 0.4 + 0.4 * drone_pitch,
        bleep_level: 0.3 + 0.5 * m.volume_intensity,
        tremolo_rate: lerp(0.3, 3.0, volatility),
        tremolo_depth: lerp(0.02, 0.16, smoothstep(volatility)),
        master_level: 0.35 + 0.15 * w.storminess,
    };
    params.clamp_all();
    params
}
