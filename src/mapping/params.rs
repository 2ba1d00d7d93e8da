//! Audio parameter set and per-parameter valid ranges

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one audio parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    DronePitch,
    DroneBrightness,
    NoiseAmount,
    ReverbMix,
    TextureTone,
    TextureLevel,
    BleepRate,
    BleepPitch,
    BleepLevel,
    TremoloRate,
    TremoloDepth,
    MasterLevel,
}

impl ParamId {
    pub const ALL: [ParamId; 12] = [
        ParamId::DronePitch,
        ParamId::DroneBrightness,
        ParamId::NoiseAmount,
        ParamId::ReverbMix,
        ParamId::TextureTone,
        ParamId::TextureLevel,
        ParamId::BleepRate,
        ParamId::BleepPitch,
        ParamId::BleepLevel,
        ParamId::TremoloRate,
        ParamId::TremoloDepth,
        ParamId::MasterLevel,
    ];

    /// Inclusive valid range
    pub fn range(&self) -> (f64, f64) {
        match self {
            ParamId::BleepRate => (0.05, 4.0),
            ParamId::TremoloRate => (0.3, 3.0),
            ParamId::TremoloDepth => (0.0, 0.5),
            _ => (0.0, 1.0),
        }
    }

    /// Clamp a value into this parameter's range; NaN lands on the minimum
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = self.range();
        if value.is_nan() {
            lo
        } else {
            value.clamp(lo, hi)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamId::DronePitch => "drone_pitch",
            ParamId::DroneBrightness => "drone_brightness",
            ParamId::NoiseAmount => "noise_amount",
            ParamId::ReverbMix => "reverb_mix",
            ParamId::TextureTone => "texture_tone",
            ParamId::TextureLevel => "texture_level",
            ParamId::BleepRate => "bleep_rate",
            ParamId::BleepPitch => "bleep_pitch",
            ParamId::BleepLevel => "bleep_level",
            ParamId::TremoloRate => "tremolo_rate",
            ParamId::TremoloDepth => "tremolo_depth",
            ParamId::MasterLevel => "master_level",
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Full set of audio control parameters, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioParameterSet {
    /// Drone pitch, 0..1 (40-220 Hz in the synth)
    pub drone_pitch: f64,
    /// Drone filter opening, 0..1
    pub drone_brightness: f64,
    /// Rumble noise amount, 0..1
    pub noise_amount: f64,
    /// Wash (reverb) wet mix, 0..1
    pub reverb_mix: f64,
    /// Weather texture band position, 0..1 (200-800 Hz)
    pub texture_tone: f64,
    /// Weather texture level, 0..1
    pub texture_level: f64,
    /// Bleep events per second, 0.05..4
    pub bleep_rate: f64,
    /// Bleep pitch, 0..1 (300-2000 Hz)
    pub bleep_pitch: f64,
    /// Bleep level, 0..1
    pub bleep_level: f64,
    /// Tremolo rate in Hz, 0.3..3
    pub tremolo_rate: f64,
    /// Tremolo depth, 0..0.5
    pub tremolo_depth: f64,
    /// Master output level, 0..1
    pub master_level: f64,
}

impl AudioParameterSet {
    /// Read one parameter
    pub fn get(&self, id: ParamId) -> f64 {
        match id {
            ParamId::DronePitch => self.drone_pitch,
            ParamId::DroneBrightness => self.drone_brightness,
            ParamId::NoiseAmount => self.noise_amount,
            ParamId::ReverbMix => self.reverb_mix,
            ParamId::TextureTone => self.texture_tone,
            ParamId::TextureLevel => self.texture_level,
            ParamId::BleepRate => self.bleep_rate,
            ParamId::BleepPitch => self.bleep_pitch,
            ParamId::BleepLevel => self.bleep_level,
            ParamId::TremoloRate => self.tremolo_rate,
            ParamId::TremoloDepth => self.tremolo_depth,
            ParamId::MasterLevel => self.master_level,
        }
    }

    /// Write one parameter, clamped into its range
    pub fn set(&mut self, id: ParamId, value: f64) {
        let value = id.clamp(value);
        let slot = match id {
            ParamId::DronePitch => &mut self.drone_pitch,
            ParamId::DroneBrightness => &mut self.drone_brightness,
            ParamId::NoiseAmount => &mut self.noise_amount,
            ParamId::ReverbMix => &mut self.reverb_mix,
            ParamId::TextureTone => &mut self.texture_tone,
            ParamId::TextureLevel => &mut self.texture_level,
            ParamId::BleepRate => &mut self.bleep_rate,
            ParamId::BleepPitch => &mut self.bleep_pitch,
            ParamId::BleepLevel => &mut self.bleep_level,
            ParamId::TremoloRate => &mut self.tremolo_rate,
            ParamId::TremoloDepth => &mut self.tremolo_depth,
            ParamId::MasterLevel => &mut self.master_level,
        };
        *slot = value;
    }

    /// Reclamp every parameter into its range
    pub fn clamp_all(&mut self) {
        for id in ParamId::ALL {
            self.set(id, self.get(id));
        }
    }

    /// Check that every parameter sits within its range
    pub fn is_in_range(&self) -> bool {
        ParamId::ALL.iter().all(|id| {
            let (lo, hi) = id.range();
            (lo..=hi).contains(&self.get(*id))
        })
    }

    /// Iterate `(id, value)` pairs in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, f64)> + '_ {
        ParamId::ALL.iter().map(move |id| (*id, self.get(*id)))
    }
}
