//! Preset adjustment profiles

use super::params::{AudioParameterSet, ParamId};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Named adjustment profile applied after the base mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Default,
    Calm,
    Storm,
    Sparse,
}

impl Preset {
    /// Every preset, in menu order
    pub const ALL: [Preset; 4] = [Preset::Default, Preset::Calm, Preset::Storm, Preset::Sparse];

    /// Lowercase name, as used in config files and commands
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Calm => "calm",
            Preset::Storm => "storm",
            Preset::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "calm" => Ok(Preset::Calm),
            "storm" => Ok(Preset::Storm),
            "sparse" => Ok(Preset::Sparse),
            other => bail!("unknown preset '{}' (expected default, calm, storm or sparse)", other),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// `value * scale + offset` on one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub param: ParamId,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

impl Adjustment {
    /// Multiply a parameter by `scale`
    pub const fn scale(param: ParamId, scale: f64) -> Self {
        Self { param, scale, offset: 0.0 }
    }

    /// Add `offset` to a parameter
    pub const fn shift(param: ParamId, offset: f64) -> Self {
        Self { param, scale: 1.0, offset }
    }

    /// Scale then offset a parameter
    pub const fn new(param: ParamId, scale: f64, offset: f64) -> Self {
        Self { param, scale, offset }
    }

    /// Apply in place; the result is clamped to the parameter's range
    fn apply(&self, params: &mut AudioParameterSet) {
        let value = params.get(self.param) * self.scale + self.offset;
        params.set(self.param, value);
    }
}

/// Preset → adjustment list
#[derive(Debug, Clone, PartialEq)]
pub struct PresetTable {
    entries: HashMap<Preset, Vec<Adjustment>>,
}

impl PresetTable {
    /// Shipped adjustment table
    pub fn builtin() -> &'static PresetTable {
        static BUILTIN: OnceLock<PresetTable> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut entries = HashMap::new();
            entries.insert(Preset::Default, Vec::new());
            entries.insert(
                Preset::Calm,
                vec![
                    Adjustment::scale(ParamId::NoiseAmount, 0.3),
                    Adjustment::scale(ParamId::BleepRate, 0.5),
                    Adjustment::scale(ParamId::MasterLevel, 0.7),
                ],
            );
            entries.insert(
                Preset::Storm,
                vec![
                    Adjustment::new(ParamId::NoiseAmount, 1.5, 0.2),
                    Adjustment::scale(ParamId::BleepRate, 1.3),
                    Adjustment::scale(ParamId::MasterLevel, 1.1),
                ],
            );
            entries.insert(
                Preset::Sparse,
                vec![
                    Adjustment::scale(ParamId::BleepRate, 0.25),
                    Adjustment::scale(ParamId::TremoloDepth, 0.5),
                    Adjustment::shift(ParamId::ReverbMix, 0.2),
                ],
            );
            PresetTable { entries }
        })
    }

    /// Built-in table with some presets replaced wholesale
    pub fn with_overrides(overrides: &HashMap<Preset, Vec<Adjustment>>) -> Self {
        let mut table = Self::builtin().clone();
        for (preset, adjustments) in overrides {
            table.entries.insert(*preset, adjustments.clone());
        }
        table
    }

    /// Adjustments for `preset`; empty when it has none
    pub fn adjustments(&self, preset: Preset) -> &[Adjustment] {
        self.entries.get(&preset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply a preset in place; each adjustment reclamps its parameter
    pub fn apply(&self, preset: Preset, params: &mut AudioParameterSet) {
        for adjustment in self.adjustments(preset) {
            adjustment.apply(params);
        }
        params.clamp_all();
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
