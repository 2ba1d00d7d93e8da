//! Configuration schema definitions

use crate::mapping::{Adjustment, Preset};
use crate::normalize::DomainRanges;
use crate::sources::{
    SourceKind, DEFAULT_KP_URL, DEFAULT_MARKETS_URL, DEFAULT_PROTON_FLUX_URL, DEFAULT_SOLAR_FLUX_URL,
    DEFAULT_WEATHER_URL,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for Aether
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AetherConfig {
    /// Seconds between update rounds (default: 120)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    /// Per-request timeout in seconds (None = no timeout)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Seed for the synthetic fallback walks (None = entropy)
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Preset active at startup
    #[serde(default)]
    pub preset: Preset,

    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Data sources
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Normalization domain ranges
    #[serde(default)]
    pub ranges: DomainRanges,

    /// Preset adjustment lists replacing the built-in ones
    #[serde(default)]
    pub presets: HashMap<Preset, Vec<Adjustment>>,
}

fn default_update_interval() -> u64 {
    120
}

impl Default for AetherConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval(),
            request_timeout_secs: None,
            random_seed: None,
            preset: Preset::Default,
            audio: AudioConfig::default(),
            sources: SourcesConfig::default(),
            ranges: DomainRanges::default(),
            presets: HashMap::new(),
        }
    }
}

impl AetherConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.update_interval_secs) {
            bail!("update_interval_secs must be between 1 and 3600");
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be positive when set");
        }

        // Validate audio settings
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }
        if !(0.0..=1.0).contains(&self.audio.output_trim) {
            bail!("Output trim must be between 0.0 and 1.0");
        }

        for kind in SourceKind::ALL {
            self.sources
                .settings(kind)
                .validate()
                .with_context(|| format!("invalid settings for source '{}'", kind))?;
        }

        let weather = &self.sources.weather;
        if !(-90.0..=90.0).contains(&weather.latitude) || !(-180.0..=180.0).contains(&weather.longitude) {
            bail!("Weather coordinates out of range");
        }
        if self.sources.markets.coin.trim().is_empty() {
            bail!("Markets coin id must not be empty");
        }

        self.ranges.validate().context("invalid domain ranges")?;

        for (preset, adjustments) in &self.presets {
            for adj in adjustments {
                if !adj.scale.is_finite() || !adj.offset.is_finite() {
                    bail!("Preset '{}' has a non-finite adjustment for {}", preset, adj.param);
                }
            }
        }

        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,

    /// Fixed gain after the master level, 0.0-1.0 (default: 0.8)
    #[serde(default = "default_output_trim")]
    pub output_trim: f64,
}

fn default_sample_rate() -> u32 {
    44100
}
fn default_buffer_size() -> usize {
    512
}
fn default_output_trim() -> f64 {
    0.8
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
            output_trim: default_output_trim(),
        }
    }
}

/// What a source feeds its smoother when a live fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Re-use the last live reading
    Cached,
    /// Load a static snapshot file
    Snapshot,
    /// Bounded random walk
    Synthetic,
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FallbackPolicy::Cached => "cached",
            FallbackPolicy::Snapshot => "snapshot",
            FallbackPolicy::Synthetic => "synthetic",
        })
    }
}

/// Bounds and step of the synthetic random walk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    pub low: f64,
    pub high: f64,
    #[serde(default = "default_walk_step")]
    pub step: f64,
}

fn default_walk_step() -> f64 {
    0.05
}

impl WalkConfig {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high, step: 0.05 }
    }
}

/// Source-independent pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub enabled: bool,
    pub smoothing: f64,
    pub initial: f64,
    pub fallback: FallbackPolicy,
    pub snapshot: Option<PathBuf>,
    pub walk: WalkConfig,
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            bail!("smoothing factor must be in (0, 1], got {}", self.smoothing);
        }
        if !(0.0..=1.0).contains(&self.initial) {
            bail!("initial value must be in [0, 1], got {}", self.initial);
        }
        let walk = &self.walk;
        if !(0.0 <= walk.low && walk.low < walk.high && walk.high <= 1.0) {
            bail!("walk bounds must satisfy 0 <= low < high <= 1");
        }
        if !(walk.step > 0.0 && walk.step <= 1.0) {
            bail!("walk step must be in (0, 1]");
        }
        if self.fallback == FallbackPolicy::Snapshot && self.snapshot.is_none() {
            bail!("fallback 'snapshot' requires a snapshot path");
        }
        Ok(())
    }
}

/// All three sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub space: SpaceSourceConfig,
    #[serde(default)]
    pub weather: WeatherSourceConfig,
    #[serde(default)]
    pub markets: MarketsSourceConfig,
}

impl SourcesConfig {
    pub fn settings(&self, kind: SourceKind) -> PipelineSettings {
        match kind {
            SourceKind::Space => self.space.settings(),
            SourceKind::Weather => self.weather.settings(),
            SourceKind::Markets => self.markets.settings(),
        }
    }

    pub fn enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Space => self.space.enabled,
            SourceKind::Weather => self.weather.enabled,
            SourceKind::Markets => self.markets.enabled,
        }
    }
}

/// NOAA SWPC space weather source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSourceConfig {
    pub enabled: bool,
    pub smoothing: f64,
    pub initial: f64,
    pub fallback: FallbackPolicy,
    pub snapshot: Option<PathBuf>,
    pub walk: WalkConfig,
    pub kp_url: String,
    /// None disables the F10.7 feed
    pub solar_flux_url: Option<String>,
    /// None disables the proton flux feed
    pub proton_flux_url: Option<String>,
}

impl Default for SpaceSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smoothing: 0.04,
            initial: 0.4,
            fallback: FallbackPolicy::Synthetic,
            snapshot: None,
            walk: WalkConfig::new(0.25, 0.75),
            kp_url: DEFAULT_KP_URL.to_string(),
            solar_flux_url: Some(DEFAULT_SOLAR_FLUX_URL.to_string()),
            proton_flux_url: Some(DEFAULT_PROTON_FLUX_URL.to_string()),
        }
    }
}

impl SpaceSourceConfig {
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            enabled: self.enabled,
            smoothing: self.smoothing,
            initial: self.initial,
            fallback: self.fallback,
            snapshot: self.snapshot.clone(),
            walk: self.walk,
        }
    }
}

/// Open-Meteo weather source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSourceConfig {
    pub enabled: bool,
    pub smoothing: f64,
    pub initial: f64,
    pub fallback: FallbackPolicy,
    pub snapshot: Option<PathBuf>,
    pub walk: WalkConfig,
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for WeatherSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smoothing: 0.06,
            initial: 0.5,
            fallback: FallbackPolicy::Synthetic,
            snapshot: None,
            walk: WalkConfig::new(0.3, 0.7),
            base_url: DEFAULT_WEATHER_URL.to_string(),
            latitude: 40.0,
            longitude: -100.0,
        }
    }
}

impl WeatherSourceConfig {
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            enabled: self.enabled,
            smoothing: self.smoothing,
            initial: self.initial,
            fallback: self.fallback,
            snapshot: self.snapshot.clone(),
            walk: self.walk,
        }
    }
}

/// CoinGecko markets source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketsSourceConfig {
    pub enabled: bool,
    pub smoothing: f64,
    pub initial: f64,
    pub fallback: FallbackPolicy,
    pub snapshot: Option<PathBuf>,
    pub walk: WalkConfig,
    pub base_url: String,
    /// CoinGecko coin id
    pub coin: String,
}

impl Default for MarketsSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smoothing: 0.08,
            initial: 0.3,
            fallback: FallbackPolicy::Cached,
            snapshot: None,
            walk: WalkConfig::new(0.0, 0.5),
            base_url: DEFAULT_MARKETS_URL.to_string(),
            coin: "bitcoin".to_string(),
        }
    }
}

impl MarketsSourceConfig {
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            enabled: self.enabled,
            smoothing: self.smoothing,
            initial: self.initial,
            fallback: self.fallback,
            snapshot: self.snapshot.clone(),
            walk: self.walk,
        }
    }
}
