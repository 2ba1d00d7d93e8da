//! Normalized channel sets, one per source

use crate::smoothing::{ema, ChannelSet};
use serde::Serialize;

/// Space weather channels, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceChannels {
    pub solar_activity: f64,
    pub geomagnetic_storm: f64,
    pub proton_flux: f64,
}

impl SpaceChannels {
    /// Quiet sun, no storm
    pub const NEUTRAL: SpaceChannels = SpaceChannels {
        solar_activity: 0.0,
        geomagnetic_storm: 0.0,
        proton_flux: 0.0,
    };
}

impl ChannelSet for SpaceChannels {
    const CHANNELS: usize = 3;

    fn blend(&self, sample: &Self, factor: f64) -> Self {
        Self {
            solar_activity: ema(self.solar_activity, sample.solar_activity, factor),
            geomagnetic_storm: ema(self.geomagnetic_storm, sample.geomagnetic_storm, factor),
            proton_flux: ema(self.proton_flux, sample.proton_flux, factor),
        }
    }

    fn uniform(level: f64) -> Self {
        Self {
            solar_activity: level,
            geomagnetic_storm: level,
            proton_flux: level,
        }
    }

    fn from_levels(mut next: impl FnMut() -> f64) -> Self {
        Self {
            solar_activity: next(),
            geomagnetic_storm: next(),
            proton_flux: next(),
        }
    }

    fn level(&self) -> f64 {
        self.geomagnetic_storm
    }
}

/// Weather channels, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherChannels {
    pub temperature: f64,
    pub wind: f64,
    pub pressure: f64,
    pub cloud_cover: f64,
    /// 0.5 means no anomaly
    pub temp_anomaly: f64,
    pub storminess: f64,
}

impl WeatherChannels {
    /// Mild, overcast-ish, calm
    pub const NEUTRAL: WeatherChannels = WeatherChannels {
        temperature: 0.5,
        wind: 0.15,
        pressure: 0.5,
        cloud_cover: 0.3,
        temp_anomaly: 0.5,
        storminess: 0.0,
    };

    /// Aggregate of temperature, wind and pressure
    pub fn intensity(&self) -> f64 {
        (self.temperature + self.wind + self.pressure) / 3.0
    }
}

impl ChannelSet for WeatherChannels {
    const CHANNELS: usize = 6;

    fn blend(&self, sample: &Self, factor: f64) -> Self {
        Self {
            temperature: ema(self.temperature, sample.temperature, factor),
            wind: ema(self.wind, sample.wind, factor),
            pressure: ema(self.pressure, sample.pressure, factor),
            cloud_cover: ema(self.cloud_cover, sample.cloud_cover, factor),
            temp_anomaly: ema(self.temp_anomaly, sample.temp_anomaly, factor),
            storminess: ema(self.storminess, sample.storminess, factor),
        }
    }

    fn uniform(level: f64) -> Self {
        Self {
            temperature: level,
            wind: level,
            pressure: level,
            cloud_cover: level,
            temp_anomaly: level,
            storminess: level,
        }
    }

    fn from_levels(mut next: impl FnMut() -> f64) -> Self {
        Self {
            temperature: next(),
            wind: next(),
            pressure: next(),
            cloud_cover: next(),
            temp_anomaly: next(),
            storminess: next(),
        }
    }

    fn level(&self) -> f64 {
        self.storminess
    }
}

/// Market channels
///
/// `volatility` and `volume_intensity` are in [0, 1]; `trend` is in [-1, 1].
/// `volatility` is `None` until two live prices have been seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketChannels {
    pub volatility: Option<f64>,
    pub trend: f64,
    pub volume_intensity: f64,
}

impl MarketChannels {
    /// Mildly active, flat market
    pub const NEUTRAL: MarketChannels = MarketChannels {
        volatility: Some(0.2),
        trend: 0.0,
        volume_intensity: 0.4,
    };

    /// Volatility with the neutral value standing in for a missing reading
    pub fn volatility_or_neutral(&self) -> f64 {
        self.volatility.unwrap_or(0.2)
    }
}

impl ChannelSet for MarketChannels {
    const CHANNELS: usize = 2;

    fn blend(&self, sample: &Self, factor: f64) -> Self {
        let volatility = match (self.volatility, sample.volatility) {
            (Some(prev), Some(next)) => Some(ema(prev, next, factor)),
            (None, Some(next)) => Some(next),
            (prev, None) => prev,
        };
        Self {
            volatility,
            trend: ema(self.trend, sample.trend, factor),
            volume_intensity: ema(self.volume_intensity, sample.volume_intensity, factor),
        }
    }

    fn uniform(level: f64) -> Self {
        Self {
            volatility: Some(level),
            trend: 0.0,
            volume_intensity: level,
        }
    }

    fn from_levels(mut next: impl FnMut() -> f64) -> Self {
        Self {
            volatility: Some(next()),
            trend: 0.0,
            volume_intensity: next(),
        }
    }

    fn level(&self) -> f64 {
        self.volatility.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_keeps_trend_centered() {
        let m = MarketChannels::uniform(0.7);
        assert_eq!(m.trend, 0.0);
        assert_eq!(m.volatility, Some(0.7));
        assert_eq!(m.volume_intensity, 0.7);
    }

    #[test]
    fn test_from_levels_fills_in_order() {
        let mut levels = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6].into_iter();
        let w = WeatherChannels::from_levels(|| levels.next().unwrap());
        assert_eq!((w.temperature, w.storminess), (0.1, 0.6));
        assert_eq!(levels.next(), None);

        let mut levels = [0.7, 0.8].into_iter();
        let m = MarketChannels::from_levels(|| levels.next().unwrap());
        assert_eq!(m.volatility, Some(0.7));
        assert_eq!(m.volume_intensity, 0.8);
        assert_eq!(m.trend, 0.0);
    }

    #[test]
    fn test_market_blend_skips_missing_volatility() {
        let state = MarketChannels::uniform(0.3);
        let sample = MarketChannels {
            volatility: None,
            trend: 1.0,
            volume_intensity: 0.3,
        };
        let next = state.blend(&sample, 0.5);
        assert_eq!(next.volatility, Some(0.3));
        assert_eq!(next.trend, 0.5);
    }

    #[test]
    fn test_weather_intensity() {
        let w = WeatherChannels {
            temperature: 0.6,
            wind: 0.3,
            pressure: 0.9,
            ..WeatherChannels::NEUTRAL
        };
        assert!((w.intensity() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_levels() {
        assert_eq!(SpaceChannels::uniform(0.4).level(), 0.4);
        assert_eq!(WeatherChannels::NEUTRAL.level(), 0.0);
        let quiet = MarketChannels {
            volatility: None,
            ..MarketChannels::NEUTRAL
        };
        assert_eq!(quiet.level(), 0.0);
    }
}
