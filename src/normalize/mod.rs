//! Normalization of raw source samples into semantic channels
//!
//! Normalization is total: missing or NaN fields fall back to documented
//! defaults, and every result is clamped into its channel range. Nothing in
//! here can fail.

mod channels;
mod ranges;

pub use channels::{MarketChannels, SpaceChannels, WeatherChannels};
pub use ranges::{DomainRange, DomainRanges};

use crate::smoothing::ChannelSet;
use crate::sources::{MarketsSample, SpaceSample, WeatherSample};

/// Clamp into [0, 1]; NaN maps to 0
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Clamp into [-1, 1]; NaN maps to 0
pub fn clamp_signed(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}

/// Linear rescale of `value` from `range` onto [0, 1], clamped
pub fn normalize_range(value: f64, range: DomainRange) -> f64 {
    let span = range.max() - range.min();
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    clamp01((value - range.min()) / span)
}

/// Log10 rescale of a strictly positive `value` from `range` onto [0, 1]
pub fn normalize_log_range(value: f64, range: DomainRange) -> f64 {
    if value <= 0.0 || range.min() <= 0.0 {
        return 0.0;
    }
    let lo = range.min().log10();
    let hi = range.max().log10();
    if (hi - lo).abs() < f64::EPSILON {
        return 0.0;
    }
    clamp01((value.log10() - lo) / (hi - lo))
}

/// Drop NaN readings so defaults apply
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Converts raw samples into normalized channel sets
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    ranges: DomainRanges,
}

impl Normalizer {
    /// Create a normalizer over the given domain table
    pub fn new(ranges: DomainRanges) -> Self {
        Self { ranges }
    }

    /// Domain table in use
    pub fn ranges(&self) -> &DomainRanges {
        &self.ranges
    }

    /// Normalize a space weather sample
    pub fn space(&self, raw: &SpaceSample) -> SpaceChannels {
        let r = &self.ranges;
        SpaceChannels {
            solar_activity: normalize_range(present(raw.solar_flux).unwrap_or(120.0), r.solar_flux),
            geomagnetic_storm: normalize_range(present(raw.kp_index).unwrap_or(3.0), r.kp_index),
            proton_flux: normalize_range(present(raw.proton_flux).unwrap_or(5.0), r.proton_flux),
        }
    }

    /// Normalize a weather sample
    pub fn weather(&self, raw: &WeatherSample) -> WeatherChannels {
        let r = &self.ranges;
        let temperature_c = present(raw.temperature_c);

        let temperature = normalize_range(temperature_c.unwrap_or(15.0), r.temperature_c);
        let wind = normalize_range(present(raw.wind_speed_ms).unwrap_or(3.0), r.wind_speed_ms);
        let pressure = normalize_range(present(raw.pressure_hpa).unwrap_or(1013.0), r.pressure_hpa);
        let cloud_cover =
            normalize_range(present(raw.cloud_cover_pct).unwrap_or(50.0), r.cloud_cover_pct);

        let anomaly = present(raw.temp_anomaly_c)
            .or_else(|| temperature_c.map(|t| t - r.baseline_temperature_c))
            .unwrap_or(0.0);
        let temp_anomaly = normalize_range(anomaly, r.temp_anomaly_c);

        // Without a storm census, low pressure and strong wind read as stormy
        let storminess = match present(raw.storm_count) {
            Some(count) => normalize_range(count, r.storm_count),
            None => clamp01(0.6 * wind + 0.4 * (1.0 - pressure)),
        };

        WeatherChannels {
            temperature,
            wind,
            pressure,
            cloud_cover,
            temp_anomaly,
            storminess,
        }
    }

    /// Normalize a market sample against the previous live sample
    ///
    /// Volatility is the relative price-to-price change and is only
    /// produced once a previous price exists.
    pub fn markets(&self, raw: &MarketsSample, previous: Option<&MarketsSample>) -> MarketChannels {
        let r = &self.ranges;

        let volatility = match (present(raw.price_usd), previous.and_then(|p| present(p.price_usd))) {
            (Some(price), Some(last)) if last > 0.0 && price.is_finite() => {
                Some(normalize_range((price - last).abs() / last, r.price_change))
            }
            _ => None,
        };

        let change = present(raw.change_24h_pct).unwrap_or(0.0);
        let trend = clamp_signed(normalize_range(change, r.change_24h_pct) * 2.0 - 1.0);

        let volume_intensity = match present(raw.volume_24h_usd) {
            Some(volume) => normalize_log_range(volume, r.volume_usd),
            None => 0.5,
        };

        MarketChannels {
            volatility,
            trend,
            volume_intensity,
        }
    }
}

/// Raw samples that know how to normalize themselves
pub trait Normalize: Clone + Send + Sync + 'static {
    /// Channel set produced by normalization
    type Channels: ChannelSet;

    /// Normalize against the previous live sample of the same source
    fn normalize(&self, normalizer: &Normalizer, previous: Option<&Self>) -> Self::Channels;
}

impl Normalize for SpaceSample {
    type Channels = SpaceChannels;

    fn normalize(&self, normalizer: &Normalizer, _previous: Option<&Self>) -> SpaceChannels {
        normalizer.space(self)
    }
}

impl Normalize for WeatherSample {
    type Channels = WeatherChannels;

    fn normalize(&self, normalizer: &Normalizer, _previous: Option<&Self>) -> WeatherChannels {
        normalizer.weather(self)
    }
}

impl Normalize for MarketsSample {
    type Channels = MarketChannels;

    fn normalize(&self, normalizer: &Normalizer, previous: Option<&Self>) -> MarketChannels {
        normalizer.markets(self, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_unit(x: f64) -> bool {
        (0.0..=1.0).contains(&x)
    }

    fn market(price: Option<f64>) -> MarketsSample {
        MarketsSample {
            price_usd: price,
            ..MarketsSample::default()
        }
    }

    #[test]
    fn test_clamp01_nan() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(7.0), 1.0);
        assert_eq!(clamp_signed(f64::NAN), 0.0);
        assert_eq!(clamp_signed(-2.0), -1.0);
    }

    #[test]
    fn test_normalize_range_clamps() {
        let kp = DomainRange(0.0, 9.0);
        assert_eq!(normalize_range(4.5, kp), 0.5);
        assert_eq!(normalize_range(-1.0, kp), 0.0);
        assert_eq!(normalize_range(12.0, kp), 1.0);
        assert_eq!(normalize_range(f64::INFINITY, kp), 1.0);
    }

    #[test]
    fn test_normalize_log_range() {
        let vol = DomainRange(1e8, 1e11);
        assert_eq!(normalize_log_range(1e8, vol), 0.0);
        assert!((normalize_log_range(1e9, vol) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(normalize_log_range(1e12, vol), 1.0);
        assert_eq!(normalize_log_range(0.0, vol), 0.0);
        assert_eq!(normalize_log_range(-5.0, vol), 0.0);
    }

    #[test]
    fn test_space_defaults_for_missing_fields() {
        let n = Normalizer::default();
        let c = n.space(&SpaceSample::default());
        assert!((c.solar_activity - 0.4).abs() < 1e-12);
        assert!((c.geomagnetic_storm - 3.0 / 9.0).abs() < 1e-12);
        assert_eq!(c.proton_flux, 0.5);
    }

    #[test]
    fn test_space_nan_uses_default() {
        let n = Normalizer::default();
        let c = n.space(&SpaceSample {
            kp_index: Some(f64::NAN),
            solar_flux: Some(f64::NAN),
            proton_flux: Some(f64::NAN),
        });
        assert!((c.geomagnetic_storm - 3.0 / 9.0).abs() < 1e-12);
        assert!(in_unit(c.solar_activity) && in_unit(c.proton_flux));
    }

    #[test]
    fn test_space_extremes_clamp() {
        let n = Normalizer::default();
        let c = n.space(&SpaceSample {
            kp_index: Some(9.7),
            solar_flux: Some(-10.0),
            proton_flux: Some(1e6),
        });
        assert_eq!(c.geomagnetic_storm, 1.0);
        assert_eq!(c.solar_activity, 0.0);
        assert_eq!(c.proton_flux, 1.0);
    }

    #[test]
    fn test_weather_live_fields() {
        let n = Normalizer::default();
        let c = n.weather(&WeatherSample {
            temperature_c: Some(10.0),
            wind_speed_ms: Some(10.0),
            pressure_hpa: Some(1000.0),
            cloud_cover_pct: Some(80.0),
            storm_count: None,
            temp_anomaly_c: None,
        });
        assert_eq!(c.temperature, 0.5);
        assert_eq!(c.wind, 0.5);
        assert_eq!(c.pressure, 0.5);
        assert!((c.cloud_cover - 0.8).abs() < 1e-12);
        // 10°C against a 15°C baseline is a -5°C anomaly
        assert_eq!(c.temp_anomaly, 0.0);
        // Derived storminess: 0.6 * 0.5 + 0.4 * 0.5
        assert!((c.storminess - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_weather_storm_count_wins() {
        let n = Normalizer::default();
        let c = n.weather(&WeatherSample {
            storm_count: Some(15.0),
            temp_anomaly_c: Some(2.5),
            ..WeatherSample::default()
        });
        assert_eq!(c.storminess, 0.5);
        assert_eq!(c.temp_anomaly, 0.75);
    }

    #[test]
    fn test_weather_empty_sample_in_range() {
        let n = Normalizer::default();
        let c = n.weather(&WeatherSample::default());
        for v in [c.temperature, c.wind, c.pressure, c.cloud_cover, c.temp_anomaly, c.storminess] {
            assert!(in_unit(v), "{} out of range", v);
        }
        assert_eq!(c.temp_anomaly, 0.5);
    }

    #[test]
    fn test_markets_first_read_has_no_volatility() {
        let n = Normalizer::default();
        let c = n.markets(&market(Some(100.0)), None);
        assert_eq!(c.volatility, None);
    }

    #[test]
    fn test_markets_volatility_proportional_to_change() {
        let n = Normalizer::default();
        let prev = market(Some(100.0));

        let c = n.markets(&market(Some(105.0)), Some(&prev));
        assert!((c.volatility.unwrap() - 0.5).abs() < 1e-12);

        let c = n.markets(&market(Some(98.0)), Some(&prev));
        assert!((c.volatility.unwrap() - 0.2).abs() < 1e-12);

        // Beyond the 10% domain the channel saturates
        let c = n.markets(&market(Some(130.0)), Some(&prev));
        assert_eq!(c.volatility, Some(1.0));
    }

    #[test]
    fn test_markets_missing_previous_price() {
        let n = Normalizer::default();
        let c = n.markets(&market(Some(100.0)), Some(&market(None)));
        assert_eq!(c.volatility, None);
        let c = n.markets(&market(None), Some(&market(Some(100.0))));
        assert_eq!(c.volatility, None);
    }

    #[test]
    fn test_markets_trend_and_volume() {
        let n = Normalizer::default();
        let c = n.markets(
            &MarketsSample {
                price_usd: Some(60_000.0),
                change_24h_pct: Some(7.5),
                volume_24h_usd: Some(1e10),
            },
            None,
        );
        assert!((c.trend - 0.5).abs() < 1e-12);
        assert!((c.volume_intensity - 2.0 / 3.0).abs() < 1e-12);

        let c = n.markets(
            &MarketsSample {
                change_24h_pct: Some(-40.0),
                ..MarketsSample::default()
            },
            None,
        );
        assert_eq!(c.trend, -1.0);
        assert_eq!(c.volume_intensity, 0.5);
    }

    #[test]
    fn test_all_channels_in_range_for_hostile_input() {
        let n = Normalizer::default();
        let hostile = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1e9, 0.0, 1e9];
        for &v in &hostile {
            let s = n.space(&SpaceSample {
                kp_index: Some(v),
                solar_flux: Some(v),
                proton_flux: Some(v),
            });
            assert!(in_unit(s.solar_activity) && in_unit(s.geomagnetic_storm) && in_unit(s.proton_flux));

            let w = n.weather(&WeatherSample {
                temperature_c: Some(v),
                wind_speed_ms: Some(v),
                pressure_hpa: Some(v),
                cloud_cover_pct: Some(v),
                storm_count: Some(v),
                temp_anomaly_c: Some(v),
            });
            for c in [w.temperature, w.wind, w.pressure, w.cloud_cover, w.temp_anomaly, w.storminess] {
                assert!(in_unit(c));
            }

            for &p in &hostile {
                let m = n.markets(
                    &MarketsSample {
                        price_usd: Some(v),
                        change_24h_pct: Some(v),
                        volume_24h_usd: Some(v),
                    },
                    Some(&market(Some(p))),
                );
                assert!(in_unit(m.volatility.unwrap_or(0.0)));
                assert!((-1.0..=1.0).contains(&m.trend));
                assert!(in_unit(m.volume_intensity));
            }
        }
    }
}
