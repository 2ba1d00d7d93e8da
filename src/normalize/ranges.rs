//! Domain ranges for raw source fields

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Inclusive raw-value domain `[min, max]` mapped onto the unit interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainRange(pub f64, pub f64);

impl DomainRange {
    /// Lower bound of the domain
    pub fn min(&self) -> f64 {
        self.0
    }

    /// Upper bound of the domain
    pub fn max(&self) -> f64 {
        self.1
    }

    fn check(&self, name: &str) -> Result<()> {
        if !self.0.is_finite() || !self.1.is_finite() {
            bail!("range '{}' must be finite", name);
        }
        if self.0 >= self.1 {
            bail!("range '{}' must have min < max (got {} .. {})", name, self.0, self.1);
        }
        Ok(())
    }
}

/// Per-channel domain table used by the normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRanges {
    /// Planetary K-index
    pub kp_index: DomainRange,
    /// F10.7 solar radio flux (sfu)
    pub solar_flux: DomainRange,
    /// GOES integral proton flux (pfu)
    pub proton_flux: DomainRange,
    /// Air temperature (°C)
    pub temperature_c: DomainRange,
    /// Wind speed (m/s)
    pub wind_speed_ms: DomainRange,
    /// Mean sea level pressure (hPa)
    pub pressure_hpa: DomainRange,
    /// Cloud cover (%)
    pub cloud_cover_pct: DomainRange,
    /// Concurrent storm systems
    pub storm_count: DomainRange,
    /// Temperature anomaly against the baseline (°C)
    pub temp_anomaly_c: DomainRange,
    /// Baseline temperature used to derive an anomaly when none is reported
    pub baseline_temperature_c: f64,
    /// Relative price-to-price change (0.1 = 10%)
    pub price_change: DomainRange,
    /// 24h change in percent, mapped onto the signed trend channel
    pub change_24h_pct: DomainRange,
    /// 24h traded volume in USD, scaled on log10
    pub volume_usd: DomainRange,
}

impl Default for DomainRanges {
    fn default() -> Self {
        Self {
            kp_index: DomainRange(0.0, 9.0),
            solar_flux: DomainRange(0.0, 300.0),
            proton_flux: DomainRange(0.0, 10.0),
            temperature_c: DomainRange(-20.0, 40.0),
            wind_speed_ms: DomainRange(0.0, 20.0),
            pressure_hpa: DomainRange(960.0, 1040.0),
            cloud_cover_pct: DomainRange(0.0, 100.0),
            storm_count: DomainRange(0.0, 30.0),
            temp_anomaly_c: DomainRange(-5.0, 5.0),
            baseline_temperature_c: 15.0,
            price_change: DomainRange(0.0, 0.1),
            change_24h_pct: DomainRange(-15.0, 15.0),
            volume_usd: DomainRange(1e8, 1e11),
        }
    }
}

impl DomainRanges {
    /// Validate every range
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("kp_index", self.kp_index),
            ("solar_flux", self.solar_flux),
            ("proton_flux", self.proton_flux),
            ("temperature_c", self.temperature_c),
            ("wind_speed_ms", self.wind_speed_ms),
            ("pressure_hpa", self.pressure_hpa),
            ("cloud_cover_pct", self.cloud_cover_pct),
            ("storm_count", self.storm_count),
            ("temp_anomaly_c", self.temp_anomaly_c),
            ("price_change", self.price_change),
            ("change_24h_pct", self.change_24h_pct),
            ("volume_usd", self.volume_usd),
        ];
        for (name, range) in named {
            range.check(name)?;
        }
        if self.volume_usd.min() <= 0.0 {
            bail!("range 'volume_usd' is log-scaled and must be positive");
        }
        if !self.baseline_temperature_c.is_finite() {
            bail!("baseline_temperature_c must be finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges_are_valid() {
        assert!(DomainRanges::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let ranges = DomainRanges {
            kp_index: DomainRange(9.0, 0.0),
            ..DomainRanges::default()
        };
        assert!(ranges.validate().is_err());
    }

    #[test]
    fn test_volume_range_must_be_positive() {
        let ranges = DomainRanges {
            volume_usd: DomainRange(0.0, 1e11),
            ..DomainRanges::default()
        };
        assert!(ranges.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "kp_index: [0, 8]\nwind_speed_ms: [0, 30]";
        let ranges: DomainRanges = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ranges.kp_index, DomainRange(0.0, 8.0));
        assert_eq!(ranges.wind_speed_ms, DomainRange(0.0, 30.0));
        assert_eq!(ranges.pressure_hpa, DomainRange(960.0, 1040.0));
    }
}
