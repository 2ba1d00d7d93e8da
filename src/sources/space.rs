//! Space weather source
//!
//! Pulls the planetary K-index from NOAA SWPC, plus optional F10.7 solar flux
//! and GOES integral proton flux feeds.

use super::source::value_as_f64;
use super::{Fetch, FetchError, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_KP_URL: &str = "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json";
pub const DEFAULT_SOLAR_FLUX_URL: &str = "https://services.swpc.noaa.gov/json/f107_cm_flux.json";
pub const DEFAULT_PROTON_FLUX_URL: &str =
    "https://services.swpc.noaa.gov/json/goes/primary/integral-protons-1-day.json";

/// Raw space weather reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSample {
    /// Planetary K-index, 0-9
    pub kp_index: Option<f64>,
    /// F10.7 solar radio flux (sfu)
    pub solar_flux: Option<f64>,
    /// Integral proton flux >= 10 MeV (pfu)
    pub proton_flux: Option<f64>,
}

/// Live NOAA SWPC fetcher
pub struct SpaceFetcher {
    client: reqwest::Client,
    kp_url: String,
    solar_flux_url: Option<String>,
    proton_flux_url: Option<String>,
}

impl SpaceFetcher {
    /// Create a fetcher; only the Kp feed is required
    pub fn new(
        client: reqwest::Client,
        kp_url: impl Into<String>,
        solar_flux_url: Option<String>,
        proton_flux_url: Option<String>,
    ) -> Self {
        Self {
            client,
            kp_url: kp_url.into(),
            solar_flux_url,
            proton_flux_url,
        }
    }

    async fn get_json(&self, endpoint: &'static str, url: &str) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: response.status(),
            });
        }
        Ok(response.json::<Value>().await?)
    }

    /// Optional feeds degrade to `None` instead of failing the sample
    async fn optional_feed(
        &self,
        endpoint: &'static str,
        url: Option<&str>,
        parse: fn(&Value) -> Option<f64>,
    ) -> Option<f64> {
        let url = url?;
        match self.get_json(endpoint, url).await {
            Ok(json) => parse(&json),
            Err(e) => {
                debug!(endpoint, error = %e, "optional space feed unavailable");
                None
            }
        }
    }
}

/// Latest Kp from the SWPC feed
///
/// Accepts both the legacy array-of-arrays layout (header row first, Kp in
/// column 1) and the newer array-of-objects layout.
pub(crate) fn parse_kp_feed(json: &Value) -> Result<f64, FetchError> {
    let rows = json
        .as_array()
        .ok_or_else(|| FetchError::Malformed("Kp feed is not an array".to_string()))?;

    let kp = rows.iter().rev().find_map(|row| match row {
        Value::Array(cols) => cols.get(1).and_then(value_as_f64),
        Value::Object(map) => map
            .get("Kp")
            .or_else(|| map.get("kp_index"))
            .or_else(|| map.get("kp"))
            .and_then(value_as_f64),
        _ => None,
    });

    kp.ok_or_else(|| FetchError::Malformed("no Kp value in feed".to_string()))
}

/// Latest F10.7 flux from the SWPC JSON feed
pub(crate) fn parse_solar_flux(json: &Value) -> Option<f64> {
    json.as_array()?
        .iter()
        .rev()
        .find_map(|row| row.get("flux").and_then(value_as_f64))
}

/// Latest >=10 MeV integral proton flux from the GOES feed
pub(crate) fn parse_proton_flux(json: &Value) -> Option<f64> {
    json.as_array()?
        .iter()
        .rev()
        .filter(|row| row.get("energy").and_then(Value::as_str) == Some(">=10 MeV"))
        .find_map(|row| row.get("flux").and_then(value_as_f64))
}

#[async_trait]
impl Fetch for SpaceFetcher {
    type Sample = SpaceSample;

    fn kind(&self) -> SourceKind {
        SourceKind::Space
    }

    async fn fetch(&self) -> Result<SpaceSample, FetchError> {
        let (kp, solar_flux, proton_flux) = tokio::join!(
            self.get_json("noaa kp index", &self.kp_url),
            self.optional_feed("noaa f10.7 flux", self.solar_flux_url.as_deref(), parse_solar_flux),
            self.optional_feed("goes proton flux", self.proton_flux_url.as_deref(), parse_proton_flux),
        );

        Ok(SpaceSample {
            kp_index: Some(parse_kp_feed(&kp?)?),
            solar_flux,
            proton_flux,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_legacy_kp_feed() {
        let feed = json!([
            ["time_tag", "Kp", "a_running", "station_count"],
            ["2024-05-10 12:00:00.000", "6.67", "111", "8"],
            ["2024-05-10 15:00:00.000", "8.33", "207", "8"]
        ]);
        assert_eq!(parse_kp_feed(&feed).unwrap(), 8.33);
    }

    #[test]
    fn test_parse_object_kp_feed() {
        let feed = json!([
            {"time_tag": "2025-01-01T00:00:00", "Kp": 2.0, "a_running": 7, "station_count": 8},
            {"time_tag": "2025-01-01T03:00:00", "Kp": 3.67, "a_running": 22, "station_count": 8}
        ]);
        assert_eq!(parse_kp_feed(&feed).unwrap(), 3.67);
    }

    #[test]
    fn test_parse_kp_feed_skips_unparseable_tail() {
        let feed = json!([
            ["time_tag", "Kp"],
            ["2024-05-10 12:00:00.000", "4.00"],
            ["2024-05-10 15:00:00.000", null]
        ]);
        assert_eq!(parse_kp_feed(&feed).unwrap(), 4.0);
    }

    #[test]
    fn test_parse_kp_feed_rejects_garbage() {
        assert!(parse_kp_feed(&json!({"kp": 3})).is_err());
        assert!(parse_kp_feed(&json!([["time_tag", "Kp"]])).is_err());
    }

    #[test]
    fn test_parse_solar_flux() {
        let feed = json!([
            {"time_tag": "2025-01-01T17:00:00", "frequency": 2800, "flux": 151.0},
            {"time_tag": "2025-01-02T17:00:00", "frequency": 2800, "flux": 163.2}
        ]);
        assert_eq!(parse_solar_flux(&feed), Some(163.2));
        assert_eq!(parse_solar_flux(&json!([])), None);
    }

    #[test]
    fn test_parse_proton_flux_filters_energy() {
        let feed = json!([
            {"time_tag": "t0", "satellite": 18, "flux": 0.41, "energy": ">=10 MeV"},
            {"time_tag": "t1", "satellite": 18, "flux": 12.5, "energy": ">=1 MeV"},
            {"time_tag": "t1", "satellite": 18, "flux": 0.52, "energy": ">=10 MeV"},
            {"time_tag": "t1", "satellite": 18, "flux": 0.01, "energy": ">=100 MeV"}
        ]);
        assert_eq!(parse_proton_flux(&feed), Some(0.52));
    }

    #[test]
    fn test_space_sample_snapshot_format() {
        let sample: SpaceSample = serde_json::from_str(r#"{"kp_index": 5, "solar_flux": 180.5}"#).unwrap();
        assert_eq!(sample.kp_index, Some(5.0));
        assert_eq!(sample.solar_flux, Some(180.5));
        assert_eq!(sample.proton_flux, None);
    }

    #[test]
    fn test_fetcher_kind() {
        let client = reqwest::Client::new();
        let fetcher = SpaceFetcher::new(client, DEFAULT_KP_URL, None, None);
        assert_eq!(fetcher.kind(), SourceKind::Space);
    }
}
