//! Weather data source
//!
//! Collects current conditions from the Open-Meteo forecast API (no key).

use super::{Fetch, FetchError, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Raw weather reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSample {
    pub temperature_c: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    /// Concurrent storm systems, when a census is available
    pub storm_count: Option<f64>,
    /// Reported temperature anomaly (°C)
    pub temp_anomaly_c: Option<f64>,
}

/// Open-Meteo API response
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentData>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentData {
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
    #[serde(default)]
    pressure_msl: Option<f64>,
    #[serde(default)]
    cloud_cover: Option<f64>,
}

/// Live Open-Meteo fetcher for a fixed location
pub struct WeatherFetcher {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl WeatherFetcher {
    /// Create a fetcher for the given coordinates
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            latitude,
            longitude,
        }
    }

    /// Build the API URL
    fn build_url(&self) -> String {
        format!(
            "{}?latitude={:.4}&longitude={:.4}&current=temperature_2m,pressure_msl,wind_speed_10m,cloud_cover&wind_speed_unit=ms",
            self.base_url, self.latitude, self.longitude
        )
    }

    /// Convert API response to a sample
    fn response_to_sample(response: ForecastResponse) -> WeatherSample {
        let current = response.current.unwrap_or_default();
        WeatherSample {
            temperature_c: current.temperature_2m,
            wind_speed_ms: current.wind_speed_10m,
            pressure_hpa: current.pressure_msl,
            cloud_cover_pct: current.cloud_cover,
            storm_count: None,
            temp_anomaly_c: None,
        }
    }
}

#[async_trait]
impl Fetch for WeatherFetcher {
    type Sample = WeatherSample;

    fn kind(&self) -> SourceKind {
        SourceKind::Weather
    }

    async fn fetch(&self) -> Result<WeatherSample, FetchError> {
        let response = self.client.get(self.build_url()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: "open-meteo",
                status: response.status(),
            });
        }

        let body = response.json::<ForecastResponse>().await?;
        Ok(Self::response_to_sample(body))
    }
}
