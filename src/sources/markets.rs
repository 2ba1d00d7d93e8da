//! Market data source
//!
//! Fetches a coin's spot price, 24h change and 24h volume from CoinGecko.

use super::{Fetch, FetchError, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Raw market reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketsSample {
    pub price_usd: Option<f64>,
    /// 24h change in percent
    pub change_24h_pct: Option<f64>,
    pub volume_24h_usd: Option<f64>,
}

/// CoinGecko API response for simple price
#[derive(Debug, Deserialize)]
struct CoinGeckoPrice {
    #[serde(default)]
    usd: Option<f64>,
    #[serde(default)]
    usd_24h_vol: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

/// Live CoinGecko fetcher for one coin
pub struct MarketsFetcher {
    client: reqwest::Client,
    base_url: String,
    coin: String,
}

impl MarketsFetcher {
    /// Create a fetcher for a CoinGecko coin id (e.g. "bitcoin")
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, coin: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            coin: coin.into(),
        }
    }

    /// Build the API URL for CoinGecko
    fn build_url(&self) -> String {
        format!(
            "{}?ids={}&vs_currencies=usd&include_24hr_vol=true&include_24hr_change=true",
            self.base_url,
            urlencoding::encode(&self.coin)
        )
    }

    /// Pick this coin out of the response map
    ///
    /// A quote without a usable spot price is rejected so the previous live
    /// price stays the volatility base.
    fn select_coin(
        coin: &str,
        mut data: HashMap<String, CoinGeckoPrice>,
    ) -> Result<MarketsSample, FetchError> {
        let price = data
            .remove(coin)
            .ok_or_else(|| FetchError::Malformed(format!("no quote for '{}'", coin)))?;

        let usd = price
            .usd
            .filter(|usd| usd.is_finite() && *usd > 0.0)
            .ok_or_else(|| FetchError::Malformed(format!("invalid price for '{}'", coin)))?;

        Ok(MarketsSample {
            price_usd: Some(usd),
            change_24h_pct: price.usd_24h_change,
            volume_24h_usd: price.usd_24h_vol,
        })
    }
}

#[async_trait]
impl Fetch for MarketsFetcher {
    type Sample = MarketsSample;

    fn kind(&self) -> SourceKind {
        SourceKind::Markets
    }

    async fn fetch(&self) -> Result<MarketsSample, FetchError> {
        let response = self.client.get(self.build_url()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: "coingecko",
                status: response.status(),
            });
        }

        let data: HashMap<String, CoinGeckoPrice> = response.json().await?;
        Self::select_coin(&self.coin, data)
    }
}
