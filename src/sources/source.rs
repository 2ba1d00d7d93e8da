//! Fetch trait, source kinds, and fetch errors

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// The three data streams that drive the sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Geomagnetic and solar activity
    Space,
    /// Terrestrial weather
    Weather,
    /// Financial market volatility
    Markets,
}

impl SourceKind {
    /// Every source, in layer order
    pub const ALL: [SourceKind; 3] = [SourceKind::Space, SourceKind::Weather, SourceKind::Markets];

    /// Stable identifier used in events, logs and commands
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Space => "space",
            SourceKind::Weather => "weather",
            SourceKind::Markets => "markets",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" | "cosmic" => Ok(SourceKind::Space),
            "weather" | "planetary" => Ok(SourceKind::Weather),
            "markets" | "market" | "human" => Ok(SourceKind::Markets),
            other => anyhow::bail!("unknown source '{}'", other),
        }
    }
}

/// Errors raised while acquiring a raw sample
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or client failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    /// Payload arrived but does not have the expected shape
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Static snapshot could not be read
    #[error("failed to read snapshot {path:?}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Static snapshot is not valid JSON for this source
    #[error("failed to parse snapshot {path:?}: {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Source cannot produce data at all
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous acquisition of one raw sample
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Raw sample type produced by this fetcher
    type Sample: Send;

    /// Which stream this fetcher feeds
    fn kind(&self) -> SourceKind;

    /// Fetch the latest raw sample
    async fn fetch(&self) -> Result<Self::Sample, FetchError>;
}

/// Build the shared HTTP client used by every live fetcher
pub fn http_client(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("aether/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Read a JSON value as a number, accepting numeric strings
pub(crate) fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}
