//! Data sources for aether
//!
//! Each source fetches one raw sample per update round: space weather,
//! terrestrial weather, and market data. Static JSON snapshots stand in
//! when a live endpoint is unavailable.

mod markets;
mod snapshot;
mod source;
mod space;
mod weather;

pub use markets::{MarketsFetcher, MarketsSample, DEFAULT_MARKETS_URL};
pub use snapshot::load_snapshot;
pub use source::{http_client, Fetch, FetchError, SourceKind};
pub use space::{
    SpaceFetcher, SpaceSample, DEFAULT_KP_URL, DEFAULT_PROTON_FLUX_URL, DEFAULT_SOLAR_FLUX_URL,
};
pub use weather::{WeatherFetcher, WeatherSample, DEFAULT_WEATHER_URL};
