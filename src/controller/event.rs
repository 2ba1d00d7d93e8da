//! Events published by the data controller

use crate::config::FallbackPolicy;
use crate::normalize::{MarketChannels, SpaceChannels, WeatherChannels};
use crate::smoothing::ChannelSet;
use crate::sources::SourceKind;
use std::fmt;

/// Where a smoothed update came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Live,
    /// Fallback path actually taken
    Fallback(FallbackPolicy),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Live => f.write_str("live"),
            Origin::Fallback(policy) => write!(f, "fallback:{}", policy),
        }
    }
}

/// Smoothed channels of any source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channels {
    Space(SpaceChannels),
    Weather(WeatherChannels),
    Markets(MarketChannels),
}

impl Channels {
    pub fn source(&self) -> SourceKind {
        match self {
            Channels::Space(_) => SourceKind::Space,
            Channels::Weather(_) => SourceKind::Weather,
            Channels::Markets(_) => SourceKind::Markets,
        }
    }

    /// Headline level of the channel set
    pub fn level(&self) -> f64 {
        match self {
            Channels::Space(c) => c.level(),
            Channels::Weather(c) => c.level(),
            Channels::Markets(c) => c.level(),
        }
    }
}

impl From<SpaceChannels> for Channels {
    fn from(c: SpaceChannels) -> Self {
        Channels::Space(c)
    }
}

impl From<WeatherChannels> for Channels {
    fn from(c: WeatherChannels) -> Self {
        Channels::Weather(c)
    }
}

impl From<MarketChannels> for Channels {
    fn from(c: MarketChannels) -> Self {
        Channels::Markets(c)
    }
}

/// Per-source notification emitted during an update round
#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    /// New smoothed state for a source
    Updated {
        source: SourceKind,
        channels: Channels,
        origin: Origin,
    },
    /// A live fetch failed; a fallback update follows
    Error { source: SourceKind, message: String },
}

impl DataEvent {
    pub fn source(&self) -> SourceKind {
        match self {
            DataEvent::Updated { source, .. } | DataEvent::Error { source, .. } => *source,
        }
    }
}
