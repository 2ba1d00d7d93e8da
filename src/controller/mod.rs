//! Data controller
//!
//! Owns one pipeline per source and runs them concurrently each round.
//! A failing source never holds up or fails the others: it reports an
//! error event and feeds its fallback through the same smoother.

mod event;
mod pipeline;
mod walk;

pub use event::{Channels, DataEvent, Origin};
pub use pipeline::SourcePipeline;
pub use walk::RandomWalk;

use crate::config::AetherConfig;
use crate::normalize::{MarketChannels, Normalizer, SpaceChannels, WeatherChannels};
use crate::sources::{
    http_client, MarketsFetcher, MarketsSample, SourceKind, SpaceFetcher, SpaceSample, WeatherFetcher,
    WeatherSample,
};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Which sources take part in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceFlags {
    pub space: bool,
    pub weather: bool,
    pub markets: bool,
}

impl SourceFlags {
    pub const ALL: SourceFlags = SourceFlags {
        space: true,
        weather: true,
        markets: true,
    };

    pub fn get(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Space => self.space,
            SourceKind::Weather => self.weather,
            SourceKind::Markets => self.markets,
        }
    }

    pub fn set(&mut self, kind: SourceKind, enabled: bool) {
        match kind {
            SourceKind::Space => self.space = enabled,
            SourceKind::Weather => self.weather = enabled,
            SourceKind::Markets => self.markets = enabled,
        }
    }
}

impl Default for SourceFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Smoothed state of every enabled source after a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub space: Option<SpaceChannels>,
    pub weather: Option<WeatherChannels>,
    pub markets: Option<MarketChannels>,
}

/// Orchestrates fetch → normalize → smooth for all sources
pub struct DataController {
    normalizer: Normalizer,
    space: SourcePipeline<SpaceSample>,
    weather: SourcePipeline<WeatherSample>,
    markets: SourcePipeline<MarketsSample>,
    events: broadcast::Sender<DataEvent>,
}

impl DataController {
    pub fn new(
        normalizer: Normalizer,
        space: SourcePipeline<SpaceSample>,
        weather: SourcePipeline<WeatherSample>,
        markets: SourcePipeline<MarketsSample>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            normalizer,
            space,
            weather,
            markets,
            events,
        }
    }

    /// Build live HTTP pipelines from configuration
    pub fn from_config(config: &AetherConfig) -> Result<Self> {
        let client = http_client(config.request_timeout()).context("failed to build HTTP client")?;
        let sources = &config.sources;

        let space = SpaceFetcher::new(
            client.clone(),
            sources.space.kp_url.clone(),
            sources.space.solar_flux_url.clone(),
            sources.space.proton_flux_url.clone(),
        );
        let weather = WeatherFetcher::new(
            client.clone(),
            sources.weather.base_url.clone(),
            sources.weather.latitude,
            sources.weather.longitude,
        );
        let markets = MarketsFetcher::new(client, sources.markets.base_url.clone(), sources.markets.coin.clone());

        Ok(Self::new(
            Normalizer::new(config.ranges.clone()),
            SourcePipeline::new(Box::new(space), &sources.space.settings(), rng_for(config, 0)),
            SourcePipeline::new(Box::new(weather), &sources.weather.settings(), rng_for(config, 1)),
            SourcePipeline::new(Box::new(markets), &sources.markets.settings(), rng_for(config, 2)),
        ))
    }

    /// Receive per-source events
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.events.subscribe()
    }

    /// One concurrent round over the enabled sources
    ///
    /// Returns once every enabled source has settled, live or fallback.
    pub async fn update_all(&mut self, flags: SourceFlags) -> TickReport {
        let Self {
            normalizer,
            space,
            weather,
            markets,
            events,
        } = self;
        let normalizer = &*normalizer;
        let events = &*events;

        let (space, weather, markets) = tokio::join!(
            async {
                if flags.space {
                    Some(space.update(normalizer, events).await)
                } else {
                    None
                }
            },
            async {
                if flags.weather {
                    Some(weather.update(normalizer, events).await)
                } else {
                    None
                }
            },
            async {
                if flags.markets {
                    Some(markets.update(normalizer, events).await)
                } else {
                    None
                }
            },
        );

        TickReport {
            space,
            weather,
            markets,
        }
    }

    /// Current smoothed state of every source, regardless of flags
    pub fn state(&self) -> TickReport {
        TickReport {
            space: Some(self.space.state()),
            weather: Some(self.weather.state()),
            markets: Some(self.markets.state()),
        }
    }
}

fn rng_for(config: &AetherConfig, index: u64) -> StdRng {
    match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackPolicy, PipelineSettings, WalkConfig};
    use crate::sources::{Fetch, FetchError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Fetcher that replays a script of results, then fails
    struct Scripted<S> {
        kind: SourceKind,
        script: Mutex<VecDeque<Result<S, FetchError>>>,
    }

    impl<S> Scripted<S> {
        fn new(kind: SourceKind, script: Vec<Result<S, FetchError>>) -> Self {
            Self {
                kind,
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl<S: Send + Sync + 'static> Fetch for Scripted<S> {
        type Sample = S;

        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch(&self) -> Result<S, FetchError> {
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Err(FetchError::Unavailable("script exhausted".into())))
        }
    }

    fn settings(fallback: FallbackPolicy) -> PipelineSettings {
        PipelineSettings {
            enabled: true,
            smoothing: 1.0,
            initial: 0.5,
            fallback,
            snapshot: None,
            walk: WalkConfig::new(0.2, 0.8),
        }
    }

    fn pipeline<S>(kind: SourceKind, script: Vec<Result<S, FetchError>>, settings: &PipelineSettings) -> SourcePipeline<S>
    where
        S: crate::normalize::Normalize + serde::de::DeserializeOwned,
        S::Channels: Into<Channels>,
    {
        SourcePipeline::new(Box::new(Scripted::new(kind, script)), settings, StdRng::seed_from_u64(5))
    }

    fn price(usd: f64) -> MarketsSample {
        MarketsSample {
            price_usd: Some(usd),
            change_24h_pct: Some(0.0),
            volume_24h_usd: Some(1e9),
        }
    }

    fn drain(rx: &mut broadcast::Receiver<DataEvent>) -> Vec<DataEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let live = settings(FallbackPolicy::Synthetic);
        let mut controller = DataController::new(
            Normalizer::default(),
            pipeline(
                SourceKind::Space,
                vec![Err(FetchError::Unavailable("noaa down".into()))],
                &live,
            ),
            pipeline(SourceKind::Weather, vec![Ok(WeatherSample::default())], &live),
            pipeline(SourceKind::Markets, vec![Ok(price(100.0))], &live),
        );
        let mut rx = controller.subscribe();

        let report = controller.update_all(SourceFlags::ALL).await;
        assert!(report.space.is_some());
        assert!(report.weather.is_some());
        assert!(report.markets.is_some());

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            DataEvent::Error { source: SourceKind::Space, message } if message.contains("noaa down")
        )));
        for kind in [SourceKind::Weather, SourceKind::Markets] {
            assert!(events.iter().any(|e| matches!(
                e,
                DataEvent::Updated { source, origin: Origin::Live, .. } if *source == kind
            )));
        }
        assert!(events.iter().any(|e| matches!(
            e,
            DataEvent::Updated {
                source: SourceKind::Space,
                origin: Origin::Fallback(FallbackPolicy::Synthetic),
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_disabled_sources_are_skipped() {
        let s = settings(FallbackPolicy::Synthetic);
        let mut controller = DataController::new(
            Normalizer::default(),
            pipeline(SourceKind::Space, vec![Ok(SpaceSample::default())], &s),
            pipeline(SourceKind::Weather, vec![Ok(WeatherSample::default())], &s),
            pipeline(SourceKind::Markets, vec![Ok(price(1.0))], &s),
        );
        let mut rx = controller.subscribe();
        let mut flags = SourceFlags::ALL;
        flags.set(SourceKind::Weather, false);

        let report = controller.update_all(flags).await;
        assert!(report.weather.is_none());
        assert!(drain(&mut rx).iter().all(|e| e.source() != SourceKind::Weather));
    }

    #[tokio::test]
    async fn test_first_market_read_has_no_volatility() {
        let s = settings(FallbackPolicy::Cached);
        let mut markets = pipeline(SourceKind::Markets, vec![Ok(price(100.0)), Ok(price(103.0))], &s);
        let (tx, _rx) = broadcast::channel(16);
        let normalizer = Normalizer::default();

        // Smoother seeded with 0.5 keeps its volatility on the first read
        let first = markets.update(&normalizer, &tx).await;
        assert_eq!(first.volatility, Some(0.5));

        // 3% move over a 0..10% domain, factor 1
        let second = markets.update(&normalizer, &tx).await;
        assert!((second.volatility.unwrap() - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_volatility_proportional_to_move() {
        let s = settings(FallbackPolicy::Cached);
        let mut markets = pipeline(SourceKind::Markets, vec![Ok(price(200.0)), Ok(price(196.0))], &s);
        let (tx, _rx) = broadcast::channel(16);
        let normalizer = Normalizer::default();

        markets.update(&normalizer, &tx).await;
        let second = markets.update(&normalizer, &tx).await;
        // 2% drop
        assert!((second.volatility.unwrap() - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rejected_quote_keeps_price_history() {
        let s = settings(FallbackPolicy::Cached);
        let mut markets = pipeline(
            SourceKind::Markets,
            vec![
                Ok(price(100.0)),
                Err(FetchError::Malformed("invalid price for 'bitcoin'".into())),
                Ok(price(105.0)),
            ],
            &s,
        );
        let (tx, mut rx) = broadcast::channel(16);
        let normalizer = Normalizer::default();

        markets.update(&normalizer, &tx).await;
        drain(&mut rx);

        markets.update(&normalizer, &tx).await;
        let second = drain(&mut rx);
        assert!(matches!(second[0], DataEvent::Error { source: SourceKind::Markets, .. }));
        assert!(matches!(
            second[1],
            DataEvent::Updated { origin: Origin::Fallback(FallbackPolicy::Cached), .. }
        ));

        // 5% move against the last good price
        let third = markets.update(&normalizer, &tx).await;
        assert!((third.volatility.unwrap() - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_cached_fallback_refeeds_last_live() {
        let s = PipelineSettings {
            smoothing: 0.5,
            ..settings(FallbackPolicy::Cached)
        };
        let hot = SpaceSample {
            kp_index: Some(9.0),
            solar_flux: Some(300.0),
            proton_flux: Some(10.0),
        };
        let mut space = pipeline(
            SourceKind::Space,
            vec![Ok(hot), Err(FetchError::Unavailable("gone".into()))],
            &s,
        );
        let (tx, mut rx) = broadcast::channel(16);
        let normalizer = Normalizer::default();

        let first = space.update(&normalizer, &tx).await;
        assert!((first.geomagnetic_storm - 0.75).abs() < 1e-9);
        let second = space.update(&normalizer, &tx).await;
        // Still gliding toward the cached reading
        assert!((second.geomagnetic_storm - 0.875).abs() < 1e-9);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            DataEvent::Updated { origin: Origin::Fallback(FallbackPolicy::Cached), .. }
        )));
    }

    #[tokio::test]
    async fn test_cached_without_history_falls_through() {
        let s = settings(FallbackPolicy::Cached);
        let mut weather = pipeline::<WeatherSample>(SourceKind::Weather, vec![], &s);
        let (tx, mut rx) = broadcast::channel(16);

        let state = weather.update(&Normalizer::default(), &tx).await;
        assert!((0.2..=0.8).contains(&state.storminess));
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            DataEvent::Updated { origin: Origin::Fallback(FallbackPolicy::Synthetic), .. }
        )));
    }

    #[tokio::test]
    async fn test_synthetic_channels_move_independently() {
        let mut weather = pipeline::<WeatherSample>(SourceKind::Weather, vec![], &settings(FallbackPolicy::Synthetic));
        let (tx, _rx) = broadcast::channel(64);

        let mut state = weather.update(&Normalizer::default(), &tx).await;
        for _ in 1..20 {
            state = weather.update(&Normalizer::default(), &tx).await;
        }
        let levels = [
            state.temperature,
            state.wind,
            state.pressure,
            state.cloud_cover,
            state.temp_anomaly,
            state.storminess,
        ];
        assert!(levels.iter().all(|v| (0.2..=0.8).contains(v)));
        assert!(levels.iter().any(|v| *v != levels[0]), "channels in lockstep: {:?}", levels);
    }

    #[tokio::test]
    async fn test_snapshot_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"kp_index": 9, "solar_flux": 0, "proton_flux": 0}"#).unwrap();
        let s = PipelineSettings {
            snapshot: Some(file.path().to_path_buf()),
            ..settings(FallbackPolicy::Snapshot)
        };
        let mut space = pipeline::<SpaceSample>(SourceKind::Space, vec![], &s);
        let (tx, _rx) = broadcast::channel(16);

        let state = space.update(&Normalizer::default(), &tx).await;
        assert_eq!(state.geomagnetic_storm, 1.0);
        assert_eq!(state.solar_activity, 0.0);
    }

    #[tokio::test]
    async fn test_snapshot_fallback_missing_file() {
        let s = PipelineSettings {
            snapshot: Some(PathBuf::from("/nonexistent/aether/space.json")),
            ..settings(FallbackPolicy::Snapshot)
        };
        let mut space = pipeline::<SpaceSample>(SourceKind::Space, vec![], &s);
        let (tx, mut rx) = broadcast::channel(16);

        space.update(&Normalizer::default(), &tx).await;
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            DataEvent::Updated { origin: Origin::Fallback(FallbackPolicy::Synthetic), .. }
        )));
    }

    #[test]
    fn test_from_config_builds() {
        let mut config = AetherConfig::default();
        config.random_seed = Some(1);
        let controller = DataController::from_config(&config).unwrap();
        let state = controller.state();
        assert_eq!(state.space.unwrap().geomagnetic_storm, 0.4);
        assert_eq!(state.weather.unwrap().storminess, 0.5);
        assert_eq!(state.markets.unwrap().volatility, Some(0.3));
    }

    #[test]
    fn test_source_flags() {
        let mut flags = SourceFlags::default();
        flags.set(SourceKind::Markets, false);
        assert!(!flags.get(SourceKind::Markets));
        assert!(flags.get(SourceKind::Space));
    }
}
