//! Fetch → normalize → smooth pipeline for a single source

use super::event::{Channels, DataEvent, Origin};
use super::walk::RandomWalk;
use crate::config::{FallbackPolicy, PipelineSettings};
use crate::normalize::{Normalize, Normalizer};
use crate::smoothing::{ChannelSet, ChannelSmoother};
use crate::sources::{load_snapshot, Fetch, SourceKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// One source's persistent state: smoother, fallback material, price history
pub struct SourcePipeline<S: Normalize> {
    kind: SourceKind,
    fetcher: Box<dyn Fetch<Sample = S>>,
    smoother: ChannelSmoother<S::Channels>,
    fallback: FallbackPolicy,
    snapshot: Option<PathBuf>,
    /// One walk per channel, each with its own generator
    walks: Vec<RandomWalk>,
    /// Last live sample, the base for delta channels
    last_live: Option<S>,
    /// Last live normalized channels, re-fed by the cached fallback
    cached: Option<S::Channels>,
}

impl<S> SourcePipeline<S>
where
    S: Normalize + DeserializeOwned,
    S::Channels: Into<Channels>,
{
    pub fn new(fetcher: Box<dyn Fetch<Sample = S>>, settings: &PipelineSettings, mut rng: StdRng) -> Self {
        let walks = (0..<S::Channels as ChannelSet>::CHANNELS)
            .map(|_| RandomWalk::new(settings.walk, settings.initial, StdRng::seed_from_u64(rng.gen())))
            .collect();

        Self {
            kind: fetcher.kind(),
            smoother: ChannelSmoother::new(settings.initial, settings.smoothing),
            fallback: settings.fallback,
            snapshot: settings.snapshot.clone(),
            walks,
            last_live: None,
            cached: None,
            fetcher,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Current smoothed state
    pub fn state(&self) -> S::Channels {
        self.smoother.state()
    }

    /// Run one fetch round; never fails
    pub async fn update(&mut self, normalizer: &Normalizer, events: &broadcast::Sender<DataEvent>) -> S::Channels {
        let (sample, origin) = match self.fetcher.fetch().await {
            Ok(raw) => {
                let channels = raw.normalize(normalizer, self.last_live.as_ref());
                self.last_live = Some(raw);
                self.cached = Some(channels);
                (channels, Origin::Live)
            }
            Err(e) => {
                warn!(source = %self.kind, error = %e, "fetch failed");
                let _ = events.send(DataEvent::Error {
                    source: self.kind,
                    message: e.to_string(),
                });
                let (channels, used) = self.fallback_sample(normalizer).await;
                info!(source = %self.kind, policy = %used, "using fallback");
                (channels, Origin::Fallback(used))
            }
        };

        let smoothed = self.smoother.next(&sample);
        debug!(source = %self.kind, %origin, level = smoothed.level(), "source updated");
        let _ = events.send(DataEvent::Updated {
            source: self.kind,
            channels: smoothed.into(),
            origin,
        });
        smoothed
    }

    /// Fallback sample for a failed fetch, with the policy that produced it
    ///
    /// Cached and snapshot fall through to the random walk when they have
    /// nothing to offer.
    async fn fallback_sample(&mut self, normalizer: &Normalizer) -> (S::Channels, FallbackPolicy) {
        match self.fallback {
            FallbackPolicy::Cached => {
                if let Some(cached) = self.cached {
                    return (cached, FallbackPolicy::Cached);
                }
            }
            FallbackPolicy::Snapshot => {
                if let Some(path) = &self.snapshot {
                    match load_snapshot::<S>(path).await {
                        // Snapshots carry no price history
                        Ok(raw) => return (raw.normalize(normalizer, None), FallbackPolicy::Snapshot),
                        Err(e) => warn!(source = %self.kind, error = %e, "snapshot unavailable"),
                    }
                }
            }
            FallbackPolicy::Synthetic => {}
        }
        let mut walks = self.walks.iter_mut();
        let synthetic = S::Channels::from_levels(|| walks.next().map_or(0.0, RandomWalk::next));
        (synthetic, FallbackPolicy::Synthetic)
    }
}
