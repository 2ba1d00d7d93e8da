//! Live session
//!
//! Ties the data controller, mapping engine and scheduler to an audio sink.
//! Everything mutable lives behind the session; control changes take effect
//! on the next tick.

use crate::config::AetherConfig;
use crate::controller::{DataController, DataEvent, SourceFlags, TickReport};
use crate::engine::AudioSink;
use crate::mapping::{AudioParameterSet, MappingEngine, Preset, PresetTable};
use crate::scheduler::Scheduler;
use crate::sources::SourceKind;
use anyhow::{bail, Context, Result};
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

/// User-facing controls read once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub preset: Preset,
    pub enabled: SourceFlags,
}

impl ControlState {
    pub fn from_config(config: &AetherConfig) -> Self {
        let mut enabled = SourceFlags::ALL;
        for kind in SourceKind::ALL {
            enabled.set(kind, config.sources.enabled(kind));
        }
        Self {
            preset: config.preset,
            enabled,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            preset: Preset::Default,
            enabled: SourceFlags::ALL,
        }
    }
}

/// Session commands, usually parsed from stdin lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    ToggleLayer { source: SourceKind, enabled: bool },
    SetPreset(Preset),
    UpdateNow,
    Shutdown,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            bail!("empty command");
        };

        let command = match (head.to_ascii_lowercase().as_str(), args) {
            ("start", []) => Command::Start,
            ("stop", []) => Command::Stop,
            ("update", []) => Command::UpdateNow,
            ("quit" | "exit", []) => Command::Shutdown,
            ("preset", [name]) => Command::SetPreset(name.parse()?),
            ("toggle", [source, state]) => {
                let enabled = match state.to_ascii_lowercase().as_str() {
                    "on" => true,
                    "off" => false,
                    other => bail!("expected 'on' or 'off', got '{}'", other),
                };
                Command::ToggleLayer {
                    source: source.parse()?,
                    enabled,
                }
            }
            _ => bail!("unknown command '{}'", line.trim()),
        };
        Ok(command)
    }
}

/// Whether the command loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Shared pieces a tick needs, cloned into the scheduled closure
#[derive(Clone)]
struct TickContext {
    controller: Arc<tokio::sync::Mutex<DataController>>,
    mapping: Arc<MappingEngine>,
    control: Arc<Mutex<ControlState>>,
    sink: Arc<dyn AudioSink>,
}

impl TickContext {
    fn control(&self) -> MutexGuard<'_, ControlState> {
        self.control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run(&self) -> (TickReport, AudioParameterSet) {
        let control = *self.control();
        let report = self.controller.lock().await.update_all(control.enabled).await;

        let params = self.mapping.compute(
            report.space.as_ref(),
            report.weather.as_ref(),
            report.markets.as_ref(),
            control.preset,
        );
        debug!(preset = %control.preset, ?params, "tick parameters");
        self.sink.apply_params(&params);

        (report, params)
    }
}

/// One running sonification session
pub struct Session {
    ctx: TickContext,
    scheduler: Scheduler,
    interval: Duration,
}

impl Session {
    /// Build live pipelines from configuration
    pub fn new(config: &AetherConfig, sink: Arc<dyn AudioSink>) -> Result<Self> {
        let controller = DataController::from_config(config).context("failed to build data controller")?;
        let mapping = MappingEngine::new(PresetTable::with_overrides(&config.presets));
        Ok(Self::with_controller(
            controller,
            mapping,
            ControlState::from_config(config),
            config.update_interval(),
            sink,
        ))
    }

    pub fn with_controller(
        controller: DataController,
        mapping: MappingEngine,
        control: ControlState,
        interval: Duration,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        for kind in SourceKind::ALL {
            if !control.enabled.get(kind) {
                sink.set_layer_enabled(kind, false);
            }
        }

        Self {
            ctx: TickContext {
                controller: Arc::new(tokio::sync::Mutex::new(controller)),
                mapping: Arc::new(mapping),
                control: Arc::new(Mutex::new(control)),
                sink,
            },
            scheduler: Scheduler::new(),
            interval,
        }
    }

    pub fn control_state(&self) -> ControlState {
        *self.ctx.control()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Receive per-source data events
    pub async fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.ctx.controller.lock().await.subscribe()
    }

    /// Run one update round outside the schedule
    pub async fn tick(&self) -> (TickReport, AudioParameterSet) {
        self.ctx.run().await
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Start => {
                let ctx = self.ctx.clone();
                self.scheduler.start(
                    move || {
                        let ctx = ctx.clone();
                        async move {
                            ctx.run().await;
                            Ok::<(), Infallible>(())
                        }
                    },
                    self.interval,
                );
                info!(interval_secs = self.interval.as_secs_f64(), "polling started");
            }
            Command::Stop => {
                self.scheduler.stop();
                info!("polling stopped");
            }
            Command::ToggleLayer { source, enabled } => {
                self.ctx.control().enabled.set(source, enabled);
                self.ctx.sink.set_layer_enabled(source, enabled);
                info!(source = %source, enabled, "source toggled");
            }
            Command::SetPreset(preset) => {
                self.ctx.control().preset = preset;
                info!(preset = %preset, "preset changed, applies on next tick");
            }
            Command::UpdateNow => {
                self.tick().await;
            }
            Command::Shutdown => {
                self.scheduler.stop();
                info!("session shutting down");
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Drive the session from a command channel until shutdown or close
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            if self.handle(command).await == Flow::Exit {
                return;
            }
        }
        self.scheduler.stop();
    }
}
