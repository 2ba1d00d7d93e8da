//! Aether - Ambient sonification of live data

use aether::config::{self, AetherConfig, EXAMPLE_CONFIG};
use aether::controller::{DataController, DataEvent};
use aether::engine::{
    default_device_name, list_output_devices, AudioError, AudioSink, Engine, OutputConfig, Player, Recorder, SharedEngine,
    TraceSink,
};
use aether::mapping::{MappingEngine, PresetTable};
use aether::session::{Command, ControlState, Session};
use aether::sources::SourceKind;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

const COMMAND_HELP: &str =
    "commands: start | stop | update | preset <default|calm|storm|sparse> | toggle <space|weather|markets> <on|off> | quit";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config: config_path,
            preset,
            no_audio,
        } => {
            let mut cfg = config::load_or_default(&config_path)?;
            if let Some(preset) = preset {
                cfg.preset = preset;
            }
            run(cfg, no_audio)?;
        }

        Commands::Monitor { config: config_path } => {
            let cfg = config::load_or_default(&config_path)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(monitor(&cfg))?;
        }

        Commands::Record {
            config: config_path,
            output,
            duration,
        } => {
            let cfg = config::load_or_default(&config_path)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(record(&cfg, &output, duration))?;
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Update interval: {} s", cfg.update_interval_secs);
                    match cfg.request_timeout_secs {
                        Some(secs) => println!("  Request timeout: {} s", secs),
                        None => println!("  Request timeout: none"),
                    }
                    println!("  Preset: {}", cfg.preset);
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Output trim: {:.0}%", cfg.audio.output_trim * 100.0);
                    println!("  Sources:");
                    for kind in SourceKind::ALL {
                        let settings = cfg.sources.settings(kind);
                        println!(
                            "    - {} (smoothing {}, fallback {}) {}",
                            kind,
                            settings.smoothing,
                            settings.fallback,
                            if settings.enabled { "[enabled]" } else { "[disabled]" }
                        );
                    }
                    if !cfg.presets.is_empty() {
                        println!("  Preset overrides: {}", cfg.presets.len());
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "aether.yaml";
            if Path::new(path).exists() {
                println!("aether.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, EXAMPLE_CONFIG).with_context(|| format!("failed to write {}", path))?;
                println!("Created aether.yaml with example configuration.");
            }
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some(name) = default_device_name() {
                println!("Default output: {}\n", name);
            }

            println!("Output devices:");
            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none)");
            }
            for (name, config) in devices {
                println!("  - {} ({} Hz, {} ch)", name, config.sample_rate.0, config.channels);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "aether=debug" } else { "aether=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(cfg: AetherConfig, no_audio: bool) -> Result<()> {
    println!("Starting Aether...");
    println!("  Preset: {}", cfg.preset);
    println!("  Update interval: {} s", cfg.update_interval_secs);

    // The output stream is not Send; it stays on this thread for the whole session
    let mut player = Player::new();
    let sink: Arc<dyn AudioSink> = if no_audio {
        println!("  Audio: off");
        Arc::new(TraceSink)
    } else {
        let audio = &cfg.audio;
        let started = OutputConfig::negotiate(audio.device.as_deref(), audio.sample_rate, audio.buffer_size as u32)
            .and_then(|output| {
                // The graph must run at the rate the device actually opened with
                let engine = SharedEngine::new(Engine::new(output.sample_rate() as f64, audio.output_trim));
                println!("  Audio: {} @ {} Hz", output.device_name(), output.sample_rate());
                player.start(engine.handle(), output)?;
                Ok::<_, AudioError>(engine)
            });
        match started {
            Ok(engine) => Arc::new(engine),
            Err(e) => {
                error!(error = %e, "audio output unavailable, polling continues");
                println!("  Audio: unavailable ({})", e);
                Arc::new(SharedEngine::new(Engine::new(audio.sample_rate as f64, audio.output_trim)))
            }
        }
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let session = Session::new(&cfg, sink)?;
        let events = session.subscribe().await;
        tokio::spawn(print_events(events));

        let (tx, rx) = mpsc::channel(32);
        tx.send(Command::Start).await.context("session closed before start")?;

        let ctrlc_tx = tx.clone();
        ctrlc::set_handler(move || request_shutdown(&ctrlc_tx)).context("failed to install Ctrl-C handler")?;

        std::thread::spawn(move || read_commands(tx));
        println!("\n{}\n", COMMAND_HELP);

        session.run(rx).await;
        Ok::<(), anyhow::Error>(())
    })?;

    player.stop();
    println!("Stopped.");
    Ok(())
}

/// Queue a shutdown from a non-async thread, waiting for room in the channel
fn request_shutdown(tx: &mpsc::Sender<Command>) {
    if let Err(e) = tx.blocking_send(Command::Shutdown) {
        warn!(error = %e, "shutdown request not delivered");
    }
}

fn read_commands(tx: mpsc::Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if tx.blocking_send(command).is_err() {
                    break;
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("{}", COMMAND_HELP);
            }
        }
    }
}

async fn print_events(mut events: tokio::sync::broadcast::Receiver<DataEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match events.recv().await {
            Ok(DataEvent::Updated { source, channels, origin }) => {
                let level = channels.level();
                println!("  {:<8} {} {:.2} ({})", source, bar(level), level, origin);
            }
            Ok(DataEvent::Error { .. }) => {}
            Err(RecvError::Lagged(missed)) => warn!(missed, "event printer fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn bar(level: f64) -> String {
    let filled = (level.clamp(0.0, 1.0) * 20.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

async fn monitor(cfg: &AetherConfig) -> Result<()> {
    println!("Fetching all sources once...\n");

    let mut controller = DataController::from_config(cfg)?;
    let control = ControlState::from_config(cfg);
    let report = controller.update_all(control.enabled).await;

    println!("Channels:");
    println!("{}", serde_json::to_string_pretty(&report)?);

    let mapping = MappingEngine::new(PresetTable::with_overrides(&cfg.presets));
    let params = mapping.compute(
        report.space.as_ref(),
        report.weather.as_ref(),
        report.markets.as_ref(),
        control.preset,
    );

    println!("\nAudio parameters ({}):", control.preset);
    for (id, value) in params.iter() {
        println!("  {:<16} {:.3}", id, value);
    }
    Ok(())
}

async fn record(cfg: &AetherConfig, output: &Path, duration: u64) -> Result<()> {
    println!("Fetching all sources once...");
    let mut controller = DataController::from_config(cfg)?;
    let control = ControlState::from_config(cfg);
    let report = controller.update_all(control.enabled).await;

    let mapping = MappingEngine::new(PresetTable::with_overrides(&cfg.presets));
    let params = mapping.compute(
        report.space.as_ref(),
        report.weather.as_ref(),
        report.markets.as_ref(),
        control.preset,
    );

    let sample_rate = cfg.audio.sample_rate;
    let mut engine = Engine::new(sample_rate as f64, cfg.audio.output_trim);
    for kind in SourceKind::ALL {
        engine.set_layer_enabled(kind, control.enabled.get(kind));
    }
    engine.apply_params(&params);

    println!("Recording {} seconds to {:?}...", duration, output);
    let mut recorder = Recorder::new(output, sample_rate)?;
    for second in 0..duration {
        recorder.render(&mut engine, 1.0)?;
        print!("\r  Progress: {}s / {}s", second + 1, duration);
        std::io::stdout().flush()?;
    }

    recorder.finalize()?;
    println!("\nRecorded to {:?}", output);
    Ok(())
}
