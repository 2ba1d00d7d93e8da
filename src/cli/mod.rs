//! CLI interface for Aether

use aether::mapping::Preset;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ambient sonification of space weather, weather and markets
#[derive(Parser)]
#[command(name = "aether")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a live session; reads commands from stdin
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "aether.yaml")]
        config: PathBuf,

        /// Starting preset (default, calm, storm, sparse)
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Poll and map data without opening an audio device
        #[arg(long)]
        no_audio: bool,
    },

    /// Fetch every source once and print channels and parameters
    Monitor {
        /// Configuration file path
        #[arg(short, long, default_value = "aether.yaml")]
        config: PathBuf,
    },

    /// Fetch once, then render the soundscape to a WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "aether.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "60")]
        duration: u64,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "aether.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,

    /// List available audio output devices
    Devices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::parse_from(["aether", "-v", "run", "--preset", "storm", "--no-audio"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { config, preset, no_audio } => {
                assert_eq!(config, PathBuf::from("aether.yaml"));
                assert_eq!(preset, Some(Preset::Storm));
                assert!(no_audio);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_record() {
        let cli = Cli::parse_from(["aether", "record", "-o", "out.wav", "-d", "5"]);
        match cli.command {
            Commands::Record { output, duration, .. } => {
                assert_eq!(output, PathBuf::from("out.wav"));
                assert_eq!(duration, 5);
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn test_bad_preset_rejected() {
        assert!(Cli::try_parse_from(["aether", "run", "--preset", "loud"]).is_err());
    }
}
