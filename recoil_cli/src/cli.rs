//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "recoil", version, about = "Recoil compensation engine CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in weapon profiles
    Weapons {
        /// Only show one category (AR, SMG, LMG, SPECIAL)
        #[arg(long, value_name = "TAG")]
        category: Option<String>,
    },
    /// Fire one burst against the simulated device
    Burst {
        /// Weapon id; defaults to [loadout].weapon
        #[arg(long)]
        weapon: Option<String>,
        /// Release the trigger once this many writes were attempted
        #[arg(long, value_name = "N")]
        release_after: Option<u64>,
        /// Hold the crouch modifier for the whole burst
        #[arg(long, action = ArgAction::SetTrue)]
        crouch: bool,
        /// Inject a write fault every Nth write
        #[arg(long, value_name = "N", default_value_t = 0)]
        fail_every: u64,
        /// Simulated per-write latency
        #[arg(long, value_name = "MS", default_value_t = 0)]
        latency_ms: u64,
    },
    /// Score a jittered trace against a weapon's ideal trajectory
    Practice {
        /// Weapon id; defaults to [loadout].weapon
        #[arg(long)]
        weapon: Option<String>,
        /// Maximum per-axis jitter in pixels
        #[arg(long, value_name = "PX", default_value_t = 2.0)]
        jitter: f64,
        /// Seed for the jitter generator
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Connect, run one keep-alive probe and print telemetry
    Health,
}
