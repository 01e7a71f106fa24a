#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the recoil engine front end.
//!
//! Every section is optional; an empty file yields the defaults the engine
//! ships with. `Config::validate` enforces the ranges the engine relies on.
use serde::Deserialize;
use std::path::Path;

pub const FOV_MIN: u8 = 65;
pub const FOV_MAX: u8 = 120;
pub const SMOOTHING_MIN: u8 = 1;
pub const SMOOTHING_MAX: u8 = 10;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Device {
    /// Port to open; when absent the first discovered port is used.
    pub port: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub weapon: String,
    /// 0 none, 1 handmade, 2 holographic, 3 8x
    pub scope: u8,
    /// 0 none, 1 silencer
    pub barrel: u8,
    pub sensitivity: f32,
    pub fov: u8,
    pub smoothing: bool,
    pub smoothing_factor: u8,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            weapon: "AK47".to_string(),
            scope: 0,
            barrel: 0,
            sensitivity: 1.0,
            fov: 90,
            smoothing: true,
            smoothing_factor: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Monitor {
    /// Wake-up period of the health monitor.
    pub check_interval_ms: u64,
    /// Minimum spacing between keep-alive queries.
    pub keepalive_interval_ms: u64,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            check_interval_ms: 5_000,
            keepalive_interval_ms: 60_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Playback {
    /// Smoothed writes are used only when |dx| or |dy| exceeds this many units.
    pub smoothing_threshold: i32,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            smoothing_threshold: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Never,
    Daily,
    Hourly,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    pub rotation: Rotation,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub loadout: Loadout,
    pub monitor: Monitor,
    pub playback: Playback,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Loadout
        if self.loadout.weapon.trim().is_empty() {
            eyre::bail!("loadout.weapon must not be empty");
        }
        if self.loadout.scope > 3 {
            eyre::bail!("loadout.scope must be in [0, 3]");
        }
        if self.loadout.barrel > 1 {
            eyre::bail!("loadout.barrel must be in [0, 1]");
        }
        if !(self.loadout.sensitivity.is_finite() && self.loadout.sensitivity > 0.0) {
            eyre::bail!("loadout.sensitivity must be > 0");
        }
        if !(FOV_MIN..=FOV_MAX).contains(&self.loadout.fov) {
            eyre::bail!("loadout.fov must be in [{FOV_MIN}, {FOV_MAX}]");
        }
        if !(SMOOTHING_MIN..=SMOOTHING_MAX).contains(&self.loadout.smoothing_factor) {
            eyre::bail!("loadout.smoothing_factor must be in [{SMOOTHING_MIN}, {SMOOTHING_MAX}]");
        }

        // Monitor
        if self.monitor.check_interval_ms == 0 {
            eyre::bail!("monitor.check_interval_ms must be >= 1");
        }
        if self.monitor.keepalive_interval_ms < self.monitor.check_interval_ms {
            eyre::bail!("monitor.keepalive_interval_ms must be >= monitor.check_interval_ms");
        }

        // Playback
        if self.playback.smoothing_threshold < 0 {
            eyre::bail!("playback.smoothing_threshold must be >= 0");
        }

        Ok(())
    }
}
