//! Runtime configuration types for the engine.
//!
//! Separate from the TOML-deserialized schema in `recoil_config`; see
//! `conversions` for the mapping.

use std::time::Duration;

/// Health monitor timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorCfg {
    /// How often the monitor wakes up.
    pub check_interval: Duration,
    /// Minimum spacing between successful keep-alive queries.
    pub keepalive_interval: Duration,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(60),
        }
    }
}

/// Playback write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCfg {
    /// Use the smoothed primitive only when |dx| or |dy| exceeds this.
    pub smoothing_threshold: i32,
}

impl Default for PlaybackCfg {
    fn default() -> Self {
        Self {
            smoothing_threshold: 2,
        }
    }
}
