#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Recoil compensation engine (hardware-agnostic).
//!
//! All device interaction goes through `recoil_traits::MouseDevice`; time goes
//! through `recoil_traits::Clock` so playback and keep-alive logic can be
//! driven deterministically in tests.
//!
//! ## Architecture
//!
//! - **Weapons**: static pattern tables and lookup (`weapons`)
//! - **Multipliers**: scope/barrel scaling with the documented override table (`multiplier`)
//! - **Movement**: pattern offset to device units (`movement`)
//! - **Playback**: one cancellable burst thread at a time (`playback`)
//! - **Trigger**: button edge detector (`trigger`)
//! - **Health**: keep-alive monitor and connection telemetry (`monitor`, `telemetry`)
//! - **Practice**: deviation scoring and grades (`practice`)
//!
//! `Engine` ties these together around one shared `Context`.
//!
//! ## Rounding
//!
//! Device displacements truncate toward zero per axis, so the reference step
//! `-2 / -0.09 = 22.2` becomes `22`.

pub mod config;
pub mod context;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod fault;
pub mod loadout;
pub mod logger;
pub mod mocks;
pub mod monitor;
pub mod movement;
pub mod multiplier;
pub mod playback;
pub mod practice;
pub mod telemetry;
pub mod trigger;
pub mod types;
pub mod util;
pub mod weapons;

pub use config::{MonitorCfg, PlaybackCfg};
pub use context::Context;
pub use engine::{Engine, EngineBuilder};
pub use error::{BuildError, RecoilError, Report, Result};
pub use loadout::{Loadout, LoadoutSnapshot};
pub use logger::{EventLog, LogLevel, LogLine, LogSink};
pub use monitor::{HealthMonitor, KeepAlive, KeepAliveOutcome};
pub use multiplier::{Barrel, Multipliers, Scope};
pub use playback::{PlaybackReport, PlaybackScheduler};
pub use practice::{Grade, PracticeResult, PracticeSession};
pub use telemetry::{ConnectionStats, TelemetrySnapshot};
pub use trigger::{StopReason, TriggerAction, TriggerState};
pub use types::{Point, Rgba};
pub use weapons::{Category, WeaponProfile, WeaponStore};
