//! Process-wide engine state, built once and shared by reference.

use crate::config::PlaybackCfg;
use crate::loadout::Loadout;
use crate::logger::EventLog;
use crate::playback::PlaybackScheduler;
use crate::practice::PracticeSession;
use crate::telemetry::ConnectionStats;
use crate::trigger::TriggerState;
use crate::weapons::WeaponStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Samples the crouch modifier; called once per playback step.
pub type CrouchProbe = Box<dyn Fn() -> bool + Send + Sync>;

pub struct Context<D, C> {
    pub device: Arc<D>,
    pub clock: C,
    pub weapons: WeaponStore,
    pub loadout: Loadout,
    pub trigger: TriggerState,
    pub stats: Arc<ConnectionStats>,
    pub log: Arc<EventLog>,
    pub crouch: CrouchProbe,
    pub playback_cfg: PlaybackCfg,
    pub scheduler: PlaybackScheduler,
    pub practice: Mutex<PracticeSession>,
    shutdown: AtomicBool,
}

impl<D, C> Context<D, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: Arc<D>,
        clock: C,
        weapons: WeaponStore,
        loadout: Loadout,
        stats: Arc<ConnectionStats>,
        log: Arc<EventLog>,
        crouch: CrouchProbe,
        playback_cfg: PlaybackCfg,
    ) -> Self {
        Self {
            device,
            clock,
            weapons,
            loadout,
            trigger: TriggerState::new(),
            stats,
            log,
            crouch,
            playback_cfg,
            scheduler: PlaybackScheduler::new(),
            practice: Mutex::new(PracticeSession::new()),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Raise the shutdown flag. True only for the first caller.
    pub(crate) fn begin_shutdown(&self) -> bool {
        !self.shutdown.swap(true, Ordering::AcqRel)
    }

    pub fn practice(&self) -> MutexGuard<'_, PracticeSession> {
        self.practice.lock().unwrap_or_else(|p| p.into_inner())
    }
}
