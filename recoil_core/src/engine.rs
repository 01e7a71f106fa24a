//! Engine assembly and lifecycle.
//!
//! `EngineBuilder` validates the pieces once and produces an `Engine` that
//! owns the shared `Context`, the health monitor and (through the context)
//! the playback scheduler. Dropping the engine shuts everything down and
//! joins both background threads.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use recoil_traits::{Clock, MonotonicClock, MouseButton, MouseDevice};

use crate::config::{MonitorCfg, PlaybackCfg};
use crate::context::{Context, CrouchProbe};
use crate::error::{BuildError, RecoilError, Result};
use crate::fault::map_device_fault;
use crate::loadout::{Loadout, LoadoutSnapshot};
use crate::logger::{EventLog, LogSink};
use crate::monitor::{HealthMonitor, KeepAlive, KeepAliveOutcome};
use crate::playback::PlaybackReport;
use crate::practice::PracticeResult;
use crate::telemetry::{ConnectionStats, TelemetrySnapshot};
use crate::trigger::TriggerAction;
use crate::types::Point;
use crate::weapons::{WeaponProfile, WeaponStore};

// ── Builder ──────────────────────────────────────────────────────────────────

/// Builder for `Engine`. Only the device is mandatory.
pub struct EngineBuilder<D, C = MonotonicClock> {
    device: Option<Arc<D>>,
    clock: C,
    weapons: Option<WeaponStore>,
    loadout: Option<LoadoutSnapshot>,
    crouch: Option<CrouchProbe>,
    monitor: MonitorCfg,
    playback: PlaybackCfg,
}

impl<D> Default for EngineBuilder<D, MonotonicClock> {
    fn default() -> Self {
        Self {
            device: None,
            clock: MonotonicClock::new(),
            weapons: None,
            loadout: None,
            crouch: None,
            monitor: MonitorCfg::default(),
            playback: PlaybackCfg::default(),
        }
    }
}

impl<D> EngineBuilder<D, MonotonicClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D, C> EngineBuilder<D, C> {
    pub fn with_device(mut self, device: Arc<D>) -> Self {
        self.device = Some(device);
        self
    }

    /// Swap the time source (tests use `TestClock`).
    pub fn with_clock<C2>(self, clock: C2) -> EngineBuilder<D, C2> {
        EngineBuilder {
            device: self.device,
            clock,
            weapons: self.weapons,
            loadout: self.loadout,
            crouch: self.crouch,
            monitor: self.monitor,
            playback: self.playback,
        }
    }

    pub fn with_weapons(mut self, weapons: WeaponStore) -> Self {
        self.weapons = Some(weapons);
        self
    }

    pub fn with_loadout(mut self, loadout: LoadoutSnapshot) -> Self {
        self.loadout = Some(loadout);
        self
    }

    /// Crouch modifier probe, sampled once per playback step. Defaults to "standing".
    pub fn with_crouch_probe(mut self, probe: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.crouch = Some(Box::new(probe));
        self
    }

    pub fn with_monitor(mut self, cfg: MonitorCfg) -> Self {
        self.monitor = cfg;
        self
    }

    pub fn with_playback(mut self, cfg: PlaybackCfg) -> Self {
        self.playback = cfg;
        self
    }

    pub fn build(self) -> Result<Engine<D, C>>
    where
        D: MouseDevice + 'static,
        C: Clock + Clone + Send + Sync + 'static,
    {
        let device = self
            .device
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDevice))?;
        let weapons = self.weapons.unwrap_or_default();
        if weapons.is_empty() {
            return Err(eyre::Report::new(BuildError::NoWeapons));
        }
        if self.monitor.check_interval.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "check_interval must be > 0",
            )));
        }
        if self.monitor.keepalive_interval < self.monitor.check_interval {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "keepalive_interval must be >= check_interval",
            )));
        }
        if self.playback.smoothing_threshold < 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "smoothing_threshold must be >= 0",
            )));
        }
        let loadout = self.loadout.unwrap_or_default();
        if loadout.weapon >= weapons.len() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "loadout weapon index out of range",
            )));
        }

        let crouch = self.crouch.unwrap_or_else(|| Box::new(|| false));
        let ctx = Context::new(
            device,
            self.clock,
            weapons,
            Loadout::from_snapshot(loadout),
            Arc::new(ConnectionStats::new()),
            Arc::new(EventLog::default()),
            crouch,
            self.playback,
        );
        Ok(Engine {
            ctx: Arc::new(ctx),
            monitor_cfg: self.monitor,
            monitor: Mutex::new(None),
        })
    }
}

// ── Button dispatch ──────────────────────────────────────────────────────────

/// Apply one button edge and start a burst when the trigger asks for it.
/// Returns true when a new playback run was spawned.
///
/// A press that does not spawn a run (shutdown, or a run still holding the
/// scheduler) leaves the trigger inactive; the button state itself is kept.
pub fn on_button_edge<D, C>(ctx: &Arc<Context<D, C>>, button: MouseButton, pressed: bool) -> bool
where
    D: MouseDevice + 'static,
    C: Clock + Send + Sync + 'static,
{
    if ctx.trigger.on_button(button, pressed) != TriggerAction::StartPlayback {
        return false;
    }
    let started = !ctx.is_shutting_down() && ctx.scheduler.try_start(Arc::clone(ctx));
    if !started {
        ctx.trigger.deactivate();
    }
    started
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct Engine<D, C = MonotonicClock>
where
    D: MouseDevice + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    ctx: Arc<Context<D, C>>,
    monitor_cfg: MonitorCfg,
    monitor: Mutex<Option<HealthMonitor>>,
}

impl<D> Engine<D, MonotonicClock>
where
    D: MouseDevice + 'static,
{
    pub fn builder() -> EngineBuilder<D, MonotonicClock> {
        EngineBuilder::new()
    }
}

impl<D, C> Engine<D, C>
where
    D: MouseDevice + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn monitor_slot(&self) -> MutexGuard<'_, Option<HealthMonitor>> {
        self.monitor.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn stop_monitor(&self) {
        // Take it out first so the join happens without the slot locked.
        let monitor = self.monitor_slot().take();
        if let Some(mut m) = monitor {
            m.stop();
        }
    }

    pub fn context(&self) -> &Arc<Context<D, C>> {
        &self.ctx
    }

    pub fn device(&self) -> &Arc<D> {
        &self.ctx.device
    }

    pub fn log(&self) -> &EventLog {
        &self.ctx.log
    }

    pub fn loadout(&self) -> &Loadout {
        &self.ctx.loadout
    }

    pub fn weapons(&self) -> &WeaponStore {
        &self.ctx.weapons
    }

    pub fn is_connected(&self) -> bool {
        self.ctx.stats.is_connected()
    }

    /// Open `port`. On success the stats epoch restarts, the button callback
    /// is registered and the health monitor is (re)started. On failure the
    /// engine stays usable without hardware.
    pub fn connect(&self, port: &str) -> bool {
        if self.ctx.is_shutting_down() {
            return false;
        }
        match self.ctx.device.connect(port) {
            Ok(true) => {}
            Ok(false) => {
                self.ctx.log.error(&format!("Failed to connect to {port}"));
                return false;
            }
            Err(e) => {
                let fault = map_device_fault(e.as_ref());
                self.ctx
                    .log
                    .error(&format!("Failed to connect to {port}: {fault}"));
                return false;
            }
        }

        self.stop_monitor();
        self.ctx.stats.mark_connected(self.ctx.clock.now());

        let weak: Weak<Context<D, C>> = Arc::downgrade(&self.ctx);
        self.ctx
            .device
            .set_button_callback(Box::new(move |button, pressed| {
                if let Some(ctx) = weak.upgrade() {
                    on_button_edge(&ctx, button, pressed);
                }
            }));

        let monitor = HealthMonitor::spawn(
            Arc::clone(&self.ctx.device),
            Arc::clone(&self.ctx.stats),
            Arc::clone(&self.ctx.log) as Arc<dyn LogSink>,
            self.ctx.clock.clone(),
            self.monitor_cfg,
        );
        *self.monitor_slot() = Some(monitor);

        self.ctx.log.success(&format!("Connected to {port}"));
        true
    }

    /// Try each discovered port in order; returns the one that connected.
    pub fn connect_first(&self) -> Option<String> {
        let ports = self.ctx.device.list_ports();
        if ports.is_empty() {
            self.ctx.log.warn("No device found; running in demo mode");
            return None;
        }
        ports.into_iter().find(|p| self.connect(p))
    }

    pub fn disconnect(&self) {
        self.stop_monitor();
        if self.ctx.stats.is_connected() {
            self.ctx.device.disconnect();
            self.ctx.stats.mark_disconnected();
            self.ctx.log.info("Device disconnected");
        }
    }

    /// Feed a button edge as if it came from the device callback.
    pub fn handle_button(&self, button: MouseButton, pressed: bool) -> bool {
        on_button_edge(&self.ctx, button, pressed)
    }

    pub fn is_playing(&self) -> bool {
        self.ctx.scheduler.is_running()
    }

    /// Poll until no burst is running or `timeout` passes. True when idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_playing() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Block until the current burst finishes and return its report.
    pub fn join_playback(&self) -> Option<PlaybackReport> {
        self.ctx.scheduler.join()
    }

    pub fn last_report(&self) -> Option<PlaybackReport> {
        self.ctx.scheduler.last_report()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.ctx.stats.snapshot(self.ctx.clock.now())
    }

    /// Periodic checks run by the current health monitor; zero when none is running.
    pub fn health_checks(&self) -> u64 {
        self.monitor_slot().as_ref().map_or(0, HealthMonitor::checks)
    }

    /// Run one keep-alive probe immediately, outside the monitor schedule.
    pub fn probe(&self) -> KeepAliveOutcome {
        let mut ka = KeepAlive::new(Duration::ZERO, self.ctx.clock.now());
        ka.check(
            self.ctx.clock.now(),
            self.ctx.device.as_ref(),
            &self.ctx.stats,
            self.ctx.log.as_ref(),
        )
    }

    pub fn select_weapon(&self, id: &str) -> std::result::Result<(), RecoilError> {
        self.ctx.loadout.select_weapon(&self.ctx.weapons, id)?;
        self.ctx.log.info(&format!("Weapon selected: {id}"));
        Ok(())
    }

    pub fn current_weapon(&self) -> Option<&WeaponProfile> {
        self.ctx.weapons.get_index(self.ctx.loadout.weapon_index())
    }

    // ── Practice ─────────────────────────────────────────────────────────────

    pub fn practice_start(&self) {
        self.ctx.practice().start(self.ctx.clock.now());
        self.ctx.log.info("Practice session started");
    }

    pub fn practice_record(&self, actual: Point, ideal: Point) -> Option<f64> {
        self.ctx.practice().record(actual, ideal)
    }

    pub fn practice_stop(&self) -> PracticeResult {
        let result = self.ctx.practice().stop(self.ctx.clock.now());
        self.ctx.log.success(&format!(
            "Practice finished: {} shots, score {:.1}, grade {}",
            result.shots, result.accuracy_score, result.grade
        ));
        result
    }

    pub fn practice_result(&self) -> PracticeResult {
        self.ctx.practice().result()
    }

    /// Stop background work and release the device. Idempotent.
    pub fn shutdown(&self) {
        if !self.ctx.begin_shutdown() {
            return;
        }
        tracing::debug!("engine shutting down");
        self.stop_monitor();
        if self.ctx.scheduler.join().is_some() {
            tracing::debug!("in-flight burst joined");
        }
        if self.ctx.stats.is_connected() {
            self.ctx.device.disconnect();
            self.ctx.stats.mark_disconnected();
        }
        self.ctx.log.info("Engine stopped");
    }
}

impl<D, C> Drop for Engine<D, C>
where
    D: MouseDevice + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
