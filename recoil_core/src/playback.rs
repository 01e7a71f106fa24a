//! Timed pattern playback.
//!
//! One run walks the selected weapon's pattern: per step it samples the
//! loadout and crouch state, converts the offset to device units, issues a
//! single write, and then holds the step's wait. The wait is held whether the
//! write succeeded, failed, or was skipped because no device is connected, so
//! faults never speed up the burst.
//!
//! Cancellation is cooperative. The trigger flags and the engine shutdown flag
//! are polled before every step; an in-flight write is never interrupted.
//!
//! Safety: at most one playback thread exists at a time. `try_start` claims an
//! atomic guard before spawning and the guard is released only when the run
//! has observed its stop condition.

use crate::context::Context;
use crate::fault::map_device_fault;
use crate::logger::LogSink;
use crate::movement::step_displacement;
use crate::telemetry::ConnectionStats;
use crate::trigger::StopReason;
use recoil_traits::{Clock, MouseDevice};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    pub weapon: String,
    /// Steps whose wait was consumed.
    pub steps: usize,
    pub writes_ok: usize,
    pub writes_failed: usize,
    pub stop: StopReason,
}

/// Result of a single write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Sent,
    Failed,
    /// No device connected; nothing was issued.
    Skipped,
}

/// Issue one movement and record it in telemetry.
///
/// Uses the smoothed primitive when smoothing is on and either axis exceeds
/// `threshold`. Faults are logged and counted, never returned.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_move<D, C>(
    device: &D,
    clock: &C,
    stats: &ConnectionStats,
    log: &dyn LogSink,
    dx: i32,
    dy: i32,
    smoothing: Option<u8>,
    threshold: i32,
) -> WriteOutcome
where
    D: MouseDevice + ?Sized,
    C: Clock + ?Sized,
{
    if !stats.is_connected() {
        return WriteOutcome::Skipped;
    }
    let t0 = clock.now();
    let res = match smoothing {
        // unsigned_abs: saturated displacements reach i32::MIN.
        Some(factor)
            if dx.unsigned_abs() > threshold.unsigned_abs()
                || dy.unsigned_abs() > threshold.unsigned_abs() =>
        {
            device.move_relative_smoothed(dx, dy, factor)
        }
        _ => device.move_relative(dx, dy),
    };
    match res {
        Ok(()) => {
            stats.record_success(clock.elapsed_since(t0));
            WriteOutcome::Sent
        }
        Err(e) => {
            stats.record_failure();
            let fault = map_device_fault(e.as_ref());
            log.error(&format!("Device write failed: {fault}"));
            WriteOutcome::Failed
        }
    }
}

/// Walk the currently selected weapon's pattern. Blocks for the whole burst.
pub fn run_pattern<D, C>(ctx: &Context<D, C>) -> PlaybackReport
where
    D: MouseDevice,
    C: Clock,
{
    let start = ctx.loadout.snapshot();
    let Some(weapon) = ctx.weapons.get_index(start.weapon) else {
        ctx.log
            .error(&format!("No weapon profile at index {}", start.weapon));
        return PlaybackReport {
            weapon: String::new(),
            steps: 0,
            writes_ok: 0,
            writes_failed: 0,
            stop: StopReason::PatternExhausted,
        };
    };

    tracing::debug!(weapon = %weapon.id, steps = weapon.len(), "playback start");
    let mut report = PlaybackReport {
        weapon: weapon.id.clone(),
        steps: 0,
        writes_ok: 0,
        writes_failed: 0,
        stop: StopReason::PatternExhausted,
    };

    for (i, offset) in weapon.pattern.iter().enumerate() {
        if ctx.is_shutting_down() {
            report.stop = StopReason::Shutdown;
            break;
        }
        if let Some(reason) = ctx.trigger.stop_reason() {
            report.stop = reason;
            break;
        }

        let loadout = ctx.loadout.snapshot();
        let crouching = (ctx.crouch)();
        let params = loadout.movement_params(&weapon.id);
        let (dx, dy) = step_displacement(offset.x, offset.y, crouching, &params);
        let smoothing = loadout.smoothing.then_some(loadout.smoothing_factor);

        match dispatch_move(
            ctx.device.as_ref(),
            &ctx.clock,
            &ctx.stats,
            ctx.log.as_ref(),
            dx,
            dy,
            smoothing,
            ctx.playback_cfg.smoothing_threshold,
        ) {
            WriteOutcome::Sent => report.writes_ok += 1,
            WriteOutcome::Failed => report.writes_failed += 1,
            WriteOutcome::Skipped => {}
        }
        tracing::trace!(step = i, dx, dy, crouching, "playback step");

        ctx.clock.sleep(weapon.wait_for(i));
        report.steps += 1;
    }

    tracing::debug!(
        weapon = %report.weapon,
        steps = report.steps,
        ok = report.writes_ok,
        failed = report.writes_failed,
        stop = ?report.stop,
        "playback end"
    );
    report
}

/// Clears the running flag when the playback thread exits, even by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the single playback thread.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    last: Mutex<Option<PlaybackReport>>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// True from a successful `try_start` until the run has stopped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Report of the most recently finished run.
    pub fn last_report(&self) -> Option<PlaybackReport> {
        self.last.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Spawn a playback run unless one is already in flight.
    pub fn try_start<D, C>(&self, ctx: Arc<Context<D, C>>) -> bool
    where
        D: MouseDevice + 'static,
        C: Clock + Send + Sync + 'static,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("playback already in flight; press ignored");
            return false;
        }

        // Previous run has released the guard; reap its thread.
        if let Some(prev) = self.handle().take() {
            if prev.join().is_err() {
                tracing::warn!("previous playback thread panicked");
            }
        }

        let guard = RunningGuard(self.running.clone());
        let spawned = std::thread::Builder::new()
            .name("recoil-playback".into())
            .spawn(move || {
                let _guard = guard;
                let report = run_pattern(&ctx);
                *ctx.scheduler.last.lock().unwrap_or_else(|p| p.into_inner()) = Some(report);
            });

        match spawned {
            Ok(h) => {
                *self.handle() = Some(h);
                true
            }
            Err(e) => {
                // The closure (and its guard) was dropped, so the flag is already clear.
                tracing::error!(error = %e, "failed to spawn playback thread");
                false
            }
        }
    }

    /// Wait for the current run, if any, to finish.
    pub fn join(&self) -> Option<PlaybackReport> {
        let handle = self.handle().take()?;
        if handle.join().is_err() {
            tracing::warn!("playback thread panicked");
            return None;
        }
        self.last_report()
    }
}
