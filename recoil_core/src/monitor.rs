//! Background device health monitor.
//!
//! Wakes every `check_interval` and, once `keepalive_interval` has passed
//! since the last good keep-alive, issues an identity query. Failures are
//! logged as warnings and leave the timer untouched; the next wake-up simply
//! tries again. The monitor never disconnects the device.
//!
//! Safety: one thread per `HealthMonitor`, stopped and joined on `stop()` or
//! `Drop`. The wake-up wait is a channel `recv_timeout`, so shutdown does not
//! have to sit out a full check interval.

use crate::config::MonitorCfg;
use crate::error::RecoilError;
use crate::fault::map_device_fault;
use crate::logger::LogSink;
use crate::telemetry::ConnectionStats;
use crossbeam_channel as xch;
use recoil_traits::{Clock, MouseDevice};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Result of one periodic check.
#[derive(Debug, Clone, PartialEq)]
pub enum KeepAliveOutcome {
    /// No device; nothing to probe.
    Disconnected,
    NotDue,
    /// Device answered with this identity string.
    Alive(String),
    Failed(RecoilError),
}

/// Keep-alive timer. Only a successful, non-empty response resets it.
#[derive(Debug, Clone)]
pub struct KeepAlive {
    interval: Duration,
    last_ok: Instant,
}

impl KeepAlive {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_ok: now,
        }
    }

    pub fn last_ok(&self) -> Instant {
        self.last_ok
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_ok) >= self.interval
    }

    pub fn check<D>(
        &mut self,
        now: Instant,
        device: &D,
        stats: &ConnectionStats,
        log: &dyn LogSink,
    ) -> KeepAliveOutcome
    where
        D: MouseDevice + ?Sized,
    {
        if !stats.is_connected() {
            return KeepAliveOutcome::Disconnected;
        }
        if !self.is_due(now) {
            return KeepAliveOutcome::NotDue;
        }
        match device.query_identity() {
            Ok(id) if !id.trim().is_empty() => {
                self.last_ok = now;
                log.success(&format!("Keep-alive OK: {}", id.trim()));
                KeepAliveOutcome::Alive(id)
            }
            Ok(_) => {
                let err = RecoilError::DeviceFault("empty identity response".into());
                log.warn(&format!("Keep-alive failed: {err}"));
                KeepAliveOutcome::Failed(err)
            }
            Err(e) => {
                let err = map_device_fault(e.as_ref());
                log.warn(&format!("Keep-alive failed: {err}"));
                KeepAliveOutcome::Failed(err)
            }
        }
    }
}

pub struct HealthMonitor {
    active: Arc<AtomicBool>,
    stop_tx: Option<xch::Sender<()>>,
    checks: Arc<AtomicU64>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl HealthMonitor {
    pub fn spawn<D, C>(
        device: Arc<D>,
        stats: Arc<ConnectionStats>,
        log: Arc<dyn LogSink>,
        clock: C,
        cfg: MonitorCfg,
    ) -> Self
    where
        D: MouseDevice + 'static,
        C: Clock + Send + 'static,
    {
        let (stop_tx, stop_rx) = xch::bounded::<()>(1);
        let active = Arc::new(AtomicBool::new(true));
        let active_clone = active.clone();
        let checks = Arc::new(AtomicU64::new(0));
        let checks_clone = checks.clone();
        // Anchor the timer at connect time, not whenever the thread gets scheduled.
        let mut keepalive = KeepAlive::new(cfg.keepalive_interval, clock.now());

        let spawned = std::thread::Builder::new()
            .name("recoil-monitor".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(cfg.check_interval) {
                        Err(xch::RecvTimeoutError::Timeout) => {}
                        // Explicit stop or the monitor handle was dropped.
                        Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => break,
                    }
                    if !active_clone.load(Ordering::Acquire) {
                        break;
                    }
                    let outcome =
                        keepalive.check(clock.now(), device.as_ref(), &stats, log.as_ref());
                    tracing::trace!(?outcome, "health check");
                    checks_clone.fetch_add(1, Ordering::Relaxed);
                }
                tracing::debug!("health monitor exiting");
            });

        let join_handle = match spawned {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn health monitor");
                active.store(false, Ordering::Release);
                None
            }
        };

        Self {
            active,
            stop_tx: Some(stop_tx),
            checks,
            join_handle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Periodic checks completed so far.
    pub fn checks(&self) -> u64 {
        self.checks.load(Ordering::Relaxed)
    }

    /// Signal the thread and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("health monitor joined"),
                Err(e) => tracing::warn!(?e, "health monitor panicked during shutdown"),
            }
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{EventLog, LogLevel};
    use recoil_hardware::SimulatedDevice;

    fn connected() -> (SimulatedDevice, ConnectionStats, EventLog, Instant) {
        let dev = SimulatedDevice::new();
        dev.connect(recoil_hardware::SIMULATED_PORT).unwrap();
        let stats = ConnectionStats::new();
        let t0 = Instant::now();
        stats.mark_connected(t0);
        (dev, stats, EventLog::default(), t0)
    }

    #[test]
    fn not_due_until_interval_elapses() {
        let (dev, stats, log, t0) = connected();
        let mut ka = KeepAlive::new(Duration::from_secs(60), t0);
        let out = ka.check(t0 + Duration::from_secs(59), &dev, &stats, &log);
        assert_eq!(out, KeepAliveOutcome::NotDue);
        let out = ka.check(t0 + Duration::from_secs(60), &dev, &stats, &log);
        assert!(matches!(out, KeepAliveOutcome::Alive(_)));
        assert_eq!(ka.last_ok(), t0 + Duration::from_secs(60));
        assert!(log.contains(LogLevel::Success, "Keep-alive OK"));
    }

    #[test]
    fn failure_keeps_timer_and_warns() {
        let (dev, stats, log, t0) = connected();
        dev.set_identity_failure(true);
        let mut ka = KeepAlive::new(Duration::from_secs(60), t0);
        let t = t0 + Duration::from_secs(65);
        let out = ka.check(t, &dev, &stats, &log);
        assert!(matches!(out, KeepAliveOutcome::Failed(_)));
        assert_eq!(ka.last_ok(), t0);
        assert!(log.contains(LogLevel::Warning, "Keep-alive failed"));
        // Still connected, still due on the next wake-up.
        assert!(stats.is_connected());
        assert!(ka.is_due(t + Duration::from_secs(5)));
    }

    #[test]
    fn empty_identity_counts_as_failure() {
        let (dev, stats, log, t0) = connected();
        let dev = dev.with_identity("   ");
        let mut ka = KeepAlive::new(Duration::from_secs(1), t0);
        let out = ka.check(t0 + Duration::from_secs(2), &dev, &stats, &log);
        assert!(matches!(out, KeepAliveOutcome::Failed(RecoilError::DeviceFault(_))));
        assert_eq!(ka.last_ok(), t0);
    }

    #[test]
    fn disconnected_device_is_not_probed() {
        let dev = SimulatedDevice::new();
        let stats = ConnectionStats::new();
        let log = EventLog::default();
        let t0 = Instant::now();
        let mut ka = KeepAlive::new(Duration::ZERO, t0);
        assert_eq!(
            ka.check(t0, &dev, &stats, &log),
            KeepAliveOutcome::Disconnected
        );
        assert!(log.is_empty());
    }
}
