//! Device connection statistics.
//!
//! Counters are atomics; the latency window sits behind a mutex that is only
//! held to push or average, never across a device call.

use crate::util::millis_f64;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const LATENCY_WINDOW: usize = 100;

/// Rolling window of latency samples in milliseconds.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, ms: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Arithmetic mean of the retained samples, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Point-in-time copy of the stats for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub connected: bool,
    pub sent: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub average_latency_ms: f64,
    pub latency_samples: usize,
    pub uptime: Duration,
}

#[derive(Debug)]
pub struct ConnectionStats {
    connected: AtomicBool,
    sent: AtomicU64,
    failed: AtomicU64,
    connected_at: Mutex<Option<Instant>>,
    latencies: Mutex<LatencyWindow>,
}

impl Default for ConnectionStats {
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(false),
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            connected_at: Mutex::new(None),
            latencies: Mutex::new(LatencyWindow::new(LATENCY_WINDOW)),
        }
    }
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn window(&self) -> MutexGuard<'_, LatencyWindow> {
        self.latencies.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Start a fresh stats epoch at `now`.
    pub fn mark_connected(&self, now: Instant) {
        self.reset();
        *self.connected_at.lock().unwrap_or_else(|p| p.into_inner()) = Some(now);
        self.connected.store(true, Ordering::Release);
    }

    /// Drop the connection and clear every counter.
    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
        self.reset();
    }

    fn reset(&self) {
        self.sent.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        *self.connected_at.lock().unwrap_or_else(|p| p.into_inner()) = None;
        self.window().clear();
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn record_success(&self, latency: Duration) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        self.window().push(millis_f64(latency));
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Percentage of successful writes; 100 before any write was issued.
    pub fn success_rate(&self) -> f64 {
        let sent = self.sent();
        let total = sent + self.failed();
        if total == 0 {
            100.0
        } else {
            sent as f64 * 100.0 / total as f64
        }
    }

    pub fn average_latency_ms(&self) -> f64 {
        self.window().mean()
    }

    pub fn latency_samples(&self) -> usize {
        self.window().len()
    }

    /// Time since connect, zero while disconnected.
    pub fn uptime(&self, now: Instant) -> Duration {
        if !self.is_connected() {
            return Duration::ZERO;
        }
        self.connected_at
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO)
    }

    pub fn snapshot(&self, now: Instant) -> TelemetrySnapshot {
        let (average_latency_ms, latency_samples) = {
            let w = self.window();
            (w.mean(), w.len())
        };
        TelemetrySnapshot {
            connected: self.is_connected(),
            sent: self.sent(),
            failed: self.failed(),
            success_rate: self.success_rate(),
            average_latency_ms,
            latency_samples,
            uptime: self.uptime(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_defaults_to_full_and_tracks_ratio() {
        let s = ConnectionStats::new();
        assert_eq!(s.success_rate(), 100.0);
        for _ in 0..3 {
            s.record_success(Duration::from_millis(1));
        }
        s.record_failure();
        assert_eq!(s.success_rate(), 75.0);
        assert_eq!(s.sent(), 3);
        assert_eq!(s.failed(), 1);
    }

    #[test]
    fn failures_do_not_touch_latency_window() {
        let s = ConnectionStats::new();
        s.record_failure();
        assert_eq!(s.latency_samples(), 0);
        assert_eq!(s.average_latency_ms(), 0.0);
    }

    #[test]
    fn window_keeps_last_hundred_and_averages_them() {
        let s = ConnectionStats::new();
        for ms in 1..=150u64 {
            s.record_success(Duration::from_millis(ms));
        }
        assert_eq!(s.latency_samples(), LATENCY_WINDOW);
        // retained: 51..=150
        assert!((s.average_latency_ms() - 100.5).abs() < 1e-9);
    }

    #[test]
    fn uptime_is_zero_when_disconnected_and_resets_counters() {
        let s = ConnectionStats::new();
        let t0 = Instant::now();
        assert_eq!(s.uptime(t0), Duration::ZERO);
        s.mark_connected(t0);
        s.record_success(Duration::from_millis(2));
        assert_eq!(s.uptime(t0 + Duration::from_secs(7)), Duration::from_secs(7));
        s.mark_disconnected();
        let snap = s.snapshot(t0 + Duration::from_secs(9));
        assert!(!snap.connected);
        assert_eq!(snap.sent, 0);
        assert_eq!(snap.uptime, Duration::ZERO);
        assert_eq!(snap.latency_samples, 0);
    }
}
