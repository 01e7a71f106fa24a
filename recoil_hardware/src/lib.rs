//! Device backends for the recoil engine.
//!
//! Only the simulated backend lives here; the vendor driver and its serial
//! transport are supplied by the surrounding application.
pub mod error;
pub mod util;

use error::HwError;
use recoil_traits::{ButtonCallback, DeviceResult, MouseButton, MouseDevice};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Port name reported by the simulated backend.
pub const SIMULATED_PORT: &str = "SIM0";

type SharedCallback = Arc<dyn Fn(MouseButton, bool) + Send + Sync>;

/// Write primitive used for a recorded movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Direct,
    Smoothed(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub dx: i32,
    pub dy: i32,
    pub kind: MoveKind,
}

/// In-process stand-in for the injection device.
///
/// Records every accepted movement, can inject write faults every Nth call,
/// and lets tests or the CLI synthesize button edges through the registered
/// callback.
pub struct SimulatedDevice {
    connected: AtomicBool,
    latency: Duration,
    fail_every: u64,
    attempts: AtomicU64,
    identity: Mutex<String>,
    fail_identity: AtomicBool,
    moves: Mutex<Vec<MoveRecord>>,
    callback: Mutex<Option<SharedCallback>>,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            latency: Duration::ZERO,
            fail_every: 0,
            attempts: AtomicU64::new(0),
            identity: Mutex::new("km.simulated 1.0".to_string()),
            fail_identity: AtomicBool::new(false),
            moves: Mutex::new(Vec::new()),
            callback: Mutex::new(None),
        }
    }

    /// Artificial per-write latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every `n`th movement write (0 disables fault injection).
    pub fn with_fail_every(mut self, n: u64) -> Self {
        self.fail_every = n;
        self
    }

    pub fn with_identity(self, identity: impl Into<String>) -> Self {
        if let Ok(mut id) = self.identity.lock() {
            *id = identity.into();
        }
        self
    }

    /// Make subsequent identity queries fail with a transport error.
    pub fn set_identity_failure(&self, fail: bool) {
        self.fail_identity.store(fail, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Movements accepted so far.
    pub fn moves(&self) -> Vec<MoveRecord> {
        self.moves.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Movement writes attempted, including injected failures.
    pub fn write_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn press(&self, button: MouseButton) {
        self.emit(button, true);
    }

    pub fn release(&self, button: MouseButton) {
        self.emit(button, false);
    }

    fn emit(&self, button: MouseButton, pressed: bool) {
        // Clone out of the lock; the callback may re-enter the device.
        let cb = self.callback.lock().ok().and_then(|g| g.clone());
        match cb {
            Some(cb) => cb(button, pressed),
            None => tracing::debug!(?button, pressed, "button edge with no callback registered"),
        }
    }

    fn write(&self, dx: i32, dy: i32, kind: MoveKind) -> DeviceResult<()> {
        if !self.is_connected() {
            return Err(Box::new(HwError::NotConnected));
        }
        let n = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.fail_every > 0 && n % self.fail_every == 0 {
            tracing::debug!(attempt = n, "injected write fault");
            return Err(Box::new(HwError::Transport(format!(
                "injected fault on write {n}"
            ))));
        }
        if let Ok(mut moves) = self.moves.lock() {
            moves.push(MoveRecord { dx, dy, kind });
        }
        tracing::trace!(dx, dy, ?kind, "simulated move");
        Ok(())
    }
}

impl MouseDevice for SimulatedDevice {
    fn list_ports(&self) -> Vec<String> {
        vec![SIMULATED_PORT.to_string()]
    }

    fn connect(&self, port: &str) -> DeviceResult<bool> {
        if port != SIMULATED_PORT {
            return Err(Box::new(HwError::NoDevice(port.to_string())));
        }
        self.connected.store(true, Ordering::Release);
        tracing::debug!(port, "simulated device connected");
        Ok(true)
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    fn move_relative(&self, dx: i32, dy: i32) -> DeviceResult<()> {
        self.write(dx, dy, MoveKind::Direct)
    }

    fn move_relative_smoothed(&self, dx: i32, dy: i32, smoothing: u8) -> DeviceResult<()> {
        self.write(dx, dy, MoveKind::Smoothed(smoothing))
    }

    fn query_identity(&self) -> DeviceResult<String> {
        if !self.is_connected() {
            return Err(Box::new(HwError::NotConnected));
        }
        if self.fail_identity.load(Ordering::Relaxed) {
            return Err(Box::new(HwError::Transport("identity query failed".into())));
        }
        Ok(self.identity.lock().map(|s| s.clone()).unwrap_or_default())
    }

    fn set_button_callback(&self, callback: ButtonCallback) {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = Some(Arc::from(callback));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn writes_require_connection() {
        let dev = SimulatedDevice::new();
        assert!(dev.move_relative(1, 1).is_err());
        assert!(dev.connect(SIMULATED_PORT).unwrap());
        dev.move_relative(1, 2).unwrap();
        dev.move_relative_smoothed(3, 4, 5).unwrap();
        assert_eq!(
            dev.moves(),
            vec![
                MoveRecord { dx: 1, dy: 2, kind: MoveKind::Direct },
                MoveRecord { dx: 3, dy: 4, kind: MoveKind::Smoothed(5) },
            ]
        );
    }

    #[test]
    fn unknown_port_is_rejected() {
        let dev = SimulatedDevice::new();
        assert!(dev.connect("COM9").is_err());
        assert!(!dev.is_connected());
    }

    #[test]
    fn fault_injection_hits_every_nth_write() {
        let dev = SimulatedDevice::new().with_fail_every(2);
        dev.connect(SIMULATED_PORT).unwrap();
        let results: Vec<bool> = (0..4).map(|_| dev.move_relative(0, 1).is_ok()).collect();
        assert_eq!(results, vec![true, false, true, false]);
        assert_eq!(dev.write_attempts(), 4);
        assert_eq!(dev.moves().len(), 2);
    }

    #[test]
    fn button_edges_reach_callback() {
        let dev = SimulatedDevice::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        dev.set_button_callback(Box::new(move |b, pressed| {
            if b == MouseButton::Primary && pressed {
                h.fetch_add(1, Ordering::Relaxed);
            }
        }));
        dev.press(MouseButton::Primary);
        dev.release(MouseButton::Primary);
        dev.press(MouseButton::Secondary);
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn identity_failure_is_toggleable() {
        let dev = SimulatedDevice::new().with_identity("fw 3.2");
        dev.connect(SIMULATED_PORT).unwrap();
        assert_eq!(dev.query_identity().unwrap(), "fw 3.2");
        dev.set_identity_failure(true);
        assert!(dev.query_identity().is_err());
    }
}
