//! Small concurrency and time helpers for recoil_core.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// `f32` stored as raw bits in an `AtomicU32`.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(v: f32) -> Self {
        Self(AtomicU32::new(v.to_bits()))
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }

    #[inline]
    pub fn store(&self, v: f32, order: Ordering) {
        self.0.store(v.to_bits(), order);
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
#[inline]
pub fn millis_u64(d: Duration) -> u64 {
    (d.as_millis().min(u128::from(u64::MAX))) as u64
}

/// Fractional milliseconds in `d`.
#[inline]
pub fn millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_f32_round_trips_bits() {
        let a = AtomicF32::new(0.45);
        assert_eq!(a.load(Ordering::Relaxed), 0.45);
        a.store(-3.5, Ordering::Relaxed);
        assert_eq!(a.load(Ordering::Relaxed), -3.5);
    }

    #[test]
    fn millis_helpers() {
        assert_eq!(millis_u64(Duration::from_micros(2_500)), 2);
        assert!((millis_f64(Duration::from_micros(2_500)) - 2.5).abs() < 1e-9);
        assert_eq!(millis_u64(Duration::MAX), u64::MAX);
    }
}
