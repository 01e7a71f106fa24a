use recoil_hardware::{MoveKind, SIMULATED_PORT, SimulatedDevice};
use recoil_traits::MouseDevice;
use rstest::rstest;
use std::time::{Duration, Instant};

#[rstest]
fn disconnect_turns_writes_into_errors() {
    let dev = SimulatedDevice::new();
    dev.connect(SIMULATED_PORT).expect("connect");
    dev.move_relative(2, 3).expect("write while connected");
    dev.disconnect();
    assert!(dev.move_relative(2, 3).is_err());
    assert!(dev.query_identity().is_err());
    assert_eq!(dev.moves().len(), 1);
}

#[rstest]
fn latency_is_applied_per_write() {
    let dev = SimulatedDevice::new().with_latency(Duration::from_millis(5));
    dev.connect(SIMULATED_PORT).expect("connect");
    let t0 = Instant::now();
    dev.move_relative_smoothed(10, 10, 3).expect("write");
    assert!(t0.elapsed() >= Duration::from_millis(5));
    assert_eq!(dev.moves()[0].kind, MoveKind::Smoothed(3));
}

#[rstest]
fn lists_only_the_simulated_port() {
    let dev = SimulatedDevice::new();
    assert_eq!(dev.list_ports(), vec![SIMULATED_PORT.to_string()]);
}
