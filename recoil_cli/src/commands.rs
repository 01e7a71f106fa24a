//! Subcommand bodies: engine assembly from config and result printing.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use recoil_core::error::RecoilError;
use recoil_core::{
    Category, Engine, KeepAliveOutcome, LoadoutSnapshot, MonitorCfg, PlaybackCfg,
    PlaybackReport, Point, TelemetrySnapshot, WeaponStore,
};
use recoil_hardware::SimulatedDevice;
use recoil_traits::MouseButton;
use serde_json::json;

const POLL: Duration = Duration::from_millis(2);

fn build_engine(
    cfg: &recoil_config::Config,
    device: SimulatedDevice,
    crouch: bool,
) -> eyre::Result<Engine<SimulatedDevice>> {
    let weapons = WeaponStore::builtin();
    let loadout = LoadoutSnapshot::from_config(&cfg.loadout, &weapons)?;
    Engine::builder()
        .with_device(Arc::new(device))
        .with_weapons(weapons)
        .with_loadout(loadout)
        .with_monitor(MonitorCfg::from(&cfg.monitor))
        .with_playback(PlaybackCfg::from(&cfg.playback))
        .with_crouch_probe(move || crouch)
        .build()
        .wrap_err("assemble engine")
}

/// Open the configured port, or the first discovered one.
fn connect(engine: &Engine<SimulatedDevice>, cfg: &recoil_config::Config) -> bool {
    match cfg.device.port.as_deref() {
        Some(port) => engine.connect(port),
        None => engine.connect_first().is_some(),
    }
}

fn telemetry_json(t: &TelemetrySnapshot) -> serde_json::Value {
    json!({
        "connected": t.connected,
        "sent": t.sent,
        "failed": t.failed,
        "success_rate": t.success_rate,
        "average_latency_ms": t.average_latency_ms,
        "latency_samples": t.latency_samples,
        "uptime_ms": recoil_core::util::millis_u64(t.uptime),
    })
}

fn print_telemetry(t: &TelemetrySnapshot) {
    println!(
        "telemetry: connected={} sent={} failed={} success={:.1}% avg_latency={:.3}ms uptime={:.1}s",
        t.connected,
        t.sent,
        t.failed,
        t.success_rate,
        t.average_latency_ms,
        t.uptime.as_secs_f64()
    );
}

pub fn list_weapons(category: Option<&str>, json_mode: bool) -> eyre::Result<()> {
    let store = WeaponStore::builtin();
    let filter = category.map(Category::from_str).transpose()?;
    let rows: Vec<_> = store
        .iter()
        .filter(|w| filter.is_none_or(|c| w.category == c))
        .collect();

    if json_mode {
        let arr: Vec<_> = rows
            .iter()
            .map(|w| {
                json!({
                    "id": w.id,
                    "name": w.display_name,
                    "category": w.category.tag(),
                    "steps": w.len(),
                    "base_wait_ms": w.base_wait_ms,
                    "timed": !w.timings_ms.is_empty(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(arr));
        return Ok(());
    }
    for w in rows {
        println!(
            "{:<10} {:<22} {:<8} steps={:<3} wait={}ms{}",
            w.id,
            w.display_name,
            w.category,
            w.len(),
            w.base_wait_ms,
            if w.timings_ms.is_empty() { "" } else { " (timed)" }
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_burst(
    cfg: &recoil_config::Config,
    weapon: Option<&str>,
    release_after: Option<u64>,
    crouch: bool,
    fail_every: u64,
    latency_ms: u64,
    json_mode: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    let device = SimulatedDevice::new()
        .with_fail_every(fail_every)
        .with_latency(Duration::from_millis(latency_ms));
    let engine = build_engine(cfg, device, crouch)?;
    if let Some(id) = weapon {
        engine.select_weapon(id)?;
    }
    if !connect(&engine, cfg) {
        tracing::warn!("no device connected; burst runs without writes");
    }

    tracing::info!(weapon = ?engine.current_weapon().map(|w| &w.id), "burst start");
    engine.device().press(MouseButton::Primary);
    let mut released = false;
    while engine.is_playing() {
        let limit_hit = release_after.is_some_and(|n| engine.device().write_attempts() >= n);
        if !released && (limit_hit || shutdown.load(Ordering::Relaxed)) {
            engine.device().release(MouseButton::Primary);
            released = true;
        }
        std::thread::sleep(POLL);
    }
    if !released {
        engine.device().release(MouseButton::Primary);
    }

    let report = engine
        .join_playback()
        .or_else(|| engine.last_report())
        .ok_or_else(|| RecoilError::State("burst did not start".into()))?;
    let telemetry = engine.telemetry();
    tracing::info!(steps = report.steps, stop = ?report.stop, "burst end");
    print_burst(&report, &telemetry, json_mode);
    Ok(())
}

fn print_burst(report: &PlaybackReport, t: &TelemetrySnapshot, json_mode: bool) {
    if json_mode {
        let obj = json!({
            "weapon": report.weapon,
            "steps": report.steps,
            "writes_ok": report.writes_ok,
            "writes_failed": report.writes_failed,
            "stop": format!("{:?}", report.stop),
            "telemetry": telemetry_json(t),
        });
        println!("{obj}");
        return;
    }
    println!(
        "burst {}: {} steps, {} ok, {} failed, stop={:?}",
        report.weapon, report.steps, report.writes_ok, report.writes_failed, report.stop
    );
    print_telemetry(t);
}

/// Uniform offset in `[-amp, amp]`.
fn jitter(rng: &mut impl Rng, amp: f64) -> f64 {
    if amp > 0.0 {
        rng.random_range(-amp..=amp)
    } else {
        0.0
    }
}

pub fn run_practice(
    cfg: &recoil_config::Config,
    weapon: Option<&str>,
    amplitude: f64,
    seed: u64,
    json_mode: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    if !(amplitude.is_finite() && amplitude >= 0.0) {
        return Err(RecoilError::Config(format!("jitter must be >= 0, got {amplitude}")).into());
    }
    let engine = build_engine(cfg, SimulatedDevice::new(), false)?;
    if let Some(id) = weapon {
        engine.select_weapon(id)?;
    }
    let profile = engine
        .current_weapon()
        .ok_or_else(|| RecoilError::State("no weapon selected".into()))?;
    let ideal = profile.trajectory(1.0);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    engine.practice_start();
    for p in &ideal {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let actual = Point::new(
            p.x + jitter(&mut rng, amplitude),
            p.y + jitter(&mut rng, amplitude),
        );
        engine.practice_record(actual, *p);
    }
    let r = engine.practice_stop();

    if json_mode {
        let obj = json!({
            "weapon": profile.id,
            "shots": r.shots,
            "average_deviation": r.average_deviation,
            "max_deviation": r.max_deviation,
            "accuracy_score": r.accuracy_score,
            "grade": r.grade.label(),
        });
        println!("{obj}");
    } else {
        println!(
            "practice {}: {} shots, avg deviation {:.2}px, max {:.2}px, score {:.1}, grade {}",
            profile.id, r.shots, r.average_deviation, r.max_deviation, r.accuracy_score, r.grade
        );
    }
    Ok(())
}

pub fn run_health(cfg: &recoil_config::Config, json_mode: bool) -> eyre::Result<()> {
    let engine = build_engine(cfg, SimulatedDevice::new(), false)?;
    if !connect(&engine, cfg) {
        return Err(RecoilError::DeviceUnavailable.into());
    }
    let outcome = engine.probe();
    let telemetry = engine.telemetry();
    let (ok, detail) = match &outcome {
        KeepAliveOutcome::Alive(id) => (true, id.trim().to_string()),
        KeepAliveOutcome::Failed(e) => (false, e.to_string()),
        other => (false, format!("{other:?}")),
    };
    if json_mode {
        let obj = json!({
            "ok": ok,
            "detail": detail,
            "telemetry": telemetry_json(&telemetry),
        });
        println!("{obj}");
    } else {
        println!("health: {} ({detail})", if ok { "ok" } else { "degraded" });
        print_telemetry(&telemetry);
    }
    if let KeepAliveOutcome::Failed(e) = outcome {
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_is_bounded_and_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = jitter(&mut a, 3.0);
            assert!((-3.0..=3.0).contains(&v));
            assert_eq!(v, jitter(&mut b, 3.0));
        }
        assert_eq!(jitter(&mut a, 0.0), 0.0);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = ChaCha8Rng::seed_from_u64(1);
        let mut b = ChaCha8Rng::seed_from_u64(2);
        let xs: Vec<f64> = (0..8).map(|_| jitter(&mut a, 2.0)).collect();
        let ys: Vec<f64> = (0..8).map(|_| jitter(&mut b, 2.0)).collect();
        assert_ne!(xs, ys);
    }
}
