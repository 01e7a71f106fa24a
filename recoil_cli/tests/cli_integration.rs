use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("recoil.toml");
    fs::write(&path, body).unwrap();
    path
}

fn recoil() -> Command {
    Command::cargo_bin("recoil").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["weapons"], 0, "AK47", "stdout")]
#[case(&["weapons", "--category", "lmg"], 0, "M249", "stdout")]
#[case(&["weapons", "--category", "bows"], 4, "unknown weapon category", "stderr")]
#[case(&["burst", "--weapon", "CROSSBOW"], 4, "Unknown weapon", "stderr")]
#[case(&["health"], 0, "health: ok", "stdout")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let mut cmd = recoil();
    cmd.args(args);
    let assert = cmd.assert().code(exit_code);
    let pred = predicate::str::contains(needle);
    match stream {
        "stdout" => {
            assert.stdout(pred);
        }
        _ => {
            assert.stderr(pred);
        }
    }
}

#[test]
fn weapons_json_lists_every_profile() {
    let out = recoil().args(["--json", "weapons"]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 7);
    let ak = arr.iter().find(|w| w["id"] == "AK47").unwrap();
    assert_eq!(ak["steps"], 30);
    assert_eq!(ak["timed"], true);
}

#[test]
fn burst_releases_after_requested_writes() {
    let out = recoil()
        .args(["--json", "burst", "--weapon", "MP5", "--release-after", "3"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["weapon"], "MP5");
    assert_eq!(v["stop"], "PrimaryReleased");
    let steps = v["steps"].as_u64().unwrap();
    assert!((3..30).contains(&steps), "steps = {steps}");
    assert_eq!(v["telemetry"]["connected"], true);
}

#[test]
fn burst_counts_injected_faults() {
    let out = recoil()
        .args([
            "--json",
            "burst",
            "--weapon",
            "MP5",
            "--release-after",
            "4",
            "--fail-every",
            "2",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(v["writes_failed"].as_u64().unwrap() >= 2);
    assert!(v["telemetry"]["success_rate"].as_f64().unwrap() < 100.0);
}

#[test]
fn practice_is_reproducible_per_seed() {
    let run = |seed: &str| {
        let out = recoil()
            .args(["--json", "practice", "--weapon", "SKS", "--seed", seed])
            .output()
            .unwrap();
        assert!(out.status.success());
        serde_json::from_slice::<serde_json::Value>(&out.stdout).unwrap()
    };
    let a = run("42");
    let b = run("42");
    assert_eq!(a, b);
    assert_eq!(a["weapon"], "SKS");
    assert!(a["shots"].as_u64().unwrap() > 0);
}

#[test]
fn zero_jitter_scores_top_grade() {
    recoil()
        .args(["practice", "--jitter", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("grade S+"));
}

#[test]
fn config_loadout_is_used() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        r#"
[loadout]
weapon = "THOMPSON"
scope = 2
"#,
    );
    recoil()
        .arg("--config")
        .arg(&cfg)
        .args(["practice", "--jitter", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("practice THOMPSON"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[loadout]\nfov = 200\n");
    recoil()
        .arg("--config")
        .arg(&cfg)
        .arg("weapons")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("loadout.fov"));
}

#[test]
fn wrong_port_fails_health_with_device_code() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[device]\nport = \"COM7\"\n");
    let out = recoil()
        .arg("--config")
        .arg(&cfg)
        .args(["--json", "health"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    // Console logs share stderr; the error object is the last line.
    let stderr = String::from_utf8_lossy(&out.stderr);
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "DeviceUnavailable");
}

#[test]
fn file_log_sink_is_written() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("recoil.log");
    let cfg = write_config(
        &dir,
        &format!(
            "[logging]\nfile = {:?}\nlevel = \"info\"\n",
            log_path.to_string_lossy()
        ),
    );
    recoil()
        .arg("--config")
        .arg(&cfg)
        .arg("health")
        .assert()
        .success();
    let text = fs::read_to_string(&log_path).unwrap();
    assert!(text.contains("Connected to SIM0"), "{text}");
}
