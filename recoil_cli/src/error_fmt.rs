//! Human-readable error descriptions and structured JSON error formatting.

use recoil_core::error::{BuildError, RecoilError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDevice => {
                "What happened: No device was provided to the engine.\nLikely causes: The device backend failed to initialize.\nHow to fix: Pass a device via with_device(...).".to_string()
            }
            BuildError::NoWeapons => {
                "What happened: The weapon table is empty.\nLikely causes: A custom weapon store was built without profiles.\nHow to fix: Use the built-in table or add at least one profile.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range [monitor] or [playback] values.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RecoilError>() {
        return match re {
            RecoilError::UnknownWeapon(id) => format!(
                "What happened: Unknown weapon '{id}'.\nLikely causes: Typo in --weapon or [loadout].weapon.\nHow to fix: Run `recoil weapons` to list valid ids."
            ),
            RecoilError::DeviceUnavailable => {
                "What happened: No device is connected.\nLikely causes: Wrong [device].port or the device is unplugged.\nHow to fix: Remove [device].port to auto-detect, or check the cable.".to_string()
            }
            RecoilError::DeviceTimeout => {
                "What happened: The device did not answer in time.\nLikely causes: Busy or stalled serial link.\nHow to fix: Reconnect the device and retry.".to_string()
            }
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Config loading reports plain messages
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if lower.starts_with("read config") || lower.starts_with("parse config") {
        return format!(
            "What happened: Could not load the config file.\nHow to fix: Check the path and TOML syntax. Original: {msg}"
        );
    }
    if lower.starts_with("loadout.")
        || lower.starts_with("monitor.")
        || lower.starts_with("playback.")
        || lower.starts_with("logging.")
    {
        return format!(
            "What happened: Invalid configuration ({msg}).\nHow to fix: Edit the config file, then rerun."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for device problems, 4 for bad input, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(re) = err.downcast_ref::<RecoilError>() {
        return match re {
            RecoilError::DeviceUnavailable
            | RecoilError::DeviceTimeout
            | RecoilError::DeviceFault(_) => 3,
            RecoilError::UnknownWeapon(_)
            | RecoilError::Config(_)
            | RecoilError::InvalidProfile { .. } => 4,
            RecoilError::State(_) => 1,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    1
}

/// Stable machine-readable tag for the error kind.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<RecoilError>() {
        Some(RecoilError::DeviceFault(_)) => "DeviceFault",
        Some(RecoilError::DeviceTimeout) => "DeviceTimeout",
        Some(RecoilError::DeviceUnavailable) => "DeviceUnavailable",
        Some(RecoilError::Config(_)) => "Config",
        Some(RecoilError::UnknownWeapon(_)) => "UnknownWeapon",
        Some(RecoilError::InvalidProfile { .. }) => "InvalidProfile",
        Some(RecoilError::State(_)) => "State",
        None if err.downcast_ref::<BuildError>().is_some() => "Build",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
