//! Maps `Box<dyn Error>` from the device boundary to a typed `RecoilError`.
//!
//! `recoil_traits::MouseDevice` returns boxed errors so any vendor driver can
//! plug in; this module narrows them for telemetry and the event log, with an
//! optional feature-gated path for `recoil_hardware::HwError` downcasting.

use crate::error::RecoilError;

/// Map a device-boundary error to a typed `RecoilError`.
///
/// Known hardware error types are downcast first, then string heuristics apply.
pub fn map_device_fault(e: &(dyn std::error::Error + 'static)) -> RecoilError {
    #[cfg(feature = "hardware-errors")]
    {
        use recoil_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => RecoilError::DeviceTimeout,
                HwError::NotConnected => RecoilError::DeviceUnavailable,
                other => RecoilError::DeviceFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        RecoilError::DeviceTimeout
    } else if lower.contains("not connected") {
        RecoilError::DeviceUnavailable
    } else {
        RecoilError::DeviceFault(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_heuristics_cover_untyped_drivers() {
        let e: Box<dyn std::error::Error + Send + Sync> = "serial timeout".into();
        assert_eq!(map_device_fault(e.as_ref()), RecoilError::DeviceTimeout);
        let e: Box<dyn std::error::Error + Send + Sync> = "port busy".into();
        assert_eq!(
            map_device_fault(e.as_ref()),
            RecoilError::DeviceFault("port busy".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use recoil_hardware::error::HwError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::NotConnected);
        assert_eq!(map_device_fault(e.as_ref()), RecoilError::DeviceUnavailable);
        let e: Box<dyn std::error::Error + Send + Sync> =
            Box::new(HwError::Transport("crc".into()));
        assert_eq!(
            map_device_fault(e.as_ref()),
            RecoilError::DeviceFault("transport error: crc".into())
        );
    }
}
