//! Test and helper mocks for recoil_core

use recoil_traits::{ButtonCallback, DeviceResult, MouseDevice};

/// A device with no ports that refuses every connection; the engine runs in
/// demo mode on top of it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDevice;

impl MouseDevice for NullDevice {
    fn connect(&self, _port: &str) -> DeviceResult<bool> {
        Ok(false)
    }

    fn disconnect(&self) {}

    fn move_relative(&self, _dx: i32, _dy: i32) -> DeviceResult<()> {
        Err(Box::new(std::io::Error::other("not connected")))
    }

    fn move_relative_smoothed(&self, _dx: i32, _dy: i32, _smoothing: u8) -> DeviceResult<()> {
        Err(Box::new(std::io::Error::other("not connected")))
    }

    fn query_identity(&self) -> DeviceResult<String> {
        Err(Box::new(std::io::Error::other("not connected")))
    }

    fn set_button_callback(&self, _callback: ButtonCallback) {}
}
