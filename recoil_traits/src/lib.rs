pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type surfaced by device collaborators at the trait boundary.
pub type DeviceError = Box<dyn std::error::Error + Send + Sync>;
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Physical buttons reported by the injection device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Fire button; drives playback.
    Primary,
    /// Aim button; while held it vetoes new bursts.
    Secondary,
    Middle,
}

/// Button edge callback: `(button, is_pressed)`.
pub type ButtonCallback = Box<dyn Fn(MouseButton, bool) + Send + Sync>;

/// Relative-movement injection device.
///
/// Implementations are shared between the playback task and the health
/// monitor, so every method takes `&self` and the driver synchronises
/// internally. Callers never hold their own locks across these calls.
pub trait MouseDevice: Send + Sync {
    /// Ports with an attached device, in discovery order.
    fn list_ports(&self) -> Vec<String> {
        Vec::new()
    }
    fn connect(&self, port: &str) -> DeviceResult<bool>;
    fn disconnect(&self);
    fn move_relative(&self, dx: i32, dy: i32) -> DeviceResult<()>;
    fn move_relative_smoothed(&self, dx: i32, dy: i32, smoothing: u8) -> DeviceResult<()>;
    /// Lightweight identity/version query used as a keep-alive probe.
    fn query_identity(&self) -> DeviceResult<String>;
    fn set_button_callback(&self, callback: ButtonCallback);
}
