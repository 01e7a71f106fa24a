use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecoilError {
    #[error("device fault: {0}")]
    DeviceFault(String),
    #[error("device write timed out")]
    DeviceTimeout,
    #[error("device not connected")]
    DeviceUnavailable,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown weapon: {0}")]
    UnknownWeapon(String),
    #[error("invalid weapon profile {id}: {reason}")]
    InvalidProfile { id: String, reason: String },
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing device")]
    MissingDevice,
    #[error("empty weapon store")]
    NoWeapons,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
