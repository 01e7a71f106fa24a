use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("device not connected")]
    NotConnected,
    #[error("no device on port {0}")]
    NoDevice(String),
    #[error("device write timeout")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
