//! Our error types for the GENESYS PSUs.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for GENESYS PSU communications.
#[derive(Error, Debug)]
pub enum Error {
    /// The response did not have the shape the command expects.
    #[error("Unexpected response: \"{}\"", .raw.escape_ascii())]
    Protocol { raw: Vec<u8> },
    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
    #[error("Device address {0} out of range (0-30)")]
    InvalidAddress(u8),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn protocol(raw: &[u8]) -> Self {
        tracing::warn!(raw = %raw.escape_ascii(), "protocol error");
        Error::Protocol { raw: raw.to_vec() }
    }

    /// Raw response bytes, when this is a protocol error.
    pub fn raw_response(&self) -> Option<&[u8]> {
        match self {
            Error::Protocol { raw } => Some(raw),
            _ => None,
        }
    }
}
