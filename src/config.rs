//! Connection parameters and the defaults used when none are given.

use std::{fmt, time::Duration};

use crate::{
    error::{Error, Result},
    transport::{TcpTransport, Transport},
};

/// Per-exchange response timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Factory default baud rate of the RS-232/RS-485 interface.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Pause required after `ADR` before the next command (manual 7.5.2).
pub const ADDRESS_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Where the supply is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Serial { port: String, baud_rate: u32 },
    /// `host:port`.
    Tcp { address: String },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Serial { port, baud_rate } => write!(f, "{port}@{baud_rate}"),
            Endpoint::Tcp { address } => f.write_str(address),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub endpoint: Endpoint,
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn serial(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            endpoint: Endpoint::Serial {
                port: port.into(),
                baud_rate,
            },
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn tcp(address: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Tcp {
                address: address.into(),
            },
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout in (fractional) seconds. Negative or non-finite values are rejected.
    pub fn with_timeout_secs(self, seconds: f64) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(seconds)
            .map_err(|e| Error::InvalidArgument(format!("timeout {seconds}: {e}")))?;
        Ok(self.with_timeout(timeout))
    }

    /// Open the transport this configuration describes.
    pub fn open(&self) -> Result<Box<dyn Transport + Send>> {
        match &self.endpoint {
            #[cfg(feature = "serial")]
            Endpoint::Serial { port, baud_rate } => Ok(Box::new(
                crate::transport::SerialTransport::open(port, *baud_rate, self.timeout)?,
            )),
            #[cfg(not(feature = "serial"))]
            Endpoint::Serial { port, .. } => Err(Error::Endpoint(format!(
                "{port}: serial support not compiled in"
            ))),
            Endpoint::Tcp { address } => {
                Ok(Box::new(TcpTransport::connect(address, self.timeout)?))
            }
        }
    }
}
