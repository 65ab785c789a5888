use std::{
    fmt,
    io::{ErrorKind, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use super::{TimedRead, Transport, read_frame};
use crate::error::{Error, Result};

/// Network link to a supply behind a LAN interface or serial server.
pub struct TcpTransport {
    stream: TcpStream,
    address: String,
    timeout: Duration,
}

impl TcpTransport {
    /// Connect to `address`, given as `host:port`.
    ///
    /// Every resolved address is tried in turn, each with `timeout` as the
    /// connect timeout.
    pub fn connect(address: &str, timeout: Duration) -> Result<Self> {
        let addrs = resolve(address)?;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Self::from_stream(stream, address, timeout),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err
            .map(Error::from)
            .unwrap_or_else(|| Error::Endpoint(format!("{address}: no addresses"))))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, address: &str, timeout: Duration) -> Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(timeout))?;
        tracing::info!(address, "tcp connection opened");
        Ok(Self {
            stream,
            address: address.to_owned(),
            timeout,
        })
    }

    /// Throw away whatever is already sitting in the receive buffer.
    ///
    /// Best effort: a byte arriving while this runs may survive it.
    fn drain(&mut self) -> Result<()> {
        self.stream.set_nonblocking(true)?;
        let mut buf = [0u8; 64];
        let result = loop {
            match self.stream.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => tracing::trace!(stale = %buf[..n].escape_ascii(), "discarded"),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        self.stream.set_nonblocking(false)?;
        Ok(result?)
    }
}

impl TimedRead for TcpStream {
    fn limit_next_read(&mut self, limit: Duration) -> Result<()> {
        Ok(self.set_read_timeout(Some(limit))?)
    }
}

impl Transport for TcpTransport {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        self.drain()?;
        self.stream.write_all(frame)?;
        read_frame(&mut self.stream, self.timeout)
    }

    fn close(&mut self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => return Err(e.into()),
            _ => {}
        }
        tracing::info!(address = %self.address, "tcp connection closed");
        Ok(())
    }
}

impl fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpTransport")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn resolve(address: &str) -> Result<Vec<SocketAddr>> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| Error::Endpoint(format!("{address}: expected host:port")))?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(Error::Endpoint(format!("{address}: expected host:port")));
    }
    let addrs = address
        .to_socket_addrs()
        .map_err(|e| Error::Endpoint(format!("{address}: {e}")))?;
    Ok(addrs.collect())
}
