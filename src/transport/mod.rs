//! Links a [`GenesysPsu`](crate::psu::GenesysPsu) can talk over.
//!
//! A transport performs one blocking request/response exchange at a time.
//! Before writing it throws away anything left unread from an earlier
//! exchange, then reads until the frame delimiter, end of stream, or the
//! timeout, whichever comes first. A response cut short by the timeout is
//! still returned; deciding it is wrong is the decoder's business.

#[cfg(test)]
mod scripted_link;
#[cfg(feature = "serial")]
mod serial;
mod tcp;

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use std::{
    io::{ErrorKind, Read},
    time::{Duration, Instant},
};

use crate::{error::Result, frame::DELIMITER};

pub trait Transport {
    /// Send one frame and return the raw response, delimiter included.
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>>;

    /// Release the link. Dropping the transport has the same effect; this
    /// only exists so teardown failures can be reported.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        (**self).exchange(frame)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        (**self).exchange(frame)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A byte stream whose blocking reads can be bounded.
pub(crate) trait TimedRead: Read {
    /// Make the next read give up after `limit`.
    fn limit_next_read(&mut self, limit: Duration) -> Result<()>;
}

/// Read byte by byte until the delimiter, a zero-length read, or `timeout`
/// has elapsed in total. Whatever arrived before the deadline is returned.
pub(crate) fn read_frame<R: TimedRead + ?Sized>(link: &mut R, timeout: Duration) -> Result<Vec<u8>> {
    let deadline = Instant::now() + timeout;
    let mut response = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        link.limit_next_read(remaining)?;
        match link.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                response.push(byte[0]);
                if byte[0] == DELIMITER {
                    break;
                }
            }
            // Timeouts surface as WouldBlock on Unix sockets and TimedOut elsewhere.
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(response)
}
