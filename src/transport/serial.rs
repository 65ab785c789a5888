use std::{fmt, io::Write, time::Duration};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::{TimedRead, Transport, read_frame};
use crate::error::Result;

/// What an exchange needs from a serial port.
trait Port: TimedRead + Write {
    /// Discard unread input and unsent output.
    fn clear_buffers(&mut self) -> Result<()>;
}

impl TimedRead for Box<dyn SerialPort> {
    fn limit_next_read(&mut self, limit: Duration) -> Result<()> {
        Ok((**self).set_timeout(limit)?)
    }
}

impl Port for Box<dyn SerialPort> {
    fn clear_buffers(&mut self) -> Result<()> {
        Ok((**self).clear(ClearBuffer::All)?)
    }
}

/// RS-232/RS-485 link, 8N1 without flow control.
///
/// The port is released when the transport is dropped.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()?;
        tracing::info!(port = port_name, baud_rate, "serial port opened");

        Ok(Self {
            port,
            port_name: port_name.to_owned(),
            baud_rate,
            timeout,
        })
    }
}

/// Clear both buffers, send `frame` and read the response.
fn exchange_on<P: Port + ?Sized>(port: &mut P, frame: &[u8], timeout: Duration) -> Result<Vec<u8>> {
    port.clear_buffers()?;
    port.write_all(frame)?;
    port.flush()?;
    read_frame(port, timeout)
}

impl Transport for SerialTransport {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        exchange_on(&mut self.port, frame, self.timeout)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        tracing::info!(port = %self.port_name, "serial port closed");
    }
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port_name)
            .field("baud_rate", &self.baud_rate)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        transport::scripted_link::{Event, ScriptedLink, Step},
    };
    use std::io::{ErrorKind, Read};

    const TIMEOUT: Duration = Duration::from_millis(500);

    impl Port for ScriptedLink {
        fn clear_buffers(&mut self) -> Result<()> {
            self.clear();
            Ok(())
        }
    }

    #[test]
    fn buffers_are_cleared_before_writing() {
        let mut link = ScriptedLink::new([Step::Bytes(b"OK\r")]).with_stale(b"E04\r");
        assert_eq!(exchange_on(&mut link, b"PV 10\r", TIMEOUT).unwrap(), b"OK\r");
        assert_eq!(link.events(), [Event::Clear, Event::Write(b"PV 10\r".to_vec())]);
    }

    #[test]
    fn response_ends_at_first_delimiter() {
        let mut link = ScriptedLink::new([Step::Bytes(b"12.500\rJUNK")]);
        assert_eq!(exchange_on(&mut link, b"PV?\r", TIMEOUT).unwrap(), b"12.500\r");
        assert_eq!(link.unread(), b"JUNK");
    }

    #[test]
    fn timeout_returns_what_arrived() {
        let mut link = ScriptedLink::new([Step::Bytes(b"LAMBDA,GEN"), Step::TimedOut]);
        assert_eq!(exchange_on(&mut link, b"IDN?\r", TIMEOUT).unwrap(), b"LAMBDA,GEN");

        let mut link = ScriptedLink::new([Step::Delay(Duration::from_millis(80))]);
        let timeout = Duration::from_millis(30);
        assert!(exchange_on(&mut link, b"IDN?\r", timeout).unwrap().is_empty());
        assert!(link.limits().iter().all(|limit| *limit <= timeout));
    }

    #[test]
    fn zero_length_read_ends_response() {
        let mut link = ScriptedLink::new([Step::Bytes(b"1.0"), Step::Eof, Step::Bytes(b"0\r")]);
        assert_eq!(exchange_on(&mut link, b"MV?\r", TIMEOUT).unwrap(), b"1.0");
    }

    #[test]
    fn read_failure_is_an_error() {
        let mut link = ScriptedLink::new([Step::Fail(ErrorKind::BrokenPipe)]);
        assert!(matches!(exchange_on(&mut link, b"MC?\r", TIMEOUT), Err(Error::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn close_leaves_port_open_until_drop() {
        let (master, mut slave) = serialport::TTYPort::pair().unwrap();
        let mut transport = SerialTransport {
            port: Box::new(master),
            port_name: "pty".to_owned(),
            baud_rate: 9600,
            timeout: TIMEOUT,
        };
        transport.close().unwrap();

        transport.port.write_all(b"OUT?\n").unwrap();
        slave.set_timeout(TIMEOUT).unwrap();
        let mut received = [0u8; 4];
        slave.read_exact(&mut received).unwrap();
        assert_eq!(&received, b"OUT?");
    }
}
