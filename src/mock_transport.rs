//! We use this mocking module in unit tests to emulate a supply on the other end of a link.

use std::{collections::VecDeque, time::Instant};

use crate::{error::Result, transport::Transport};

/// Our mock type used to emulate a transport.
#[derive(Default)]
pub struct MockTransport {
    /// Frames written to the mock, in order.
    written: Vec<Vec<u8>>,
    /// When each exchange started.
    started_at: Vec<Instant>,
    /// Canned responses, one per exchange. Exhausted means timed out.
    responses: VecDeque<Vec<u8>>,
    /// Flag to simulate a dead link
    should_error: bool,
    closed: bool,
}

impl Transport for MockTransport {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        if self.should_error {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }
        assert!(!self.closed, "exchange after close");
        self.started_at.push(Instant::now());
        self.written.push(frame.to_vec());
        Ok(self.responses.pop_front().unwrap_or_default())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response to the next unanswered exchange.
    pub fn respond(&mut self, response: &[u8]) -> &mut Self {
        self.responses.push_back(response.to_vec());
        self
    }

    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    pub fn last_written(&self) -> Option<&[u8]> {
        self.written.last().map(Vec::as_slice)
    }

    pub fn started_at(&self) -> &[Instant] {
        &self.started_at
    }

    pub fn set_error(&mut self, should_error: bool) {
        self.should_error = should_error;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn responses_are_served_in_order() {
        let mut mock = MockTransport::new();
        mock.respond(b"OK\r").respond(b"1.0\r");

        assert_eq!(mock.exchange(b"PV 1\r").unwrap(), b"OK\r");
        assert_eq!(mock.exchange(b"PV?\r").unwrap(), b"1.0\r");
        assert_eq!(mock.written(), [b"PV 1\r".to_vec(), b"PV?\r".to_vec()]);
        assert_eq!(mock.started_at().len(), 2);
    }

    #[test]
    fn exhausted_responses_look_like_a_timeout() {
        let mut mock = MockTransport::new();
        assert!(mock.exchange(b"IDN?\r").unwrap().is_empty());
    }

    #[test]
    fn error_simulation() {
        let mut mock = MockTransport::new();
        mock.set_error(true);
        assert!(matches!(mock.exchange(b"IDN?\r"), Err(Error::Io(_))));
        assert!(mock.written().is_empty());
    }
}
