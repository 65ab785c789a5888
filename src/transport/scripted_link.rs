//! A byte link that plays back a script, used to test transports below the device layer.

use std::{
    collections::VecDeque,
    io::{self, ErrorKind, Read, Write},
    thread,
    time::Duration,
};

use super::TimedRead;
use crate::error::Result;

/// What the far end does next.
#[derive(Debug, Clone)]
pub enum Step {
    /// These bytes arrive.
    Bytes(&'static [u8]),
    /// Nothing arrives for this long.
    Delay(Duration),
    /// The next read returns zero bytes.
    Eof,
    /// The next read times out.
    TimedOut,
    /// The next read reports `WouldBlock`.
    WouldBlock,
    /// The next read fails.
    Fail(ErrorKind),
}

/// Things done to the link, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Clear,
    Write(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct ScriptedLink {
    script: VecDeque<Step>,
    /// Bytes that have arrived but were not read yet.
    pending: VecDeque<u8>,
    limit: Option<Duration>,
    limits: Vec<Duration>,
    events: Vec<Event>,
}

impl ScriptedLink {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Bytes already waiting in the receive buffer before the first exchange.
    pub fn with_stale(mut self, stale: &[u8]) -> Self {
        self.pending.extend(stale);
        self
    }

    /// Drop everything that has arrived.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.events.push(Event::Clear);
    }

    /// Every read limit set so far.
    pub fn limits(&self) -> &[Duration] {
        &self.limits
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Bytes still waiting to be read, arrived or scripted.
    pub fn unread(&self) -> Vec<u8> {
        let mut unread: Vec<u8> = self.pending.iter().copied().collect();
        for step in &self.script {
            if let Step::Bytes(bytes) = step {
                unread.extend_from_slice(bytes);
            }
        }
        unread
    }
}

impl TimedRead for ScriptedLink {
    fn limit_next_read(&mut self, limit: Duration) -> Result<()> {
        self.limit = Some(limit);
        self.limits.push(limit);
        Ok(())
    }
}

impl Read for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if !self.pending.is_empty() {
                let n = buf.len().min(self.pending.len());
                for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
                    *slot = byte;
                }
                return Ok(n);
            }
            match self.script.pop_front() {
                Some(Step::Bytes(bytes)) => self.pending.extend(bytes),
                Some(Step::Delay(delay)) => {
                    let limit = self.limit.unwrap_or(Duration::MAX);
                    if delay > limit {
                        // The wait outlasts this read; the rest of it carries over.
                        thread::sleep(limit);
                        self.script.push_front(Step::Delay(delay - limit));
                        return Err(ErrorKind::TimedOut.into());
                    }
                    thread::sleep(delay);
                }
                Some(Step::Eof) => return Ok(0),
                Some(Step::TimedOut) | None => return Err(ErrorKind::TimedOut.into()),
                Some(Step::WouldBlock) => return Err(ErrorKind::WouldBlock.into()),
                Some(Step::Fail(kind)) => return Err(kind.into()),
            }
        }
    }
}

impl Write for ScriptedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.events.last_mut() {
            Some(Event::Write(frame)) => frame.extend_from_slice(buf),
            _ => self.events.push(Event::Write(buf.to_vec())),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_back_script() {
        let mut link = ScriptedLink::new([Step::Bytes(b"AB"), Step::Eof]);
        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"AB");
        assert_eq!(link.read(&mut buf).unwrap(), 0);
        assert_eq!(link.read(&mut buf).unwrap_err().kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn clear_drops_arrived_bytes_only() {
        let mut link = ScriptedLink::new([Step::Bytes(b"OK\r")]).with_stale(b"STALE\r");
        link.clear();
        assert_eq!(link.unread(), b"OK\r");
        assert_eq!(link.events(), [Event::Clear]);
    }
}
