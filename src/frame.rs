//! Building outbound ASCII frames and handing back inbound ones.
//!
//! An outbound frame is `TOKEN[ VALUE]\r`. Inbound frames are passed through
//! untouched; interpreting them is [`crate::response`]'s job.

use core::fmt;

use crate::error::{Error, Result};

/// Every frame, in both directions, ends with a carriage return.
pub const DELIMITER: u8 = b'\r';

/// An argument sent after a command token.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value.into())
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

/// Build the wire frame for `token` with an optional argument.
///
/// The token is upper-cased. Numeric values use default formatting, so
/// `10.0` goes out as `10` and `3.25` as `3.25`.
pub fn encode(token: &str, value: Option<&Value>) -> Result<Vec<u8>> {
    let mut frame = token.to_ascii_uppercase();
    if let Some(value) = value {
        frame.push(' ');
        frame.push_str(&value.to_string());
    }
    if !frame.is_ascii() || frame.bytes().any(|b| b == DELIMITER) {
        return Err(Error::InvalidArgument(frame.escape_default().to_string()));
    }
    let mut bytes = frame.into_bytes();
    bytes.push(DELIMITER);
    Ok(bytes)
}

/// Return the payload of an inbound frame.
///
/// The delimiter is left in place so the decoder can tell a complete frame
/// from one cut short by a timeout.
pub fn decode(raw: Vec<u8>) -> Vec<u8> {
    raw
}

/// Strip one trailing delimiter, or `None` when the frame was never terminated.
pub fn strip_delimiter(raw: &[u8]) -> Option<&[u8]> {
    raw.strip_suffix(&[DELIMITER])
}
