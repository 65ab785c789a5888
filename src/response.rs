//! Turning raw response frames into typed values.
//!
//! Every decoder takes the frame exactly as the transport returned it,
//! delimiter included. A frame cut short by a timeout never has its
//! delimiter, so it fails here as a protocol error rather than being parsed
//! as a shorter value.

use core::str::FromStr;

use crate::{
    error::{Error, Result},
    frame::strip_delimiter,
    types::StatusSnapshot,
};

/// The only acknowledgement a setting command may receive.
pub const ACK: &[u8] = b"OK\r";

/// Field tags of the `STT?` record, in wire order.
const STATUS_TAGS: [&str; 6] = ["mv", "pv", "mc", "pc", "sr", "fr"];

/// What a command expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Ack,
    Float,
    Integer,
    /// Text, optionally restricted to a fixed set of literals.
    Text(Option<&'static [&'static str]>),
    Status,
}

/// A decoded response, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ack,
    Float(f64),
    Integer(i64),
    Text(String),
    Status(StatusSnapshot),
}

/// Decode `raw` as the kind of response `expect` describes.
pub fn decode(expect: Expect, raw: &[u8]) -> Result<Reply> {
    Ok(match expect {
        Expect::Ack => {
            decode_ack(raw)?;
            Reply::Ack
        }
        Expect::Float => Reply::Float(decode_float(raw)?),
        Expect::Integer => Reply::Integer(decode_int(raw)?),
        Expect::Text(allowed) => Reply::Text(decode_text(raw, allowed)?),
        Expect::Status => Reply::Status(decode_status(raw)?),
    })
}

pub fn decode_ack(raw: &[u8]) -> Result<()> {
    if raw == ACK {
        Ok(())
    } else {
        Err(Error::protocol(raw))
    }
}

pub fn decode_float(raw: &[u8]) -> Result<f64> {
    parse_number(raw)
}

pub fn decode_int(raw: &[u8]) -> Result<i64> {
    parse_number(raw)
}

/// Decode a text response.
///
/// With an allowed set, `raw` must be exactly one of the literals followed by
/// the delimiter. Without one, any non-empty terminated ASCII text passes.
pub fn decode_text(raw: &[u8], allowed: Option<&[&str]>) -> Result<String> {
    let body = strip_delimiter(raw).ok_or_else(|| Error::protocol(raw))?;
    if let Some(allowed) = allowed {
        if !allowed.iter().any(|literal| literal.as_bytes() == body) {
            return Err(Error::protocol(raw));
        }
    }
    if body.is_empty() || !body.is_ascii() {
        return Err(Error::protocol(raw));
    }
    core::str::from_utf8(body)
        .map(str::to_owned)
        .map_err(|_| Error::protocol(raw))
}

/// Decode a text response into one of an enum's literals.
pub fn decode_choice<E>(raw: &[u8]) -> Result<E>
where
    E: FromStr + strum::VariantNames,
{
    decode_text(raw, Some(E::VARIANTS))?
        .parse::<E>()
        .map_err(|_| Error::protocol(raw))
}

/// Decode an `STT?` record.
///
/// Accepts `MV(10.00),PV(10.00),MC(1.00),PC(1.00),SR(1F),FR(0A)`, the same
/// with whitespace instead of parentheses and commas, or the six bare values.
pub fn decode_status(raw: &[u8]) -> Result<StatusSnapshot> {
    parse_status(raw).ok_or_else(|| Error::protocol(raw))
}

fn parse_number<T: FromStr>(raw: &[u8]) -> Result<T> {
    strip_delimiter(raw)
        .and_then(|body| core::str::from_utf8(body).ok())
        .and_then(|text| text.trim().parse().ok())
        .ok_or_else(|| Error::protocol(raw))
}

fn parse_status(raw: &[u8]) -> Option<StatusSnapshot> {
    let text = core::str::from_utf8(strip_delimiter(raw)?).ok()?.to_ascii_lowercase();
    let tokens: Vec<&str> = text
        .split(|c: char| matches!(c, '(' | ')' | ',') || c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .collect();

    let fields: Vec<&str> = match tokens.len() {
        12 => {
            let tags = tokens.iter().step_by(2);
            if !tags.eq(STATUS_TAGS.iter()) {
                return None;
            }
            tokens.iter().skip(1).step_by(2).copied().collect()
        }
        6 if !tokens.iter().any(|t| STATUS_TAGS.contains(t)) => tokens,
        _ => return None,
    };

    Some(StatusSnapshot {
        measured_voltage: fields[0].parse().ok()?,
        set_voltage: fields[1].parse().ok()?,
        measured_current: fields[2].parse().ok()?,
        set_current: fields[3].parse().ok()?,
        status_register: u8::from_str_radix(fields[4], 16).ok()?,
        fault_register: u8::from_str_radix(fields[5], 16).ok()?,
    })
}
