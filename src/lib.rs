//! This crate provides an interface for communicating with and controlling TDK-Lambda GENESYS programmable DC power
//! supplies.
//!
//! It speaks the supply's line-oriented ASCII command language: `TOKEN[ VALUE]\r` out, one `\r` terminated
//! response back. Setting commands are acknowledged with `OK`, queries return a float, an integer, one of a fixed
//! set of literals, or the `STT?` status record.
//!
//! Supported links:
//! * RS-232/RS-485 through [`transport::SerialTransport`] (`serial` feature, on by default)
//! * TCP through [`transport::TcpTransport`], e.g. the LAN option or a serial device server
//!
//! The serial port used for PSU comms is configured like so:
//! * Default baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! ```no_run
//! use genesys_psu::{config::ConnectionConfig, psu::GenesysPsu, types::State};
//!
//! # fn main() -> genesys_psu::error::Result<()> {
//! let mut psu = GenesysPsu::open(&ConnectionConfig::tcp("192.168.0.20:8003"))?;
//! psu.select_address(6)?;
//! psu.set_voltage(12.0)?;
//! psu.set_output(State::On)?;
//! println!("{:?}", psu.get_power_status()?);
//! psu.close()
//! # }
//! ```
//!
//! Frames sent and received are logged through `tracing` at debug level.

pub mod command;
pub mod config;
pub mod error;
pub mod frame;
pub mod psu;
pub mod response;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_transport;
