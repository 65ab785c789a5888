//! Typed values read from and written to the GENESYS PSUs.

use modular_bitfield::prelude::*;
use strum_macros::{EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Used to be less ambiguous and whether something is on or off.
///
/// Sent as `0`/`1`, read back as `OFF`/`ON`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr, VariantNames,
)]
pub enum State {
    /// Disabled.
    #[default]
    #[strum(serialize = "OFF")]
    Off,
    /// Enabled.
    #[strum(serialize = "ON")]
    On,
}

impl State {
    /// Numeric code used when writing this state.
    pub fn code(self) -> u8 {
        match self {
            State::Off => 0,
            State::On => 1,
        }
    }
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// Who the front panel answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr, VariantNames)]
pub enum RemoteMode {
    /// Front panel controls the supply.
    #[strum(serialize = "LOC")]
    Local,
    /// Controlled over the communication interface.
    #[strum(serialize = "REM")]
    Remote,
    /// Remote, with the front panel "LOCAL" button disabled.
    #[strum(serialize = "LLO")]
    LocalLockout,
}

impl RemoteMode {
    /// Numeric code used with `RMT`.
    pub fn code(self) -> u8 {
        match self {
            RemoteMode::Local => 0,
            RemoteMode::Remote => 1,
            RemoteMode::LocalLockout => 2,
        }
    }
}

/// Regulation mode reported by `MODE?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr, VariantNames)]
pub enum OperationMode {
    /// Constant voltage regulation.
    #[strum(serialize = "CV")]
    Cv,
    /// Constant current regulation.
    #[strum(serialize = "CC")]
    Cc,
    /// Output is off.
    #[strum(serialize = "OFF")]
    Off,
}

/// Status condition register, the `SR` field of `STT?`.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    pub constant_voltage: bool,
    pub constant_current: bool,
    pub no_fault: bool,
    pub fault: bool,
    pub auto_restart: bool,
    pub foldback_enabled: bool,
    #[skip]
    __: B1,
    /// Front panel is in local mode.
    pub local_mode: bool,
}

/// Fault condition register, the `FR` field of `STT?`.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultRegister {
    #[skip]
    __: B1,
    pub ac_fail: bool,
    pub over_temperature: bool,
    pub foldback: bool,
    pub over_voltage: bool,
    /// Rear panel shut-off asserted.
    pub shut_off: bool,
    /// Output switched off from the front panel.
    pub output_off: bool,
    /// Rear panel enable is open.
    pub enable_open: bool,
}

/// Complete power supply status as returned by `STT?`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    /// Measured output voltage in volts.
    pub measured_voltage: f64,
    /// Programmed output voltage in volts.
    pub set_voltage: f64,
    /// Measured output current in amps.
    pub measured_current: f64,
    /// Programmed output current in amps.
    pub set_current: f64,
    /// Raw status condition register.
    pub status_register: u8,
    /// Raw fault condition register.
    pub fault_register: u8,
}

impl StatusSnapshot {
    pub fn status(&self) -> StatusRegister {
        StatusRegister::from_bytes([self.status_register])
    }

    pub fn faults(&self) -> FaultRegister {
        FaultRegister::from_bytes([self.fault_register])
    }
}
