//! This module is used to define the commands understood by the GENESYS PSUs.
//!
//! Setting commands answer `OK`; queries end in `?` and answer with a value.
use strum::VariantNames;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::{
    response::Expect,
    types::{OperationMode, RemoteMode, State},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Command {
    // Initialization control.
    /// Select the supply at address 0-30. Followed by a settle delay.
    #[strum(serialize = "ADR")]
    Address,
    /// Clear status. Sets FEVE and SEVE registers to zero.
    #[strum(serialize = "CLS")]
    ClearStatus,
    /// Bring the supply to a safe and known state.
    #[strum(serialize = "RST")]
    Reset,
    /// `0` local, `1` remote, `2` local lockout.
    #[strum(serialize = "RMT")]
    RemoteMode,
    #[strum(serialize = "RMT?")]
    RemoteModeQuery,
    /// `1` if the multi-drop option is installed.
    #[strum(serialize = "MDAV?")]
    MultiDropQuery,
    /// Master: 1-4. Slave: 0.
    #[strum(serialize = "MS?")]
    MasterSlaveQuery,

    // Identification.
    #[strum(serialize = "IDN?")]
    IdentificationQuery,
    #[strum(serialize = "REV?")]
    RevisionQuery,
    /// Up to 12 characters.
    #[strum(serialize = "SN?")]
    SerialNumberQuery,
    /// `yyyy/mm/dd`.
    #[strum(serialize = "DATE?")]
    TestDateQuery,

    // Output control.
    /// Output voltage setting in volts.
    #[strum(serialize = "PV")]
    Voltage,
    #[strum(serialize = "PV?")]
    VoltageQuery,
    /// Measured output voltage.
    #[strum(serialize = "MV?")]
    MeasuredVoltageQuery,
    /// Output current setting in amps.
    #[strum(serialize = "PC")]
    Current,
    #[strum(serialize = "PC?")]
    CurrentQuery,
    /// Measured output current.
    #[strum(serialize = "MC?")]
    MeasuredCurrentQuery,
    #[strum(serialize = "MODE?")]
    OperationModeQuery,
    /// Comma separated voltage and current display data.
    #[strum(serialize = "DVC?")]
    DisplayQuery,
    /// Complete status record.
    #[strum(serialize = "STT?")]
    StatusQuery,
    /// A to D converter low pass filter, 18, 23 or 46 Hz.
    #[strum(serialize = "FILTER")]
    Filter,
    #[strum(serialize = "FILTER?")]
    FilterQuery,
    #[strum(serialize = "OUT")]
    Output,
    #[strum(serialize = "OUT?")]
    OutputQuery,

    // Protection.
    #[strum(serialize = "FLD")]
    Foldback,
    #[strum(serialize = "FLD?")]
    FoldbackQuery,
    /// Extra foldback delay in units of 0.1 s, 0-255.
    #[strum(serialize = "FBD")]
    FoldbackDelay,
    #[strum(serialize = "FBD?")]
    FoldbackDelayQuery,
    /// Back to the standard 250 ms foldback delay.
    #[strum(serialize = "FBDRST")]
    FoldbackDelayReset,
    #[strum(serialize = "OVP")]
    OverVoltage,
    #[strum(serialize = "OVP?")]
    OverVoltageQuery,
    /// OVP level to its maximum.
    #[strum(serialize = "OVM")]
    OverVoltageMaximum,
    #[strum(serialize = "UVL")]
    UnderVoltageLimit,
    #[strum(serialize = "UVL?")]
    UnderVoltageLimitQuery,
    #[strum(serialize = "AST")]
    AutoRestart,
    #[strum(serialize = "AST?")]
    AutoRestartQuery,

    // Persistence.
    /// Store present settings as the power-on "last settings".
    #[strum(serialize = "SAV")]
    Save,
    #[strum(serialize = "RCL")]
    Recall,
}

impl Command {
    /// The token as sent on the wire.
    pub fn token(self) -> &'static str {
        self.into()
    }

    pub fn is_query(self) -> bool {
        self.token().ends_with('?')
    }

    /// The response this command must receive.
    pub fn expects(self) -> Expect {
        use Command as C;
        match self {
            C::RemoteModeQuery => Expect::Text(Some(RemoteMode::VARIANTS)),
            C::OperationModeQuery => Expect::Text(Some(OperationMode::VARIANTS)),
            C::OutputQuery | C::FoldbackQuery | C::AutoRestartQuery => {
                Expect::Text(Some(State::VARIANTS))
            }
            C::IdentificationQuery
            | C::RevisionQuery
            | C::SerialNumberQuery
            | C::TestDateQuery
            | C::DisplayQuery => Expect::Text(None),
            C::StatusQuery => Expect::Status,
            C::VoltageQuery
            | C::MeasuredVoltageQuery
            | C::CurrentQuery
            | C::MeasuredCurrentQuery
            | C::OverVoltageQuery
            | C::UnderVoltageLimitQuery => Expect::Float,
            C::MultiDropQuery | C::MasterSlaveQuery | C::FilterQuery | C::FoldbackDelayQuery => {
                Expect::Integer
            }
            _ => Expect::Ack,
        }
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn tokens_are_unique_upper_case_ascii() {
        let tokens: Vec<&str> = Command::iter().map(Command::token).collect();
        for token in &tokens {
            assert!(token.is_ascii());
            assert_eq!(*token, token.to_ascii_uppercase());
            assert!(!token.contains(' '));
        }
        let mut deduped = tokens.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), tokens.len());
    }

    #[test]
    fn only_setters_expect_acknowledgement() {
        for command in Command::iter() {
            assert_eq!(
                command.expects() == Expect::Ack,
                !command.is_query(),
                "{command}"
            );
        }
    }

    #[test]
    fn catalog_size() {
        assert_eq!(Command::iter().count(), 38);
    }

    #[test]
    fn enumerated_queries_carry_their_literals() {
        assert_eq!(
            Command::RemoteModeQuery.expects(),
            Expect::Text(Some(&["LOC", "REM", "LLO"][..]))
        );
        assert_eq!(
            Command::OutputQuery.expects(),
            Expect::Text(Some(&["OFF", "ON"][..]))
        );
        assert_eq!(Command::StatusQuery.expects(), Expect::Status);
        assert_eq!(Command::FoldbackDelayQuery.expects(), Expect::Integer);
    }
}
