use std::time::Instant;

use crate::{
    command::Command,
    config::{ADDRESS_SETTLE_DELAY, ConnectionConfig},
    error::{Error, Result},
    frame::{self, Value},
    response::{self, Reply},
    transport::Transport,
    types::{OperationMode, RemoteMode, State, StatusSnapshot},
};

/// Highest address a supply on a multi-drop bus can have.
pub const MAX_ADDRESS: u8 = 30;

/// You can create a GenesysPsu over anything which implements [Transport].
///
/// For its methods, we generally use the nomenclature that "set" means to write a configuration and "get" means to read
/// back a configuration value. `_actual` getters return measured values.
///
/// Nothing about the device is cached: every getter asks the supply.
pub struct GenesysPsu<T: Transport> {
    transport: T,
    /// No exchange may start before this instant (set by `ADR`).
    settle_until: Option<Instant>,
}

impl GenesysPsu<Box<dyn Transport + Send>> {
    /// Open the link described by `config`.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::new(config.open()?))
    }
}

impl<T: Transport> GenesysPsu<T> {
    /// Create a new GenesysPsu instance owning the given transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            settle_until: None,
        }
    }

    /// Close the link. Dropping the client also releases it, without reporting errors.
    pub fn close(mut self) -> Result<()> {
        self.transport.close()
    }

    /// Give the transport back without closing it.
    ///
    /// Blocks until a pending address settle delay has passed, so the transport is ready for the next command.
    pub fn into_inner(mut self) -> T {
        self.settle();
        self.transport
    }

    // Initialization control.

    /// Address the supply at `address` (0-30). The next command waits out the settle delay.
    pub fn select_address(&mut self, address: u8) -> Result<()> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }
        let result = self.set(Command::Address, address);
        self.settle_until = Some(Instant::now() + ADDRESS_SETTLE_DELAY);
        result
    }

    /// Clear status. Sets FEVE and SEVE registers to zero.
    pub fn clear_status(&mut self) -> Result<()> {
        self.command(Command::ClearStatus)
    }

    /// Bring the power supply to a safe and known state.
    pub fn reset(&mut self) -> Result<()> {
        self.command(Command::Reset)
    }

    /// Select local, remote or local lockout operation.
    pub fn set_remote_mode(&mut self, mode: RemoteMode) -> Result<()> {
        self.set(Command::RemoteMode, mode.code())
    }

    /// Read back the remote mode.
    pub fn get_remote_mode(&mut self) -> Result<RemoteMode> {
        self.query_choice(Command::RemoteModeQuery)
    }

    /// Whether the multi-drop option is installed.
    pub fn get_multi_drop(&mut self) -> Result<bool> {
        let raw = self.send(Command::MultiDropQuery, None)?;
        match response::decode_int(&raw)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::protocol(&raw)),
        }
    }

    /// Master/slave setting. Master: 1, 2, 3, 4. Slave: 0.
    pub fn get_master_slave(&mut self) -> Result<u8> {
        self.query_int(Command::MasterSlaveQuery)
    }

    // Identification.

    /// Model identification, e.g. `LAMBDA,GEN6-100`.
    pub fn get_model_identification(&mut self) -> Result<String> {
        self.query_text(Command::IdentificationQuery)
    }

    /// Software revision, e.g. `1U:4.1`.
    pub fn get_software_version(&mut self) -> Result<String> {
        self.query_text(Command::RevisionQuery)
    }

    /// Unit serial number.
    pub fn get_serial_number(&mut self) -> Result<String> {
        self.query_text(Command::SerialNumberQuery)
    }

    /// Date of last test, `yyyy/mm/dd`.
    pub fn get_test_date(&mut self) -> Result<String> {
        self.query_text(Command::TestDateQuery)
    }

    // Output control.

    /// Set the output voltage in volts.
    pub fn set_voltage(&mut self, volts: f64) -> Result<()> {
        self.set(Command::Voltage, volts)
    }

    /// Read back the output voltage setting.
    pub fn get_voltage(&mut self) -> Result<f64> {
        self.query_float(Command::VoltageQuery)
    }

    /// Read the measured output voltage.
    pub fn get_voltage_actual(&mut self) -> Result<f64> {
        self.query_float(Command::MeasuredVoltageQuery)
    }

    /// Set the output current in amps.
    pub fn set_current(&mut self, amps: f64) -> Result<()> {
        self.set(Command::Current, amps)
    }

    /// Read back the output current setting.
    pub fn get_current(&mut self) -> Result<f64> {
        self.query_float(Command::CurrentQuery)
    }

    /// Read the measured output current.
    pub fn get_current_actual(&mut self) -> Result<f64> {
        self.query_float(Command::MeasuredCurrentQuery)
    }

    /// Whether the supply is in constant voltage, constant current or off.
    pub fn get_operation_mode(&mut self) -> Result<OperationMode> {
        self.query_choice(Command::OperationModeQuery)
    }

    /// Voltage and current display data, comma separated, as sent by the supply.
    pub fn get_voltage_and_current(&mut self) -> Result<String> {
        self.query_text(Command::DisplayQuery)
    }

    /// Read the complete power supply status.
    pub fn get_power_status(&mut self) -> Result<StatusSnapshot> {
        let raw = self.send(Command::StatusQuery, None)?;
        response::decode_status(&raw)
    }

    /// Set the A to D converter filter frequency. The supply accepts 18, 23 or 46 Hz.
    pub fn set_filter(&mut self, hz: u16) -> Result<()> {
        self.set(Command::Filter, hz)
    }

    /// Read back the A to D converter filter frequency.
    pub fn get_filter(&mut self) -> Result<u16> {
        self.query_int(Command::FilterQuery)
    }

    /// Turn the output on or off.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<()> {
        self.set(Command::Output, state.into().code())
    }

    /// Read back the output state.
    pub fn get_output(&mut self) -> Result<State> {
        self.query_choice(Command::OutputQuery)
    }

    // Protection.

    /// Arm or release foldback protection.
    pub fn set_foldback_protection(&mut self, state: impl Into<State>) -> Result<()> {
        self.set(Command::Foldback, state.into().code())
    }

    /// Read back the foldback protection state.
    pub fn get_foldback_protection(&mut self) -> Result<State> {
        self.query_choice(Command::FoldbackQuery)
    }

    /// Add `tenths` x 0.1 s to the standard 250 ms foldback delay (0 to 25.5 s).
    pub fn set_foldback_delay(&mut self, tenths: u8) -> Result<()> {
        self.set(Command::FoldbackDelay, tenths)
    }

    /// Read back the added foldback delay, in 0.1 s steps.
    pub fn get_foldback_delay(&mut self) -> Result<u8> {
        self.query_int(Command::FoldbackDelayQuery)
    }

    /// Restore the standard 250 ms foldback delay.
    pub fn reset_foldback_delay(&mut self) -> Result<()> {
        self.command(Command::FoldbackDelayReset)
    }

    /// Set the OVP level in volts.
    pub fn set_over_voltage_protection_level(&mut self, volts: f64) -> Result<()> {
        self.set(Command::OverVoltage, volts)
    }

    /// Read back the OVP level in volts.
    pub fn get_over_voltage_protection_level(&mut self) -> Result<f64> {
        self.query_float(Command::OverVoltageQuery)
    }

    /// Set the OVP level to the maximum the model allows.
    pub fn set_over_voltage_protection_maximum(&mut self) -> Result<()> {
        self.command(Command::OverVoltageMaximum)
    }

    /// Set the under voltage limit in volts.
    pub fn set_under_voltage_limit(&mut self, volts: f64) -> Result<()> {
        self.set(Command::UnderVoltageLimit, volts)
    }

    /// Read back the under voltage limit in volts.
    pub fn get_under_voltage_limit(&mut self) -> Result<f64> {
        self.query_float(Command::UnderVoltageLimitQuery)
    }

    /// Whether the output returns to its last state after an AC power cycle.
    pub fn set_autorestart_mode(&mut self, state: impl Into<State>) -> Result<()> {
        self.set(Command::AutoRestart, state.into().code())
    }

    /// Read back the auto-restart mode.
    pub fn get_autorestart_mode(&mut self) -> Result<State> {
        self.query_choice(Command::AutoRestartQuery)
    }

    // Persistence.

    /// Save present settings. They are restored at the next power-up.
    pub fn save_settings(&mut self) -> Result<()> {
        self.command(Command::Save)
    }

    /// Restore the settings stored by the last save.
    pub fn recall_settings(&mut self) -> Result<()> {
        self.command(Command::Recall)
    }

    /// Run any catalog command and decode its reply as the command declares.
    pub fn execute(&mut self, command: Command, value: Option<Value>) -> Result<Reply> {
        if command == Command::Address {
            let Some(Value::Int(address)) = value else {
                return Err(Error::InvalidArgument(format!("{command} needs an integer address")));
            };
            let address = u8::try_from(address)
                .map_err(|_| Error::InvalidArgument(format!("{command} {address}")))?;
            return self.select_address(address).map(|()| Reply::Ack);
        }
        let raw = self.send(command, value.as_ref())?;
        response::decode(command.expects(), &raw)
    }

    /// Encode, exchange and return the raw response.
    fn send(&mut self, command: Command, value: Option<&Value>) -> Result<Vec<u8>> {
        let packet = frame::encode(command.token(), value)?;

        self.settle();

        tracing::debug!(%command, frame = %packet.escape_ascii(), "send");
        let answer = frame::decode(self.transport.exchange(&packet)?);
        tracing::debug!(%command, frame = %answer.escape_ascii(), "recv");
        Ok(answer)
    }

    /// Wait out whatever is left of the delay after `ADR`.
    fn settle(&mut self) {
        if let Some(until) = self.settle_until.take() {
            let now = Instant::now();
            if until > now {
                std::thread::sleep(until - now);
            }
        }
    }

    fn command(&mut self, command: Command) -> Result<()> {
        let raw = self.send(command, None)?;
        response::decode_ack(&raw)
    }

    fn set(&mut self, command: Command, value: impl Into<Value>) -> Result<()> {
        let raw = self.send(command, Some(&value.into()))?;
        response::decode_ack(&raw)
    }

    fn query_float(&mut self, command: Command) -> Result<f64> {
        let raw = self.send(command, None)?;
        response::decode_float(&raw)
    }

    /// Integer query, range checked against the target type.
    fn query_int<I: TryFrom<i64>>(&mut self, command: Command) -> Result<I> {
        let raw = self.send(command, None)?;
        I::try_from(response::decode_int(&raw)?).map_err(|_| Error::protocol(&raw))
    }

    fn query_text(&mut self, command: Command) -> Result<String> {
        let raw = self.send(command, None)?;
        response::decode_text(&raw, None)
    }

    fn query_choice<E>(&mut self, command: Command) -> Result<E>
    where
        E: core::str::FromStr + strum::VariantNames,
    {
        let raw = self.send(command, None)?;
        response::decode_choice(&raw)
    }
}

impl<T: Transport + core::fmt::Debug> core::fmt::Debug for GenesysPsu<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GenesysPsu")
            .field("transport", &self.transport)
            .finish()
    }
}
