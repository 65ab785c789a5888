use std::env;

use genesys_psu::{
    config::{ConnectionConfig, DEFAULT_BAUD_RATE},
    psu::GenesysPsu,
    types::{RemoteMode, State},
};
use inquire::Select;
use tracing_subscriber::EnvFilter;

// Configuration constants - adjust these for your setup
const PSU_ADDRESS: u8 = 6;
const OUTPUT_VOLTAGE_V: f64 = 10.0;
const CURRENT_LIMIT_A: f64 = 3.0;
// The PSU can take a while to respond, a reasonably large time out is required.
const RESPONSE_TIMEOUT_S: f64 = 1.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Get serial port or host:port from command line arg or interactive selection
    let target = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found! Pass a serial port or host:port.");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    // COM ports never contain a colon, device paths rarely do.
    let config = if target.contains(':') && !target.starts_with('/') {
        ConnectionConfig::tcp(&target)
    } else {
        ConnectionConfig::serial(&target, DEFAULT_BAUD_RATE)
    }
    .with_timeout_secs(RESPONSE_TIMEOUT_S)
    .expect("Invalid timeout");

    println!("Using {}", config.endpoint);

    let mut psu = GenesysPsu::open(&config).expect("Failed to open connection");

    psu.select_address(PSU_ADDRESS).unwrap();
    println!("Selected address {}", PSU_ADDRESS);

    println!("Model: {}", psu.get_model_identification().unwrap());

    psu.set_voltage(OUTPUT_VOLTAGE_V).unwrap();
    psu.set_current(CURRENT_LIMIT_A).unwrap();
    psu.set_remote_mode(RemoteMode::Remote).unwrap();
    psu.set_output(State::On).unwrap();
    println!("Output enabled at {OUTPUT_VOLTAGE_V}V / {CURRENT_LIMIT_A}A");

    println!("Voltage setting: {}V", psu.get_voltage().unwrap());
    println!("Current setting: {}A", psu.get_current().unwrap());
    println!("Remote mode: {:?}", psu.get_remote_mode().unwrap());
    println!("Output: {:?}", psu.get_output().unwrap());

    let status = psu.get_power_status().unwrap();
    println!("{:#?}", status);
    println!("{:#?}", status.status());
    println!("{:#?}", status.faults());

    psu.close().expect("Failed to close connection");
}
