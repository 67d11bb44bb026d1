//! AIM-TTi MX100TP triple output power supply driver
//!
//! Plain-text remote protocol: every command is a literal ASCII line ending in
//! `\n`. Setters are fire-and-forget, queries return one line. Responses are
//! handed back as text with the line terminator stripped; only the output
//! readbacks (`V<N>O?`, `I<N>O?`) are parsed into numbers.
//!
//! Works over any [`Transport`]; on a [`TcpTransport`](crate::adapters::TcpTransport)
//! a reply is a single socket read of up to [`QUERY_MAX_LEN`] bytes.

use crate::adapters::Transport;
use crate::error::Mx100tpError;
use crate::protocol::frame::decimal;
use std::fmt;
use tracing::debug;

/// Read length requested for query replies.
pub const QUERY_MAX_LEN: usize = 256;

/// Highest settings store index for `*SAV`/`*RCL`.
pub const MAX_MEMORY_STORE: u8 = 49;

/// `<CPD>` argument for protection and averaging commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// `ON`
    On,
    /// `OFF`
    Off,
}

/// Current meter averaging for `DAMPING<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damping {
    /// `ON`
    On,
    /// `OFF`
    Off,
    /// `LOW`
    Low,
    /// `MED`
    Med,
    /// `HIGH`
    High,
}

/// Multi-On / Multi-Off action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiAction {
    /// `QUICK`
    Quick,
    /// `NEVER`
    Never,
    /// `DELAY`
    Delay,
}

/// How the LAN interface looks for an IP address first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetConfig {
    /// `DHCP`
    Dhcp,
    /// `AUTO`
    Auto,
    /// `STATIC`
    Static,
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Switch::On => write!(f, "ON"),
            Switch::Off => write!(f, "OFF"),
        }
    }
}

impl fmt::Display for Damping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Damping::On => write!(f, "ON"),
            Damping::Off => write!(f, "OFF"),
            Damping::Low => write!(f, "LOW"),
            Damping::Med => write!(f, "MED"),
            Damping::High => write!(f, "HIGH"),
        }
    }
}

impl fmt::Display for MultiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiAction::Quick => write!(f, "QUICK"),
            MultiAction::Never => write!(f, "NEVER"),
            MultiAction::Delay => write!(f, "DELAY"),
        }
    }
}

impl fmt::Display for NetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetConfig::Dhcp => write!(f, "DHCP"),
            NetConfig::Auto => write!(f, "AUTO"),
            NetConfig::Static => write!(f, "STATIC"),
        }
    }
}

/// Driver for the MX100TP power supply
pub struct Mx100tp<T> {
    transport: T,
}

impl<T: Transport> Mx100tp<T> {
    /// Create a driver over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a raw command line (terminator appended).
    pub fn write(&mut self, command: &str) -> Result<(), Mx100tpError> {
        debug!(command, "MX100TP send");
        self.transport.send(format!("{command}\n").as_bytes())?;
        Ok(())
    }

    /// Send a raw query and return the reply line.
    pub fn query(&mut self, command: &str) -> Result<String, Mx100tpError> {
        self.write(command)?;
        let raw = self.transport.receive(QUERY_MAX_LEN)?;
        let reply = String::from_utf8(raw)?
            .trim_end_matches(['\r', '\n'])
            .to_string();
        debug!(command, reply = %reply, "MX100TP receive");
        Ok(reply)
    }

    fn readback(&mut self, command: &str) -> Result<f64, Mx100tpError> {
        let reply = self.query(command)?;
        parse_readback(&reply)
    }

    // Instrument function commands

    /// `V<N> <NRF>`: set output voltage.
    pub fn set_channel_voltage(&mut self, channel: u8, volts: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("V{channel} {}", decimal(volts)))
    }

    /// `V<N>V <NRF>`: set output voltage with verify.
    pub fn set_channel_voltage_with_verify(&mut self, channel: u8, volts: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("V{channel}V {}", decimal(volts)))
    }

    /// `OVP<N> <NRF>`: over voltage protection trip point.
    pub fn set_channel_over_voltage_protection(&mut self, channel: u8, volts: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("OVP{channel} {}", decimal(volts)))
    }

    /// `OVP<N> <CPD>`: enable or disable over voltage protection.
    pub fn toggle_channel_over_voltage_protection(&mut self, channel: u8, state: Switch) -> Result<(), Mx100tpError> {
        self.write(&format!("OVP{channel} {state}"))
    }

    /// `I<N> <NRF>`: current limit.
    pub fn set_channel_current_limit(&mut self, channel: u8, amps: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("I{channel} {}", decimal(amps)))
    }

    /// `OCP<N> <NRF>`: over current protection trip point.
    pub fn set_channel_over_current_protection(&mut self, channel: u8, amps: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("OCP{channel} {}", decimal(amps)))
    }

    /// `OCP<N> <CPD>`: enable or disable over current protection.
    pub fn toggle_channel_over_current_protection(&mut self, channel: u8, state: Switch) -> Result<(), Mx100tpError> {
        self.write(&format!("OCP{channel} {state}"))
    }

    /// `DAMPING<N> <CPD>`: current meter averaging.
    pub fn set_channel_current_measurement_averaging(&mut self, channel: u8, damping: Damping) -> Result<(), Mx100tpError> {
        self.write(&format!("DAMPING{channel} {damping}"))
    }

    /// `V<N>?`: voltage setpoint, e.g. `V1 12.000`.
    pub fn get_channel_voltage_setpoint(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("V{channel}?"))
    }

    /// `I<N>?`: current limit setpoint, e.g. `I1 1.500`.
    pub fn get_channel_current_limit_setpoint(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("I{channel}?"))
    }

    /// `OVP<N>?`: voltage trip setting, `VP<N> OFF` when disabled.
    pub fn get_channel_over_voltage_setpoint(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("OVP{channel}?"))
    }

    /// `OCP<N>?`: current trip setting, `CP<N> OFF` when disabled.
    pub fn get_channel_over_current_setpoint(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("OCP{channel}?"))
    }

    /// `V<N>O?`: output readback voltage in volts.
    pub fn get_channel_voltage(&mut self, channel: u8) -> Result<f64, Mx100tpError> {
        self.readback(&format!("V{channel}O?"))
    }

    /// `I<N>O?`: output readback current in amps.
    pub fn get_channel_current(&mut self, channel: u8) -> Result<f64, Mx100tpError> {
        self.readback(&format!("I{channel}O?"))
    }

    /// `DELTAV<N> <NRF>`: voltage step size.
    pub fn set_channel_voltage_stepsize(&mut self, channel: u8, volts: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("DELTAV{channel} {}", decimal(volts)))
    }

    /// `DELTAI<N> <NRF>`: current step size.
    pub fn set_channel_current_stepsize(&mut self, channel: u8, amps: f64) -> Result<(), Mx100tpError> {
        self.write(&format!("DELTAI{channel} {}", decimal(amps)))
    }

    /// `DELTAV<N>?`
    pub fn get_channel_voltage_stepsize(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("DELTAV{channel}?"))
    }

    /// `DELTAI<N>?`
    pub fn get_channel_current_stepsize(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("DELTAI{channel}?"))
    }

    /// `INCV<N>`: step the voltage up.
    pub fn increase_channel_voltage(&mut self, channel: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("INCV{channel}"))
    }

    /// `INCV<N>V`: step the voltage up with verify.
    pub fn increase_channel_voltage_with_verify(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("INCV{channel}V"))
    }

    /// `DECV<N>`: step the voltage down.
    pub fn decrease_channel_voltage(&mut self, channel: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("DECV{channel}"))
    }

    /// `DECV<N>V`: step the voltage down with verify.
    pub fn decrease_channel_voltage_with_verify(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("DECV{channel}V"))
    }

    /// `INCI<N>`: step the current limit up.
    pub fn increase_channel_current(&mut self, channel: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("INCI{channel}"))
    }

    /// `DECI<N>`: step the current limit down.
    pub fn decrease_channel_current(&mut self, channel: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("DECI{channel}"))
    }

    /// `OP<N> <NRF>`: output on/off.
    pub fn set_channel(&mut self, channel: u8, on: bool) -> Result<(), Mx100tpError> {
        self.write(&format!("OP{channel} {}", u8::from(on)))
    }

    /// Switch an output on.
    pub fn enable_channel(&mut self, channel: u8) -> Result<(), Mx100tpError> {
        self.set_channel(channel, true)
    }

    /// Switch an output off.
    pub fn disable_channel(&mut self, channel: u8) -> Result<(), Mx100tpError> {
        self.set_channel(channel, false)
    }

    /// `OP<N>?`: `1` when on, `0` when off.
    pub fn get_channel_status(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("OP{channel}?"))
    }

    /// `OPALL <NRF>`: all outputs on/off (subject to the Multi-On/Off setup).
    pub fn set_all(&mut self, on: bool) -> Result<(), Mx100tpError> {
        self.write(&format!("OPALL {}", u8::from(on)))
    }

    /// Switch all outputs on.
    pub fn enable_all(&mut self) -> Result<(), Mx100tpError> {
        self.set_all(true)
    }

    /// Switch all outputs off.
    pub fn disable_all(&mut self) -> Result<(), Mx100tpError> {
        self.set_all(false)
    }

    /// `TRIPRST`: try to clear all trip conditions.
    pub fn reset_trip(&mut self) -> Result<(), Mx100tpError> {
        self.write("TRIPRST")
    }

    /// `VRANGE<N> <NRF>`: select the voltage/current range of an output.
    ///
    /// Output 1: 1 = 16V/6A, 2 = 35V/3A. Output 2: 1 = 35V/3A, 2 = 16V/6A,
    /// 3 = 35V/6A. Output 3: 1 = 35V/3A, 2 = 70V/1.5A, 3 = 70V/3A.
    pub fn set_channel_voltage_range(&mut self, channel: u8, range: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("VRANGE{channel} {range}"))
    }

    /// `VRANGE<N>?`
    pub fn get_channel_voltage_range(&mut self, channel: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("VRANGE{channel}?"))
    }

    /// `CONFIG <NRF>`: voltage tracking mode (0 = none, 1-3 = Mode1-3).
    pub fn set_voltage_tracking_mode(&mut self, mode: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("CONFIG {mode}"))
    }

    /// `CONFIG?`
    pub fn get_voltage_tracking_mode(&mut self) -> Result<String, Mx100tpError> {
        self.query("CONFIG?")
    }

    /// `ONDELAY<N> <NRF>`: Multi-On delay in milliseconds.
    pub fn set_channel_on_delay(&mut self, channel: u8, millis: u32) -> Result<(), Mx100tpError> {
        self.write(&format!("ONDELAY{channel} {millis}"))
    }

    /// `OFFDELAY<N> <NRF>`: Multi-Off delay in milliseconds.
    pub fn set_channel_off_delay(&mut self, channel: u8, millis: u32) -> Result<(), Mx100tpError> {
        self.write(&format!("OFFDELAY{channel} {millis}"))
    }

    /// `ONACTION<N> <CPD>`: Multi-On action.
    pub fn set_channel_on_action(&mut self, channel: u8, action: MultiAction) -> Result<String, Mx100tpError> {
        self.query(&format!("ONACTION{channel} {action}"))
    }

    /// `OFFACTION<N> <CPD>`: Multi-Off action.
    pub fn set_channel_off_action(&mut self, channel: u8, action: MultiAction) -> Result<String, Mx100tpError> {
        self.query(&format!("OFFACTION{channel} {action}"))
    }

    /// `SAV<N> <NRF>`: save one output's settings to a store.
    pub fn save_channel_settings(&mut self, channel: u8, store: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("SAV{channel} {store}"))
    }

    /// `RCL<N> <NRF>`: recall one output's settings from a store.
    pub fn recall_channel_settings(&mut self, channel: u8, store: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("RCL{channel} {store}"))
    }

    // Common commands

    /// `*IDN?`: `<NAME>, <model>, <serial>, <version>`.
    pub fn get_instrument_identification(&mut self) -> Result<String, Mx100tpError> {
        self.query("*IDN?")
    }

    /// `*RST`: restore factory defaults (stores and interface settings kept).
    pub fn factory_reset(&mut self) -> Result<(), Mx100tpError> {
        self.write("*RST")
    }

    /// `*SAV <NRF>`: save all outputs to a store (0-49).
    pub fn save_settings(&mut self, store: u8) -> Result<(), Mx100tpError> {
        check_memory_store(store)?;
        self.write(&format!("*SAV {store}"))
    }

    /// `*RCL <NRF>`: recall all outputs from a store (0-49).
    pub fn recall_settings(&mut self, store: u8) -> Result<(), Mx100tpError> {
        check_memory_store(store)?;
        self.write(&format!("*RCL {store}"))
    }

    /// `*OPC`: set the Operation Complete bit.
    pub fn set_operation_complete_bit(&mut self) -> Result<(), Mx100tpError> {
        self.write("*OPC")
    }

    /// `*OPC?`: always `1`.
    pub fn get_operation_complete_status(&mut self) -> Result<String, Mx100tpError> {
        self.query("*OPC?")
    }

    /// `*WAI`: no-op, all operations are sequential.
    pub fn wait_for_complete(&mut self) -> Result<(), Mx100tpError> {
        self.write("*WAI")
    }

    /// `*TST?`: always `0`, there is no self test.
    pub fn self_test(&mut self) -> Result<String, Mx100tpError> {
        self.query("*TST?")
    }

    /// `*TRG`: ignored by this instrument.
    pub fn trigger(&mut self) -> Result<(), Mx100tpError> {
        self.write("*TRG")
    }

    // Status commands

    /// `*CLS`: clear status, including the Status Byte.
    pub fn clear_status(&mut self) -> Result<(), Mx100tpError> {
        self.write("*CLS")
    }

    /// `LSR<N>?`: query and clear a Limit Status Register.
    pub fn query_and_clear_limit_status_register(&mut self, register: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("LSR{register}?"))
    }

    /// `LSE<N> <NRF>`
    pub fn set_limit_status_enable_register(&mut self, register: u8, value: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("LSE{register} {value}"))
    }

    /// `LSE<N>?`
    pub fn get_limit_status_enable_register(&mut self, register: u8) -> Result<String, Mx100tpError> {
        self.query(&format!("LSE{register}?"))
    }

    /// `EER?`: query and clear the Execution Error Register.
    pub fn query_and_clear_execution_error_register(&mut self) -> Result<String, Mx100tpError> {
        self.query("EER?")
    }

    /// `QER?`: query and clear the Query Error Register.
    pub fn query_and_clear_query_error_register(&mut self) -> Result<String, Mx100tpError> {
        self.query("QER?")
    }

    /// `*STB?`
    pub fn get_status_byte(&mut self) -> Result<String, Mx100tpError> {
        self.query("*STB?")
    }

    /// `*SRE <NRF>`
    pub fn set_service_request_enable_register(&mut self, value: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("*SRE {value}"))
    }

    /// `*SRE?`
    pub fn get_service_request_enable_register(&mut self) -> Result<String, Mx100tpError> {
        self.query("*SRE?")
    }

    /// `*PRE <NRF>`
    pub fn set_parallel_poll_enable_register(&mut self, value: u8) -> Result<(), Mx100tpError> {
        self.write(&format!("*PRE {value}"))
    }

    /// `*PRE?`
    pub fn get_parallel_poll_enable_register(&mut self) -> Result<String, Mx100tpError> {
        self.query("*PRE?")
    }

    /// `*IST?`: IEEE 488.2 ist local message.
    pub fn get_ist_state(&mut self) -> Result<String, Mx100tpError> {
        self.query("*IST?")
    }

    // Interface management commands

    /// `LOCAL`: return to front panel control until the next command.
    pub fn go_to_local(&mut self) -> Result<(), Mx100tpError> {
        self.write("LOCAL")
    }

    /// `IFLOCK <NRF>`: take (`true`) or release the interface lock.
    pub fn set_interface_lock(&mut self, lock: bool) -> Result<(), Mx100tpError> {
        self.write(&format!("IFLOCK {}", u8::from(lock)))
    }

    /// `IFLOCK?`: `0` unlocked, `1` owned by this interface, `-1` unavailable.
    pub fn get_interface_lock(&mut self) -> Result<String, Mx100tpError> {
        self.query("IFLOCK?")
    }

    /// `ADDRESS?`: GPIB address.
    pub fn get_interface_address(&mut self) -> Result<String, Mx100tpError> {
        self.query("ADDRESS?")
    }

    /// `IPADDR?`
    pub fn get_ip_address(&mut self) -> Result<String, Mx100tpError> {
        self.query("IPADDR?")
    }

    /// `NETMASK?`
    pub fn get_netmask(&mut self) -> Result<String, Mx100tpError> {
        self.query("NETMASK?")
    }

    /// `NETCONFIG?`: `DHCP`, `AUTO` or `STATIC`.
    pub fn get_netconfig(&mut self) -> Result<String, Mx100tpError> {
        self.query("NETCONFIG?")
    }

    /// `NETCONFIG <CPD>`
    pub fn set_netconfig(&mut self, config: NetConfig) -> Result<(), Mx100tpError> {
        self.write(&format!("NETCONFIG {config}"))
    }

    /// `IPADDR <QUAD>`: static IP address.
    pub fn set_ip_address(&mut self, address: std::net::Ipv4Addr) -> Result<(), Mx100tpError> {
        self.write(&format!("IPADDR {address}"))
    }

    /// `NETMASK <QUAD>`
    pub fn set_netmask(&mut self, mask: std::net::Ipv4Addr) -> Result<(), Mx100tpError> {
        self.write(&format!("NETMASK {mask}"))
    }
}

fn check_memory_store(store: u8) -> Result<(), Mx100tpError> {
    if store > MAX_MEMORY_STORE {
        Err(Mx100tpError::MemoryStoreOutOfRange(store))
    } else {
        Ok(())
    }
}

/// Parse an output readback such as `12.003V` or `0.150A`.
pub fn parse_readback(reply: &str) -> Result<f64, Mx100tpError> {
    let trimmed = reply.trim();
    trimmed
        .strip_suffix(['V', 'A'])
        .unwrap_or(trimmed)
        .parse::<f64>()
        .map_err(|_| Mx100tpError::InvalidReadback(trimmed.to_string()))
}
