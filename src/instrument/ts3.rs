//! NEXT TS3 test fixture controller driver
//!
//! The TS3 speaks a framed ASCII protocol over TCP/IP or serial-over-USB:
//!
//! - Request: `$LLL;CODE;ARG...;CCCC\r` (see [`crate::protocol::frame`])
//! - Reply: `framing;CODE;PAYLOAD...` where `CODE` is the echoed command code,
//!   [`ACK_CODE`] for "set" style commands, or [`NACK_CODE`](crate::protocol::NACK_CODE) followed by a
//!   cause code (see [`crate::protocol::response`])
//! - Timing: half-duplex, one request then one reply
//!
//! Every operation sends one frame and reads one reply. Nothing is retried;
//! NACKs, mismatched replies and transport failures are all returned to the
//! caller.
//!
//! # Example Usage
//!
//! ```no_run
//! use labwire::adapters::TcpTransport;
//! use labwire::instrument::Ts3;
//!
//! fn main() -> anyhow::Result<()> {
//!     let transport = TcpTransport::connect("192.168.1.50", 10001)?;
//!     let mut fixture = Ts3::new(transport);
//!
//!     fixture.poll_device()?;
//!     fixture.set_dut_power(true, true, false)?;
//!     let volts = fixture.get_ana_input_pin(0, 1, 0)?;
//!     println!("AIN1: {volts:.3} V");
//!
//!     Ok(())
//! }
//! ```

use super::clock::{Clock, SystemClock};
use crate::adapters::Transport;
use crate::error::Ts3Error;
use crate::protocol::frame::{build_frame, decimal, flag};
use crate::protocol::response::{parse_response, Reply, ACK_CODE};
use chrono::{Datelike, Local, Timelike};
use std::time::Duration;
use tracing::debug;

/// Maximum reply size read per response.
pub const RESPONSE_MAX_LEN: usize = 512;

/// Settle time after switching DUT power.
pub const DUT_POWER_SETTLE: Duration = Duration::from_millis(500);

/// Number of external module slots reported by [`Ts3::get_external_modules`].
pub const EXTERNAL_MODULE_SLOTS: usize = 16;

/// TS3 command codes
pub mod command {
    /// Alive check
    pub const POLL: &str = "10";
    /// Firmware version
    pub const VERSION: &str = "13";
    /// Processor reset
    pub const RESET: &str = "14";
    /// Article number and product name
    pub const PRODUCT_ID: &str = "15";
    /// SVN repository information
    pub const SVN_INFO: &str = "16";
    /// Major supply on/off
    pub const SUPPLY: &str = "22";
    /// On-board buzzer
    pub const BUZZER: &str = "23";
    /// DUT power
    pub const DUT_POWER: &str = "24";
    /// DUT detection switch
    pub const DUT_PRESENT: &str = "25";
    /// Power supply voltages
    pub const POWER_SUPPLY: &str = "26";
    /// DUT power relay states
    pub const DUT_POWER_STATE: &str = "27";
    /// Digital output pin
    pub const DIG_OUTPUT: &str = "40";
    /// Digital input pin
    pub const DIG_INPUT: &str = "41";
    /// Analog output pin
    pub const ANA_OUTPUT: &str = "42";
    /// Analog input pin
    pub const ANA_INPUT: &str = "43";
    /// Main board PWM pin
    pub const PWM: &str = "44";
    /// Wait for a high/low transition
    pub const HIGHLOW_INPUT: &str = "45";
    /// Differential analog measurement
    pub const DIFF_ANA_INPUT: &str = "46";
    /// Get configuration date
    pub const GET_DATE: &str = "80";
    /// Set configuration date
    pub const SET_DATE: &str = "81";
    /// Get configuring user
    pub const GET_USER: &str = "82";
    /// Set configuring user
    pub const SET_USER: &str = "83";
    /// Get script filename
    pub const GET_SCRIPT: &str = "84";
    /// Set script filename
    pub const SET_SCRIPT: &str = "85";
    /// Get fixture ID
    pub const GET_ID: &str = "86";
    /// Set fixture ID
    pub const SET_ID: &str = "87";
    /// List external modules
    pub const EXTERNAL_MODULES: &str = "88";
    /// External module detail
    pub const EXTERNAL_MODULE_DETAILS: &str = "89";
    /// UART transmit
    pub const UART_TXD: &str = "100";
    /// UART receive
    pub const UART_RXD: &str = "101";
    /// UART configure
    pub const UART_SET: &str = "102";
    /// UART flush
    pub const UART_FLUSH: &str = "103";
    /// I2C transmit
    pub const I2C_TXD: &str = "140";
    /// I2C receive
    pub const I2C_RXD: &str = "141";
    /// Firmware image line (Motorola HEX)
    pub const FIRMWARE_LINE: &str = "200";
    /// Copy received firmware to flash and restart
    pub const PERFORM_FLASH: &str = "201";
}

macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($arg.to_string()),*]
    };
}

/// Firmware version reported by command 13.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// `major.minor`
    pub version: String,
    /// Build identifier
    pub build: String,
}

/// Article number and product name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductId {
    /// Article number
    pub article: String,
    /// Product name
    pub name: String,
}

/// SVN repository information of the fixture firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnInfo {
    /// Repository location
    pub repository: String,
    /// Revision
    pub revision: String,
}

/// DUT power relay states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutPowerState {
    /// Power relay closed
    pub power: bool,
    /// Enable relay closed
    pub enable: bool,
}

/// Configuration date as reported by the fixture (raw fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationDate {
    /// Year
    pub year: String,
    /// Month
    pub month: String,
    /// Day
    pub day: String,
    /// Hour
    pub hour: String,
    /// Minute
    pub minute: String,
    /// Second
    pub second: String,
}

/// Components for [`Ts3::set_date`]. Unset components take the local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFields {
    /// Year
    pub year: Option<i32>,
    /// Month
    pub month: Option<u32>,
    /// Day
    pub day: Option<u32>,
    /// Hour
    pub hour: Option<u32>,
    /// Minute
    pub minute: Option<u32>,
    /// Second
    pub second: Option<u32>,
}

/// Project number and class of the base article the fixture tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureId {
    /// Project number
    pub project_number: String,
    /// Class
    pub class_number: String,
}

/// Detail of one external module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDetails {
    /// Module type
    pub kind: String,
    /// Module description / revision
    pub detail: String,
}

/// UART line settings for [`Ts3::uart_set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartSettings {
    /// Baud rate
    pub baudrate: u32,
    /// Data bits
    pub databits: u8,
    /// Stop bits
    pub stopbits: u8,
    /// Parity code as defined by the fixture firmware
    pub parity: u8,
}

impl Default for UartSettings {
    fn default() -> Self {
        Self {
            baudrate: 9600,
            databits: 8,
            stopbits: 1,
            parity: 5,
        }
    }
}

/// Two analog inputs read back to back for [`Ts3::get_diff_ana_input_pin`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffAnalogInput {
    /// Module of input A
    pub module_a: u8,
    /// Pin of input A
    pub pin_a: u8,
    /// Range of input A
    pub range_a: u8,
    /// Delay between the two readings
    pub delay: u32,
    /// Module of input B
    pub module_b: u8,
    /// Pin of input B
    pub pin_b: u8,
    /// Range of input B
    pub range_b: u8,
}

/// Driver for the NEXT TS3 fixture controller
///
/// Generic over the transport so the same driver runs over TCP/IP, serial or
/// a scripted mock. Holds no protocol state between calls.
pub struct Ts3<T, C = SystemClock> {
    transport: T,
    clock: C,
}

impl<T: Transport> Ts3<T, SystemClock> {
    /// Create a driver over `transport`.
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> Ts3<T, C> {
    /// Create a driver that waits for hardware settling through `clock`.
    pub fn with_clock(transport: T, clock: C) -> Self {
        Self { transport, clock }
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Frame `args` (command code first) and send it.
    ///
    /// The byte count reported by the transport is not checked; a short write
    /// shows up as a bad reply.
    pub fn send_command(&mut self, args: &[String]) -> Result<(), Ts3Error> {
        let frame = build_frame(args);
        debug!(frame = %String::from_utf8_lossy(&frame).trim_end(), "TS3 send");
        self.transport.send(&frame)?;
        Ok(())
    }

    /// Read one reply and check it carries `expected_code`.
    pub fn get_response(&mut self, expected_code: &str) -> Result<Vec<String>, Ts3Error> {
        let raw = self.transport.receive(RESPONSE_MAX_LEN)?;
        let text = String::from_utf8(raw)?;
        debug!(reply = %text.trim_end(), expected = expected_code, "TS3 receive");
        parse_response(&text, expected_code)
    }

    fn transact(&mut self, args: &[String], expected_code: &str) -> Result<Reply, Ts3Error> {
        self.send_command(args)?;
        self.get_response(expected_code).map(Reply::new)
    }

    fn execute(&mut self, args: &[String]) -> Result<(), Ts3Error> {
        self.transact(args, ACK_CODE).map(|_| ())
    }

    /// Check the unit is alive; it answers with an ACK.
    pub fn poll_device(&mut self) -> Result<(), Ts3Error> {
        self.execute(&args![command::POLL])
    }

    /// Firmware version, used to check whether newer commands exist.
    pub fn get_version(&mut self) -> Result<FirmwareVersion, Ts3Error> {
        let reply = self.transact(&args![command::VERSION], command::VERSION)?;
        Ok(FirmwareVersion {
            version: format!("{}.{}", reply.text(2)?, reply.text(3)?),
            build: reply.string(4)?,
        })
    }

    /// Reset the processor.
    pub fn reset_device(&mut self) -> Result<(), Ts3Error> {
        self.execute(&args![command::RESET])
    }

    /// Article number and product name.
    pub fn get_product_id(&mut self) -> Result<ProductId, Ts3Error> {
        let reply = self.transact(&args![command::PRODUCT_ID], command::PRODUCT_ID)?;
        Ok(ProductId {
            article: reply.string(2)?,
            name: reply.string(3)?,
        })
    }

    /// SVN repository information.
    pub fn get_svn(&mut self) -> Result<SvnInfo, Ts3Error> {
        let reply = self.transact(&args![command::SVN_INFO], command::SVN_INFO)?;
        Ok(SvnInfo {
            repository: reply.string(2)?,
            revision: reply.string(3)?,
        })
    }

    /// Switch a major supply on or off.
    pub fn set_supply(&mut self, supply: u8, on: bool) -> Result<(), Ts3Error> {
        self.execute(&args![command::SUPPLY, supply, flag(on)])
    }

    /// Sound or silence the on-board buzzer.
    pub fn set_buzzer(&mut self, on: bool) -> Result<(), Ts3Error> {
        self.execute(&args![command::BUZZER, flag(on)])
    }

    /// Switch DUT power, then wait [`DUT_POWER_SETTLE`] for the rails to settle.
    ///
    /// The wait only happens after the fixture acknowledged the command.
    pub fn set_dut_power(
        &mut self,
        dut_power: bool,
        dut_enable: bool,
        overrule: bool,
    ) -> Result<(), Ts3Error> {
        self.execute(&args![
            command::DUT_POWER,
            flag(dut_power),
            flag(dut_enable),
            flag(overrule)
        ])?;
        self.clock.sleep(DUT_POWER_SETTLE);
        Ok(())
    }

    /// DUT detection switch state.
    pub fn get_dut_present(&mut self) -> Result<bool, Ts3Error> {
        self.transact(&args![command::DUT_PRESENT], command::DUT_PRESENT)?
            .flag(2)
    }

    /// Power supply state.
    ///
    /// The fixture reports the supply voltages, but only the first payload
    /// field is interpreted, as an on (`"1"`) / off flag.
    pub fn get_power_supply(&mut self, power_supply: u8) -> Result<bool, Ts3Error> {
        self.transact(
            &args![command::POWER_SUPPLY, power_supply],
            command::POWER_SUPPLY,
        )?
        .flag(2)
    }

    /// DUT power relay states. The fixture answers this query with an ACK code.
    pub fn get_dut_power(&mut self) -> Result<DutPowerState, Ts3Error> {
        let reply = self.transact(&args![command::DUT_POWER_STATE], ACK_CODE)?;
        Ok(DutPowerState {
            power: reply.flag(2)?,
            enable: reply.flag(3)?,
        })
    }

    /// Switch a digital output pin (or relay).
    pub fn set_dig_output_pin(&mut self, module: u8, pin: u8, value: bool) -> Result<(), Ts3Error> {
        self.execute(&args![command::DIG_OUTPUT, module, pin, flag(value)])
    }

    /// Read a digital input pin.
    pub fn get_dig_input_pin(&mut self, module: u8, pin: u8) -> Result<bool, Ts3Error> {
        self.transact(&args![command::DIG_INPUT, module, pin], command::DIG_INPUT)?
            .flag(2)
    }

    /// Set an analog output pin.
    pub fn set_ana_output_pin(&mut self, module: u8, pin: u8, value: f64) -> Result<(), Ts3Error> {
        self.execute(&args![command::ANA_OUTPUT, module, pin, decimal(value)])
    }

    /// Read an analog input pin.
    pub fn get_ana_input_pin(&mut self, module: u8, pin: u8, input_range: u8) -> Result<f64, Ts3Error> {
        self.transact(
            &args![command::ANA_INPUT, module, pin, input_range],
            command::ANA_INPUT,
        )?
        .decimal(2)
    }

    /// Set the PWM pin on the main board.
    pub fn set_pwm_pin(&mut self, frequency: u32, duty_cycle: u8) -> Result<(), Ts3Error> {
        self.execute(&args![command::PWM, frequency, duty_cycle])
    }

    /// Wait up to `timeout` seconds for a pin to transition high-to-low or
    /// low-to-high. Returns whether the transition was seen.
    pub fn get_user_highlow_input_pin(
        &mut self,
        module: u8,
        pin: u8,
        high_low: u8,
        timeout: u32,
    ) -> Result<bool, Ts3Error> {
        self.transact(
            &args![command::HIGHLOW_INPUT, module, pin, high_low, timeout],
            command::HIGHLOW_INPUT,
        )?
        .flag(2)
    }

    /// Read two analog inputs with an optional delay in between and return
    /// the difference.
    pub fn get_diff_ana_input_pin(&mut self, input: DiffAnalogInput) -> Result<f64, Ts3Error> {
        self.transact(
            &args![
                command::DIFF_ANA_INPUT,
                input.module_a,
                input.pin_a,
                input.range_a,
                input.delay,
                input.module_b,
                input.pin_b,
                input.range_b
            ],
            command::DIFF_ANA_INPUT,
        )?
        .decimal(2)
    }

    /// Transmit a message on a UART port.
    pub fn uart_txd(&mut self, module: u8, port: u8, message: &str) -> Result<(), Ts3Error> {
        self.execute(&args![command::UART_TXD, module, port, message])
    }

    /// Receive a message from a UART port.
    pub fn uart_rxd(&mut self, module: u8, port: u8) -> Result<String, Ts3Error> {
        self.transact(&args![command::UART_RXD, module, port], command::UART_RXD)?
            .string(2)
    }

    /// Configure a UART port.
    pub fn uart_set(&mut self, module: u8, port: u8, settings: UartSettings) -> Result<(), Ts3Error> {
        self.execute(&args![
            command::UART_SET,
            module,
            port,
            settings.baudrate,
            settings.databits,
            settings.stopbits,
            settings.parity
        ])
    }

    /// Drop any bytes a UART port has received.
    pub fn uart_flush(&mut self, module: u8, port: u8) -> Result<(), Ts3Error> {
        self.execute(&args![command::UART_FLUSH, module, port])
    }

    /// Transmit a message on an I2C port.
    pub fn i2c_txd(&mut self, module: u8, port: u8, address: u8, message: &str) -> Result<(), Ts3Error> {
        self.execute(&args![command::I2C_TXD, module, port, address, message])
    }

    /// Read `count` bytes from an I2C device, optionally writing `message` first.
    pub fn i2c_rxd(
        &mut self,
        module: u8,
        port: u8,
        address: u8,
        count: u32,
        message: &str,
    ) -> Result<String, Ts3Error> {
        self.transact(
            &args![command::I2C_RXD, module, port, address, count, message],
            command::I2C_RXD,
        )?
        .string(2)
    }

    /// Configuration date.
    pub fn get_date(&mut self) -> Result<ConfigurationDate, Ts3Error> {
        let reply = self.transact(&args![command::GET_DATE], command::GET_DATE)?;
        Ok(ConfigurationDate {
            year: reply.string(2)?,
            month: reply.string(3)?,
            day: reply.string(4)?,
            hour: reply.string(5)?,
            minute: reply.string(6)?,
            second: reply.string(7)?,
        })
    }

    /// Set the configuration date. Components left `None` take the local time.
    pub fn set_date(&mut self, date: DateFields) -> Result<(), Ts3Error> {
        let now = Local::now();
        self.execute(&args![
            command::SET_DATE,
            date.year.unwrap_or_else(|| now.year()),
            date.month.unwrap_or_else(|| now.month()),
            date.day.unwrap_or_else(|| now.day()),
            date.hour.unwrap_or_else(|| now.hour()),
            date.minute.unwrap_or_else(|| now.minute()),
            date.second.unwrap_or_else(|| now.second())
        ])
    }

    /// Name of the user that configured the fixture.
    pub fn get_user(&mut self) -> Result<String, Ts3Error> {
        self.transact(&args![command::GET_USER], command::GET_USER)?
            .string(2)
    }

    /// Set the name of the user that configured the fixture.
    pub fn set_user(&mut self, username: &str) -> Result<(), Ts3Error> {
        self.execute(&args![command::SET_USER, username])
    }

    /// Name of the test script the fixture runs.
    pub fn get_script_filename(&mut self) -> Result<String, Ts3Error> {
        self.transact(&args![command::GET_SCRIPT], command::GET_SCRIPT)?
            .string(2)
    }

    /// Set the name of the test script the fixture runs.
    pub fn set_script_filename(&mut self, script_file_name: &str) -> Result<(), Ts3Error> {
        self.execute(&args![command::SET_SCRIPT, script_file_name])
    }

    /// Project number and class of the base article this fixture tests.
    pub fn get_id(&mut self) -> Result<FixtureId, Ts3Error> {
        let reply = self.transact(&args![command::GET_ID], command::GET_ID)?;
        Ok(FixtureId {
            project_number: reply.string(2)?,
            class_number: reply.string(3)?,
        })
    }

    /// Set the project number and class of the base article.
    pub fn set_id(&mut self, project_number: u32, class_number: u32) -> Result<(), Ts3Error> {
        self.execute(&args![command::SET_ID, project_number, class_number])
    }

    /// Modules detected in each of the [`EXTERNAL_MODULE_SLOTS`] slots.
    pub fn get_external_modules(&mut self) -> Result<Vec<String>, Ts3Error> {
        let reply = self.transact(&args![command::EXTERNAL_MODULES], command::EXTERNAL_MODULES)?;
        (2..2 + EXTERNAL_MODULE_SLOTS)
            .map(|index| reply.string(index))
            .collect()
    }

    /// Detail of one detected module.
    pub fn get_external_module_details(&mut self, module: u8) -> Result<ModuleDetails, Ts3Error> {
        let reply = self.transact(
            &args![command::EXTERNAL_MODULE_DETAILS, module],
            command::EXTERNAL_MODULE_DETAILS,
        )?;
        Ok(ModuleDetails {
            kind: reply.string(2)?,
            detail: reply.string(3)?,
        })
    }

    /// Send one line of a Motorola HEX firmware image; the fixture decodes it
    /// into RAM.
    pub fn firmware_line(&mut self, mhx_file_line: &str) -> Result<(), Ts3Error> {
        self.execute(&args![command::FIRMWARE_LINE, mhx_file_line])
    }

    /// Copy the firmware in RAM to flash and restart.
    ///
    /// The ACK is sent before the copy starts; the fixture does not answer
    /// until it has rebooted.
    pub fn perform_flash(&mut self) -> Result<(), Ts3Error> {
        self.execute(&args![command::PERFORM_FLASH])
    }

    /// Stream a Motorola HEX image line by line, then flash it.
    ///
    /// Blank lines are skipped. Stops at the first rejected line.
    pub fn flash_firmware<'a, I>(&mut self, lines: I) -> Result<usize, Ts3Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sent = 0;
        for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
            self.firmware_line(line)?;
            sent += 1;
        }
        debug!(lines = sent, "TS3 firmware image transferred");
        self.perform_flash()?;
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockTransport;

    fn fixture(replies: &[&str]) -> Ts3<MockTransport> {
        Ts3::new(MockTransport::with_replies(replies.iter().copied()))
    }

    #[test]
    fn test_poll_frame_on_the_wire() {
        let mut ts3 = fixture(&["0;1;"]);
        ts3.poll_device().unwrap();
        assert_eq!(ts3.transport().sent(), &[b"$012;10;26C6\r".to_vec()]);
    }

    #[test]
    fn test_version_joins_major_minor() {
        let mut ts3 = fixture(&["0;13;2;7;1234"]);
        let version = ts3.get_version().unwrap();
        assert_eq!(version.version, "2.7");
        assert_eq!(version.build, "1234");
    }

    #[test]
    fn test_short_reply_is_malformed() {
        let mut ts3 = fixture(&["0;15;only-article"]);
        assert!(matches!(
            ts3.get_product_id(),
            Err(Ts3Error::Malformed {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_argument_encoding() {
        let mut ts3 = fixture(&["0;1;", "0;1;", "0;1;"]);
        ts3.set_dig_output_pin(2, 7, true).unwrap();
        ts3.set_ana_output_pin(0, 1, 2.0).unwrap();
        ts3.uart_set(1, 0, UartSettings::default()).unwrap();

        let sent = ts3.transport().sent_strings();
        assert!(sent[0].starts_with("$018;40;2;7;1;"));
        assert!(sent[1].starts_with("$020;42;0;1;2.0;"));
        assert!(sent[2].starts_with("$028;102;1;0;9600;8;1;5;"));
    }

    #[test]
    fn test_set_date_uses_given_fields() {
        let mut ts3 = fixture(&["0;1;"]);
        ts3.set_date(DateFields {
            year: Some(2022),
            month: Some(3),
            day: Some(14),
            hour: Some(9),
            minute: Some(5),
            second: Some(0),
        })
        .unwrap();
        assert!(ts3.transport().sent_strings()[0].contains(";81;2022;3;14;9;5;0;"));
    }

    #[test]
    fn test_uart_and_i2c() {
        let mut ts3 = fixture(&["0;1;", "0;101;hello", "0;1;", "0;141;0A1B"]);
        ts3.uart_txd(1, 0, "hello").unwrap();
        assert_eq!(ts3.uart_rxd(1, 0).unwrap(), "hello");
        ts3.uart_flush(1, 0).unwrap();
        assert_eq!(ts3.i2c_rxd(2, 1, 80, 2, "00").unwrap(), "0A1B");

        let sent = ts3.transport().sent_strings();
        assert!(sent[0].contains(";100;1;0;hello;"));
        assert!(sent[1].contains(";101;1;0;"));
        assert!(sent[2].contains(";103;1;0;"));
        assert!(sent[3].contains(";141;2;1;80;2;00;"));
    }

    #[test]
    fn test_configuration_records() {
        let mut ts3 = fixture(&[
            "0;80;2021;11;2;13;45;10",
            "0;82;jdoe",
            "0;86;4711;3",
            "0;1;",
            "0;84;flash.py",
        ]);
        let date = ts3.get_date().unwrap();
        assert_eq!((date.year.as_str(), date.second.as_str()), ("2021", "10"));
        assert_eq!(ts3.get_user().unwrap(), "jdoe");
        let id = ts3.get_id().unwrap();
        assert_eq!(id.project_number, "4711");
        assert_eq!(id.class_number, "3");
        ts3.set_id(4712, 1).unwrap();
        assert_eq!(ts3.get_script_filename().unwrap(), "flash.py");
        assert!(ts3.transport().sent_strings()[3].contains(";87;4712;1;"));
    }

    #[test]
    fn test_supply_pwm_and_highlow() {
        let mut ts3 = fixture(&["0;1;", "0;1;", "0;1;", "0;45;1", "0;26;0"]);
        ts3.set_supply(2, true).unwrap();
        ts3.set_buzzer(false).unwrap();
        ts3.set_pwm_pin(1000, 50).unwrap();
        assert!(ts3.get_user_highlow_input_pin(1, 3, 0, 5).unwrap());
        assert!(!ts3.get_power_supply(1).unwrap());

        let sent = ts3.transport().sent_strings();
        assert!(sent[0].contains(";22;2;1;"));
        assert!(sent[1].contains(";23;0;"));
        assert!(sent[2].contains(";44;1000;50;"));
        assert!(sent[3].contains(";45;1;3;0;5;"));
    }

    #[test]
    fn test_undecodable_reply_is_an_error() {
        let mut transport = MockTransport::new();
        transport.push_reply(b"0;101;\xff\xfeAB");
        let mut ts3 = Ts3::new(transport);
        assert!(matches!(ts3.uart_rxd(0, 0), Err(Ts3Error::Encoding(_))));
    }
}
