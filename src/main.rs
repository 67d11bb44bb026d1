//! labwire command-line tool
//!
//! Runs single instrument operations against the instrument described in the
//! configuration file.

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use labwire::adapters::Transport;
use labwire::config::{open_transport, InstrumentKind, LabwireConfig, DEFAULT_CONFIG_PATH};
use labwire::instrument::{DateFields, Mx100tp, Ts3};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Drive lab instruments and test fixtures", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "TS3 fixture operations")]
    Ts3(Ts3Command),
    #[command(subcommand, about = "MX100TP power supply operations")]
    Mx100tp(Mx100tpCommand),
}

#[derive(Debug, Subcommand)]
enum Ts3Command {
    /// Check that the fixture answers
    Poll,
    /// Firmware version and build
    Version,
    /// Restart the fixture
    Reset,
    /// Article number and product name
    ProductId,
    /// Firmware SVN location and revision
    Svn,
    /// Switch DUT power
    DutPower {
        #[arg(long)]
        on: bool,
        #[arg(long)]
        enable: bool,
        #[arg(long)]
        overrule: bool,
    },
    /// DUT power relay states
    DutPowerState,
    /// Whether a DUT is present
    DutPresent,
    /// Switch a digital output
    SetDig { module: u8, pin: u8, value: u8 },
    /// Read a digital input
    GetDig { module: u8, pin: u8 },
    /// Set an analog output
    SetAna { module: u8, pin: u8, value: f64 },
    /// Read an analog input
    GetAna {
        module: u8,
        pin: u8,
        #[arg(default_value_t = 0)]
        range: u8,
    },
    /// Configuration date
    Date,
    /// Set the configuration date to the current local time
    SetDate,
    /// Project number and class
    Id,
    /// Detected external modules
    Modules,
    /// Flash a Motorola HEX firmware image
    Flash { file: PathBuf },
}

#[derive(Debug, Subcommand)]
enum Mx100tpCommand {
    /// Instrument identification
    Idn,
    /// Set an output voltage
    SetVoltage { channel: u8, volts: f64 },
    /// Set an output current limit
    SetCurrent { channel: u8, amps: f64 },
    /// Output readback voltage
    Voltage { channel: u8 },
    /// Output readback current
    Current { channel: u8 },
    /// Switch an output on
    On { channel: u8 },
    /// Switch an output off
    Off { channel: u8 },
    /// Switch all outputs off
    AllOff,
    /// Save all settings to a store (0-49)
    Save { store: u8 },
    /// Recall all settings from a store (0-49)
    Recall { store: u8 },
    /// Send a raw query and print the reply
    Query { command: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = LabwireConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.application.log_level)),
        )
        .init();

    let expected = match cli.command {
        Commands::Ts3(_) => InstrumentKind::Ts3,
        Commands::Mx100tp(_) => InstrumentKind::Mx100tp,
    };
    ensure!(
        config.instrument.kind == expected,
        "configured instrument is {:?}, not {:?}",
        config.instrument.kind,
        expected
    );

    let transport = open_transport(&config.instrument).context("failed to open transport")?;
    info!(method = %config.instrument.method, "Transport ready");

    match cli.command {
        Commands::Ts3(cmd) => run_ts3(Ts3::new(transport), cmd),
        Commands::Mx100tp(cmd) => run_mx100tp(Mx100tp::new(transport), cmd),
    }
}

fn run_ts3<T: Transport>(mut ts3: Ts3<T>, cmd: Ts3Command) -> Result<()> {
    match cmd {
        Ts3Command::Poll => {
            ts3.poll_device()?;
            println!("ok");
        }
        Ts3Command::Version => {
            let version = ts3.get_version()?;
            println!("{} (build {})", version.version, version.build);
        }
        Ts3Command::Reset => ts3.reset_device()?,
        Ts3Command::ProductId => {
            let product = ts3.get_product_id()?;
            println!("{} {}", product.article, product.name);
        }
        Ts3Command::Svn => {
            let svn = ts3.get_svn()?;
            println!("{}@{}", svn.repository, svn.revision);
        }
        Ts3Command::DutPower {
            on,
            enable,
            overrule,
        } => ts3.set_dut_power(on, enable, overrule)?,
        Ts3Command::DutPowerState => {
            let state = ts3.get_dut_power()?;
            println!("power={} enable={}", state.power, state.enable);
        }
        Ts3Command::DutPresent => println!("{}", ts3.get_dut_present()?),
        Ts3Command::SetDig { module, pin, value } => {
            ts3.set_dig_output_pin(module, pin, value != 0)?;
        }
        Ts3Command::GetDig { module, pin } => println!("{}", ts3.get_dig_input_pin(module, pin)?),
        Ts3Command::SetAna { module, pin, value } => ts3.set_ana_output_pin(module, pin, value)?,
        Ts3Command::GetAna { module, pin, range } => {
            println!("{}", ts3.get_ana_input_pin(module, pin, range)?);
        }
        Ts3Command::Date => {
            let d = ts3.get_date()?;
            println!(
                "{}-{}-{} {}:{}:{}",
                d.year, d.month, d.day, d.hour, d.minute, d.second
            );
        }
        Ts3Command::SetDate => ts3.set_date(DateFields::default())?,
        Ts3Command::Id => {
            let id = ts3.get_id()?;
            println!("{} {}", id.project_number, id.class_number);
        }
        Ts3Command::Modules => {
            for (slot, module) in ts3.get_external_modules()?.iter().enumerate() {
                println!("{slot}: {module}");
            }
        }
        Ts3Command::Flash { file } => {
            let image = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let lines = ts3.flash_firmware(image.lines())?;
            info!(lines, "Firmware flashed");
        }
    }
    Ok(())
}

fn run_mx100tp<T: Transport>(mut psu: Mx100tp<T>, cmd: Mx100tpCommand) -> Result<()> {
    match cmd {
        Mx100tpCommand::Idn => println!("{}", psu.get_instrument_identification()?),
        Mx100tpCommand::SetVoltage { channel, volts } => psu.set_channel_voltage(channel, volts)?,
        Mx100tpCommand::SetCurrent { channel, amps } => {
            psu.set_channel_current_limit(channel, amps)?;
        }
        Mx100tpCommand::Voltage { channel } => println!("{}", psu.get_channel_voltage(channel)?),
        Mx100tpCommand::Current { channel } => println!("{}", psu.get_channel_current(channel)?),
        Mx100tpCommand::On { channel } => psu.enable_channel(channel)?,
        Mx100tpCommand::Off { channel } => psu.disable_channel(channel)?,
        Mx100tpCommand::AllOff => psu.disable_all()?,
        Mx100tpCommand::Save { store } => psu.save_settings(store)?,
        Mx100tpCommand::Recall { store } => psu.recall_settings(store)?,
        Mx100tpCommand::Query { command } => println!("{}", psu.query(&command)?),
    }
    Ok(())
}
