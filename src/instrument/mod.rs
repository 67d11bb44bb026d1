//! Instrument drivers
//!
//! Each driver owns a [`Transport`](crate::adapters::Transport) and exposes
//! one method per device operation. [`Ts3`] speaks the framed, checksummed
//! fixture protocol; [`Mx100tp`] speaks plain-text SCPI lines.

pub mod clock;
pub mod mx100tp;
pub mod ts3;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mx100tp::{Damping, MultiAction, Mx100tp, NetConfig, Switch};
pub use ts3::{
    ConfigurationDate, DateFields, DiffAnalogInput, DutPowerState, FirmwareVersion,
    FixtureId, ModuleDetails, ProductId, SvnInfo, Ts3, UartSettings,
};
