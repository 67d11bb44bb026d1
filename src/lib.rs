//! Core library for labwire.
//!
//! Command/response drivers for laboratory instruments and production test
//! fixtures, independent of the physical link:
//!
//! - [`adapters`]: the [`Transport`](adapters::Transport) contract with serial,
//!   TCP and mock implementations.
//! - [`protocol`]: frame building and reply parsing for the TS3 fixture protocol.
//! - [`instrument`]: the [`Ts3`](instrument::Ts3) fixture driver and the
//!   [`Mx100tp`](instrument::Mx100tp) power supply driver.
//! - [`config`]: figment-based configuration and the transport factory.
//! - [`error`]: error types for every layer.
//!
//! All I/O is synchronous and blocking. Drivers take `&mut self`, so a
//! transport only ever carries one exchange at a time.

pub mod adapters;
pub mod config;
pub mod error;
pub mod instrument;
pub mod protocol;

pub use error::{AppResult, LabwireError};
