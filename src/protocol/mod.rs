//! Wire format of the TS3 fixture protocol.
//!
//! [`frame`] builds outbound frames, [`response`] parses replies. Neither does
//! any I/O; [`crate::instrument::Ts3`] ties them to a transport.

pub mod frame;
pub mod response;

pub use frame::{build_frame, checksum};
pub use response::{nack_message, parse_response, Reply, ACK_CODE, NACK_CODE};
