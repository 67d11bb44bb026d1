//! TS3 outbound frame construction
//!
//! Frame layout: `$LLL;ARG1;...;ARGN;CCCC\r`
//!
//! - `LLL`: zero-padded decimal length of the provisional command string
//! - `CCCC`: CRC-16 of the provisional command string, four uppercase hex
//!   digits with the two byte halves swapped
//!
//! The provisional command string is `$000;ARG1;...;ARGN;0000`, i.e. the
//! checksum is taken over the frame with a zero length field and a zero
//! checksum field. The fixture firmware validates against exactly this, so the
//! checksum must not be recomputed over the final length.

use crc::{Crc, CRC_16_MODBUS};

/// CRC-16 with polynomial 0x8005, init 0xFFFF, reflected in/out, no final XOR.
pub const TS3_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Start-of-frame marker.
pub const FRAME_START: char = '$';
/// End-of-frame marker.
pub const FRAME_END: char = '\r';
/// Field separator, shared by frames and replies.
pub const FIELD_SEPARATOR: &str = ";";

const PLACEHOLDER_CHECKSUM: &str = "0000";

/// Checksum field for `data`: CRC as four hex digits, halves swapped.
pub fn checksum(data: &[u8]) -> String {
    let crc = TS3_CRC.checksum(data);
    let hex = format!("{crc:04X}");
    format!("{}{}", &hex[2..], &hex[..2])
}

fn format_command(length: usize, joined: &str, checksum: &str) -> String {
    format!("{FRAME_START}{length:03}{FIELD_SEPARATOR}{joined}{FIELD_SEPARATOR}{checksum}")
}

/// Provisional command string the checksum is computed over.
pub fn provisional_command<S: AsRef<str>>(args: &[S]) -> String {
    format_command(0, &join_args(args), PLACEHOLDER_CHECKSUM)
}

/// Build the complete frame for `args` (command code first).
pub fn build_frame<S: AsRef<str>>(args: &[S]) -> Vec<u8> {
    let joined = join_args(args);
    let provisional = format_command(0, &joined, PLACEHOLDER_CHECKSUM);
    let crc = checksum(provisional.as_bytes());

    let mut frame = format_command(provisional.len(), &joined, &crc);
    frame.push(FRAME_END);
    frame.into_bytes()
}

fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Render a boolean argument as `0`/`1`.
pub fn flag(value: bool) -> String {
    u8::from(value).to_string()
}

/// Render a decimal argument.
///
/// Integral values keep a trailing `.0`. Very large and very small values use
/// a signed, at least two digit exponent (`1e+16`, `1e-05`), which is the
/// notation the instruments are driven with.
pub fn decimal(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}
