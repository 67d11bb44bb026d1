//! TS3 reply parsing and NACK dispatch
//!
//! Replies are `;`-separated ASCII. Field 0 is framing and ignored, field 1 is
//! either the echoed command code or [`NACK_CODE`], and the remaining fields
//! are payload. For a NACK, field 2 is the cause code.

use super::frame::FIELD_SEPARATOR;
use crate::error::Ts3Error;
use tracing::warn;

/// Reply code acknowledging a "set" style command.
pub const ACK_CODE: &str = "1";
/// Reply code for a rejected command.
pub const NACK_CODE: &str = "2";

/// Fixed NACK causes, indexed by code.
///
/// Whitespace inside the messages is collapsed to single spaces; the fixture
/// documentation wraps them across lines.
pub const NACK_MESSAGES: [(&str, &str); 11] = [
    ("1", "Unknown command"),
    (
        "2",
        "Parameter out of range. One or more of the parameters are outside the range.",
    ),
    (
        "3",
        "Busy. The unit is busy and cannot handle communications.",
    ),
    (
        "4",
        "Not logged in. The command that has been sent requires a correct login.",
    ),
    (
        "5",
        "Command not yet implemented. The command is known, but the implementation is not yet done.",
    ),
    (
        "6",
        "Message structure incorrect. One or more parts of the message are incorrect (BOR, EOR, CRC, Length etc).",
    ),
    ("7", "Incorrect number of parameters for this command."),
    ("8", "ID not found."),
    (
        "9",
        "Internal error. The command could not be executed due to internal problems.",
    ),
    (
        "10",
        "Booting. The unit is still booting and cannot handle communications at this time.",
    ),
    ("11", "DUT not present."),
];

/// Fixed message for a NACK code, if the code is documented.
pub fn nack_message(code: &str) -> Option<&'static str> {
    NACK_MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

/// Error for a NACK reply. Undocumented codes carry the raw code as message.
pub fn nack_error(code: &str) -> Ts3Error {
    let message = nack_message(code).unwrap_or(code);
    warn!(code, message, "TS3 rejected command");
    Ts3Error::Nack {
        code: code.to_string(),
        message: message.to_string(),
    }
}

/// Split a raw reply and check it against `expected_code`.
///
/// Trailing line terminators are dropped before splitting.
pub fn parse_response(raw: &str, expected_code: &str) -> Result<Vec<String>, Ts3Error> {
    let fields: Vec<String> = raw
        .trim_end_matches(['\r', '\n'])
        .split(FIELD_SEPARATOR)
        .map(str::to_string)
        .collect();

    match fields.get(1).map(String::as_str) {
        Some(NACK_CODE) => Err(nack_error(
            fields.get(2).map(String::as_str).unwrap_or_default(),
        )),
        Some(code) if code == expected_code => Ok(fields),
        code => {
            warn!(expected = expected_code, received = ?code, "TS3 reply code mismatch");
            Err(Ts3Error::unexpected())
        }
    }
}

/// Typed access to the payload of an acknowledged reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    fields: Vec<String>,
}

impl Reply {
    /// Wrap parsed fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// All fields, framing included.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field `index` as text.
    pub fn text(&self, index: usize) -> Result<&str, Ts3Error> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or(Ts3Error::Malformed {
                expected: index + 1,
                actual: self.fields.len(),
            })
    }

    /// Field `index` as an owned string.
    pub fn string(&self, index: usize) -> Result<String, Ts3Error> {
        self.text(index).map(str::to_string)
    }

    /// Field `index` compared against `"1"`. Any other value is `false`.
    pub fn flag(&self, index: usize) -> Result<bool, Ts3Error> {
        self.text(index).map(|field| field == "1")
    }

    /// Field `index` as a floating point number.
    pub fn decimal(&self, index: usize) -> Result<f64, Ts3Error> {
        let field = self.text(index)?;
        field
            .trim()
            .parse::<f64>()
            .map_err(|_| Ts3Error::InvalidPayload {
                field: field.to_string(),
                kind: "decimal number",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_reply() {
        let fields = parse_response("0;1;", ACK_CODE).unwrap();
        assert_eq!(fields, vec!["0", "1", ""]);
    }

    #[test]
    fn test_echoed_code_returns_all_fields() {
        let fields = parse_response("$020;15;1234;TS3 base\r", "15").unwrap();
        assert_eq!(fields, vec!["$020", "15", "1234", "TS3 base"]);
    }

    #[test]
    fn test_busy_nack() {
        match parse_response("0;2;3;", ACK_CODE) {
            Err(Ts3Error::Nack { code, message }) => {
                assert_eq!(code, "3");
                assert!(message.starts_with("Busy."));
            }
            other => panic!("expected NACK, got {other:?}"),
        }
    }

    #[test]
    fn test_nack_wins_over_expected_code() {
        // A NACK is a NACK even when the caller expects code "2".
        assert!(matches!(
            parse_response("0;2;11", "2"),
            Err(Ts3Error::Nack { .. })
        ));
    }

    #[test]
    fn test_unknown_nack_code_is_verbatim() {
        match parse_response("0;2;42", ACK_CODE) {
            Err(Ts3Error::Nack { code, message }) => {
                assert_eq!(code, "42");
                assert_eq!(message, "42");
            }
            other => panic!("expected NACK, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatch_is_sentinel() {
        assert!(matches!(
            parse_response("0;99;", ACK_CODE),
            Err(Ts3Error::UnexpectedCode { code: -1 })
        ));
        assert!(matches!(
            parse_response("", ACK_CODE),
            Err(Ts3Error::UnexpectedCode { code: -1 })
        ));
    }

    #[test]
    fn test_vocabulary_is_complete() {
        for code in 1..=11 {
            assert!(nack_message(&code.to_string()).is_some(), "code {code}");
        }
        assert_eq!(nack_message("1"), Some("Unknown command"));
        assert_eq!(nack_message("11"), Some("DUT not present."));
        assert_eq!(nack_message("12"), None);
    }

    #[test]
    fn test_reply_accessors() {
        let reply = Reply::new(parse_response("0;43;3.14", "43").unwrap());
        assert_eq!(reply.fields(), ["0", "43", "3.14"]);
        assert_eq!(reply.decimal(2).unwrap(), 3.14);
        assert!(matches!(
            reply.text(3),
            Err(Ts3Error::Malformed {
                expected: 4,
                actual: 3
            })
        ));

        let reply = Reply::new(vec!["0".into(), "25".into(), "yes".into()]);
        assert!(!reply.flag(2).unwrap());
        assert!(matches!(
            reply.decimal(2),
            Err(Ts3Error::InvalidPayload { .. })
        ));
    }
}
