//! TS3 fixture driver against scripted transports
//!
//! Every test drives the public `Ts3` API over a `MockTransport`, so the frames
//! written and the replies parsed are exactly what a fixture would see.

use labwire::adapters::MockTransport;
use labwire::error::Ts3Error;
use labwire::instrument::{DiffAnalogInput, ManualClock, Ts3};
use labwire::instrument::ts3::DUT_POWER_SETTLE;
use std::io;
use std::time::Duration;
use tracing_test::traced_test;

fn fixture(replies: &[&str]) -> Ts3<MockTransport> {
    Ts3::new(MockTransport::with_replies(replies.iter().copied()))
}

#[test]
fn test_poll_acknowledged() {
    let mut ts3 = fixture(&["0;1;"]);
    ts3.poll_device().unwrap();
    assert_eq!(ts3.transport().sent(), &[b"$012;10;26C6\r".to_vec()]);
}

#[test]
fn test_busy_nack_is_reported() {
    let mut ts3 = fixture(&["0;2;3;"]);
    match ts3.poll_device() {
        Err(Ts3Error::Nack { code, message }) => {
            assert_eq!(code, "3");
            assert_eq!(
                message,
                "Busy. The unit is busy and cannot handle communications."
            );
        }
        other => panic!("expected NACK, got {other:?}"),
    }
}

#[test]
fn test_wrong_code_is_sentinel() {
    let mut ts3 = fixture(&["0;99;"]);
    match ts3.poll_device() {
        Err(Ts3Error::UnexpectedCode { code }) => assert_eq!(code, -1),
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[test]
fn test_analog_input_value() {
    let mut ts3 = fixture(&["0;43;3.14"]);
    let value = ts3.get_ana_input_pin(1, 4, 0).unwrap();
    assert!((value - 3.14).abs() < f64::EPSILON);
    assert!(ts3.transport().sent_strings()[0].starts_with("$018;43;1;4;0;"));
}

#[test]
fn test_analog_input_not_numeric() {
    let mut ts3 = fixture(&["0;43;n/a"]);
    assert!(matches!(
        ts3.get_ana_input_pin(1, 4, 0),
        Err(Ts3Error::InvalidPayload { .. })
    ));
}

#[test]
fn test_boolean_replies() {
    let mut ts3 = fixture(&["0;25;1", "0;25;0", "0;25;true"]);
    assert!(ts3.get_dut_present().unwrap());
    assert!(!ts3.get_dut_present().unwrap());
    assert!(!ts3.get_dut_present().unwrap());
}

#[test]
fn test_dut_power_waits_after_ack() {
    let clock = ManualClock::new();
    let mut ts3 = Ts3::with_clock(MockTransport::with_replies(["0;1;"]), clock.clone());

    ts3.set_dut_power(true, true, false).unwrap();

    assert!(clock.elapsed() >= Duration::from_millis(500));
    assert_eq!(clock.elapsed(), DUT_POWER_SETTLE);
    assert!(ts3.transport().sent_strings()[0].starts_with("$018;24;1;1;0;"));
}

#[test]
fn test_dut_power_nack_skips_wait() {
    let clock = ManualClock::new();
    let mut ts3 = Ts3::with_clock(MockTransport::with_replies(["0;2;11"]), clock.clone());

    match ts3.set_dut_power(true, false, false) {
        Err(Ts3Error::Nack { code, message }) => {
            assert_eq!(code, "11");
            assert_eq!(message, "DUT not present.");
        }
        other => panic!("expected NACK, got {other:?}"),
    }
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn test_dut_power_state_uses_ack_code() {
    let mut ts3 = fixture(&["0;1;1;0"]);
    let state = ts3.get_dut_power().unwrap();
    assert!(state.power);
    assert!(!state.enable);
}

#[test]
fn test_differential_input_arguments() {
    let mut ts3 = fixture(&["0;46;-0.25"]);
    let input = DiffAnalogInput {
        module_a: 1,
        pin_a: 2,
        range_a: 0,
        delay: 10,
        module_b: 1,
        pin_b: 3,
        range_b: 0,
    };
    assert_eq!(ts3.get_diff_ana_input_pin(input).unwrap(), -0.25);
    assert!(ts3.transport().sent_strings()[0].contains(";46;1;2;0;10;1;3;0;"));
}

#[test]
fn test_external_modules_slots() {
    let reply = format!("0;88;{}", vec!["-"; 16].join(";"));
    let mut ts3 = fixture(&[reply.as_str()]);
    let modules = ts3.get_external_modules().unwrap();
    assert_eq!(modules.len(), 16);

    let mut ts3 = fixture(&["0;88;a;b"]);
    assert!(matches!(
        ts3.get_external_modules(),
        Err(Ts3Error::Malformed { .. })
    ));
}

#[test]
fn test_flash_firmware_stops_on_nack() {
    let mut ts3 = fixture(&["0;1;", "0;2;6"]);
    let image = "S00600004844521B\nS1130000285F245F2212226A000424290008237C2A\nS9030000FC\n";
    assert!(matches!(
        ts3.flash_firmware(image.lines()),
        Err(Ts3Error::Nack { .. })
    ));
    // Two lines went out, the rejected one being the last.
    assert_eq!(ts3.transport().sent().len(), 2);
}

#[test]
fn test_flash_firmware_then_flash() {
    let mut ts3 = fixture(&["0;1;", "0;1;", "0;1;"]);
    let sent = ts3.flash_firmware(["S00600004844521B", "", "S9030000FC"]).unwrap();
    assert_eq!(sent, 2);
    let frames = ts3.transport().sent_strings();
    assert!(frames[2].starts_with("$013;201;"));
}

#[test]
fn test_transport_failure_propagates() {
    let mut transport = MockTransport::new();
    transport.push_error(io::ErrorKind::BrokenPipe);
    let mut ts3 = Ts3::new(transport);
    match ts3.get_version() {
        Err(Ts3Error::Transport(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
#[traced_test]
fn test_nack_is_logged() {
    let mut ts3 = fixture(&["0;2;1"]);
    assert!(ts3.reset_device().is_err());
    assert!(logs_contain("TS3 rejected command"));
    assert!(logs_contain("Unknown command"));
}

#[test]
fn test_borrowed_transport() {
    let mut transport = MockTransport::with_replies(["0;13;2;7;1042"]);
    {
        let mut ts3 = Ts3::new(&mut transport);
        let version = ts3.get_version().unwrap();
        assert_eq!(version.version, "2.7");
        assert_eq!(version.build, "1042");
    }
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn test_uart_payload_must_be_text() {
    let mut transport = MockTransport::new();
    transport.push_reply(b"0;101;\xff\xfeAB");
    transport.push_reply("0;101;AB");
    let mut ts3 = Ts3::new(transport);

    assert!(matches!(ts3.uart_rxd(0, 0), Err(Ts3Error::Encoding(_))));
    // The bad reply is consumed; the next exchange is unaffected.
    assert_eq!(ts3.uart_rxd(0, 0).unwrap(), "AB");
}
