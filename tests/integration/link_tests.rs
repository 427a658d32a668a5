//! TransmissionGuard against the mock bus: recovery ordering and custom
//! failure thresholds.

use safety_node::error::BusError;
use safety_node::link::TransmissionGuard;
use safety_node::protocol::{SafetyFrame, StatusCode, ZoneEvent};

use super::mock_hw::{BusCall, MockHardware};

fn zone_frame() -> SafetyFrame {
    SafetyFrame::Zone(ZoneEvent {
        device_id: 0x01,
        status: StatusCode::ApproachMin,
    })
}

#[test]
fn custom_threshold_latches_on_exact_count() {
    let mut guard = TransmissionGuard::new(100, 100, 5);
    let mut hw = MockHardware::new(0);
    hw.fail_next(5);

    for n in 1..=4 {
        let err = guard.send(&mut hw, &zone_frame()).unwrap_err();
        assert_eq!(err.consecutive_failures, n);
        assert!(!err.link_down);
    }
    let err = guard.send(&mut hw, &zone_frame()).unwrap_err();
    assert!(err.link_down);
    assert!(guard.error_mode());

    let sent = guard.send(&mut hw, &zone_frame()).unwrap();
    assert!(sent.link_restored);
    assert_eq!(guard.consecutive_failures(), 0);
}

#[test]
fn success_below_threshold_resets_counter() {
    let mut guard = TransmissionGuard::new(100, 100, 3);
    let mut hw = MockHardware::new(0);
    hw.failures.extend([BusError::Timeout, BusError::NotRunning]);

    assert!(guard.send(&mut hw, &zone_frame()).is_err());
    assert!(guard.send(&mut hw, &zone_frame()).is_err());
    let sent = guard.send(&mut hw, &zone_frame()).unwrap();
    assert!(!sent.link_restored);
    assert_eq!(guard.consecutive_failures(), 0);

    hw.fail_next(2);
    assert!(guard.send(&mut hw, &zone_frame()).is_err());
    assert!(guard.send(&mut hw, &zone_frame()).is_err());
    assert!(!guard.error_mode());
}

#[test]
fn grace_period_follows_configuration() {
    let mut guard = TransmissionGuard::new(40, 250, 3);
    let mut hw = MockHardware::new(0);
    hw.bus_off = true;

    let sent = guard.send(&mut hw, &zone_frame()).unwrap();
    assert!(sent.recovered_bus_off);
    assert_eq!(hw.calls[2], BusCall::DelayMs(250));
    assert!(matches!(hw.calls[3], BusCall::Transmit { timeout_ms: 40, .. }));
    assert_eq!(guard.worst_case_block_ms(), 290);
}
