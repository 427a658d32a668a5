//! Integration tests for the MonitorService → guard → bus/indicator pipeline.
//!
//! These run on the host (x86_64) and drive the service through its public
//! `start` / `poll` API with a scripted sensor and bus.

use safety_node::app::events::AppEvent;
use safety_node::app::service::MonitorService;
use safety_node::config::MonitorConfig;
use safety_node::error::BusError;
use safety_node::indicator::IndicatorPattern;
use safety_node::protocol::{CAN_ID_SAFETY, SafetyFrame, StatusCode, ZoneEvent};
use safety_node::zone::Zone;

use super::mock_hw::{BusCall, MockHardware, RecordingSink};

const HEARTBEAT_1: [u8; 1] = [0x01];

fn make_service(seed: u16) -> (MonitorService, MockHardware, RecordingSink) {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut hw = MockHardware::new(seed);
    let mut sink = RecordingSink::new();
    svc.start(0, &mut hw, &mut sink);
    (svc, hw, sink)
}

/// Feed `readings` one per debounce period after start, returning the
/// status code emitted by each pass.
fn feed(
    svc: &mut MonitorService,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    readings: &[u16],
) -> Vec<Option<StatusCode>> {
    readings
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            hw.reading = r;
            let now = 50 * (i as u32 + 1);
            let report = svc.poll(now, hw, sink);
            report.pass.and_then(|p| p.event).map(|e| e.status)
        })
        .collect()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_announces_and_sends_boot_heartbeat() {
    let (svc, hw, sink) = make_service(2700);

    assert_eq!(hw.sent(), vec![HEARTBEAT_1.to_vec()]);
    assert!(matches!(
        hw.calls.last(),
        Some(BusCall::Transmit { id: CAN_ID_SAFETY, timeout_ms: 100, .. })
    ));
    assert_eq!(
        sink.events[0],
        AppEvent::Started {
            device_id: 0x01,
            reading: 2700,
            zone: Zone::Normal,
        }
    );
    assert_eq!(svc.zone(), Zone::Normal);
    assert_eq!(hw.last_leds(), Some((false, false)));
}

#[test]
fn booting_inside_a_limit_stays_silent_until_reentry() {
    let (mut svc, mut hw, mut sink) = make_service(3500);
    assert_eq!(svc.zone(), Zone::MaxLimit);
    assert_eq!(hw.last_leds(), Some((false, true)));

    let events = feed(&mut svc, &mut hw, &mut sink, &[3500, 3500, 3200, 3500]);
    assert_eq!(
        events,
        vec![
            None,
            None,
            Some(StatusCode::ApproachMax),
            Some(StatusCode::MaxLimit)
        ]
    );
}

// ── Zone events ───────────────────────────────────────────────

#[test]
fn max_limit_entry_fires_once() {
    let (mut svc, mut hw, mut sink) = make_service(3000);
    let events = feed(&mut svc, &mut hw, &mut sink, &[3000, 3400, 3400, 3400]);
    assert_eq!(events, vec![None, Some(StatusCode::MaxLimit), None, None]);
    assert_eq!(hw.sent(), vec![HEARTBEAT_1.to_vec(), vec![0x01, 0x20]]);
}

#[test]
fn normal_range_sends_nothing() {
    let (mut svc, mut hw, mut sink) = make_service(2800);
    let events = feed(&mut svc, &mut hw, &mut sink, &[2700, 2800, 2500]);
    assert_eq!(events, vec![None, None, None]);
    assert_eq!(hw.sent().len(), 1);
    assert_eq!(svc.pass_count(), 3);
}

#[test]
fn decreasing_sweep_sends_min_limit_once() {
    let (mut svc, mut hw, mut sink) = make_service(2300);
    let events = feed(&mut svc, &mut hw, &mut sink, &[2250, 2200, 2100, 2000, 1000]);
    assert_eq!(
        events,
        vec![None, None, Some(StatusCode::MinLimit), None, None]
    );
    assert_eq!(svc.zone(), Zone::MinLimit);
    assert_eq!(hw.last_leds(), Some((true, false)));
}

#[test]
fn approach_dwell_then_reentry() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    let events = feed(
        &mut svc,
        &mut hw,
        &mut sink,
        &[2400, 2400, 2300, 2350, 2700, 2400],
    );
    assert_eq!(
        events,
        vec![
            Some(StatusCode::ApproachMin),
            None,
            None,
            None,
            None,
            Some(StatusCode::ApproachMin)
        ]
    );
}

#[test]
fn zone_changes_are_reported_in_order() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    sink.clear();
    feed(&mut svc, &mut hw, &mut sink, &[3000, 3400]);

    let changes: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ZoneChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (Zone::Normal, Zone::ApproachMax),
            (Zone::ApproachMax, Zone::MaxLimit)
        ]
    );
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::FrameSent(SafetyFrame::Zone(ZoneEvent {
            device_id: 0x01,
            status: StatusCode::MaxLimit,
        })))
    );
}

#[test]
fn second_device_id_is_carried_on_every_frame() {
    let config = MonitorConfig::from_json(r#"{ "device_id": 2 }"#).unwrap();
    config.validate().unwrap();
    let mut svc = MonitorService::new(config);
    let mut hw = MockHardware::new(2700);
    let mut sink = RecordingSink::new();
    svc.start(0, &mut hw, &mut sink);
    hw.reading = 2000;
    svc.poll(50, &mut hw, &mut sink);

    assert_eq!(hw.sent(), vec![vec![0x02], vec![0x02, 0x10]]);
}

// ── Timing ────────────────────────────────────────────────────

#[test]
fn heartbeat_every_interval_regardless_of_zone() {
    let (mut svc, mut hw, mut sink) = make_service(2700);

    assert!(!svc.poll(4_999, &mut hw, &mut sink).heartbeat);
    assert!(svc.poll(5_000, &mut hw, &mut sink).heartbeat);
    hw.reading = 3500;
    assert!(!svc.poll(9_000, &mut hw, &mut sink).heartbeat);
    assert!(svc.poll(10_000, &mut hw, &mut sink).heartbeat);

    let heartbeats = hw.sent().iter().filter(|p| p.len() == 1).count();
    assert_eq!(heartbeats, 3);
}

#[test]
fn heartbeat_survives_clock_wrap() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut hw = MockHardware::new(2700);
    let mut sink = RecordingSink::new();
    let start = u32::MAX - 1_000;
    svc.start(start, &mut hw, &mut sink);

    assert!(!svc.poll(start.wrapping_add(4_999), &mut hw, &mut sink).heartbeat);
    assert!(svc.poll(start.wrapping_add(5_000), &mut hw, &mut sink).heartbeat);
}

#[test]
fn debounce_gate_limits_pass_rate() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    let mut passes = 0;
    for now in (5..=500).step_by(5) {
        if svc.poll(now, &mut hw, &mut sink).pass.is_some() {
            passes += 1;
        }
    }
    assert_eq!(passes, 10);
    assert_eq!(svc.pass_count(), 10);
}

// ── Link health ───────────────────────────────────────────────

#[test]
fn error_alternate_until_next_success() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    hw.fail_next(5);

    // Alternate between the two limits so every pass attempts a send.
    let mut patterns = Vec::new();
    for (i, reading) in [2000, 3400, 2000, 3400, 2000, 3400].into_iter().enumerate() {
        hw.reading = reading;
        let pass = svc
            .poll(50 * (i as u32 + 1), &mut hw, &mut sink)
            .pass
            .unwrap();
        assert!(pass.event.is_some());
        patterns.push(pass.indicator.pattern);
    }

    assert_eq!(
        patterns,
        vec![
            IndicatorPattern::RedSolid,
            IndicatorPattern::GreenSolid,
            IndicatorPattern::ErrorAlternate,
            IndicatorPattern::ErrorAlternate,
            IndicatorPattern::ErrorAlternate,
            IndicatorPattern::GreenSolid,
        ]
    );
    assert!(!svc.error_mode());
    assert_eq!(svc.consecutive_failures(), 0);
}

#[test]
fn link_down_and_restored_are_reported_once() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    sink.clear();
    hw.fail_next(4);
    for step in 1..=4u32 {
        svc.poll(step * 5_000, &mut hw, &mut sink);
    }
    svc.poll(25_000, &mut hw, &mut sink);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::LinkDown { consecutive_failures: 3 })),
        1
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LinkDown { .. })), 1);
    assert_eq!(sink.count(|e| *e == AppEvent::LinkRestored), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SendFailed { cause: BusError::Timeout, .. })),
        4
    );
}

#[test]
fn error_mode_overrides_every_zone() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    hw.fail_next(10);
    for step in 1..=3u32 {
        svc.poll(step * 5_000, &mut hw, &mut sink);
    }
    assert!(svc.error_mode());

    // The bus keeps failing, so zone events below cannot clear the latch.
    let mut now = 15_000;
    for reading in [2000, 2300, 2700, 3000, 3500] {
        hw.reading = reading;
        now += 50;
        let pass = svc.poll(now, &mut hw, &mut sink).pass.unwrap();
        assert_eq!(pass.indicator.pattern, IndicatorPattern::ErrorAlternate);
        assert_ne!(pass.indicator.red, pass.indicator.green);
    }
}

#[test]
fn bus_off_recovers_before_transmit() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    hw.calls.clear();
    sink.clear();
    hw.bus_off = true;

    svc.poll(5_000, &mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        vec![
            BusCall::Status,
            BusCall::Recover,
            BusCall::DelayMs(100),
            BusCall::Transmit {
                id: CAN_ID_SAFETY,
                data: HEARTBEAT_1.to_vec(),
                timeout_ms: 100,
            },
        ]
    );
    assert_eq!(
        sink.events[..2],
        [
            AppEvent::BusOffRecovery,
            AppEvent::FrameSent(SafetyFrame::Heartbeat { device_id: 0x01 })
        ]
    );
}

#[test]
fn persistent_bus_off_counts_as_failure() {
    let (mut svc, mut hw, mut sink) = make_service(2700);
    hw.bus_off = true;
    hw.recovery_clears = false;

    for step in 1..=3u32 {
        svc.poll(step * 5_000, &mut hw, &mut sink);
    }

    assert_eq!(hw.recoveries(), 3);
    assert!(svc.error_mode());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SendFailed { cause: BusError::BusOff, .. })),
        3
    );
}
