//! HardwareAdapter on the host simulation backends.
//!
//! The sim hooks are process-wide atomics, so everything that touches them
//! lives in this single test.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use safety_node::adapters::hardware::HardwareAdapter;
use safety_node::adapters::twai::{self, TwaiBus};
use safety_node::app::events::AppEvent;
use safety_node::app::service::MonitorService;
use safety_node::config::MonitorConfig;
use safety_node::drivers::indicator_led::IndicatorLeds;
use safety_node::pins;
use safety_node::zone::Zone;
use safety_node::sensors::hall::{self, HallSensor};

use super::mock_hw::RecordingSink;

#[derive(Default)]
struct Pin;

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[test]
fn simulated_node_reports_zones_and_recovers_bus_off() {
    let config = MonitorConfig::default();
    let bus = TwaiBus::install(pins::CAN_TX_GPIO, pins::CAN_RX_GPIO, config.can_bitrate).unwrap();
    let leds = IndicatorLeds::new(Pin, Pin);
    let mut hw = HardwareAdapter::new(HallSensor::new(), leds, bus, NoDelay);
    let mut sink = RecordingSink::new();
    let mut svc = MonitorService::new(config);

    hall::sim_set_hall_adc(2700);
    svc.start(0, &mut hw, &mut sink);
    assert_eq!(hw.bus().frames_sent(), 1);

    hall::sim_set_hall_adc(3400);
    let pass = svc.poll(50, &mut hw, &mut sink).pass.unwrap();
    assert!(pass.delivered);
    assert_eq!(hw.bus().frames_sent(), 2);
    assert_eq!(hw.leds().current(), (false, true));

    // A failed ADC conversion holds the last reading: no phantom min-limit.
    hall::sim_set_hall_adc(2000);
    hall::sim_fail_next_read(1);
    let pass = svc.poll(100, &mut hw, &mut sink).pass.unwrap();
    assert_eq!(pass.reading, 3400);
    assert_eq!(pass.zone, Zone::MaxLimit);
    assert_eq!(pass.event, None);
    assert_eq!(hw.bus().frames_sent(), 2);
    hall::sim_set_hall_adc(3400);

    // Recovery leaves the controller stopped; the following transmit
    // restarts it and the frame goes out.
    twai::sim_set_bus_off(true);
    let recoveries = twai::sim_recoveries();
    let restarts = twai::sim_restarts();
    let report = svc.poll(5_000, &mut hw, &mut sink);
    assert!(report.heartbeat);
    assert_eq!(twai::sim_recoveries(), recoveries + 1);
    assert_eq!(twai::sim_restarts(), restarts + 1);
    assert_eq!(hw.bus().frames_sent(), 3);
    assert!(sink.events.contains(&AppEvent::BusOffRecovery));

    twai::sim_fail_next(3);
    for step in 2..=4u32 {
        svc.poll(step * 5_000, &mut hw, &mut sink);
    }
    assert!(svc.error_mode());
    svc.poll(25_000, &mut hw, &mut sink);
    assert!(!svc.error_mode());
    assert_eq!(hw.bus().frames_sent(), 4);
}
