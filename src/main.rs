//! Safety Node Firmware: Main Entry Point
//!
//! Polls a Hall position sensor, classifies the reading into safety
//! zones and reports zone events plus a periodic heartbeat on CAN.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter               LogEventSink     Esp32Time      │
//! │  (Sensor+Bus+Indicator+Delay)  (EventSink)      (uptime)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              MonitorService (pure logic)               │    │
//! │  │  Classifier · EdgeEmitter · TransmissionGuard ·        │    │
//! │  │  IndicatorEngine                                       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info};

use safety_node::adapters::hardware::HardwareAdapter;
use safety_node::adapters::log_sink::LogEventSink;
use safety_node::adapters::time::Esp32TimeAdapter;
use safety_node::adapters::twai::TwaiBus;
use safety_node::app::service::MonitorService;
use safety_node::config::MonitorConfig;
use safety_node::drivers::hw_init;
use safety_node::drivers::indicator_led::IndicatorLeds;
use safety_node::drivers::watchdog::Watchdog;
use safety_node::pins;
use safety_node::sensors::hall::HallSensor;

/// Loop yield between polls; keeps the idle task fed.
const LOOP_YIELD_MS: u32 = 5;

// The LED pins below are typed peripherals; keep them in step with `pins`.
const _: () = assert!(pins::LED_RED_GPIO == 40 && pins::LED_GREEN_GPIO == 39);

fn halt() -> ! {
    // Watchdog not subscribed yet: the node stays silent until power-cycled.
    loop {
        FreeRtos::delay_ms(1000);
    }
}

/// Validate the configuration and claim the ADC and the CAN controller.
fn bring_up(config: &MonitorConfig) -> safety_node::error::Result<TwaiBus> {
    config.validate()?;
    hw_init::init_peripherals()?;
    let bus = TwaiBus::install(pins::CAN_TX_GPIO, pins::CAN_RX_GPIO, config.can_bitrate)?;
    Ok(bus)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Safety Node v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration + peripherals ────────────────────────
    let config = MonitorConfig::default();
    info!(
        "Device 0x{:02X} | thresholds {:?} | {} bit/s",
        config.device_id, config.thresholds, config.can_bitrate
    );

    let bus = match bring_up(&config) {
        Ok(bus) => bus,
        Err(e) => {
            error!("Bring-up failed: {}, halting", e);
            halt();
        }
    };

    let peripherals = Peripherals::take()?;
    let red = PinDriver::output(peripherals.pins.gpio40)?;
    let green = PinDriver::output(peripherals.pins.gpio39)?;
    let leds = IndicatorLeds::new(red, green);

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 3. Assemble the service ───────────────────────────────
    let mut hw = HardwareAdapter::new(HallSensor::new(), leds, bus, FreeRtos);
    let mut sink = LogEventSink::new();
    let time = Esp32TimeAdapter::new();
    let mut svc = MonitorService::new(config);

    svc.start(time.uptime_ms(), &mut hw, &mut sink);
    info!("System ready. Entering polling loop.");

    // ── 4. Polling loop ───────────────────────────────────────
    loop {
        watchdog.feed();
        svc.poll(time.uptime_ms(), &mut hw, &mut sink);
        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}
