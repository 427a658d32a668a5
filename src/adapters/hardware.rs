//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the Hall sensor, the indicator LEDs, the TWAI controller and a
//! blocking delay, exposing them through [`SensorPort`], [`BusPort`],
//! [`IndicatorPort`] and [`DelayNs`]. This is the only module in the
//! system that touches actual hardware. On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::adapters::twai::TwaiBus;
use crate::app::ports::{BusPort, BusStatus, IndicatorPort, SensorPort};
use crate::drivers::indicator_led::IndicatorLeds;
use crate::error::BusError;
use crate::sensors::hall::HallSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<R, G, D> {
    hall: HallSensor,
    leds: IndicatorLeds<R, G>,
    bus: TwaiBus,
    delay: D,
}

impl<R: OutputPin, G: OutputPin, D: DelayNs> HardwareAdapter<R, G, D> {
    pub fn new(hall: HallSensor, leds: IndicatorLeds<R, G>, bus: TwaiBus, delay: D) -> Self {
        Self {
            hall,
            leds,
            bus,
            delay,
        }
    }

    pub fn bus(&self) -> &TwaiBus {
        &self.bus
    }

    pub fn leds(&self) -> &IndicatorLeds<R, G> {
        &self.leds
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<R, G, D> SensorPort for HardwareAdapter<R, G, D> {
    fn read(&mut self) -> u16 {
        self.hall.read()
    }
}

// ── BusPort implementation ────────────────────────────────────

impl<R, G, D> BusPort for HardwareAdapter<R, G, D> {
    fn transmit(&mut self, id: u32, data: &[u8], timeout_ms: u32) -> Result<(), BusError> {
        self.bus.transmit(id, data, timeout_ms)
    }

    fn status(&mut self) -> BusStatus {
        self.bus.status()
    }

    fn initiate_recovery(&mut self) {
        self.bus.initiate_recovery();
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<R: OutputPin, G: OutputPin, D> IndicatorPort for HardwareAdapter<R, G, D> {
    fn set_channels(&mut self, red: bool, green: bool) {
        self.leds.set(red, green);
    }
}

// ── Blocking delay ────────────────────────────────────────────

impl<R, G, D: DelayNs> DelayNs for HardwareAdapter<R, G, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
