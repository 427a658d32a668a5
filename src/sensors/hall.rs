//! Analog Hall-effect position sensor.
//!
//! The sensor output swings with the magnet's distance and is sampled on
//! ADC1 channel 0. Readings are reported on a 12-bit scale and passed to
//! the classifier unfiltered.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: one-shot conversion via [`hw_init::adc1_read`].
//! On host/test: returns the value last set with [`sim_set_hall_adc`]
//! (mid-band by default). [`sim_fail_next_read`] queues driver errors.
//!
//! A failed conversion keeps the last good reading rather than reporting
//! 0, which the classifier would treat as a min-limit crossing.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use log::warn;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_HALL_ADC: AtomicU16 = AtomicU16::new(2660);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_hall_adc(value: u16) {
    SIM_HALL_ADC.store(value.min(crate::pins::ADC_MAX), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
static SIM_READ_FAILURES: AtomicU32 = AtomicU32::new(0);

/// Make the next `n` conversions fail with a driver error.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_next_read(n: u32) {
    SIM_READ_FAILURES.store(n, Ordering::Relaxed);
}

pub struct HallSensor {
    last: u16,
}

impl Default for HallSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl HallSensor {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    pub fn read(&mut self) -> u16 {
        match self.read_raw() {
            Ok(value) => self.last = value,
            Err(code) => warn!("Hall: ADC read failed ({}), holding {}", code, self.last),
        }
        self.last
    }

    /// Most recent good value returned by [`read`](Self::read).
    pub fn last(&self) -> u16 {
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self) -> Result<u16, i32> {
        hw_init::adc1_read(pins::HALL_ADC_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self) -> Result<u16, i32> {
        let failing = SIM_READ_FAILURES
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(-1);
        }
        Ok(SIM_HALL_ADC.load(Ordering::Relaxed))
    }
}
