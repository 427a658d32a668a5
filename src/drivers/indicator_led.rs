//! Red/green indicator LED driver.
//!
//! Two discrete LEDs on plain push-pull outputs, active HIGH. Generic over
//! `embedded-hal` output pins: `esp-idf-hal` `PinDriver`s on target, mock
//! pins in tests.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

pub struct IndicatorLeds<R, G> {
    red: R,
    green: G,
    current: (bool, bool),
}

impl<R: OutputPin, G: OutputPin> IndicatorLeds<R, G> {
    /// Take ownership of the pins and drive both LEDs off.
    pub fn new(red: R, green: G) -> Self {
        let mut leds = Self {
            red,
            green,
            current: (true, true),
        };
        leds.off();
        leds
    }

    /// Drive both channels. Pin errors are logged, never propagated.
    pub fn set(&mut self, red: bool, green: bool) {
        if self.red.set_state(PinState::from(red)).is_err() {
            warn!("indicator: red pin write failed");
        }
        if self.green.set_state(PinState::from(green)).is_err() {
            warn!("indicator: green pin write failed");
        }
        self.current = (red, green);
    }

    pub fn off(&mut self) {
        self.set(false, false);
    }

    /// Last commanded (red, green) levels.
    pub fn current(&self) -> (bool, bool) {
        self.current
    }
}
