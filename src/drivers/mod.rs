//! Peripheral drivers and one-shot hardware initialisation.

pub mod hw_init;
pub mod indicator_led;
pub mod watchdog;
