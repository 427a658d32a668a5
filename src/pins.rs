//! GPIO / peripheral pin assignments for the Safety Node board
//! (Wemos/Lolin S2 Mini, ESP32-S2FN4R2).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// TWAI (CAN) transceiver
// ---------------------------------------------------------------------------

pub const CAN_TX_GPIO: i32 = 5;
pub const CAN_RX_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Hall position sensor (ADC1)
// ---------------------------------------------------------------------------

/// Analog Hall sensor output. ADC1 channel 0 (GPIO 1, "A0").
pub const HALL_ADC_GPIO: i32 = 1;
/// ADC1 channel carrying the Hall sensor.
pub const HALL_ADC_CHANNEL: u32 = 0;
/// Native SAR resolution of the ESP32-S2.
pub const ADC_NATIVE_BITS: u32 = 13;
/// Readings are reported on a 12-bit scale, 0–4095.
pub const ADC_MAX: u16 = 4095;

// ---------------------------------------------------------------------------
// Indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

pub const LED_GREEN_GPIO: i32 = 39;
pub const LED_RED_GPIO: i32 = 40;
