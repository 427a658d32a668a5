//! Unified error types for the Safety Node firmware.
//!
//! `Error` covers what can stop the node from booting. All variants are
//! `Copy`. Runtime send failures never reach it: [`BusError`] is absorbed
//! into the link-health counter, and boot failures halt the binary so the
//! task watchdog resets the chip.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`BusPort`](crate::app::ports::BusPort) transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The TX queue did not accept the frame within the timeout.
    Timeout,
    /// The controller is in bus-off and refused the frame.
    BusOff,
    /// The driver is not installed or not started.
    NotRunning,
    /// Any other driver error code.
    Driver(i32),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "transmit timed out"),
            Self::BusOff => write!(f, "controller bus-off"),
            Self::NotRunning => write!(f, "driver not running"),
            Self::Driver(rc) => write!(f, "driver error (rc={rc})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Thresholds are not strictly increasing (T1 < T2 < T3 < T4).
    ThresholdOrder,
    /// A threshold lies outside the ADC range.
    ThresholdRange,
    /// Device id is neither 0x01 nor 0x02.
    UnknownDevice(u8),
    /// A timing field failed range validation.
    Timing(&'static str),
    /// Worst-case blocking per iteration would trip the task watchdog.
    WatchdogBudget { worst_case_ms: u32, watchdog_ms: u32 },
    /// JSON could not be parsed into a configuration.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOrder => write!(f, "thresholds must satisfy T1 < T2 < T3 < T4"),
            Self::ThresholdRange => write!(f, "threshold outside ADC range"),
            Self::UnknownDevice(id) => write!(f, "unknown device id 0x{id:02X}"),
            Self::Timing(msg) => write!(f, "timing: {msg}"),
            Self::WatchdogBudget {
                worst_case_ms,
                watchdog_ms,
            } => write!(
                f,
                "worst-case iteration {worst_case_ms} ms exceeds watchdog {watchdog_ms} ms"
            ),
            Self::Malformed => write!(f, "malformed config"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
