//! System configuration parameters
//!
//! All tunable parameters for the Safety Node. Defaults are the values the
//! board ships with; a JSON blob (provisioning, bench fixtures) may
//! override them via [`MonitorConfig::from_json`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::indicator::BLINK_PERIOD_MS;
use crate::link::ERROR_THRESHOLD;
use crate::pins::ADC_MAX;
use crate::protocol::{DEVICE_ID_1, DEVICE_ID_2};
use crate::zone::Thresholds;

/// Device id baked in at build time (`SAFETY_DEVICE_ID=2 cargo build`).
pub fn build_device_id() -> u8 {
    match option_env!("SAFETY_DEVICE_ID") {
        Some("2") => DEVICE_ID_2,
        _ => DEVICE_ID_1,
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Identity ---
    /// Which monitored axis this node reports for (0x01 or 0x02).
    pub device_id: u8,

    // --- Zones ---
    pub thresholds: Thresholds,

    // --- CAN ---
    /// TWAI nominal bitrate (bit/s).
    pub can_bitrate: u32,
    /// Maximum time a frame may wait for the TX queue.
    pub tx_timeout_ms: u32,
    /// Wait after initiating bus-off recovery, before transmitting.
    pub recovery_grace_ms: u32,
    /// Consecutive send failures that latch error-mode.
    pub error_threshold: u32,

    // --- Timing ---
    /// Liveness beacon period.
    pub heartbeat_interval_ms: u32,
    /// Minimum time between classification passes.
    pub debounce_ms: u32,
    /// Full indicator blink period (on + off).
    pub blink_period_ms: u32,
    /// Task watchdog timeout.
    pub watchdog_timeout_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_id: build_device_id(),
            thresholds: Thresholds::default(),

            // CAN
            can_bitrate: 500_000,
            tx_timeout_ms: 100,
            recovery_grace_ms: 100,
            error_threshold: ERROR_THRESHOLD,

            // Timing
            heartbeat_interval_ms: 5_000,
            debounce_ms: 50,
            blink_period_ms: BLINK_PERIOD_MS,
            watchdog_timeout_ms: 2_000,
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Worst-case blocking per loop iteration: a heartbeat and a zone
    /// event can both go out in one pass, each possibly preceded by a
    /// bus-off recovery wait.
    pub fn worst_case_iteration_ms(&self) -> u32 {
        self.recovery_grace_ms
            .saturating_add(self.tx_timeout_ms)
            .saturating_mul(2)
    }

    /// Reject configurations that break zone ordering or could trip the
    /// task watchdog.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id != DEVICE_ID_1 && self.device_id != DEVICE_ID_2 {
            return Err(ConfigError::UnknownDevice(self.device_id));
        }
        if !self.thresholds.is_ordered() {
            return Err(ConfigError::ThresholdOrder);
        }
        if self.thresholds.max_limit >= ADC_MAX {
            return Err(ConfigError::ThresholdRange);
        }
        if !(10..=50).contains(&self.debounce_ms) {
            return Err(ConfigError::Timing("debounce_ms must be 10-50"));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Timing("heartbeat_interval_ms must be > 0"));
        }
        if self.blink_period_ms < 2 {
            return Err(ConfigError::Timing("blink_period_ms must be >= 2"));
        }
        if self.tx_timeout_ms == 0 {
            return Err(ConfigError::Timing("tx_timeout_ms must be > 0"));
        }
        if self.error_threshold == 0 {
            return Err(ConfigError::Timing("error_threshold must be > 0"));
        }
        let worst_case_ms = self.worst_case_iteration_ms();
        if worst_case_ms >= self.watchdog_timeout_ms {
            return Err(ConfigError::WatchdogBudget {
                worst_case_ms,
                watchdog_ms: self.watchdog_timeout_ms,
            });
        }
        Ok(())
    }
}
