//! Transmission guard: link health around every outbound CAN frame.
//!
//! ```text
//!            ┌──────────── bus-off? ───────────┐
//!  send() ──▶│ initiate_recovery + grace delay │──▶ transmit(timeout)
//!            └─────────────────────────────────┘         │
//!                         ┌──────── ok ─────────────────┤
//!                         ▼                             ▼ err
//!                 failures = 0                   failures += 1
//!                 error_mode = false             failures ≥ 3 → error_mode
//! ```
//!
//! Failures are expected transiently (bus noise, momentary bus-off) and up
//! to two in a row are tolerated silently. The third latches error-mode,
//! which overrides the indicator. The only way out is one successful
//! transmission; a cleared bus-off alone does not count. There is no retry
//! inside [`TransmissionGuard::send`]: the next zone event or heartbeat is
//! the retry.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::app::ports::{BusPort, BusStatus};
use crate::error::BusError;
use crate::protocol::{CAN_ID_SAFETY, SafetyFrame};

/// Consecutive failures that latch error-mode.
pub const ERROR_THRESHOLD: u32 = 3;

// ───────────────────────────────────────────────────────────────
// Link health
// ───────────────────────────────────────────────────────────────

/// Failure counter plus the error-mode latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHealth {
    consecutive_failures: u32,
    error_mode: bool,
    threshold: u32,
}

impl Default for LinkHealth {
    fn default() -> Self {
        Self::new(ERROR_THRESHOLD)
    }
}

impl LinkHealth {
    pub const fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: 0,
            error_mode: false,
            threshold,
        }
    }

    /// Record a successful transmission. Returns `true` if this cleared
    /// error-mode.
    pub fn record_success(&mut self) -> bool {
        self.consecutive_failures = 0;
        let restored = self.error_mode;
        self.error_mode = false;
        restored
    }

    /// Record a failed transmission. Returns `true` if this latched
    /// error-mode.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures >= self.threshold && !self.error_mode {
            self.error_mode = true;
            return true;
        }
        false
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn error_mode(&self) -> bool {
        self.error_mode
    }
}

// ───────────────────────────────────────────────────────────────
// Send outcomes
// ───────────────────────────────────────────────────────────────

/// A frame left the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sent {
    /// Bus-off recovery was initiated before this attempt.
    pub recovered_bus_off: bool,
    /// This success cleared error-mode.
    pub link_restored: bool,
}

/// A frame did not leave the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError {
    pub cause: BusError,
    /// Bus-off recovery was initiated before this attempt.
    pub recovered_bus_off: bool,
    /// Failure count after this attempt.
    pub consecutive_failures: u32,
    /// This failure latched error-mode.
    pub link_down: bool,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} consecutive)",
            self.cause, self.consecutive_failures
        )
    }
}

// ───────────────────────────────────────────────────────────────
// Guard
// ───────────────────────────────────────────────────────────────

/// Wraps a [`BusPort`] with bus-off recovery and failure accounting.
#[derive(Debug, Clone)]
pub struct TransmissionGuard {
    health: LinkHealth,
    tx_timeout_ms: u32,
    recovery_grace_ms: u32,
}

impl TransmissionGuard {
    pub fn new(tx_timeout_ms: u32, recovery_grace_ms: u32, error_threshold: u32) -> Self {
        Self {
            health: LinkHealth::new(error_threshold),
            tx_timeout_ms,
            recovery_grace_ms,
        }
    }

    /// Attempt one transmission of `frame`. The bus handle also provides
    /// the blocking delay used for the post-recovery grace period.
    ///
    /// Blocks for at most `recovery_grace_ms + tx_timeout_ms`.
    pub fn send(
        &mut self,
        bus: &mut (impl BusPort + DelayNs),
        frame: &SafetyFrame,
    ) -> Result<Sent, SendError> {
        let recovered_bus_off = bus.status() == BusStatus::BusOff;
        if recovered_bus_off {
            warn!("CAN bus-off detected, initiating recovery");
            bus.initiate_recovery();
            bus.delay_ms(self.recovery_grace_ms);
        }

        let payload = frame.encode();
        match bus.transmit(CAN_ID_SAFETY, &payload, self.tx_timeout_ms) {
            Ok(()) => {
                let link_restored = self.health.record_success();
                if link_restored {
                    info!("CAN link restored");
                }
                Ok(Sent {
                    recovered_bus_off,
                    link_restored,
                })
            }
            Err(cause) => {
                let link_down = self.health.record_failure();
                let consecutive_failures = self.health.consecutive_failures();
                warn!(
                    "CAN send failed: {} ({} consecutive)",
                    cause, consecutive_failures
                );
                if link_down {
                    error!(
                        "CAN link down after {} consecutive failures",
                        consecutive_failures
                    );
                }
                Err(SendError {
                    cause,
                    recovered_bus_off,
                    consecutive_failures,
                    link_down,
                })
            }
        }
    }

    pub fn error_mode(&self) -> bool {
        self.health.error_mode()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.health.consecutive_failures()
    }

    /// Worst-case time one `send` can block.
    pub fn worst_case_block_ms(&self) -> u32 {
        self.recovery_grace_ms.saturating_add(self.tx_timeout_ms)
    }
}
