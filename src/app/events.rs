//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. They are the
//! observability stream, not the CAN traffic itself.

use crate::error::BusError;
use crate::protocol::SafetyFrame;
use crate::zone::Zone;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service took its first reading.
    Started { device_id: u8, reading: u16, zone: Zone },

    /// The classified zone changed between two passes.
    ZoneChanged { from: Zone, to: Zone, reading: u16 },

    /// A frame left the controller.
    FrameSent(SafetyFrame),

    /// A frame was dropped after one attempt.
    SendFailed {
        frame: SafetyFrame,
        cause: BusError,
        consecutive_failures: u32,
    },

    /// Bus-off recovery was initiated before a send.
    BusOffRecovery,

    /// Error-mode latched.
    LinkDown { consecutive_failures: u32 },

    /// Error-mode cleared by a successful send.
    LinkRestored,
}
