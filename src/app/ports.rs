//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (Hall ADC, TWAI controller, indicator LEDs, event sinks)
//! implement these traits. The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the position sensor.
pub trait SensorPort {
    /// One quantized reading (0–4095 on a 12-bit ADC). Trusted as-is.
    fn read(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: domain → CAN controller)
// ───────────────────────────────────────────────────────────────

/// Controller state as far as the monitor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    Normal,
    BusOff,
}

/// Outbound CAN transport.
pub trait BusPort {
    /// Queue one standard-id frame, waiting at most `timeout_ms` for space.
    fn transmit(&mut self, id: u32, data: &[u8], timeout_ms: u32) -> Result<(), BusError>;

    /// Current controller state.
    fn status(&mut self) -> BusStatus;

    /// Start bus-off recovery. Completion is not reported.
    fn initiate_recovery(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Two operator-visible on/off channels.
pub trait IndicatorPort {
    fn set_channels(&mut self, red: bool, green: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
