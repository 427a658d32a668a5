//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                device_id,
                reading,
                zone,
            } => {
                info!(
                    "START | device=0x{:02X} | hall={} | zone={:?}",
                    device_id, reading, zone
                );
            }
            AppEvent::ZoneChanged { from, to, reading } => {
                info!("ZONE | {:?} -> {:?} | hall={}", from, to, reading);
            }
            AppEvent::FrameSent(frame) => {
                info!("TX | {:?}", frame);
            }
            AppEvent::SendFailed {
                frame,
                cause,
                consecutive_failures,
            } => {
                warn!(
                    "TX | dropped {:?} | cause={} | failures={}",
                    frame, cause, consecutive_failures
                );
            }
            AppEvent::BusOffRecovery => {
                warn!("LINK | bus-off, recovery initiated");
            }
            AppEvent::LinkDown {
                consecutive_failures,
            } => {
                warn!("LINK | down after {} failures", consecutive_failures);
            }
            AppEvent::LinkRestored => {
                info!("LINK | restored");
            }
        }
    }
}
