//! Monitor service: the hexagonal core.
//!
//! [`MonitorService`] owns every piece of runtime state: the previous
//! reading, the edge emitter's anti-spam latches, the transmission guard's
//! link health, and the indicator phases. The main loop calls
//! [`MonitorService::poll`] once per iteration; everything runs on that one
//! control path, so no state is shared or locked.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │        MonitorService         │
//!    BusPort ◀────│ classify · emit · guard · LED │
//!                 └──────────────────────────────┘ ──▶ IndicatorPort
//! ```
//!
//! Per-iteration order: heartbeat due-check, then the debounce gate, then
//! (if due) classify → emit → guard → indicator.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::MonitorConfig;
use crate::emitter::EdgeEmitter;
use crate::indicator::{IndicatorEngine, IndicatorOutput};
use crate::link::TransmissionGuard;
use crate::protocol::{SafetyFrame, ZoneEvent};
use crate::zone::Zone;

use super::events::AppEvent;
use super::ports::{BusPort, EventSink, IndicatorPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// Reports
// ───────────────────────────────────────────────────────────────

/// What one classification pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub reading: u16,
    pub zone: Zone,
    /// Zone event attempted this pass, if any.
    pub event: Option<ZoneEvent>,
    /// Whether that attempt left the controller.
    pub delivered: bool,
    pub indicator: IndicatorOutput,
}

/// What one [`MonitorService::poll`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollReport {
    /// A heartbeat was attempted.
    pub heartbeat: bool,
    /// The debounce gate opened and the pipeline ran.
    pub pass: Option<PassReport>,
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    config: MonitorConfig,
    emitter: EdgeEmitter,
    guard: TransmissionGuard,
    indicator: IndicatorEngine,
    last_reading: u16,
    zone: Zone,
    last_heartbeat_ms: u32,
    last_pass_ms: u32,
    pass_count: u64,
}

impl MonitorService {
    /// Construct the service from a validated configuration.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: MonitorConfig) -> Self {
        let emitter = EdgeEmitter::new(config.thresholds);
        let guard = TransmissionGuard::new(
            config.tx_timeout_ms,
            config.recovery_grace_ms,
            config.error_threshold,
        );
        let indicator = IndicatorEngine::new(config.blink_period_ms, 0);
        Self {
            config,
            emitter,
            guard,
            indicator,
            last_reading: 0,
            zone: Zone::Normal,
            last_heartbeat_ms: 0,
            last_pass_ms: 0,
            pass_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Seed the previous reading, send the boot heartbeat, and arm the
    /// timers at `now_ms`.
    ///
    /// The seed reading never produces a zone event: a node that boots
    /// inside a limit only announces it after leaving and re-entering.
    pub fn start(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + BusPort + IndicatorPort + DelayNs),
        sink: &mut impl EventSink,
    ) {
        let reading = hw.read();
        self.last_reading = reading;
        self.zone = self.config.thresholds.classify(reading);
        self.indicator = IndicatorEngine::new(self.config.blink_period_ms, now_ms);
        sink.emit(&AppEvent::Started {
            device_id: self.config.device_id,
            reading,
            zone: self.zone,
        });
        info!(
            "Monitor started: device=0x{:02X} reading={} zone={:?}",
            self.config.device_id, reading, self.zone
        );

        self.send_heartbeat(hw, sink);
        self.last_heartbeat_ms = now_ms;
        self.last_pass_ms = now_ms;

        let out = self.indicator.tick(now_ms, self.zone, self.guard.error_mode());
        hw.set_channels(out.red, out.green);
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration at `now_ms` (wrapping millisecond clock).
    ///
    /// The `hw` parameter satisfies every port at once, which avoids a
    /// double mutable borrow while keeping the port boundary explicit.
    pub fn poll(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + BusPort + IndicatorPort + DelayNs),
        sink: &mut impl EventSink,
    ) -> PollReport {
        let mut report = PollReport::default();

        // 1. Liveness beacon, independent of zone state.
        if now_ms.wrapping_sub(self.last_heartbeat_ms) >= self.config.heartbeat_interval_ms {
            self.send_heartbeat(hw, sink);
            self.last_heartbeat_ms = now_ms;
            report.heartbeat = true;
        }

        // 2. Debounce gate.
        if now_ms.wrapping_sub(self.last_pass_ms) < self.config.debounce_ms {
            return report;
        }
        self.last_pass_ms = now_ms;

        // 3. Classify → emit → guard → indicator.
        report.pass = Some(self.run_pass(now_ms, hw, sink));
        report
    }

    fn run_pass(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + BusPort + IndicatorPort + DelayNs),
        sink: &mut impl EventSink,
    ) -> PassReport {
        self.pass_count += 1;
        let reading = hw.read();
        let zone = self.config.thresholds.classify(reading);
        if zone != self.zone {
            sink.emit(&AppEvent::ZoneChanged {
                from: self.zone,
                to: zone,
                reading,
            });
            self.zone = zone;
        }

        let event = self
            .emitter
            .on_sample(reading, self.last_reading)
            .map(|status| ZoneEvent {
                device_id: self.config.device_id,
                status,
            });
        self.last_reading = reading;

        let delivered = match event {
            Some(ev) => self.transmit(hw, sink, SafetyFrame::Zone(ev)),
            None => false,
        };

        let indicator = self.indicator.tick(now_ms, zone, self.guard.error_mode());
        hw.set_channels(indicator.red, indicator.green);

        PassReport {
            reading,
            zone,
            event,
            delivered,
            indicator,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Zone of the most recent reading.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn last_reading(&self) -> u16 {
        self.last_reading
    }

    pub fn error_mode(&self) -> bool {
        self.guard.error_mode()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.guard.consecutive_failures()
    }

    /// Classification passes executed since startup.
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn send_heartbeat(&mut self, hw: &mut (impl BusPort + DelayNs), sink: &mut impl EventSink) {
        let frame = SafetyFrame::Heartbeat {
            device_id: self.config.device_id,
        };
        debug!("Heartbeat");
        self.transmit(hw, sink, frame);
    }

    /// Push one frame through the guard and report the outcome.
    fn transmit(
        &mut self,
        hw: &mut (impl BusPort + DelayNs),
        sink: &mut impl EventSink,
        frame: SafetyFrame,
    ) -> bool {
        match self.guard.send(hw, &frame) {
            Ok(sent) => {
                if sent.recovered_bus_off {
                    sink.emit(&AppEvent::BusOffRecovery);
                }
                sink.emit(&AppEvent::FrameSent(frame));
                if sent.link_restored {
                    sink.emit(&AppEvent::LinkRestored);
                }
                true
            }
            Err(e) => {
                if e.recovered_bus_off {
                    sink.emit(&AppEvent::BusOffRecovery);
                }
                sink.emit(&AppEvent::SendFailed {
                    frame,
                    cause: e.cause,
                    consecutive_failures: e.consecutive_failures,
                });
                if e.link_down {
                    sink.emit(&AppEvent::LinkDown {
                        consecutive_failures: e.consecutive_failures,
                    });
                }
                false
            }
        }
    }
}
