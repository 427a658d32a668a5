//! Edge-triggered zone event emitter.
//!
//! Runs once per debounced sample and decides whether the sample crossed
//! into a zone that must be announced on the bus.
//!
//! ## Rules
//!
//! - **Hard limits** re-announce on *every* new entry (`reading < T1 ≤
//!   previous`, or `reading > T4 ≥ previous`). Entering a hard limit also
//!   re-arms the adjacent approach warning.
//! - **Approach bands** announce on entry from either side, but at most
//!   once per continuous dwell. The latch clears as soon as the reading
//!   leaves the band.
//! - The normal range never announces.
//!
//! Crossings are evaluated against the raw previous reading rather than
//! the previous zone, so a jump that skips a band still fires the band it
//! lands in.

use log::debug;

use crate::protocol::StatusCode;
use crate::zone::Thresholds;

/// Anti-spam state for the two approach bands.
#[derive(Debug, Clone)]
pub struct EdgeEmitter {
    thresholds: Thresholds,
    approach_min_sent: bool,
    approach_max_sent: bool,
}

impl EdgeEmitter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            approach_min_sent: false,
            approach_max_sent: false,
        }
    }

    /// Evaluate one sample against the previous one.
    ///
    /// The zone bands are disjoint, so at most one status qualifies.
    pub fn on_sample(&mut self, reading: u16, previous: u16) -> Option<StatusCode> {
        let t = self.thresholds;
        let mut event = None;

        // ── Min limit ─────────────────────────────────────────
        if reading < t.min_limit && previous >= t.min_limit {
            event = Some(StatusCode::MinLimit);
            self.approach_min_sent = false;
        }

        // ── Approach min ──────────────────────────────────────
        if t.in_approach_min(reading) {
            if !t.in_approach_min(previous) && !self.approach_min_sent {
                event = Some(StatusCode::ApproachMin);
                self.approach_min_sent = true;
            }
        } else {
            self.approach_min_sent = false;
        }

        // ── Approach max ──────────────────────────────────────
        if t.in_approach_max(reading) {
            if !t.in_approach_max(previous) && !self.approach_max_sent {
                event = Some(StatusCode::ApproachMax);
                self.approach_max_sent = true;
            }
        } else {
            self.approach_max_sent = false;
        }

        // ── Max limit ─────────────────────────────────────────
        if reading > t.max_limit && previous <= t.max_limit {
            event = Some(StatusCode::MaxLimit);
            self.approach_max_sent = false;
        }

        if let Some(status) = event {
            debug!("edge: {} -> {} emits {}", previous, reading, status);
        }
        event
    }

    pub fn approach_min_sent(&self) -> bool {
        self.approach_min_sent
    }

    pub fn approach_max_sent(&self) -> bool {
        self.approach_max_sent
    }
}
