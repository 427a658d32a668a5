//! Zone classification.
//!
//! The Hall reading is split into five ordered zones by four thresholds:
//!
//! ```text
//!  0          T1           T2              T3           T4        4095
//!  ├─MinLimit─┼─ApproachMin─┼────Normal─────┼─ApproachMax─┼─MaxLimit─┤
//!     v < T1    T1 ≤ v < T2   T2 ≤ v ≤ T3    T3 < v ≤ T4     v > T4
//! ```
//!
//! The two approach bands act as hysteresis between the normal range and
//! the hard limits.

use serde::{Deserialize, Serialize};

use crate::indicator::IndicatorPattern;
use crate::protocol::StatusCode;

/// Ordered position classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Zone {
    MinLimit,
    ApproachMin,
    Normal,
    ApproachMax,
    MaxLimit,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Zone::MinLimit,
        Zone::ApproachMin,
        Zone::Normal,
        Zone::ApproachMax,
        Zone::MaxLimit,
    ];

    /// Indicator pattern shown for this zone when the link is healthy.
    pub const fn indicator_pattern(self) -> IndicatorPattern {
        match self {
            Zone::MinLimit => IndicatorPattern::RedSolid,
            Zone::ApproachMin => IndicatorPattern::RedBlink,
            Zone::Normal => IndicatorPattern::Off,
            Zone::ApproachMax => IndicatorPattern::GreenBlink,
            Zone::MaxLimit => IndicatorPattern::GreenSolid,
        }
    }

    /// Status code announced on entry, `None` for the normal range.
    pub const fn status_code(self) -> Option<StatusCode> {
        match self {
            Zone::MinLimit => Some(StatusCode::MinLimit),
            Zone::ApproachMin => Some(StatusCode::ApproachMin),
            Zone::Normal => None,
            Zone::ApproachMax => Some(StatusCode::ApproachMax),
            Zone::MaxLimit => Some(StatusCode::MaxLimit),
        }
    }
}

/// Four strictly increasing zone boundaries over the raw ADC reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this: MinLimit.
    pub min_limit: u16,
    /// Below this (and ≥ `min_limit`): ApproachMin.
    pub approach_min: u16,
    /// Above this (and ≤ `max_limit`): ApproachMax.
    pub approach_max: u16,
    /// Above this: MaxLimit.
    pub max_limit: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_limit: 2160,
            approach_min: 2460,
            approach_max: 2860,
            max_limit: 3360,
        }
    }
}

impl Thresholds {
    /// True when T1 < T2 < T3 < T4.
    pub const fn is_ordered(&self) -> bool {
        self.min_limit < self.approach_min
            && self.approach_min < self.approach_max
            && self.approach_max < self.max_limit
    }

    /// Map a reading to exactly one zone.
    pub const fn classify(&self, reading: u16) -> Zone {
        if reading < self.min_limit {
            Zone::MinLimit
        } else if reading < self.approach_min {
            Zone::ApproachMin
        } else if reading <= self.approach_max {
            Zone::Normal
        } else if reading <= self.max_limit {
            Zone::ApproachMax
        } else {
            Zone::MaxLimit
        }
    }

    pub(crate) const fn in_approach_min(&self, reading: u16) -> bool {
        reading >= self.min_limit && reading < self.approach_min
    }

    pub(crate) const fn in_approach_max(&self, reading: u16) -> bool {
        reading > self.approach_max && reading <= self.max_limit
    }
}
