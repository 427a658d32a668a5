//! Two-channel indicator pattern engine.
//!
//! Chooses what the red and green LEDs show from the current zone and the
//! link error-mode latch. The main loop calls [`IndicatorEngine::tick`]
//! each pipeline pass and feeds the result to the LED driver.
//!
//! ## Priority
//!
//! 1. **Error-mode**: red/green alternate in strict antiphase (never both
//!    on, never both off), 250 ms per phase.
//! 2. **Zone**: see the table below.
//!
//! | Zone        | Pattern     | Red   | Green |
//! |-------------|-------------|-------|-------|
//! | MinLimit    | RedSolid    | on    | off   |
//! | ApproachMin | RedBlink    | blink | off   |
//! | Normal      | Off         | off   | off   |
//! | ApproachMax | GreenBlink  | off   | blink |
//! | MaxLimit    | GreenSolid  | off   | on    |
//!
//! ## Timing
//!
//! Blinks toggle every half blink period. Zone blinks and the error
//! alternation each keep their own phase accumulator. A phase only
//! advances when `now - last_toggle ≥ half period`; entering a pattern does
//! not reset it, so the blink phase is continuous across zone changes.

use crate::zone::Zone;

/// Default full blink period (on + off).
pub const BLINK_PERIOD_MS: u32 = 500;

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorPattern {
    RedSolid,
    RedBlink,
    Off,
    GreenBlink,
    GreenSolid,
    ErrorAlternate,
}

/// Pattern plus the channel levels to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorOutput {
    pub pattern: IndicatorPattern,
    pub red: bool,
    pub green: bool,
}

/// Wall-clock toggle accumulator.
#[derive(Debug, Clone, Copy)]
struct Phase {
    last_toggle_ms: u32,
    on: bool,
}

impl Phase {
    const fn new(now_ms: u32) -> Self {
        Self {
            last_toggle_ms: now_ms,
            on: false,
        }
    }

    fn advance(&mut self, now_ms: u32, half_period_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_toggle_ms) >= half_period_ms {
            self.on = !self.on;
            self.last_toggle_ms = now_ms;
        }
        self.on
    }
}

/// Indicator engine. Stack-allocated, no heap.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    half_period_ms: u32,
    blink: Phase,
    alternate: Phase,
}

impl IndicatorEngine {
    /// `blink_period_ms` is the full on+off period; phases toggle every half.
    pub fn new(blink_period_ms: u32, now_ms: u32) -> Self {
        Self {
            half_period_ms: blink_period_ms / 2,
            blink: Phase::new(now_ms),
            alternate: Phase::new(now_ms),
        }
    }

    /// Pattern for the given inputs, ignoring timing.
    pub const fn select(zone: Zone, error_mode: bool) -> IndicatorPattern {
        if error_mode {
            IndicatorPattern::ErrorAlternate
        } else {
            zone.indicator_pattern()
        }
    }

    /// Advance the active phase and return the channel levels.
    pub fn tick(&mut self, now_ms: u32, zone: Zone, error_mode: bool) -> IndicatorOutput {
        let pattern = Self::select(zone, error_mode);
        let (red, green) = match pattern {
            IndicatorPattern::RedSolid => (true, false),
            IndicatorPattern::GreenSolid => (false, true),
            IndicatorPattern::Off => (false, false),
            IndicatorPattern::RedBlink => (self.blink.advance(now_ms, self.half_period_ms), false),
            IndicatorPattern::GreenBlink => {
                (false, self.blink.advance(now_ms, self.half_period_ms))
            }
            IndicatorPattern::ErrorAlternate => {
                let red = self.alternate.advance(now_ms, self.half_period_ms);
                (red, !red)
            }
        };
        IndicatorOutput {
            pattern,
            red,
            green,
        }
    }
}
