//! Normal-mode cycle timing.
//!
//! The light cycle is a pure function of elapsed time since the cycle
//! reference: three hold phases followed by a fixed blink-tail window in
//! which the green channel flashes before the cycle wraps back to red.
//! Evaluating phases from elapsed time on every poll, instead of stepping
//! through transitions, keeps the cycle drift-free and lets tests drive it
//! with synthetic timestamps.

use embassy_time::Duration;

/// Length of the blink-tail window at the end of each cycle.
pub const TAIL_WINDOW: Duration = Duration::from_millis(1000);

/// Spacing between blink-tail flips.
pub const TAIL_BLINK_PERIOD: Duration = Duration::from_millis(167);

/// Flips per tail window: three off/on pairs, ending lit.
pub const TAIL_BLINK_COUNT: u32 = 6;

/// Hold durations for the three cycle phases.
///
/// The blink-tail window is fixed and appended after the green hold, so the
/// full cycle lasts `red + yellow + green + TAIL_WINDOW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    pub red: Duration,
    pub yellow: Duration,
    pub green: Duration,
}

impl PhaseDurations {
    /// Convenience constructor from millisecond counts.
    pub const fn from_millis(red: u64, yellow: u64, green: u64) -> Self {
        Self {
            red: Duration::from_millis(red),
            yellow: Duration::from_millis(yellow),
            green: Duration::from_millis(green),
        }
    }

    /// Full cycle length including the blink-tail window.
    pub fn total(&self) -> Duration {
        self.red + self.yellow + self.green + TAIL_WINDOW
    }

    /// Phase containing `elapsed`, or `None` once the cycle is over.
    ///
    /// Boundaries are strict: an elapsed time equal to a cumulative sum
    /// falls into the later phase.
    pub fn phase_at(&self, elapsed: Duration) -> Option<CyclePhase> {
        let mut limit = self.red;
        if elapsed < limit {
            return Some(CyclePhase::RedHold);
        }
        limit += self.yellow;
        if elapsed < limit {
            return Some(CyclePhase::YellowHold);
        }
        limit += self.green;
        if elapsed < limit {
            return Some(CyclePhase::GreenHold);
        }
        limit += TAIL_WINDOW;
        if elapsed < limit {
            return Some(CyclePhase::BlinkTail);
        }
        None
    }
}

impl Default for PhaseDurations {
    /// The stock 2 s / 0.5 s / 2 s traffic cycle.
    fn default() -> Self {
        Self::from_millis(2000, 500, 2000)
    }
}

/// One phase of the Normal-mode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    RedHold,
    YellowHold,
    GreenHold,
    BlinkTail,
}
