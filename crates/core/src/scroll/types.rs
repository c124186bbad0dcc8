//! Types for scroll stabilization.

use serde::Serialize;

/// State of the scroll stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ScrollState {
    /// Still scrolling and sampling.
    Measuring,
    /// The feed finished loading; extraction may proceed.
    Stable(StableReason),
    /// A capability call failed; extraction must be skipped this run.
    Errored,
}

impl ScrollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Measuring)
    }
}

/// Which signal ended the scroll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StableReason {
    /// The control element count stopped growing.
    ControlCountStable,
    /// The document height stopped changing for several cycles.
    HeightStable,
    /// The hard cycle ceiling was reached before either signal converged.
    CycleLimit,
}

/// What the driver should do after feeding a measurement to the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run another scroll cycle.
    Continue,
    /// Converged. Wait once more (scrolling first if `scroll`) and stop.
    Settle { scroll: bool },
    /// Terminal; perform no further I/O.
    Done,
}

/// Result of one stabilization pass over a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollOutcome {
    pub state: ScrollState,
    /// Scroll cycles started.
    pub cycles: u32,
    /// Scroll commands issued, including the final settling scroll.
    pub scrolls: u32,
    /// Last successfully sampled control element count.
    pub last_control_count: Option<usize>,
}

impl ScrollOutcome {
    pub fn is_stable(&self) -> bool {
        matches!(self.state, ScrollState::Stable(_))
    }
}
