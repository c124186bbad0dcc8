//! Pure state machine deciding when an infinite-scroll feed finished loading.

use tracing::{info, warn};

use crate::config::ScrollConfig;

use super::{ScrollState, StableReason, Step};

/// Scroll stabilizer.
///
/// Fed one measurement at a time by the driver; performs no I/O itself.
/// Each cycle the driver calls [`begin_cycle`](Self::begin_cycle) with the
/// height before scrolling, then [`observe_control_count`](Self::observe_control_count)
/// and, if that returned [`Step::Continue`], [`observe_height`](Self::observe_height).
#[derive(Debug, Clone)]
pub struct ScrollStabilizer {
    state: ScrollState,
    previous_control_count: Option<usize>,
    current_control_count: Option<usize>,
    stable_height_streak: u32,
    last_height: u64,
    cycles: u32,
    stable_height_cycles: u32,
    max_cycles: u32,
}

impl ScrollStabilizer {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            state: ScrollState::Measuring,
            previous_control_count: None,
            current_control_count: None,
            stable_height_streak: 0,
            last_height: 0,
            cycles: 0,
            stable_height_cycles: config.stable_height_cycles.max(1),
            max_cycles: config.max_cycles.max(1),
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn last_control_count(&self) -> Option<usize> {
        self.current_control_count.or(self.previous_control_count)
    }

    /// Start a cycle; `height` is the scroll height before scrolling.
    pub fn begin_cycle(&mut self, height: u64) {
        self.cycles += 1;
        self.last_height = height;
    }

    /// Feed the control element count sampled after scrolling.
    ///
    /// `None` means the count query itself failed.
    pub fn observe_control_count(&mut self, count: Option<usize>) -> Step {
        if self.state.is_terminal() {
            return Step::Done;
        }

        let Some(current) = count else {
            warn!("Control element count unavailable, aborting scroll");
            self.state = ScrollState::Errored;
            return Step::Done;
        };
        self.current_control_count = Some(current);

        let step = match self.previous_control_count {
            None => {
                info!("Initial control element count: {}", current);
                Step::Continue
            }
            Some(previous) if current > previous => {
                info!("Control element count grew: {} -> {}", previous, current);
                Step::Continue
            }
            Some(previous) if current == previous => {
                info!(
                    "Control element count unchanged ({}), settling after one last scroll",
                    current
                );
                self.state = ScrollState::Stable(StableReason::ControlCountStable);
                Step::Settle { scroll: true }
            }
            Some(previous) => {
                warn!(
                    "Control element count decreased: {} -> {} (render instability)",
                    previous, current
                );
                Step::Continue
            }
        };

        self.previous_control_count = Some(current);
        step
    }

    /// Feed the scroll height sampled at the end of the cycle.
    pub fn observe_height(&mut self, height: u64) -> Step {
        if self.state.is_terminal() {
            return Step::Done;
        }

        if height == self.last_height {
            self.stable_height_streak += 1;
            if self.stable_height_streak >= self.stable_height_cycles {
                info!(
                    "Scroll height unchanged for {} cycles, assuming end of feed",
                    self.stable_height_streak
                );
                self.state = ScrollState::Stable(StableReason::HeightStable);
                return Step::Settle { scroll: false };
            }
        } else {
            self.stable_height_streak = 0;
        }

        if self.cycles >= self.max_cycles {
            warn!(
                "Scroll cycle limit ({}) reached before the feed stabilized",
                self.max_cycles
            );
            self.state = ScrollState::Stable(StableReason::CycleLimit);
            return Step::Done;
        }

        Step::Continue
    }

    /// Abort after a capability failure outside the count query.
    pub fn abort(&mut self) {
        self.state = ScrollState::Errored;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stabilizer() -> ScrollStabilizer {
        ScrollStabilizer::new(&ScrollConfig::default())
    }

    /// Drive the machine with a count sequence and a growing height.
    fn run_counts(machine: &mut ScrollStabilizer, counts: &[Option<usize>]) -> Vec<Step> {
        let mut steps = Vec::new();
        for (i, count) in counts.iter().enumerate() {
            let height = (i as u64 + 1) * 1000;
            machine.begin_cycle(height);
            let step = machine.observe_control_count(*count);
            steps.push(step);
            if step != Step::Continue {
                break;
            }
            let step = machine.observe_height(height + 500);
            if step != Step::Continue {
                steps.push(step);
                break;
            }
        }
        steps
    }

    #[test]
    fn test_first_measurement_continues() {
        let mut machine = stabilizer();
        machine.begin_cycle(1000);
        assert_eq!(machine.observe_control_count(Some(5)), Step::Continue);
        assert_eq!(machine.state(), ScrollState::Measuring);
    }

    #[test]
    fn test_equal_count_settles_with_final_scroll() {
        let mut machine = stabilizer();
        let steps = run_counts(&mut machine, &[Some(5), Some(8), Some(8)]);
        assert_eq!(
            steps,
            vec![Step::Continue, Step::Continue, Step::Settle { scroll: true }]
        );
        assert_eq!(
            machine.state(),
            ScrollState::Stable(StableReason::ControlCountStable)
        );
        assert_eq!(machine.cycles(), 3);
        assert_eq!(machine.last_control_count(), Some(8));
    }

    #[test]
    fn test_decrease_warns_and_continues() {
        let mut machine = stabilizer();
        let steps = run_counts(&mut machine, &[Some(10), Some(7), Some(12), Some(12)]);
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[1], Step::Continue);
        assert_eq!(steps[3], Step::Settle { scroll: true });
    }

    #[test]
    fn test_count_failure_errors() {
        let mut machine = stabilizer();
        let steps = run_counts(&mut machine, &[Some(3), None]);
        assert_eq!(steps, vec![Step::Continue, Step::Done]);
        assert_eq!(machine.state(), ScrollState::Errored);
        assert_eq!(machine.last_control_count(), Some(3));
    }

    #[test]
    fn test_height_fallback_after_three_unchanged_cycles() {
        let mut machine = stabilizer();
        // Control count keeps growing, height never changes.
        let mut last = Step::Continue;
        for count in 1..=10 {
            machine.begin_cycle(4000);
            assert_eq!(machine.observe_control_count(Some(count)), Step::Continue);
            last = machine.observe_height(4000);
            if last != Step::Continue {
                break;
            }
        }
        assert_eq!(last, Step::Settle { scroll: false });
        assert_eq!(machine.state(), ScrollState::Stable(StableReason::HeightStable));
        assert_eq!(machine.cycles(), 3);
    }

    #[test]
    fn test_height_change_resets_streak() {
        let mut machine = stabilizer();
        let heights = [(1000, 1000), (1000, 1000), (1000, 2000), (2000, 2000)];
        for (i, (before, after)) in heights.iter().enumerate() {
            machine.begin_cycle(*before);
            machine.observe_control_count(Some(i + 1));
            assert_eq!(machine.observe_height(*after), Step::Continue);
        }
        assert_eq!(machine.state(), ScrollState::Measuring);
    }

    #[test]
    fn test_cycle_limit_terminates_stable() {
        let config = ScrollConfig {
            max_cycles: 4,
            ..ScrollConfig::default()
        };
        let mut machine = ScrollStabilizer::new(&config);
        let mut steps = Vec::new();
        for i in 0..10u64 {
            machine.begin_cycle(i * 100);
            machine.observe_control_count(Some(i as usize + 1));
            let step = machine.observe_height(i * 100 + 50);
            steps.push(step);
            if step != Step::Continue {
                break;
            }
        }
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[3], Step::Done);
        assert_eq!(machine.state(), ScrollState::Stable(StableReason::CycleLimit));
    }

    #[test]
    fn test_terminal_state_ignores_further_input() {
        let mut machine = stabilizer();
        machine.abort();
        assert_eq!(machine.observe_control_count(Some(1)), Step::Done);
        assert_eq!(machine.observe_height(1), Step::Done);
        assert_eq!(machine.state(), ScrollState::Errored);
    }
}
