//! Light Alarm State Machine
//!
//! Tracks one monitoring run from start to its terminal state. The machine
//! itself never touches the device: the caller reads the sensors, feeds each
//! sample in, and sleeps between samples when told to keep sampling.

use crate::{AlarmConfig, AlarmOutcome};

/// States of a monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    /// Not started yet
    Idle,
    /// Waiting for the next sample
    Sampling { samples_taken: u32 },
    /// Threshold crossed (terminal)
    Triggered { seconds_elapsed: u32, value: i32 },
    /// Window exhausted without a crossing (terminal)
    Completed { seconds_elapsed: u32 },
}

impl AlarmState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlarmState::Triggered { .. } | AlarmState::Completed { .. })
    }
}

/// Events that drive the alarm state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    /// Monitoring requested
    Start,
    /// A sensor value was read
    Sample(i32),
}

/// Result of feeding an event to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionResult {
    /// Another sample is due
    Sampling { samples_taken: u32 },
    /// Threshold crossed
    Triggered(AlarmOutcome),
    /// Monitoring window exhausted
    Completed(AlarmOutcome),
    /// Event not valid in the current state
    Invalid { from: AlarmState, event: AlarmEvent },
}

/// The state machine for one light alarm run
#[derive(Debug)]
pub struct AlarmStateMachine {
    config: AlarmConfig,
    current_state: AlarmState,
}

impl AlarmStateMachine {
    /// Create a new state machine in Idle state
    pub fn new(config: AlarmConfig) -> Self {
        Self {
            config,
            current_state: AlarmState::Idle,
        }
    }

    /// Get current state
    pub fn state(&self) -> AlarmState {
        self.current_state
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// Outcome of the run, once a terminal state is reached
    pub fn outcome(&self) -> Option<AlarmOutcome> {
        match self.current_state {
            AlarmState::Triggered { seconds_elapsed, value } => {
                Some(AlarmOutcome::triggered(seconds_elapsed, value))
            }
            AlarmState::Completed { seconds_elapsed } => Some(AlarmOutcome::completed(seconds_elapsed)),
            AlarmState::Idle | AlarmState::Sampling { .. } => None,
        }
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: AlarmEvent) -> TransitionResult {
        match (self.current_state, event) {
            (AlarmState::Idle, AlarmEvent::Start) => {
                if self.config.duration_seconds == 0 {
                    self.complete(0)
                } else {
                    self.current_state = AlarmState::Sampling { samples_taken: 0 };
                    TransitionResult::Sampling { samples_taken: 0 }
                }
            }

            (AlarmState::Sampling { samples_taken }, AlarmEvent::Sample(value)) => {
                let samples_taken = samples_taken + 1;

                if self.config.range.is_crossed(value, self.config.threshold) {
                    self.current_state = AlarmState::Triggered {
                        seconds_elapsed: samples_taken,
                        value,
                    };
                    TransitionResult::Triggered(AlarmOutcome::triggered(samples_taken, value))
                } else if samples_taken >= self.config.duration_seconds {
                    self.complete(samples_taken)
                } else {
                    self.current_state = AlarmState::Sampling { samples_taken };
                    TransitionResult::Sampling { samples_taken }
                }
            }

            (from, event) => TransitionResult::Invalid { from, event },
        }
    }

    fn complete(&mut self, seconds_elapsed: u32) -> TransitionResult {
        self.current_state = AlarmState::Completed { seconds_elapsed };
        TransitionResult::Completed(AlarmOutcome::completed(seconds_elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RangeType, SensorSelector};

    fn config(range: RangeType, threshold: i32, duration_seconds: u32) -> AlarmConfig {
        AlarmConfig::new(SensorSelector::Left, range, threshold, duration_seconds)
    }

    #[test]
    fn test_initial_state() {
        let fsm = AlarmStateMachine::new(config(RangeType::Maximum, 50, 5));
        assert_eq!(fsm.state(), AlarmState::Idle);
        assert_eq!(fsm.outcome(), None);
    }

    #[test]
    fn test_trigger_on_third_sample() {
        let mut fsm = AlarmStateMachine::new(config(RangeType::Maximum, 50, 5));

        assert_eq!(
            fsm.process_event(AlarmEvent::Start),
            TransitionResult::Sampling { samples_taken: 0 }
        );
        assert_eq!(
            fsm.process_event(AlarmEvent::Sample(10)),
            TransitionResult::Sampling { samples_taken: 1 }
        );
        assert_eq!(
            fsm.process_event(AlarmEvent::Sample(30)),
            TransitionResult::Sampling { samples_taken: 2 }
        );

        let result = fsm.process_event(AlarmEvent::Sample(60));
        assert_eq!(result, TransitionResult::Triggered(AlarmOutcome::triggered(3, 60)));
        assert!(fsm.state().is_terminal());
        assert_eq!(fsm.outcome(), Some(AlarmOutcome::triggered(3, 60)));
    }

    #[test]
    fn test_window_exhausted() {
        let mut fsm = AlarmStateMachine::new(config(RangeType::Maximum, 50, 3));
        fsm.process_event(AlarmEvent::Start);
        fsm.process_event(AlarmEvent::Sample(10));
        fsm.process_event(AlarmEvent::Sample(20));

        let result = fsm.process_event(AlarmEvent::Sample(50));
        assert_eq!(result, TransitionResult::Completed(AlarmOutcome::completed(3)));
        assert_eq!(fsm.state(), AlarmState::Completed { seconds_elapsed: 3 });
    }

    #[test]
    fn test_zero_duration_completes_without_sampling() {
        let mut fsm = AlarmStateMachine::new(config(RangeType::Minimum, 50, 0));
        let result = fsm.process_event(AlarmEvent::Start);
        assert_eq!(result, TransitionResult::Completed(AlarmOutcome::completed(0)));
    }

    #[test]
    fn test_crossing_on_last_sample_still_triggers() {
        let mut fsm = AlarmStateMachine::new(config(RangeType::Minimum, 50, 1));
        fsm.process_event(AlarmEvent::Start);
        let result = fsm.process_event(AlarmEvent::Sample(49));
        assert_eq!(result, TransitionResult::Triggered(AlarmOutcome::triggered(1, 49)));
    }

    #[test]
    fn test_invalid_events() {
        let mut fsm = AlarmStateMachine::new(config(RangeType::Maximum, 50, 5));

        // Sampling before start
        let result = fsm.process_event(AlarmEvent::Sample(99));
        assert!(matches!(result, TransitionResult::Invalid { from: AlarmState::Idle, .. }));

        fsm.process_event(AlarmEvent::Start);
        fsm.process_event(AlarmEvent::Sample(99));

        // Terminal states accept nothing
        let result = fsm.process_event(AlarmEvent::Sample(1));
        assert!(matches!(result, TransitionResult::Invalid { .. }));
        let result = fsm.process_event(AlarmEvent::Start);
        assert!(matches!(result, TransitionResult::Invalid { .. }));
    }
}
