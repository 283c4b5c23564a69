// Keyseq Sequence Recognition
// State machine tracking progress through a multi-step pattern like "g g"

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::event::KeyEvent;
use crate::matcher::matches;
use crate::pattern::{ParsedPattern, Steps};

/// Window allowed between two qualifying steps unless configured otherwise
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(600);

/// Progress through a sequence: index of the step expected next.
///
/// Index 0 is idle; any other index means earlier steps already matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceState {
    step_index: usize,
}

impl SequenceState {
    pub const IDLE: SequenceState = SequenceState { step_index: 0 };

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn is_idle(&self) -> bool {
        self.step_index == 0
    }
}

/// What to do with the pending deadline after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Cancel it, if any
    Cancel,
    /// Cancel it and arm a new one this far from now
    Arm(Duration),
}

/// Outcome of feeding one event to the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: SequenceState,
    /// True when this event completed the sequence
    pub matched: bool,
    pub timer: TimerAction,
}

/// Pure transition function for one sequence pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecognizer {
    steps: Steps,
    timeout: Option<Duration>,
    case_sensitive: bool,
}

impl SequenceRecognizer {
    /// Build a recognizer for a sequence pattern.
    ///
    /// Returns `None` for single-step patterns. A `timeout` of `None` means
    /// the window between steps is unbounded.
    pub fn new(
        pattern: &ParsedPattern,
        timeout: Option<Duration>,
        case_sensitive: bool,
    ) -> Option<Self> {
        if !pattern.is_sequence() {
            return None;
        }
        Some(Self {
            steps: pattern.sequence().iter().cloned().collect(),
            timeout,
            case_sensitive,
        })
    }

    /// Number of steps in the sequence
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: a sequence has at least two steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Advance, complete or reset on one event.
    ///
    /// A miss at any position, including the first, restarts from idle.
    pub fn transition(&self, state: SequenceState, event: &KeyEvent) -> Transition {
        let index = state.step_index.min(self.steps.len().saturating_sub(1));
        let expected = &self.steps[index];

        if !matches(event, expected, self.case_sensitive) {
            return Transition {
                state: SequenceState::IDLE,
                matched: false,
                timer: TimerAction::Cancel,
            };
        }

        if index + 1 == self.steps.len() {
            return Transition {
                state: SequenceState::IDLE,
                matched: true,
                timer: TimerAction::Cancel,
            };
        }

        Transition {
            state: SequenceState {
                step_index: index + 1,
            },
            matched: false,
            timer: match self.timeout {
                Some(timeout) => TimerAction::Arm(timeout),
                None => TimerAction::Cancel,
            },
        }
    }
}

/// Drives a recognizer over a live event stream.
///
/// Owns the progress state and at most one pending deadline, read against an
/// injected clock. Events must arrive one at a time in the order they
/// occurred.
#[derive(Debug)]
pub struct RecognizerDriver {
    recognizer: SequenceRecognizer,
    state: SequenceState,
    pending_deadline: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl RecognizerDriver {
    pub fn new(recognizer: SequenceRecognizer, clock: Arc<dyn Clock>) -> Self {
        Self {
            recognizer,
            state: SequenceState::IDLE,
            pending_deadline: None,
            clock,
        }
    }

    pub fn recognizer(&self) -> &SequenceRecognizer {
        &self.recognizer
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Clock time at which progress resets, if a deadline is armed
    pub fn pending_deadline(&self) -> Option<Duration> {
        self.pending_deadline
    }

    /// Fire the pending deadline if it has expired.
    ///
    /// Returns true when progress was reset. Never signals a match.
    pub fn poll(&mut self) -> bool {
        match self.pending_deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                log::debug!(
                    "sequence deadline expired at step {}/{}",
                    self.state.step_index,
                    self.recognizer.len()
                );
                self.pending_deadline = None;
                self.state = SequenceState::IDLE;
                true
            }
            _ => false,
        }
    }

    /// Feed one event. Returns true when it completed the sequence.
    pub fn handle(&mut self, event: &KeyEvent) -> bool {
        self.poll();

        let transition = self.recognizer.transition(self.state, event);
        log::trace!(
            "sequence step {} -> {} on {} (matched: {})",
            self.state.step_index,
            transition.state.step_index,
            event,
            transition.matched
        );
        self.state = transition.state;
        self.apply(transition.timer);

        if transition.matched {
            log::debug!("sequence of {} steps complete", self.recognizer.len());
        }
        transition.matched
    }

    /// Drop all progress and any pending deadline
    pub fn reset(&mut self) {
        self.state = SequenceState::IDLE;
        self.cancel_deadline();
    }

    fn apply(&mut self, action: TimerAction) {
        match action {
            TimerAction::Cancel => self.cancel_deadline(),
            TimerAction::Arm(timeout) => {
                self.cancel_deadline();
                let deadline = self.clock.now() + timeout;
                log::debug!("sequence deadline armed for {:?}", deadline);
                self.pending_deadline = Some(deadline);
            }
        }
    }

    fn cancel_deadline(&mut self) {
        if self.pending_deadline.take().is_some() {
            log::debug!("sequence deadline cancelled");
        }
    }
}

impl Drop for RecognizerDriver {
    fn drop(&mut self) {
        self.cancel_deadline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::matcher::MatchOptions;
    use crate::pattern::parse;

    fn recognizer(pattern: &str, timeout: Option<Duration>) -> SequenceRecognizer {
        let parsed = parse(pattern, &MatchOptions::default());
        SequenceRecognizer::new(&parsed, timeout, false).unwrap()
    }

    fn driver(pattern: &str, timeout: Option<Duration>) -> (RecognizerDriver, ManualClock) {
        let clock = ManualClock::new();
        let driver = RecognizerDriver::new(recognizer(pattern, timeout), Arc::new(clock.clone()));
        (driver, clock)
    }

    #[test]
    fn test_single_step_pattern_has_no_recognizer() {
        let parsed = parse("ctrl+k", &MatchOptions::default());
        assert!(SequenceRecognizer::new(&parsed, None, false).is_none());
    }

    #[test]
    fn test_transition_advances_and_arms() {
        let rec = recognizer("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        let t = rec.transition(SequenceState::IDLE, &KeyEvent::new("g"));
        assert_eq!(t.state.step_index(), 1);
        assert!(!t.matched);
        assert_eq!(t.timer, TimerAction::Arm(DEFAULT_SEQUENCE_TIMEOUT));
    }

    #[test]
    fn test_transition_completes_and_cancels() {
        let rec = recognizer("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        let t = rec.transition(SequenceState { step_index: 1 }, &KeyEvent::new("g"));
        assert!(t.matched);
        assert!(t.state.is_idle());
        assert_eq!(t.timer, TimerAction::Cancel);
    }

    #[test]
    fn test_transition_miss_resets() {
        let rec = recognizer("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        let t = rec.transition(SequenceState { step_index: 1 }, &KeyEvent::new("x"));
        assert!(!t.matched);
        assert!(t.state.is_idle());
        assert_eq!(t.timer, TimerAction::Cancel);

        let t = rec.transition(SequenceState::IDLE, &KeyEvent::new("x"));
        assert!(t.state.is_idle());
    }

    #[test]
    fn test_transition_without_timeout_never_arms() {
        let rec = recognizer("a b c", None);
        let t = rec.transition(SequenceState::IDLE, &KeyEvent::new("a"));
        assert_eq!(t.state.step_index(), 1);
        assert_eq!(t.timer, TimerAction::Cancel);
    }

    #[test]
    fn test_miss_does_not_retry_as_first_step() {
        // "g" at step 1 of "g x" resets; it is not re-checked against step 0
        let rec = recognizer("g x", None);
        let t = rec.transition(SequenceState { step_index: 1 }, &KeyEvent::new("g"));
        assert!(t.state.is_idle());
    }

    #[test]
    fn test_driver_fires_once_within_window() {
        let (mut driver, clock) = driver("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        assert!(!driver.handle(&KeyEvent::new("g")));
        clock.advance(Duration::from_millis(100));
        assert!(driver.handle(&KeyEvent::new("g")));
        assert!(driver.state().is_idle());
        assert_eq!(driver.pending_deadline(), None);
    }

    #[test]
    fn test_driver_deadline_resets_progress() {
        let (mut driver, clock) = driver("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        driver.handle(&KeyEvent::new("g"));
        assert_eq!(driver.pending_deadline(), Some(DEFAULT_SEQUENCE_TIMEOUT));

        clock.advance(Duration::from_millis(700));
        assert!(!driver.handle(&KeyEvent::new("g")));
        // The late "g" starts a fresh attempt
        assert_eq!(driver.state().step_index(), 1);
    }

    #[test]
    fn test_driver_deadline_is_relative_to_last_step() {
        let (mut driver, clock) = driver("a b c", Some(DEFAULT_SEQUENCE_TIMEOUT));
        driver.handle(&KeyEvent::new("a"));
        clock.advance(Duration::from_millis(500));
        driver.handle(&KeyEvent::new("b"));
        clock.advance(Duration::from_millis(500));
        // 1000ms since start but only 500ms since "b"
        assert!(driver.handle(&KeyEvent::new("c")));
    }

    #[test]
    fn test_driver_poll_fires_expired_deadline() {
        let (mut driver, clock) = driver("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        driver.handle(&KeyEvent::new("g"));
        clock.advance(Duration::from_millis(599));
        assert!(!driver.poll());
        assert_eq!(driver.state().step_index(), 1);
        clock.advance(Duration::from_millis(1));
        assert!(driver.poll());
        assert!(driver.state().is_idle());
        assert_eq!(driver.pending_deadline(), None);
        assert!(!driver.poll());
    }

    #[test]
    fn test_driver_unbounded_window() {
        let (mut driver, clock) = driver("g g", None);
        driver.handle(&KeyEvent::new("g"));
        clock.advance(Duration::from_secs(3600));
        assert!(!driver.poll());
        assert!(driver.handle(&KeyEvent::new("g")));
    }

    #[test]
    fn test_transition_serde() {
        let rec = recognizer("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        let t = rec.transition(SequenceState::IDLE, &KeyEvent::new("g"));
        let json = serde_json::to_string(&t).unwrap();
        let restored: Transition = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
    }

    #[test]
    fn test_driver_reset() {
        let (mut driver, _clock) = driver("g g", Some(DEFAULT_SEQUENCE_TIMEOUT));
        driver.handle(&KeyEvent::new("g"));
        driver.reset();
        assert!(driver.state().is_idle());
        assert_eq!(driver.pending_deadline(), None);
    }
}
