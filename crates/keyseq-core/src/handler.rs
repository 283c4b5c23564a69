// Keyseq Shortcut Handlers
// Builds the per-registration event handler a hosting layer routes events into

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::event::KeyEvent;
use crate::matcher::{matches, MatchOptions};
use crate::pattern::{parse, ParsedPattern};
use crate::sequence::{RecognizerDriver, SequenceRecognizer, DEFAULT_SEQUENCE_TIMEOUT};

/// Which patterns a handler listens for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// Plain patterns: single-step only, sequences never fire
    Patterns(Vec<String>),
    /// Patterns with sequence tracking enabled.
    ///
    /// The first pattern that parses as a sequence is tracked and the simple
    /// patterns next to it are ignored. A timeout of 0 means no deadline.
    Sequence {
        patterns: Vec<String>,
        sequence_timeout_ms: u64,
    },
}

impl PatternSource {
    /// Sequence tracking with the default 600ms window
    pub fn sequence<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PatternSource::Sequence {
            patterns: patterns.into_iter().map(Into::into).collect(),
            sequence_timeout_ms: DEFAULT_SEQUENCE_TIMEOUT.as_millis() as u64,
        }
    }

    /// Set the sequence window; turns plain patterns into a sequence source
    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        let patterns = match self {
            PatternSource::Patterns(patterns) => patterns,
            PatternSource::Sequence { patterns, .. } => patterns,
        };
        PatternSource::Sequence {
            patterns,
            sequence_timeout_ms: timeout_ms,
        }
    }

    pub fn patterns(&self) -> &[String] {
        match self {
            PatternSource::Patterns(patterns) => patterns,
            PatternSource::Sequence { patterns, .. } => patterns,
        }
    }
}

impl From<&str> for PatternSource {
    fn from(pattern: &str) -> Self {
        PatternSource::Patterns(vec![pattern.to_string()])
    }
}

impl From<String> for PatternSource {
    fn from(pattern: String) -> Self {
        PatternSource::Patterns(vec![pattern])
    }
}

impl From<Vec<String>> for PatternSource {
    fn from(patterns: Vec<String>) -> Self {
        PatternSource::Patterns(patterns)
    }
}

impl From<Vec<&str>> for PatternSource {
    fn from(patterns: Vec<&str>) -> Self {
        PatternSource::Patterns(patterns.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PatternSource {
    fn from(patterns: [&str; N]) -> Self {
        PatternSource::Patterns(patterns.iter().map(|p| p.to_string()).collect())
    }
}

impl From<&[&str]> for PatternSource {
    fn from(patterns: &[&str]) -> Self {
        PatternSource::Patterns(patterns.iter().map(|p| p.to_string()).collect())
    }
}

enum HandlerMode {
    /// Match each event against the single-step patterns, in order
    Simple {
        patterns: Vec<ParsedPattern>,
        case_sensitive: bool,
    },
    /// Track one sequence
    Sequence(RecognizerDriver),
}

/// Event handler for one registration.
///
/// Calls `on_match` with the triggering event whenever a pattern matches
/// (or a tracked sequence completes). Dropping the handler cancels any
/// pending sequence deadline.
pub struct ShortcutHandler<F> {
    mode: HandlerMode,
    on_match: F,
}

impl<F> ShortcutHandler<F>
where
    F: FnMut(&KeyEvent),
{
    /// Route one event. Returns true if `on_match` was called.
    pub fn handle(&mut self, event: &KeyEvent) -> bool {
        let fired = match &mut self.mode {
            HandlerMode::Simple {
                patterns,
                case_sensitive,
            } => patterns.iter().any(|pattern| {
                pattern
                    .single_step()
                    .is_some_and(|step| matches(event, step, *case_sensitive))
            }),
            HandlerMode::Sequence(driver) => driver.handle(event),
        };

        if fired {
            (self.on_match)(event);
        }
        fired
    }

    /// Fire an expired sequence deadline. Returns true if progress was reset.
    pub fn poll(&mut self) -> bool {
        match &mut self.mode {
            HandlerMode::Simple { .. } => false,
            HandlerMode::Sequence(driver) => driver.poll(),
        }
    }

    /// Whether this handler tracks a sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self.mode, HandlerMode::Sequence(_))
    }

    /// Index of the next expected sequence step (0 when idle or simple)
    pub fn progress(&self) -> usize {
        match &self.mode {
            HandlerMode::Simple { .. } => 0,
            HandlerMode::Sequence(driver) => driver.state().step_index(),
        }
    }

    /// Clock time at which sequence progress resets, if a deadline is armed
    pub fn pending_deadline(&self) -> Option<Duration> {
        match &self.mode {
            HandlerMode::Simple { .. } => None,
            HandlerMode::Sequence(driver) => driver.pending_deadline(),
        }
    }
}

impl<F> fmt::Debug for ShortcutHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            HandlerMode::Simple { patterns, .. } => f
                .debug_struct("ShortcutHandler")
                .field("patterns", patterns)
                .finish_non_exhaustive(),
            HandlerMode::Sequence(driver) => f
                .debug_struct("ShortcutHandler")
                .field("sequence", driver)
                .finish_non_exhaustive(),
        }
    }
}

/// Build a handler that reads deadlines from the wall clock
pub fn build_handler<F>(
    source: impl Into<PatternSource>,
    on_match: F,
    options: &MatchOptions,
) -> ShortcutHandler<F>
where
    F: FnMut(&KeyEvent),
{
    build_handler_with_clock(source, on_match, options, Arc::new(SystemClock::new()))
}

/// Build a handler with an explicit clock for sequence deadlines
pub fn build_handler_with_clock<F>(
    source: impl Into<PatternSource>,
    on_match: F,
    options: &MatchOptions,
    clock: Arc<dyn Clock>,
) -> ShortcutHandler<F>
where
    F: FnMut(&KeyEvent),
{
    let source = source.into();
    let parsed: Vec<ParsedPattern> = source
        .patterns()
        .iter()
        .map(|pattern| parse(pattern, options))
        .collect();

    let mode = match &source {
        PatternSource::Patterns(_) => simple_mode(parsed, options),
        PatternSource::Sequence {
            sequence_timeout_ms,
            ..
        } => {
            let timeout = match *sequence_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            };
            let recognizer = parsed
                .iter()
                .find_map(|pattern| SequenceRecognizer::new(pattern, timeout, options.case_sensitive));
            match recognizer {
                Some(recognizer) => {
                    let ignored = parsed.iter().filter(|p| !p.is_sequence()).count();
                    if ignored > 0 {
                        log::warn!(
                            "tracking sequence, ignoring {} single-step pattern(s) in {:?}",
                            ignored,
                            source.patterns()
                        );
                    }
                    HandlerMode::Sequence(RecognizerDriver::new(recognizer, clock))
                }
                None => simple_mode(parsed, options),
            }
        }
    };

    ShortcutHandler { mode, on_match }
}

fn simple_mode(patterns: Vec<ParsedPattern>, options: &MatchOptions) -> HandlerMode {
    HandlerMode::Simple {
        patterns,
        case_sensitive: options.case_sensitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;

    fn key(name: &str) -> KeyEvent {
        KeyEvent::new(name)
    }

    #[test]
    fn test_simple_handler_fires_on_match() {
        let count = Cell::new(0);
        let mut handler = build_handler(
            "ctrl+k",
            |_: &KeyEvent| count.set(count.get() + 1),
            &MatchOptions::default(),
        );
        assert!(!handler.is_sequence());
        assert!(handler.handle(&key("k").with_ctrl()));
        assert!(!handler.handle(&key("k")));
        assert!(!handler.handle(&key("k").with_ctrl().with_alt()));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_simple_handler_passes_event() {
        let mut seen = Vec::new();
        let mut handler = build_handler(
            vec!["ctrl+k", "ctrl+s"],
            |event: &KeyEvent| seen.push(event.key.clone()),
            &MatchOptions::default(),
        );
        handler.handle(&key("s").with_ctrl());
        handler.handle(&key("k").with_ctrl());
        drop(handler);
        assert_eq!(seen, vec!["s".to_string(), "k".to_string()]);
    }

    #[test]
    fn test_plain_patterns_never_track_sequences() {
        let mut handler = build_handler("g g", |_: &KeyEvent| {}, &MatchOptions::default());
        assert!(!handler.is_sequence());
        assert!(!handler.handle(&key("g")));
        assert!(!handler.handle(&key("g")));
    }

    #[test]
    fn test_sequence_source_tracks_first_sequence() {
        let clock = ManualClock::new();
        let mut handler = build_handler_with_clock(
            PatternSource::sequence(["ctrl+k", "g g", "a b"]),
            |_: &KeyEvent| {},
            &MatchOptions::default(),
            Arc::new(clock),
        );
        assert!(handler.is_sequence());
        // Simple patterns next to the sequence are ignored
        assert!(!handler.handle(&key("k").with_ctrl()));
        assert!(!handler.handle(&key("a")));
        assert!(!handler.handle(&key("b")));
        assert!(!handler.handle(&key("g")));
        assert!(handler.handle(&key("g")));
    }

    #[test]
    fn test_sequence_source_without_sequences_matches_simply() {
        let mut handler = build_handler(
            PatternSource::sequence(["ctrl+k"]),
            |_: &KeyEvent| {},
            &MatchOptions::default(),
        );
        assert!(!handler.is_sequence());
        assert!(handler.handle(&key("k").with_ctrl()));
    }

    #[test]
    fn test_sequence_default_timeout() {
        let source = PatternSource::sequence(["g g"]);
        assert_eq!(
            source,
            PatternSource::Sequence {
                patterns: vec!["g g".to_string()],
                sequence_timeout_ms: 600,
            }
        );
        assert_eq!(
            PatternSource::from("g g").with_timeout_ms(0),
            PatternSource::Sequence {
                patterns: vec!["g g".to_string()],
                sequence_timeout_ms: 0,
            }
        );
    }

    #[test]
    fn test_zero_timeout_is_unbounded() {
        let clock = ManualClock::new();
        let mut handler = build_handler_with_clock(
            PatternSource::sequence(["g g"]).with_timeout_ms(0),
            |_: &KeyEvent| {},
            &MatchOptions::default(),
            Arc::new(clock.clone()),
        );
        handler.handle(&key("g"));
        assert_eq!(handler.pending_deadline(), None);
        clock.advance(Duration::from_secs(60));
        assert!(handler.handle(&key("g")));
    }

    #[test]
    fn test_poll_resets_progress() {
        let clock = ManualClock::new();
        let mut handler = build_handler_with_clock(
            PatternSource::sequence(["g g"]),
            |_: &KeyEvent| {},
            &MatchOptions::default(),
            Arc::new(clock.clone()),
        );
        handler.handle(&key("g"));
        assert_eq!(handler.progress(), 1);
        clock.advance(Duration::from_millis(600));
        assert!(handler.poll());
        assert_eq!(handler.progress(), 0);
    }

    #[test]
    fn test_case_sensitive_handler() {
        let options = MatchOptions::default().with_case_sensitive(true);
        let mut handler = build_handler("shift+G", |_: &KeyEvent| {}, &options);
        assert!(handler.handle(&key("G").with_shift()));
        assert!(!handler.handle(&key("g").with_shift()));
    }
}
