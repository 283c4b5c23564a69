// Keyseq Core Library
// Keyboard shortcut patterns: parsing, matching, sequences and labels

pub mod clock;
pub mod event;
pub mod format;
pub mod handler;
pub mod key;
pub mod matcher;
pub mod modifier;
pub mod pattern;
pub mod platform;
pub mod sequence;

#[cfg(feature = "settings")]
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event::KeyEvent;
pub use format::{format, format_pattern, FormatOptions};
pub use handler::{build_handler, build_handler_with_clock, PatternSource, ShortcutHandler};
pub use matcher::{match_any, match_one, matches, MatchOptions, Patterns};
pub use modifier::{Modifier, Modifiers};
pub use pattern::{parse, parse_strict, ParsedPattern, PatternError, Step};
pub use platform::{EnvironmentHints, Platform};
pub use sequence::{
    RecognizerDriver, SequenceRecognizer, SequenceState, TimerAction, Transition,
    DEFAULT_SEQUENCE_TIMEOUT,
};

#[cfg(feature = "settings")]
pub use settings::{Settings, SettingsError};
