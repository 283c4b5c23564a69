// Keyseq Event Matching
// Compares single key events against parsed patterns with exact modifiers

use serde::{Deserialize, Serialize};

use crate::event::KeyEvent;
use crate::key::comparable_key;
use crate::pattern::{parse, Step};
use crate::platform::Platform;

/// Options shared by parsing and matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// Platform used to resolve `mod`; `None` behaves like an unknown platform
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Compare single-character keys with their case
    #[serde(default)]
    pub case_sensitive: bool,
    /// Whether `mod` stands for the platform accelerator or is ignored
    #[serde(default = "default_true")]
    pub treat_alias_as_platform_modifier: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            platform: None,
            case_sensitive: false,
            treat_alias_as_platform_modifier: true,
        }
    }
}

impl MatchOptions {
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_platform_alias(mut self, enabled: bool) -> Self {
        self.treat_alias_as_platform_modifier = enabled;
        self
    }

    /// The platform `mod` resolves against
    pub fn resolved_platform(&self) -> Platform {
        self.platform.unwrap_or_default()
    }
}

/// Match one event against one step.
///
/// Held modifiers must equal the step's modifiers exactly. A step without a
/// key matches any key under those modifiers.
pub fn matches(event: &KeyEvent, step: &Step, case_sensitive: bool) -> bool {
    if event.modifiers != step.modifiers {
        return false;
    }
    match step.key.as_deref() {
        None => true,
        Some(key) => comparable_key(&event.key, case_sensitive) == comparable_key(key, case_sensitive),
    }
}

/// Match one event against a pattern string.
///
/// Sequences never match here; they need a recognizer.
pub fn match_one(event: &KeyEvent, pattern: &str, options: &MatchOptions) -> bool {
    let parsed = parse(pattern, options);
    match parsed.single_step() {
        Some(step) => matches(event, step, options.case_sensitive),
        None => false,
    }
}

/// One or more pattern strings, as accepted by [`match_any`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patterns(Vec<String>);

impl Patterns {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Patterns {
    fn from(pattern: &str) -> Self {
        Patterns(vec![pattern.to_string()])
    }
}

impl From<String> for Patterns {
    fn from(pattern: String) -> Self {
        Patterns(vec![pattern])
    }
}

impl<S: Into<String>> From<Vec<S>> for Patterns {
    fn from(patterns: Vec<S>) -> Self {
        Patterns(patterns.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Patterns {
    fn from(patterns: [&str; N]) -> Self {
        Patterns(patterns.iter().map(|p| p.to_string()).collect())
    }
}

impl From<&[&str]> for Patterns {
    fn from(patterns: &[&str]) -> Self {
        Patterns(patterns.iter().map(|p| p.to_string()).collect())
    }
}

impl From<&[String]> for Patterns {
    fn from(patterns: &[String]) -> Self {
        Patterns(patterns.to_vec())
    }
}

/// Match one event against one or several patterns, in order, stopping at
/// the first match.
///
/// # Examples
/// ```
/// use keyseq_core::{match_any, KeyEvent, MatchOptions};
/// let event = KeyEvent::new("s").with_ctrl();
/// assert!(match_any(&event, ["ctrl+k", "ctrl+s"], &MatchOptions::default()));
/// assert!(match_any(&event, "ctrl+s", &MatchOptions::default()));
/// ```
pub fn match_any(event: &KeyEvent, patterns: impl Into<Patterns>, options: &MatchOptions) -> bool {
    let patterns: Patterns = patterns.into();
    let matched = patterns
        .iter()
        .any(|pattern| match_one(event, pattern, options));
    matched
}
