// Keyseq Pattern Formatting
// Renders patterns as platform-appropriate labels ("⌘K", "Ctrl + K", "G then G")

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::key::{is_single_char, SPACE};
use crate::matcher::MatchOptions;
use crate::modifier::Modifier;
use crate::pattern::{parse, ParsedPattern, Step};
use crate::platform::{EnvironmentHints, Platform};

/// Glyph shown for the space bar in symbol style
pub const SPACE_GLYPH: &str = "␣";

/// Label style and platform for formatting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Platform to format for; resolved from `hints` when unset
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Environment used when `platform` is unset
    #[serde(default)]
    pub hints: EnvironmentHints,
    /// Symbol glyphs instead of words; defaults to the platform's style
    #[serde(default)]
    pub use_symbols: Option<bool>,
    /// Text between labels of one step; "" for symbols, " + " for words
    #[serde(default)]
    pub separator: Option<String>,
}

impl FormatOptions {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Self::default()
        }
    }

    pub fn with_symbols(mut self, use_symbols: bool) -> Self {
        self.use_symbols = Some(use_symbols);
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// The platform labels are rendered for
    pub fn resolved_platform(&self) -> Platform {
        self.platform
            .unwrap_or_else(|| Platform::resolve(&self.hints))
    }
}

/// Format a pattern string for display.
///
/// # Examples
/// ```
/// use keyseq_core::{format, FormatOptions, Platform};
/// assert_eq!(format("Control+k", &FormatOptions::for_platform(Platform::Windows)), "Ctrl + K");
/// assert_eq!(format("g g", &FormatOptions::for_platform(Platform::Linux)), "G then G");
/// ```
pub fn format(pattern: &str, options: &FormatOptions) -> String {
    let platform = options.resolved_platform();
    let parsed = parse(pattern, &MatchOptions::default().with_platform(platform));
    format_pattern(&parsed, options)
}

/// Format an already parsed pattern
pub fn format_pattern(pattern: &ParsedPattern, options: &FormatOptions) -> String {
    let style = LabelStyle::new(options);
    let steps: Vec<String> = pattern
        .sequence()
        .iter()
        .map(|step| style.format_step(step))
        .collect();
    let joiner = if style.use_symbols { " " } else { " then " };
    steps.join(joiner)
}

/// Resolved formatting choices for one call
struct LabelStyle<'a> {
    platform: Platform,
    use_symbols: bool,
    separator: &'a str,
}

impl<'a> LabelStyle<'a> {
    fn new(options: &'a FormatOptions) -> Self {
        let platform = options.resolved_platform();
        let use_symbols = options.use_symbols.unwrap_or_else(|| platform.uses_symbols());
        let separator = match &options.separator {
            Some(separator) => separator.as_str(),
            None if use_symbols => "",
            None => " + ",
        };
        Self {
            platform,
            use_symbols,
            separator,
        }
    }

    fn format_step(&self, step: &Step) -> String {
        let mut labels: Vec<Cow<'_, str>> = step
            .modifiers
            .iter()
            .map(|modifier| Cow::Borrowed(self.modifier_label(modifier)))
            .collect();
        if let Some(key) = step.key.as_deref() {
            labels.push(self.key_label(key));
        }
        labels.join(self.separator)
    }

    fn modifier_label(&self, modifier: Modifier) -> &'static str {
        if self.use_symbols {
            return match modifier {
                Modifier::Ctrl => "⌃",
                Modifier::Meta => "⌘",
                Modifier::Shift => "⇧",
                Modifier::Alt => "⌥",
            };
        }
        match (modifier, self.platform) {
            (Modifier::Ctrl, _) => "Ctrl",
            (Modifier::Shift, _) => "Shift",
            (Modifier::Meta, Platform::Mac) => "Command",
            (Modifier::Meta, _) => "Meta",
            (Modifier::Alt, Platform::Mac) => "Option",
            (Modifier::Alt, _) => "Alt",
        }
    }

    fn key_label<'k>(&self, key: &'k str) -> Cow<'k, str> {
        if key == SPACE {
            return Cow::Borrowed(if self.use_symbols { SPACE_GLYPH } else { "Space" });
        }
        if is_single_char(key) {
            return Cow::Owned(key.to_uppercase());
        }
        Cow::Borrowed(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> FormatOptions {
        FormatOptions::for_platform(Platform::Windows)
    }

    fn mac() -> FormatOptions {
        FormatOptions::for_platform(Platform::Mac)
    }

    #[test]
    fn test_format_words() {
        assert_eq!(format("Control+k", &windows()), "Ctrl + K");
        assert_eq!(format("shift+alt+f1", &windows()), "Shift + Alt + F1");
    }

    #[test]
    fn test_format_symbols() {
        assert_eq!(format("Control+k", &mac()), "⌃K");
        assert_eq!(format("cmd+shift+p", &mac()), "⌘⇧P");
        assert_eq!(format("alt+ctrl+meta+shift+x", &mac()), "⌃⌘⇧⌥X");
    }

    #[test]
    fn test_format_sequence() {
        assert_eq!(format("g g", &windows()), "G then G");
        assert_eq!(format("g g", &mac()), "G G");
        assert_eq!(format("ctrl+k ctrl+s", &windows()), "Ctrl + K then Ctrl + S");
    }

    #[test]
    fn test_format_platform_words() {
        let mac_words = mac().with_symbols(false);
        assert_eq!(format("cmd+option+k", &mac_words), "Command + Option + K");
        assert_eq!(format("cmd+option+k", &windows()), "Meta + Alt + K");
    }

    #[test]
    fn test_format_mod_alias_follows_platform() {
        assert_eq!(format("mod+k", &mac()), "⌘K");
        assert_eq!(format("mod+k", &windows()), "Ctrl + K");
    }

    #[test]
    fn test_format_space_key() {
        assert_eq!(format("space", &mac()), "␣");
        assert_eq!(format("ctrl+space", &windows()), "Ctrl + Space");
    }

    #[test]
    fn test_format_named_keys_keep_canonical_name() {
        assert_eq!(format("esc", &windows()), "Escape");
        assert_eq!(format("shift+up", &mac()), "⇧ArrowUp");
    }

    #[test]
    fn test_format_custom_separator() {
        let options = windows().with_separator("-");
        assert_eq!(format("ctrl+shift+k", &options), "Ctrl-Shift-K");
        let options = mac().with_separator("+");
        assert_eq!(format("cmd+k", &options), "⌘+K");
    }

    #[test]
    fn test_format_modifier_only() {
        assert_eq!(format("ctrl+shift", &windows()), "Ctrl + Shift");
    }

    #[test]
    fn test_format_unknown_platform_uses_words() {
        assert_eq!(format("mod+k", &FormatOptions::default()), "Ctrl + K");
    }

    #[test]
    fn test_format_resolves_platform_from_hints() {
        let options = FormatOptions {
            hints: EnvironmentHints::new().with_os("macos"),
            ..FormatOptions::default()
        };
        assert_eq!(format("mod+k", &options), "⌘K");
    }

    #[test]
    fn test_format_parsed_pattern() {
        let parsed = parse("ctrl+k", &MatchOptions::default());
        assert_eq!(format_pattern(&parsed, &windows()), "Ctrl + K");
    }
}
