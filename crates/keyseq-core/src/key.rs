// Keyseq Key Names
// Canonical key names and the named-key alias table used by patterns

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical name of the space bar
pub const SPACE: &str = " ";

/// Named-key aliases (lowercase) and the canonical name each resolves to
const NAMED_KEYS: &[(&str, &str)] = &[
    ("esc", "Escape"),
    ("escape", "Escape"),
    ("enter", "Enter"),
    ("return", "Enter"),
    ("space", SPACE),
    ("spacebar", SPACE),
    ("tab", "Tab"),
    ("backspace", "Backspace"),
    ("delete", "Delete"),
    ("del", "Delete"),
    ("insert", "Insert"),
    ("ins", "Insert"),
    ("home", "Home"),
    ("end", "End"),
    ("pageup", "PageUp"),
    ("pgup", "PageUp"),
    ("pagedown", "PageDown"),
    ("pgdn", "PageDown"),
    ("up", "ArrowUp"),
    ("arrowup", "ArrowUp"),
    ("down", "ArrowDown"),
    ("arrowdown", "ArrowDown"),
    ("left", "ArrowLeft"),
    ("arrowleft", "ArrowLeft"),
    ("right", "ArrowRight"),
    ("arrowright", "ArrowRight"),
    ("plus", "+"),
    ("minus", "-"),
];

fn named_key_index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| NAMED_KEYS.iter().copied().collect())
}

/// Resolve a named-key alias (case-insensitive)
pub fn named_key(token: &str) -> Option<&'static str> {
    named_key_index().get(token.to_lowercase().as_str()).copied()
}

/// All named-key aliases with their canonical names, in table order
pub fn named_keys() -> &'static [(&'static str, &'static str)] {
    NAMED_KEYS
}

/// True if `key` is exactly one character
pub fn is_single_char(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some() && chars.next().is_none()
}

/// Canonicalize a key token taken from a pattern.
///
/// Named aliases resolve through the table. Otherwise a single character is
/// lowercased and a longer name gets its first letter capitalized, both only
/// when matching is case-insensitive.
pub fn canonicalize_key(token: &str, case_sensitive: bool) -> String {
    if let Some(named) = named_key(token) {
        return named.to_string();
    }
    if case_sensitive {
        return token.to_string();
    }
    if is_single_char(token) {
        return token.to_lowercase();
    }

    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize a key for comparison: single characters fold to lowercase
/// unless matching is case-sensitive, anything else is compared as-is
pub fn comparable_key(key: &str, case_sensitive: bool) -> Cow<'_, str> {
    if !case_sensitive && is_single_char(key) {
        Cow::Owned(key.to_lowercase())
    } else {
        Cow::Borrowed(key)
    }
}
