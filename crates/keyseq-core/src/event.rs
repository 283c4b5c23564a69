// Keyseq Input Events
// A single discrete key press as delivered by the hosting layer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modifier::{Modifier, Modifiers};

/// One key press: the reported key plus the modifiers held at that moment
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key as reported by the event source (e.g. "k", "K", "Escape", " ")
    pub key: String,
    /// Modifiers held while the key was pressed
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create an event with no modifiers held
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the held modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add one held modifier
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.set(modifier);
        self
    }

    pub fn with_ctrl(self) -> Self {
        self.with_modifier(Modifier::Ctrl)
    }

    pub fn with_meta(self) -> Self {
        self.with_modifier(Modifier::Meta)
    }

    pub fn with_shift(self) -> Self {
        self.with_modifier(Modifier::Shift)
    }

    pub fn with_alt(self) -> Self {
        self.with_modifier(Modifier::Alt)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{:?}", self.key)
        } else {
            write!(f, "{}+{:?}", self.modifiers, self.key)
        }
    }
}
