// Keyseq Modifier System
// Modifier flags (Ctrl, Meta, Shift, Alt) and the alias table used by patterns

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::platform::Platform;

/// One of the four modifier keys a pattern can require.
///
/// Declaration order is the canonical label order: ctrl, meta, shift, alt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Meta,
    Shift,
    Alt,
}

/// What a modifier token in a pattern stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierAlias {
    /// Always the same modifier (`ctrl`, `cmd`, `option`, ...)
    Fixed(Modifier),
    /// The platform accelerator (`mod`): Meta on Mac, Ctrl elsewhere
    Platform,
}

/// Lowercase alias table, in lookup order
const MODIFIER_ALIASES: &[(&str, ModifierAlias)] = &[
    ("control", ModifierAlias::Fixed(Modifier::Ctrl)),
    ("ctrl", ModifierAlias::Fixed(Modifier::Ctrl)),
    ("command", ModifierAlias::Fixed(Modifier::Meta)),
    ("cmd", ModifierAlias::Fixed(Modifier::Meta)),
    ("meta", ModifierAlias::Fixed(Modifier::Meta)),
    ("shift", ModifierAlias::Fixed(Modifier::Shift)),
    ("option", ModifierAlias::Fixed(Modifier::Alt)),
    ("alt", ModifierAlias::Fixed(Modifier::Alt)),
    ("mod", ModifierAlias::Platform),
];

impl ModifierAlias {
    /// Look up a pattern token (case-insensitive)
    pub fn lookup(token: &str) -> Option<Self> {
        let lower = token.to_lowercase();
        MODIFIER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map(|(_, modifier)| *modifier)
    }

    /// Resolve to a concrete modifier for the given platform
    pub fn resolve(self, platform: Platform) -> Modifier {
        match self {
            ModifierAlias::Fixed(modifier) => modifier,
            ModifierAlias::Platform => platform.platform_modifier(),
        }
    }
}

/// All recognized modifier aliases, in lookup order
pub fn all_aliases() -> impl Iterator<Item = &'static str> {
    MODIFIER_ALIASES.iter().map(|(alias, _)| *alias)
}

/// The exact set of modifiers held for an event or required by a step.
///
/// Comparison is exact: a set with an extra modifier is a different set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    /// No modifier held
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    /// Mark a modifier as held
    pub fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Meta => self.meta = true,
            Modifier::Shift => self.shift = true,
            Modifier::Alt => self.alt = true,
        }
    }

    /// Copy of this set with one more modifier held
    pub fn with(mut self, modifier: Modifier) -> Self {
        self.set(modifier);
        self
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Meta => self.meta,
            Modifier::Shift => self.shift,
            Modifier::Alt => self.alt,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Held modifiers in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::iter().filter(move |modifier| self.contains(*modifier))
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut modifiers = Modifiers::NONE;
        for modifier in iter {
            modifiers.set(modifier);
        }
        modifiers
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&'static str> = self.iter().map(<&'static str>::from).collect();
        write!(f, "{}", parts.join("+"))
    }
}
