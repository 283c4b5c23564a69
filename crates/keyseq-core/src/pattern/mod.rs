// Keyseq Pattern Model
// Parsed shortcut patterns: single steps and multi-step sequences

pub mod parser;
pub(crate) mod token;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::key::SPACE;
use crate::modifier::Modifiers;

pub use parser::{parse, parse_strict, PatternError};

/// Storage for the steps of a pattern; most patterns have one or two
pub type Steps = SmallVec<[Step; 2]>;

/// One `modifiers + key` unit of a pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    /// Canonical key, or `None` to accept any key under these modifiers
    pub key: Option<String>,
    /// Modifiers that must be held, exactly
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl Step {
    pub fn new(key: Option<String>, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.modifiers.iter().map(<&'static str>::from).collect();
        match self.key.as_deref() {
            Some(SPACE) => parts.push("space"),
            Some("+") => parts.push("plus"),
            Some("-") => parts.push("minus"),
            Some(key) => parts.push(key),
            None => {}
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A parsed pattern, either a single step or a sequence of steps.
///
/// For a single step, the top-level key and modifiers equal the only entry of
/// `sequence`. For a sequence, the top-level fields are empty and `sequence`
/// holds two or more steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PatternSteps")]
pub struct ParsedPattern {
    key: Option<String>,
    #[serde(flatten)]
    modifiers: Modifiers,
    is_sequence: bool,
    sequence: Steps,
}

impl ParsedPattern {
    /// Build a pattern from its steps: zero steps is the empty step, one step
    /// is a single-step pattern, more is a sequence
    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        let mut steps: Steps = steps.into_iter().collect();
        match steps.len() {
            0 => Self::single(Step::default()),
            1 => Self::single(steps.remove(0)),
            _ => Self {
                key: None,
                modifiers: Modifiers::NONE,
                is_sequence: true,
                sequence: steps,
            },
        }
    }

    fn single(step: Step) -> Self {
        Self {
            key: step.key.clone(),
            modifiers: step.modifiers,
            is_sequence: false,
            sequence: smallvec::smallvec![step],
        }
    }

    /// Top-level key; always `None` for sequences
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Top-level modifiers; always empty for sequences
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_sequence(&self) -> bool {
        self.is_sequence
    }

    /// Every step in order (exactly one for a single-step pattern)
    pub fn sequence(&self) -> &[Step] {
        &self.sequence
    }

    /// The match target of a single-step pattern
    pub fn single_step(&self) -> Option<&Step> {
        if self.is_sequence {
            None
        } else {
            self.sequence.first()
        }
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always false: a pattern has at least one step
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Deserialized form: only the steps are read, the rest is rebuilt
#[derive(Deserialize)]
struct PatternSteps {
    sequence: Steps,
}

impl From<PatternSteps> for ParsedPattern {
    fn from(steps: PatternSteps) -> Self {
        ParsedPattern::from_steps(steps.sequence)
    }
}

impl fmt::Display for ParsedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.sequence.iter().map(|step| step.to_string()).collect();
        write!(f, "{}", steps.join(" "))
    }
}
