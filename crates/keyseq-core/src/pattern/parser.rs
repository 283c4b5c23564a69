// Keyseq Pattern Parser
// Parses pattern strings like "Control+k" or "g g" into a ParsedPattern

use thiserror::Error;

use super::token::{tokenize, StepTokens, Token};
use super::{ParsedPattern, Step, Steps};
use crate::key::canonicalize_key;
use crate::matcher::MatchOptions;
use crate::modifier::Modifiers;

/// Problems the strict parser reports; the lenient parser silently drops them
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("step {0} has no tokens")]
    EmptyStep(usize),
    #[error("unrecognized modifier '{0}'")]
    UnrecognizedModifier(String),
    #[error("step {step} names more than one key: {}", .keys.join(", "))]
    MultipleKeys { step: usize, keys: Vec<String> },
}

/// Parse a pattern string.
///
/// Never fails. Disabled modifier aliases are ignored, a step naming several
/// keys keeps the last one, and an empty pattern gives a step with no key and
/// no modifiers.
///
/// # Examples
/// ```
/// use keyseq_core::{parse, MatchOptions};
/// let pattern = parse("Control+k", &MatchOptions::default());
/// assert_eq!(pattern.key(), Some("k"));
/// assert!(pattern.modifiers().ctrl);
/// assert!(!pattern.is_sequence());
/// ```
pub fn parse(pattern: &str, options: &MatchOptions) -> ParsedPattern {
    let steps: Steps = tokenize(pattern, options)
        .iter()
        .map(|tokens| assemble_step(tokens, options))
        .collect();
    ParsedPattern::from_steps(steps)
}

/// Parse a pattern string, rejecting anything the lenient parser would drop.
///
/// On success the result is identical to [`parse`].
pub fn parse_strict(pattern: &str, options: &MatchOptions) -> Result<ParsedPattern, PatternError> {
    let tokenized = tokenize(pattern, options);
    if tokenized.is_empty() {
        return Err(PatternError::Empty);
    }

    for (index, tokens) in tokenized.iter().enumerate() {
        if tokens.is_empty() {
            return Err(PatternError::EmptyStep(index));
        }

        let mut keys = Vec::new();
        for token in tokens {
            match token {
                Token::Unrecognized(name) => {
                    return Err(PatternError::UnrecognizedModifier(name.to_string()))
                }
                Token::Key(name) => keys.push(name.to_string()),
                Token::Modifier(_) => {}
            }
        }
        if keys.len() > 1 {
            return Err(PatternError::MultipleKeys { step: index, keys });
        }
    }

    let steps: Steps = tokenized
        .iter()
        .map(|tokens| assemble_step(tokens, options))
        .collect();
    Ok(ParsedPattern::from_steps(steps))
}

fn assemble_step(tokens: &StepTokens<'_>, options: &MatchOptions) -> Step {
    let mut modifiers = Modifiers::NONE;
    let mut key: Option<String> = None;

    for token in tokens {
        match *token {
            Token::Modifier(modifier) => modifiers.set(modifier),
            Token::Unrecognized(name) => {
                log::debug!("ignoring unrecognized modifier '{}'", name);
            }
            Token::Key(name) => {
                let canonical = canonicalize_key(name, options.case_sensitive);
                if let Some(discarded) = key.replace(canonical) {
                    log::debug!("discarding key '{}' in favor of '{}'", discarded, name);
                }
            }
        }
    }

    Step::new(key, modifiers)
}
