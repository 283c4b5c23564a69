// Keyseq Pattern Tokenizer
// Splits a pattern into steps and tokens and classifies each token

use smallvec::SmallVec;

use crate::matcher::MatchOptions;
use crate::modifier::{Modifier, ModifierAlias};

/// A classified `+`-separated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// A modifier, with the platform alias already resolved
    Modifier(Modifier),
    /// A modifier alias that is switched off by the options (`mod`)
    Unrecognized(&'a str),
    /// Anything else names the key
    Key(&'a str),
}

pub(crate) type StepTokens<'a> = SmallVec<[Token<'a>; 4]>;

/// Step-strings of a pattern: split on single spaces, trimmed, empties dropped
pub(crate) fn split_steps(pattern: &str) -> impl Iterator<Item = &str> {
    pattern
        .split(' ')
        .map(str::trim)
        .filter(|step| !step.is_empty())
}

/// Tokens of a step-string: split on `+`, trimmed, empties dropped
pub(crate) fn split_tokens(step: &str) -> impl Iterator<Item = &str> {
    step.split('+')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(crate) fn classify<'a>(token: &'a str, options: &MatchOptions) -> Token<'a> {
    match ModifierAlias::lookup(token) {
        Some(ModifierAlias::Platform) if !options.treat_alias_as_platform_modifier => {
            Token::Unrecognized(token)
        }
        Some(alias) => Token::Modifier(alias.resolve(options.resolved_platform())),
        None => Token::Key(token),
    }
}

/// Tokenize and classify a whole pattern, one token list per step
pub(crate) fn tokenize<'a>(pattern: &'a str, options: &MatchOptions) -> Vec<StepTokens<'a>> {
    split_steps(pattern)
        .map(|step| split_tokens(step).map(|token| classify(token, options)).collect())
        .collect()
}
