//! Built-in constraint kinds, one per bucket of a `ConstraintSet`.

mod contextual;
mod pattern;
mod schema;
mod semantic;
mod syntactic;
mod type_constraint;

pub use contextual::ContextualConstraint;
pub use pattern::{PatternConstraint, PatternMode};
pub use schema::SchemaConstraint;
pub use semantic::SemanticConstraint;
pub use syntactic::SyntacticConstraint;
pub use type_constraint::TypeConstraint;

use crate::mask::{TokenId, TokenMask};
use crate::state::{GenerationState, is_identifier_char, is_identifier_start};
use crate::vocab::{self, Vocabulary};
use rustc_hash::{FxHashMap, FxHashSet};

/// Words that may start an expression without naming a context symbol.
pub(crate) const EXPRESSION_KEYWORDS: &[&str] = &[
    "true",
    "false",
    "null",
    "undefined",
    "this",
    "new",
    "typeof",
    "await",
    "function",
    "async",
    "void",
];

/// How a token relates to the identifier being generated at the cursor.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum WordStep<'a> {
    /// The token does not touch an identifier.
    Unrelated,
    /// The identifier reads `word` after the token; `closed` when the token
    /// also ends it.
    Extends { word: String, closed: bool },
    /// The token ends the identifier without adding to it.
    Closes(&'a str),
}

/// Classify `text` as the next token after `current` (the identifier
/// characters already before the cursor).
pub(crate) fn word_step<'a>(current: &'a str, text: &str) -> WordStep<'a> {
    if current.is_empty() {
        let trimmed = text.trim_start();
        match trimmed.chars().next() {
            Some(c) if is_identifier_start(c) => {
                let piece = identifier_piece(trimmed);
                WordStep::Extends {
                    word: piece.to_string(),
                    closed: piece.len() < trimmed.len(),
                }
            }
            _ => WordStep::Unrelated,
        }
    } else {
        let piece = identifier_piece(text);
        if piece.is_empty() {
            return WordStep::Closes(current);
        }
        WordStep::Extends {
            word: format!("{current}{piece}"),
            closed: piece.len() < text.len(),
        }
    }
}

fn identifier_piece(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_identifier_char(*c))
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Restrict identifier tokens to those spelling one of `candidates`.
///
/// Tokens that do not touch an identifier stay legal. Each candidate
/// carries a bias added to every token that continues it (the largest
/// bias wins when several candidates match). When the identifier already
/// typed before the cursor cannot lead to any candidate the mask is
/// permissive: there is nothing left to steer toward.
pub(crate) fn identifier_mask(
    candidates: &FxHashMap<String, f32>,
    state: &GenerationState,
    vocab: &dyn Vocabulary,
) -> TokenMask {
    let current = state.current_word();
    if !current.is_empty() && !candidates.keys().any(|c| c.starts_with(current)) {
        return TokenMask::permissive();
    }

    let mut forbidden: FxHashSet<TokenId> = FxHashSet::default();
    let mut bias: FxHashMap<TokenId, f32> = FxHashMap::default();
    for (token, text) in vocab::tokens(vocab) {
        let best = match word_step(current, text) {
            WordStep::Unrelated => continue,
            WordStep::Closes(word) => candidates.get(word).copied(),
            WordStep::Extends { word, closed } => candidates
                .iter()
                .filter(|(c, _)| if closed { **c == word } else { c.starts_with(&word) })
                .map(|(_, b)| *b)
                .reduce(f32::max),
        };
        match best {
            None => {
                forbidden.insert(token);
            }
            Some(b) if b != 0.0 => {
                bias.insert(token, b);
            }
            Some(_) => {}
        }
    }

    TokenMask {
        allowed: None,
        forbidden: (!forbidden.is_empty()).then_some(forbidden),
        bias: (!bias.is_empty()).then_some(bias),
    }
}

#[cfg(test)]
#[path = "../../tests/kinds_tests.rs"]
mod tests;
