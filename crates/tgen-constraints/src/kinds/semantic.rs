use super::{EXPRESSION_KEYWORDS, WordStep, identifier_mask, word_step};
use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel, clamp_weight, content_hash};
use crate::mask::{TokenId, TokenMask};
use crate::state::GenerationState;
use crate::vocab::{self, Vocabulary};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

/// Name-level rules: banned identifiers and declared-before-use.
///
/// A banned identifier is illegal whenever a token would complete it as a
/// whole word. With `require_declared`, identifiers outside member access
/// must spell a symbol of the typing context, an expression keyword, or a
/// configured global.
#[derive(Clone, Debug)]
pub struct SemanticConstraint {
    banned: IndexSet<String>,
    globals: IndexSet<String>,
    require_declared: bool,
    weight: f32,
}

impl Default for SemanticConstraint {
    fn default() -> Self {
        SemanticConstraint::new()
    }
}

impl SemanticConstraint {
    pub fn new() -> Self {
        SemanticConstraint {
            banned: IndexSet::new(),
            globals: IndexSet::new(),
            require_declared: false,
            weight: 1.0,
        }
    }

    pub fn ban_identifier(mut self, name: impl Into<String>) -> Self {
        self.banned.insert(name.into());
        self
    }

    /// A name that is always in scope (`console`, `Math`, ...).
    pub fn with_global(mut self, name: impl Into<String>) -> Self {
        self.globals.insert(name.into());
        self
    }

    pub fn require_declared(mut self, enabled: bool) -> Self {
        self.require_declared = enabled;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    fn banned_tokens(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> FxHashSet<TokenId> {
        if self.banned.is_empty() {
            return FxHashSet::default();
        }
        let current = state.current_word();
        vocab::tokens(vocab)
            .filter(|(_, text)| match word_step(current, text) {
                WordStep::Extends { word, closed } => {
                    self.banned.contains(&word) && (closed || text.trim() == word)
                }
                _ => false,
            })
            .map(|(token, _)| token)
            .collect()
    }
}

impl Constraint for SemanticConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Semantic
    }

    fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Semantic
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        if self.weight <= 0.0 {
            return TokenMask::permissive();
        }
        let banned = self.banned_tokens(state, vocab);
        let mut mask = if banned.is_empty() {
            TokenMask::permissive()
        } else {
            TokenMask::forbid(banned)
        };

        if self.require_declared && !state.after_member_dot() {
            let candidates: FxHashMap<String, f32> = state
                .context
                .symbol_names()
                .chain(self.globals.iter().map(String::as_str))
                .chain(EXPRESSION_KEYWORDS.iter().copied())
                .filter(|name| !self.banned.contains(*name))
                .map(|name| (name.to_string(), 0.0))
                .collect();
            mask.merge_in(&identifier_mask(&candidates, state, vocab));
        }
        mask
    }

    fn cache_key(&self) -> u64 {
        let banned: Vec<&String> = self.banned.iter().collect();
        let globals: Vec<&String> = self.globals.iter().collect();
        content_hash(
            &self.kind(),
            self.level(),
            &(banned, globals, self.require_declared, self.weight.to_bits()),
        )
    }
}
