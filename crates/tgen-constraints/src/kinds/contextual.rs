use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel, clamp_weight, content_hash};
use crate::mask::{TokenId, TokenMask};
use crate::state::GenerationState;
use crate::vocab::{self, Vocabulary};
use rustc_hash::{FxHashMap, FxHashSet};

const DEFAULT_STRENGTH: f32 = 1.0;

/// Session-level preferences: style and length.
///
/// Preferred words (identifiers, keywords) get a positive bias on every
/// token that starts them, discouraged words a negative one; both scale
/// with the weight. Banned token texts are illegal. Once `token_count`
/// reaches the length budget, only stop tokens remain legal.
#[derive(Clone, Debug)]
pub struct ContextualConstraint {
    preferred: Vec<String>,
    discouraged: Vec<String>,
    banned_texts: Vec<String>,
    stop_texts: Vec<String>,
    max_tokens: Option<usize>,
    strength: f32,
    weight: f32,
}

impl Default for ContextualConstraint {
    fn default() -> Self {
        ContextualConstraint::new()
    }
}

impl ContextualConstraint {
    pub fn new() -> Self {
        ContextualConstraint {
            preferred: Vec::new(),
            discouraged: Vec::new(),
            banned_texts: Vec::new(),
            stop_texts: Vec::new(),
            max_tokens: None,
            strength: DEFAULT_STRENGTH,
            weight: 1.0,
        }
    }

    pub fn prefer(mut self, word: impl Into<String>) -> Self {
        self.preferred.push(word.into());
        self
    }

    pub fn discourage(mut self, word: impl Into<String>) -> Self {
        self.discouraged.push(word.into());
        self
    }

    pub fn ban_text(mut self, text: impl Into<String>) -> Self {
        self.banned_texts.push(text.into());
        self
    }

    /// Limit generation to `max_tokens`; afterwards only `stop_texts` are
    /// legal.
    pub fn with_length_budget<I, S>(mut self, max_tokens: usize, stop_texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.max_tokens = Some(max_tokens);
        self.stop_texts = stop_texts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    fn bias_for(&self, text: &str) -> Option<f32> {
        let piece = text.trim();
        if piece.is_empty() {
            return None;
        }
        let scaled = self.strength * self.weight;
        if self.preferred.iter().any(|w| w.starts_with(piece)) {
            Some(scaled)
        } else if self.discouraged.iter().any(|w| w.starts_with(piece)) {
            Some(-scaled)
        } else {
            None
        }
    }
}

impl Constraint for ContextualConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Contextual
    }

    fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Contextual
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        let over_budget = self.max_tokens.is_some_and(|max| state.token_count >= max);

        let mut allowed: FxHashSet<TokenId> = FxHashSet::default();
        let mut forbidden: FxHashSet<TokenId> = FxHashSet::default();
        let mut bias: FxHashMap<TokenId, f32> = FxHashMap::default();
        for (token, text) in vocab::tokens(vocab) {
            if over_budget && self.stop_texts.iter().any(|s| s == text) {
                allowed.insert(token);
            }
            if self.banned_texts.iter().any(|b| b == text) {
                forbidden.insert(token);
                continue;
            }
            if let Some(b) = self.bias_for(text) {
                bias.insert(token, b);
            }
        }

        TokenMask {
            allowed: over_budget.then_some(allowed),
            forbidden: (!forbidden.is_empty()).then_some(forbidden),
            bias: (!bias.is_empty()).then_some(bias),
        }
    }

    fn cache_key(&self) -> u64 {
        content_hash(
            &self.kind(),
            self.level(),
            &(
                &self.preferred,
                &self.discouraged,
                &self.banned_texts,
                &self.stop_texts,
                self.max_tokens,
                self.strength.to_bits(),
                self.weight.to_bits(),
            ),
        )
    }
}
