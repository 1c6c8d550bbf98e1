use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel, clamp_weight, content_hash};
use crate::error::ConstraintError;
use crate::mask::TokenMask;
use crate::state::GenerationState;
use crate::vocab::{self, Vocabulary};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternMode {
    /// Only tokens whose text matches are legal.
    Allow,
    /// Tokens whose text matches are illegal.
    Forbid,
}

/// Token text filtered through a regular expression.
#[derive(Clone, Debug)]
pub struct PatternConstraint {
    regex: Regex,
    mode: PatternMode,
    weight: f32,
}

impl PatternConstraint {
    pub fn new(pattern: &str, mode: PatternMode) -> Result<Self, ConstraintError> {
        let regex = Regex::new(pattern).map_err(|source| ConstraintError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(PatternConstraint {
            regex,
            mode,
            weight: 1.0,
        })
    }

    pub fn allow(pattern: &str) -> Result<Self, ConstraintError> {
        PatternConstraint::new(pattern, PatternMode::Allow)
    }

    pub fn forbid(pattern: &str) -> Result<Self, ConstraintError> {
        PatternConstraint::new(pattern, PatternMode::Forbid)
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }
}

impl Constraint for PatternConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Pattern
    }

    fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Syntactic
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, _state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        if self.weight <= 0.0 {
            return TokenMask::permissive();
        }
        let matching = vocab::tokens(vocab)
            .filter(|(_, text)| self.regex.is_match(text))
            .map(|(token, _)| token);
        match self.mode {
            PatternMode::Allow => TokenMask::allow_only(matching),
            PatternMode::Forbid => TokenMask::forbid(matching),
        }
    }

    fn cache_key(&self) -> u64 {
        content_hash(
            &self.kind(),
            self.level(),
            &(self.regex.as_str(), self.mode, self.weight.to_bits()),
        )
    }
}
