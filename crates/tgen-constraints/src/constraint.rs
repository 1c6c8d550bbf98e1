//! The constraint abstraction.

use crate::mask::TokenMask;
use crate::state::GenerationState;
use crate::vocab::Vocabulary;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use tgen_common::LevelSet;

/// Rank of a constraint in the hierarchy. Lower levels are stricter.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ConstraintLevel {
    Syntactic = 1,
    Type = 2,
    Semantic = 3,
    Contextual = 4,
}

impl ConstraintLevel {
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// The `EngineConfig::enabled_levels` flag that gates this level.
    pub const fn level_set(self) -> LevelSet {
        match self {
            ConstraintLevel::Syntactic => LevelSet::SYNTACTIC,
            ConstraintLevel::Type => LevelSet::TYPE,
            ConstraintLevel::Semantic => LevelSet::SEMANTIC,
            ConstraintLevel::Contextual => LevelSet::CONTEXTUAL,
        }
    }
}

impl fmt::Display for ConstraintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstraintLevel::Syntactic => "syntactic",
            ConstraintLevel::Type => "type",
            ConstraintLevel::Semantic => "semantic",
            ConstraintLevel::Contextual => "contextual",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Syntactic,
    Schema,
    Pattern,
    Type,
    Semantic,
    Contextual,
    /// A host-defined kind. A `ConstraintSet` has no bucket for these.
    Custom(String),
}

impl ConstraintKind {
    /// Evaluation order of the built-in kinds.
    pub const ORDER: [ConstraintKind; 6] = [
        ConstraintKind::Syntactic,
        ConstraintKind::Schema,
        ConstraintKind::Pattern,
        ConstraintKind::Type,
        ConstraintKind::Semantic,
        ConstraintKind::Contextual,
    ];

    /// Position in [`ORDER`](Self::ORDER); `None` for custom kinds.
    pub fn bucket(&self) -> Option<usize> {
        match self {
            ConstraintKind::Syntactic => Some(0),
            ConstraintKind::Schema => Some(1),
            ConstraintKind::Pattern => Some(2),
            ConstraintKind::Type => Some(3),
            ConstraintKind::Semantic => Some(4),
            ConstraintKind::Contextual => Some(5),
            ConstraintKind::Custom(_) => None,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Syntactic => f.write_str("syntactic"),
            ConstraintKind::Schema => f.write_str("schema"),
            ConstraintKind::Pattern => f.write_str("pattern"),
            ConstraintKind::Type => f.write_str("type"),
            ConstraintKind::Semantic => f.write_str("semantic"),
            ConstraintKind::Contextual => f.write_str("contextual"),
            ConstraintKind::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// A source of token masks.
///
/// Implementations must be pure functions of the state they are given:
/// a `ConstraintSet` evaluates every member against the same state and
/// merges the results, and hosts may memoize on [`cache_key`].
///
/// [`cache_key`]: Constraint::cache_key
pub trait Constraint: Send + Sync + fmt::Debug {
    fn kind(&self) -> ConstraintKind;

    fn level(&self) -> ConstraintLevel;

    /// Strength in `[0, 1]`. Biases a constraint emits are scaled by it;
    /// constraints that only decide legality apply fully at any positive
    /// weight and are switched off at 0.
    fn weight(&self) -> f32 {
        1.0
    }

    fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask;

    /// Grammar text (GBNF rules) equivalent to this constraint, when one
    /// exists.
    fn to_grammar(&self) -> Option<String> {
        None
    }

    /// Content hash of the constraint's kind, level and parameters.
    fn cache_key(&self) -> u64;
}

/// Clamp a weight into `[0, 1]`; NaN becomes 0.
pub fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

/// FxHash of kind, level and `params`.
pub fn content_hash<P: Hash + ?Sized>(
    kind: &ConstraintKind,
    level: ConstraintLevel,
    params: &P,
) -> u64 {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    level.hash(&mut hasher);
    params.hash(&mut hasher);
    hasher.finish()
}
