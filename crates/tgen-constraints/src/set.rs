//! Ordered collections of constraints.

use crate::constraint::{Constraint, ConstraintKind};
use crate::error::ConstraintError;
use crate::mask::{TokenId, TokenMask};
use crate::state::GenerationState;
use crate::vocab::Vocabulary;
use rustc_hash::FxHasher;
use std::hash::Hasher;
use std::sync::Arc;
use tgen_common::{EngineConfig, LevelSet};
use tracing::{debug, trace};

/// One bucket per entry of `ConstraintKind::ORDER`.
const BUCKETS: usize = 6;

/// Constraints grouped by kind.
///
/// Evaluation visits the buckets in a fixed order (syntactic, schema,
/// pattern, type, semantic, contextual) and, within a bucket, insertion
/// order. Masks are merged left to right, so the result does not depend
/// on the order in which constraints of different kinds were added, and
/// later (weaker) constraints can only narrow what earlier ones allow.
#[derive(Clone)]
pub struct ConstraintSet {
    buckets: [Vec<Arc<dyn Constraint>>; BUCKETS],
    enabled_levels: LevelSet,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        ConstraintSet::new()
    }
}

impl ConstraintSet {
    pub fn new() -> Self {
        ConstraintSet {
            buckets: Default::default(),
            enabled_levels: LevelSet::all(),
        }
    }

    /// Empty set honoring `config.enabled_levels`.
    pub fn with_config(config: &EngineConfig) -> Self {
        ConstraintSet {
            enabled_levels: config.enabled_levels,
            ..ConstraintSet::new()
        }
    }

    pub fn enabled_levels(&self) -> LevelSet {
        self.enabled_levels
    }

    pub fn add(&mut self, constraint: Arc<dyn Constraint>) -> Result<(), ConstraintError> {
        let kind = constraint.kind();
        let Some(bucket) = kind.bucket() else {
            debug!(%kind, "rejected constraint of unknown kind");
            return Err(ConstraintError::UnknownConstraintKind(kind.to_string()));
        };
        self.buckets[bucket].push(constraint);
        Ok(())
    }

    /// Builder form of [`add`](Self::add).
    pub fn with<C: Constraint + 'static>(mut self, constraint: C) -> Result<Self, ConstraintError> {
        self.add(Arc::new(constraint))?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Constraints in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Constraint>> {
        self.buckets.iter().flatten()
    }

    /// Constraints of one kind, in insertion order.
    pub fn of_kind(&self, kind: &ConstraintKind) -> &[Arc<dyn Constraint>] {
        match kind.bucket() {
            Some(bucket) => &self.buckets[bucket],
            None => &[],
        }
    }

    /// Merged mask of every enabled constraint.
    pub fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        let mut mask = TokenMask::permissive();
        for constraint in self.iter() {
            let level = constraint.level();
            if !self.enabled_levels.contains(level.level_set()) {
                trace!(kind = %constraint.kind(), %level, "level disabled, skipping");
                continue;
            }
            mask.merge_in(&constraint.evaluate(state, vocab));
        }
        mask
    }

    pub fn is_legal(&self, token: TokenId, state: &GenerationState, vocab: &dyn Vocabulary) -> bool {
        self.evaluate(state, vocab).is_legal(token)
    }

    /// The most specific grammar available: the first syntactic grammar,
    /// else the first schema grammar, else the first any other constraint
    /// produces.
    pub fn to_grammar(&self) -> Option<String> {
        self.iter().find_map(|constraint| constraint.to_grammar())
    }

    /// Order-sensitive hash over the members' cache keys.
    pub fn cache_key(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_u8(self.enabled_levels.bits());
        for constraint in self.iter() {
            hasher.write_u64(constraint.cache_key());
        }
        hasher.finish()
    }
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("constraints", &self.iter().collect::<Vec<_>>())
            .field("enabled_levels", &self.enabled_levels)
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/set_tests.rs"]
mod tests;
