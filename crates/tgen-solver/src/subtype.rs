//! Assignability (subtyping) between universal types.
//!
//! [`TypeRelation`] is the seam where language plugins plug in their own
//! subtyping rules. The structural rule here is the fallback every plugin
//! ends with; it recurses through the relation it is given so that generic
//! arguments are compared under the plugin's rules too.

use crate::context::TypeContext;
use crate::types::Type;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// A subtyping relation over universal types.
pub trait TypeRelation: Send + Sync {
    /// Whether a value of type `source` may be used where `target` is
    /// expected.
    fn is_assignable(&self, source: &Type, target: &Type) -> bool;

    /// Assignability as configured by `context` (its strictness flag).
    /// Relations without such a mode ignore the context.
    fn is_assignable_in(&self, source: &Type, target: &Type, _context: &TypeContext) -> bool {
        self.is_assignable(source, target)
    }

    /// Identity of the rule set, part of every cache key derived from it.
    /// Relations that can be configured must fold their configuration in.
    fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        std::any::type_name::<Self>().hash(&mut hasher);
        hasher.finish()
    }
}

/// The language-neutral structural rule.
#[derive(Copy, Clone, Debug, Default)]
pub struct StructuralRelation;

impl TypeRelation for StructuralRelation {
    fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        is_structurally_assignable(self, source, target)
    }
}

/// Structural assignability using `StructuralRelation` throughout.
pub fn is_assignable(source: &Type, target: &Type) -> bool {
    is_structurally_assignable(&StructuralRelation, source, target)
}

/// The structural rule, recursing into generic arguments through `relation`.
///
/// - identical types are assignable;
/// - `unknown` and `any` are assignable to and from anything;
/// - a nullable source reaches a non-nullable target only when its non-null
///   form equals the target;
/// - a non-nullable source is compared against the non-null form of a
///   nullable target;
/// - generic types need the same name and arity, with every argument
///   assignable (covariant).
pub fn is_structurally_assignable(
    relation: &dyn TypeRelation,
    source: &Type,
    target: &Type,
) -> bool {
    if source == target {
        return true;
    }
    if source.is_top() || target.is_top() {
        return true;
    }

    match (source.is_nullable(), target.is_nullable()) {
        (true, false) => return source.non_null() == *target,
        (false, true) => return relation.is_assignable(source, &target.non_null()),
        (true, true) => return relation.is_assignable(&source.non_null(), &target.non_null()),
        (false, false) => {}
    }

    if source.name() != target.name() {
        return false;
    }
    if source.parameters().len() != target.parameters().len() {
        return false;
    }
    source
        .parameters()
        .iter()
        .zip(target.parameters())
        .all(|(s, t)| relation.is_assignable(s, t))
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
