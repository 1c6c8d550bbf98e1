//! TypeScript type system.
//!
//! The exemplar plugin. Annotations are parsed from TypeScript type syntax,
//! assignability follows TypeScript's structural rules (with literal
//! widening, union distribution and function variance), and narrowing
//! understands the common type-guard forms.

mod assignability;
mod composite;
mod narrowing;
mod parser;
mod widening;

use crate::TypeSystem;
use crate::error::TypeSystemError;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use tgen_common::Language;
use tgen_solver::{Type, TypeContext, TypeRelation};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct TypeScriptTypeSystem {
    strict_null_checks: bool,
}

impl Default for TypeScriptTypeSystem {
    fn default() -> Self {
        TypeScriptTypeSystem::new()
    }
}

impl TypeScriptTypeSystem {
    /// Plugin with `strictNullChecks` enabled.
    pub fn new() -> Self {
        TypeScriptTypeSystem {
            strict_null_checks: true,
        }
    }

    /// Plugin whose null checking follows the context's strictness flag.
    pub fn from_context(ctx: &TypeContext) -> Self {
        TypeScriptTypeSystem::new().with_strict_null_checks(ctx.strict)
    }

    pub fn with_strict_null_checks(mut self, enabled: bool) -> Self {
        self.strict_null_checks = enabled;
        self
    }

    pub fn strict_null_checks(&self) -> bool {
        self.strict_null_checks
    }
}

impl TypeRelation for TypeScriptTypeSystem {
    fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        assignability::is_assignable(self, source, target)
    }

    /// The context's strictness flag overrides the plugin's own setting.
    fn is_assignable_in(&self, source: &Type, target: &Type, context: &TypeContext) -> bool {
        if context.strict == self.strict_null_checks {
            return self.is_assignable(source, target);
        }
        TypeScriptTypeSystem::from_context(context).is_assignable(source, target)
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        Language::TypeScript.hash(&mut hasher);
        self.strict_null_checks.hash(&mut hasher);
        hasher.finish()
    }
}

impl TypeSystem for TypeScriptTypeSystem {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn parse(&self, annotation: &str) -> Type {
        parser::parse_annotation(annotation)
    }

    fn widen(&self, ty: &Type) -> Type {
        widening::widen(ty)
    }

    fn narrow(&self, ty: &Type, guard: &str) -> Type {
        narrowing::narrow(ty, guard)
    }

    fn resolve_union(&self, members: &[Type]) -> Type {
        composite::resolve_union(members)
    }

    fn resolve_intersection(&self, members: &[Type]) -> Type {
        composite::resolve_intersection(members)
    }

    fn instantiate_generic(&self, generic: &Type, args: &[Type]) -> Result<Type, TypeSystemError> {
        let expected = generic.parameters().len();
        if expected != args.len() {
            debug!(
                generic = %generic,
                expected,
                found = args.len(),
                "generic instantiated with wrong arity"
            );
            return Err(TypeSystemError::ArityMismatch {
                name: generic.name().to_string(),
                expected,
                found: args.len(),
            });
        }
        Ok(Type::generic(generic.name(), args.to_vec()).with_nullable(generic.is_nullable()))
    }
}
