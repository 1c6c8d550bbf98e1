//! Structural unification producing a type-variable substitution.
//!
//! A parameterless type whose name is not a known ground name is a
//! unification variable. The ground set starts with the primitive names and
//! can be extended with the classes, interfaces and aliases of a context, so
//! that `User` is not mistaken for a variable when the context declares it.
//! Literal type names (`"a"`, `42`, `true`) are always ground.
//!
//! Failures are values: callers try alternative candidates on `Err`.
//!
//! Binding a variable to a type that contains it is rejected with
//! [`UnificationFailure::OccursCheck`]; without the check such a binding would
//! describe an infinite type.

use crate::context::TypeContext;
use crate::types::{PRIMITIVE_TYPE_NAMES, Type};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tgen_common::limits::MAX_SUBSTITUTION_CHAIN;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum UnificationFailure {
    #[error("cannot unify `{left}` with `{right}`")]
    Mismatch { left: Type, right: Type },
    #[error("`{name}` applied to {left} type arguments cannot unify with {right}")]
    ArityMismatch {
        name: String,
        left: usize,
        right: usize,
    },
    #[error("type variable `{var}` occurs in `{ty}`")]
    OccursCheck { var: String, ty: Type },
}

/// Variable bindings produced by unification.
///
/// Bindings may refer to other bound variables; [`Substitution::apply`]
/// resolves chains.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution {
    bindings: IndexMap<String, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution::default()
    }

    pub fn get(&self, var: &str) -> Option<&Type> {
        self.bindings.get(var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn bind(&mut self, var: String, ty: Type) {
        self.bindings.insert(var, ty);
    }

    /// Apply every binding, following chains until no bound variable
    /// remains.
    pub fn apply(&self, ty: &Type) -> Type {
        self.apply_bounded(ty, 0)
    }

    fn apply_bounded(&self, ty: &Type, depth: u32) -> Type {
        if depth > MAX_SUBSTITUTION_CHAIN {
            return ty.clone();
        }
        if !ty.is_generic() {
            if let Some(bound) = self.bindings.get(ty.name()) {
                let resolved = self.apply_bounded(bound, depth + 1);
                let nullable = resolved.is_nullable() || ty.is_nullable();
                return resolved.with_nullable(nullable);
            }
            return ty.clone();
        }
        let params = ty
            .parameters()
            .iter()
            .map(|p| self.apply_bounded(p, depth + 1))
            .collect();
        Type::generic(ty.name(), params).with_nullable(ty.is_nullable())
    }

    /// Fully resolved bindings as a flat map suitable for
    /// [`Type::substitute`].
    pub fn to_map(&self) -> FxHashMap<String, Type> {
        self.bindings
            .keys()
            .map(|var| (var.clone(), self.apply(&Type::named(var.clone()))))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Unifier {
    ground: FxHashSet<String>,
}

impl Default for Unifier {
    fn default() -> Self {
        Unifier::new()
    }
}

impl Unifier {
    /// Unifier whose ground names are the primitives.
    pub fn new() -> Self {
        Unifier {
            ground: PRIMITIVE_TYPE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Unifier that also treats the context's classes, interfaces and aliases
    /// as ground.
    pub fn with_context(context: &TypeContext) -> Self {
        let mut unifier = Unifier::new();
        unifier.ground.extend(context.classes.keys().cloned());
        unifier.ground.extend(context.interfaces.keys().cloned());
        unifier.ground.extend(context.type_aliases.keys().cloned());
        unifier
    }

    pub fn with_ground_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ground.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_variable(&self, ty: &Type) -> bool {
        !ty.is_generic() && !ty.is_literal() && !self.ground.contains(ty.name())
    }

    pub fn unify(&self, a: &Type, b: &Type) -> Result<Substitution, UnificationFailure> {
        let mut subst = Substitution::new();
        self.unify_into(a, b, &mut subst)?;
        Ok(subst)
    }

    /// Unify under an existing substitution, extending it in place.
    ///
    /// On failure the substitution may contain bindings made before the
    /// failing pair was reached.
    pub fn unify_into(
        &self,
        a: &Type,
        b: &Type,
        subst: &mut Substitution,
    ) -> Result<(), UnificationFailure> {
        let a = self.resolve_head(a, subst);
        let b = self.resolve_head(b, subst);

        if a == b {
            return Ok(());
        }
        if self.is_variable(&a) {
            if a.is_nullable() && !b.is_nullable() && self.is_variable(&b) {
                return self.bind_variable(&b, &a, subst);
            }
            return self.bind_variable(&a, &b, subst);
        }
        if self.is_variable(&b) {
            return self.bind_variable(&b, &a, subst);
        }
        if a.name() != b.name() {
            return Err(mismatch(&a, &b));
        }
        if a.parameters().len() != b.parameters().len() {
            return Err(UnificationFailure::ArityMismatch {
                name: a.name().to_string(),
                left: a.parameters().len(),
                right: b.parameters().len(),
            });
        }
        if a.is_nullable() != b.is_nullable() {
            return Err(mismatch(&a, &b));
        }
        for (pa, pb) in a.parameters().iter().zip(b.parameters()) {
            self.unify_into(pa, pb, subst)?;
        }
        Ok(())
    }

    /// Replace a bound variable at the head of `ty` by its binding.
    fn resolve_head(&self, ty: &Type, subst: &Substitution) -> Type {
        let mut current = ty.clone();
        for _ in 0..MAX_SUBSTITUTION_CHAIN {
            if !self.is_variable(&current) {
                break;
            }
            match subst.get(current.name()) {
                Some(bound) => {
                    let nullable = bound.is_nullable() || current.is_nullable();
                    current = bound.clone().with_nullable(nullable);
                }
                None => break,
            }
        }
        current
    }

    fn bind_variable(
        &self,
        var: &Type,
        ty: &Type,
        subst: &mut Substitution,
    ) -> Result<(), UnificationFailure> {
        // `T?` can only stand for a nullable type, and binds `T` to its
        // non-null form so that applying the substitution restores the flag.
        let binding = if var.is_nullable() {
            if !ty.is_nullable() {
                return Err(mismatch(var, ty));
            }
            ty.non_null()
        } else {
            ty.clone()
        };

        if binding.name() == var.name() && !binding.is_generic() {
            // `T` against `T?`: no binding makes both sides equal.
            return Err(mismatch(var, ty));
        }
        if subst.apply(&binding).mentions(var.name()) {
            trace!(var = var.name(), ty = %ty, "occurs check failed");
            return Err(UnificationFailure::OccursCheck {
                var: var.name().to_string(),
                ty: ty.clone(),
            });
        }
        trace!(var = var.name(), binding = %binding, "bind type variable");
        subst.bind(var.name().to_string(), binding);
        Ok(())
    }
}

fn mismatch(left: &Type, right: &Type) -> UnificationFailure {
    UnificationFailure::Mismatch {
        left: left.clone(),
        right: right.clone(),
    }
}

/// Unify with the primitive ground set.
pub fn unify(a: &Type, b: &Type) -> Result<Substitution, UnificationFailure> {
    Unifier::new().unify(a, b)
}

#[cfg(test)]
#[path = "../tests/unify_tests.rs"]
mod tests;
