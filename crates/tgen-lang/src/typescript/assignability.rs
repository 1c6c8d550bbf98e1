//! TypeScript assignability.
//!
//! Rules are tried in order; the first one that applies decides:
//!
//! - identical types, a top (`unknown`/`any`) target, an `any` source and a
//!   `never` source are always assignable; a `never` target accepts nothing
//!   else, and an `unknown` source reaches only top targets;
//! - under strict null checks a nullable source needs a target that accepts
//!   `null`; its non-null form is then compared;
//! - union source: every member must be assignable;
//! - union target: some member must accept the source;
//! - intersection target: every member must accept the source;
//! - intersection source: some member must be assignable;
//! - a literal source is compared through its widened base;
//! - functions: parameters contravariant, return covariant, fewer source
//!   parameters allowed, `void` return accepts any return;
//! - a tuple is assignable to an array of a common element supertype;
//! - everything else falls back to the structural rule.

use super::TypeScriptTypeSystem;
use super::widening::literal_base;
use tgen_solver::types;
use tgen_solver::{Type, TypeRelation, is_structurally_assignable};

pub(crate) fn is_assignable(ts: &TypeScriptTypeSystem, source: &Type, target: &Type) -> bool {
    if source == target {
        return true;
    }
    if target.is_top() || source.is_any() || source.is_never() {
        return true;
    }
    if target.is_never() || source.is_unknown() {
        return false;
    }

    if source.is_nullable() {
        if ts.strict_null_checks() && !accepts_null(target) {
            return false;
        }
        if is_null_or_undefined(source) {
            return true;
        }
        let target = if target.is_nullable() {
            target.non_null()
        } else {
            target.clone()
        };
        return ts.is_assignable(&source.non_null(), &target);
    }
    if target.is_nullable() {
        return ts.is_assignable(source, &target.non_null());
    }

    if source.is_union() {
        return source.parameters().iter().all(|m| ts.is_assignable(m, target));
    }
    if target.is_union() {
        return target.parameters().iter().any(|m| ts.is_assignable(source, m));
    }
    if target.is_intersection() {
        return target.parameters().iter().all(|m| ts.is_assignable(source, m));
    }
    if source.is_intersection() {
        return source.parameters().iter().any(|m| ts.is_assignable(m, target));
    }

    if let Some(base) = literal_base(source) {
        return ts.is_assignable(&base, target);
    }
    if source.is_function() && target.is_function() {
        return is_function_assignable(ts, source, target);
    }
    if source.is_tuple() {
        if let Some(element) = target.element_type() {
            return source.parameters().iter().all(|e| ts.is_assignable(e, element));
        }
    }
    if source.name() == types::UNDEFINED && target.name() == types::VOID {
        return true;
    }

    is_structurally_assignable(ts, source, target)
}

fn is_function_assignable(ts: &TypeScriptTypeSystem, source: &Type, target: &Type) -> bool {
    let source_params = source.function_params();
    let target_params = target.function_params();
    if source_params.len() > target_params.len() {
        return false;
    }
    let params_ok = source_params
        .iter()
        .zip(target_params)
        .all(|(s, t)| ts.is_assignable(t, s));
    if !params_ok {
        return false;
    }
    match (source.function_return(), target.function_return()) {
        (_, Some(ret)) if ret.name() == types::VOID && !ret.is_nullable() => true,
        (Some(s), Some(t)) => ts.is_assignable(s, t),
        _ => false,
    }
}

/// Whether `null` may be assigned to `target`.
pub(crate) fn accepts_null(target: &Type) -> bool {
    target.is_nullable()
        || target.is_top()
        || is_null_or_undefined(target)
        || (target.is_union() && target.parameters().iter().any(accepts_null))
}

fn is_null_or_undefined(ty: &Type) -> bool {
    !ty.is_generic() && matches!(ty.name(), types::NULL | types::UNDEFINED)
}

#[cfg(test)]
#[path = "../../tests/assignability_tests.rs"]
mod tests;
