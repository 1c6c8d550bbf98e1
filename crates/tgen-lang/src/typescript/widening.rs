//! Literal widening.

use super::composite::resolve_union;
use tgen_solver::Type;
use tgen_solver::types;

/// Primitive base of a literal type, keeping its nullability.
///
/// `"a"` and template literals widen to `string`, `42` to `number`, `42n` to
/// `bigint`, `true`/`false` to `boolean`.
pub(crate) fn literal_base(ty: &Type) -> Option<Type> {
    if !ty.is_literal() {
        return None;
    }
    let name = ty.name();
    let base = match name.chars().next()? {
        '"' | '\'' | '`' => types::STRING,
        _ if name == "true" || name == "false" => types::BOOLEAN,
        _ if name.ends_with('n') => types::BIGINT,
        _ => types::NUMBER,
    };
    Some(Type::named(base).with_nullable(ty.is_nullable()))
}

pub(crate) fn widen(ty: &Type) -> Type {
    if let Some(base) = literal_base(ty) {
        return base;
    }
    if ty.is_union() {
        let widened: Vec<Type> = ty.parameters().iter().map(widen).collect();
        let union = resolve_union(&widened);
        let nullable = union.is_nullable() || ty.is_nullable();
        return union.with_nullable(nullable);
    }
    ty.clone()
}
