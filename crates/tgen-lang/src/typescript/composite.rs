//! Union and intersection normalization.
//!
//! Both operations flatten nested members, deduplicate, and apply the
//! identities of the top and bottom types:
//!
//! | operation    | `never`  | `unknown` | `any`    |
//! |--------------|----------|-----------|----------|
//! | union        | dropped  | absorbs   | absorbs  |
//! | intersection | absorbs  | dropped   | absorbs  |
//!
//! Unions additionally fold `null`/`undefined` members into the nullable
//! flag, drop literals whose base type is also a member (`"a" | string` is
//! `string`), and merge `true | false` into `boolean`.

use super::widening::literal_base;
use tgen_solver::Type;
use tgen_solver::types;

const PRIMITIVES: &[&str] = &[
    types::STRING,
    types::NUMBER,
    types::BOOLEAN,
    types::BIGINT,
    types::SYMBOL,
];

pub(crate) fn resolve_union(members: &[Type]) -> Type {
    let mut flat = Vec::with_capacity(members.len());
    flatten(members, types::UNION, &mut flat);

    let mut nullable = false;
    let mut first_nullish: Option<Type> = None;
    let mut out: Vec<Type> = Vec::with_capacity(flat.len());
    for member in flat {
        if member.is_any() {
            return Type::any();
        }
        if member.is_unknown() {
            return Type::unknown();
        }
        if member.is_never() {
            continue;
        }
        if !member.is_generic() && matches!(member.name(), types::NULL | types::UNDEFINED) {
            nullable = true;
            first_nullish.get_or_insert(member);
            continue;
        }
        nullable |= member.is_nullable();
        let member = member.non_null();
        if !out.contains(&member) {
            out.push(member);
        }
    }

    let has_true = out.iter().any(|m| m.name() == "true");
    let has_false = out.iter().any(|m| m.name() == "false");
    if has_true && has_false {
        out.retain(|m| m.name() != "true" && m.name() != "false");
        if !out.contains(&Type::boolean()) {
            out.push(Type::boolean());
        }
    }
    let bases: Vec<Type> = out.clone();
    out.retain(|m| match literal_base(m) {
        Some(base) => !bases.contains(&base),
        None => true,
    });

    match out.len() {
        0 => match first_nullish {
            Some(nullish) => nullish,
            None => Type::never(),
        },
        1 => out.remove(0).with_nullable(nullable),
        _ => Type::union(out).with_nullable(nullable),
    }
}

pub(crate) fn resolve_intersection(members: &[Type]) -> Type {
    let mut flat = Vec::with_capacity(members.len());
    flatten(members, types::INTERSECTION, &mut flat);

    let mut all_nullable = true;
    let mut out: Vec<Type> = Vec::with_capacity(flat.len());
    for member in flat {
        if member.is_never() {
            return Type::never();
        }
        if member.is_any() {
            return Type::any();
        }
        if member.is_unknown() {
            continue;
        }
        all_nullable &= member.is_nullable();
        let member = member.non_null();
        if !out.contains(&member) {
            out.push(member);
        }
    }

    // A literal refines its own base: `"a" & string` is `"a"`.
    let literals: Vec<Type> = out.iter().filter_map(literal_base).collect();
    out.retain(|m| !literals.contains(m));

    // Values cannot be of two distinct primitive types at once.
    let mut primitive = None;
    for member in &out {
        let base = literal_base(member).unwrap_or_else(|| member.clone());
        if PRIMITIVES.contains(&base.name()) || member.is_literal() {
            match &primitive {
                Some(seen) if seen != member => return Type::never(),
                _ => primitive = Some(member.clone()),
            }
        }
    }

    let nullable = all_nullable && !out.is_empty();
    match out.len() {
        0 => Type::unknown(),
        1 => out.remove(0).with_nullable(nullable),
        _ => Type::intersection(out).with_nullable(nullable),
    }
}

/// Collect `members`, splicing in the members of nested `kind` types.
fn flatten(members: &[Type], kind: &str, out: &mut Vec<Type>) {
    for member in members {
        if member.name() == kind && member.is_generic() {
            let start = out.len();
            flatten(member.parameters(), kind, out);
            if member.is_nullable() {
                for nested in &mut out[start..] {
                    *nested = nested.clone().as_nullable();
                }
            }
        } else {
            out.push(member.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/composite_tests.rs"]
mod tests;
