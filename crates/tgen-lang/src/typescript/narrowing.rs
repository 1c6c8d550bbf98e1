//! Control-flow narrowing by type guards.
//!
//! A guard is the source text of a condition. Recognized forms:
//!
//! - `typeof x === "tag"` (and `==`, `!==`, `!=`)
//! - `x instanceof C`
//! - `x === null`, `x != undefined`, ...
//! - `Array.isArray(x)`, `!Array.isArray(x)`
//! - truthiness: `x`, `!x`, `!!x`
//! - `!( guard )` negates any of the above
//!
//! Anything else falls back to keeping the union members the guard
//! mentions by name, and otherwise leaves the type unchanged.
//!
//! The nullable flag conflates `null` and `undefined`, so null guards
//! narrow both at once.

use super::composite::resolve_union;
use super::widening::literal_base;
use once_cell::sync::Lazy;
use regex::Regex;
use tgen_solver::Type;
use tgen_solver::types;
use tracing::trace;

static TYPEOF_GUARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^typeof\s+[\w$.]+\s*(===|==|!==|!=)\s*["'](\w+)["']$"#)
        .expect("typeof guard regex")
});
static INSTANCEOF_GUARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w$.]+\s+instanceof\s+([\w$.]+)$").expect("instanceof guard regex")
});
static NULL_GUARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w$.]+\s*(===|==|!==|!=)\s*(null|undefined)$").expect("null guard regex")
});
static IS_ARRAY_GUARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(!?)\s*Array\.isArray\(\s*[\w$.]+\s*\)$").expect("isArray guard regex")
});
static TRUTHY_GUARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(!*)\s*[\w$.]+$").expect("truthiness guard regex"));

pub(crate) fn narrow(ty: &Type, guard: &str) -> Type {
    let (negated, guard) = strip_negation(guard.trim());

    if let Some(caps) = TYPEOF_GUARD.captures(guard) {
        let positive = caps[1].starts_with('=') != negated;
        return by_typeof(ty, &caps[2], positive);
    }
    if let Some(caps) = INSTANCEOF_GUARD.captures(guard) {
        return by_instanceof(ty, &caps[1], !negated);
    }
    if let Some(caps) = NULL_GUARD.captures(guard) {
        let positive = caps[1].starts_with('=') != negated;
        return by_null_check(ty, &caps[1], &caps[2], positive);
    }
    if let Some(caps) = IS_ARRAY_GUARD.captures(guard) {
        let positive = caps[1].is_empty() != negated;
        return by_array_check(ty, positive);
    }
    if let Some(caps) = TRUTHY_GUARD.captures(guard) {
        let falsy = (caps[1].len() % 2 == 1) != negated;
        return by_truthiness(ty, !falsy);
    }

    match by_mention(ty, guard) {
        Some(narrowed) if !negated => narrowed,
        _ => {
            trace!(guard, "guard does not narrow");
            ty.clone()
        }
    }
}

/// `!( inner )` becomes `(true, inner)`; redundant outer parentheses are
/// removed either way.
fn strip_negation(guard: &str) -> (bool, &str) {
    let mut negated = false;
    let mut guard = guard;
    loop {
        if let Some(inner) = strip_parens(guard) {
            guard = inner;
            continue;
        }
        if let Some(rest) = guard.strip_prefix('!') {
            if let Some(inner) = strip_parens(rest.trim_start()) {
                negated = !negated;
                guard = inner;
                continue;
            }
        }
        return (negated, guard);
    }
}

fn strip_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner.trim())
}

/// Members of `ty` with nullability made explicit as a `null` member.
fn members(ty: &Type) -> Vec<Type> {
    let mut out: Vec<Type> = if ty.is_union() {
        ty.parameters().iter().map(Type::non_null).collect()
    } else {
        vec![ty.non_null()]
    };
    if ty.is_nullable() {
        out.push(Type::null());
    }
    out
}

fn rebuild(kept: Vec<Type>) -> Type {
    if kept.is_empty() {
        Type::never()
    } else {
        resolve_union(&kept)
    }
}

fn is_null_member(ty: &Type) -> bool {
    !ty.is_generic() && matches!(ty.name(), types::NULL | types::UNDEFINED | types::VOID)
}

fn by_typeof(ty: &Type, tag: &str, positive: bool) -> Type {
    if ty.is_top() {
        return if positive {
            typeof_type(tag).unwrap_or_else(|| ty.clone())
        } else {
            ty.clone()
        };
    }
    let kept = members(ty)
        .into_iter()
        .filter(|m| typeof_matches(m, tag) == positive)
        .collect();
    rebuild(kept)
}

/// The type a `typeof` tag proves for a value of unknown type.
fn typeof_type(tag: &str) -> Option<Type> {
    match tag {
        "string" | "number" | "boolean" | "bigint" | "symbol" => Some(Type::named(tag)),
        "undefined" => Some(Type::undefined()),
        "function" => Some(Type::function(Vec::new(), Type::unknown())),
        "object" => Some(Type::object().as_nullable()),
        _ => None,
    }
}

fn typeof_matches(member: &Type, tag: &str) -> bool {
    let base = literal_base(member).unwrap_or_else(|| member.clone());
    match tag {
        "string" | "number" | "boolean" | "bigint" | "symbol" => base.name() == tag,
        "undefined" => matches!(member.name(), types::UNDEFINED | types::VOID),
        "function" => member.is_function(),
        "object" => {
            member.name() == types::NULL
                || !(member.is_function()
                    || member.is_literal()
                    || is_null_member(member)
                    || matches!(
                        base.name(),
                        types::STRING | types::NUMBER | types::BOOLEAN | types::BIGINT | types::SYMBOL
                    ))
        }
        _ => false,
    }
}

fn by_instanceof(ty: &Type, class: &str, positive: bool) -> Type {
    if ty.is_top() {
        return if positive {
            Type::named(class)
        } else {
            ty.clone()
        };
    }
    let all = members(ty);
    let (matching, rest): (Vec<Type>, Vec<Type>) =
        all.into_iter().partition(|m| m.name() == class);
    if !positive {
        return rebuild(rest);
    }
    if !matching.is_empty() {
        return rebuild(matching);
    }
    // A subclass instance may hide behind any object-like member.
    if rest.iter().any(|m| typeof_matches(m, "object") && !is_null_member(m)) {
        Type::named(class)
    } else {
        Type::never()
    }
}

fn by_null_check(ty: &Type, op: &str, keyword: &str, positive: bool) -> Type {
    if !positive {
        let kept = members(ty)
            .into_iter()
            .filter(|m| !is_null_member(m))
            .collect();
        return rebuild(kept);
    }
    let proven = match (op.len(), keyword) {
        (3, types::UNDEFINED) => Type::undefined(),
        _ => Type::null(),
    };
    if ty.is_top() || members(ty).iter().any(is_null_member) {
        proven
    } else {
        Type::never()
    }
}

fn by_array_check(ty: &Type, positive: bool) -> Type {
    if ty.is_top() {
        return if positive {
            Type::array(Type::unknown())
        } else {
            ty.clone()
        };
    }
    let kept = members(ty)
        .into_iter()
        .filter(|m| (m.is_array() || m.is_tuple()) == positive)
        .collect();
    rebuild(kept)
}

/// `truthy` removes `null`/`undefined`; a falsy check keeps only members
/// that can be falsy.
fn by_truthiness(ty: &Type, truthy: bool) -> Type {
    if ty.is_top() {
        return ty.clone();
    }
    let kept = if truthy {
        members(ty)
            .into_iter()
            .filter(|m| !is_null_member(m))
            .collect()
    } else {
        members(ty).into_iter().filter(can_be_falsy).collect()
    };
    rebuild(kept)
}

fn can_be_falsy(member: &Type) -> bool {
    if is_null_member(member) {
        return true;
    }
    if member.is_literal() {
        return matches!(
            member.name(),
            "false" | "0" | "-0" | "0n" | "\"\"" | "''" | "``"
        );
    }
    matches!(
        member.name(),
        types::STRING | types::NUMBER | types::BOOLEAN | types::BIGINT
    )
}

/// Union members named in the guard, matched on identifier boundaries.
fn by_mention(ty: &Type, guard: &str) -> Option<Type> {
    if !ty.is_union() {
        return None;
    }
    let kept: Vec<Type> = ty
        .parameters()
        .iter()
        .filter(|m| mentions_word(guard, m.name()))
        .cloned()
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(resolve_union(&kept))
    }
}

fn mentions_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
#[path = "../../tests/narrowing_tests.rs"]
mod tests;
