//! TypeScript annotation parser.
//!
//! Annotations are parsed by recursive descent over the text, outermost
//! construct first:
//!
//! 1. arrow functions `(a: A, b?: B) => R` (the return type extends to the
//!    end, so this is tried before splitting unions);
//! 2. top-level unions `A | B` and intersections `A & B`;
//! 3. suffixes: nullable `T?` and arrays `T[]`;
//! 4. bracketed forms: `(T)`, tuples `[A, B]`, object literals `{ a: A }`;
//! 5. generic applications `Name<A, B>`;
//! 6. literal types, keywords and named types.
//!
//! All splitting is bracket-aware: separators inside `()`, `[]`, `{}`, `<>`
//! or string literals are ignored, and the `>` of `=>` never closes an angle
//! bracket.
//!
//! Malformed input yields `unknown`. During generation most annotations are
//! incomplete, so this is logged at trace level only.

use std::ops::ControlFlow;
use tgen_common::limits::MAX_ANNOTATION_DEPTH;
use tgen_solver::Type;
use tgen_solver::types;
use tracing::trace;

pub(crate) fn parse_annotation(text: &str) -> Type {
    match parse_type(text, 0) {
        Some(ty) => ty,
        None => {
            trace!(annotation = text, "malformed type annotation");
            Type::unknown()
        }
    }
}

fn parse_type(text: &str, depth: u32) -> Option<Type> {
    let text = text.trim();
    if text.is_empty() || depth > MAX_ANNOTATION_DEPTH {
        return None;
    }
    let depth = depth + 1;

    if let Some(rest) = text.strip_prefix("new ") {
        if let Some((params, ret)) = split_arrow(rest.trim_start()) {
            return parse_function(params, ret, depth);
        }
    }
    if let Some((params, ret)) = split_arrow(text) {
        return parse_function(params, ret, depth);
    }

    let members = split_operands(text, '|')?;
    if members.len() > 1 {
        return parse_union(&members, depth);
    }
    let members = split_operands(text, '&')?;
    if members.len() > 1 {
        let parsed = members
            .iter()
            .map(|m| parse_type(m, depth))
            .collect::<Option<Vec<_>>>()?;
        return Some(Type::intersection(parsed));
    }

    if let Some(rest) = text.strip_prefix("readonly ") {
        return parse_type(rest, depth);
    }
    if let Some(inner) = text.strip_suffix('?') {
        return parse_type(inner, depth).map(Type::as_nullable);
    }
    if text == "[]" {
        return Some(Type::tuple(Vec::new()));
    }
    if let Some(inner) = text.strip_suffix("[]") {
        if is_balanced(inner) {
            return parse_type(inner, depth).map(Type::array);
        }
    }

    match text.chars().next() {
        Some('(') if closing_index(text, 0) == Some(text.len() - 1) => {
            return parse_type(&text[1..text.len() - 1], depth);
        }
        Some('[') if closing_index(text, 0) == Some(text.len() - 1) => {
            return parse_tuple(&text[1..text.len() - 1], depth);
        }
        Some('{') if closing_index(text, 0) == Some(text.len() - 1) => {
            return parse_object(&text[1..text.len() - 1], depth);
        }
        _ => {}
    }

    if text.ends_with('>') {
        return parse_generic(text, depth);
    }
    parse_atom(text)
}

/// `(params) => ret`, optionally preceded by a type-parameter list.
fn split_arrow(text: &str) -> Option<(&str, &str)> {
    let text = if text.starts_with('<') {
        let close = closing_index(text, 0)?;
        text[close + 1..].trim_start()
    } else {
        text
    };
    if !text.starts_with('(') {
        return None;
    }
    let close = closing_index(text, 0)?;
    let ret = text[close + 1..].trim_start().strip_prefix("=>")?;
    Some((&text[1..close], ret))
}

fn parse_function(params: &str, ret: &str, depth: u32) -> Option<Type> {
    let mut param_types = Vec::new();
    for param in split_top_level(params, &[',']) {
        let param = param.trim();
        if param.is_empty() {
            // Trailing comma.
            continue;
        }
        let param = param.strip_prefix("...").unwrap_or(param);
        let ty = match split_first_colon(param) {
            Some((name, annotation)) => {
                let ty = parse_type(annotation, depth)?;
                if name.trim_end().ends_with('?') {
                    ty.as_nullable()
                } else {
                    ty
                }
            }
            None => Type::unknown(),
        };
        param_types.push(ty);
    }
    let ret = parse_type(ret, depth)?;
    Some(Type::function(param_types, ret))
}

fn parse_union(members: &[&str], depth: u32) -> Option<Type> {
    let mut nullable = false;
    let mut nullish = Vec::new();
    let mut rest = Vec::new();
    for member in members {
        let ty = parse_type(member, depth)?;
        if matches!(ty.name(), types::NULL | types::UNDEFINED) && !ty.is_generic() {
            nullable = true;
            nullish.push(ty);
        } else {
            rest.push(ty);
        }
    }
    let ty = match rest.len() {
        0 => return Some(Type::union(nullish).as_nullable()),
        1 => rest.remove(0),
        _ => Type::union(rest),
    };
    let nullable = nullable || ty.is_nullable();
    Some(ty.with_nullable(nullable))
}

fn parse_tuple(inner: &str, depth: u32) -> Option<Type> {
    let mut elements = Vec::new();
    for element in split_top_level(inner, &[',']) {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }
        let element = element.strip_prefix("...").unwrap_or(element);
        // Labeled elements: `[name: string, age?: number]`.
        let ty = match split_first_colon(element) {
            Some((label, annotation)) if is_identifier(label.trim().trim_end_matches('?')) => {
                let ty = parse_type(annotation, depth)?;
                if label.trim().ends_with('?') {
                    ty.as_nullable()
                } else {
                    ty
                }
            }
            _ => parse_type(element, depth)?,
        };
        elements.push(ty);
    }
    Some(Type::tuple(elements))
}

fn parse_object(inner: &str, depth: u32) -> Option<Type> {
    let mut properties = Vec::new();
    for member in split_top_level(inner, &[';', ',']) {
        let member = member.trim();
        if member.is_empty() {
            continue;
        }
        let member = member.strip_prefix("readonly ").unwrap_or(member);
        let (key, annotation) = split_first_colon(member)?;
        let key = key.trim();
        if key.starts_with('[') {
            // Index signatures carry no named property.
            continue;
        }
        let (name, ty) = match key.find('(') {
            // Method shorthand: `name(params): ret`.
            Some(paren) if key.ends_with(')') => {
                let params = &key[paren + 1..key.len() - 1];
                (&key[..paren], parse_function(params, annotation, depth)?)
            }
            _ => (key, parse_type(annotation, depth)?),
        };
        let (name, ty) = match name.trim().strip_suffix('?') {
            Some(name) => (name.trim(), ty.as_nullable()),
            None => (name.trim(), ty),
        };
        if !is_identifier(name) && !is_quoted(name) {
            return None;
        }
        properties.push((
            name.trim_matches(|c: char| c == '"' || c == '\'').to_string(),
            ty,
        ));
    }
    Some(Type::object_with_properties(properties))
}

fn parse_generic(text: &str, depth: u32) -> Option<Type> {
    let open = top_level_position(text, '<')?;
    if closing_index(text, open) != Some(text.len() - 1) {
        return None;
    }
    let name = text[..open].trim();
    if !is_identifier(name) {
        return None;
    }
    let args = split_top_level(&text[open + 1..text.len() - 1], &[','])
        .into_iter()
        .map(|arg| parse_type(arg, depth))
        .collect::<Option<Vec<_>>>()?;
    if args.is_empty() {
        return None;
    }
    match name {
        types::ARRAY | "ReadonlyArray" if args.len() == 1 => {
            args.into_iter().next().map(Type::array)
        }
        _ => Some(Type::generic(name, args)),
    }
}

fn parse_atom(text: &str) -> Option<Type> {
    match text {
        types::NULL => return Some(Type::null()),
        types::UNDEFINED => return Some(Type::undefined()),
        types::OBJECT => return Some(Type::object()),
        _ => {}
    }
    if is_quoted(text) || is_numeric_literal(text) {
        return Some(Type::named(text));
    }
    if is_identifier(text) {
        return Some(Type::named(text));
    }
    None
}

// =============================================================================
// Lexical helpers
// =============================================================================

/// Visit every character outside string literals along with the bracket
/// depth in effect before it.
fn scan<F>(text: &str, mut visit: F)
where
    F: FnMut(usize, char, u32) -> ControlFlow<()>,
{
    let mut depth: u32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if matches!(c, '"' | '\'' | '`') {
            quote = Some(c);
            continue;
        }
        if c == '=' && matches!(chars.peek(), Some((_, '>'))) {
            chars.next();
            if visit(i, c, depth).is_break() {
                return;
            }
            continue;
        }
        let before = depth;
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if visit(i, c, before).is_break() {
            return;
        }
    }
}

/// Index of the bracket closing the one at `open`.
fn closing_index(text: &str, open: usize) -> Option<usize> {
    let mut open_depth = None;
    let mut found = None;
    scan(text, |i, c, before| {
        if i == open {
            open_depth = Some(before);
        } else if let Some(d) = open_depth {
            if i > open && matches!(c, ')' | ']' | '}' | '>') && before == d + 1 {
                found = Some(i);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    });
    found
}

fn top_level_position(text: &str, target: char) -> Option<usize> {
    let mut found = None;
    scan(text, |i, c, before| {
        if c == target && before == 0 {
            found = Some(i);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    found
}

fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan(text, |i, c, before| {
        if before == 0 && separators.contains(&c) {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
        ControlFlow::Continue(())
    });
    parts.push(&text[start..]);
    parts
}

/// Operands of a top-level `|` or `&`. A single leading separator is allowed
/// (`| A | B`); any other empty operand makes the text malformed.
fn split_operands(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut parts = split_top_level(text, &[separator]);
    if parts.len() > 1 && parts[0].trim().is_empty() {
        parts.remove(0);
    }
    if parts.len() > 1 && parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }
    Some(parts)
}

fn split_first_colon(text: &str) -> Option<(&str, &str)> {
    let colon = top_level_position(text, ':')?;
    Some((&text[..colon], &text[colon + 1..]))
}

fn is_balanced(text: &str) -> bool {
    let mut depth_at_end = 0;
    let mut went_negative = false;
    scan(text, |_, c, before| {
        if matches!(c, ')' | ']' | '}' | '>') && before == 0 {
            went_negative = true;
        }
        depth_at_end = match c {
            '(' | '[' | '{' | '<' => before + 1,
            ')' | ']' | '}' | '>' => before.saturating_sub(1),
            _ => before,
        };
        ControlFlow::Continue(())
    });
    !text.trim().is_empty() && !went_negative && depth_at_end == 0
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

fn is_quoted(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) => open == close && matches!(open, '"' | '\'' | '`'),
        _ => false,
    }
}

fn is_numeric_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let digits = digits.strip_suffix('n').unwrap_or(digits);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && (digits.parse::<f64>().is_ok() || is_radix_literal(digits))
}

fn is_radix_literal(text: &str) -> bool {
    let (digits, radix) = match text.get(..2) {
        Some("0x" | "0X") => (&text[2..], 16),
        Some("0o" | "0O") => (&text[2..], 8),
        Some("0b" | "0B") => (&text[2..], 2),
        _ => return false,
    };
    !digits.is_empty() && u64::from_str_radix(&digits.replace('_', ""), radix).is_ok()
}

#[cfg(test)]
#[path = "../../tests/parser_tests.rs"]
mod tests;
