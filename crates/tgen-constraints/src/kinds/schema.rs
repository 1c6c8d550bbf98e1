use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel, clamp_weight, content_hash};
use crate::error::ConstraintError;
use crate::grammar::schema_to_grammar;
use crate::mask::TokenMask;
use crate::state::GenerationState;
use crate::vocab::{self, Vocabulary};
use serde_json::Value;

/// Structured output following a JSON schema.
///
/// The full structure is expressed as a GBNF grammar through `to_grammar`.
/// The mask itself only pins down how the document opens: before any
/// non-whitespace output, tokens must start with a character the schema's
/// root can start with (`{` for objects, `[` for arrays, and so on).
#[derive(Clone, Debug)]
pub struct SchemaConstraint {
    schema: Value,
    grammar: String,
    weight: f32,
}

impl SchemaConstraint {
    pub fn new(schema: Value) -> Result<Self, ConstraintError> {
        let grammar = schema_to_grammar(&schema)?;
        Ok(SchemaConstraint {
            schema,
            grammar,
            weight: 1.0,
        })
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl Constraint for SchemaConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Schema
    }

    fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Syntactic
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        if self.weight <= 0.0 || !state.prefix().trim().is_empty() {
            return TokenMask::permissive();
        }
        let Some(starts) = first_chars(&self.schema) else {
            return TokenMask::permissive();
        };
        TokenMask::allow_only(
            vocab::tokens(vocab)
                .filter(|(_, text)| match text.trim_start().chars().next() {
                    None => true,
                    Some(c) => starts.contains(&c),
                })
                .map(|(token, _)| token),
        )
    }

    fn to_grammar(&self) -> Option<String> {
        Some(self.grammar.clone())
    }

    fn cache_key(&self) -> u64 {
        content_hash(
            &self.kind(),
            self.level(),
            &(self.schema.to_string(), self.weight.to_bits()),
        )
    }
}

/// Characters a JSON value of `schema` can start with; `None` when any.
fn first_chars(schema: &Value) -> Option<Vec<char>> {
    let schema = schema.as_object()?;
    if let Some(value) = schema.get("const") {
        return value.to_string().chars().next().map(|c| vec![c]);
    }
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return Some(
            values
                .iter()
                .filter_map(|v| v.to_string().chars().next())
                .collect(),
        );
    }
    for key in ["anyOf", "oneOf"] {
        if let Some(options) = schema.get(key).and_then(Value::as_array) {
            let mut chars = Vec::new();
            for option in options {
                chars.extend(first_chars(option)?);
            }
            return Some(chars);
        }
    }
    let types: Vec<&str> = match schema.get("type") {
        Some(Value::String(ty)) => vec![ty.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ if schema.contains_key("properties") => vec!["object"],
        _ => return None,
    };
    let mut chars = Vec::new();
    for ty in types {
        match ty {
            "object" => chars.push('{'),
            "array" => chars.push('['),
            "string" => chars.push('"'),
            "number" | "integer" => {
                chars.push('-');
                chars.extend('0'..='9');
            }
            "boolean" => chars.extend(['t', 'f']),
            "null" => chars.push('n'),
            _ => return None,
        }
    }
    Some(chars)
}
