//! GBNF grammar generation from JSON schemas.
//!
//! The output is a list of `name ::= body` rules with `root` first,
//! followed by rules for nested objects and arrays in discovery order and
//! finally the shared primitive rules that were referenced. Supported
//! schema forms:
//!
//! - `type`: `object`, `array`, `string`, `number`, `integer`, `boolean`,
//!   `null`, or a list of these
//! - `enum` and `const`
//! - `anyOf` / `oneOf`
//!
//! Object properties listed in `required` are emitted in declaration
//! order; when `required` is absent every property is required. Optional
//! properties are left out of the generated form.

use crate::error::ConstraintError;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::fmt::Write;

const PRIMITIVE_RULES: &[(&str, &str)] = &[
    ("ws", r"[ \t\n]*"),
    ("string", r#""\"" ( [^"\\] | "\\" ["\\/bfnrtu] )* "\"""#),
    ("number", r#""-"? [0-9]+ ("." [0-9]+)? ([eE] [-+]? [0-9]+)?"#),
    ("integer", r#""-"? [0-9]+"#),
    ("boolean", r#""true" | "false""#),
    ("null", r#""null""#),
];

#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: IndexMap<String, String>,
    primitives: IndexSet<&'static str>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        GrammarBuilder::default()
    }

    /// Grammar text for `schema`, rooted at `root`.
    pub fn build(mut self, schema: &Value) -> Result<String, ConstraintError> {
        // Reserve `root` so it is printed first.
        self.rules.insert("root".to_string(), String::new());
        let body = self.rule_body(schema, "root")?;
        self.rules.insert("root".to_string(), body);
        self.primitives.insert("ws");

        let mut out = String::new();
        for (name, body) in &self.rules {
            let _ = writeln!(out, "{name} ::= {body}");
        }
        for (name, body) in PRIMITIVE_RULES {
            if self.primitives.contains(name) {
                let _ = writeln!(out, "{name} ::= {body}");
            }
        }
        Ok(out)
    }

    fn rule_body(&mut self, schema: &Value, path: &str) -> Result<String, ConstraintError> {
        let Some(schema) = schema.as_object() else {
            return match schema {
                // `true` accepts any value; approximate with the primitives.
                Value::Bool(true) => Ok(self.any_value()),
                _ => Err(unsupported(path, "schema must be an object")),
            };
        };

        if let Some(value) = schema.get("const") {
            return Ok(json_literal(value));
        }
        if let Some(values) = schema.get("enum") {
            let values = values
                .as_array()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| unsupported(path, "`enum` must be a non-empty array"))?;
            return Ok(values.iter().map(json_literal).collect::<Vec<_>>().join(" | "));
        }
        for key in ["anyOf", "oneOf"] {
            if let Some(options) = schema.get(key) {
                let options = options
                    .as_array()
                    .filter(|o| !o.is_empty())
                    .ok_or_else(|| unsupported(path, "alternatives must be a non-empty array"))?;
                let mut alternatives = Vec::with_capacity(options.len());
                for (i, option) in options.iter().enumerate() {
                    alternatives.push(self.nested(option, &format!("{path}-{i}"))?);
                }
                return Ok(alternatives.join(" | "));
            }
        }

        match schema.get("type") {
            Some(Value::String(ty)) => self.typed_body(ty, schema, path),
            Some(Value::Array(types)) if !types.is_empty() => {
                let mut alternatives = Vec::with_capacity(types.len());
                for ty in types {
                    let ty = ty
                        .as_str()
                        .ok_or_else(|| unsupported(path, "`type` entries must be strings"))?;
                    alternatives.push(self.typed_body(ty, schema, path)?);
                }
                Ok(alternatives
                    .into_iter()
                    .map(|alt| format!("( {alt} )"))
                    .collect::<Vec<_>>()
                    .join(" | "))
            }
            Some(_) => Err(unsupported(path, "`type` must be a string or list")),
            None if schema.contains_key("properties") => self.typed_body("object", schema, path),
            None if schema.contains_key("items") => self.typed_body("array", schema, path),
            None => Ok(self.any_value()),
        }
    }

    fn typed_body(
        &mut self,
        ty: &str,
        schema: &serde_json::Map<String, Value>,
        path: &str,
    ) -> Result<String, ConstraintError> {
        match ty {
            "object" => self.object_body(schema, path),
            "array" => {
                let item = match schema.get("items") {
                    Some(items) => self.nested(items, &format!("{path}-item"))?,
                    None => self.any_value(),
                };
                // Repetition must apply to the whole alternation.
                let item = if item.contains('|') {
                    format!("( {item} )")
                } else {
                    item
                };
                Ok(format!(
                    r#""[" ws ( {item} ( ws "," ws {item} )* )? ws "]""#
                ))
            }
            "string" => Ok(self.primitive("string")),
            "number" => Ok(self.primitive("number")),
            "integer" => Ok(self.primitive("integer")),
            "boolean" => Ok(self.primitive("boolean")),
            "null" => Ok(self.primitive("null")),
            other => Err(unsupported(path, &format!("unknown type `{other}`"))),
        }
    }

    fn object_body(
        &mut self,
        schema: &serde_json::Map<String, Value>,
        path: &str,
    ) -> Result<String, ConstraintError> {
        let empty = serde_json::Map::new();
        let properties = match schema.get("properties") {
            Some(Value::Object(properties)) => properties,
            Some(_) => return Err(unsupported(path, "`properties` must be an object")),
            None => &empty,
        };
        let required: Option<Vec<&str>> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect());

        let mut fields = Vec::new();
        for (name, property) in properties {
            if required.as_ref().is_some_and(|r| !r.contains(&name.as_str())) {
                continue;
            }
            let value = self.nested(property, &format!("{path}-{name}"))?;
            let key = json_literal(&Value::String(name.clone()));
            fields.push(format!(r#"{key} ws ":" ws {value}"#));
        }
        if fields.is_empty() {
            return Ok(r#""{" ws "}""#.to_string());
        }
        Ok(format!(
            r#""{{" ws {} ws "}}""#,
            fields.join(r#" ws "," ws "#)
        ))
    }

    /// Reference to `schema`: primitives inline, composites as a named rule.
    fn nested(&mut self, schema: &Value, path: &str) -> Result<String, ConstraintError> {
        let body = self.rule_body(schema, path)?;
        if self.primitives.contains(body.as_str()) || !body.contains(' ') {
            return Ok(body);
        }
        let name = self.fresh_rule_name(path);
        self.rules.insert(name.clone(), body);
        Ok(name)
    }

    /// Sanitized name for `path`, suffixed with `-2`, `-3`, ... when an
    /// earlier rule already took it.
    fn fresh_rule_name(&self, path: &str) -> String {
        let base = rule_name(path);
        if !self.rules.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.rules.contains_key(candidate))
            .unwrap_or(base)
    }

    fn primitive(&mut self, name: &'static str) -> String {
        self.primitives.insert(name);
        self.primitives.insert("ws");
        name.to_string()
    }

    fn any_value(&mut self) -> String {
        ["string", "number", "boolean", "null"]
            .into_iter()
            .map(|p| self.primitive(p))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Grammar text for `schema`.
pub fn schema_to_grammar(schema: &Value) -> Result<String, ConstraintError> {
    GrammarBuilder::new().build(schema)
}

/// A JSON value rendered as a GBNF string terminal.
fn json_literal(value: &Value) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len() + 2);
    out.push('"');
    for c in json.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Rule names allow only `[a-z0-9-]`.
fn rule_name(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

fn unsupported(path: &str, reason: &str) -> ConstraintError {
    ConstraintError::UnsupportedSchema {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/grammar_tests.rs"]
mod tests;
