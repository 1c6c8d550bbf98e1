//! Per-step generation state.

use indexmap::IndexMap;
use std::sync::Arc;
use tgen_common::Language;
use tgen_solver::{Expr, Type, TypeContext};

/// Snapshot handed to every constraint at one generation step.
///
/// Constraints only read it; the generation loop builds a new state (or
/// updates its own copy) between steps. The typing context is shared
/// behind an `Arc` because it is the same for every step of a session.
#[derive(Clone, Debug)]
pub struct GenerationState {
    /// Text generated so far.
    pub text: String,
    pub context: Arc<TypeContext>,
    /// Byte offset of the insertion point in `text`.
    pub cursor: usize,
    /// Number of tokens generated so far.
    pub token_count: usize,
    pub language: Language,
    /// Type required at the cursor, when the host knows it.
    pub expected_type: Option<Type>,
    /// Expression before a member-access dot at the cursor.
    pub receiver: Option<Expr>,
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl GenerationState {
    /// State positioned at the end of `text`.
    pub fn new(text: impl Into<String>, context: Arc<TypeContext>) -> Self {
        let text = text.into();
        GenerationState {
            cursor: text.len(),
            language: context.language,
            text,
            context,
            token_count: 0,
            expected_type: None,
            receiver: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_token_count(mut self, count: usize) -> Self {
        self.token_count = count;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_expected_type(mut self, ty: Type) -> Self {
        self.expected_type = Some(ty);
        self
    }

    pub fn with_receiver(mut self, receiver: Expr) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Text before the cursor. A cursor past the end or inside a UTF-8
    /// sequence is clamped down to the nearest boundary.
    pub fn prefix(&self) -> &str {
        let mut end = self.cursor.min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        &self.text[..end]
    }

    /// Identifier characters immediately before the cursor.
    pub fn current_word(&self) -> &str {
        let prefix = self.prefix();
        let start = prefix
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_identifier_char(*c))
            .last()
            .map_or(prefix.len(), |(i, _)| i);
        &prefix[start..]
    }

    /// Whether the cursor is in the member name after `receiver.`.
    pub fn after_member_dot(&self) -> bool {
        let prefix = self.prefix();
        let before_word = &prefix[..prefix.len() - self.current_word().len()];
        before_word.ends_with('.') && !before_word.ends_with("..")
    }
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod tests;
