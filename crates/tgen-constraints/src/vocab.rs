//! Vocabulary access.
//!
//! Tokens are opaque ids; constraints that reason about token text ask the
//! host's [`Vocabulary`] for it.

use crate::mask::TokenId;
use rustc_hash::FxHashMap;

pub trait Vocabulary: Send + Sync {
    /// Number of tokens. Ids are `0..len`.
    fn len(&self) -> usize;

    /// Decoded text of `token`, `None` for ids outside the vocabulary or
    /// tokens without a text form (control tokens).
    fn text(&self, token: TokenId) -> Option<&str>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every `(id, text)` pair of a vocabulary, in id order. Positions past
/// the largest token id are not addressable and end the walk.
pub fn tokens(vocab: &dyn Vocabulary) -> impl Iterator<Item = (TokenId, &str)> {
    (0..vocab.len())
        .map_while(TokenId::from_index)
        .filter_map(move |token| vocab.text(token).map(|text| (token, text)))
}

/// In-memory vocabulary backed by a list of token strings.
#[derive(Clone, Debug, Default)]
pub struct StaticVocabulary {
    texts: Vec<String>,
    ids: FxHashMap<String, TokenId>,
}

impl StaticVocabulary {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        let mut ids = FxHashMap::default();
        for (index, text) in texts.iter().enumerate() {
            let Some(id) = TokenId::from_index(index) else {
                break;
            };
            // First occurrence wins for duplicate texts.
            ids.entry(text.clone()).or_insert(id);
        }
        StaticVocabulary { texts, ids }
    }

    /// Id of the token whose text is exactly `text`.
    pub fn id(&self, text: &str) -> Option<TokenId> {
        self.ids.get(text).copied()
    }
}

impl Vocabulary for StaticVocabulary {
    fn len(&self) -> usize {
        self.texts.len()
    }

    fn text(&self, token: TokenId) -> Option<&str> {
        self.texts.get(token.index()).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../tests/vocab_tests.rs"]
mod tests;
