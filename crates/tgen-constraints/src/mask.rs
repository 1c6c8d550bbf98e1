//! Token masks.
//!
//! A [`TokenMask`] describes which vocabulary tokens may be sampled next.
//! It has three optional components:
//!
//! - `allowed`: a whitelist; `None` means every token
//! - `forbidden`: a blacklist; `None` means no token
//! - `bias`: additive logit adjustments for individual tokens
//!
//! Masks from several constraints are combined with [`TokenMask::merge`],
//! which intersects whitelists (an absent whitelist being the universal
//! set), unions blacklists and overlays biases with the right operand
//! winning. All three are associative, so a fold over any grouping of the
//! same sequence of masks gives the same result.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque vocabulary index.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TokenId(pub u32);

impl TokenId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The id at vocabulary position `index`, if it fits in a token id.
    pub fn from_index(index: usize) -> Option<TokenId> {
        u32::try_from(index).ok().map(TokenId)
    }
}

impl From<u32> for TokenId {
    fn from(id: u32) -> Self {
        TokenId(id)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenMask {
    pub allowed: Option<FxHashSet<TokenId>>,
    pub forbidden: Option<FxHashSet<TokenId>>,
    pub bias: Option<FxHashMap<TokenId, f32>>,
}

impl TokenMask {
    /// The mask that constrains nothing.
    pub fn permissive() -> Self {
        TokenMask::default()
    }

    /// Only `tokens` are legal.
    pub fn allow_only<I: IntoIterator<Item = TokenId>>(tokens: I) -> Self {
        TokenMask {
            allowed: Some(tokens.into_iter().collect()),
            ..TokenMask::default()
        }
    }

    /// Every token except `tokens` is legal.
    pub fn forbid<I: IntoIterator<Item = TokenId>>(tokens: I) -> Self {
        TokenMask {
            forbidden: Some(tokens.into_iter().collect()),
            ..TokenMask::default()
        }
    }

    pub fn with_bias(mut self, token: TokenId, bias: f32) -> Self {
        self.bias.get_or_insert_with(FxHashMap::default).insert(token, bias);
        self
    }

    /// Whether this mask has no effect at all.
    pub fn is_permissive(&self) -> bool {
        self.allowed.is_none()
            && self.forbidden.as_ref().is_none_or(FxHashSet::is_empty)
            && self.bias.as_ref().is_none_or(FxHashMap::is_empty)
    }

    pub fn is_legal(&self, token: TokenId) -> bool {
        if self.forbidden.as_ref().is_some_and(|f| f.contains(&token)) {
            return false;
        }
        self.allowed.as_ref().is_none_or(|a| a.contains(&token))
    }

    /// Bias for `token`, 0 when none is set.
    pub fn bias_for(&self, token: TokenId) -> f32 {
        self.bias
            .as_ref()
            .and_then(|b| b.get(&token).copied())
            .unwrap_or(0.0)
    }

    /// Legal tokens among the first `vocab_size` ids, in id order.
    pub fn legal_tokens(&self, vocab_size: usize) -> impl Iterator<Item = TokenId> + '_ {
        (0..vocab_size)
            .map_while(TokenId::from_index)
            .filter(move |token| self.is_legal(*token))
    }

    /// Combine two masks; `other` is applied after `self`.
    pub fn merge(&self, other: &TokenMask) -> TokenMask {
        let mut merged = self.clone();
        merged.merge_in(other);
        merged
    }

    /// In-place form of [`merge`](Self::merge).
    pub fn merge_in(&mut self, other: &TokenMask) {
        self.allowed = match (self.allowed.take(), &other.allowed) {
            (None, None) => None,
            (Some(mine), None) => Some(mine),
            (None, Some(theirs)) => Some(theirs.clone()),
            (Some(mine), Some(theirs)) => Some(mine.intersection(theirs).copied().collect()),
        };
        if let Some(theirs) = &other.forbidden {
            self.forbidden
                .get_or_insert_with(FxHashSet::default)
                .extend(theirs.iter().copied());
        }
        if let Some(theirs) = &other.bias {
            self.bias
                .get_or_insert_with(FxHashMap::default)
                .extend(theirs.iter().map(|(token, bias)| (*token, *bias)));
        }
    }
}

#[cfg(test)]
#[path = "../tests/mask_tests.rs"]
mod tests;
