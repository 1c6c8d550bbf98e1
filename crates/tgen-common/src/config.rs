//! Host-supplied engine configuration.
//!
//! The engine reads no files or environment variables of its own; a host
//! builds an [`EngineConfig`] (directly or by deserializing one from its own
//! settings) and passes it to the components at construction time.

use crate::limits;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of constraint hierarchy levels that participate in mask evaluation.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LevelSet: u8 {
        const SYNTACTIC = 1 << 0;
        const TYPE = 1 << 1;
        const SEMANTIC = 1 << 2;
        const CONTEXTUAL = 1 << 3;
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        LevelSet::all()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of operations in an inhabitation path.
    pub max_search_depth: u32,
    /// Allowed complexity overshoot of intermediate types during search.
    pub complexity_slack: u32,
    /// Work budget for a single inhabitation query.
    pub max_expansions: u32,
    /// Capacity of the inference-result LRU (0 disables caching).
    pub inference_cache_capacity: usize,
    /// Capacity of the inhabitation-path LRU (0 disables caching).
    pub inhabitation_cache_capacity: usize,
    /// Levels whose constraints are evaluated; others are skipped.
    pub enabled_levels: LevelSet,
    /// Number of candidate expressions a type constraint considers.
    pub max_type_candidates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_search_depth: limits::DEFAULT_MAX_SEARCH_DEPTH,
            complexity_slack: limits::COMPLEXITY_SLACK,
            max_expansions: limits::MAX_SEARCH_EXPANSIONS,
            inference_cache_capacity: limits::DEFAULT_INFERENCE_CACHE_CAPACITY,
            inhabitation_cache_capacity: limits::DEFAULT_INHABITATION_CACHE_CAPACITY,
            enabled_levels: LevelSet::default(),
            max_type_candidates: limits::DEFAULT_MAX_TYPE_CANDIDATES,
        }
    }
}

impl EngineConfig {
    pub fn with_max_search_depth(mut self, depth: u32) -> Self {
        self.max_search_depth = depth;
        self
    }

    pub fn with_enabled_levels(mut self, levels: LevelSet) -> Self {
        self.enabled_levels = levels;
        self
    }

    /// Configuration with both caches disabled, for deterministic tests of
    /// uncached behavior.
    pub fn uncached() -> Self {
        EngineConfig {
            inference_cache_capacity: 0,
            inhabitation_cache_capacity: 0,
            ..EngineConfig::default()
        }
    }
}
