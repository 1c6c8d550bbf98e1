//! Centralized limits and thresholds for the constraint engine.
//!
//! Every recursive or memoizing component reads its bounds from here (or from
//! [`EngineConfig`](crate::config::EngineConfig), whose defaults are these
//! constants) so that tuning happens in one place.
//!
//! # Categories
//!
//! - **Search bounds**: depth and work limits for the inhabitation search
//! - **Recursion depths**: stack guards for inference and annotation parsing
//! - **Capacity limits**: default sizes for the LRU caches
//! - **Confidence values**: fixed confidences attached to inference results

// =============================================================================
// Search Bounds
// =============================================================================

/// Default maximum number of operations in an inhabitation path.
///
/// The search descends one level per operation, so a path such as
/// `wrap(user.profile.name)` (use, field, field, apply) needs depth 4.
pub const DEFAULT_MAX_SEARCH_DEPTH: u32 = 5;

/// How much more complex than the target an intermediate type may become
/// before the branch is pruned.
///
/// Complexity is `1 + sum(complexity(param))`, so `Array<Array<number>>` has
/// complexity 3. With a `number` target (complexity 1) the search will still
/// walk through `Map<string, Array<number>>` (complexity 4) but not through
/// anything deeper.
pub const COMPLEXITY_SLACK: u32 = 3;

/// Maximum number of search nodes expanded by a single `find_paths` call.
///
/// Depth alone bounds termination, but a context with hundreds of variables
/// and functions makes the fan-out at each level large. When the budget runs
/// out the search returns whatever it found so far.
pub const MAX_SEARCH_EXPANSIONS: u32 = 10_000;

/// Default number of candidate expressions a type constraint asks the
/// inhabitation solver for.
pub const DEFAULT_MAX_TYPE_CANDIDATES: usize = 8;

// =============================================================================
// Recursion Depths
// =============================================================================

/// Maximum expression nesting the inference engine will descend into.
///
/// Deeper expressions are reported as `unknown` at confidence 0.
pub const MAX_INFER_DEPTH: u32 = 256;

/// Maximum nesting of brackets inside a type annotation.
pub const MAX_ANNOTATION_DEPTH: u32 = 64;

/// Maximum number of variable-to-variable hops followed when applying a
/// substitution.
pub const MAX_SUBSTITUTION_CHAIN: u32 = 128;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Default capacity of the inference-result cache.
pub const DEFAULT_INFERENCE_CACHE_CAPACITY: usize = 4_096;

/// Default capacity of the inhabitation-path cache.
pub const DEFAULT_INHABITATION_CACHE_CAPACITY: usize = 1_024;

// =============================================================================
// Confidence Values
// =============================================================================

/// Confidence of a fully determined inference result.
pub const CONFIDENCE_CERTAIN: f32 = 1.0;

/// Confidence attached to `Array<unknown>` inferred from `[]`.
pub const CONFIDENCE_EMPTY_ARRAY: f32 = 0.5;

/// Confidence of an unresolved result.
pub const CONFIDENCE_NONE: f32 = 0.0;
