//! Token-level constraints.
//!
//! This crate turns generation state into token masks:
//!
//! - **Masks**: `TokenMask` with whitelist, blacklist and bias components
//!   and an associative merge
//! - **Constraints**: the `Constraint` trait, ranked by `ConstraintLevel`
//!   (syntactic, type, semantic, contextual)
//! - **Built-in kinds**: bracket/grammar, JSON schema, token pattern,
//!   type-directed, name-level and session-level constraints
//! - **Sets**: `ConstraintSet`, which evaluates constraints in a fixed
//!   precedence order and merges their masks
//!
//! The vocabulary is supplied by the host through the `Vocabulary` trait;
//! tokens are opaque ids.

pub mod constraint;
pub mod error;
pub mod grammar;
pub mod kinds;
pub mod mask;
pub mod set;
pub mod state;
pub mod vocab;

pub use constraint::{Constraint, ConstraintKind, ConstraintLevel};
pub use error::ConstraintError;
pub use grammar::{GrammarBuilder, schema_to_grammar};
pub use kinds::{
    ContextualConstraint, PatternConstraint, PatternMode, SchemaConstraint, SemanticConstraint,
    SyntacticConstraint, TypeConstraint,
};
pub use mask::{TokenId, TokenMask};
pub use set::ConstraintSet;
pub use state::GenerationState;
pub use vocab::{StaticVocabulary, Vocabulary};

#[cfg(test)]
#[path = "../tests/property_tests.rs"]
mod property_tests;
