//! tgen: type-directed constraints for code generation.
//!
//! The workspace crates, re-exported here:
//!
//! - `tgen-common`: configuration, limits, languages and diagnostics
//! - `tgen-solver`: the type model, inference, unification and
//!   inhabitation search
//! - `tgen-lang`: per-language type systems (TypeScript)
//! - `tgen-constraints`: token masks and the constraint hierarchy
//!
//! [`Engine`] wires them together with shared caches.

pub mod engine;
pub mod error;
pub mod tracing_config;

pub use engine::Engine;
pub use error::EngineError;

pub use tgen_common::{Diagnostic, EngineConfig, Language, LevelSet};
pub use tgen_constraints::{
    Constraint, ConstraintError, ConstraintKind, ConstraintLevel, ConstraintSet,
    ContextualConstraint, GenerationState, PatternConstraint, PatternMode, SchemaConstraint,
    SemanticConstraint, StaticVocabulary, SyntacticConstraint, TokenId, TokenMask,
    TypeConstraint, Vocabulary,
};
pub use tgen_lang::{LanguageRegistry, TypeScriptTypeSystem, TypeSystem, TypeSystemError};
pub use tgen_solver::{
    CacheStats, ClassType, Expr, FunctionSignature, InferenceEngine, Inferred,
    InhabitationSolver, InterfaceType, Path, Type, TypeContext, TypeParameter, TypeRelation,
    TypeVariable, UnificationFailure,
};
