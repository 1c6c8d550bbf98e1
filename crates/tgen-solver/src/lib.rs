//! Type-Directed Solver
//!
//! This crate implements the type machinery behind token-level constraints:
//!
//! - **Type model**: an immutable universal `Type` plus signatures, classes,
//!   interfaces and the `TypeContext` symbol environment
//! - **Inference**: forward synthesis and backward checking over a closed
//!   `Expr` tree, with structural assignability
//! - **Unification**: substitution-producing structural unification with an
//!   occurs check
//! - **Inhabitation**: a bounded, memoized search for expressions of a
//!   required type
//!
//! Language plugins hook in through the [`TypeRelation`] trait; everything
//! here defaults to the language-neutral structural rule.
pub mod cache;
pub mod context;
pub mod expr;
mod format;
pub mod infer;
pub mod inhabit;
pub mod subtype;
pub mod types;
pub mod unify;

pub use cache::{CacheStats, LruCache, SharedCache};
pub use context::{Member, TypeContext};
pub use expr::{Expr, FunctionParam, Literal};
pub use infer::{InferenceCache, InferenceEngine, Inferred};
pub use inhabit::{InhabitationSolver, Operation, OperationKind, Path, PathCache, PathKey};
pub use subtype::{StructuralRelation, TypeRelation, is_assignable, is_structurally_assignable};
pub use types::{
    ClassType, FunctionSignature, InterfaceType, Type, TypeParameter, TypeVariable,
};
pub use unify::{Substitution, UnificationFailure, Unifier, unify};

#[cfg(test)]
#[path = "../tests/property_tests.rs"]
mod property_tests;
