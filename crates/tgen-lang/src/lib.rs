//! Language type-system plugins.
//!
//! A plugin maps one target language onto the universal [`Type`] model:
//! it parses textual annotations, decides assignability under the
//! language's rules, and implements the language's widening, narrowing,
//! union/intersection normalization and generic instantiation.
//!
//! Every plugin is also a [`TypeRelation`], so the solver's inference engine
//! and inhabitation search can run under the plugin's subtyping rules.
//!
//! TypeScript is the exemplar; [`LanguageRegistry`] reports the remaining
//! languages as unsupported instead of silently falling back.

pub mod error;
pub mod registry;
pub mod typescript;

pub use error::TypeSystemError;
pub use registry::LanguageRegistry;
pub use typescript::TypeScriptTypeSystem;

use tgen_common::Language;
use tgen_solver::{Type, TypeRelation};

pub trait TypeSystem: TypeRelation {
    fn language(&self) -> Language;

    /// Parse a textual annotation. Malformed text yields `unknown`.
    fn parse(&self, annotation: &str) -> Type;

    /// Map a literal type to its primitive base; other types are unchanged.
    fn widen(&self, ty: &Type) -> Type;

    /// Refine `ty` under the condition `guard` (source text of a type guard).
    fn narrow(&self, ty: &Type, guard: &str) -> Type;

    /// Normalized union of `members`.
    fn resolve_union(&self, members: &[Type]) -> Type;

    /// Normalized intersection of `members`.
    fn resolve_intersection(&self, members: &[Type]) -> Type;

    /// Substitute the declared parameters of `generic` positionally with
    /// `args`.
    fn instantiate_generic(&self, generic: &Type, args: &[Type]) -> Result<Type, TypeSystemError>;
}
