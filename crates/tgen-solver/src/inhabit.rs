//! Type inhabitation: finding expressions of a required type.
//!
//! The solver searches for sequences of type-transforming [`Operation`]s that
//! lead from a source type to a target type. Starting from the `unknown`
//! seed, the first operation picks a variable from the context; later
//! operations apply single-argument functions or read fields of known
//! classes and interfaces.
//!
//! # Bounds
//!
//! The search is a depth-first enumeration with three cut-offs:
//! - **depth**: at most `max_depth` operations per path;
//! - **cycles**: a type name already on the current path is not re-entered;
//! - **complexity**: a branch whose type is more than `complexity_slack`
//!   more complex than the target is pruned.
//!
//! An expansion budget additionally caps the total number of nodes visited,
//! so very wide contexts degrade to partial answers instead of slow ones.
//!
//! Results are memoized per (source, target, context shape, relation,
//! search bounds), so solvers under different rules can share one cache.

use crate::cache::{CacheStats, SharedCache};
use crate::context::{TypeContext, builtin_member};
use crate::subtype::{StructuralRelation, TypeRelation};
use crate::types::Type;
use crate::unify::Unifier;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tgen_common::EngineConfig;
use tracing::{debug, trace};

pub const COST_USE_VARIABLE: f32 = 0.0;
pub const COST_APPLY: f32 = 1.0;
pub const COST_FIELD_ACCESS: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    /// Reference a variable in scope.
    UseVariable { name: String },
    /// Call a single-argument function on the current value.
    Apply { function: String },
    /// Read a field of the current value.
    FieldAccess { field: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub input: Type,
    pub output: Type,
    pub cost: f32,
}

impl Operation {
    pub fn use_variable(name: impl Into<String>, ty: Type) -> Self {
        Operation {
            kind: OperationKind::UseVariable { name: name.into() },
            input: Type::unknown(),
            output: ty,
            cost: COST_USE_VARIABLE,
        }
    }

    pub fn apply(function: impl Into<String>, input: Type, output: Type) -> Self {
        Operation {
            kind: OperationKind::Apply {
                function: function.into(),
            },
            input,
            output,
            cost: COST_APPLY,
        }
    }

    pub fn field_access(field: impl Into<String>, input: Type, output: Type) -> Self {
        Operation {
            kind: OperationKind::FieldAccess {
                field: field.into(),
            },
            input,
            output,
            cost: COST_FIELD_ACCESS,
        }
    }

    /// The symbol the operation refers to.
    pub fn name(&self) -> &str {
        match &self.kind {
            OperationKind::UseVariable { name } => name,
            OperationKind::Apply { function } => function,
            OperationKind::FieldAccess { field } => field,
        }
    }

    /// Whether the operation can consume a value of type `ty`: the types
    /// match structurally, or share a base name.
    pub fn is_applicable(&self, ty: &Type) -> bool {
        ty.matches_ignoring_nullability(&self.input) || ty.name() == self.input.name()
    }

    /// Wrap `expr` with this operation.
    pub fn apply_to(&self, expr: &str) -> String {
        match &self.kind {
            OperationKind::UseVariable { name } => name.clone(),
            OperationKind::Apply { function } => format!("{function}({expr})"),
            OperationKind::FieldAccess { field } => format!("{expr}.{field}"),
        }
    }
}

type Operations = SmallVec<[Operation; 4]>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Path {
    pub source: Type,
    pub target: Type,
    pub operations: Operations,
}

impl Path {
    pub fn cost(&self) -> f32 {
        self.operations.iter().map(|op| op.cost).sum()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Fold the operations onto `seed`.
    pub fn to_expression(&self, seed: &str) -> String {
        self.operations
            .iter()
            .fold(seed.to_string(), |expr, op| op.apply_to(&expr))
    }

    /// Every identifier the materialized expression references, outermost
    /// call first.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .operations
            .iter()
            .rev()
            .filter(|op| matches!(op.kind, OperationKind::Apply { .. }))
            .map(Operation::name)
            .collect();
        names.extend(
            self.operations
                .iter()
                .filter(|op| matches!(op.kind, OperationKind::UseVariable { .. }))
                .map(Operation::name),
        );
        names
    }

    /// Each operation accepts the type produced by the previous one.
    pub fn is_well_formed(&self) -> bool {
        let mut current = self.source.clone();
        for op in &self.operations {
            if !op.is_applicable(&current) {
                return false;
            }
            current = op.output.clone();
        }
        true
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cost {})", self.to_expression("_"), self.cost())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathKey {
    source: Type,
    target: Type,
    shape: u64,
    relation: u64,
    max_depth: u32,
    complexity_slack: u32,
    max_expansions: u32,
}

pub type PathCache = SharedCache<PathKey, Vec<Path>>;

pub struct InhabitationSolver {
    relation: Arc<dyn TypeRelation>,
    max_depth: u32,
    complexity_slack: u32,
    max_expansions: u32,
    cache: PathCache,
}

impl InhabitationSolver {
    pub fn new(config: &EngineConfig) -> Self {
        InhabitationSolver::with_cache(config, PathCache::new(config.inhabitation_cache_capacity))
    }

    pub fn with_cache(config: &EngineConfig, cache: PathCache) -> Self {
        InhabitationSolver {
            relation: Arc::new(StructuralRelation),
            max_depth: config.max_search_depth,
            complexity_slack: config.complexity_slack,
            max_expansions: config.max_expansions,
            cache,
        }
    }

    pub fn with_relation(mut self, relation: Arc<dyn TypeRelation>) -> Self {
        self.relation = relation;
        self
    }

    pub fn relation(&self) -> &Arc<dyn TypeRelation> {
        &self.relation
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn complexity_slack(&self) -> u32 {
        self.complexity_slack
    }

    pub fn max_expansions(&self) -> u32 {
        self.max_expansions
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Up to `max_results` paths from `source` to `target`, cheapest first.
    pub fn find_paths(
        &self,
        source: &Type,
        target: &Type,
        context: &TypeContext,
        max_results: usize,
    ) -> Vec<Path> {
        let key = PathKey {
            source: source.clone(),
            target: target.clone(),
            shape: context.shape_hash(),
            relation: self.relation.fingerprint(),
            max_depth: self.max_depth,
            complexity_slack: self.complexity_slack,
            max_expansions: self.max_expansions,
        };
        if let Some(mut paths) = self.cache.get(&key) {
            trace!(target = %target, "inhabitation cache hit");
            paths.truncate(max_results);
            return paths;
        }

        let mut search = Search {
            context,
            relation: self.relation.as_ref(),
            unifier: Unifier::with_context(context),
            target,
            complexity_limit: target.complexity().saturating_add(self.complexity_slack),
            expansions_left: self.max_expansions,
            visited: FxHashSet::default(),
        };
        let mut paths: Vec<Path> = search
            .explore(source, self.max_depth)
            .into_iter()
            .map(|operations| Path {
                source: source.clone(),
                target: target.clone(),
                operations,
            })
            .collect();
        paths.sort_by(|a, b| a.cost().total_cmp(&b.cost()));
        debug!(
            source = %source,
            target = %target,
            found = paths.len(),
            budget_left = search.expansions_left,
            "inhabitation search finished"
        );

        self.cache.insert(key, paths.clone());
        paths.truncate(max_results);
        paths
    }

    /// The cheapest path, if any.
    pub fn find_best_path(&self, source: &Type, target: &Type, context: &TypeContext) -> Option<Path> {
        self.find_paths(source, target, context, 1).into_iter().next()
    }

    /// Whether the context can produce a value of type `target`.
    pub fn is_inhabitable(&self, target: &Type, context: &TypeContext) -> bool {
        self.find_best_path(&Type::unknown(), target, context).is_some()
    }

    /// Source text of the cheapest expression of type `target`.
    pub fn synthesize(&self, target: &Type, context: &TypeContext) -> Option<String> {
        self.find_best_path(&Type::unknown(), target, context)
            .filter(|path| !path.is_empty())
            .map(|path| path.to_expression(""))
    }
}

struct Search<'a> {
    context: &'a TypeContext,
    relation: &'a dyn TypeRelation,
    unifier: Unifier,
    target: &'a Type,
    complexity_limit: u32,
    expansions_left: u32,
    visited: FxHashSet<String>,
}

impl Search<'_> {
    fn explore(&mut self, current: &Type, depth: u32) -> Vec<Operations> {
        if current.matches_ignoring_nullability(self.target) {
            return vec![Operations::new()];
        }
        if depth == 0 || self.expansions_left == 0 {
            return Vec::new();
        }
        if !self.visited.insert(current.name().to_string()) {
            return Vec::new();
        }
        self.expansions_left -= 1;

        let mut found = Vec::new();
        for op in self.candidates(current) {
            if op.output.complexity() > self.complexity_limit {
                trace!(op = op.name(), output = %op.output, "pruned by complexity");
                continue;
            }
            for sub_path in self.explore(&op.output, depth - 1) {
                let mut path = Operations::with_capacity(sub_path.len() + 1);
                path.push(op.clone());
                path.extend(sub_path);
                found.push(path);
            }
        }

        self.visited.remove(current.name());
        found
    }

    fn candidates(&self, current: &Type) -> Vec<Operation> {
        if current.is_unknown() {
            return self
                .context
                .variables
                .iter()
                .map(|(name, ty)| Operation::use_variable(name.clone(), ty.clone()))
                .collect();
        }

        let mut ops = Vec::new();
        for signature in self.context.functions.values() {
            if !signature.accepts_single_argument() {
                continue;
            }
            let param = &signature.parameters[0].ty;
            let output = if signature.is_generic() {
                match self.unifier.unify(param, current) {
                    Ok(subst) => subst.apply(&signature.return_type),
                    Err(_) => continue,
                }
            } else if self.relation.is_assignable_in(current, param, self.context) {
                signature.return_type.clone()
            } else {
                continue;
            };
            ops.push(Operation::apply(
                signature.name.clone(),
                current.clone(),
                output,
            ));
        }

        let receiver = current.non_null();
        for member in self.context.members_of(&receiver) {
            if !member.is_method {
                ops.push(Operation::field_access(
                    member.name,
                    current.clone(),
                    member.ty,
                ));
            }
        }
        if let Some(length) = builtin_member(&receiver, "length") {
            ops.push(Operation::field_access("length", current.clone(), length));
        }
        ops
    }
}

#[cfg(test)]
#[path = "../tests/inhabit_tests.rs"]
mod tests;
