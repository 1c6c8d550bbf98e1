use super::{EXPRESSION_KEYWORDS, identifier_mask};
use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel, clamp_weight, content_hash};
use crate::mask::TokenMask;
use crate::state::GenerationState;
use crate::vocab::Vocabulary;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tgen_common::EngineConfig;
use tgen_solver::context::builtin_member;
use tgen_solver::{InferenceEngine, InhabitationSolver, Type, TypeContext, TypeRelation};
use tracing::{debug, trace};

/// Members reachable on any receiver through `builtin_member`.
const BUILTIN_MEMBERS: &[&str] = &["length"];

/// Bias given to the head of the cheapest inhabitation path.
const DEFAULT_PREFERENCE: f32 = 2.0;

/// Identifiers restricted to those that can produce the expected type.
///
/// Two positions are handled:
///
/// - **member access** (`receiver.` at the cursor): the receiver's type is
///   inferred and only members are legal. With an expected type, only
///   members whose value (or method result) can reach it survive.
/// - **expression start** with an expected type: the inhabitation solver
///   ranks expressions of that type, and only their leading identifiers
///   (plus expression keywords such as `new` or `true`) are legal. Cheaper
///   expressions get larger biases.
///
/// Anything the engine cannot resolve (an unknown receiver, an expected
/// type nothing in scope produces) leaves the mask permissive.
pub struct TypeConstraint {
    engine: InferenceEngine,
    solver: InhabitationSolver,
    max_candidates: usize,
    preference: f32,
    weight: f32,
}

impl TypeConstraint {
    pub fn new(config: &EngineConfig) -> Self {
        TypeConstraint::with_components(
            InferenceEngine::new(config),
            InhabitationSolver::new(config),
            config.max_type_candidates,
        )
    }

    /// Constraint over existing (possibly cache-sharing) components.
    pub fn with_components(
        engine: InferenceEngine,
        solver: InhabitationSolver,
        max_candidates: usize,
    ) -> Self {
        TypeConstraint {
            engine,
            solver,
            max_candidates,
            preference: DEFAULT_PREFERENCE,
            weight: 1.0,
        }
    }

    /// Run inference and search under a language's subtyping rules.
    pub fn with_relation(mut self, relation: Arc<dyn TypeRelation>) -> Self {
        self.engine = self.engine.with_relation(Arc::clone(&relation));
        self.solver = self.solver.with_relation(relation);
        self
    }

    pub fn with_preference(mut self, bias: f32) -> Self {
        self.preference = bias;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn solver(&self) -> &InhabitationSolver {
        &self.solver
    }

    fn member_mask(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        let Some(receiver) = &state.receiver else {
            return TokenMask::permissive();
        };
        let ctx = state.context.as_ref();
        let inferred = self.engine.infer(receiver, ctx);
        if !inferred.is_resolved() {
            trace!("receiver type unresolved");
            return TokenMask::permissive();
        }
        let receiver_ty = inferred.ty.non_null();

        let mut members: Vec<(String, Type)> = ctx
            .members_of(&receiver_ty)
            .into_iter()
            .map(|m| (m.name, m.ty))
            .collect();
        for name in BUILTIN_MEMBERS {
            if let Some(ty) = builtin_member(&receiver_ty, name) {
                members.push(((*name).to_string(), ty));
            }
        }
        if members.is_empty() {
            trace!(receiver = %receiver_ty, "receiver has no known members");
            return TokenMask::permissive();
        }
        if let Some(expected) = &state.expected_type {
            members.retain(|(_, ty)| self.produces(ty, expected, ctx));
        }

        let candidates: FxHashMap<String, f32> =
            members.into_iter().map(|(name, _)| (name, 0.0)).collect();
        identifier_mask(&candidates, state, vocab)
    }

    /// Whether a member of type `ty` can lead to `expected`.
    fn produces(&self, ty: &Type, expected: &Type, ctx: &TypeContext) -> bool {
        if self.engine.is_assignable_in(ty, expected, ctx) {
            return true;
        }
        if let Some(ret) = ty.function_return() {
            if self.engine.is_assignable_in(ret, expected, ctx) {
                return true;
            }
        }
        self.solver.find_best_path(ty, expected, ctx).is_some()
    }

    fn expression_mask(
        &self,
        expected: &Type,
        state: &GenerationState,
        vocab: &dyn Vocabulary,
    ) -> TokenMask {
        let ctx = state.context.as_ref();
        let paths = self
            .solver
            .find_paths(&Type::unknown(), expected, ctx, self.max_candidates);
        if paths.is_empty() {
            debug!(expected = %expected, "no expression of the expected type in scope");
            return TokenMask::permissive();
        }

        let mut candidates: FxHashMap<String, f32> = EXPRESSION_KEYWORDS
            .iter()
            .map(|k| ((*k).to_string(), 0.0))
            .collect();
        for path in &paths {
            let Some(head) = path.referenced_names().first().map(|h| (*h).to_string()) else {
                continue;
            };
            let bias = self.weight * self.preference / (1.0 + path.cost());
            let entry = candidates.entry(head).or_insert(0.0);
            *entry = entry.max(bias);
        }
        identifier_mask(&candidates, state, vocab)
    }
}

impl fmt::Debug for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConstraint")
            .field("max_candidates", &self.max_candidates)
            .field("preference", &self.preference)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

impl Constraint for TypeConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Type
    }

    fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Type
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        if state.after_member_dot() {
            return self.member_mask(state, vocab);
        }
        match &state.expected_type {
            Some(expected) => self.expression_mask(expected, state, vocab),
            None => TokenMask::permissive(),
        }
    }

    fn cache_key(&self) -> u64 {
        content_hash(
            &self.kind(),
            self.level(),
            &(
                self.max_candidates,
                self.engine.relation().fingerprint(),
                self.solver.relation().fingerprint(),
                (
                    self.solver.max_depth(),
                    self.solver.complexity_slack(),
                    self.solver.max_expansions(),
                ),
                self.preference.to_bits(),
                self.weight.to_bits(),
            ),
        )
    }
}
