//! Bidirectional type inference over partial expressions.
//!
//! Forward inference ([`InferenceEngine::infer`]) synthesizes a type and a
//! confidence for an expression; backward inference
//! ([`InferenceEngine::infer_backward`]) narrows that type using the type
//! the surrounding code expects.
//!
//! Inference is total. An identifier that is not in scope, a call on a
//! non-function, or a property the receiver does not declare all produce
//! `unknown` at confidence 0: during generation most expressions are
//! incomplete, so "no type yet" is the common case, not an error.

use crate::cache::{CacheStats, SharedCache};
use crate::context::{TypeContext, builtin_member};
use crate::expr::{Expr, FunctionParam, Literal};
use crate::subtype::{StructuralRelation, TypeRelation};
use crate::types::{FunctionSignature, Type};
use crate::unify::{Substitution, Unifier};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tgen_common::diagnostics::{Diagnostic, diagnostic_codes, format_message};
use tgen_common::limits::{
    CONFIDENCE_CERTAIN, CONFIDENCE_EMPTY_ARRAY, CONFIDENCE_NONE, MAX_INFER_DEPTH,
};
use tgen_common::EngineConfig;
use tracing::{debug, trace};

/// Confidence multiplier applied when a generic call could not unify every
/// argument with its declared parameter.
const PARTIAL_INSTANTIATION_PENALTY: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Inferred {
    pub ty: Type,
    pub confidence: f32,
}

impl Inferred {
    pub fn new(ty: Type, confidence: f32) -> Self {
        Inferred {
            ty,
            confidence: confidence.clamp(CONFIDENCE_NONE, CONFIDENCE_CERTAIN),
        }
    }

    pub fn certain(ty: Type) -> Self {
        Inferred::new(ty, CONFIDENCE_CERTAIN)
    }

    pub fn unresolved() -> Self {
        Inferred::new(Type::unknown(), CONFIDENCE_NONE)
    }

    pub fn is_resolved(&self) -> bool {
        self.confidence > CONFIDENCE_NONE && !self.ty.is_unknown()
    }
}

/// Key: (expression fingerprint, context shape hash).
pub type InferenceCache = SharedCache<(u64, u64), Inferred>;

pub struct InferenceEngine {
    relation: Arc<dyn TypeRelation>,
    cache: InferenceCache,
}

impl InferenceEngine {
    pub fn new(config: &EngineConfig) -> Self {
        InferenceEngine::with_cache(InferenceCache::new(config.inference_cache_capacity))
    }

    /// Engine backed by an existing (possibly shared) cache.
    pub fn with_cache(cache: InferenceCache) -> Self {
        InferenceEngine {
            relation: Arc::new(StructuralRelation),
            cache,
        }
    }

    /// Use a language plugin's subtyping rules for `check` and backward
    /// inference.
    pub fn with_relation(mut self, relation: Arc<dyn TypeRelation>) -> Self {
        self.relation = relation;
        self
    }

    pub fn relation(&self) -> &Arc<dyn TypeRelation> {
        &self.relation
    }

    pub fn cache(&self) -> &InferenceCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Forward inference.
    pub fn infer(&self, expr: &Expr, context: &TypeContext) -> Inferred {
        let key = (expr.fingerprint(), context.shape_hash());
        if let Some(hit) = self.cache.get(&key) {
            trace!(fingerprint = key.0, "inference cache hit");
            return hit;
        }
        let result = self.infer_expr(expr, context, 0);
        self.cache.insert(key, result.clone());
        result
    }

    /// Whether `expr` can be used where `expected` is required.
    pub fn check(&self, expr: &Expr, expected: &Type, context: &TypeContext) -> bool {
        let inferred = self.infer(expr, context);
        self.relation.is_assignable_in(&inferred.ty, expected, context)
    }

    pub fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        self.relation.is_assignable(source, target)
    }

    /// Assignability under `context`'s strictness.
    pub fn is_assignable_in(&self, source: &Type, target: &Type, context: &TypeContext) -> bool {
        self.relation.is_assignable_in(source, target, context)
    }

    /// Narrow the forward type of `expr` using the type its usage site
    /// expects.
    ///
    /// - a nullable forward type whose non-null form is the usage type
    ///   narrows to the non-null form;
    /// - a forward type already assignable to the usage type is kept;
    /// - otherwise the usage type wins.
    pub fn infer_backward(&self, expr: &Expr, usage: &Type, context: &TypeContext) -> Type {
        let forward = self.infer(expr, context).ty;
        if forward.is_nullable() && !usage.is_nullable() {
            let non_null = forward.non_null();
            if non_null == *usage {
                return non_null;
            }
        }
        if self.relation.is_assignable_in(&forward, usage, context) {
            return forward;
        }
        debug!(forward = %forward, usage = %usage, "usage type overrides forward type");
        usage.clone()
    }

    /// Diagnostic explaining why `expr` does not check against `expected`,
    /// or `None` when it does.
    pub fn diagnose(
        &self,
        expr: &Expr,
        expected: &Type,
        context: &TypeContext,
    ) -> Option<Diagnostic> {
        let inferred = self.infer(expr, context);
        if !inferred.is_resolved() {
            let diagnostic = match expr {
                Expr::Identifier(name) if !context.is_declared(name) => Diagnostic::error(
                    diagnostic_codes::UNRESOLVED_IDENTIFIER,
                    format_message("Cannot find name '{0}'.", &[name.as_str()]),
                ),
                Expr::Call { .. } => Diagnostic::warning(
                    diagnostic_codes::NOT_CALLABLE,
                    "Expression is not callable.",
                ),
                Expr::PropertyAccess { property, .. } => Diagnostic::warning(
                    diagnostic_codes::UNKNOWN_PROPERTY,
                    format_message(
                        "Property '{0}' does not exist on the receiver type.",
                        &[property.as_str()],
                    ),
                ),
                _ => Diagnostic::warning(
                    diagnostic_codes::LOW_CONFIDENCE,
                    "Type of expression could not be determined.",
                ),
            };
            return Some(diagnostic);
        }
        if self.relation.is_assignable_in(&inferred.ty, expected, context) {
            return None;
        }
        let actual = inferred.ty.to_string();
        let wanted = expected.to_string();
        Some(
            Diagnostic::error(
                diagnostic_codes::TYPE_NOT_ASSIGNABLE,
                format_message(
                    "Type '{0}' is not assignable to type '{1}'.",
                    &[&actual, &wanted],
                ),
            )
            .with_types(wanted, actual),
        )
    }

    fn infer_expr(&self, expr: &Expr, context: &TypeContext, depth: u32) -> Inferred {
        if depth > MAX_INFER_DEPTH {
            debug!(depth, "expression nesting exceeds inference depth");
            return Inferred::unresolved();
        }
        match expr {
            Expr::Literal(literal) => Inferred::certain(literal_type(literal)),
            Expr::Identifier(name) => match context.lookup(name) {
                Some(ty) => Inferred::certain(ty),
                None => {
                    trace!(name = name.as_str(), "unresolved identifier");
                    Inferred::unresolved()
                }
            },
            Expr::Call { callee, args } => self.infer_call(callee, args, context, depth),
            Expr::PropertyAccess { object, property } => {
                self.infer_property(object, property, context, depth)
            }
            Expr::Array(elements) => self.infer_array(elements, context, depth),
            Expr::Object(fields) => self.infer_object(fields, context, depth),
            Expr::Function { params, body } => self.infer_function(params, body, context, depth),
        }
    }

    fn infer_call(
        &self,
        callee: &Expr,
        args: &[Expr],
        context: &TypeContext,
        depth: u32,
    ) -> Inferred {
        if let Expr::Identifier(name) = callee {
            if !context.variables.contains_key(name) {
                if let Some(signature) = context.functions.get(name) {
                    if signature.is_generic() {
                        return self.instantiate_call(signature, args, context, depth);
                    }
                }
            }
        }

        let callee_type = self.infer_expr(callee, context, depth + 1);
        let callee_ty = context.resolve_alias(&callee_type.ty);
        match callee_ty.function_return() {
            Some(ret) => Inferred::new(ret.clone(), callee_type.confidence),
            None => {
                trace!(callee = %callee_ty, "call on non-function type");
                Inferred::unresolved()
            }
        }
    }

    /// Instantiate a generic callee by unifying declared parameter types with
    /// the inferred argument types.
    ///
    /// Type variables the arguments leave unbound fall back to their
    /// declared default, then their bound, then `unknown`, and cost
    /// confidence. A result that is `unknown` outright is unresolved.
    fn instantiate_call(
        &self,
        signature: &FunctionSignature,
        args: &[Expr],
        context: &TypeContext,
        depth: u32,
    ) -> Inferred {
        let unifier = Unifier::with_context(context);
        let mut subst = Substitution::new();
        let mut confidence = CONFIDENCE_CERTAIN;
        let params = signature.parameters.iter().map(|p| &p.ty);
        for (param, arg) in params.zip(args) {
            let arg_type = self.infer_expr(arg, context, depth + 1);
            if !arg_type.is_resolved() {
                confidence *= PARTIAL_INSTANTIATION_PENALTY;
                continue;
            }
            confidence = confidence.min(arg_type.confidence);
            // Bindings made before a failing pair are kept; they are still
            // the best information available.
            let mut attempt = subst.clone();
            match unifier.unify_into(param, &arg_type.ty, &mut attempt) {
                Ok(()) => subst = attempt,
                Err(failure) => {
                    debug!(%failure, "generic argument did not unify");
                    confidence *= PARTIAL_INSTANTIATION_PENALTY;
                }
            }
        }

        let ret = subst.apply(&signature.return_type);
        let unbound: FxHashMap<String, Type> = signature
            .generic_parameters
            .iter()
            .filter(|var| subst.get(&var.name).is_none() && ret.mentions(&var.name))
            .map(|var| {
                let fallback = var
                    .default
                    .clone()
                    .or_else(|| var.bound.clone())
                    .unwrap_or_else(Type::unknown);
                (var.name.clone(), fallback)
            })
            .collect();
        if unbound.is_empty() {
            return Inferred::new(ret, confidence);
        }
        let ret = ret.substitute(&unbound);
        if ret.is_unknown() {
            trace!(function = signature.name.as_str(), "generic result left unbound");
            return Inferred::unresolved();
        }
        debug!(
            function = signature.name.as_str(),
            unbound = unbound.len(),
            "generic result instantiated from fallbacks"
        );
        Inferred::new(ret, confidence * PARTIAL_INSTANTIATION_PENALTY)
    }

    fn infer_property(
        &self,
        object: &Expr,
        property: &str,
        context: &TypeContext,
        depth: u32,
    ) -> Inferred {
        let receiver = self.infer_expr(object, context, depth + 1);
        if !receiver.is_resolved() {
            return Inferred::unresolved();
        }
        let receiver_ty = context.resolve_alias(&receiver.ty).non_null();
        if let Some(ty) = context.property_type(&receiver_ty, property) {
            return Inferred::new(ty, receiver.confidence);
        }
        if let Some(ty) = builtin_member(&receiver_ty, property) {
            return Inferred::new(ty, receiver.confidence);
        }
        trace!(receiver = %receiver_ty, property, "unknown property");
        Inferred::unresolved()
    }

    fn infer_array(&self, elements: &[Expr], context: &TypeContext, depth: u32) -> Inferred {
        if elements.is_empty() {
            return Inferred::new(Type::array(Type::unknown()), CONFIDENCE_EMPTY_ARRAY);
        }
        let mut distinct: Vec<Type> = Vec::new();
        let mut confidence = CONFIDENCE_CERTAIN;
        for element in elements {
            let inferred = self.infer_expr(element, context, depth + 1);
            confidence = confidence.min(inferred.confidence);
            if !distinct.contains(&inferred.ty) {
                distinct.push(inferred.ty);
            }
        }
        let element = if distinct.len() == 1 {
            distinct.remove(0)
        } else {
            Type::union(distinct)
        };
        Inferred::new(Type::array(element), confidence)
    }

    fn infer_object(
        &self,
        fields: &[(String, Expr)],
        context: &TypeContext,
        depth: u32,
    ) -> Inferred {
        let mut properties = Vec::with_capacity(fields.len());
        let mut confidence = CONFIDENCE_CERTAIN;
        for (name, value) in fields {
            let inferred = self.infer_expr(value, context, depth + 1);
            confidence = confidence.min(inferred.confidence);
            properties.push((name.clone(), inferred.ty));
        }
        Inferred::new(Type::object_with_properties(properties), confidence)
    }

    fn infer_function(
        &self,
        params: &[FunctionParam],
        body: &Expr,
        context: &TypeContext,
        depth: u32,
    ) -> Inferred {
        let param_types: Vec<Type> = params
            .iter()
            .map(|p| p.ty.clone().unwrap_or_else(Type::unknown))
            .collect();
        let scope = context.with_scope(
            params
                .iter()
                .map(|p| p.name.clone())
                .zip(param_types.iter().cloned()),
        );
        let body_type = self.infer_expr(body, &scope, depth + 1);
        Inferred::new(
            Type::function(param_types, body_type.ty),
            body_type.confidence,
        )
    }
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Number(_) => Type::number(),
        Literal::String(_) => Type::string(),
        Literal::Boolean(_) => Type::boolean(),
        Literal::Null => Type::null(),
        Literal::Undefined => Type::undefined(),
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
