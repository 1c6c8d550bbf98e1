//! Engine assembly.
//!
//! An [`Engine`] owns the configuration, the language registry and the two
//! solver caches. Components it hands out (inference engines, inhabitation
//! solvers, type constraints) share those caches, so repeated queries from
//! different constraint sets of one host are answered once.

use crate::error::EngineError;
use std::fmt;
use std::sync::Arc;
use tgen_common::{EngineConfig, Language};
use tgen_constraints::{ConstraintSet, SyntacticConstraint, TypeConstraint};
use tgen_lang::{LanguageRegistry, TypeSystem};
use tgen_solver::{
    CacheStats, InferenceCache, InferenceEngine, InhabitationSolver, PathCache, Type,
    TypeContext, TypeRelation,
};
use tracing::debug;

/// Runs a plugin's assignability as a solver relation.
struct PluginRelation(Arc<dyn TypeSystem>);

impl TypeRelation for PluginRelation {
    fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        self.0.is_assignable(source, target)
    }

    fn is_assignable_in(&self, source: &Type, target: &Type, context: &TypeContext) -> bool {
        self.0.is_assignable_in(source, target, context)
    }

    fn fingerprint(&self) -> u64 {
        self.0.fingerprint()
    }
}

pub struct Engine {
    config: EngineConfig,
    registry: LanguageRegistry,
    inference_cache: InferenceCache,
    path_cache: PathCache,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}

impl Engine {
    /// Engine with every built-in language plugin.
    pub fn new(config: EngineConfig) -> Self {
        Engine::with_registry(config, LanguageRegistry::with_defaults())
    }

    pub fn with_registry(config: EngineConfig, registry: LanguageRegistry) -> Self {
        Engine {
            inference_cache: InferenceCache::new(config.inference_cache_capacity),
            path_cache: PathCache::new(config.inhabitation_cache_capacity),
            config,
            registry,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn type_system(&self, language: Language) -> Result<Arc<dyn TypeSystem>, EngineError> {
        Ok(self.registry.get(language)?)
    }

    fn relation(&self, language: Language) -> Result<Arc<dyn TypeRelation>, EngineError> {
        Ok(Arc::new(PluginRelation(self.type_system(language)?)))
    }

    /// Inference engine under `language`'s subtyping rules.
    pub fn inference(&self, language: Language) -> Result<InferenceEngine, EngineError> {
        Ok(InferenceEngine::with_cache(self.inference_cache.clone())
            .with_relation(self.relation(language)?))
    }

    /// Inhabitation solver under `language`'s subtyping rules.
    pub fn solver(&self, language: Language) -> Result<InhabitationSolver, EngineError> {
        Ok(
            InhabitationSolver::with_cache(&self.config, self.path_cache.clone())
                .with_relation(self.relation(language)?),
        )
    }

    pub fn type_constraint(&self, language: Language) -> Result<TypeConstraint, EngineError> {
        Ok(TypeConstraint::with_components(
            self.inference(language)?,
            self.solver(language)?,
            self.config.max_type_candidates,
        ))
    }

    /// The standard set for code in `language`: bracket balancing plus
    /// type-directed identifiers. Hosts add schema, semantic and contextual
    /// constraints on top.
    pub fn constraint_set(&self, language: Language) -> Result<ConstraintSet, EngineError> {
        let set = ConstraintSet::with_config(&self.config)
            .with(SyntacticConstraint::new(format!("{language}-brackets")))?
            .with(self.type_constraint(language)?)?;
        debug!(%language, constraints = set.len(), "assembled constraint set");
        Ok(set)
    }

    pub fn inference_cache_stats(&self) -> CacheStats {
        self.inference_cache.stats()
    }

    pub fn inhabitation_cache_stats(&self) -> CacheStats {
        self.path_cache.stats()
    }

    /// Drop every cached result, e.g. after the host re-indexes a project.
    pub fn clear_caches(&self) {
        self.inference_cache.clear();
        self.path_cache.clear();
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("inference_cache", &self.inference_cache.stats())
            .field("path_cache", &self.path_cache.stats())
            .finish()
    }
}
