//! Lookup of type-system plugins by target language.

use crate::error::TypeSystemError;
use crate::typescript::TypeScriptTypeSystem;
use crate::TypeSystem;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tgen_common::Language;
use tracing::debug;

#[derive(Clone, Default)]
pub struct LanguageRegistry {
    plugins: FxHashMap<Language, Arc<dyn TypeSystem>>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        LanguageRegistry::default()
    }

    /// Registry with every built-in plugin.
    ///
    /// JavaScript shares the TypeScript plugin: its annotations (JSDoc, d.ts)
    /// are TypeScript types.
    pub fn with_defaults() -> Self {
        let typescript: Arc<dyn TypeSystem> = Arc::new(TypeScriptTypeSystem::new());
        let mut registry = LanguageRegistry::new();
        registry.register_as(Language::TypeScript, Arc::clone(&typescript));
        registry.register_as(Language::JavaScript, typescript);
        registry
    }

    /// Register `plugin` under its own language, replacing any previous one.
    pub fn register(&mut self, plugin: Arc<dyn TypeSystem>) {
        self.register_as(plugin.language(), plugin);
    }

    pub fn register_as(&mut self, language: Language, plugin: Arc<dyn TypeSystem>) {
        self.plugins.insert(language, plugin);
    }

    pub fn get(&self, language: Language) -> Result<Arc<dyn TypeSystem>, TypeSystemError> {
        match self.plugins.get(&language) {
            Some(plugin) => Ok(Arc::clone(plugin)),
            None => {
                debug!(%language, "no type system registered");
                Err(TypeSystemError::UnsupportedLanguage(language))
            }
        }
    }

    pub fn supports(&self, language: Language) -> bool {
        self.plugins.contains_key(&language)
    }

    /// Registered languages in declaration order.
    pub fn languages(&self) -> Vec<Language> {
        Language::ALL
            .iter()
            .copied()
            .filter(|language| self.supports(*language))
            .collect()
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
