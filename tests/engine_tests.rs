//! Tests for `Engine` assembly: plugin lookup, cache sharing and the
//! solver entry points under TypeScript rules.

use std::sync::Arc;
use tgen::{
    Constraint, ConstraintKind, Engine, EngineConfig, EngineError, Expr, FunctionSignature,
    Language, LanguageRegistry, Type, TypeContext, TypeParameter, TypeScriptTypeSystem,
    TypeSystem, TypeSystemError,
};

fn context() -> TypeContext {
    TypeContext::new(Language::TypeScript)
        .strict(true)
        .with_variable("n", Type::number())
        .with_variable("label", Type::string().with_nullable(true))
        .with_function(FunctionSignature::new(
            "toMoney",
            vec![TypeParameter::new("value", Type::number())],
            Type::named("Money"),
        ))
}

#[test]
fn test_unsupported_language_is_reported() {
    let engine = Engine::default();
    let err = engine.constraint_set(Language::Python).unwrap_err();
    assert!(matches!(
        err,
        EngineError::TypeSystem(TypeSystemError::UnsupportedLanguage(Language::Python))
    ));
    assert_eq!(err.to_string(), "no type system is registered for python");
    assert!(engine.inference(Language::Go).is_err());
    assert!(engine.solver(Language::Rust).is_err());
}

#[test]
fn test_empty_registry_supports_nothing() {
    let engine = Engine::with_registry(EngineConfig::default(), LanguageRegistry::new());
    assert!(engine.type_system(Language::TypeScript).is_err());
}

#[test]
fn test_javascript_uses_typescript_rules() {
    let engine = Engine::default();
    let js = engine.type_system(Language::JavaScript).unwrap();
    assert_eq!(js.language(), Language::TypeScript);
    assert_eq!(js.parse("number[]"), Type::array(Type::number()));
}

#[test]
fn test_standard_set_contents() {
    let engine = Engine::default();
    let set = engine.constraint_set(Language::TypeScript).unwrap();
    let kinds: Vec<ConstraintKind> = set.iter().map(|c| c.kind()).collect();
    assert_eq!(kinds, vec![ConstraintKind::Syntactic, ConstraintKind::Type]);
    assert_eq!(set.enabled_levels(), engine.config().enabled_levels);
}

#[test]
fn test_inference_under_typescript_rules() {
    let engine = Engine::default();
    let inference = engine.inference(Language::TypeScript).unwrap();
    let ctx = context();

    assert!(inference.check(&Expr::number(1.0), &Type::number(), &ctx));
    assert!(!inference.check(&Expr::string("a"), &Type::number(), &ctx));
    // Strict null checks: `string | null` does not fit `string`.
    assert!(!inference.check(&Expr::ident("label"), &Type::string(), &ctx));
    assert!(inference.check(&Expr::ident("label"), &Type::string().with_nullable(true), &ctx));

    let diagnostic = inference
        .diagnose(&Expr::ident("missing"), &Type::number(), &ctx)
        .unwrap();
    assert!(diagnostic.message_text.contains("missing"));
    assert!(inference.diagnose(&Expr::ident("n"), &Type::number(), &ctx).is_none());
}

#[test]
fn test_synthesis_and_inhabitation() {
    let engine = Engine::default();
    let solver = engine.solver(Language::TypeScript).unwrap();
    let ctx = context();

    assert_eq!(solver.synthesize(&Type::number(), &ctx).as_deref(), Some("n"));
    // `label` is `string | null`; a nullable variable still inhabits `string`.
    assert_eq!(solver.synthesize(&Type::string(), &ctx).as_deref(), Some("label"));
    assert_eq!(
        solver.synthesize(&Type::named("Money"), &ctx).as_deref(),
        Some("toMoney(n)")
    );
    assert!(!solver.is_inhabitable(&Type::named("Order"), &ctx));
    assert_eq!(solver.max_depth(), engine.config().max_search_depth);
}

#[test]
fn test_components_share_caches() {
    let engine = Engine::default();
    let ctx = context();

    let first = engine.solver(Language::TypeScript).unwrap();
    first.find_paths(&Type::unknown(), &Type::string(), &ctx, 4);
    let second = engine.solver(Language::TypeScript).unwrap();
    second.find_paths(&Type::unknown(), &Type::string(), &ctx, 4);

    let stats = engine.inhabitation_cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);

    engine.clear_caches();
    engine
        .solver(Language::TypeScript)
        .unwrap()
        .find_paths(&Type::unknown(), &Type::string(), &ctx, 4);
    assert_eq!(engine.inhabitation_cache_stats().misses, 2);
}

#[test]
fn test_inference_cache_hits_across_engines() {
    let engine = Engine::default();
    let ctx = context();
    let expr = Expr::call(Expr::ident("toMoney"), vec![Expr::ident("n")]);

    let a = engine.inference(Language::TypeScript).unwrap().infer(&expr, &ctx);
    let b = engine.inference(Language::TypeScript).unwrap().infer(&expr, &ctx);
    assert_eq!(a, b);
    assert_eq!(a.ty, Type::named("Money"));
    assert!(engine.inference_cache_stats().hits >= 1);
}

#[test]
fn test_uncached_config() {
    let engine = Engine::new(EngineConfig::uncached());
    let ctx = context();
    let solver = engine.solver(Language::TypeScript).unwrap();
    solver.find_paths(&Type::unknown(), &Type::number(), &ctx, 1);
    solver.find_paths(&Type::unknown(), &Type::number(), &ctx, 1);
    assert_eq!(engine.inhabitation_cache_stats().hits, 0);
}

#[test]
fn test_debug_output() {
    let rendered = format!("{:?}", Engine::default());
    assert!(rendered.contains("Engine"));
    assert!(rendered.contains("TypeScript"));
}

#[test]
fn test_context_strictness_selects_null_checking() {
    let engine = Engine::default();
    let solver = engine.solver(Language::TypeScript).unwrap();
    let inference = engine.inference(Language::TypeScript).unwrap();
    let lenient = TypeContext::new(Language::TypeScript)
        .strict(false)
        .with_variable("x", Type::number().as_nullable())
        .with_function(FunctionSignature::new(
            "f",
            vec![TypeParameter::new("a", Type::number())],
            Type::string(),
        ));
    let strict = lenient.clone().strict(true);

    assert_eq!(solver.synthesize(&Type::string(), &lenient).as_deref(), Some("f(x)"));
    assert_eq!(solver.synthesize(&Type::string(), &strict), None);

    assert!(inference.check(&Expr::ident("x"), &Type::number(), &lenient));
    assert!(!inference.check(&Expr::ident("x"), &Type::number(), &strict));
}

#[test]
fn test_languages_with_different_rules_do_not_share_paths() {
    let mut registry = LanguageRegistry::with_defaults();
    registry.register_as(
        Language::JavaScript,
        Arc::new(TypeScriptTypeSystem::new().with_strict_null_checks(false)),
    );
    let engine = Engine::with_registry(EngineConfig::default(), registry);
    let ctx = context();

    engine
        .solver(Language::JavaScript)
        .unwrap()
        .find_paths(&Type::unknown(), &Type::string(), &ctx, 4);
    engine
        .solver(Language::TypeScript)
        .unwrap()
        .find_paths(&Type::unknown(), &Type::string(), &ctx, 4);
    let stats = engine.inhabitation_cache_stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 2);

    // The default registry shares one plugin between the two languages.
    let shared = Engine::default();
    for language in [Language::JavaScript, Language::TypeScript] {
        shared
            .solver(language)
            .unwrap()
            .find_paths(&Type::unknown(), &Type::string(), &ctx, 4);
    }
    assert_eq!(shared.inhabitation_cache_stats().hits, 1);
}
