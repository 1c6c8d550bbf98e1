//! End-to-end tests for the constraint pipeline
//!
//! These tests drive the public API the way an inference server would:
//! - Populating a `TypeContext` from annotations parsed by the language plugin
//! - Assembling constraint sets from an `Engine`
//! - Evaluating masks step by step against a vocabulary

use std::sync::Arc;
use tgen::{
    ClassType, ConstraintSet, ContextualConstraint, Engine, EngineConfig, Expr,
    FunctionSignature, GenerationState, Language, LevelSet, SchemaConstraint,
    SemanticConstraint, StaticVocabulary, TokenMask, Type, TypeContext, TypeParameter,
    TypeSystem, Vocabulary,
};

/// Context an indexer would produce for a small TypeScript module.
fn project_context(engine: &Engine) -> TypeContext {
    let ts = engine.type_system(Language::TypeScript).unwrap();
    TypeContext::new(Language::TypeScript)
        .strict(true)
        .with_variable("user", ts.parse("User"))
        .with_variable("total", ts.parse("number"))
        .with_variable("names", ts.parse("string[]"))
        .with_variable("enabled", ts.parse("boolean"))
        .with_class(
            ClassType::new("User")
                .with_property("name", ts.parse("string"))
                .with_property("age", ts.parse("number")),
        )
        .with_function(FunctionSignature::new(
            "parseInt",
            vec![TypeParameter::new("text", ts.parse("string"))],
            ts.parse("number"),
        ))
}

fn vocab() -> StaticVocabulary {
    StaticVocabulary::new([
        "total", "user", "names", "enabled", "parseInt", "(", ")", ".", ";", " ", "name", "age",
        "length", "foo", "true", "]",
    ])
}

fn legal(mask: &TokenMask, vocab: &StaticVocabulary) -> Vec<String> {
    (0..vocab.len() as u32)
        .map(tgen::TokenId)
        .filter(|token| mask.is_legal(*token))
        .filter_map(|token| vocab.text(token).map(str::to_string))
        .collect()
}

#[test]
fn test_parsed_annotations_populate_context() {
    let engine = Engine::default();
    let ctx = project_context(&engine);
    assert_eq!(ctx.lookup("names"), Some(Type::array(Type::string())));
    assert_eq!(ctx.lookup("user"), Some(Type::named("User")));
}

#[test]
fn test_expression_position_prefers_values_of_expected_type() {
    let engine = Engine::default();
    let set = engine.constraint_set(Language::TypeScript).unwrap();
    let vocab = vocab();
    let state = GenerationState::new("const n: number = ", Arc::new(project_context(&engine)))
        .with_expected_type(Type::number());

    let mask = set.evaluate(&state, &vocab);
    let legal = legal(&mask, &vocab);

    for name in ["total", "user", "names", "parseInt", "true"] {
        assert!(legal.contains(&name.to_string()), "{name} should be legal");
    }
    assert!(!legal.contains(&"enabled".to_string()));
    assert!(!legal.contains(&"foo".to_string()));
    // `]` closes a bracket that was never opened.
    assert!(!legal.contains(&"]".to_string()));

    let total = vocab.id("total").unwrap();
    let user = vocab.id("user").unwrap();
    assert!(mask.bias_for(total) > mask.bias_for(user));
}

#[test]
fn test_member_position_lists_receiver_members() {
    let engine = Engine::default();
    let set = engine.constraint_set(Language::TypeScript).unwrap();
    let vocab = vocab();
    let ctx = Arc::new(project_context(&engine));

    let state = GenerationState::new("user.", Arc::clone(&ctx)).with_receiver(Expr::ident("user"));
    let legal_members = legal(&set.evaluate(&state, &vocab), &vocab);
    assert!(legal_members.contains(&"name".to_string()));
    assert!(legal_members.contains(&"age".to_string()));
    assert!(!legal_members.contains(&"length".to_string()));
    assert!(!legal_members.contains(&"total".to_string()));

    let state = GenerationState::new("names.", ctx).with_receiver(Expr::ident("names"));
    let legal_members = legal(&set.evaluate(&state, &vocab), &vocab);
    assert!(legal_members.contains(&"length".to_string()));
    assert!(!legal_members.contains(&"name".to_string()));
}

#[test]
fn test_layered_constraints_narrow_the_mask() {
    let engine = Engine::default();
    let vocab = vocab();
    let set = engine
        .constraint_set(Language::TypeScript)
        .unwrap()
        .with(SemanticConstraint::new().ban_identifier("parseInt"))
        .unwrap()
        .with(ContextualConstraint::new().ban_text(";").prefer("total"))
        .unwrap();
    let state = GenerationState::new("let n: number = ", Arc::new(project_context(&engine)))
        .with_expected_type(Type::number());

    let mask = set.evaluate(&state, &vocab);
    let legal = legal(&mask, &vocab);
    assert!(!legal.contains(&"parseInt".to_string()));
    assert!(!legal.contains(&";".to_string()));
    assert!(legal.contains(&"total".to_string()));
    // The contextual bias is applied after the type bias.
    assert_eq!(mask.bias_for(vocab.id("total").unwrap()), 1.0);
}

#[test]
fn test_disabled_type_level_leaves_syntax_only() {
    let config = EngineConfig {
        enabled_levels: LevelSet::SYNTACTIC,
        ..EngineConfig::default()
    };
    let engine = Engine::new(config);
    let set = engine.constraint_set(Language::TypeScript).unwrap();
    let vocab = vocab();
    let state = GenerationState::new("x = ", Arc::new(project_context(&engine)))
        .with_expected_type(Type::number());

    let legal = legal(&set.evaluate(&state, &vocab), &vocab);
    assert!(legal.contains(&"foo".to_string()));
    assert!(legal.contains(&"enabled".to_string()));
    assert!(!legal.contains(&"]".to_string()));
}

#[test]
fn test_schema_output_exposes_grammar() {
    let set = ConstraintSet::new()
        .with(
            SchemaConstraint::new(serde_json::json!({
                "type": "object",
                "properties": { "ok": { "type": "boolean" } },
                "required": ["ok"]
            }))
            .unwrap(),
        )
        .unwrap();
    let grammar = set.to_grammar().unwrap();
    assert!(grammar.starts_with(r#"root ::= "{" ws "\"ok\"" ws ":" ws boolean ws "}""#));
    assert!(grammar.contains("boolean ::= "));

    let vocab = StaticVocabulary::new(["{", "x"]);
    let state = GenerationState::new("", Arc::new(TypeContext::default()));
    assert_eq!(legal(&set.evaluate(&state, &vocab), &vocab), vec!["{".to_string()]);
}
