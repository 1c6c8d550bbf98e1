use super::*;
use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel};
use crate::error::ConstraintError;
use crate::vocab::StaticVocabulary;
use serde_json::json;
use std::sync::Arc;
use tgen_common::{EngineConfig, Language};
use tgen_solver::types::ClassType;
use tgen_solver::{Expr, Type, TypeContext};

fn state_in(text: &str, ctx: TypeContext) -> GenerationState {
    GenerationState::new(text, Arc::new(ctx))
}

fn state(text: &str) -> GenerationState {
    state_in(text, TypeContext::new(Language::TypeScript))
}

fn legal_texts<'a>(mask: &TokenMask, vocab: &'a StaticVocabulary) -> Vec<&'a str> {
    vocab::tokens(vocab)
        .filter(|(token, _)| mask.is_legal(*token))
        .map(|(_, text)| text)
        .collect()
}

fn users_context() -> TypeContext {
    TypeContext::new(Language::TypeScript)
        .with_variable("user", Type::named("User"))
        .with_variable("n", Type::number())
        .with_variable("count", Type::number())
        .with_variable("flag", Type::boolean())
        .with_class(
            ClassType::new("User")
                .with_property("name", Type::string())
                .with_property("id", Type::number())
                .with_property("active", Type::boolean()),
        )
}

// =============================================================================
// Identifier helpers
// =============================================================================

#[test]
fn test_word_step_at_word_start() {
    assert_eq!(
        word_step("", " count"),
        WordStep::Extends {
            word: "count".to_string(),
            closed: false
        }
    );
    assert_eq!(
        word_step("", "foo("),
        WordStep::Extends {
            word: "foo".to_string(),
            closed: true
        }
    );
    assert_eq!(word_step("", "("), WordStep::Unrelated);
    assert_eq!(word_step("", "  "), WordStep::Unrelated);
    assert_eq!(word_step("", "42"), WordStep::Unrelated);
}

#[test]
fn test_word_step_inside_word() {
    assert_eq!(
        word_step("cou", "nt"),
        WordStep::Extends {
            word: "count".to_string(),
            closed: false
        }
    );
    assert_eq!(
        word_step("cou", "nt;"),
        WordStep::Extends {
            word: "count".to_string(),
            closed: true
        }
    );
    assert_eq!(word_step("count", ")"), WordStep::Closes("count"));
}

#[test]
fn test_identifier_mask_forbids_unknown_words() {
    let vocab = StaticVocabulary::new(["alpha", "al", "beta", "(", " "]);
    let candidates: FxHashMap<String, f32> =
        [("alpha".to_string(), 1.5)].into_iter().collect();
    let mask = identifier_mask(&candidates, &state("x = "), &vocab);

    assert_eq!(legal_texts(&mask, &vocab), vec!["alpha", "al", "(", " "]);
    assert_eq!(mask.bias_for(vocab.id("al").unwrap()), 1.5);
    assert_eq!(mask.bias_for(vocab.id("(").unwrap()), 0.0);
}

#[test]
fn test_identifier_mask_closes_only_complete_candidates() {
    let vocab = StaticVocabulary::new(["ha", "ha(", ")", "("]);
    let candidates: FxHashMap<String, f32> = [("alpha".to_string(), 0.0)].into_iter().collect();

    // "alp" + "ha(" completes `alpha`; "alp" + ")" would close `alp`.
    let mask = identifier_mask(&candidates, &state("alp"), &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec!["ha", "ha("]);
}

#[test]
fn test_identifier_mask_gives_up_on_foreign_prefix() {
    let vocab = StaticVocabulary::new(["a", "b"]);
    let candidates: FxHashMap<String, f32> = [("alpha".to_string(), 0.0)].into_iter().collect();
    assert!(identifier_mask(&candidates, &state("zz"), &vocab).is_permissive());
}

// =============================================================================
// Syntactic
// =============================================================================

#[test]
fn test_syntactic_forbids_mismatched_closers() {
    let vocab = StaticVocabulary::new([")", "]", "])", "}", "x", "\")\""]);
    let constraint = SyntacticConstraint::new("brackets");
    let mask = constraint.evaluate(&state("f(a["), &vocab);

    assert_eq!(legal_texts(&mask, &vocab), vec!["]", "])", "x", "\")\""]);
    assert_eq!(constraint.kind(), ConstraintKind::Syntactic);
    assert_eq!(constraint.level(), ConstraintLevel::Syntactic);
}

#[test]
fn test_syntactic_ignores_brackets_in_strings() {
    let vocab = StaticVocabulary::new([")", "\""]);
    let mask = SyntacticConstraint::new("brackets").evaluate(&state("f(\"("), &vocab);
    assert!(mask.is_permissive());
}

#[test]
fn test_syntactic_unbalanced_prefix_only_applies_forbidden_texts() {
    let vocab = StaticVocabulary::new([")", "eval"]);
    let constraint = SyntacticConstraint::new("plain").forbid_text("eval");
    let mask = constraint.evaluate(&state("a)"), &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec![")"]);
}

#[test]
fn test_syntactic_without_balancing() {
    let vocab = StaticVocabulary::new([")"]);
    let constraint = SyntacticConstraint::new("free").with_bracket_balancing(false);
    assert!(constraint.evaluate(&state(""), &vocab).is_permissive());
    assert_eq!(constraint.to_grammar(), None);
    assert_eq!(
        SyntacticConstraint::new("g")
            .with_grammar("root ::= \"x\"")
            .to_grammar()
            .as_deref(),
        Some("root ::= \"x\"")
    );
}

#[test]
fn test_weight_is_clamped() {
    assert_eq!(SyntacticConstraint::new("w").with_weight(3.0).weight(), 1.0);
    assert_eq!(SyntacticConstraint::new("w").with_weight(-1.0).weight(), 0.0);
    assert_eq!(SyntacticConstraint::new("w").with_weight(f32::NAN).weight(), 0.0);
}

#[test]
fn test_zero_weight_switches_off_legality_constraints() {
    let vocab = StaticVocabulary::new([")", "12", "eval", "{"]);
    let opened = state("f[");

    let brackets = SyntacticConstraint::new("brackets");
    assert!(!brackets.evaluate(&opened, &vocab).is_permissive());
    assert!(!brackets.clone().with_weight(0.25).evaluate(&opened, &vocab).is_permissive());
    assert!(brackets.with_weight(0.0).evaluate(&opened, &vocab).is_permissive());

    let digits = PatternConstraint::allow(r"^\d+$").unwrap().with_weight(0.0);
    assert!(digits.evaluate(&state(""), &vocab).is_permissive());

    let object = SchemaConstraint::new(json!({ "type": "object" }))
        .unwrap()
        .with_weight(0.0);
    assert!(object.evaluate(&state(""), &vocab).is_permissive());

    let banned = SemanticConstraint::new()
        .ban_identifier("eval")
        .with_weight(0.0);
    assert!(banned.evaluate(&state("x = "), &vocab).is_permissive());
}

// =============================================================================
// Schema
// =============================================================================

#[test]
fn test_schema_restricts_first_token() {
    let vocab = StaticVocabulary::new(["{", " {", "[", "\"", " ", "}"]);
    let constraint = SchemaConstraint::new(json!({ "type": "object" })).unwrap();

    let mask = constraint.evaluate(&state(""), &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec!["{", " {", " "]);
    assert!(constraint.evaluate(&state("{"), &vocab).is_permissive());
    assert_eq!(constraint.kind(), ConstraintKind::Schema);
    assert_eq!(constraint.level(), ConstraintLevel::Syntactic);
    assert!(constraint.to_grammar().unwrap().starts_with("root ::= "));
}

#[test]
fn test_schema_first_chars_for_scalars() {
    let vocab = StaticVocabulary::new(["-", "7", "t", "n", "\"", "["]);

    let numbers = SchemaConstraint::new(json!({ "type": "number" })).unwrap();
    assert_eq!(legal_texts(&numbers.evaluate(&state(""), &vocab), &vocab), vec!["-", "7"]);

    let options = SchemaConstraint::new(json!({
        "anyOf": [{ "type": "boolean" }, { "enum": ["x"] }]
    }))
    .unwrap();
    assert_eq!(
        legal_texts(&options.evaluate(&state(""), &vocab), &vocab),
        vec!["t", "\""]
    );
}

#[test]
fn test_schema_rejects_unsupported() {
    assert!(matches!(
        SchemaConstraint::new(json!({ "type": "date" })),
        Err(ConstraintError::UnsupportedSchema { .. })
    ));
}

// =============================================================================
// Pattern
// =============================================================================

#[test]
fn test_pattern_allow_and_forbid() {
    let vocab = StaticVocabulary::new(["12", "ab", "3"]);

    let digits = PatternConstraint::allow(r"^\d+$").unwrap();
    assert_eq!(legal_texts(&digits.evaluate(&state(""), &vocab), &vocab), vec!["12", "3"]);
    assert_eq!(digits.mode(), PatternMode::Allow);
    assert_eq!(digits.pattern(), r"^\d+$");

    let no_digits = PatternConstraint::forbid(r"\d").unwrap();
    assert_eq!(legal_texts(&no_digits.evaluate(&state(""), &vocab), &vocab), vec!["ab"]);
}

#[test]
fn test_pattern_invalid_regex() {
    let err = PatternConstraint::allow("(unclosed").unwrap_err();
    assert!(matches!(err, ConstraintError::InvalidPattern { .. }));
    assert_eq!(err.to_string(), "invalid token pattern `(unclosed`");
    assert!(std::error::Error::source(&err).is_some());
}

// =============================================================================
// Type
// =============================================================================

#[test]
fn test_type_constraint_steers_toward_expected_type() {
    let vocab = StaticVocabulary::new([
        "n", "count", "user", "flag", "true", "(", " ", "cou", "xyz",
    ]);
    let constraint = TypeConstraint::new(&EngineConfig::default());
    let state = state_in("let x: number = ", users_context()).with_expected_type(Type::number());
    let mask = constraint.evaluate(&state, &vocab);

    assert_eq!(
        legal_texts(&mask, &vocab),
        vec!["n", "count", "user", "true", "(", " ", "cou"]
    );
    let (count, user) = (vocab.id("count").unwrap(), vocab.id("user").unwrap());
    // `count` is a direct variable; `user` needs a field access.
    assert_eq!(mask.bias_for(count), 2.0);
    assert!(mask.bias_for(user) > 0.0);
    assert!(mask.bias_for(user) < mask.bias_for(count));
    assert_eq!(mask.bias_for(vocab.id("true").unwrap()), 0.0);
}

#[test]
fn test_type_constraint_without_expected_type_is_permissive() {
    let vocab = StaticVocabulary::new(["xyz"]);
    let constraint = TypeConstraint::new(&EngineConfig::default());
    assert!(
        constraint
            .evaluate(&state_in("let x = ", users_context()), &vocab)
            .is_permissive()
    );
}

#[test]
fn test_type_constraint_unreachable_type_is_permissive() {
    let vocab = StaticVocabulary::new(["xyz"]);
    let constraint = TypeConstraint::new(&EngineConfig::default());
    let state = state_in("", users_context()).with_expected_type(Type::named("Order"));
    assert!(constraint.evaluate(&state, &vocab).is_permissive());
}

#[test]
fn test_type_constraint_member_access() {
    let vocab = StaticVocabulary::new(["name", "id", "nam", "active", "foo", "("]);
    let constraint = TypeConstraint::new(&EngineConfig::default());
    let state = state_in("user.", users_context()).with_receiver(Expr::ident("user"));

    let mask = constraint.evaluate(&state, &vocab);
    assert_eq!(
        legal_texts(&mask, &vocab),
        vec!["name", "id", "nam", "active", "("]
    );

    let wants_bool = state.with_expected_type(Type::boolean());
    let mask = constraint.evaluate(&wants_bool, &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec!["active", "("]);
}

#[test]
fn test_type_constraint_builtin_length_member() {
    let vocab = StaticVocabulary::new(["length", "size"]);
    let ctx = users_context().with_variable("items", Type::array(Type::string()));
    let state = state_in("items.", ctx).with_receiver(Expr::ident("items"));
    let mask = TypeConstraint::new(&EngineConfig::default()).evaluate(&state, &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec!["length"]);
}

#[test]
fn test_type_constraint_unresolved_receiver_is_permissive() {
    let vocab = StaticVocabulary::new(["name"]);
    let state = state_in("ghost.", users_context()).with_receiver(Expr::ident("ghost"));
    assert!(
        TypeConstraint::new(&EngineConfig::default())
            .evaluate(&state, &vocab)
            .is_permissive()
    );
}

// =============================================================================
// Semantic
// =============================================================================

#[test]
fn test_semantic_bans_whole_identifiers() {
    let vocab = StaticVocabulary::new(["eval", "eval(", "evaluate", " eval", "ev", "x"]);
    let constraint = SemanticConstraint::new().ban_identifier("eval");
    let mask = constraint.evaluate(&state("x = "), &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec!["evaluate", "ev", "x"]);
}

#[test]
fn test_semantic_bans_completion_of_partial_word() {
    let vocab = StaticVocabulary::new(["al(", "al", "ent"]);
    let constraint = SemanticConstraint::new().ban_identifier("eval");
    let mask = constraint.evaluate(&state("ev"), &vocab);
    assert_eq!(legal_texts(&mask, &vocab), vec!["al", "ent"]);
}

#[test]
fn test_semantic_require_declared() {
    let vocab = StaticVocabulary::new(["count", "cnt", "true", "console", "(", "co"]);
    let constraint = SemanticConstraint::new()
        .with_global("console")
        .require_declared(true);
    let ctx = TypeContext::new(Language::TypeScript).with_variable("count", Type::number());

    let mask = constraint.evaluate(&state_in("x = ", ctx.clone()), &vocab);
    assert_eq!(
        legal_texts(&mask, &vocab),
        vec!["count", "true", "console", "(", "co"]
    );

    // Member names are not checked against the scope.
    let mask = constraint.evaluate(&state_in("x.", ctx), &vocab);
    assert!(mask.is_permissive());
}

#[test]
fn test_semantic_default_is_permissive() {
    let vocab = StaticVocabulary::new(["anything"]);
    assert!(SemanticConstraint::default().evaluate(&state(""), &vocab).is_permissive());
}

// =============================================================================
// Contextual
// =============================================================================

#[test]
fn test_contextual_biases_and_bans() {
    let vocab = StaticVocabulary::new(["const", "co", "var", "debugger", "let", " const"]);
    let constraint = ContextualConstraint::new()
        .prefer("const")
        .discourage("var")
        .ban_text("debugger")
        .with_strength(2.0);
    let mask = constraint.evaluate(&state(""), &vocab);

    assert!(!mask.is_legal(vocab.id("debugger").unwrap()));
    assert_eq!(mask.allowed, None);
    assert_eq!(mask.bias_for(vocab.id("const").unwrap()), 2.0);
    assert_eq!(mask.bias_for(vocab.id("co").unwrap()), 2.0);
    assert_eq!(mask.bias_for(vocab.id(" const").unwrap()), 2.0);
    assert_eq!(mask.bias_for(vocab.id("var").unwrap()), -2.0);
    assert_eq!(mask.bias_for(vocab.id("let").unwrap()), 0.0);
}

#[test]
fn test_contextual_weight_scales_bias() {
    let vocab = StaticVocabulary::new(["const"]);
    let mask = ContextualConstraint::new()
        .prefer("const")
        .with_weight(0.5)
        .evaluate(&state(""), &vocab);
    assert_eq!(mask.bias_for(TokenId(0)), 0.5);
}

#[test]
fn test_contextual_length_budget() {
    let vocab = StaticVocabulary::new([";", "x", "\n"]);
    let constraint = ContextualConstraint::new().with_length_budget(10, [";", "\n"]);

    let under = constraint.evaluate(&state("").with_token_count(9), &vocab);
    assert!(under.is_permissive());

    let over = constraint.evaluate(&state("").with_token_count(10), &vocab);
    assert_eq!(legal_texts(&over, &vocab), vec![";", "\n"]);
}

#[test]
fn test_cache_keys_follow_configuration() {
    let a = ContextualConstraint::new().prefer("const");
    let b = ContextualConstraint::new().prefer("const");
    let c = ContextualConstraint::new().prefer("let");
    assert_eq!(a.cache_key(), b.cache_key());
    assert_ne!(a.cache_key(), c.cache_key());
    assert_ne!(
        SemanticConstraint::new().cache_key(),
        SemanticConstraint::new().require_declared(true).cache_key()
    );
}

#[test]
fn test_type_constraint_under_typescript_rules() {
    let vocab = StaticVocabulary::new(["n", "flag"]);
    let constraint = TypeConstraint::new(&EngineConfig::default())
        .with_relation(Arc::new(tgen_lang::TypeScriptTypeSystem::new()));
    let state = state_in("", users_context()).with_expected_type(Type::number());
    assert_eq!(
        legal_texts(&constraint.evaluate(&state, &vocab), &vocab),
        vec!["n"]
    );
}

#[test]
fn test_type_constraint_cache_key_tracks_rules_and_bounds() {
    let config = EngineConfig::default();
    let structural = TypeConstraint::new(&config);
    let typescript = TypeConstraint::new(&config)
        .with_relation(Arc::new(tgen_lang::TypeScriptTypeSystem::new()));
    let lenient = TypeConstraint::new(&config).with_relation(Arc::new(
        tgen_lang::TypeScriptTypeSystem::new().with_strict_null_checks(false),
    ));
    let shallow = TypeConstraint::new(&EngineConfig {
        complexity_slack: 0,
        ..config.clone()
    });

    assert_eq!(structural.cache_key(), TypeConstraint::new(&config).cache_key());
    assert_ne!(structural.cache_key(), typescript.cache_key());
    assert_ne!(typescript.cache_key(), lenient.cache_key());
    assert_ne!(structural.cache_key(), shallow.cache_key());
}
