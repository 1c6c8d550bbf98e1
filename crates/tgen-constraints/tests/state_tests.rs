use super::*;

fn state(text: &str) -> GenerationState {
    GenerationState::new(text, Arc::new(TypeContext::new(Language::TypeScript)))
}

#[test]
fn test_new_state_cursor_at_end() {
    let s = state("let x = ");
    assert_eq!(s.cursor, 8);
    assert_eq!(s.prefix(), "let x = ");
    assert_eq!(s.language, Language::TypeScript);
    assert_eq!(s.token_count, 0);
}

#[test]
fn test_language_follows_context() {
    let ctx = Arc::new(TypeContext::new(Language::JavaScript));
    assert_eq!(GenerationState::new("", ctx).language, Language::JavaScript);
}

#[test]
fn test_prefix_respects_cursor() {
    let s = state("foo(bar)").with_cursor(4);
    assert_eq!(s.prefix(), "foo(");
    assert_eq!(state("abc").with_cursor(99).prefix(), "abc");
}

#[test]
fn test_prefix_clamps_to_char_boundary() {
    // `é` is two bytes; a cursor inside it backs off.
    let s = state("aé").with_cursor(2);
    assert_eq!(s.prefix(), "a");
}

#[test]
fn test_current_word() {
    assert_eq!(state("return user").current_word(), "user");
    assert_eq!(state("user.na").current_word(), "na");
    assert_eq!(state("f(").current_word(), "");
    assert_eq!(state("").current_word(), "");
    assert_eq!(state("$el_2").current_word(), "$el_2");
}

#[test]
fn test_after_member_dot() {
    assert!(state("user.").after_member_dot());
    assert!(state("user.na").after_member_dot());
    assert!(!state("user").after_member_dot());
    assert!(!state("[...").after_member_dot());
    assert!(!state("x = ").after_member_dot());
}

#[test]
fn test_builders() {
    let s = state("a.")
        .with_receiver(Expr::ident("a"))
        .with_expected_type(Type::number())
        .with_token_count(3)
        .with_language(Language::Python)
        .with_metadata("file", serde_json::json!("main.ts"));
    assert_eq!(s.receiver, Some(Expr::ident("a")));
    assert_eq!(s.expected_type, Some(Type::number()));
    assert_eq!(s.token_count, 3);
    assert_eq!(s.language, Language::Python);
    assert_eq!(s.metadata["file"], "main.ts");
}
