use super::*;

fn string_or_number() -> Type {
    Type::union(vec![Type::string(), Type::number()])
}

#[test]
fn test_typeof_keeps_matching_member() {
    assert_eq!(
        narrow(&string_or_number(), "typeof x === \"string\""),
        Type::string()
    );
    assert_eq!(
        narrow(&string_or_number(), "typeof value == 'number'"),
        Type::number()
    );
}

#[test]
fn test_typeof_negated_removes_member() {
    assert_eq!(
        narrow(&string_or_number(), "typeof x !== 'string'"),
        Type::number()
    );
    assert_eq!(
        narrow(&string_or_number(), "!(typeof x === 'string')"),
        Type::number()
    );
}

#[test]
fn test_typeof_matches_literal_members() {
    let ty = Type::union(vec![Type::named("'a'"), Type::named("1")]);
    assert_eq!(narrow(&ty, "typeof x === 'string'"), Type::named("'a'"));
}

#[test]
fn test_typeof_drops_nullability() {
    let ty = Type::string().as_nullable();
    assert_eq!(narrow(&ty, "typeof x === 'string'"), Type::string());
}

#[test]
fn test_typeof_object_includes_null() {
    let ty = Type::union(vec![Type::string(), Type::named("User")]).as_nullable();
    assert_eq!(
        narrow(&ty, "typeof x === 'object'"),
        Type::named("User").as_nullable()
    );
}

#[test]
fn test_typeof_function() {
    let callback = Type::function(vec![], Type::void());
    let ty = Type::union(vec![callback.clone(), Type::string()]);
    assert_eq!(narrow(&ty, "typeof cb === 'function'"), callback);
}

#[test]
fn test_typeof_on_unknown_proves_the_tag() {
    assert_eq!(narrow(&Type::unknown(), "typeof x === 'number'"), Type::number());
    assert_eq!(narrow(&Type::unknown(), "typeof x !== 'number'"), Type::unknown());
}

#[test]
fn test_typeof_with_no_match_is_never() {
    assert_eq!(narrow(&Type::string(), "typeof x === 'number'"), Type::never());
}

#[test]
fn test_instanceof() {
    let ty = Type::union(vec![Type::named("Date"), Type::string()]);
    assert_eq!(narrow(&ty, "x instanceof Date"), Type::named("Date"));
    assert_eq!(narrow(&ty, "!(x instanceof Date)"), Type::string());
}

#[test]
fn test_instanceof_subclass_of_object_member() {
    assert_eq!(
        narrow(&Type::named("Animal"), "pet instanceof Dog"),
        Type::named("Dog")
    );
    assert_eq!(narrow(&Type::string(), "s instanceof Dog"), Type::never());
    assert_eq!(narrow(&Type::unknown(), "e instanceof Error"), Type::named("Error"));
}

#[test]
fn test_null_comparisons() {
    let ty = Type::named("User").as_nullable();
    assert_eq!(narrow(&ty, "user !== null"), Type::named("User"));
    assert_eq!(narrow(&ty, "user != undefined"), Type::named("User"));
    assert_eq!(narrow(&ty, "user === null"), Type::null());
    assert_eq!(narrow(&ty, "user === undefined"), Type::undefined());
    assert_eq!(narrow(&Type::named("User"), "user == null"), Type::never());
}

#[test]
fn test_array_is_array() {
    let ty = Type::union(vec![Type::array(Type::string()), Type::string()]);
    assert_eq!(
        narrow(&ty, "Array.isArray(input)"),
        Type::array(Type::string())
    );
    assert_eq!(narrow(&ty, "!Array.isArray(input)"), Type::string());
    assert_eq!(
        narrow(&Type::unknown(), "Array.isArray(input)"),
        Type::array(Type::unknown())
    );
}

#[test]
fn test_truthiness() {
    let ty = Type::named("User").as_nullable();
    assert_eq!(narrow(&ty, "user"), Type::named("User"));
    assert_eq!(narrow(&ty, "!!user"), Type::named("User"));
    assert_eq!(narrow(&ty, "!user"), Type::null());
    assert_eq!(narrow(&ty, "(user)"), Type::named("User"));
}

#[test]
fn test_falsy_keeps_falsy_primitives() {
    let ty = Type::union(vec![Type::string(), Type::named("User")]).as_nullable();
    assert_eq!(narrow(&ty, "!name"), Type::string().as_nullable());
}

#[test]
fn test_member_mention_fallback() {
    let ty = Type::union(vec![Type::named("Circle"), Type::named("Square")]);
    assert_eq!(
        narrow(&ty, "isCircle(shape) as Circle"),
        Type::named("Circle")
    );
    // Identifier boundaries: `Squares` is not `Square`.
    assert_eq!(narrow(&ty, "hasSquares(shape)"), ty);
}

#[test]
fn test_unrecognized_guard_leaves_type_unchanged() {
    let ty = string_or_number();
    assert_eq!(narrow(&ty, "x > 3"), ty);
    assert_eq!(narrow(&Type::number(), "a && b"), Type::number());
}

#[test]
fn test_strip_negation() {
    assert_eq!(strip_negation("!(a)"), (true, "a"));
    assert_eq!(strip_negation("!(!(a))"), (false, "a"));
    assert_eq!(strip_negation("(a) && (b)"), (false, "(a) && (b)"));
    assert_eq!(strip_negation("!a"), (false, "!a"));
}

#[test]
fn test_mentions_word() {
    assert!(mentions_word("x is Foo", "Foo"));
    assert!(!mentions_word("x is FooBar", "Foo"));
    assert!(!mentions_word("anything", ""));
}
