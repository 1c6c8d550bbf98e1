use super::*;

#[test]
fn test_identity_and_top_types() {
    assert!(is_assignable(&Type::string(), &Type::string()));
    assert!(is_assignable(&Type::string(), &Type::unknown()));
    assert!(is_assignable(&Type::unknown(), &Type::number()));
    assert!(is_assignable(&Type::any(), &Type::named("User")));
    assert!(!is_assignable(&Type::string(), &Type::number()));
}

#[test]
fn test_nullable_source_needs_exact_target() {
    let nullable = Type::string().as_nullable();
    assert!(!is_assignable(&nullable, &Type::number()));
    // The structural rule only lets `T?` through when stripping the flag
    // yields the target exactly.
    assert!(is_assignable(&nullable, &Type::string()));
    assert!(!is_assignable(
        &Type::array(Type::string()).as_nullable(),
        &Type::array(Type::unknown())
    ));
}

#[test]
fn test_non_nullable_source_to_nullable_target() {
    assert!(is_assignable(&Type::string(), &Type::string().as_nullable()));
    assert!(is_assignable(
        &Type::array(Type::string()),
        &Type::array(Type::unknown()).as_nullable()
    ));
    assert!(!is_assignable(&Type::number(), &Type::string().as_nullable()));
}

#[test]
fn test_both_nullable_compare_non_null_forms() {
    assert!(is_assignable(
        &Type::named("User").as_nullable(),
        &Type::named("User").as_nullable()
    ));
    assert!(is_assignable(
        &Type::array(Type::number()).as_nullable(),
        &Type::array(Type::unknown()).as_nullable()
    ));
}

#[test]
fn test_generic_arguments_are_covariant() {
    assert!(is_assignable(
        &Type::array(Type::number()),
        &Type::array(Type::any())
    ));
    assert!(!is_assignable(
        &Type::array(Type::number()),
        &Type::array(Type::string())
    ));
    assert!(!is_assignable(
        &Type::generic("Map", vec![Type::string()]),
        &Type::generic("Map", vec![Type::string(), Type::number()])
    ));
}

#[test]
fn test_distinct_names_are_unrelated() {
    assert!(!is_assignable(&Type::named("Dog"), &Type::named("Animal")));
    assert!(!is_assignable(
        &Type::array(Type::number()),
        &Type::tuple(vec![Type::number()])
    ));
}

/// A relation that treats every `Dog` as an `Animal`, to check that the
/// structural rule recurses through the relation it is handed.
struct NominalDogs;

impl TypeRelation for NominalDogs {
    fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        if source.name() == "Dog" && target.name() == "Animal" {
            return true;
        }
        is_structurally_assignable(self, source, target)
    }
}

#[test]
fn test_recursion_goes_through_custom_relation() {
    let relation = NominalDogs;
    assert!(relation.is_assignable(
        &Type::array(Type::named("Dog")),
        &Type::array(Type::named("Animal"))
    ));
    assert!(!StructuralRelation.is_assignable(
        &Type::array(Type::named("Dog")),
        &Type::array(Type::named("Animal"))
    ));
}
