//! Universal type representation.
//!
//! A [`Type`] is a name, an ordered list of parameter types and a nullability
//! flag. The meaning of the parameters is fixed by the name:
//!
//! | name           | parameters                                  |
//! |----------------|---------------------------------------------|
//! | `function`     | argument types followed by the return type  |
//! | `Array`        | the element type                            |
//! | `union`        | the members                                 |
//! | `intersection` | the members                                 |
//! | `tuple`        | the element types                           |
//! | anything else  | generic arguments (empty for ground types)  |
//!
//! Types also carry an open `metadata` map for annotations produced by
//! collaborators (object-literal shapes, source spans, provenance). Metadata
//! never participates in equality or hashing: two types with the same shape
//! compare equal and share cache entries regardless of their annotations.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

pub const UNKNOWN: &str = "unknown";
pub const ANY: &str = "any";
pub const NEVER: &str = "never";
pub const FUNCTION: &str = "function";
pub const ARRAY: &str = "Array";
pub const UNION: &str = "union";
pub const INTERSECTION: &str = "intersection";
pub const TUPLE: &str = "tuple";
pub const OBJECT: &str = "object";
pub const NULL: &str = "null";
pub const UNDEFINED: &str = "undefined";
pub const VOID: &str = "void";
pub const STRING: &str = "string";
pub const NUMBER: &str = "number";
pub const BOOLEAN: &str = "boolean";
pub const BIGINT: &str = "bigint";
pub const SYMBOL: &str = "symbol";

/// Names that are never treated as unification variables.
pub const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    STRING,
    NUMBER,
    BOOLEAN,
    BIGINT,
    SYMBOL,
    NULL,
    UNDEFINED,
    VOID,
    ANY,
    UNKNOWN,
    NEVER,
    OBJECT,
    FUNCTION,
    ARRAY,
    UNION,
    INTERSECTION,
    TUPLE,
    "true",
    "false",
    "int",
    "float",
    "str",
    "bool",
    "char",
    "Promise",
    "Map",
    "Set",
    "Record",
    "Date",
    "RegExp",
    "Error",
];

/// Metadata key under which object-literal property types are recorded.
pub const PROPERTIES_METADATA_KEY: &str = "properties";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Type {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<Type>,
    #[serde(default)]
    nullable: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    metadata: IndexMap<String, serde_json::Value>,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.nullable == other.nullable
            && self.name == other.name
            && self.parameters == other.parameters
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.parameters.hash(state);
        self.nullable.hash(state);
    }
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type {
            name: name.into(),
            parameters: Vec::new(),
            nullable: false,
            metadata: IndexMap::new(),
        }
    }

    pub fn generic(name: impl Into<String>, parameters: Vec<Type>) -> Self {
        Type {
            parameters,
            ..Type::named(name)
        }
    }

    pub fn unknown() -> Self {
        Type::named(UNKNOWN)
    }

    pub fn any() -> Self {
        Type::named(ANY)
    }

    pub fn never() -> Self {
        Type::named(NEVER)
    }

    pub fn string() -> Self {
        Type::named(STRING)
    }

    pub fn number() -> Self {
        Type::named(NUMBER)
    }

    pub fn boolean() -> Self {
        Type::named(BOOLEAN)
    }

    pub fn void() -> Self {
        Type::named(VOID)
    }

    pub fn null() -> Self {
        Type::named(NULL).as_nullable()
    }

    pub fn undefined() -> Self {
        Type::named(UNDEFINED).as_nullable()
    }

    pub fn object() -> Self {
        Type::named(OBJECT)
    }

    /// `object` recording the types of its properties in declaration order.
    /// Without properties this is plain `object`.
    pub fn object_with_properties<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (String, Type)>,
    {
        let properties: serde_json::Map<String, serde_json::Value> = properties
            .into_iter()
            .filter_map(|(name, ty)| serde_json::to_value(&ty).ok().map(|ty| (name, ty)))
            .collect();
        if properties.is_empty() {
            return Type::object();
        }
        Type::object().with_metadata(
            PROPERTIES_METADATA_KEY,
            serde_json::Value::Object(properties),
        )
    }

    pub fn array(element: Type) -> Self {
        Type::generic(ARRAY, vec![element])
    }

    pub fn tuple(elements: Vec<Type>) -> Self {
        Type::generic(TUPLE, elements)
    }

    /// Function type; the return type is stored as the last parameter.
    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        let mut parameters = params;
        parameters.push(ret);
        Type::generic(FUNCTION, parameters)
    }

    /// Raw union with no simplification. Language plugins provide
    /// `resolve_union` for the normalized form.
    pub fn union(members: Vec<Type>) -> Self {
        Type::generic(UNION, members)
    }

    /// Raw intersection with no simplification.
    pub fn intersection(members: Vec<Type>) -> Self {
        Type::generic(INTERSECTION, members)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Type] {
        &self.parameters
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn metadata(&self) -> &IndexMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Property types recorded by [`Type::object_with_properties`].
    pub fn object_properties(&self) -> Vec<(String, Type)> {
        let Some(properties) = self
            .metadata_value(PROPERTIES_METADATA_KEY)
            .and_then(serde_json::Value::as_object)
        else {
            return Vec::new();
        };
        properties
            .iter()
            .filter_map(|(name, ty)| {
                let ty = Type::deserialize(ty).ok()?;
                Some((name.clone(), ty))
            })
            .collect()
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn as_nullable(self) -> Self {
        self.with_nullable(true)
    }

    /// The same type with the nullability flag cleared.
    pub fn non_null(&self) -> Self {
        self.clone().with_nullable(false)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN
    }

    pub fn is_any(&self) -> bool {
        self.name == ANY
    }

    /// `unknown` or `any`.
    pub fn is_top(&self) -> bool {
        self.is_unknown() || self.is_any()
    }

    pub fn is_never(&self) -> bool {
        self.name == NEVER
    }

    pub fn is_function(&self) -> bool {
        self.name == FUNCTION && !self.parameters.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.name == ARRAY
    }

    pub fn is_union(&self) -> bool {
        self.name == UNION
    }

    pub fn is_intersection(&self) -> bool {
        self.name == INTERSECTION
    }

    pub fn is_tuple(&self) -> bool {
        self.name == TUPLE
    }

    pub fn is_generic(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// `null`, `undefined` or `void`.
    pub fn is_nullish(&self) -> bool {
        matches!(self.name.as_str(), NULL | UNDEFINED | VOID)
    }

    /// Whether the name is a literal (`"a"`, `42`, `true`, `` `x${string}` ``)
    /// rather than an identifier.
    pub fn is_literal(&self) -> bool {
        if !self.parameters.is_empty() {
            return false;
        }
        let name = self.name.as_str();
        if name == "true" || name == "false" {
            return true;
        }
        match name.chars().next() {
            Some('"' | '\'' | '`') => true,
            Some(c) if c.is_ascii_digit() || c == '-' => true,
            _ => false,
        }
    }

    /// Argument types of a function type.
    pub fn function_params(&self) -> &[Type] {
        if self.is_function() {
            &self.parameters[..self.parameters.len() - 1]
        } else {
            &[]
        }
    }

    /// Return type of a function type.
    pub fn function_return(&self) -> Option<&Type> {
        if self.is_function() {
            self.parameters.last()
        } else {
            None
        }
    }

    /// Element type of `Array<T>`.
    pub fn element_type(&self) -> Option<&Type> {
        if self.is_array() {
            self.parameters.first()
        } else {
            None
        }
    }

    /// `1 + sum(complexity(param))`.
    pub fn complexity(&self) -> u32 {
        1 + self
            .parameters
            .iter()
            .map(Type::complexity)
            .fold(0u32, u32::saturating_add)
    }

    /// Structural equality that ignores nullability at every level.
    pub fn matches_ignoring_nullability(&self, other: &Type) -> bool {
        self.name == other.name
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.matches_ignoring_nullability(b))
    }

    /// Whether `name` occurs anywhere in this type, including itself.
    pub fn mentions(&self, name: &str) -> bool {
        self.name == name || self.parameters.iter().any(|p| p.mentions(name))
    }

    /// Replace every occurrence of a mapped name.
    ///
    /// Parameters are substituted recursively; a type whose own name is a key
    /// is replaced outright by the mapped type. The replacement keeps the
    /// nullability of the occurrence it replaces, so `T?` under `T -> number`
    /// becomes `number?`. Metadata of replaced occurrences is dropped.
    pub fn substitute(&self, mapping: &FxHashMap<String, Type>) -> Type {
        if mapping.is_empty() {
            return self.clone();
        }
        if let Some(replacement) = mapping.get(&self.name) {
            let nullable = replacement.nullable || self.nullable;
            return replacement.clone().with_nullable(nullable);
        }
        if self.parameters.is_empty() {
            return self.clone();
        }
        Type {
            name: self.name.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|p| p.substitute(mapping))
                .collect(),
            nullable: self.nullable,
            metadata: self.metadata.clone(),
        }
    }
}

/// A generic type variable with optional bound and default.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeVariable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Type>,
}

impl TypeVariable {
    pub fn new(name: impl Into<String>) -> Self {
        TypeVariable {
            name: name.into(),
            bound: None,
            default: None,
        }
    }

    pub fn with_bound(mut self, bound: Type) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_default(mut self, default: Type) -> Self {
        self.default = Some(default);
        self
    }

    pub fn to_type(&self) -> Type {
        Type::named(self.name.clone())
    }
}

/// A named, typed formal parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub optional: bool,
    /// Source text of the default value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        TypeParameter {
            name: name.into(),
            ty,
            optional: false,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self.optional = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub parameters: Vec<TypeParameter>,
    pub return_type: Type,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<TypeVariable>,
    /// Declared exception types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<Type>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, parameters: Vec<TypeParameter>, return_type: Type) -> Self {
        FunctionSignature {
            name: name.into(),
            parameters,
            return_type,
            generic_parameters: Vec::new(),
            throws: Vec::new(),
            is_async: false,
            is_generator: false,
        }
    }

    pub fn with_generics(mut self, generics: Vec<TypeVariable>) -> Self {
        self.generic_parameters = generics;
        self
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    /// Number of parameters a caller must supply.
    pub fn required_arity(&self) -> usize {
        self.parameters.iter().filter(|p| !p.optional).count()
    }

    /// Callable with exactly one argument.
    pub fn accepts_single_argument(&self) -> bool {
        !self.parameters.is_empty() && self.required_arity() <= 1
    }

    /// Flatten into a `function` type: parameter types followed by the
    /// return type.
    pub fn to_type(&self) -> Type {
        Type::function(
            self.parameters.iter().map(|p| p.ty.clone()).collect(),
            self.return_type.clone(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassType {
    pub name: String,
    #[serde(default)]
    pub properties: IndexMap<String, Type>,
    #[serde(default)]
    pub methods: IndexMap<String, FunctionSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<TypeVariable>,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        ClassType {
            name: name.into(),
            ..ClassType::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    pub fn with_method(mut self, method: FunctionSignature) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_generics(mut self, generics: Vec<TypeVariable>) -> Self {
        self.generic_parameters = generics;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
    #[serde(default)]
    pub properties: IndexMap<String, Type>,
    #[serde(default)]
    pub methods: IndexMap<String, FunctionSignature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<TypeVariable>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceType {
            name: name.into(),
            ..InterfaceType::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    pub fn with_method(mut self, method: FunctionSignature) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn extends(mut self, interface: impl Into<String>) -> Self {
        self.extends.push(interface.into());
        self
    }

    pub fn with_generics(mut self, generics: Vec<TypeVariable>) -> Self {
        self.generic_parameters = generics;
        self
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
