//! Visible-symbol environment.
//!
//! A [`TypeContext`] is populated once per file or generation session by an
//! external indexer. It is read-mostly: sessions that want to add bindings
//! (speculative scopes, function-literal parameters) clone it first and
//! mutate the clone, and scopes are combined with the right-biased
//! [`TypeContext::merge`].

use crate::types::{self, ClassType, FunctionSignature, InterfaceType, Type};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tgen_common::Language;

/// Maximum alias or inheritance chain followed before giving up.
const MAX_CHAIN_LENGTH: usize = 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeContext {
    pub variables: IndexMap<String, Type>,
    pub functions: IndexMap<String, FunctionSignature>,
    pub classes: IndexMap<String, ClassType>,
    pub interfaces: IndexMap<String, InterfaceType>,
    pub type_aliases: IndexMap<String, Type>,
    /// Local binding name -> module specifier.
    pub imports: IndexMap<String, String>,
    pub language: Language,
    /// Null-checking mode for relations that support both. On by default.
    pub strict: bool,
}

impl Default for TypeContext {
    fn default() -> Self {
        TypeContext {
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            classes: IndexMap::new(),
            interfaces: IndexMap::new(),
            type_aliases: IndexMap::new(),
            imports: IndexMap::new(),
            language: Language::default(),
            strict: true,
        }
    }
}

/// A member resolved on a receiver type.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: Type,
    pub is_method: bool,
}

impl TypeContext {
    pub fn new(language: Language) -> Self {
        TypeContext {
            language,
            ..TypeContext::default()
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.add_variable(name, ty);
        self
    }

    pub fn with_function(mut self, signature: FunctionSignature) -> Self {
        self.add_function(signature);
        self
    }

    pub fn with_class(mut self, class: ClassType) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_interface(mut self, interface: InterfaceType) -> Self {
        self.add_interface(interface);
        self
    }

    pub fn with_alias(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.type_aliases.insert(name.into(), ty);
        self
    }

    pub fn with_import(mut self, local: impl Into<String>, module: impl Into<String>) -> Self {
        self.imports.insert(local.into(), module.into());
        self
    }

    pub fn add_variable(&mut self, name: impl Into<String>, ty: Type) {
        self.variables.insert(name.into(), ty);
    }

    pub fn add_function(&mut self, signature: FunctionSignature) {
        self.functions.insert(signature.name.clone(), signature);
    }

    pub fn add_class(&mut self, class: ClassType) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn add_interface(&mut self, interface: InterfaceType) {
        self.interfaces.insert(interface.name.clone(), interface);
    }

    /// Resolve a name across the symbol tables.
    ///
    /// Priority: variable, function (as a function type), class or interface
    /// (as a nominal type), type alias.
    pub fn lookup(&self, name: &str) -> Option<Type> {
        if let Some(ty) = self.variables.get(name) {
            return Some(ty.clone());
        }
        if let Some(signature) = self.functions.get(name) {
            return Some(signature.to_type());
        }
        if self.classes.contains_key(name) || self.interfaces.contains_key(name) {
            return Some(Type::named(name));
        }
        self.type_aliases.get(name).cloned()
    }

    /// Whether `name` is bound in any table, including imports.
    pub fn is_declared(&self, name: &str) -> bool {
        self.variables.contains_key(name)
            || self.functions.contains_key(name)
            || self.classes.contains_key(name)
            || self.interfaces.contains_key(name)
            || self.type_aliases.contains_key(name)
            || self.imports.contains_key(name)
    }

    /// Every name a generated identifier could legally refer to.
    pub fn symbol_names(&self) -> impl Iterator<Item = &str> {
        self.variables
            .keys()
            .chain(self.functions.keys())
            .chain(self.classes.keys())
            .chain(self.interfaces.keys())
            .chain(self.imports.keys())
            .map(String::as_str)
    }

    /// Whether the type names a known class or interface.
    pub fn is_aggregate(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.interfaces.contains_key(name)
    }

    /// Follow alias chains until a non-alias type is reached.
    pub fn resolve_alias(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        for _ in 0..MAX_CHAIN_LENGTH {
            if current.is_generic() {
                break;
            }
            match self.type_aliases.get(current.name()) {
                Some(target) if target != &current => {
                    let nullable = target.is_nullable() || current.is_nullable();
                    current = target.clone().with_nullable(nullable);
                }
                _ => break,
            }
        }
        current
    }

    /// Type of property `name` on `receiver`, searching superclasses and
    /// extended interfaces and instantiating generic aggregates.
    pub fn property_type(&self, receiver: &Type, name: &str) -> Option<Type> {
        self.members_of(receiver)
            .into_iter()
            .find(|m| m.name == name)
            .map(|m| m.ty)
    }

    /// Signature of method `name` on `receiver`, instantiated for generic
    /// receivers.
    pub fn method_signature(&self, receiver: &Type, name: &str) -> Option<FunctionSignature> {
        let receiver = self.resolve_alias(receiver);
        let mut visited = FxHashSet::default();
        let mut queue = vec![(receiver.name().to_string(), self.receiver_mapping(&receiver))];
        while let Some((aggregate, mapping)) = queue.pop() {
            if !visited.insert(aggregate.clone()) || visited.len() > MAX_CHAIN_LENGTH {
                continue;
            }
            let (methods, parents) = match self.aggregate_parts(&aggregate) {
                Some(parts) => parts,
                None => continue,
            };
            if let Some(signature) = methods.get(name) {
                let mut signature = signature.clone();
                for param in &mut signature.parameters {
                    param.ty = param.ty.substitute(&mapping);
                }
                signature.return_type = signature.return_type.substitute(&mapping);
                return Some(signature);
            }
            for parent in parents.into_iter().rev() {
                queue.push((parent, mapping.clone()));
            }
        }
        None
    }

    /// Properties and methods visible on `receiver`, own members first.
    ///
    /// Methods are reported as function types. Members shadowed by a subtype
    /// are not repeated.
    pub fn members_of(&self, receiver: &Type) -> Vec<Member> {
        let receiver = self.resolve_alias(receiver);
        let mut members: IndexMap<String, Member> = IndexMap::new();
        let mut visited = FxHashSet::default();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((receiver.name().to_string(), self.receiver_mapping(&receiver)));

        while let Some((aggregate, mapping)) = queue.pop_front() {
            if !visited.insert(aggregate.clone()) || visited.len() > MAX_CHAIN_LENGTH {
                continue;
            }
            let (properties, methods, parents) = if let Some(class) = self.classes.get(&aggregate) {
                let mut parents: Vec<String> = class.superclass.iter().cloned().collect();
                parents.extend(class.interfaces.iter().cloned());
                (&class.properties, &class.methods, parents)
            } else if let Some(interface) = self.interfaces.get(&aggregate) {
                (
                    &interface.properties,
                    &interface.methods,
                    interface.extends.clone(),
                )
            } else {
                continue;
            };

            for (name, ty) in properties {
                members.entry(name.clone()).or_insert_with(|| Member {
                    name: name.clone(),
                    ty: ty.substitute(&mapping),
                    is_method: false,
                });
            }
            for (name, signature) in methods {
                members.entry(name.clone()).or_insert_with(|| Member {
                    name: name.clone(),
                    ty: signature.to_type().substitute(&mapping),
                    is_method: true,
                });
            }
            for parent in parents {
                queue.push_back((parent, mapping.clone()));
            }
        }

        members.into_values().collect()
    }

    /// Right-biased merge: bindings in `other` overwrite bindings here.
    pub fn merge(&mut self, other: &TypeContext) {
        self.variables.extend(other.variables.clone());
        self.functions.extend(other.functions.clone());
        self.classes.extend(other.classes.clone());
        self.interfaces.extend(other.interfaces.clone());
        self.type_aliases.extend(other.type_aliases.clone());
        self.imports.extend(other.imports.clone());
        self.language = other.language;
        self.strict = other.strict;
    }

    /// Non-mutating form of [`merge`](Self::merge).
    pub fn merged(&self, other: &TypeContext) -> TypeContext {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Copy of this context with extra variable bindings layered on top.
    pub fn with_scope<I>(&self, bindings: I) -> TypeContext
    where
        I: IntoIterator<Item = (String, Type)>,
    {
        let mut scope = self.clone();
        scope.variables.extend(bindings);
        scope
    }

    /// Deterministic hash over every symbol shape.
    ///
    /// Two contexts with the same bindings in the same order hash equally.
    /// Used as a cache-key component only.
    pub fn shape_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.language.hash(&mut hasher);
        self.strict.hash(&mut hasher);

        self.variables.len().hash(&mut hasher);
        for (name, ty) in &self.variables {
            name.hash(&mut hasher);
            ty.hash(&mut hasher);
        }
        self.functions.len().hash(&mut hasher);
        for signature in self.functions.values() {
            signature.hash(&mut hasher);
        }
        self.classes.len().hash(&mut hasher);
        for class in self.classes.values() {
            class.name.hash(&mut hasher);
            hash_members(&mut hasher, &class.properties, &class.methods);
            class.superclass.hash(&mut hasher);
            class.interfaces.hash(&mut hasher);
            class.generic_parameters.hash(&mut hasher);
        }
        self.interfaces.len().hash(&mut hasher);
        for interface in self.interfaces.values() {
            interface.name.hash(&mut hasher);
            hash_members(&mut hasher, &interface.properties, &interface.methods);
            interface.extends.hash(&mut hasher);
            interface.generic_parameters.hash(&mut hasher);
        }
        self.type_aliases.len().hash(&mut hasher);
        for (name, ty) in &self.type_aliases {
            name.hash(&mut hasher);
            ty.hash(&mut hasher);
        }
        self.imports.len().hash(&mut hasher);
        for (local, module) in &self.imports {
            local.hash(&mut hasher);
            module.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Substitution from an aggregate's declared generic parameters to the
    /// receiver's type arguments.
    fn receiver_mapping(&self, receiver: &Type) -> FxHashMap<String, Type> {
        let declared = if let Some(class) = self.classes.get(receiver.name()) {
            &class.generic_parameters
        } else if let Some(interface) = self.interfaces.get(receiver.name()) {
            &interface.generic_parameters
        } else {
            return FxHashMap::default();
        };
        if declared.len() != receiver.parameters().len() {
            return FxHashMap::default();
        }
        declared
            .iter()
            .map(|var| var.name.clone())
            .zip(receiver.parameters().iter().cloned())
            .collect()
    }

    fn aggregate_parts(
        &self,
        name: &str,
    ) -> Option<(&IndexMap<String, FunctionSignature>, Vec<String>)> {
        if let Some(class) = self.classes.get(name) {
            let mut parents: Vec<String> = class.superclass.iter().cloned().collect();
            parents.extend(class.interfaces.iter().cloned());
            return Some((&class.methods, parents));
        }
        self.interfaces
            .get(name)
            .map(|interface| (&interface.methods, interface.extends.clone()))
    }
}

fn hash_members(
    hasher: &mut FxHasher,
    properties: &IndexMap<String, Type>,
    methods: &IndexMap<String, FunctionSignature>,
) {
    properties.len().hash(hasher);
    for (name, ty) in properties {
        name.hash(hasher);
        ty.hash(hasher);
    }
    methods.len().hash(hasher);
    for signature in methods.values() {
        signature.hash(hasher);
    }
}

/// Builtin members every language plugin agrees on.
pub fn builtin_member(receiver: &Type, name: &str) -> Option<Type> {
    match (receiver.name(), name) {
        (types::ARRAY | types::TUPLE | types::STRING, "length") => Some(Type::number()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod tests;
