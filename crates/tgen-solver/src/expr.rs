//! Partial-expression trees handed to the inference engine.
//!
//! The generation loop (or its parser) builds these from the code generated
//! so far. The set of node kinds is closed; every consumer matches it
//! exhaustively.

use crate::types::Type;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Literal::Number(n) => n.to_bits().hash(state),
            Literal::String(s) => s.hash(state),
            Literal::Boolean(b) => b.hash(state),
            Literal::Null | Literal::Undefined => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq, Hash, Serialize, Deserialize)]
pub struct FunctionParam {
    pub name: String,
    /// Declared annotation; `None` for unannotated parameters.
    pub ty: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    PropertyAccess {
        object: Box<Expr>,
        property: String,
    },
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Function {
        params: Vec<FunctionParam>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Literal(Literal::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Literal(Literal::Boolean(value))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::PropertyAccess {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn lambda(params: Vec<FunctionParam>, body: Expr) -> Self {
        Expr::Function {
            params,
            body: Box::new(body),
        }
    }

    /// Deterministic structural hash, used as an inference cache key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Nesting depth of the tree.
    pub fn depth(&self) -> usize {
        1 + match self {
            Expr::Literal(_) | Expr::Identifier(_) => 0,
            Expr::Call { callee, args } => args
                .iter()
                .map(Expr::depth)
                .max()
                .unwrap_or(0)
                .max(callee.depth()),
            Expr::PropertyAccess { object, .. } => object.depth(),
            Expr::Array(elements) => elements.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::Object(fields) => fields.iter().map(|(_, e)| e.depth()).max().unwrap_or(0),
            Expr::Function { body, .. } => body.depth(),
        }
    }
}

impl FunctionParam {
    pub fn new(name: impl Into<String>, ty: Option<Type>) -> Self {
        FunctionParam {
            name: name.into(),
            ty,
        }
    }
}
