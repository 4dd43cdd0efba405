//! Type expressions as written in annotations.
//!
//! These are purely syntactic. The verifier resolves them into interned
//! types, caching the result per node.

use crate::Span;

use super::ast::NodeId;

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub id: NodeId,
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeExprKind {
    /// `*`
    Any,
    /// `void`
    Void,
    /// A named type such as `Number` or `Shape`.
    Name(String),
    /// `Name<T, ...>`
    Parameterized {
        base: String,
        arguments: Vec<TypeExpr>,
    },
    /// `[T]`, shorthand for `Array<T>`.
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        TypeExpr {
            id: NodeId::next(),
            kind,
            span,
        }
    }
}
