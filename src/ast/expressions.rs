//! Expression nodes.

use crate::{lexer::tokens::TokenKind, Span};

use super::ast::NodeId;

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Symbol(String),
    This,
    /// Arithmetic, relational and logical operators.
    Binary {
        left: Box<Expr>,
        operator: TokenKind,
        right: Box<Expr>,
    },
    /// `-x` and `!x`
    Prefix {
        operator: TokenKind,
        operand: Box<Expr>,
    },
    /// `=` and the compound assignments.
    Assignment {
        assignee: Box<Expr>,
        operator: TokenKind,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
        property_span: Span,
    },
    New {
        class: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            id: NodeId::next(),
            kind,
            span,
        }
    }

    /// Whether the expression denotes a storage location.
    pub fn is_assignable(&self) -> bool {
        matches!(self.kind, ExprKind::Symbol(_) | ExprKind::Member { .. })
    }
}
