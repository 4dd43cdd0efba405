//! Statement and definition nodes.

use crate::Span;

use super::{
    ast::{Attributes, NodeId, Program},
    expressions::Expr,
    patterns::Pattern,
    types::TypeExpr,
};

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Block(BlockStmt),
    Variable(VariableDefinition),
    Function(FunctionDefinition),
    /// Classes and interfaces.
    Class(ClassDefinition),
    Include(IncludeDirective),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Expression(expr) => &expr.span,
            Stmt::Block(block) => &block.span,
            Stmt::Variable(def) => &def.span,
            Stmt::Function(def) => &def.span,
            Stmt::Class(def) => &def.span,
            Stmt::Include(include) => &include.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
        }
    }

    /// Whether every control path through this statement ends in `return`.
    ///
    /// Loops never count: their body may run zero times.
    pub fn always_returns(&self) -> bool {
        match self {
            Stmt::Return(_) => true,
            Stmt::Block(block) => block.always_returns(),
            Stmt::If(stmt) => match &stmt.else_body {
                Some(else_body) => stmt.then_body.always_returns() && else_body.always_returns(),
                None => false,
            },
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub id: NodeId,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    pub fn always_returns(&self) -> bool {
        self.body.iter().any(Stmt::always_returns)
    }
}

/// `var`/`const` with one or more bindings.
#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub id: NodeId,
    pub attributes: Attributes,
    pub read_only: bool,
    pub bindings: Vec<VariableBinding>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableBinding {
    pub pattern: Pattern,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub id: NodeId,
    pub attributes: Attributes,
    pub name: String,
    pub name_span: Span,
    pub common: FunctionCommon,
    pub span: Span,
}

/// Signature and body shared by every kind of function.
#[derive(Debug, Clone)]
pub struct FunctionCommon {
    pub params: Vec<Parameter>,
    pub result: Option<TypeExpr>,
    pub body: FunctionBody,
    /// The body contains `await`.
    pub contains_await: bool,
    /// The body contains `yield`.
    pub contains_yield: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Required,
    Optional,
    Rest,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub pattern: Pattern,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    Expression(Box<Expr>),
    Block {
        block: BlockStmt,
        all_paths_return: bool,
    },
    /// Interface methods only.
    None,
}

#[derive(Debug, Clone)]
pub struct ClassDefinition {
    pub id: NodeId,
    pub attributes: Attributes,
    pub name: String,
    pub name_span: Span,
    pub is_interface: bool,
    pub extends: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `include "file";`. The driver attaches the parsed program.
#[derive(Debug, Clone)]
pub struct IncludeDirective {
    pub id: NodeId,
    pub source: String,
    pub span: Span,
    pub program: Option<Program>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}
