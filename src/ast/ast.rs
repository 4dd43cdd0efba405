use std::{
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::{compilation_unit::CompilationUnit, Span};

use super::statements::Stmt;

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of an AST node.
///
/// Ids are unique for the whole process, so side tables keyed by `NodeId`
/// can hold entries for several programs at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn next() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A parsed source unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub id: NodeId,
    pub unit: Rc<CompilationUnit>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    /// Programs pulled in by `include` directives, in source order.
    pub fn included_programs(&self) -> Vec<&Program> {
        self.body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Include(include) => include.program.as_ref(),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Internal => write!(f, "internal"),
        }
    }
}

/// Attributes written before a definition, e.g. `private static`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_override: bool,
}

impl Attributes {
    /// Definitions without a visibility attribute are `internal`.
    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or(Visibility::Internal)
    }
}
