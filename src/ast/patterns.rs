//! Binding patterns used by variable definitions and parameters.

use crate::Span;

use super::{ast::NodeId, types::TypeExpr};

#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: NodeId,
    pub kind: PatternKind,
    pub annotation: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// A plain name binding.
    Identifier(String),
    /// `[a, b, ...rest]`
    Array {
        elements: Vec<Pattern>,
        rest: Option<Box<Pattern>>,
    },
    /// `{x, y: [first]}`. The shorthand `{x}` is parsed as `{x: x}`.
    Record { fields: Vec<RecordField> },
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub key: String,
    pub key_span: Span,
    pub value: Pattern,
}

impl Pattern {
    pub fn new(kind: PatternKind, annotation: Option<TypeExpr>, span: Span) -> Self {
        Pattern {
            id: NodeId::next(),
            kind,
            annotation,
            span,
        }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            PatternKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Every identifier leaf of the pattern, depth first.
    pub fn leaves(&self) -> Vec<&Pattern> {
        let mut out = vec![];
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Pattern>) {
        match &self.kind {
            PatternKind::Identifier(_) => out.push(self),
            PatternKind::Array { elements, rest } => {
                for element in elements {
                    element.collect_leaves(out);
                }
                if let Some(rest) = rest {
                    rest.collect_leaves(out);
                }
            }
            PatternKind::Record { fields } => {
                for field in fields {
                    field.value.collect_leaves(out);
                }
            }
        }
    }
}
