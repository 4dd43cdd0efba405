use crate::{ast::ast::Visibility, Span};

use super::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Method,
    /// A class or interface name.
    Type(TypeId),
}

/// A named entity: variable, method or type.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// `None` until the type is known. Unannotated variables stay `None`
    /// until their initializer has been verified.
    pub static_type: Option<TypeId>,
    pub read_only: bool,
    pub visibility: Visibility,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_static: bool,
    pub is_override: bool,
    /// The class declaring this symbol, for members.
    pub parent: Option<TypeId>,
    pub location: Span,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind, location: Span) -> Self {
        Symbol {
            name: String::from(name),
            kind,
            static_type: None,
            read_only: !matches!(kind, SymbolKind::Variable),
            visibility: Visibility::Internal,
            is_async: false,
            is_generator: false,
            is_static: false,
            is_override: false,
            parent: None,
            location,
        }
    }

    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.static_type = Some(ty);
        self
    }

    pub fn is_variable(&self) -> bool {
        self.kind == SymbolKind::Variable
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match self.kind {
            SymbolKind::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub(crate) fn len(&self) -> usize {
        self.symbols.len()
    }
}
