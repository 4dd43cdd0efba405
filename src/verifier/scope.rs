//! Scopes and property tables.

use indexmap::IndexMap;

use super::{symbols::SymbolId, types::TypeId};

/// A name table that remembers definition order.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    map: IndexMap<String, SymbolId>,
}

impl Properties {
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Inserts `name` unless it is already present. Returns the symbol now
    /// bound to `name`.
    pub fn insert(&mut self, name: &str, symbol: SymbolId) -> SymbolId {
        *self.map.entry(String::from(name)).or_insert(symbol)
    }

    /// Names and symbols in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> + '_ {
        self.map.iter().map(|(name, symbol)| (name.as_str(), *symbol))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Root scope holding the built-in types and functions.
    Builtins,
    /// Top level of a program and the units it includes.
    Package,
    /// Static members of a class. Instance members are reached through the
    /// class's prototype.
    Class(TypeId),
    /// Parameters and top-level locals of a function body.
    Activation,
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub properties: Properties,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            parent,
            kind,
            properties: Properties::default(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.kind, ScopeKind::Activation | ScopeKind::Block)
    }
}

/// Where a definition stores its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesRef {
    Scope(ScopeId),
    /// Instance members of a class.
    Prototype(TypeId),
}
