//! Built-in types and functions.
//!
//! Registered once per verifier with duplicate checks disabled. After that
//! the built-in scope is never written again.

use log::debug;

use crate::{ast::ast::Visibility, Span};

use super::{
    scope::{PropertiesRef, ScopeKind},
    symbols::{Symbol, SymbolKind},
    types::{FunctionType, TypeId},
    verifier::Verifier,
};

impl Verifier {
    pub(crate) fn register_builtins(&mut self) {
        self.check_duplicates = false;

        let builtins = [
            self.types.object,
            self.types.number,
            self.types.string,
            self.types.boolean,
            self.types.function,
            self.types.class,
            self.types.array,
            self.types.promise,
        ];
        for ty in builtins {
            self.register_builtin_class(ty);
        }

        let number = self.types.number;
        let any = self.types.any;
        let any_array = self.types.array_of(any);

        self.register_builtin_field(self.types.array, "length", number, false);
        self.register_builtin_field(self.types.string, "length", number, true);

        let push = self.types.function(FunctionType {
            required: vec![],
            optional: vec![],
            rest: Some(any_array),
            result: number,
        });
        self.register_builtin_method(PropertiesRef::Prototype(self.types.array), "push", push);

        let trace = self.types.function(FunctionType {
            required: vec![],
            optional: vec![],
            rest: Some(any_array),
            result: self.types.void,
        });
        self.register_builtin_method(PropertiesRef::Scope(self.builtins), "trace", trace);

        self.check_duplicates = true;
        debug!("registered {} built-in symbols", self.symbols.len());
    }

    fn register_builtin_class(&mut self, ty: TypeId) {
        let scope = self.add_scope(ScopeKind::Class(ty), Some(self.builtins));
        let name = match self.types.class_mut(ty) {
            Some(class) => {
                class.scope = Some(scope);
                class.name.clone()
            }
            None => return,
        };

        let mut symbol = Symbol::new(&name, SymbolKind::Type(ty), Span::null()).with_type(self.types.class);
        symbol.visibility = Visibility::Public;
        self.define_or_reuse(PropertiesRef::Scope(self.builtins), symbol);
    }

    fn register_builtin_field(&mut self, class: TypeId, name: &str, ty: TypeId, read_only: bool) {
        let mut symbol = Symbol::new(name, SymbolKind::Variable, Span::null()).with_type(ty);
        symbol.read_only = read_only;
        symbol.visibility = Visibility::Public;
        symbol.parent = Some(class);
        self.define_or_reuse(PropertiesRef::Prototype(class), symbol);
    }

    fn register_builtin_method(&mut self, target: PropertiesRef, name: &str, ty: TypeId) {
        let mut symbol = Symbol::new(name, SymbolKind::Method, Span::null()).with_type(ty);
        symbol.visibility = Visibility::Public;
        if let PropertiesRef::Prototype(class) = target {
            symbol.parent = Some(class);
        }
        self.define_or_reuse(target, symbol);
    }
}
