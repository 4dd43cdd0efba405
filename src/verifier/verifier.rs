use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use log::{debug, trace};

use crate::{
    ast::ast::{NodeId, Program},
    compilation_unit::CompilationUnit,
    diag_args,
    errors::diagnostics::{Diagnostic, DiagnosticKind},
    Span,
};

use super::{
    scope::{Properties, PropertiesRef, Scope, ScopeId, ScopeKind},
    symbols::{Symbol, SymbolArena, SymbolId},
    types::{TypeArena, TypeId},
};

/// Raised when an expression depends on a symbol whose type is not known
/// yet. Only variable initializers outside the final resolution round can
/// defer; everywhere else the verifier reports and substitutes `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferError;

#[derive(Debug, Clone, Copy, Default)]
pub struct VerifierOptions {
    /// Count warnings against validity.
    pub warnings_as_errors: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub class: Option<TypeId>,
    pub function: Option<SymbolId>,
    pub return_type: Option<TypeId>,
    pub is_static: bool,
}

pub struct Verifier {
    pub(crate) options: VerifierOptions,
    pub(crate) types: TypeArena,
    pub(crate) symbols: SymbolArena,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) builtins: ScopeId,
    pub(crate) scope: ScopeId,
    pub(crate) frames: Vec<Frame>,
    pub(crate) unit: Option<Rc<CompilationUnit>>,
    pub(crate) check_duplicates: bool,
    /// Outside the variable deferral loop every unresolved reference is
    /// forced to `*`.
    pub(crate) force: bool,

    /// Symbols registered by the skeleton phase, keyed by the defining node.
    pub(crate) declared_symbols: HashMap<NodeId, SymbolId>,
    pub(crate) pattern_symbols: HashMap<NodeId, SymbolId>,
    pub(crate) verified_patterns: HashMap<NodeId, TypeId>,
    pub(crate) resolved_type_exprs: HashMap<NodeId, TypeId>,
    pub(crate) expression_types: HashMap<NodeId, TypeId>,
    /// Expressions that name a class rather than a value.
    pub(crate) type_references: HashMap<NodeId, TypeId>,
    /// The symbol a name or member expression refers to.
    pub(crate) referenced_symbols: HashMap<NodeId, SymbolId>,
    pub(crate) package_scopes: HashMap<NodeId, ScopeId>,
    /// Symbols forced to `*` after their type could not be inferred.
    pub(crate) settled_symbols: HashSet<SymbolId>,

    verified_programs: HashSet<NodeId>,
    all_valid: bool,
}

impl Verifier {
    pub fn new(options: VerifierOptions) -> Self {
        let mut verifier = Verifier {
            options,
            types: TypeArena::new(),
            symbols: SymbolArena::default(),
            scopes: vec![Scope::new(ScopeKind::Builtins, None)],
            builtins: ScopeId(0),
            scope: ScopeId(0),
            frames: vec![],
            unit: None,
            check_duplicates: true,
            force: true,
            declared_symbols: HashMap::new(),
            pattern_symbols: HashMap::new(),
            verified_patterns: HashMap::new(),
            resolved_type_exprs: HashMap::new(),
            expression_types: HashMap::new(),
            type_references: HashMap::new(),
            referenced_symbols: HashMap::new(),
            package_scopes: HashMap::new(),
            settled_symbols: HashSet::new(),
            verified_programs: HashSet::new(),
            all_valid: true,
        };
        verifier.register_builtins();
        verifier
    }

    /// Verifies a program together with every program it includes.
    ///
    /// Returns whether the program's unit is valid. Verifying the same
    /// program twice does nothing the second time.
    pub fn verify_program(&mut self, program: &Program) -> bool {
        if !self.verified_programs.insert(program.id) {
            return self.unit_valid(&program.unit);
        }

        debug!("verifying {}", program.unit.file_name());

        let package = self.begin_unit(Rc::clone(&program.unit));
        self.package_scopes.insert(program.id, package);
        self.verify_definitions(program, package);

        let valid = self.unit_valid(&program.unit);
        debug!(
            "finished {}: {} diagnostics, valid = {}",
            program.unit.file_name(),
            program.unit.nested_diagnostics().len(),
            valid
        );

        self.unit = None;
        self.scope = self.builtins;
        self.all_valid &= valid;
        valid
    }

    /// Verifies independent programs one after another.
    pub fn verify_programs(&mut self, programs: &[Program]) -> bool {
        programs
            .iter()
            .fold(true, |valid, program| self.verify_program(program) && valid)
    }

    /// Whether every program verified so far is valid.
    pub fn all_programs_valid(&self) -> bool {
        self.all_valid
    }

    pub fn unit_valid(&self, unit: &CompilationUnit) -> bool {
        unit.is_valid() && (!self.options.warnings_as_errors || unit.is_free_of_warnings())
    }

    pub(crate) fn mark_program_verified(&mut self, id: NodeId) {
        self.verified_programs.insert(id);
    }

    /// Makes `unit` the target of new diagnostics and opens a fresh package
    /// scope for it.
    pub(crate) fn begin_unit(&mut self, unit: Rc<CompilationUnit>) -> ScopeId {
        self.unit = Some(unit);
        self.scope = self.builtins;
        self.frames.clear();
        self.force = true;
        self.add_scope(ScopeKind::Package, Some(self.builtins))
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    pub fn display_type(&self, id: TypeId) -> String {
        self.types.display(id)
    }

    /// Looks `name` up in the package scope of a verified program.
    pub fn resolve_global(&self, program: &Program, name: &str) -> Option<SymbolId> {
        let package = self.package_scopes.get(&program.id)?;
        self.scopes[package.0 as usize].properties.get(name)
    }

    /// The symbol bound by an identifier pattern.
    pub fn pattern_symbol(&self, pattern: NodeId) -> Option<SymbolId> {
        self.pattern_symbols.get(&pattern).copied()
    }

    /// The type recorded for an expression node, after constraint
    /// propagation.
    pub fn expression_type(&self, expr: NodeId) -> Option<TypeId> {
        self.expression_types.get(&expr).copied()
    }

    pub(crate) fn report(
        &self,
        kind: DiagnosticKind,
        span: &Span,
        args: Vec<(&'static str, String)>,
    ) {
        trace!("diagnostic {} at {}", kind.code(), span.start.0);
        if let Some(unit) = &self.unit {
            unit.add_diagnostic(Diagnostic::new(kind, span.clone(), args));
        }
    }

    pub(crate) fn add_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    pub(crate) fn get_scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Opens a child of the current scope and makes it current.
    pub(crate) fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.add_scope(kind, Some(self.scope));
        self.scope = id;
        id
    }

    pub(crate) fn exit_scope(&mut self) {
        if let Some(parent) = self.get_scope(self.scope).parent {
            self.scope = parent;
        }
    }

    pub(crate) fn properties(&self, target: PropertiesRef) -> Option<&Properties> {
        match target {
            PropertiesRef::Scope(id) => Some(&self.scopes[id.0 as usize].properties),
            PropertiesRef::Prototype(ty) => self.types.class(ty).map(|class| &class.prototype),
        }
    }

    fn properties_mut(&mut self, target: PropertiesRef) -> Option<&mut Properties> {
        match target {
            PropertiesRef::Scope(id) => Some(&mut self.scopes[id.0 as usize].properties),
            PropertiesRef::Prototype(ty) => {
                self.types.class_mut(ty).map(|class| &mut class.prototype)
            }
        }
    }

    /// Adds `symbol` to `target`, or returns the symbol already bound to its
    /// name.
    ///
    /// Two non-read-only variables outside a prototype share one symbol; the
    /// later one may fill in a missing type but may not change it. Any other
    /// collision is a duplicate definition.
    pub(crate) fn define_or_reuse(&mut self, target: PropertiesRef, symbol: Symbol) -> SymbolId {
        self.define_symbol(target, symbol).0
    }

    /// Like `define_or_reuse`, but a duplicate definition gets a detached
    /// symbol of its own so it can still be verified on its own terms.
    pub(crate) fn define_or_detach(&mut self, target: PropertiesRef, symbol: Symbol) -> SymbolId {
        let (id, duplicate) = self.define_symbol(target, symbol.clone());
        if duplicate {
            self.symbols.add(symbol)
        } else {
            id
        }
    }

    fn define_symbol(&mut self, target: PropertiesRef, symbol: Symbol) -> (SymbolId, bool) {
        let existing = self.properties(target).and_then(|p| p.get(&symbol.name));

        let Some(existing) = existing else {
            let name = symbol.name.clone();
            let id = self.symbols.add(symbol);
            if let Some(properties) = self.properties_mut(target) {
                properties.insert(&name, id);
            }
            return (id, false);
        };

        let old = self.symbols.get(existing);
        let old_type = old.static_type;
        let reusable = !matches!(target, PropertiesRef::Prototype(_))
            && old.is_variable()
            && symbol.is_variable()
            && !old.read_only
            && !symbol.read_only;

        if !reusable {
            if self.check_duplicates {
                self.report(
                    DiagnosticKind::DuplicateDefinition,
                    &symbol.location,
                    diag_args!["name" => symbol.name],
                );
            }
            return (existing, true);
        }

        match (old_type, symbol.static_type) {
            (None, Some(ty)) => self.symbols.get_mut(existing).static_type = Some(ty),
            (Some(old_type), Some(new_type)) if old_type != new_type => self.report(
                DiagnosticKind::RedeclaredTypeMismatch,
                &symbol.location,
                diag_args![
                    "name" => symbol.name,
                    "existing" => self.types.display(old_type),
                    "new" => self.types.display(new_type),
                ],
            ),
            _ => {}
        }
        (existing, false)
    }

    /// Gives `symbol` its type, reporting a mismatch when it already has a
    /// different one.
    pub(crate) fn attach_type(&mut self, symbol: SymbolId, ty: TypeId, span: &Span) {
        if self.settled_symbols.contains(&symbol) {
            return;
        }
        match self.symbols.get(symbol).static_type {
            None => self.symbols.get_mut(symbol).static_type = Some(ty),
            Some(existing) if existing != ty => self.report(
                DiagnosticKind::RedeclaredTypeMismatch,
                span,
                diag_args![
                    "name" => self.symbols.get(symbol).name,
                    "existing" => self.types.display(existing),
                    "new" => self.types.display(ty),
                ],
            ),
            Some(_) => {}
        }
    }

    pub(crate) fn frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub(crate) fn current_class(&self) -> Option<TypeId> {
        self.frame().and_then(|frame| frame.class)
    }

    fn in_static_context(&self) -> bool {
        self.frame().map(|frame| frame.is_static).unwrap_or(true)
    }

    /// Resolves `name` from the current scope outwards.
    ///
    /// Class scopes expose their statics directly and, outside static
    /// members, the instance members of the class hierarchy.
    pub(crate) fn lookup_name(&self, name: &str) -> Option<SymbolId> {
        let mut current = Some(self.scope);
        while let Some(id) = current {
            let scope = self.get_scope(id);
            if let Some(symbol) = scope.properties.get(name) {
                return Some(symbol);
            }
            if let ScopeKind::Class(class) = scope.kind {
                if !self.in_static_context() {
                    if let Some((_, symbol)) = self.types.find_instance_property(class, name) {
                        return Some(symbol);
                    }
                }
            }
            current = scope.parent;
        }
        None
    }

    /// Whether a local scope enclosing `scope` already binds `name`.
    pub(crate) fn shadows_outer_binding(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = self.get_scope(scope).parent;
        while let Some(id) = current {
            let scope = self.get_scope(id);
            if !scope.is_local() {
                return false;
            }
            if scope.properties.contains(name) {
                return true;
            }
            current = scope.parent;
        }
        false
    }

    /// The type of a symbol, deferring while it is still unknown.
    ///
    /// When forced, an unknown type is reported once and settled as `*`.
    pub(crate) fn symbol_type(&mut self, symbol: SymbolId, span: &Span) -> Result<TypeId, DeferError> {
        match self.symbols.get(symbol).static_type {
            Some(ty) => Ok(ty),
            None if !self.force => Err(DeferError),
            None => {
                self.report(
                    DiagnosticKind::CannotInferType,
                    span,
                    diag_args!["name" => self.symbols.get(symbol).name],
                );
                let any = self.types.any;
                self.symbols.get_mut(symbol).static_type = Some(any);
                self.settled_symbols.insert(symbol);
                Ok(any)
            }
        }
    }
}
