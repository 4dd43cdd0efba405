//! Phased resolution of program definitions.
//!
//! Definitions are collected into an arena and resolved in four passes:
//!
//! 1. Skeleton: every class, function and variable name gets a symbol.
//! 2. Annotations: `extends` clauses, function signatures and binding
//!    annotations are resolved.
//! 3. Inheritance: class members are checked against inherited ones.
//! 4. Bodies: variable initializers (with deferral), function bodies and
//!    then top-level statements.
//!
//! Each pass sees every definition of the program and of the units it
//! includes, so forward references resolve without ordering constraints.

use std::{collections::HashSet, rc::Rc};

use log::{debug, trace};

use crate::{
    ast::{
        ast::{NodeId, Program, Visibility},
        patterns::{Pattern, PatternKind},
        statements::{ClassDefinition, FunctionBody, FunctionDefinition, Stmt, VariableDefinition},
    },
    compilation_unit::CompilationUnit,
    diag_args,
    errors::diagnostics::DiagnosticKind,
    Span,
};

use super::{
    patterns::PatternContext,
    scope::{PropertiesRef, ScopeId, ScopeKind},
    symbols::{Symbol, SymbolId, SymbolKind},
    types::{ClassType, TypeId},
    verifier::{DeferError, Frame, Verifier},
};

#[derive(Debug, Clone, Copy)]
pub(crate) enum DefinitionKind<'a> {
    Class(&'a ClassDefinition),
    Function(&'a FunctionDefinition),
    Variable(&'a VariableDefinition),
}

#[derive(Debug)]
pub(crate) struct Definition<'a> {
    pub kind: DefinitionKind<'a>,
    pub unit: Rc<CompilationUnit>,
    /// Scope that names inside the definition resolve from.
    pub scope: ScopeId,
    /// Where the definition's symbols are stored.
    pub output: PropertiesRef,
    /// The enclosing class of a member.
    pub class: Option<TypeId>,
    pub is_static: bool,
    /// The type declared by a class definition.
    pub ty: Option<TypeId>,
}

pub(crate) struct FragmentedDefinitions<'a> {
    pub package: ScopeId,
    pub definitions: Vec<Definition<'a>>,
    /// Top-level statements that are not definitions, in source order.
    pub statements: Vec<(&'a Stmt, Rc<CompilationUnit>)>,
    /// Programs already collected; a program included twice joins once.
    collected: HashSet<NodeId>,
}

impl<'a> FragmentedDefinitions<'a> {
    fn new(package: ScopeId) -> Self {
        FragmentedDefinitions {
            package,
            definitions: vec![],
            statements: vec![],
            collected: HashSet::new(),
        }
    }
}

impl Verifier {
    pub(crate) fn verify_definitions(&mut self, program: &Program, package: ScopeId) {
        let mut fragments = FragmentedDefinitions::new(package);
        self.collect_program(program, &mut fragments);
        debug!(
            "collected {} definitions and {} statements",
            fragments.definitions.len(),
            fragments.statements.len()
        );

        self.skeleton_phase(&mut fragments);
        debug!("skeleton phase done, {} definitions", fragments.definitions.len());
        self.annotations_phase(&fragments);
        debug!("annotations phase done");
        self.inheritance_phase(&fragments);
        debug!("inheritance phase done");
        self.bodies_phase(&fragments);
        debug!("bodies phase done");
    }

    /// Appends the definitions and statements of `program`, expanding
    /// included programs in place.
    fn collect_program<'a>(&mut self, program: &'a Program, fragments: &mut FragmentedDefinitions<'a>) {
        if !fragments.collected.insert(program.id) {
            trace!("{} is already collected", program.unit.file_name());
            return;
        }
        for stmt in &program.body {
            let kind = match stmt {
                Stmt::Class(def) => DefinitionKind::Class(def),
                Stmt::Function(def) => DefinitionKind::Function(def),
                Stmt::Variable(def) => DefinitionKind::Variable(def),
                Stmt::Include(include) => {
                    if let Some(included) = &include.program {
                        self.mark_program_verified(included.id);
                        self.collect_program(included, fragments);
                    }
                    continue;
                }
                other => {
                    fragments.statements.push((other, Rc::clone(&program.unit)));
                    continue;
                }
            };

            fragments.definitions.push(Definition {
                kind,
                unit: Rc::clone(&program.unit),
                scope: fragments.package,
                output: PropertiesRef::Scope(fragments.package),
                class: None,
                is_static: false,
                ty: None,
            });
        }
    }

    fn enter_definition(&mut self, def: &Definition) {
        self.unit = Some(Rc::clone(&def.unit));
        self.scope = def.scope;
        self.frames.push(Frame {
            class: def.class,
            function: None,
            return_type: None,
            is_static: def.is_static,
        });
    }

    fn leave_definition(&mut self) {
        self.frames.pop();
    }

    fn is_constructor(&self, def: &Definition, function: &FunctionDefinition) -> bool {
        !def.is_static
            && def
                .class
                .and_then(|class| self.types.class(class))
                .map(|class| class.name == function.name)
                .unwrap_or(false)
    }

    fn skeleton_phase(&mut self, fragments: &mut FragmentedDefinitions) {
        // Class definitions append their members, so the arena grows while
        // it is walked.
        let mut index = 0;
        while index < fragments.definitions.len() {
            let kind = fragments.definitions[index].kind;
            self.enter_definition(&fragments.definitions[index]);

            match kind {
                DefinitionKind::Class(class) => {
                    let (ty, members) = self.declare_class(&fragments.definitions[index], class);
                    fragments.definitions[index].ty = Some(ty);
                    fragments.definitions.extend(members);
                }
                DefinitionKind::Function(function) => {
                    self.declare_function(&fragments.definitions[index], function)
                }
                DefinitionKind::Variable(variable) => {
                    self.declare_variable(&fragments.definitions[index], variable)
                }
            }

            self.leave_definition();
            index += 1;
        }
    }

    fn declare_class<'a>(
        &mut self,
        def: &Definition<'a>,
        class: &'a ClassDefinition,
    ) -> (TypeId, Vec<Definition<'a>>) {
        let ty = self.types.add_class(ClassType::new(&class.name, class.is_interface));
        let scope = self.add_scope(ScopeKind::Class(ty), Some(def.scope));
        if let Some(class_type) = self.types.class_mut(ty) {
            class_type.scope = Some(scope);
        }

        let mut symbol = Symbol::new(&class.name, SymbolKind::Type(ty), class.name_span.clone())
            .with_type(self.types.class);
        symbol.visibility = class.attributes.visibility();
        let symbol = self.define_or_reuse(def.output, symbol);
        self.declared_symbols.insert(class.id, symbol);
        trace!("declared {} '{}'", if class.is_interface { "interface" } else { "class" }, class.name);

        let members = class
            .body
            .iter()
            .filter_map(|stmt| {
                let (kind, attributes) = match stmt {
                    Stmt::Function(function) => (DefinitionKind::Function(function), &function.attributes),
                    Stmt::Variable(variable) => (DefinitionKind::Variable(variable), &variable.attributes),
                    _ => return None,
                };
                Some(Definition {
                    kind,
                    unit: Rc::clone(&def.unit),
                    scope,
                    output: if attributes.is_static {
                        PropertiesRef::Scope(scope)
                    } else {
                        PropertiesRef::Prototype(ty)
                    },
                    class: Some(ty),
                    is_static: attributes.is_static,
                    ty: None,
                })
            })
            .collect();

        (ty, members)
    }

    fn declare_function(&mut self, def: &Definition, function: &FunctionDefinition) {
        let mut symbol = Symbol::new(&function.name, SymbolKind::Method, function.name_span.clone());
        symbol.visibility = function.attributes.visibility();
        symbol.is_static = function.attributes.is_static;
        symbol.is_override = function.attributes.is_override;
        symbol.is_async = function.common.contains_await;
        symbol.is_generator = function.common.contains_yield;
        symbol.parent = def.class;

        let id = if self.is_constructor(def, function) {
            let id = self.symbols.add(symbol);
            if let Some(class) = def.class.and_then(|class| self.types.class_mut(class)) {
                class.constructor = Some(id);
            }
            id
        } else {
            self.define_or_detach(def.output, symbol)
        };
        self.declared_symbols.insert(function.id, id);

        let in_interface = def.class.map(|class| self.types.is_interface(class)).unwrap_or(false);
        match (&function.common.body, in_interface) {
            (FunctionBody::None, false) => self.report(
                DiagnosticKind::MissingFunctionBody,
                &function.name_span,
                diag_args!["name" => function.name],
            ),
            (FunctionBody::Expression(_) | FunctionBody::Block { .. }, true) => self.report(
                DiagnosticKind::InterfaceMethodWithBody,
                &function.name_span,
                diag_args!["name" => function.name],
            ),
            _ => {}
        }
        trace!("declared function '{}'", function.name);
    }

    fn declare_variable(&mut self, def: &Definition, variable: &VariableDefinition) {
        for binding in &variable.bindings {
            for leaf in binding.pattern.leaves() {
                let Some(name) = leaf.identifier_name() else { continue };

                let mut symbol = Symbol::new(name, SymbolKind::Variable, leaf.span.clone());
                symbol.read_only = variable.read_only;
                symbol.visibility = variable.attributes.visibility();
                symbol.is_static = variable.attributes.is_static;
                symbol.parent = def.class;

                let symbol = self.define_or_detach(def.output, symbol);
                self.declared_symbols.insert(leaf.id, symbol);
            }
        }
    }

    fn annotations_phase(&mut self, fragments: &FragmentedDefinitions) {
        // Super types first: signatures and annotations may rely on the
        // class hierarchy.
        for def in &fragments.definitions {
            if let DefinitionKind::Class(class) = def.kind {
                self.enter_definition(def);
                self.link_super_type(def, class);
                self.leave_definition();
            }
        }

        for def in &fragments.definitions {
            if let DefinitionKind::Function(function) = def.kind {
                self.enter_definition(def);
                let signature = self.resolve_signature(&function.common, self.is_constructor(def, function));
                if let Some(symbol) = self.declared_symbols.get(&function.id).copied() {
                    let entry = self.symbols.get_mut(symbol);
                    if entry.static_type.is_none() {
                        entry.static_type = Some(signature);
                    }
                }
                self.leave_definition();
            }
        }

        for def in &fragments.definitions {
            if let DefinitionKind::Variable(variable) = def.kind {
                self.enter_definition(def);
                for binding in &variable.bindings {
                    self.resolve_pattern_annotations(&binding.pattern);
                }
                self.leave_definition();
            }
        }
    }

    fn link_super_type(&mut self, def: &Definition, class: &ClassDefinition) {
        let Some(ty) = def.ty else { return };
        let default = if class.is_interface { None } else { Some(self.types.object) };

        let super_type = match &class.extends {
            None => default,
            Some(extends) => {
                let resolved = self.resolve_type_expression(extends);
                let compatible_kind = self
                    .types
                    .class(resolved)
                    .map(|base| base.is_interface == class.is_interface)
                    .unwrap_or(false);

                if resolved == self.types.any {
                    // Already reported by the resolver.
                    default
                } else if !compatible_kind {
                    self.report(
                        DiagnosticKind::IllegalSuperType,
                        &extends.span,
                        diag_args!["name" => class.name, "super" => self.types.display(resolved)],
                    );
                    default
                } else if self.types.descends_from(resolved, ty) {
                    self.report(
                        DiagnosticKind::CyclicInheritance,
                        &class.name_span,
                        diag_args!["name" => class.name],
                    );
                    default
                } else {
                    Some(resolved)
                }
            }
        };

        if let Some(class_type) = self.types.class_mut(ty) {
            class_type.super_type = super_type;
        }
    }

    /// Resolves every annotation inside a binding pattern and attaches the
    /// ones on identifier leaves to the symbols declared for them.
    fn resolve_pattern_annotations(&mut self, pattern: &Pattern) {
        if let Some(annotation) = &pattern.annotation {
            let ty = self.resolve_type_expression(annotation);
            if let PatternKind::Identifier(_) = pattern.kind {
                if let Some(symbol) = self.declared_symbols.get(&pattern.id).copied() {
                    self.attach_type(symbol, ty, &pattern.span);
                }
            }
        }

        match &pattern.kind {
            PatternKind::Identifier(_) => {}
            PatternKind::Array { elements, rest } => {
                for element in elements {
                    self.resolve_pattern_annotations(element);
                }
                if let Some(rest) = rest {
                    self.resolve_pattern_annotations(rest);
                }
            }
            PatternKind::Record { fields } => {
                for field in fields {
                    self.resolve_pattern_annotations(&field.value);
                }
            }
        }
    }

    fn inheritance_phase(&mut self, fragments: &FragmentedDefinitions) {
        for def in &fragments.definitions {
            let Some(class) = def.class else { continue };
            if def.is_static {
                continue;
            }

            self.enter_definition(def);
            match def.kind {
                DefinitionKind::Function(function) if !self.is_constructor(def, function) => {
                    if let Some(symbol) = self.declared_symbols.get(&function.id).copied() {
                        self.check_inherited_member(class, &function.name, symbol, &function.name_span);
                    }
                }
                DefinitionKind::Variable(variable) => {
                    for binding in &variable.bindings {
                        for leaf in binding.pattern.leaves() {
                            let (Some(name), Some(symbol)) =
                                (leaf.identifier_name(), self.declared_symbols.get(&leaf.id).copied())
                            else {
                                continue;
                            };
                            self.check_inherited_member(class, name, symbol, &leaf.span);
                        }
                    }
                }
                _ => {}
            }
            self.leave_definition();
        }
    }

    /// The first instance member called `name` above `class`.
    fn find_inherited(&self, class: TypeId, name: &str) -> Option<(TypeId, SymbolId)> {
        let base = self.types.super_type(class)?;
        self.types.find_instance_property(base, name)
    }

    fn check_inherited_member(&mut self, class: TypeId, name: &str, symbol: SymbolId, span: &Span) {
        let entry = self.symbols.get(symbol);
        let (is_override, is_method, own_type) =
            (entry.is_override, entry.kind == SymbolKind::Method, entry.static_type);

        match self.find_inherited(class, name) {
            Some((owner, base)) => {
                let base = self.symbols.get(base);
                // Private methods cannot be overridden.
                let overrides = is_override
                    && is_method
                    && base.kind == SymbolKind::Method
                    && base.visibility != Visibility::Private
                    && base.static_type == own_type;
                if !overrides {
                    self.report(
                        DiagnosticKind::InheritedMemberConflict,
                        span,
                        diag_args!["name" => name, "base" => self.types.display(owner)],
                    );
                }
            }
            None if is_override => self.report(
                DiagnosticKind::OverrideWithoutBase,
                span,
                diag_args!["name" => name],
            ),
            None => {}
        }
    }

    fn bodies_phase(&mut self, fragments: &FragmentedDefinitions) {
        self.resolve_variables(fragments);

        for def in &fragments.definitions {
            let DefinitionKind::Function(function) = def.kind else { continue };
            if matches!(function.common.body, FunctionBody::None) {
                continue;
            }
            let Some(symbol) = self.declared_symbols.get(&function.id).copied() else { continue };

            self.enter_definition(def);
            trace!("verifying body of '{}'", function.name);
            if self
                .verify_function_body(&function.common, symbol, &function.name_span)
                .is_err()
            {
                debug!("function '{}' deferred outside the resolution loop", function.name);
            }
            self.leave_definition();
        }

        for (stmt, unit) in &fragments.statements {
            self.unit = Some(Rc::clone(unit));
            self.scope = fragments.package;
            if self.verify_statement(stmt).is_err() {
                debug!("statement deferred outside the resolution loop");
            }
        }
    }

    /// Verifies variable initializers until every binding has a type.
    ///
    /// A definition that depends on a still untyped symbol is retried after
    /// the others. When a round makes no progress the next one forces its
    /// first definition only: each untyped symbol it meets is reported and
    /// settled as `*`, which usually unblocks the rest.
    fn resolve_variables(&mut self, fragments: &FragmentedDefinitions) {
        let mut pending = fragments
            .definitions
            .iter()
            .enumerate()
            .filter(|(_, def)| matches!(def.kind, DefinitionKind::Variable(_)))
            .map(|(index, _)| index)
            .collect::<Vec<usize>>();

        let mut force_first = false;
        let mut round = 0;
        while !pending.is_empty() {
            round += 1;
            let mut deferred = vec![];

            for (position, &index) in pending.iter().enumerate() {
                self.force = force_first && position == 0;
                let def = &fragments.definitions[index];
                let DefinitionKind::Variable(variable) = def.kind else { continue };

                self.enter_definition(def);
                if self.verify_variable_definition(def, variable).is_err() {
                    deferred.push(index);
                }
                self.leave_definition();
            }

            trace!("round {}: {} of {} definitions deferred", round, deferred.len(), pending.len());
            force_first = deferred.len() == pending.len();
            pending = deferred;
        }
        self.force = true;
    }

    fn verify_variable_definition(
        &mut self,
        def: &Definition,
        variable: &VariableDefinition,
    ) -> Result<(), DeferError> {
        let context = PatternContext {
            read_only: variable.read_only,
            output: def.output,
            visibility: variable.attributes.visibility(),
            is_static: def.is_static,
            parent: def.class,
            allow_shadowing: true,
        };

        for binding in &variable.bindings {
            if self.verified_patterns.contains_key(&binding.pattern.id) {
                continue;
            }

            let mark = self.unit.as_ref().map(|unit| unit.diagnostic_count()).unwrap_or(0);
            if let Err(defer) = self.verify_binding(binding, &context) {
                if let Some(unit) = &self.unit {
                    unit.truncate_diagnostics(mark);
                }
                self.forget_pattern(&binding.pattern);
                return Err(defer);
            }
        }
        Ok(())
    }
}
