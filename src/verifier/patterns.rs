//! Destructuring pattern verification.
//!
//! Every identifier leaf ends up with a symbol and a type. When no type can
//! be determined the verifier reports it and uses `*`, so later phases never
//! see an untyped binding.

use log::trace;

use crate::{
    ast::{
        ast::Visibility,
        patterns::{Pattern, PatternKind},
    },
    diag_args,
    errors::diagnostics::DiagnosticKind,
    Span,
};

use super::{
    scope::PropertiesRef,
    symbols::{Symbol, SymbolKind},
    types::TypeId,
    verifier::{DeferError, Verifier},
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct PatternContext {
    pub read_only: bool,
    pub output: PropertiesRef,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parent: Option<TypeId>,
    /// Local definitions may not silently shadow an enclosing local.
    pub allow_shadowing: bool,
}

impl PatternContext {
    pub fn local(output: PropertiesRef, read_only: bool) -> Self {
        PatternContext {
            read_only,
            output,
            visibility: Visibility::Internal,
            is_static: false,
            parent: None,
            allow_shadowing: false,
        }
    }
}

impl Verifier {
    /// Binds every name in `pattern`, returning the type of the pattern.
    ///
    /// A pattern that was already verified returns its recorded type and
    /// reports nothing. Defers only when a record field's type is still
    /// unknown.
    pub(crate) fn verify_pattern(
        &mut self,
        pattern: &Pattern,
        context: &PatternContext,
        inferred: Option<TypeId>,
    ) -> Result<TypeId, DeferError> {
        if let Some(ty) = self.verified_patterns.get(&pattern.id) {
            return Ok(*ty);
        }

        let annotated = pattern
            .annotation
            .as_ref()
            .map(|annotation| self.resolve_type_expression(annotation));

        let ty = match &pattern.kind {
            PatternKind::Identifier(name) => {
                let ty = self.pick_type(annotated, inferred, &pattern.span, name);
                self.bind_identifier(pattern, name, ty, context);
                ty
            }
            PatternKind::Array { elements, rest } => {
                let container =
                    self.pick_type(annotated, inferred, &pattern.span, "destructuring pattern");
                let element = self.destructured_element_type(container, &pattern.span);
                let rest_type = match self.types.array_element_type(container) {
                    Some(_) => container,
                    None => self.types.any,
                };

                for element_pattern in elements {
                    self.verify_pattern(element_pattern, context, Some(element))?;
                }
                if let Some(rest) = rest {
                    self.verify_pattern(rest, context, Some(rest_type))?;
                }
                container
            }
            PatternKind::Record { fields } => {
                let container =
                    self.pick_type(annotated, inferred, &pattern.span, "destructuring pattern");

                for field in fields {
                    let field_type = self.record_field_type(container, &field.key, &field.key_span)?;
                    self.verify_pattern(&field.value, context, Some(field_type))?;
                }
                container
            }
        };

        self.verified_patterns.insert(pattern.id, ty);
        Ok(ty)
    }

    /// Drops the recorded results for `pattern` so it can be verified again
    /// after a deferred attempt.
    pub(crate) fn forget_pattern(&mut self, pattern: &Pattern) {
        self.verified_patterns.remove(&pattern.id);
        match &pattern.kind {
            PatternKind::Identifier(_) => {}
            PatternKind::Array { elements, rest } => {
                for element in elements {
                    self.forget_pattern(element);
                }
                if let Some(rest) = rest {
                    self.forget_pattern(rest);
                }
            }
            PatternKind::Record { fields } => {
                for field in fields {
                    self.forget_pattern(&field.value);
                }
            }
        }
    }

    fn pick_type(
        &mut self,
        annotated: Option<TypeId>,
        inferred: Option<TypeId>,
        span: &Span,
        name: &str,
    ) -> TypeId {
        match (annotated, inferred) {
            (Some(annotated), Some(inferred)) => {
                if annotated != inferred {
                    self.report(
                        DiagnosticKind::AnnotationTypeMismatch,
                        span,
                        diag_args![
                            "annotated" => self.types.display(annotated),
                            "inferred" => self.types.display(inferred),
                        ],
                    );
                }
                annotated
            }
            (Some(ty), None) | (None, Some(ty)) => ty,
            (None, None) => {
                self.report(DiagnosticKind::MissingTypeContext, span, diag_args!["name" => name]);
                self.types.any
            }
        }
    }

    fn destructured_element_type(&mut self, container: TypeId, span: &Span) -> TypeId {
        if container == self.types.any {
            return self.types.any;
        }
        match self.types.array_element_type(container) {
            Some(element) => element,
            None => {
                self.report(
                    DiagnosticKind::CannotDestructureAsArray,
                    span,
                    diag_args!["type" => self.types.display(container)],
                );
                self.types.any
            }
        }
    }

    fn record_field_type(
        &mut self,
        container: TypeId,
        key: &str,
        span: &Span,
    ) -> Result<TypeId, DeferError> {
        if container == self.types.any {
            return Ok(self.types.any);
        }
        match self.types.find_instance_property(container, key) {
            Some((_, symbol)) => self.symbol_type(symbol, span),
            None => {
                self.report(
                    DiagnosticKind::UndefinedProperty,
                    span,
                    diag_args!["name" => key, "type" => self.types.display(container)],
                );
                Ok(self.types.any)
            }
        }
    }

    fn bind_identifier(&mut self, pattern: &Pattern, name: &str, ty: TypeId, context: &PatternContext) {
        if let Some(symbol) = self.declared_symbols.get(&pattern.id).copied() {
            // Annotated leaves were attached when annotations were resolved.
            if pattern.annotation.is_none() {
                self.attach_type(symbol, ty, &pattern.span);
            }
            self.pattern_symbols.insert(pattern.id, symbol);
            return;
        }

        if !context.allow_shadowing {
            if let PropertiesRef::Scope(scope) = context.output {
                if self.shadows_outer_binding(scope, name) {
                    self.report(
                        DiagnosticKind::ShadowsOuterBinding,
                        &pattern.span,
                        diag_args!["name" => name],
                    );
                }
            }
        }

        let mut symbol = Symbol::new(name, SymbolKind::Variable, pattern.span.clone()).with_type(ty);
        symbol.read_only = context.read_only;
        symbol.visibility = context.visibility;
        symbol.is_static = context.is_static;
        symbol.parent = context.parent;

        let symbol = self.define_or_reuse(context.output, symbol);
        trace!("bound '{}' as {}", name, self.types.display(ty));
        self.pattern_symbols.insert(pattern.id, symbol);
    }
}
