//! Function signatures, bodies and call sites.

use crate::{
    ast::{
        ast::Visibility,
        expressions::Expr,
        statements::{FunctionBody, FunctionCommon, ParameterKind},
    },
    diag_args,
    errors::diagnostics::DiagnosticKind,
    Span,
};

use super::{
    patterns::PatternContext,
    scope::{PropertiesRef, ScopeId, ScopeKind},
    symbols::SymbolId,
    types::{FunctionType, TypeId},
    verifier::{DeferError, Frame, Verifier},
};

impl Verifier {
    /// Resolves the parameter and result annotations of a function into an
    /// interned function type.
    ///
    /// Unannotated parameters are `*` and an unannotated rest parameter is
    /// `Array<*>`. A missing result is `void` for block bodies and `*` for
    /// expression bodies; async functions default to `Promise<*>`.
    /// Constructors always return `void`.
    pub(crate) fn resolve_signature(
        &mut self,
        common: &FunctionCommon,
        is_constructor: bool,
    ) -> TypeId {
        let any = self.types.any;
        let mut required = vec![];
        let mut optional = vec![];
        let mut rest = None;

        for param in &common.params {
            let annotated = param
                .pattern
                .annotation
                .as_ref()
                .map(|annotation| (self.resolve_type_expression(annotation), &annotation.span));

            match param.kind {
                ParameterKind::Required => required.push(annotated.map(|(ty, _)| ty).unwrap_or(any)),
                ParameterKind::Optional => optional.push(annotated.map(|(ty, _)| ty).unwrap_or(any)),
                ParameterKind::Rest => {
                    let ty = match annotated {
                        Some((ty, span)) => {
                            if ty != any && self.types.array_element_type(ty).is_none() {
                                self.report(
                                    DiagnosticKind::RestParameterMustBeArray,
                                    span,
                                    diag_args!["type" => self.types.display(ty)],
                                );
                            }
                            ty
                        }
                        None => self.types.array_of(any),
                    };
                    rest = Some(ty);
                }
            }
        }

        let result = if is_constructor {
            self.types.void
        } else {
            match &common.result {
                Some(result) => self.resolve_type_expression(result),
                None if common.contains_await && !common.contains_yield => self.types.promise_of(any),
                None => match common.body {
                    FunctionBody::Expression(_) => any,
                    _ => self.types.void,
                },
            }
        };

        self.types.function(FunctionType {
            required,
            optional,
            rest,
            result,
        })
    }

    /// The type `return` statements and expression bodies are checked
    /// against: `T` for an async `Promise<T>`, `void` for generators,
    /// otherwise the declared result.
    fn effective_return_type(&mut self, function: SymbolId, declared: TypeId, span: &Span) -> TypeId {
        let symbol = self.symbols.get(function);
        if symbol.is_generator {
            return self.types.void;
        }
        if !symbol.is_async || declared == self.types.any {
            return declared;
        }
        match self.types.promise_result_type(declared) {
            Some(result) => result,
            None => {
                self.report(
                    DiagnosticKind::AsyncReturnMustBePromise,
                    span,
                    diag_args!["type" => self.types.display(declared)],
                );
                self.types.any
            }
        }
    }

    /// Binds the parameters of `function` in a fresh activation scope and
    /// verifies its body.
    pub(crate) fn verify_function_body(
        &mut self,
        common: &FunctionCommon,
        function: SymbolId,
        name_span: &Span,
    ) -> Result<(), DeferError> {
        let signature = self.symbols.get(function).static_type.unwrap_or(self.types.any);
        let declared = self
            .types
            .function_type(signature)
            .map(|f| f.result)
            .unwrap_or(self.types.any);

        let result_span = common.result.as_ref().map(|r| &r.span).unwrap_or(name_span);
        let effective = self.effective_return_type(function, declared, result_span);

        let frame = Frame {
            class: self.current_class(),
            function: Some(function),
            return_type: Some(effective),
            is_static: self.symbols.get(function).is_static,
        };
        self.frames.push(frame);
        let activation = self.enter_scope(ScopeKind::Activation);

        let outcome = self.verify_function_contents(common, signature, effective, activation, name_span);

        self.exit_scope();
        self.frames.pop();
        outcome
    }

    fn verify_function_contents(
        &mut self,
        common: &FunctionCommon,
        signature: TypeId,
        effective: TypeId,
        activation: ScopeId,
        name_span: &Span,
    ) -> Result<(), DeferError> {
        let parameter_types = self.types.parameters(signature);
        let context = PatternContext {
            read_only: false,
            output: PropertiesRef::Scope(activation),
            visibility: Visibility::Internal,
            is_static: false,
            parent: None,
            allow_shadowing: true,
        };

        for (index, param) in common.params.iter().enumerate() {
            let ty = parameter_types.get(index).copied().unwrap_or(self.types.any);
            self.verify_pattern(&param.pattern, &context, Some(ty))?;
            if let Some(default) = &param.default {
                self.verify_expression_limited(default, ty)?;
            }
        }

        match &common.body {
            FunctionBody::Expression(expr) => {
                self.verify_expression_limited(expr, effective)?;
            }
            FunctionBody::Block { block, all_paths_return } => {
                self.verify_statements(&block.body)?;
                if effective != self.types.void && !all_paths_return {
                    self.report(
                        DiagnosticKind::NotAllPathsReturn,
                        name_span,
                        diag_args!["type" => self.types.display(effective)],
                    );
                }
            }
            FunctionBody::None => {}
        }
        Ok(())
    }

    /// Checks arity and constrains each argument to its parameter type.
    /// Returns the function's result type.
    pub(crate) fn verify_function_call(
        &mut self,
        arguments: &[Expr],
        span: &Span,
        function: TypeId,
    ) -> Result<TypeId, DeferError> {
        let any = self.types.any;
        let Some(signature) = self.types.function_type(function).cloned() else {
            for argument in arguments {
                self.verify_expression(argument, None)?;
            }
            return Ok(any);
        };

        let required = self.types.required_parameter_count(function);
        let positional = required + signature.optional.len();

        if arguments.len() < required {
            self.report(
                DiagnosticKind::TooFewArguments,
                span,
                diag_args!["expected" => required, "got" => arguments.len()],
            );
        } else if signature.rest.is_none() && arguments.len() > positional {
            self.report(
                DiagnosticKind::TooManyArguments,
                span,
                diag_args!["expected" => positional, "got" => arguments.len()],
            );
        }

        let rest_element = signature
            .rest
            .map(|rest| self.types.array_element_type(rest).unwrap_or(any));

        for (index, argument) in arguments.iter().enumerate() {
            let expected = if index < required {
                signature.required[index]
            } else if index < positional {
                signature.optional[index - required]
            } else {
                rest_element.unwrap_or(any)
            };
            self.verify_expression_limited(argument, expected)?;
        }

        Ok(signature.result)
    }
}
