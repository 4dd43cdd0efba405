//! Expression verification and constraint propagation.

use crate::{
    ast::{
        ast::Visibility,
        expressions::{Expr, ExprKind},
    },
    diag_args,
    errors::diagnostics::DiagnosticKind,
    lexer::tokens::TokenKind,
    Span,
};

use super::{
    symbols::SymbolId,
    types::{Type, TypeId},
    verifier::{DeferError, Frame, Verifier},
};

impl Verifier {
    /// Infers the type of `expr`.
    ///
    /// `context` is a hint used by array literals; it is not enforced. Use
    /// `verify_expression_limited` to enforce an expected type.
    pub(crate) fn verify_expression(
        &mut self,
        expr: &Expr,
        context: Option<TypeId>,
    ) -> Result<TypeId, DeferError> {
        let ty = match &expr.kind {
            ExprKind::Number(_) => self.types.number,
            ExprKind::String(_) => self.types.string,
            ExprKind::Boolean(_) => self.types.boolean,
            ExprKind::Null => self.types.null,
            ExprKind::Symbol(name) => match self.lookup_name(name) {
                Some(symbol) => self.symbol_value_type(expr, symbol, &expr.span)?,
                None => {
                    self.report(DiagnosticKind::UndefinedName, &expr.span, diag_args!["name" => name]);
                    self.types.any
                }
            },
            ExprKind::This => match self.frame() {
                Some(Frame {
                    class: Some(class),
                    is_static: false,
                    ..
                }) => *class,
                _ => {
                    self.report(DiagnosticKind::UndefinedName, &expr.span, diag_args!["name" => "this"]);
                    self.types.any
                }
            },
            ExprKind::Binary { left, operator, right } => {
                self.verify_binary(left, *operator, right)?
            }
            ExprKind::Prefix { operator, operand } => match operator {
                TokenKind::Dash => self.verify_expression_limited(operand, self.types.number)?,
                _ => {
                    self.verify_expression(operand, None)?;
                    self.types.boolean
                }
            },
            ExprKind::Assignment { assignee, operator, value } => {
                self.verify_assignment(assignee, *operator, value)?
            }
            ExprKind::Call { callee, arguments } => self.verify_call(expr, callee, arguments)?,
            ExprKind::Member {
                object,
                property,
                property_span,
            } => self.verify_member(expr, object, property, property_span)?,
            ExprKind::New { class, arguments } => self.verify_new(expr, class, arguments)?,
            ExprKind::Array(elements) => self.verify_array_literal(elements, context)?,
            ExprKind::Await(operand) => {
                let ty = self.verify_expression(operand, None)?;
                self.types.promise_result_type(ty).unwrap_or(ty)
            }
            ExprKind::Yield(operand) => {
                if let Some(operand) = operand {
                    self.verify_expression(operand, None)?;
                }
                self.types.any
            }
        };

        self.expression_types.insert(expr.id, ty);
        Ok(ty)
    }

    /// Verifies `expr` and constrains it to `expected`.
    pub(crate) fn verify_expression_limited(
        &mut self,
        expr: &Expr,
        expected: TypeId,
    ) -> Result<TypeId, DeferError> {
        let ty = self.verify_expression(expr, Some(expected))?;
        Ok(self.limit_expression_type(expr, ty, expected))
    }

    /// Constrains an already verified expression to `expected`.
    ///
    /// Always yields `expected`; an incompatible type is reported first.
    pub(crate) fn limit_expression_type(&mut self, expr: &Expr, actual: TypeId, expected: TypeId) -> TypeId {
        if !self.is_assignable(actual, expected) {
            self.report(
                DiagnosticKind::IncompatibleTypes,
                &expr.span,
                diag_args![
                    "got" => self.types.display(actual),
                    "expected" => self.types.display(expected),
                ],
            );
        }
        self.expression_types.insert(expr.id, expected);
        expected
    }

    /// Verifies a variable initializer. The annotation, when compatible,
    /// becomes the inferred type; otherwise the initializer's own type is
    /// returned and the binding reports the mismatch.
    pub(crate) fn verify_initializer(
        &mut self,
        initializer: &Expr,
        annotated: Option<TypeId>,
    ) -> Result<TypeId, DeferError> {
        let ty = self.verify_expression(initializer, annotated)?;
        match annotated {
            Some(annotated) if self.is_assignable(ty, annotated) => {
                self.expression_types.insert(initializer.id, annotated);
                Ok(annotated)
            }
            _ => Ok(ty),
        }
    }

    /// Whether a value of type `from` may be used where `to` is expected:
    /// identical types, anything to or from `*`, `null` to reference types,
    /// and subclass to superclass.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        let types = &self.types;
        if from == to || from == types.any || to == types.any {
            return true;
        }
        if from == types.void || to == types.void {
            return false;
        }
        if from == types.null {
            return to != types.number && to != types.boolean;
        }

        match (types.get(from), types.get(to)) {
            (
                Type::Parameterized { origin: from_origin, arguments: from_args },
                Type::Parameterized { origin: to_origin, arguments: to_args },
            ) => {
                from_origin == to_origin
                    && from_args
                        .iter()
                        .zip(to_args.iter())
                        .all(|(from_arg, to_arg)| from_arg == to_arg || *to_arg == types.any)
            }
            (_, Type::Class(_)) => types.descends_from(from, to),
            _ => false,
        }
    }

    /// The instance type produced by `new` or a conversion call.
    fn instance_type(&mut self, class: TypeId) -> TypeId {
        let arity = self.types.class(class).map(|c| c.type_parameters).unwrap_or(0);
        if arity > 0 {
            let any = self.types.any;
            self.types.parameterized(class, vec![any; arity])
        } else {
            class
        }
    }

    /// The type of a name or member reference to `symbol`. Class names
    /// evaluate to `Class` and are remembered as type references.
    fn symbol_value_type(
        &mut self,
        expr: &Expr,
        symbol: SymbolId,
        span: &Span,
    ) -> Result<TypeId, DeferError> {
        self.referenced_symbols.insert(expr.id, symbol);

        let entry = self.symbols.get(symbol);
        if let Some(class) = entry.as_type() {
            self.type_references.insert(expr.id, class);
            return Ok(self.types.class);
        }
        if let Some(owner) = entry.parent {
            self.check_access(owner, symbol, span);
        }
        self.symbol_type(symbol, span)
    }

    fn check_access(&self, owner: TypeId, symbol: SymbolId, span: &Span) {
        let entry = self.symbols.get(symbol);
        let allowed = match entry.visibility {
            Visibility::Private => self.current_class() == Some(owner),
            Visibility::Protected => self
                .current_class()
                .map(|class| self.types.descends_from(class, owner))
                .unwrap_or(false),
            Visibility::Public | Visibility::Internal => true,
        };
        if !allowed {
            self.report(
                DiagnosticKind::InaccessibleProperty,
                span,
                diag_args!["name" => entry.name],
            );
        }
    }

    fn verify_binary(&mut self, left: &Expr, operator: TokenKind, right: &Expr) -> Result<TypeId, DeferError> {
        let number = self.types.number;
        match operator {
            TokenKind::Plus => {
                let left_type = self.verify_expression(left, None)?;
                let right_type = self.verify_expression(right, None)?;
                let types = &self.types;
                if left_type == types.string || right_type == types.string {
                    Ok(types.string)
                } else if left_type == types.any || right_type == types.any {
                    Ok(types.any)
                } else {
                    self.limit_expression_type(left, left_type, number);
                    self.limit_expression_type(right, right_type, number);
                    Ok(number)
                }
            }
            TokenKind::Dash | TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
                self.verify_expression_limited(left, number)?;
                self.verify_expression_limited(right, number)?;
                Ok(number)
            }
            _ => {
                // Relational, equality and logical operators.
                self.verify_expression(left, None)?;
                self.verify_expression(right, None)?;
                Ok(self.types.boolean)
            }
        }
    }

    fn verify_assignment(
        &mut self,
        assignee: &Expr,
        operator: TokenKind,
        value: &Expr,
    ) -> Result<TypeId, DeferError> {
        let target = self.verify_expression(assignee, None)?;

        if let Some(symbol) = self.referenced_symbols.get(&assignee.id).copied() {
            let entry = self.symbols.get(symbol);
            if entry.read_only {
                self.report(
                    DiagnosticKind::AssignmentToReadOnly,
                    &assignee.span,
                    diag_args!["name" => entry.name],
                );
            }
        }

        match operator {
            TokenKind::Assignment => {
                self.verify_expression_limited(value, target)?;
            }
            TokenKind::PlusEquals if target == self.types.string => {
                self.verify_expression(value, None)?;
            }
            _ => {
                let number = self.types.number;
                self.limit_expression_type(assignee, target, number);
                self.verify_expression_limited(value, number)?;
            }
        }
        Ok(target)
    }

    fn verify_call(&mut self, call: &Expr, callee: &Expr, arguments: &[Expr]) -> Result<TypeId, DeferError> {
        let callee_type = self.verify_expression(callee, None)?;

        // `Number(x)` and friends convert their single argument.
        if let Some(class) = self.type_references.get(&callee.id).copied() {
            for argument in arguments {
                self.verify_expression(argument, None)?;
            }
            if arguments.len() != 1 {
                let kind = if arguments.is_empty() {
                    DiagnosticKind::TooFewArguments
                } else {
                    DiagnosticKind::TooManyArguments
                };
                self.report(kind, &call.span, diag_args!["expected" => 1, "got" => arguments.len()]);
            }
            return Ok(self.instance_type(class));
        }

        if self.types.function_type(callee_type).is_some() {
            return self.verify_function_call(arguments, &call.span, callee_type);
        }

        let types = &self.types;
        let untyped = callee_type == types.any || callee_type == types.function || callee_type == types.class;
        if !untyped {
            self.report(
                DiagnosticKind::NotCallable,
                &callee.span,
                diag_args!["type" => self.types.display(callee_type)],
            );
        }
        for argument in arguments {
            self.verify_expression(argument, None)?;
        }
        Ok(self.types.any)
    }

    fn verify_member(
        &mut self,
        member: &Expr,
        object: &Expr,
        property: &str,
        property_span: &Span,
    ) -> Result<TypeId, DeferError> {
        let object_type = self.verify_expression(object, None)?;

        if let Some(class) = self.type_references.get(&object.id).copied() {
            let statics = self
                .types
                .class(class)
                .and_then(|c| c.scope)
                .and_then(|scope| self.get_scope(scope).properties.get(property));
            return match statics {
                Some(symbol) => self.symbol_value_type(member, symbol, property_span),
                None => {
                    self.report(
                        DiagnosticKind::UndefinedProperty,
                        property_span,
                        diag_args!["name" => property, "type" => self.types.display(class)],
                    );
                    Ok(self.types.any)
                }
            };
        }

        if object_type == self.types.any {
            return Ok(self.types.any);
        }

        match self.types.find_instance_property(object_type, property) {
            Some((_, symbol)) => self.symbol_value_type(member, symbol, property_span),
            None => {
                self.report(
                    DiagnosticKind::UndefinedProperty,
                    property_span,
                    diag_args!["name" => property, "type" => self.types.display(object_type)],
                );
                Ok(self.types.any)
            }
        }
    }

    fn verify_new(&mut self, new: &Expr, class: &Expr, arguments: &[Expr]) -> Result<TypeId, DeferError> {
        let class_type = self.verify_expression(class, None)?;

        let Some(target) = self.type_references.get(&class.id).copied() else {
            if class_type != self.types.any && class_type != self.types.class {
                self.report(
                    DiagnosticKind::NotInstantiable,
                    &class.span,
                    diag_args!["name" => self.types.display(class_type)],
                );
            }
            for argument in arguments {
                self.verify_expression(argument, None)?;
            }
            return Ok(self.types.any);
        };

        if self.types.is_interface(target) {
            self.report(
                DiagnosticKind::NotInstantiable,
                &class.span,
                diag_args!["name" => self.types.display(target)],
            );
            for argument in arguments {
                self.verify_expression(argument, None)?;
            }
            return Ok(self.types.any);
        }

        let constructor = self
            .types
            .class(target)
            .and_then(|c| c.constructor)
            .and_then(|symbol| self.symbols.get(symbol).static_type);

        match constructor {
            Some(signature) => {
                self.verify_function_call(arguments, &new.span, signature)?;
            }
            None => {
                for argument in arguments {
                    self.verify_expression(argument, None)?;
                }
                // Built-in classes take any arguments.
                if !arguments.is_empty() && !self.types.is_builtin(target) {
                    self.report(
                        DiagnosticKind::TooManyArguments,
                        &new.span,
                        diag_args!["expected" => 0, "got" => arguments.len()],
                    );
                }
            }
        }

        Ok(self.instance_type(target))
    }

    fn verify_array_literal(&mut self, elements: &[Expr], context: Option<TypeId>) -> Result<TypeId, DeferError> {
        if let Some(element) = context.and_then(|c| self.types.array_element_type(c)) {
            for expr in elements {
                self.verify_expression_limited(expr, element)?;
            }
            return Ok(self.types.array_of(element));
        }

        let mut element: Option<TypeId> = None;
        for expr in elements {
            let ty = self.verify_expression(expr, None)?;
            element = match element {
                None => Some(ty),
                Some(previous) if previous == ty => Some(previous),
                Some(_) => Some(self.types.any),
            };
        }
        let element = element.unwrap_or(self.types.any);
        Ok(self.types.array_of(element))
    }
}
