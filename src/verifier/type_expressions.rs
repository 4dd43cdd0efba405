use crate::{
    ast::types::{TypeExpr, TypeExprKind},
    diag_args,
    errors::diagnostics::DiagnosticKind,
    Span,
};

use super::{types::TypeId, verifier::Verifier};

impl Verifier {
    /// Resolves an annotation in the current scope.
    ///
    /// The result is cached per node, so diagnostics for a type expression
    /// are reported once however often it is resolved.
    pub(crate) fn resolve_type_expression(&mut self, expr: &TypeExpr) -> TypeId {
        if let Some(ty) = self.resolved_type_exprs.get(&expr.id) {
            return *ty;
        }

        let ty = match &expr.kind {
            TypeExprKind::Any => self.types.any,
            TypeExprKind::Void => self.types.void,
            TypeExprKind::Name(name) => match self.resolve_type_name(name, &expr.span) {
                Some(origin) => {
                    // A bare generic name stands for its `*` instantiation.
                    let arity = self.types.class(origin).map(|c| c.type_parameters).unwrap_or(0);
                    if arity > 0 {
                        let any = self.types.any;
                        self.types.parameterized(origin, vec![any; arity])
                    } else {
                        origin
                    }
                }
                None => self.types.any,
            },
            TypeExprKind::Parameterized { base, arguments } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| self.resolve_type_expression(argument))
                    .collect::<Vec<TypeId>>();

                match self.resolve_type_name(base, &expr.span) {
                    Some(origin) => {
                        let arity = self.types.class(origin).map(|c| c.type_parameters).unwrap_or(0);
                        if arity != arguments.len() {
                            self.report(
                                DiagnosticKind::WrongTypeArgumentCount,
                                &expr.span,
                                diag_args![
                                    "name" => base,
                                    "expected" => arity,
                                    "got" => arguments.len(),
                                ],
                            );
                            self.types.any
                        } else {
                            self.types.parameterized(origin, arguments)
                        }
                    }
                    None => self.types.any,
                }
            }
            TypeExprKind::Array(element) => {
                let element = self.resolve_type_expression(element);
                self.types.array_of(element)
            }
        };

        self.resolved_type_exprs.insert(expr.id, ty);
        ty
    }

    fn resolve_type_name(&mut self, name: &str, span: &Span) -> Option<TypeId> {
        match self.lookup_name(name) {
            Some(symbol) => match self.symbols.get(symbol).as_type() {
                Some(ty) => Some(ty),
                None => {
                    self.report(DiagnosticKind::NotAType, span, diag_args!["name" => name]);
                    None
                }
            },
            None => {
                self.report(DiagnosticKind::UnresolvedType, span, diag_args!["name" => name]);
                None
            }
        }
    }
}
