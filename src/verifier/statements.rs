use crate::{
    ast::statements::{ReturnStmt, Stmt, VariableBinding, VariableDefinition},
    diag_args,
    errors::diagnostics::DiagnosticKind,
};

use super::{
    patterns::PatternContext,
    scope::{PropertiesRef, ScopeKind},
    verifier::{DeferError, Verifier},
};

impl Verifier {
    pub(crate) fn verify_statements(&mut self, statements: &[Stmt]) -> Result<(), DeferError> {
        for stmt in statements {
            self.verify_statement(stmt)?;
        }
        Ok(())
    }

    pub(crate) fn verify_statement(&mut self, stmt: &Stmt) -> Result<(), DeferError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.verify_expression(expr, None)?;
            }
            Stmt::Block(block) => {
                self.enter_scope(ScopeKind::Block);
                let outcome = self.verify_statements(&block.body);
                self.exit_scope();
                outcome?;
            }
            Stmt::Variable(def) => self.verify_local_variable(def)?,
            Stmt::If(stmt) => {
                self.verify_expression(&stmt.condition, None)?;
                self.verify_statement(&stmt.then_body)?;
                if let Some(else_body) = &stmt.else_body {
                    self.verify_statement(else_body)?;
                }
            }
            Stmt::While(stmt) => {
                self.verify_expression(&stmt.condition, None)?;
                self.verify_statement(&stmt.body)?;
            }
            Stmt::Return(stmt) => self.verify_return(stmt)?,
            // Collected as definitions before any statement runs.
            Stmt::Function(_) | Stmt::Class(_) | Stmt::Include(_) => {}
        }
        Ok(())
    }

    fn verify_local_variable(&mut self, def: &VariableDefinition) -> Result<(), DeferError> {
        let context = PatternContext::local(PropertiesRef::Scope(self.scope), def.read_only);
        for binding in &def.bindings {
            self.verify_binding(binding, &context)?;
        }
        Ok(())
    }

    /// Verifies the initializer of one binding and binds its pattern.
    pub(crate) fn verify_binding(
        &mut self,
        binding: &VariableBinding,
        context: &PatternContext,
    ) -> Result<(), DeferError> {
        let annotated = binding
            .pattern
            .annotation
            .as_ref()
            .map(|annotation| self.resolve_type_expression(annotation));

        let inferred = match &binding.initializer {
            Some(initializer) => Some(self.verify_initializer(initializer, annotated)?),
            None => None,
        };

        self.verify_pattern(&binding.pattern, context, inferred)?;
        Ok(())
    }

    fn verify_return(&mut self, stmt: &ReturnStmt) -> Result<(), DeferError> {
        let return_type = self
            .frame()
            .filter(|frame| frame.function.is_some())
            .and_then(|frame| frame.return_type);

        let Some(return_type) = return_type else {
            self.report(DiagnosticKind::ReturnOutsideFunction, &stmt.span, vec![]);
            if let Some(value) = &stmt.value {
                self.verify_expression(value, None)?;
            }
            return Ok(());
        };

        match &stmt.value {
            Some(value) => {
                self.verify_expression_limited(value, return_type)?;
            }
            None => {
                if return_type != self.types.void && return_type != self.types.any {
                    self.report(
                        DiagnosticKind::ReturnValueExpected,
                        &stmt.span,
                        diag_args!["type" => self.types.display(return_type)],
                    );
                }
            }
        }
        Ok(())
    }
}
