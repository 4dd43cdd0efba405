//! Semantic diagnostics.
//!
//! Diagnostics are plain data: the verifier reports them against a
//! `CompilationUnit` and keeps going. Each kind carries a stable numeric
//! code, a severity and a message template whose `{name}` placeholders are
//! filled from the diagnostic's argument bag.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::{compilation_unit::CompilationUnit, Span};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-zA-Z_]+)\}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingTypeContext,
    AnnotationTypeMismatch,
    RedeclaredTypeMismatch,
    InheritedMemberConflict,
    NotAllPathsReturn,
    TooFewArguments,
    TooManyArguments,
    IncompatibleTypes,
    DuplicateDefinition,
    UndefinedName,
    UnresolvedType,
    NotAType,
    UndefinedProperty,
    CannotDestructureAsArray,
    NotCallable,
    CyclicInheritance,
    IllegalSuperType,
    WrongTypeArgumentCount,
    AsyncReturnMustBePromise,
    ReturnOutsideFunction,
    ReturnValueExpected,
    CannotInferType,
    OverrideWithoutBase,
    InaccessibleProperty,
    MissingFunctionBody,
    InterfaceMethodWithBody,
    AssignmentToReadOnly,
    ShadowsOuterBinding,
    RestParameterMustBeArray,
    NotInstantiable,
}

impl DiagnosticKind {
    /// The stable numeric code printed with the diagnostic.
    pub fn code(&self) -> u32 {
        match self {
            DiagnosticKind::MissingTypeContext => 1001,
            DiagnosticKind::AnnotationTypeMismatch => 1002,
            DiagnosticKind::RedeclaredTypeMismatch => 1003,
            DiagnosticKind::InheritedMemberConflict => 1004,
            DiagnosticKind::NotAllPathsReturn => 1005,
            DiagnosticKind::TooFewArguments => 1006,
            DiagnosticKind::TooManyArguments => 1007,
            DiagnosticKind::IncompatibleTypes => 1008,
            DiagnosticKind::DuplicateDefinition => 1009,
            DiagnosticKind::UndefinedName => 1010,
            DiagnosticKind::UnresolvedType => 1011,
            DiagnosticKind::NotAType => 1012,
            DiagnosticKind::UndefinedProperty => 1013,
            DiagnosticKind::CannotDestructureAsArray => 1014,
            DiagnosticKind::NotCallable => 1015,
            DiagnosticKind::CyclicInheritance => 1016,
            DiagnosticKind::IllegalSuperType => 1017,
            DiagnosticKind::WrongTypeArgumentCount => 1018,
            DiagnosticKind::AsyncReturnMustBePromise => 1019,
            DiagnosticKind::ReturnOutsideFunction => 1020,
            DiagnosticKind::ReturnValueExpected => 1021,
            DiagnosticKind::CannotInferType => 1022,
            DiagnosticKind::OverrideWithoutBase => 1023,
            DiagnosticKind::InaccessibleProperty => 1024,
            DiagnosticKind::MissingFunctionBody => 1025,
            DiagnosticKind::InterfaceMethodWithBody => 1026,
            DiagnosticKind::AssignmentToReadOnly => 1027,
            DiagnosticKind::ShadowsOuterBinding => 1028,
            DiagnosticKind::RestParameterMustBeArray => 1029,
            DiagnosticKind::NotInstantiable => 1030,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::ShadowsOuterBinding => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingTypeContext => {
                "'{name}' has no type annotation and no type could be inferred"
            }
            DiagnosticKind::AnnotationTypeMismatch => {
                "annotated type '{annotated}' does not match inferred type '{inferred}'"
            }
            DiagnosticKind::RedeclaredTypeMismatch => {
                "'{name}' was declared with type '{existing}' and redeclared with type '{new}'"
            }
            DiagnosticKind::InheritedMemberConflict => {
                "'{name}' conflicts with a member inherited from '{base}'"
            }
            DiagnosticKind::NotAllPathsReturn => {
                "not all code paths return a value of type '{type}'"
            }
            DiagnosticKind::TooFewArguments => "expected at least {expected} arguments, got {got}",
            DiagnosticKind::TooManyArguments => "expected at most {expected} arguments, got {got}",
            DiagnosticKind::IncompatibleTypes => {
                "type '{got}' is not compatible with expected type '{expected}'"
            }
            DiagnosticKind::DuplicateDefinition => "duplicate definition of '{name}'",
            DiagnosticKind::UndefinedName => "'{name}' is not defined",
            DiagnosticKind::UnresolvedType => "type '{name}' could not be resolved",
            DiagnosticKind::NotAType => "'{name}' is not a type",
            DiagnosticKind::UndefinedProperty => "'{name}' is not a property of '{type}'",
            DiagnosticKind::CannotDestructureAsArray => {
                "a value of type '{type}' cannot be destructured as an array"
            }
            DiagnosticKind::NotCallable => "a value of type '{type}' is not callable",
            DiagnosticKind::CyclicInheritance => "'{name}' inherits from itself",
            DiagnosticKind::IllegalSuperType => "'{name}' cannot extend '{super}'",
            DiagnosticKind::WrongTypeArgumentCount => {
                "'{name}' expects {expected} type arguments, got {got}"
            }
            DiagnosticKind::AsyncReturnMustBePromise => {
                "an async function must return 'Promise<T>', found '{type}'"
            }
            DiagnosticKind::ReturnOutsideFunction => "return statement outside of a function",
            DiagnosticKind::ReturnValueExpected => "a return value of type '{type}' is expected",
            DiagnosticKind::CannotInferType => {
                "the type of '{name}' cannot be inferred from its initializer"
            }
            DiagnosticKind::OverrideWithoutBase => {
                "'{name}' is marked override but overrides no inherited method"
            }
            DiagnosticKind::InaccessibleProperty => "'{name}' is not accessible from here",
            DiagnosticKind::MissingFunctionBody => "function '{name}' must have a body",
            DiagnosticKind::InterfaceMethodWithBody => {
                "interface method '{name}' cannot have a body"
            }
            DiagnosticKind::AssignmentToReadOnly => "cannot assign to read-only '{name}'",
            DiagnosticKind::ShadowsOuterBinding => "'{name}' shadows a binding of an outer scope",
            DiagnosticKind::RestParameterMustBeArray => {
                "a rest parameter must be of type 'Array<T>', found '{type}'"
            }
            DiagnosticKind::NotInstantiable => "'{name}' cannot be instantiated",
        }
    }
}

/// A diagnostic reported against a source span.
///
/// The span's file name identifies the owning unit; rendering goes through
/// that unit to resolve line and column.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    span: Span,
    args: Vec<(&'static str, String)>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, args: Vec<(&'static str, String)>) -> Self {
        Diagnostic { kind, span, args }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The message template with every known placeholder substituted.
    /// Placeholders without a matching argument are left as written.
    pub fn message(&self) -> String {
        PLACEHOLDER
            .replace_all(self.kind.template(), |caps: &Captures| {
                match self.arg(&caps[1]) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// `file:line:col: severity code: message`
    pub fn render(&self, unit: &CompilationUnit) -> String {
        let (line, col) = unit.line_col(&self.span.start);
        format!(
            "{}:{}:{}: {} {}: {}",
            unit.file_name(),
            line,
            col,
            self.severity(),
            self.code(),
            self.message()
        )
    }
}
