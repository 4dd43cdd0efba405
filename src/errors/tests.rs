//! Unit tests for syntax errors and diagnostics.

use std::rc::Rc;

use crate::compilation_unit::CompilationUnit;
use crate::errors::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::{diag_args, Position, Span};

fn span_at(unit: &CompilationUnit, start: u32, end: u32) -> Span {
    Span {
        start: Position(start, unit.file()),
        end: Position(end, unit.file()),
    }
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(10, Rc::new("test.as".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_position() {
    let pos = Position(42, Rc::new("test.as".to_string()));
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        pos.clone(),
    );

    assert_eq!(error.get_position().0, 42);
}

#[test]
fn test_definition_not_allowed_error() {
    let error = Error::new(
        ErrorImpl::DefinitionNotAllowedHere {
            kind: "class".to_string(),
        },
        Position(0, Rc::new("test.as".to_string())),
    );

    assert_eq!(error.get_error_name(), "DefinitionNotAllowedHere");
    assert_eq!(
        error.get_internal_error().to_string(),
        "class definition not allowed here"
    );
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(0, Rc::new("test.as".to_string())),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        Position(0, Rc::new("test.as".to_string())),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_diagnostic_codes_are_stable() {
    assert_eq!(DiagnosticKind::MissingTypeContext.code(), 1001);
    assert_eq!(DiagnosticKind::AnnotationTypeMismatch.code(), 1002);
    assert_eq!(DiagnosticKind::RedeclaredTypeMismatch.code(), 1003);
    assert_eq!(DiagnosticKind::InheritedMemberConflict.code(), 1004);
    assert_eq!(DiagnosticKind::NotAllPathsReturn.code(), 1005);
    assert_eq!(DiagnosticKind::TooFewArguments.code(), 1006);
    assert_eq!(DiagnosticKind::TooManyArguments.code(), 1007);
    assert_eq!(DiagnosticKind::NotInstantiable.code(), 1030);
}

#[test]
fn test_shadowing_is_the_only_warning() {
    assert_eq!(DiagnosticKind::ShadowsOuterBinding.severity(), Severity::Warning);
    assert_eq!(DiagnosticKind::DuplicateDefinition.severity(), Severity::Error);
}

#[test]
fn test_diagnostic_message_interpolation() {
    let unit = CompilationUnit::new("test.as", "var x = 1;");
    let diagnostic = Diagnostic::new(
        DiagnosticKind::AnnotationTypeMismatch,
        span_at(&unit, 4, 5),
        diag_args!["annotated" => "String", "inferred" => "Number"],
    );

    assert_eq!(
        diagnostic.message(),
        "annotated type 'String' does not match inferred type 'Number'"
    );
    assert_eq!(diagnostic.arg("inferred"), Some("Number"));
}

#[test]
fn test_diagnostic_missing_argument_keeps_placeholder() {
    let unit = CompilationUnit::new("test.as", "");
    let diagnostic = Diagnostic::new(DiagnosticKind::UndefinedName, span_at(&unit, 0, 0), vec![]);

    assert_eq!(diagnostic.message(), "'{name}' is not defined");
}

#[test]
fn test_diagnostic_render() {
    let unit = CompilationUnit::new("main.as", "var a = 1;\nvar b = c;\n");
    let diagnostic = Diagnostic::new(
        DiagnosticKind::UndefinedName,
        span_at(&unit, 19, 20),
        diag_args!["name" => "c"],
    );

    assert_eq!(
        diagnostic.render(&unit),
        "main.as:2:9: error 1010: 'c' is not defined"
    );
}

#[test]
fn test_unit_sorts_diagnostics_by_position() {
    let unit = CompilationUnit::new("main.as", "a; b; c;");
    unit.add_diagnostic(Diagnostic::new(
        DiagnosticKind::UndefinedName,
        span_at(&unit, 6, 7),
        diag_args!["name" => "c"],
    ));
    unit.add_diagnostic(Diagnostic::new(
        DiagnosticKind::UndefinedName,
        span_at(&unit, 0, 1),
        diag_args!["name" => "a"],
    ));

    let names = unit
        .diagnostics()
        .iter()
        .map(|d| d.arg("name").unwrap_or_default().to_string())
        .collect::<Vec<String>>();
    assert_eq!(names, vec!["a", "c"]);
    assert!(!unit.is_valid());
}

#[test]
fn test_warnings_do_not_invalidate_unit() {
    let unit = CompilationUnit::new("main.as", "var x;");
    unit.add_diagnostic(Diagnostic::new(
        DiagnosticKind::ShadowsOuterBinding,
        span_at(&unit, 4, 5),
        diag_args!["name" => "x"],
    ));

    assert!(unit.is_valid());
    assert!(!unit.is_free_of_warnings());
}

#[test]
fn test_included_unit_errors_propagate() {
    let main = CompilationUnit::new("main.as", "include \"lib.as\";");
    let lib = CompilationUnit::new("lib.as", "x;");
    lib.add_diagnostic(Diagnostic::new(
        DiagnosticKind::UndefinedName,
        span_at(&lib, 0, 1),
        diag_args!["name" => "x"],
    ));
    main.add_included_unit(Rc::clone(&lib));

    assert!(lib.diagnostics().len() == 1);
    assert!(main.diagnostics().is_empty());
    assert_eq!(main.nested_diagnostics().len(), 1);
    assert_eq!(
        main.render_nested_diagnostics(),
        vec!["lib.as:1:1: error 1010: 'x' is not defined".to_string()]
    );
    assert!(!main.is_valid());
}
