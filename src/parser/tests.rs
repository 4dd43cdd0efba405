//! Unit tests for the parser module.
//!
//! Covers definitions, attributes, patterns, type annotations, function
//! bodies and the flags the parser computes for them.

use std::rc::Rc;

use super::parser::parse;
use crate::ast::expressions::ExprKind;
use crate::ast::patterns::PatternKind;
use crate::ast::statements::{FunctionBody, FunctionDefinition, ParameterKind, Stmt};
use crate::ast::types::TypeExprKind;
use crate::ast::ast::Visibility;
use crate::errors::errors::{Error, ErrorImpl};
use crate::lexer::lexer::tokenize;

fn parse_source(source: &str) -> Result<Vec<Stmt>, Error> {
    let tokens = tokenize(source.to_string(), Some("test.as".to_string())).unwrap();
    parse(tokens, Rc::new("test.as".to_string()))
}

fn parse_ok(source: &str) -> Vec<Stmt> {
    match parse_source(source) {
        Ok(body) => body,
        Err(error) => panic!("unexpected parse error: {:?}", error),
    }
}

fn only_function(source: &str) -> FunctionDefinition {
    match parse_ok(source).remove(0) {
        Stmt::Function(def) => def,
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_variable_definition() {
    let body = parse_ok("var x:Number = 42, y = \"a\";");

    let Stmt::Variable(def) = &body[0] else { panic!("expected a variable definition") };
    assert!(!def.read_only);
    assert_eq!(def.bindings.len(), 2);
    assert_eq!(def.bindings[0].pattern.identifier_name(), Some("x"));
    assert!(matches!(
        def.bindings[0].pattern.annotation.as_ref().map(|t| &t.kind),
        Some(TypeExprKind::Name(name)) if name == "Number"
    ));
    assert!(def.bindings[1].pattern.annotation.is_none());
}

#[test]
fn test_parse_const_requires_value() {
    let error = parse_source("const PI;").err().unwrap();
    assert_eq!(error.get_internal_error(), &ErrorImpl::ExpectedExplicitValue);
}

#[test]
fn test_parse_expression_bodied_function() {
    let def = only_function("function f():Number 10;");

    assert_eq!(def.name, "f");
    assert!(def.common.params.is_empty());
    assert!(matches!(
        def.common.result.as_ref().map(|t| &t.kind),
        Some(TypeExprKind::Name(name)) if name == "Number"
    ));
    let FunctionBody::Expression(expr) = &def.common.body else { panic!("expected an expression body") };
    assert!(matches!(expr.kind, ExprKind::Number(value) if value == 10.0));
}

#[test]
fn test_parse_parameter_kinds() {
    let def = only_function("function f(a:Number, b:Number = 1, ...rest:Array<String>):void {}");

    let kinds = def.common.params.iter().map(|p| p.kind).collect::<Vec<ParameterKind>>();
    assert_eq!(
        kinds,
        vec![ParameterKind::Required, ParameterKind::Optional, ParameterKind::Rest]
    );
    assert!(def.common.params[1].default.is_some());
    assert!(matches!(
        def.common.params[2].pattern.annotation.as_ref().map(|t| &t.kind),
        Some(TypeExprKind::Parameterized { base, arguments }) if base == "Array" && arguments.len() == 1
    ));
}

#[test]
fn test_parse_required_after_optional_is_rejected() {
    let error = parse_source("function f(a = 1, b) {}").err().unwrap();
    assert_eq!(error.get_internal_error(), &ErrorImpl::IllegalParameterOrder);

    let error = parse_source("function f(...a, b) {}").err().unwrap();
    assert_eq!(error.get_internal_error(), &ErrorImpl::IllegalParameterOrder);
}

#[test]
fn test_all_paths_return() {
    let returns = |source: &str| match only_function(source).common.body {
        FunctionBody::Block { all_paths_return, .. } => all_paths_return,
        _ => panic!("expected a block body"),
    };

    assert!(returns("function f():Number { return 1; }"));
    assert!(returns("function f(a:Boolean):Number { if (a) return 1; else { return 2; } }"));
    assert!(!returns("function f(a:Boolean):Number { if (a) return 1; }"));
    assert!(!returns("function f(a:Boolean):Number { while (a) { return 1; } }"));
    assert!(returns("function f(a:Boolean):Number { { return 1; } }"));
}

#[test]
fn test_await_and_yield_flags() {
    let def = only_function("function f():Promise<Number> { var x = await g(); return x; }");
    assert!(def.common.contains_await);
    assert!(!def.common.contains_yield);

    let def = only_function("function f() { yield 1; yield; }");
    assert!(def.common.contains_yield);
    assert!(!def.common.contains_await);
}

#[test]
fn test_parse_interface_method_without_body() {
    let body = parse_ok("interface Shape { function area():Number; }");

    let Stmt::Class(def) = &body[0] else { panic!("expected an interface") };
    assert!(def.is_interface);
    let Stmt::Function(method) = &def.body[0] else { panic!("expected a method") };
    assert!(matches!(method.common.body, FunctionBody::None));
}

#[test]
fn test_parse_class_with_attributes() {
    let body = parse_ok(
        "public class Circle extends Shape {
            private var radius:Number = 1;
            static const UNIT:Number = 1;
            override public function area():Number 3.14 * this.radius * this.radius;
        }",
    );

    let Stmt::Class(def) = &body[0] else { panic!("expected a class") };
    assert_eq!(def.name, "Circle");
    assert_eq!(def.attributes.visibility, Some(Visibility::Public));
    assert!(matches!(def.extends.as_ref().map(|t| &t.kind), Some(TypeExprKind::Name(n)) if n == "Shape"));
    assert_eq!(def.body.len(), 3);

    let Stmt::Variable(radius) = &def.body[0] else { panic!("expected a field") };
    assert_eq!(radius.attributes.visibility(), Visibility::Private);
    let Stmt::Variable(unit) = &def.body[1] else { panic!("expected a constant") };
    assert!(unit.attributes.is_static && unit.read_only);
    let Stmt::Function(area) = &def.body[2] else { panic!("expected a method") };
    assert!(area.attributes.is_override);
    assert_eq!(area.attributes.visibility(), Visibility::Public);
}

#[test]
fn test_definitions_only_at_top_level_or_in_classes() {
    let error = parse_source("function f() { function g() {} }").err().unwrap();
    assert_eq!(error.get_error_name(), "DefinitionNotAllowedHere");

    let error = parse_source("class A { class B {} }").err().unwrap();
    assert_eq!(error.get_error_name(), "DefinitionNotAllowedHere");

    let error = parse_source("if (true) function g() {}").err().unwrap();
    assert_eq!(error.get_error_name(), "DefinitionNotAllowedHere");

    let error = parse_source("class A { x = 1; }").err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_destructuring_patterns() {
    let body = parse_ok("var [a, [b], ...rest]:Array<Number> = xs, {x, y: [first]:Array<Number>} = p;");

    let Stmt::Variable(def) = &body[0] else { panic!("expected a variable definition") };

    let PatternKind::Array { elements, rest } = &def.bindings[0].pattern.kind else {
        panic!("expected an array pattern")
    };
    assert_eq!(elements.len(), 2);
    assert!(matches!(elements[1].kind, PatternKind::Array { .. }));
    assert_eq!(rest.as_ref().and_then(|r| r.identifier_name()), Some("rest"));

    let record = &def.bindings[1].pattern;
    let PatternKind::Record { fields } = &record.kind else { panic!("expected a record pattern") };
    assert_eq!(fields[0].key, "x");
    assert_eq!(fields[0].value.identifier_name(), Some("x"));
    assert!(fields[1].value.annotation.is_some());

    let names = record
        .leaves()
        .iter()
        .filter_map(|leaf| leaf.identifier_name())
        .collect::<Vec<&str>>();
    assert_eq!(names, vec!["x", "first"]);
}

#[test]
fn test_parse_type_annotations() {
    let body = parse_ok("var a:*; var b:[String]; var c:Array<Promise<Number>>;");

    let kind = |i: usize| match &body[i] {
        Stmt::Variable(def) => def.bindings[0].pattern.annotation.as_ref().map(|t| t.kind.clone()),
        _ => None,
    };

    assert!(matches!(kind(0), Some(TypeExprKind::Any)));
    assert!(matches!(kind(1), Some(TypeExprKind::Array(_))));
    assert!(matches!(
        kind(2),
        Some(TypeExprKind::Parameterized { ref arguments, .. })
            if matches!(arguments[0].kind, TypeExprKind::Parameterized { .. })
    ));
}

#[test]
fn test_operator_precedence() {
    let body = parse_ok("x = 1 + 2 * 3 - 4;");

    let Stmt::Expression(expr) = &body[0] else { panic!("expected an expression") };
    let ExprKind::Assignment { value, .. } = &expr.kind else { panic!("expected an assignment") };
    // (1 + (2 * 3)) - 4
    let ExprKind::Binary { left, right, .. } = &value.kind else { panic!("expected a binary") };
    assert!(matches!(right.kind, ExprKind::Number(v) if v == 4.0));
    let ExprKind::Binary { right: product, .. } = &left.kind else { panic!("expected a binary") };
    assert!(matches!(product.kind, ExprKind::Binary { .. }));
}

#[test]
fn test_parse_new_member_and_call() {
    let body = parse_ok("new Circle(2).area();");

    let Stmt::Expression(expr) = &body[0] else { panic!("expected an expression") };
    let ExprKind::Call { callee, arguments } = &expr.kind else { panic!("expected a call") };
    assert!(arguments.is_empty());
    let ExprKind::Member { object, property, .. } = &callee.kind else { panic!("expected a member") };
    assert_eq!(property, "area");
    assert!(matches!(&object.kind, ExprKind::New { arguments, .. } if arguments.len() == 1));
}

#[test]
fn test_parse_include_directive() {
    let body = parse_ok("include \"lib.as\";");

    let Stmt::Include(include) = &body[0] else { panic!("expected an include") };
    assert_eq!(include.source, "lib.as");
    assert!(include.program.is_none());

    let error = parse_source("function f() { include \"x.as\"; }").err().unwrap();
    assert_eq!(error.get_error_name(), "DefinitionNotAllowedHere");
}

#[test]
fn test_invalid_assignment_target() {
    let error = parse_source("1 = 2;").err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_missing_semicolon() {
    let error = parse_source("var x = 1").err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedToken");
}

#[test]
fn test_spans_cover_definitions() {
    let source = "var x = 1;\nfunction f():Number 10;";
    let body = parse_ok(source);

    assert_eq!(body[0].span().start.0, 0);
    assert_eq!(body[0].span().end.0, 10);
    assert_eq!(body[1].span().start.0, 11);
    assert_eq!(body[1].span().end.0 as usize, source.len());
}
