use std::rc::Rc;

use crate::{
    ast::{ast::Program, statements::Stmt},
    driver::parse_source,
};

use super::{
    patterns::PatternContext,
    scope::PropertiesRef,
    types::TypeId,
    verifier::{Verifier, VerifierOptions},
};

fn verify_with(source: &str, options: VerifierOptions) -> (Verifier, Program, bool) {
    let program = parse_source("test.as", source).unwrap();
    let mut verifier = Verifier::new(options);
    let valid = verifier.verify_program(&program);
    (verifier, program, valid)
}

fn verify(source: &str) -> (Verifier, Program) {
    let (verifier, program, _) = verify_with(source, VerifierOptions::default());
    (verifier, program)
}

fn codes(program: &Program) -> Vec<u32> {
    program.unit.nested_diagnostics().iter().map(|d| d.code()).collect()
}

fn global_type(verifier: &Verifier, program: &Program, name: &str) -> TypeId {
    let symbol = verifier.resolve_global(program, name).unwrap();
    verifier.symbol(symbol).static_type.unwrap()
}

#[test]
fn test_expression_bodied_function() {
    let (verifier, program) = verify("function f():Number 10;");

    assert!(codes(&program).is_empty());
    let signature = global_type(&verifier, &program, "f");
    let result = verifier.types().function_type(signature).unwrap().result;
    assert_eq!(result, verifier.types().number);
    assert_eq!(verifier.display_type(signature), "function():Number");
}

#[test]
fn test_parameterized_types_are_interned() {
    let (verifier, program) = verify("var a:Array<Number>; var b:[Number]; var c:Array<String>;");

    assert!(codes(&program).is_empty());
    let a = global_type(&verifier, &program, "a");
    assert_eq!(a, global_type(&verifier, &program, "b"));
    assert_ne!(a, global_type(&verifier, &program, "c"));
    assert_eq!(verifier.display_type(a), "Array<Number>");
}

#[test]
fn test_missing_type_context_falls_back_to_any() {
    let (verifier, program) = verify("var x;");

    assert_eq!(codes(&program), vec![1001]);
    assert_eq!(global_type(&verifier, &program, "x"), verifier.types().any);
}

#[test]
fn test_expression_types_follow_annotations() {
    let (verifier, program) = verify("var n:* = 1; var m = 1;");

    let initializer = |index: usize| match &program.body[index] {
        Stmt::Variable(def) => def.bindings[0].initializer.as_ref().unwrap().id,
        _ => panic!("expected a variable definition"),
    };
    assert_eq!(verifier.expression_type(initializer(0)), Some(verifier.types().any));
    assert_eq!(verifier.expression_type(initializer(1)), Some(verifier.types().number));
}

#[test]
fn test_annotation_mismatch() {
    let (verifier, program) = verify("var x:Number = \"a\";");

    assert_eq!(codes(&program), vec![1002]);
    assert_eq!(global_type(&verifier, &program, "x"), verifier.types().number);

    let diagnostic = &program.unit.diagnostics()[0];
    assert_eq!(diagnostic.arg("annotated"), Some("Number"));
    assert_eq!(diagnostic.arg("inferred"), Some("String"));
}

#[test]
fn test_null_and_any_assignments() {
    let (_, program) = verify(
        "var s:String = null;
        var n:Number = null;
        var a:* = 1;
        var m:Number = a;",
    );

    assert_eq!(codes(&program), vec![1002]);
}

#[test]
fn test_subclass_instance_is_assignable_to_base() {
    let (_, program) = verify(
        "class Shape {}
        class Circle extends Shape {}
        var s:Shape = new Circle();
        var c:Circle = new Shape();",
    );

    assert_eq!(codes(&program), vec![1002]);
}

#[test]
fn test_redeclared_variable_reuses_symbol() {
    let (verifier, program) = verify("var x = 1; var x = 2;");

    assert!(codes(&program).is_empty());
    let leaf = |index: usize| match &program.body[index] {
        Stmt::Variable(def) => def.bindings[0].pattern.id,
        _ => panic!("expected a variable definition"),
    };
    assert_eq!(verifier.pattern_symbol(leaf(0)), verifier.pattern_symbol(leaf(1)));
}

#[test]
fn test_redeclared_type_mismatch() {
    let (_, program) = verify("var x:Number; var x:String;");

    assert_eq!(codes(&program), vec![1003]);
    let diagnostic = &program.unit.diagnostics()[0];
    assert_eq!(diagnostic.arg("existing"), Some("Number"));
    assert_eq!(diagnostic.arg("new"), Some("String"));
}

#[test]
fn test_duplicate_definition() {
    let (verifier, program) = verify("function f():void {} var f = 1; const C = 1; const C = 2;");

    assert_eq!(codes(&program), vec![1009, 1009]);
    // The first definition keeps the name.
    let f = global_type(&verifier, &program, "f");
    assert!(verifier.types().function_type(f).is_some());
}

#[test]
fn test_forward_reference_between_variables() {
    let (verifier, program) = verify("var a = b; var b = 1;");

    assert!(codes(&program).is_empty());
    assert_eq!(global_type(&verifier, &program, "a"), verifier.types().number);
}

#[test]
fn test_cyclic_initializers_cannot_be_inferred() {
    let (verifier, program) = verify("var a = b; var b = a;");

    assert_eq!(codes(&program), vec![1022]);
    assert_eq!(global_type(&verifier, &program, "a"), verifier.types().any);
    assert_eq!(global_type(&verifier, &program, "b"), verifier.types().any);
}

#[test]
fn test_cycle_is_reported_once() {
    let (verifier, program) = verify("var {p} = a; var a = b; var b = a;");

    assert_eq!(codes(&program), vec![1022]);
    assert_eq!(program.unit.diagnostics()[0].arg("name"), Some("a"));
    assert_eq!(global_type(&verifier, &program, "p"), verifier.types().any);
    assert_eq!(global_type(&verifier, &program, "b"), verifier.types().any);
}

#[test]
fn test_forward_references_to_functions_and_classes() {
    let (verifier, program) = verify(
        "var c:Circle = make();
        var r = c.r;
        function make():Circle new Circle(2);
        class Circle {
            var r:Number;
            function Circle(r:Number) { this.r = r; }
        }",
    );

    assert!(codes(&program).is_empty(), "{:?}", program.unit.render_nested_diagnostics());
    assert_eq!(global_type(&verifier, &program, "r"), verifier.types().number);
}

#[test]
fn test_forward_references_inside_a_class() {
    let (verifier, program) = verify(
        "class C {
            var a = b;
            var b:Number = 1;
            function m():Number later();
            function later():Number a;
        }",
    );

    assert!(codes(&program).is_empty(), "{:?}", program.unit.render_nested_diagnostics());
    let class = verifier.symbol(verifier.resolve_global(&program, "C").unwrap()).as_type().unwrap();
    let (owner, a) = verifier.types().find_instance_property(class, "a").unwrap();
    assert_eq!(owner, class);
    assert_eq!(verifier.symbol(a).static_type, Some(verifier.types().number));

    let members = verifier
        .types()
        .class(class)
        .unwrap()
        .prototype
        .iter()
        .map(|(name, _)| name)
        .collect::<Vec<&str>>();
    assert_eq!(members, vec!["a", "b", "m", "later"]);
}

#[test]
fn test_constructor_arity() {
    let (_, program) = verify(
        "class Point {
            function Point(x:Number, y:Number) {}
        }
        class Empty {}
        var a = new Point(1);
        var b = new Empty(1);
        var c = new Array(3);",
    );

    assert_eq!(codes(&program), vec![1006, 1007]);
}

#[test]
fn test_call_arity_and_argument_types() {
    let (_, program) = verify(
        "function f(a:Number, b:Number = 1, ...rest:Array<String>):void {}
        function g(a:Number):void {}
        f();
        f(1, 2, \"x\", \"y\", 3);
        g(1, 2);
        f(1);
        f(2, 3);",
    );

    assert_eq!(codes(&program), vec![1006, 1008, 1007]);
    let too_few = &program.unit.diagnostics()[0];
    assert_eq!(too_few.arg("expected"), Some("1"));
    assert_eq!(too_few.arg("got"), Some("0"));
}

#[test]
fn test_conversion_calls() {
    let (verifier, program) = verify("var n = Number(\"4\"); var s = String(); var xs = Array(1);");

    assert_eq!(codes(&program), vec![1006]);
    assert_eq!(global_type(&verifier, &program, "n"), verifier.types().number);
    assert_eq!(verifier.display_type(global_type(&verifier, &program, "xs")), "Array<*>");
}

#[test]
fn test_not_callable() {
    let (_, program) = verify("var n:Number = 1; n();");

    assert_eq!(codes(&program), vec![1015]);
}

#[test]
fn test_not_all_paths_return_reported_once() {
    let (_, program) = verify(
        "function f(a:Boolean):Number {
            if (a) return 1;
            if (a) return 2;
        }
        function g(a:Boolean):Number { if (a) return 1; else return 2; }",
    );

    assert_eq!(codes(&program), vec![1005]);
    assert_eq!(program.unit.diagnostics()[0].arg("type"), Some("Number"));
}

#[test]
fn test_async_function_returns_promise_result() {
    let (verifier, program) = verify(
        "function load():Promise<Number> { var x = await fetch(); return x; }
        function fetch():Promise<Number> { return fetch(); }
        function implicit() { await fetch(); return 1; }",
    );

    assert!(codes(&program).is_empty(), "{:?}", program.unit.render_nested_diagnostics());
    let implicit = global_type(&verifier, &program, "implicit");
    let result = verifier.types().function_type(implicit).unwrap().result;
    assert_eq!(verifier.display_type(result), "Promise<*>");
}

#[test]
fn test_async_function_must_declare_promise() {
    let (_, program) = verify(
        "function fetch():Promise<Number> { return fetch(); }
        function bad():Number { await fetch(); return 1; }",
    );

    assert_eq!(codes(&program), vec![1019]);
}

#[test]
fn test_generator_returns_void() {
    let (_, program) = verify(
        "function counter():Number { yield 1; }
        function early() { yield 1; return 2; }",
    );

    assert_eq!(codes(&program), vec![1008]);
}

#[test]
fn test_return_checks() {
    let (_, program) = verify(
        "return 1;
        function f():Number { return; }
        function g():void { return; }
        function h():* { return; }",
    );

    assert_eq!(codes(&program), vec![1020, 1021]);
}

#[test]
fn test_destructuring() {
    let (verifier, program) = verify(
        "var [a, b]:Array<Number> = [1, 2];
        var {x, y: label} = new Point();
        class Point { var x:Number = 0; var y:String = \"\"; }",
    );

    assert!(codes(&program).is_empty(), "{:?}", program.unit.render_nested_diagnostics());
    let types = verifier.types();
    assert_eq!(global_type(&verifier, &program, "a"), types.number);
    assert_eq!(global_type(&verifier, &program, "x"), types.number);
    assert_eq!(global_type(&verifier, &program, "label"), types.string);
}

#[test]
fn test_destructuring_errors() {
    let (verifier, program) = verify(
        "var [p] = 5;
        var {z} = new Point();
        class Point { var x:Number = 0; }",
    );

    assert_eq!(codes(&program), vec![1014, 1013]);
    assert_eq!(global_type(&verifier, &program, "p"), verifier.types().any);
    assert_eq!(global_type(&verifier, &program, "z"), verifier.types().any);
}

#[test]
fn test_inherited_member_conflicts() {
    let (_, program) = verify(
        "class Base {
            function area():Number 0;
            private function secret():void {}
        }
        class Derived extends Base {
            function area():Number 1;
            function secret():void {}
            override function perimeter():Number 2;
        }",
    );

    assert_eq!(codes(&program), vec![1004, 1004, 1023]);
}

#[test]
fn test_private_base_members_still_conflict() {
    let (_, program) = verify(
        "class Base {
            private var x:Number = 0;
            private function hidden():void {}
        }
        class Derived extends Base {
            var x:Number = 1;
            override function hidden():void {}
        }",
    );

    assert_eq!(codes(&program), vec![1004, 1004]);
}

#[test]
fn test_override_with_same_signature() {
    let (_, program) = verify(
        "class Base { function area():Number 0; }
        class Derived extends Base { override function area():Number 1; }
        class Wrong extends Base { override function area():String \"\"; }",
    );

    assert_eq!(codes(&program), vec![1004]);
}

#[test]
fn test_cyclic_inheritance() {
    let (_, program) = verify("class A extends B {} class B extends A {}");

    assert_eq!(codes(&program), vec![1016]);
}

#[test]
fn test_illegal_super_types() {
    let (_, program) = verify(
        "interface I {}
        class C extends I {}
        interface J extends C {}
        class D extends Undefined {}",
    );

    assert_eq!(codes(&program), vec![1017, 1017, 1011]);
}

#[test]
fn test_interface_rules() {
    let (verifier, program) = verify(
        "interface Shape { function area():Number; function bad():void {} }
        class C { function missing():void; }
        var s = new Shape();",
    );

    assert_eq!(codes(&program), vec![1026, 1025, 1030]);
    assert_eq!(global_type(&verifier, &program, "s"), verifier.types().any);
}

#[test]
fn test_undefined_names_and_types() {
    let (_, program) = verify(
        "var a:Foo;
        var b = c;
        var d:a;
        var e:Array<Number, String>;",
    );

    assert_eq!(codes(&program), vec![1011, 1010, 1012, 1018]);
}

#[test]
fn test_rest_parameter_must_be_array() {
    let (_, program) = verify("function f(...rest:Number):void {} function g(...rest):void {}");

    assert_eq!(codes(&program), vec![1029]);
}

#[test]
fn test_access_and_read_only() {
    let (_, program) = verify(
        "const LIMIT:Number = 10;
        class Account {
            private var balance:Number = 0;
            protected var owner:String = \"\";
            function total():Number this.balance;
        }
        class Savings extends Account {
            function describe():String this.owner;
        }
        LIMIT = 5;
        new Account().balance;
        new Savings().owner;",
    );

    assert_eq!(codes(&program), vec![1027, 1024, 1024]);
}

#[test]
fn test_static_members() {
    let (verifier, program) = verify(
        "class Counter {
            static var count:Number = 0;
            static function next():Number Counter.count + 1;
            function value():Number count;
        }
        var c = Counter.next();
        var bad = Counter.missing;",
    );

    assert_eq!(codes(&program), vec![1013]);
    assert_eq!(global_type(&verifier, &program, "c"), verifier.types().number);
}

#[test]
fn test_this_outside_instance_context() {
    let (_, program) = verify(
        "this;
        class A { static function f():void { this; } }",
    );

    assert_eq!(codes(&program), vec![1010, 1010]);
}

#[test]
fn test_builtin_members() {
    let (verifier, program) = verify(
        "trace(\"a\", 1);
        var n:Number = \"abc\".length;
        var xs:Array<String> = [];
        xs.push(\"a\");
        var size = xs.length;",
    );

    assert!(codes(&program).is_empty(), "{:?}", program.unit.render_nested_diagnostics());
    assert_eq!(global_type(&verifier, &program, "size"), verifier.types().number);
}

#[test]
fn test_operators() {
    let (verifier, program) = verify(
        "var s = \"a\" + 1;
        var n = 1 + 2;
        var b = 1 < 2;
        var bad = 1 - \"a\";
        var t = \"a\";
        t += 1;",
    );

    assert_eq!(codes(&program), vec![1008]);
    let types = verifier.types();
    assert_eq!(global_type(&verifier, &program, "s"), types.string);
    assert_eq!(global_type(&verifier, &program, "n"), types.number);
    assert_eq!(global_type(&verifier, &program, "b"), types.boolean);
}

#[test]
fn test_local_shadowing_warning() {
    let source = "function f(x:Number):void {
            var y = x;
            if (true) { var y = 2; }
        }";

    let (_, program, valid) = verify_with(source, VerifierOptions::default());
    assert_eq!(codes(&program), vec![1028]);
    assert!(valid);

    let (verifier, _, valid) = verify_with(
        source,
        VerifierOptions {
            warnings_as_errors: true,
        },
    );
    assert!(!valid);
    assert!(!verifier.all_programs_valid());
}

#[test]
fn test_locals_are_block_scoped() {
    let (_, program) = verify(
        "function f():void {
            { var inner = 1; }
            inner;
        }",
    );

    assert_eq!(codes(&program), vec![1010]);
}

#[test]
fn test_verify_program_is_idempotent() {
    let program = parse_source("test.as", "var x; var y:Number = \"s\";").unwrap();
    let mut verifier = Verifier::new(VerifierOptions::default());

    assert!(!verifier.verify_program(&program));
    let count = program.unit.diagnostic_count();
    assert!(!verifier.verify_program(&program));
    assert_eq!(program.unit.diagnostic_count(), count);

    // Re-verifying a pattern returns the recorded type without new reports.
    let Stmt::Variable(def) = &program.body[0] else { panic!("expected a variable definition") };
    let package = verifier.package_scopes[&program.id];
    let symbols = verifier.symbols.len();
    verifier.unit = Some(Rc::clone(&program.unit));
    let context = PatternContext::local(PropertiesRef::Scope(package), false);
    let ty = verifier.verify_pattern(&def.bindings[0].pattern, &context, None).unwrap();

    assert_eq!(ty, verifier.types().any);
    assert_eq!(program.unit.diagnostic_count(), count);
    assert_eq!(verifier.symbols.len(), symbols);
}

#[test]
fn test_included_program_joins_the_includer() {
    let library = parse_source("lib.as", "function helper():Number 1;\nvar bad:Number = \"s\";").unwrap();
    let library_unit = Rc::clone(&library.unit);

    let mut main = parse_source("main.as", "include \"lib.as\";\nvar x:Number = helper();").unwrap();
    main.unit.add_included_unit(Rc::clone(&library_unit));
    let Stmt::Include(include) = &mut main.body[0] else { panic!("expected an include") };
    include.program = Some(library);

    let mut verifier = Verifier::new(VerifierOptions::default());
    assert!(!verifier.verify_program(&main));

    assert!(main.unit.diagnostics().is_empty());
    assert_eq!(library_unit.diagnostics().iter().map(|d| d.code()).collect::<Vec<u32>>(), vec![1002]);
    assert_eq!(codes(&main), vec![1002]);
    assert_eq!(
        main.unit.render_nested_diagnostics(),
        vec!["lib.as:2:5: error 1002: annotated type 'Number' does not match inferred type 'String'"]
    );
}

#[test]
fn test_program_included_twice_joins_once() {
    let library = parse_source("lib.as", "function helper():Number 1;").unwrap();
    let mut main = parse_source(
        "main.as",
        "include \"lib.as\";\ninclude \"lib.as\";\nvar x:Number = helper();",
    )
    .unwrap();
    main.unit.add_included_unit(Rc::clone(&library.unit));
    for stmt in main.body.iter_mut() {
        if let Stmt::Include(include) = stmt {
            include.program = Some(library.clone());
        }
    }

    let mut verifier = Verifier::new(VerifierOptions::default());
    assert!(verifier.verify_program(&main));
    assert!(codes(&main).is_empty());
}

#[test]
fn test_programs_get_separate_package_scopes() {
    let first = parse_source("a.as", "var x:Number = 1;").unwrap();
    let second = parse_source("b.as", "var x:String = \"s\"; var y = z;").unwrap();

    let mut verifier = Verifier::new(VerifierOptions::default());
    assert!(!verifier.verify_programs(&[first, second]));
    assert!(!verifier.all_programs_valid());
}

#[test]
fn test_is_assignable() {
    let mut verifier = Verifier::new(VerifierOptions::default());
    let number = verifier.types.number;
    let any = verifier.types.any;
    let numbers = verifier.types.array_of(number);
    let anything = verifier.types.array_of(any);

    assert!(verifier.is_assignable(numbers, anything));
    assert!(!verifier.is_assignable(anything, numbers));
    assert!(verifier.is_assignable(verifier.types.null, verifier.types.string));
    assert!(!verifier.is_assignable(verifier.types.null, number));
    assert!(verifier.is_assignable(number, verifier.types.object));
    assert!(!verifier.is_assignable(verifier.types.void, number));
    assert!(!verifier.is_assignable(verifier.types.string, number));
}
