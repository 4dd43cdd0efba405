//! Integration tests for the whole pipeline.
//!
//! These tests write source files to a temporary directory, load them with
//! the driver (following includes) and verify the resulting programs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use scriptverify::{
    driver::{load_program, DriverError},
    verifier::{Verifier, VerifierOptions},
};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_verify_program_with_nested_includes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib/shapes.as", "include \"math.as\";\nclass Circle { var r:Number = unit(); }");
    write(dir.path(), "lib/math.as", "function unit():Number 1;");
    let main = write(
        dir.path(),
        "main.as",
        "include \"lib/shapes.as\";\nvar c:Circle = new Circle();\nvar area:Number = c.r * c.r;",
    );

    let program = load_program(&main).unwrap();
    assert_eq!(program.unit.included_units().len(), 1);
    assert_eq!(program.unit.included_units()[0].included_units().len(), 1);

    let mut verifier = Verifier::new(VerifierOptions::default());
    assert!(verifier.verify_program(&program));
    assert!(program.unit.render_nested_diagnostics().is_empty());
    assert!(verifier.all_programs_valid());
}

#[test]
fn test_file_included_along_two_paths_is_loaded_once() {
    let dir = tempdir().unwrap();
    write(dir.path(), "shared.as", "function shared():Number 1;");
    write(dir.path(), "a.as", "include \"shared.as\";\nvar a:Number = shared();");
    write(dir.path(), "b.as", "include \"shared.as\";\nvar b:Number = shared() + a;");
    let main = write(dir.path(), "main.as", "include \"a.as\";\ninclude \"b.as\";");

    let program = load_program(&main).unwrap();
    let units = program.unit.included_units();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].included_units().len(), 1);
    assert!(units[1].included_units().is_empty());

    let mut verifier = Verifier::new(VerifierOptions::default());
    assert!(verifier.verify_program(&program));
    assert!(program.unit.render_nested_diagnostics().is_empty());
}

#[test]
fn test_diagnostics_of_included_units_are_rendered_with_their_path() {
    let dir = tempdir().unwrap();
    let library = write(dir.path(), "lib.as", "var bad:Number = \"s\";");
    let main = write(dir.path(), "main.as", "include \"lib.as\";\nvar x;");

    let program = load_program(&main).unwrap();
    let mut verifier = Verifier::new(VerifierOptions::default());
    assert!(!verifier.verify_program(&program));

    let lines = program.unit.render_nested_diagnostics();
    assert_eq!(
        lines,
        vec![
            format!(
                "{}:2:5: error 1001: 'x' has no type annotation and no type could be inferred",
                main.display()
            ),
            format!(
                "{}:1:5: error 1002: annotated type 'Number' does not match inferred type 'String'",
                library.display()
            ),
        ]
    );
    assert!(!program.unit.included_units()[0].is_valid());
}

#[test]
fn test_include_cycle_is_rejected() {
    let dir = tempdir().unwrap();
    let first = write(dir.path(), "a.as", "include \"b.as\";");
    write(dir.path(), "b.as", "include \"a.as\";");

    let error = load_program(&first).err().unwrap();
    assert!(matches!(error, DriverError::IncludeCycle { .. }));
    assert!(error.to_string().ends_with("a.as is included recursively"));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let main = write(dir.path(), "main.as", "include \"missing.as\";");

    let error = load_program(&main).err().unwrap();
    assert!(matches!(error, DriverError::Io { ref path, .. } if path.ends_with("missing.as")));
}

#[test]
fn test_syntax_error_is_rendered() {
    let dir = tempdir().unwrap();
    let main = write(dir.path(), "main.as", "var x:Number = 1;\nvar y = ;");

    let Err(DriverError::Syntax { rendered }) = load_program(&main) else {
        panic!("expected a syntax error")
    };
    assert!(rendered.starts_with("Error: "));
    assert!(rendered.contains("2 | var y = ;"));
}

#[test]
fn test_warnings_as_errors() {
    let dir = tempdir().unwrap();
    let main = write(
        dir.path(),
        "main.as",
        "function f():void {\n    var a = 1;\n    while (a < 2) { var a = 3; }\n}",
    );

    let program = load_program(&main).unwrap();
    let mut lenient = Verifier::new(VerifierOptions::default());
    assert!(lenient.verify_program(&program));
    assert_eq!(
        program.unit.render_nested_diagnostics(),
        vec![format!(
            "{}:3:25: warning 1028: 'a' shadows a binding of an outer scope",
            main.display()
        )]
    );

    let program = load_program(&main).unwrap();
    let mut strict = Verifier::new(VerifierOptions {
        warnings_as_errors: true,
    });
    assert!(!strict.verify_program(&program));
    assert!(!strict.all_programs_valid());
}

#[test]
fn test_verifying_several_files() {
    let dir = tempdir().unwrap();
    let valid = write(dir.path(), "valid.as", "var greeting:String = \"hello\";\ntrace(greeting);");
    let invalid = write(dir.path(), "invalid.as", "var greeting:String = 1;");

    let programs = vec![load_program(&valid).unwrap(), load_program(&invalid).unwrap()];
    let mut verifier = Verifier::new(VerifierOptions::default());

    assert!(verifier.verify_program(&programs[0]));
    assert!(!verifier.verify_program(&programs[1]));
    assert!(!verifier.all_programs_valid());
    // Each file has its own package scope, so the second `greeting` is not
    // a redeclaration.
    assert_eq!(
        programs[1]
            .unit
            .diagnostics()
            .iter()
            .map(|d| d.code())
            .collect::<Vec<u32>>(),
        vec![1002]
    );
}
