//! Loading programs from disk.
//!
//! The driver reads a source file, parses it and recursively loads every
//! `include "file";` it contains. Included paths are relative to the
//! including file. Each included file gets its own `CompilationUnit`,
//! attached to the includer's unit so validity and diagnostics aggregate.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::debug;
use thiserror::Error;

use crate::{
    ast::{ast::Program, statements::Stmt},
    compilation_unit::CompilationUnit,
    display_error,
    parser::parser::parse_program,
};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{rendered}")]
    Syntax { rendered: String },
    #[error("{} is included recursively", .path.display())]
    IncludeCycle { path: PathBuf },
}

/// Parses in-memory source. `include` directives are left unresolved.
pub fn parse_source(file_name: &str, text: &str) -> Result<Program, DriverError> {
    let unit = CompilationUnit::new(file_name, text);
    parse_unit(&unit)
}

/// Loads the program at `path` together with everything it includes.
///
/// A file reached through several include paths is loaded once; later
/// includes share the first program and its unit.
pub fn load_program(path: &Path) -> Result<Program, DriverError> {
    Loader::default().load(path).map(|(program, _)| program)
}

fn parse_unit(unit: &Rc<CompilationUnit>) -> Result<Program, DriverError> {
    parse_program(unit).map_err(|error| {
        unit.invalidate();
        DriverError::Syntax {
            rendered: display_error(&error, unit),
        }
    })
}

#[derive(Default)]
struct Loader {
    /// Canonical paths of the files currently being loaded.
    including: Vec<PathBuf>,
    loaded: HashMap<PathBuf, Program>,
}

impl Loader {
    /// Returns the program and whether it had been loaded before.
    fn load(&mut self, path: &Path) -> Result<(Program, bool), DriverError> {
        let io_error = |source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        };

        let canonical = path.canonicalize().map_err(io_error)?;
        if self.including.contains(&canonical) {
            return Err(DriverError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }
        if let Some(program) = self.loaded.get(&canonical) {
            debug!("{} already loaded", path.display());
            return Ok((program.clone(), true));
        }

        debug!("loading {}", path.display());
        let text = fs::read_to_string(path).map_err(io_error)?;
        let unit = CompilationUnit::new(path.display().to_string(), text);
        let mut program = parse_unit(&unit)?;

        self.including.push(canonical.clone());
        let expanded = self.expand_includes(&mut program, path.parent().unwrap_or(Path::new("")));
        self.including.pop();
        expanded?;

        self.loaded.insert(canonical, program.clone());
        Ok((program, false))
    }

    fn expand_includes(&mut self, program: &mut Program, base: &Path) -> Result<(), DriverError> {
        for stmt in program.body.iter_mut() {
            if let Stmt::Include(include) = stmt {
                let (included, shared) = self.load(&base.join(&include.source))?;
                if !shared {
                    program.unit.add_included_unit(Rc::clone(&included.unit));
                }
                include.program = Some(included);
            }
        }
        Ok(())
    }
}
