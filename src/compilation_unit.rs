//! Source units and their diagnostics.
//!
//! A `CompilationUnit` owns the text of one source file together with the
//! diagnostics reported against it. Units that were textually included by
//! another unit (through `include "file";`) are attached to the including
//! unit so that validity and diagnostic listings can be aggregated.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    errors::diagnostics::{Diagnostic, Severity},
    get_line_at_position, Position,
};

#[derive(Debug)]
pub struct CompilationUnit {
    file_name: Rc<String>,
    text: String,
    diagnostics: RefCell<Vec<Diagnostic>>,
    included_units: RefCell<Vec<Rc<CompilationUnit>>>,
    invalidated: Cell<bool>,
}

impl CompilationUnit {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Rc<Self> {
        Rc::new(CompilationUnit {
            file_name: Rc::new(file_name.into()),
            text: text.into(),
            diagnostics: RefCell::new(vec![]),
            included_units: RefCell::new(vec![]),
            invalidated: Cell::new(false),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The shared file name used in every `Position` of this unit.
    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file_name)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn add_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// Drops every diagnostic reported after the first `len`.
    pub(crate) fn truncate_diagnostics(&self, len: usize) {
        self.diagnostics.borrow_mut().truncate(len);
    }

    /// Diagnostics of this unit only, sorted by source position.
    ///
    /// Sorting is stable, so diagnostics at the same offset keep the order in
    /// which they were reported.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut list = self.diagnostics.borrow().clone();
        list.sort_by_key(|d| d.span().start.0);
        list
    }

    /// Diagnostics of this unit followed by those of every included unit,
    /// grouped per unit in inclusion order.
    pub fn nested_diagnostics(&self) -> Vec<Diagnostic> {
        let mut list = self.diagnostics();
        for unit in self.included_units.borrow().iter() {
            list.extend(unit.nested_diagnostics());
        }
        list
    }

    /// Renders `nested_diagnostics`, each line resolved against the unit
    /// that owns the diagnostic.
    pub fn render_nested_diagnostics(&self) -> Vec<String> {
        let mut lines = self
            .diagnostics()
            .iter()
            .map(|d| d.render(self))
            .collect::<Vec<String>>();
        for unit in self.included_units.borrow().iter() {
            lines.extend(unit.render_nested_diagnostics());
        }
        lines
    }

    pub fn add_included_unit(&self, unit: Rc<CompilationUnit>) {
        self.included_units.borrow_mut().push(unit);
    }

    pub fn included_units(&self) -> Vec<Rc<CompilationUnit>> {
        self.included_units.borrow().clone()
    }

    /// Marks the unit invalid regardless of its diagnostics, e.g. after a
    /// syntax error.
    pub fn invalidate(&self) {
        self.invalidated.set(true);
    }

    /// Whether this unit has any diagnostic of the given severity, not
    /// looking into included units.
    pub fn has_own(&self, severity: Severity) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.severity() == severity)
    }

    /// A unit is valid when neither it nor any unit it includes carries an
    /// error-severity diagnostic.
    pub fn is_valid(&self) -> bool {
        !self.invalidated.get()
            && !self.has_own(Severity::Error)
            && self.included_units.borrow().iter().all(|u| u.is_valid())
    }

    /// Like `is_valid`, also rejecting warnings.
    pub fn is_free_of_warnings(&self) -> bool {
        !self.has_own(Severity::Warning)
            && self
                .included_units
                .borrow()
                .iter()
                .all(|u| u.is_free_of_warnings())
    }

    /// Converts a byte offset into a 1-based `(line, column)` pair.
    pub fn line_col(&self, position: &Position) -> (usize, usize) {
        let (line, _, line_pos) = get_line_at_position(&self.text, position.0);
        (line, line_pos + 1)
    }
}
