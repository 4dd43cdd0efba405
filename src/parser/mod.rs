//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Definitions (variables, functions, classes, interfaces) and their attributes
//! - Destructuring patterns
//! - Statements and expressions
//! - Type annotations
//! - `include` directives
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod patterns;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
