//! Static semantic verification.
//!
//! The verifier resolves every definition of a program into symbols and
//! types, checks expressions and statements against them and reports
//! problems as diagnostics on the program's compilation unit. It never
//! stops at the first problem: each check substitutes `*` or an existing
//! symbol and carries on.

mod builtins;
mod definitions;
mod expressions;
mod functions;
mod patterns;
pub mod scope;
mod statements;
pub mod symbols;
mod type_expressions;
pub mod types;
pub mod verifier;

pub use verifier::{Verifier, VerifierOptions};

#[cfg(test)]
mod tests;
