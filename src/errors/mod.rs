//! Error types and diagnostics.
//!
//! - `errors` holds syntax errors raised by the lexer and the parser. They
//!   stop the parse of the unit they occur in.
//! - `diagnostics` holds the semantic diagnostics reported by the verifier.
//!   They never interrupt verification.

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
