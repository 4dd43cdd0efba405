/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node ids, programs and definition attributes
/// - expressions: Expression nodes
/// - patterns: Binding patterns (identifier, array and record)
/// - statements: Statement and definition nodes
/// - types: Type expressions written in annotations
///
/// The tree is immutable once parsed. Semantic results live in side tables
/// owned by the verifier, keyed by `NodeId`.
pub mod ast;
pub mod expressions;
pub mod patterns;
pub mod statements;
pub mod types;
