/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Crate, items, patterns and the inert node kinds
/// - expressions: Definitions for various expression types
/// - statements: Definitions for statements and declarations
/// - types: Source type annotations and resolved types
/// - literals: Numeric literal parsing
/// - builder: Construction helpers for trees built without a parser
pub mod ast;
pub mod builder;
pub mod expressions;
pub mod literals;
pub mod statements;
pub mod types;
