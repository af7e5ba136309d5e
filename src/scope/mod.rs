//! Lexically scoped symbol tables shared by both passes.
//!
//! Type resolution instantiates the stack with resolved types and AST
//! declarations, lowering instantiates it with backend handles.

pub mod scope;

#[cfg(test)]
mod tests;
