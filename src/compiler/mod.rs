//! Lowering module for the compiler.
//!
//! This module walks a crate accepted by type resolution and lowers it
//! through the [`Backend`](crate::backend::Backend) interface. It handles:
//!
//! - Registration of primitive and struct types with the backend
//! - Lowering of functions, statements and expressions
//! - Forward declaration of functions called before their definition
//! - Whole-program emission once every item lowered cleanly

pub mod compiler;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;
