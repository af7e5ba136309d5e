//! Type resolution and semantic analysis module.
//!
//! This module performs type resolution on the AST in place. It:
//!
//! - Binds identifiers, types, structs and functions through a scope stack
//! - Infers the type of every expression and checks compatibility
//! - Checks call arity and argument types against the callee's signature
//! - Annotates the tree with what lowering needs (inferred types, callees,
//!   and the locals of every function and block)
//!
//! Errors are reported as they are found and resolution carries on with the
//! next statement or item, so one run surfaces as many errors as possible.

pub mod expr;
pub mod stmt;
pub mod toplevel;
pub mod type_checker;
