//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout semantic analysis and
//! lowering. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for resolution, lowering and the backend
//! - The diagnostic sink interface and the per-pass error handler

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
