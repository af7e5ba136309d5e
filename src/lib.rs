#![allow(clippy::module_inception)]

//! Semantic analysis and lowering core of a compiler front end for a small
//! Rust-like language.
//!
//! A parsed [`ast::ast::Crate`] is checked by
//! [`type_checker::type_checker::TypeResolution`], which annotates the tree in
//! place, and then lowered by [`compiler::compiler::Compilation`] into any
//! [`backend::Backend`]. [`driver::compile_crate`] runs both passes.

use std::rc::Rc;

pub mod ast;
pub mod backend;
pub mod compiler;
pub mod driver;
pub mod errors;
pub mod scope;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn predeclared() -> Self {
        Position(0, Rc::new(String::from("<predeclared>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// Location used for builtin declarations that have no source text.
    pub fn predeclared() -> Self {
        Span {
            start: Position::predeclared(),
            end: Position::predeclared(),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let position = Position(42, Rc::new(String::from("main.rs")));
        assert_eq!(position.to_string(), "main.rs:42");
    }

    #[test]
    fn test_predeclared_span() {
        let span = Span::predeclared();
        assert_eq!(span.start.1.as_str(), "<predeclared>");
        assert_eq!(span.start, span.end);
    }
}
