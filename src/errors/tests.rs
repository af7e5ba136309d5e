//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::diagnostics::{Diagnostics, Handler, Severity};
use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::{Position, Span};
use std::rc::Rc;

fn span_at(offset: u32) -> Span {
    let position = Position(offset, Rc::new("test.rs".to_string()));
    Span::new(position.clone(), position)
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnknownIdentifier {
            name: "x".to_string(),
        },
        Position(10, Rc::new("test.rs".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnknownIdentifier");
    assert_eq!(error.get_position().0, 10);
}

#[test]
fn test_type_mismatch_message() {
    let error = Error::new(
        ErrorImpl::TypeMismatch {
            expected: "i32".to_string(),
            found: "bool".to_string(),
        },
        Position::null(),
    );

    assert_eq!(error.to_string(), "E0308: expected: i32, found bool");
    assert_eq!(
        error.get_tip(),
        ErrorTip::Suggestion("Expected type `i32`, found `bool`".to_string())
    );
}

#[test]
fn test_missing_type_information_message() {
    let error = Error::new(ErrorImpl::MissingTypeInformation, Position::null());

    assert_eq!(
        error.to_string(),
        "E0282: type annotations or init expression needed"
    );
}

#[test]
fn test_tip_display() {
    assert_eq!(ErrorTip::None.to_string(), "");
    assert_eq!(
        ErrorTip::Suggestion("try this".to_string()).to_string(),
        "try this"
    );
}

#[test]
fn test_handler_counts_and_forwards() {
    let mut diagnostics = Diagnostics::new();
    {
        let mut handler = Handler::new(&mut diagnostics, "test");
        assert!(!handler.saw_errors());

        let reported = handler.error(ErrorImpl::ReturnInVoidFunction, &span_at(3));
        assert!(!reported.is_fatal());

        let reported = handler.fatal(
            ErrorImpl::InvalidLiteral {
                literal: "99999999999999999999999999999999999999999".to_string(),
            },
            &span_at(7),
        );
        assert!(reported.is_fatal());
        assert_eq!(handler.error_count(), 2);
    }

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(
        diagnostics.error_names(),
        vec!["ReturnInVoidFunction", "InvalidLiteral"]
    );
    assert!(diagnostics.has_fatal());
    let first = diagnostics.iter().next().unwrap();
    assert_eq!(first.severity, Severity::Error);
    assert_eq!(first.error.get_position().0, 3);
    assert_eq!(
        first.to_string(),
        "test.rs:3: error: return for void function"
    );
}
