//! Reporting side of error handling.
//!
//! Passes never print anything themselves: every error goes through a
//! [`Handler`], which forwards it to an external [`DiagnosticSink`] and hands
//! back a [`Reported`] token. Pass operations return `Result<T, Reported>`, so
//! an `Err` always means the failure has already been reported and the caller
//! should only abandon its dependent work.

use std::fmt::Display;

use crate::Span;

use super::errors::{Error, ErrorImpl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    /// Ends analysis of the current top-level item.
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: Error,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.error.get_position(),
            self.severity,
            self.error
        )
    }
}

/// Receives located diagnostics. Rendering them is up to the implementor.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// A sink that keeps every diagnostic in emission order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_names(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.error.get_error_name())
            .collect()
    }

    pub fn contains(&self, error_name: &str) -> bool {
        self.error_names().contains(&error_name)
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Fatal)
    }
}

impl DiagnosticSink for Diagnostics {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Proof that a failure was reported to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reported(Severity);

impl Reported {
    pub fn severity(&self) -> Severity {
        self.0
    }

    pub fn is_fatal(&self) -> bool {
        self.0 == Severity::Fatal
    }
}

/// Per-pass wrapper around the sink that tracks the pass's error count.
pub struct Handler<'a> {
    sink: &'a mut dyn DiagnosticSink,
    stage: &'static str,
    errors: usize,
}

impl<'a> Handler<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink, stage: &'static str) -> Self {
        Handler {
            sink,
            stage,
            errors: 0,
        }
    }

    pub fn error(&mut self, error: ErrorImpl, span: &Span) -> Reported {
        self.report(Severity::Error, error, span)
    }

    pub fn fatal(&mut self, error: ErrorImpl, span: &Span) -> Reported {
        self.report(Severity::Fatal, error, span)
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn saw_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn report(&mut self, severity: Severity, error: ErrorImpl, span: &Span) -> Reported {
        let error = Error::new(error, span.start.clone());
        log::debug!(
            "[{}] {} {} at {}: {}",
            self.stage,
            severity,
            error.get_error_name(),
            error.get_position(),
            error
        );
        self.errors += 1;
        self.sink.emit(Diagnostic { severity, error });
        Reported(severity)
    }
}
