//! Crate-wide function index.
//!
//! Type resolution only sees functions declared before the current point in
//! its own scope stack. Calls to anything else are answered by a
//! [`TopLevelScan`], normally built by the parser driver before resolution.

use std::collections::HashMap;

use crate::ast::{ast::Crate, expressions::PathInExpression, statements::FnSignature};

pub trait TopLevelScan {
    fn lookup_function(&self, path: &PathInExpression) -> Option<FnSignature>;
}

/// Indexes every function item of a crate by name.
#[derive(Debug, Default, Clone)]
pub struct CrateScan {
    functions: HashMap<String, FnSignature>,
}

impl CrateScan {
    pub fn new(krate: &Crate) -> Self {
        let functions = krate
            .functions()
            .map(|function| (function.name.clone(), function.signature()))
            .collect();
        CrateScan { functions }
    }

    /// A scan that knows no functions.
    pub fn empty() -> Self {
        CrateScan::default()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl TopLevelScan for CrateScan {
    fn lookup_function(&self, path: &PathInExpression) -> Option<FnSignature> {
        self.functions.get(&path.as_string()).cloned()
    }
}
