//! Runs both passes over a parsed crate.
//!
//! Lowering is only attempted once type resolution accepted the whole crate;
//! a crate with resolution errors never reaches the backend.

use crate::{
    ast::ast::Crate,
    backend::{ir::IrBackend, Backend},
    compiler::compiler::compile,
    errors::diagnostics::DiagnosticSink,
    type_checker::{
        toplevel::{CrateScan, TopLevelScan},
        type_checker::resolve,
    },
};

#[derive(Debug, Clone)]
pub struct Options {
    /// Call the backend's whole-program emission after a clean lowering
    pub emit: bool,
    /// Name given to the emitted program
    pub crate_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            emit: true,
            crate_name: String::from("crate"),
        }
    }
}

/// Resolves and lowers `krate`. Returns true when both passes finished
/// without errors.
pub fn compile_crate<B: Backend>(
    krate: &mut Crate,
    toplevel: &dyn TopLevelScan,
    backend: &mut B,
    sink: &mut dyn DiagnosticSink,
    options: &Options,
) -> bool {
    if !resolve(krate, toplevel, sink) {
        log::debug!("`{}` failed type resolution", options.crate_name);
        return false;
    }
    compile(krate, backend, sink, options.emit)
}

/// Compiles `krate` into the reference IR, scanning the crate itself for
/// top-level functions. Returns the backend when nothing failed.
pub fn compile_to_ir(
    krate: &mut Crate,
    options: &Options,
    sink: &mut dyn DiagnosticSink,
) -> Option<IrBackend> {
    let scan = CrateScan::new(krate);
    let mut backend = IrBackend::new(&options.crate_name);
    compile_crate(krate, &scan, &mut backend, sink, options).then_some(backend)
}
