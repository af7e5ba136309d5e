//! Integration tests for the full pipeline.
//!
//! These tests build crates with the AST builders, run type resolution and
//! lowering through the driver, and check the rendered reference IR.

use frontend_core::{
    ast::{
        ast::Item,
        builder::*,
        expressions::{ArithmeticOrLogicalOperator, ComparisonOperator, LazyBooleanOperator},
    },
    backend::ir::IrBackend,
    driver::{compile_crate, compile_to_ir, Options},
    errors::diagnostics::Diagnostics,
    type_checker::toplevel::CrateScan,
};

fn max_function() -> Item {
    function(
        "max",
        vec![("a", ty("i32")), ("b", ty("i32"))],
        Some(ty("i32")),
        vec![
            expr_stmt(if_expr(
                compare(ComparisonOperator::GreaterThan, ident("a"), ident("b")),
                vec![expr_stmt(ret(Some(ident("a"))))],
                None,
            )),
            expr_stmt(ret(Some(ident("b")))),
        ],
    )
}

#[test]
fn test_compile_program_to_ir() {
    let mut krate = krate(vec![
        struct_item("Pair", vec![("left", ty("i32")), ("right", ty("i32"))]),
        function(
            "main",
            vec![],
            None,
            vec![
                let_stmt(
                    "p",
                    None,
                    Some(struct_expr(
                        "Pair",
                        vec![field("left", int("3")), field("right", int("7"))],
                    )),
                ),
                let_stmt("m", None, Some(call("max", vec![int("3"), int("7")]))),
            ],
        ),
        max_function(),
    ]);
    let mut diagnostics = Diagnostics::new();

    let backend = compile_to_ir(&mut krate, &Options::default(), &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.error_names());
    let backend = backend.expect("compilation should succeed");
    assert!(backend.program().is_some());
    assert_eq!(backend.name(), "crate");
    assert_eq!(
        backend.to_string(),
        "struct Pair { left: i32, right: i32 }

fn main() {
    let p: Pair;
    let m: i32;
    p = Pair { left: 3, right: 7 };
    m = max(3, 7);
}

fn max(a: i32, b: i32) -> i32 {
    let __tmp4: i32;
    if (a > b) {
        return a;
    }
    return b;
}"
    );
}

#[test]
fn test_compile_arrays_and_logic() {
    let mut krate = krate(vec![function(
        "check",
        vec![("values", array_ty(ty("i32"), 2))],
        Some(ty("bool")),
        vec![
            let_stmt("first", None, Some(index(ident("values"), int("0")))),
            expr_stmt(ret(Some(lazy(
                LazyBooleanOperator::And,
                compare(ComparisonOperator::LessThan, ident("first"), int("10")),
                compare(
                    ComparisonOperator::NotEqual,
                    index(ident("values"), int("1")),
                    binary(ArithmeticOrLogicalOperator::Add, ident("first"), int("1")),
                ),
            )))),
        ],
    )]);
    let mut diagnostics = Diagnostics::new();

    let backend = compile_to_ir(&mut krate, &Options::default(), &mut diagnostics)
        .expect("compilation should succeed");

    assert_eq!(
        backend.to_string(),
        "fn check(values: [i32; 2]) -> bool {
    let first: i32;
    let __tmp2: bool;
    first = values[0];
    return ((first < 10) && (values[1] != (first + 1)));
}"
    );
}

#[test]
fn test_resolution_errors_stop_lowering() {
    let mut krate = krate(vec![
        function(
            "main",
            vec![],
            None,
            vec![
                let_stmt("x", Some(ty("bool")), Some(int("1"))),
                expr_stmt(call("missing", vec![])),
            ],
        ),
        max_function(),
    ]);
    let mut diagnostics = Diagnostics::new();

    let backend = compile_to_ir(&mut krate, &Options::default(), &mut diagnostics);

    assert!(backend.is_none());
    assert_eq!(
        diagnostics.error_names(),
        vec!["TypeMismatch", "UnknownFunction"]
    );
}

#[test]
fn test_compile_crate_without_emission() {
    let mut krate = krate(vec![max_function()]);
    let scan = CrateScan::new(&krate);
    let mut backend = IrBackend::new("library");
    let mut diagnostics = Diagnostics::new();
    let options = Options {
        emit: false,
        crate_name: String::from("library"),
    };

    assert!(compile_crate(
        &mut krate,
        &scan,
        &mut backend,
        &mut diagnostics,
        &options
    ));
    assert!(diagnostics.is_empty());
    assert_eq!(backend.function_count(), 1);
    assert!(backend.program().is_none());
}

#[test]
fn test_calls_need_a_toplevel_scan() {
    let mut krate = krate(vec![
        function(
            "main",
            vec![],
            None,
            vec![let_stmt("m", None, Some(call("max", vec![int("1"), int("2")])))],
        ),
        max_function(),
    ]);
    let mut backend = IrBackend::new("crate");
    let mut diagnostics = Diagnostics::new();

    assert!(!compile_crate(
        &mut krate,
        &CrateScan::empty(),
        &mut backend,
        &mut diagnostics,
        &Options::default()
    ));
    assert!(diagnostics.contains("UnknownFunction"));
    assert_eq!(backend.function_count(), 0);
}

#[cfg(feature = "llvm")]
#[test]
fn test_emit_llvm_module() {
    use frontend_core::backend::llvm::emit_module;
    use inkwell::context::Context;

    let mut krate = krate(vec![max_function()]);
    let mut diagnostics = Diagnostics::new();
    let backend = compile_to_ir(&mut krate, &Options::default(), &mut diagnostics)
        .expect("compilation should succeed");

    let context = Context::create();
    let module = emit_module(&backend, &context).expect("module should verify");

    assert!(module.get_function("max").is_some());
    assert!(module
        .print_to_string()
        .to_string()
        .contains("define i32 @max(i32"));
}
