use crate::ast::{
    ast::{Crate, Item, UnsupportedExprKind},
    builder::*,
    expressions::{ArithmeticOrLogicalOperator, ComparisonOperator, NegationOperator},
};
use crate::backend::{
    ir::{IrBackend, IrExpr, IrStmt, IrType, VariableId},
    Operator,
};
use crate::compiler::compiler::compile;
use crate::errors::diagnostics::Diagnostics;
use crate::type_checker::{toplevel::CrateScan, type_checker::resolve};

fn resolved(items: Vec<Item>) -> Crate {
    let mut krate = krate(items);
    let scan = CrateScan::new(&krate);
    let mut diagnostics = Diagnostics::new();
    assert!(
        resolve(&mut krate, &scan, &mut diagnostics),
        "{:?}",
        diagnostics.error_names()
    );
    krate
}

fn lower(items: Vec<Item>) -> (IrBackend, Diagnostics, bool) {
    let krate = resolved(items);
    let mut backend = IrBackend::new("test");
    let mut diagnostics = Diagnostics::new();
    let compiled = compile(&krate, &mut backend, &mut diagnostics, true);
    (backend, diagnostics, compiled)
}

fn render(backend: &IrBackend, name: &str) -> String {
    let function = backend.find_function(name).unwrap();
    backend.render_function(function)
}

fn add_function() -> Item {
    function(
        "add",
        vec![("a", ty("i32")), ("b", ty("i32"))],
        Some(ty("i32")),
        vec![expr_stmt(ret(Some(binary(
            ArithmeticOrLogicalOperator::Add,
            ident("a"),
            ident("b"),
        ))))],
    )
}

#[test]
fn test_function_with_return_slot() {
    let (backend, diagnostics, compiled) = lower(vec![add_function()]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(
        render(&backend, "add"),
        "fn add(a: i32, b: i32) -> i32 {\n    let __tmp2: i32;\n    return (a + b);\n}"
    );
}

#[test]
fn test_locals_and_nested_block() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![
            let_stmt("x", None, Some(int("1"))),
            let_stmt("y", Some(ty("bool")), Some(boolean(true))),
            expr_stmt(block(vec![let_stmt("z", None, Some(ident("x")))])),
            expr_stmt(assign(ident("x"), int("2"))),
        ],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(
        render(&backend, "main"),
        "fn main() {
    let x: i32;
    let y: bool;
    x = 1;
    y = true;
    {
        let z: i32;
        z = x;
    }
    x = 2;
}"
    );
}

#[test]
fn test_if_else_if_chain() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "sign",
        vec![("n", ty("i32"))],
        Some(ty("i32")),
        vec![
            expr_stmt(if_expr(
                compare(ComparisonOperator::LessThan, ident("n"), int("0")),
                vec![expr_stmt(ret(Some(negate(NegationOperator::Negate, int("1")))))],
                Some(else_if(
                    compare(ComparisonOperator::Equal, ident("n"), int("0")),
                    vec![expr_stmt(ret(Some(int("0"))))],
                    Some(else_block(vec![expr_stmt(ret(Some(int("1"))))])),
                )),
            )),
            expr_stmt(ret(Some(int("0")))),
        ],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(
        render(&backend, "sign"),
        "fn sign(n: i32) -> i32 {
    let __tmp1: i32;
    if (n < 0) {
        return -1;
    } else {
        if (n == 0) {
            return 0;
        } else {
            return 1;
        }
    }
    return 0;
}"
    );
}

#[test]
fn test_struct_and_array_values() {
    let (backend, diagnostics, compiled) = lower(vec![
        struct_item("P", vec![("x", ty("i32")), ("y", ty("i32"))]),
        function(
            "main",
            vec![],
            None,
            vec![
                let_stmt(
                    "p",
                    None,
                    Some(struct_expr(
                        "P",
                        vec![field("y", int("2")), field("x", int("1"))],
                    )),
                ),
                let_stmt("a", None, Some(array(vec![int("1"), int("2"), int("3")]))),
                let_stmt("b", None, Some(index(ident("a"), int("0")))),
                let_stmt("c", None, Some(array_copied(int("0"), int("2")))),
            ],
        ),
    ]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(
        backend.to_string(),
        "struct P { x: i32, y: i32 }

fn main() {
    let p: P;
    let a: [i32; 3];
    let b: i32;
    let c: [i32; 2];
    p = P { x: 1, y: 2 };
    a = [1, 2, 3];
    b = a[0];
    let __tmp4: i32 = 0;
    c = [__tmp4, __tmp4];
}"
    );
}

#[test]
fn test_repeated_array_value_is_evaluated_once() {
    let (backend, diagnostics, compiled) = lower(vec![
        function(
            "tick",
            vec![],
            Some(ty("i32")),
            vec![expr_stmt(ret(Some(int("1"))))],
        ),
        function(
            "main",
            vec![],
            None,
            vec![let_stmt(
                "a",
                None,
                Some(array_copied(call("tick", vec![]), int("3"))),
            )],
        ),
    ]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    let text = render(&backend, "main");
    assert_eq!(text.matches("tick()").count(), 1);
    assert_eq!(
        text,
        "fn main() {
    let a: [i32; 3];
    let __tmp2: i32 = tick();
    a = [__tmp2, __tmp2, __tmp2];
}"
    );
}

#[test]
fn test_array_constructor_indexes() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![let_stmt(
            "a",
            None,
            Some(array(vec![boolean(true), boolean(false)])),
        )],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    let main = backend.function(backend.find_function("main").unwrap());
    let body = backend.block(main.body.unwrap());
    match &body.statements[0] {
        IrStmt::Init {
            value: IrExpr::ArrayConstructor { ty, indexes, values },
            ..
        } => {
            assert_eq!(indexes, &vec![0, 1]);
            assert_eq!(values.len(), 2);
            assert_eq!(backend.render_type(ty), "[bool; 2]");
        }
        other => panic!("expected an array initialisation, found {:?}", other),
    }
}

#[test]
fn test_forward_call_reuses_declaration() {
    let (backend, diagnostics, compiled) = lower(vec![
        function(
            "main",
            vec![],
            None,
            vec![let_stmt("r", None, Some(call("twice", vec![int("4")])))],
        ),
        function(
            "twice",
            vec![("v", ty("i32"))],
            Some(ty("i32")),
            vec![expr_stmt(ret(Some(binary(
                ArithmeticOrLogicalOperator::Multiply,
                ident("v"),
                int("2"),
            ))))],
        ),
    ]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(backend.function_count(), 2);
    assert_eq!(
        backend.to_string(),
        "fn main() {
    let r: i32;
    r = twice(4);
}

fn twice(v: i32) -> i32 {
    let __tmp2: i32;
    return (v * 2);
}"
    );
}

#[test]
fn test_recursive_call() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "count",
        vec![("n", ty("i32"))],
        Some(ty("i32")),
        vec![expr_stmt(ret(Some(call(
            "count",
            vec![binary(
                ArithmeticOrLogicalOperator::Subtract,
                ident("n"),
                int("1"),
            )],
        ))))],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(backend.function_count(), 1);
    assert!(render(&backend, "count").contains("return count((n - 1));"));
}

#[test]
fn test_void_call_and_wildcard_let() {
    let (backend, diagnostics, compiled) = lower(vec![
        add_function(),
        function("noop", vec![], None, vec![]),
        function(
            "main",
            vec![],
            None,
            vec![
                expr_stmt(call("noop", vec![])),
                let_pattern(
                    wildcard(),
                    None,
                    Some(call("add", vec![int("1"), int("2")])),
                ),
            ],
        ),
    ]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(render(&backend, "noop"), "fn noop() {\n}");
    assert_eq!(
        render(&backend, "main"),
        "fn main() {\n    noop();\n    add(1, 2);\n}"
    );
}

#[test]
fn test_scalar_literals() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![
            let_stmt("c", None, Some(char_lit('a'))),
            let_stmt("b", None, Some(literal(crate::ast::expressions::LiteralKind::Byte, "x"))),
            let_stmt("f", None, Some(float("1.5"))),
            let_stmt("h", None, Some(int("0x10"))),
        ],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(
        render(&backend, "main"),
        "fn main() {
    let c: char;
    let b: u8;
    let f: f32;
    let h: i32;
    c = 97;
    b = 120;
    f = 1.5;
    h = 16;
}"
    );
}

#[test]
fn test_shadowed_initializer_reads_previous_binding() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![
            let_stmt("x", None, Some(int("1"))),
            let_stmt(
                "x",
                None,
                Some(binary(ArithmeticOrLogicalOperator::Add, ident("x"), int("1"))),
            ),
        ],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    let main = backend.function(backend.find_function("main").unwrap());
    let body = backend.block(main.body.unwrap());
    assert_eq!(body.vars, vec![VariableId(0), VariableId(1)]);
    assert_eq!(
        body.statements[1],
        IrStmt::Init {
            var: VariableId(1),
            value: IrExpr::Binary {
                op: Operator::Plus,
                lhs: Box::new(IrExpr::Var(VariableId(0))),
                rhs: Box::new(IrExpr::Integer {
                    ty: IrType::Integer {
                        unsigned: false,
                        bits: 32
                    },
                    value: 1
                }),
            },
        }
    );
}

#[test]
fn test_string_literal_is_fatal() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![expr_stmt(string_lit("hello")), expr_stmt(int("1"))],
    )]);

    assert!(!compiled);
    assert_eq!(diagnostics.error_names(), vec!["UnsupportedLiteral"]);
    assert!(diagnostics.has_fatal());
    assert!(backend.program().is_none());
}

#[test]
fn test_string_local_has_no_backend_type() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![let_stmt("s", None, Some(string_lit("hello")))],
    )]);

    assert!(!compiled);
    assert_eq!(diagnostics.error_names(), vec!["UnsupportedType"]);
    assert!(backend.program().is_none());
}

#[test]
fn test_unsupported_expression_is_skipped() {
    let (backend, diagnostics, compiled) = lower(vec![function(
        "main",
        vec![],
        None,
        vec![expr_stmt(unsupported(UnsupportedExprKind::Loop))],
    )]);

    assert!(compiled, "{:?}", diagnostics.error_names());
    assert_eq!(render(&backend, "main"), "fn main() {\n}");
}

#[test]
fn test_unresolved_crate_is_refused() {
    let krate = krate(vec![add_function()]);
    let mut backend = IrBackend::new("test");
    let mut diagnostics = Diagnostics::new();

    assert!(!compile(&krate, &mut backend, &mut diagnostics, true));
    assert_eq!(diagnostics.error_names(), vec!["UnresolvedCrate"]);
    assert_eq!(backend.function_count(), 0);
    assert!(backend.program().is_none());
}

#[test]
fn test_emission_can_be_skipped() {
    let krate = resolved(vec![add_function()]);
    let mut backend = IrBackend::new("test");
    let mut diagnostics = Diagnostics::new();

    assert!(compile(&krate, &mut backend, &mut diagnostics, false));
    assert!(diagnostics.is_empty());
    assert_eq!(backend.function_count(), 1);
    assert!(backend.program().is_none());
}
