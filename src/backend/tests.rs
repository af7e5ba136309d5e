use crate::backend::{
    ir::{IrBackend, IrExpr, IrStmt, IrType},
    Backend, BackendError, Operator, TypedIdentifier,
};
use crate::Span;

fn i32_type(backend: &mut IrBackend) -> IrType {
    backend.integer_type(false, 32)
}

#[test]
fn test_operator_symbols() {
    assert_eq!(Operator::LeftShift.to_string(), "<<");
    assert_eq!(Operator::OrOr.to_string(), "||");
    assert!(Operator::GreaterOrEqual.is_comparison());
    assert!(!Operator::AndAnd.is_comparison());
}

#[test]
fn test_render_types() {
    let mut backend = IrBackend::new("types");
    let int = i32_type(&mut backend);
    let code_point = backend.integer_type(true, 32);
    let char_type = backend.named_type("char", code_point, &Span::predeclared());
    let array = backend.array_type(int.clone(), 4);
    let params = [TypedIdentifier::new("c", char_type.clone(), Span::null())];
    let fntype = backend.function_type(&params, Some(array.clone()), &Span::null());

    assert_eq!(backend.render_type(&char_type), "char");
    assert!(char_type.is_unsigned());
    assert_eq!(backend.render_type(&array), "[i32; 4]");
    assert_eq!(backend.render_type(&fntype), "fn(char) -> [i32; 4]");
    let double = backend.float_type(64);
    assert_eq!(backend.render_type(&double), "f64");
}

#[test]
fn test_struct_placeholder_is_completed_once() {
    let mut backend = IrBackend::new("structs");
    let int = i32_type(&mut backend);
    let point = backend.placeholder_struct_type("Point", &Span::null());
    let fields = vec![TypedIdentifier::new("x", int, Span::null())];

    assert_eq!(
        backend.set_placeholder_struct_type(&point, fields.clone()),
        Ok(())
    );
    assert_eq!(
        backend.set_placeholder_struct_type(&point, fields.clone()),
        Err(BackendError::StructAlreadyDefined {
            name: String::from("Point")
        })
    );
    assert_eq!(
        backend.set_placeholder_struct_type(&IrType::Bool, fields),
        Err(BackendError::NotAStruct)
    );
}

#[test]
fn test_function_contract() {
    let mut backend = IrBackend::new("functions");
    let int = i32_type(&mut backend);
    let params = [TypedIdentifier::new("a", int.clone(), Span::null())];
    let fntype = backend.function_type(&params, None, &Span::null());
    let function = Backend::function(&mut backend, &fntype, "f", &Span::null());

    assert_eq!(
        backend.function_set_parameters(&function, Vec::new()),
        Err(BackendError::ParameterCountMismatch {
            name: String::from("f"),
            expected: 1,
            received: 0
        })
    );
    let param = backend.parameter_variable(&function, "a", &int, &Span::null());
    assert_eq!(backend.function_set_parameters(&function, vec![param]), Ok(()));

    let ret = backend.return_statement(&function, Vec::new(), &Span::null());
    assert_eq!(
        backend.function_set_body(&function, ret),
        Err(BackendError::InvalidBody)
    );

    let block = Backend::block(
        &mut backend,
        &function,
        None,
        Vec::new(),
        &Span::null(),
        &Span::null(),
    );
    let body = backend.block_statement(&block);
    assert_eq!(backend.function_set_body(&function, body.clone()), Ok(()));
    assert_eq!(
        backend.function_set_body(&function, body),
        Err(BackendError::BodyAlreadySet {
            name: String::from("f")
        })
    );
    assert_eq!(backend.render_function(function), "fn f(a: i32) {\n}");
}

#[test]
fn test_temporaries_are_named_by_index() {
    let mut backend = IrBackend::new("temporaries");
    let int = i32_type(&mut backend);
    let fntype = backend.function_type(&[], None, &Span::null());
    let function = Backend::function(&mut backend, &fntype, "f", &Span::null());
    let block = Backend::block(
        &mut backend,
        &function,
        None,
        Vec::new(),
        &Span::null(),
        &Span::null(),
    );
    let one = backend.integer_constant_expression(&int, 1);

    let (var, statement) =
        backend.temporary_variable(&function, &block, &int, Some(one.clone()), &Span::null());

    assert_eq!(backend.variable(var).name, "__tmp0");
    assert_eq!(
        statement,
        IrStmt::Temporary {
            var,
            init: Some(one)
        }
    );
}

#[test]
fn test_type_of_expressions() {
    let mut backend = IrBackend::new("typing");
    let int = i32_type(&mut backend);
    let fntype = backend.function_type(&[], None, &Span::null());
    let function = Backend::function(&mut backend, &fntype, "noop", &Span::null());

    let one = backend.integer_constant_expression(&int, 1);
    let two = backend.integer_constant_expression(&int, 2);
    let sum = backend.binary_expression(Operator::Plus, one.clone(), two.clone(), &Span::null());
    let less = backend.binary_expression(Operator::Less, one, two, &Span::null());
    let callee = backend.function_code_expression(&function, &Span::null());
    let call = backend.call_expression(&function, callee, Vec::new(), &Span::null());

    assert_eq!(backend.type_of(&sum), Some(int));
    assert_eq!(backend.type_of(&less), Some(IrType::Bool));
    assert_eq!(backend.type_of(&call), None);
    assert_eq!(backend.render_expr(&sum), "(1 + 2)");
    assert!(matches!(call, IrExpr::Call { .. }));
}

#[test]
fn test_program_is_emitted_once() {
    let mut backend = IrBackend::new("program");
    assert_eq!(backend.to_string(), "");

    assert_eq!(
        backend.write_global_definitions(Vec::new(), Vec::new(), Vec::new(), Vec::new()),
        Ok(())
    );
    assert!(backend.program().is_some());
    assert_eq!(
        backend.write_global_definitions(Vec::new(), Vec::new(), Vec::new(), Vec::new()),
        Err(BackendError::AlreadyEmitted)
    );
}
