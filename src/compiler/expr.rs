use crate::{
    ast::{
        expressions::{
            ArithmeticOrLogicalOperator, ArrayElems, ArrayExpr, CallExpr, ComparisonOperator,
            Expr, LazyBooleanOperator, LiteralExpr, LiteralKind, NegationOperator, StructExpr,
            StructExprField,
        },
        literals::{parse_float, parse_integer},
        types::{PrimitiveType, Ty},
    },
    backend::{Backend, Operator},
    errors::{diagnostics::Reported, errors::ErrorImpl},
    type_checker::type_checker::const_length,
    Span,
};

use super::{
    compiler::Compilation,
    stmt::{compile_block, gen_if},
};

/// Lowers `expr` and requires it to produce a value. `what` names the
/// missing value in the "failed to compile ..." diagnostic.
pub fn expect_value<B: Backend>(
    compiler: &mut Compilation<B>,
    expr: &Expr,
    what: &str,
) -> Result<B::Expression, Reported> {
    match gen_expression(compiler, expr) {
        Ok(Some(value)) => Ok(value),
        Err(reported) if reported.is_fatal() => Err(reported),
        _ => Err(compiler.handler.error(
            ErrorImpl::LoweringFailed {
                what: what.to_string(),
            },
            expr.get_span(),
        )),
    }
}

/// Lowers an expression. `Ok(None)` means the expression was lowered to
/// statements appended to the current block and has no value.
pub fn gen_expression<B: Backend>(
    compiler: &mut Compilation<B>,
    expr: &Expr,
) -> Result<Option<B::Expression>, Reported> {
    match expr {
        Expr::Literal(literal) => gen_literal(compiler, literal).map(Some),
        Expr::Identifier(identifier) => {
            gen_identifier(compiler, &identifier.name, &identifier.span).map(Some)
        }
        Expr::Path(path) => {
            let name = path.as_string();
            if path.segments.len() == 1 {
                if let Some(var) = compiler.scope.lookup_var(&name).cloned() {
                    return Ok(Some(compiler.backend.var_expression(&var, &path.span)));
                }
            }
            match compiler.lookup_function(&name) {
                Some(function) => Ok(Some(
                    compiler
                        .backend
                        .function_code_expression(&function, &path.span),
                )),
                None => Ok(None),
            }
        }
        Expr::Negation(negation) => {
            let operand = expect_value(compiler, &negation.operand, "negated operand")?;
            let op = match negation.op {
                NegationOperator::Negate => Operator::Minus,
                NegationOperator::Not => Operator::Not,
            };
            Ok(Some(
                compiler
                    .backend
                    .unary_expression(op, operand, &negation.span),
            ))
        }
        Expr::ArithmeticOrLogical(arithmetic) => gen_binary(
            compiler,
            arithmetic_operator(arithmetic.op),
            &arithmetic.lhs,
            &arithmetic.rhs,
            &arithmetic.span,
        )
        .map(Some),
        Expr::Comparison(comparison) => gen_binary(
            compiler,
            comparison_operator(comparison.op),
            &comparison.lhs,
            &comparison.rhs,
            &comparison.span,
        )
        .map(Some),
        Expr::LazyBoolean(lazy) => gen_binary(
            compiler,
            lazy_operator(lazy.op),
            &lazy.lhs,
            &lazy.rhs,
            &lazy.span,
        )
        .map(Some),
        Expr::Assignment(assignment) => {
            let lhs = expect_value(compiler, &assignment.lhs, "lhs")?;
            let rhs = expect_value(compiler, &assignment.rhs, "rhs")?;
            let function = compiler.current_function()?;
            let statement =
                compiler
                    .backend
                    .assignment_statement(&function, lhs, rhs, &assignment.span);
            compiler.add_statement(statement);
            Ok(None)
        }
        Expr::Grouped(grouped) => gen_expression(compiler, &grouped.inner),
        Expr::Array(array) => gen_array(compiler, array).map(Some),
        Expr::ArrayIndex(index) => {
            let array = expect_value(compiler, &index.array, "indexed array")?;
            let position = expect_value(compiler, &index.index, "array index")?;
            Ok(Some(
                compiler
                    .backend
                    .array_index_expression(array, position, &index.span),
            ))
        }
        Expr::Struct(strukt) => gen_struct(compiler, strukt).map(Some),
        Expr::Call(call) => gen_call(compiler, call).map(Some),
        Expr::Block(block) => {
            let handle = compile_block(compiler, block)?;
            compiler.pop_block();
            let statement = compiler.backend.block_statement(&handle);
            compiler.add_statement(statement);
            Ok(None)
        }
        Expr::Return(ret) => {
            let values = match &ret.value {
                Some(value) => vec![expect_value(compiler, value, "return value")?],
                None => Vec::new(),
            };
            let function = compiler.current_function()?;
            let statement = compiler
                .backend
                .return_statement(&function, values, &ret.span);
            compiler.add_statement(statement);
            Ok(None)
        }
        Expr::If(if_expr) => {
            let statement = gen_if(compiler, if_expr)?;
            compiler.add_statement(statement);
            Ok(None)
        }
        Expr::Unsupported(unsupported) => {
            log::warn!("skipping unsupported {}", unsupported.kind);
            Ok(None)
        }
    }
}

fn gen_identifier<B: Backend>(
    compiler: &mut Compilation<B>,
    name: &str,
    span: &Span,
) -> Result<B::Expression, Reported> {
    match compiler.scope.lookup_var(name).cloned() {
        Some(var) => Ok(compiler.backend.var_expression(&var, span)),
        None => Err(compiler.handler.error(
            ErrorImpl::UnknownIdentifier {
                name: name.to_string(),
            },
            span,
        )),
    }
}

fn gen_literal<B: Backend>(
    compiler: &mut Compilation<B>,
    literal: &LiteralExpr,
) -> Result<B::Expression, Reported> {
    match literal.kind {
        LiteralKind::Bool => Ok(compiler
            .backend
            .boolean_constant_expression(literal.value == "true")),
        LiteralKind::Int => {
            let Some(value) = parse_integer(&literal.value) else {
                return Err(invalid_literal(compiler, literal));
            };
            let ty = primitive_type(compiler, PrimitiveType::I32, &literal.span)?;
            Ok(compiler.backend.integer_constant_expression(&ty, value))
        }
        LiteralKind::Float => {
            let Some(value) = parse_float(&literal.value) else {
                return Err(invalid_literal(compiler, literal));
            };
            let ty = primitive_type(compiler, PrimitiveType::F32, &literal.span)?;
            Ok(compiler.backend.float_constant_expression(&ty, value))
        }
        LiteralKind::Char => {
            let Some(value) = literal.value.chars().next() else {
                return Err(invalid_literal(compiler, literal));
            };
            let ty = primitive_type(compiler, PrimitiveType::Char, &literal.span)?;
            Ok(compiler
                .backend
                .integer_constant_expression(&ty, u32::from(value).into()))
        }
        LiteralKind::Byte => {
            let Some(value) = literal.value.bytes().next() else {
                return Err(invalid_literal(compiler, literal));
            };
            let ty = primitive_type(compiler, PrimitiveType::U8, &literal.span)?;
            Ok(compiler
                .backend
                .integer_constant_expression(&ty, value.into()))
        }
        LiteralKind::String
        | LiteralKind::RawString
        | LiteralKind::ByteString
        | LiteralKind::RawByteString => Err(compiler.handler.fatal(
            ErrorImpl::UnsupportedLiteral {
                what: literal.kind.to_string(),
            },
            &literal.span,
        )),
    }
}

fn invalid_literal<B: Backend>(compiler: &mut Compilation<B>, literal: &LiteralExpr) -> Reported {
    compiler.handler.fatal(
        ErrorImpl::InvalidLiteral {
            literal: literal.value.clone(),
        },
        &literal.span,
    )
}

fn primitive_type<B: Backend>(
    compiler: &mut Compilation<B>,
    primitive: PrimitiveType,
    span: &Span,
) -> Result<B::Type, Reported> {
    match compiler.scope.lookup_type(primitive.name()) {
        Some(ty) => Ok(ty.clone()),
        None => Err(compiler.handler.error(
            ErrorImpl::UnknownType {
                name: primitive.name().to_string(),
            },
            span,
        )),
    }
}

fn gen_binary<B: Backend>(
    compiler: &mut Compilation<B>,
    op: Operator,
    lhs: &Expr,
    rhs: &Expr,
    span: &Span,
) -> Result<B::Expression, Reported> {
    let lhs = expect_value(compiler, lhs, "lhs")?;
    let rhs = expect_value(compiler, rhs, "rhs")?;
    Ok(compiler.backend.binary_expression(op, lhs, rhs, span))
}

fn arithmetic_operator(op: ArithmeticOrLogicalOperator) -> Operator {
    match op {
        ArithmeticOrLogicalOperator::Add => Operator::Plus,
        ArithmeticOrLogicalOperator::Subtract => Operator::Minus,
        ArithmeticOrLogicalOperator::Multiply => Operator::Mult,
        ArithmeticOrLogicalOperator::Divide => Operator::Div,
        ArithmeticOrLogicalOperator::Modulus => Operator::Mod,
        ArithmeticOrLogicalOperator::BitwiseAnd => Operator::BitAnd,
        ArithmeticOrLogicalOperator::BitwiseOr => Operator::BitOr,
        ArithmeticOrLogicalOperator::BitwiseXor => Operator::BitXor,
        ArithmeticOrLogicalOperator::LeftShift => Operator::LeftShift,
        ArithmeticOrLogicalOperator::RightShift => Operator::RightShift,
    }
}

fn comparison_operator(op: ComparisonOperator) -> Operator {
    match op {
        ComparisonOperator::Equal => Operator::Equal,
        ComparisonOperator::NotEqual => Operator::NotEqual,
        ComparisonOperator::GreaterThan => Operator::Greater,
        ComparisonOperator::LessThan => Operator::Less,
        ComparisonOperator::GreaterOrEqual => Operator::GreaterOrEqual,
        ComparisonOperator::LessOrEqual => Operator::LessOrEqual,
    }
}

fn lazy_operator(op: LazyBooleanOperator) -> Operator {
    match op {
        LazyBooleanOperator::And => Operator::AndAnd,
        LazyBooleanOperator::Or => Operator::OrOr,
    }
}

fn gen_array<B: Backend>(
    compiler: &mut Compilation<B>,
    array: &ArrayExpr,
) -> Result<B::Expression, Reported> {
    let Some(inferred) = &array.inferred_type else {
        return Err(compiler.handler.error(
            ErrorImpl::LoweringFailed {
                what: String::from("array without a resolved type"),
            },
            &array.span,
        ));
    };
    let ty = compiler.lower_ty(inferred, &array.span)?;

    let values = match &array.elements {
        ArrayElems::Values(values) => {
            let mut elements = Vec::with_capacity(values.len());
            for value in values {
                elements.push(expect_value(compiler, value, "array element")?);
            }
            elements
        }
        ArrayElems::Copied { value, count } => {
            let Some(length) = const_length(count) else {
                return Err(compiler
                    .handler
                    .error(ErrorImpl::InvalidArrayLength, count.get_span()));
            };
            let element = expect_value(compiler, value, "array element")?;
            let slot = gen_repeated_value(compiler, inferred, element, value.get_span())?;
            (0..length)
                .map(|_| compiler.backend.var_expression(&slot, &array.span))
                .collect::<Vec<_>>()
        }
    };

    let indexes = (0..values.len() as u64).collect();
    Ok(compiler
        .backend
        .array_constructor_expression(&ty, indexes, values, &array.span))
}

/// Stores the value of a `[v; N]` literal in a temporary so it is evaluated
/// once, however many elements read it.
fn gen_repeated_value<B: Backend>(
    compiler: &mut Compilation<B>,
    array_type: &Ty,
    element: B::Expression,
    span: &Span,
) -> Result<B::Variable, Reported> {
    let Some(element_type) = array_type.element_type() else {
        return Err(compiler.handler.error(
            ErrorImpl::LoweringFailed {
                what: String::from("element type of repeated array"),
            },
            span,
        ));
    };
    let element_type = compiler.lower_ty(element_type, span)?;
    let function = compiler.current_function()?;
    let Some(block) = compiler.blocks.last().cloned() else {
        return Err(compiler.handler.error(
            ErrorImpl::LoweringFailed {
                what: String::from("repeated array outside of a block"),
            },
            span,
        ));
    };

    let (slot, declaration) =
        compiler
            .backend
            .temporary_variable(&function, &block, &element_type, Some(element), span);
    compiler.add_statement(declaration);
    Ok(slot)
}

/// Field initializers are lowered in source order and passed to the backend
/// in declaration order.
fn gen_struct<B: Backend>(
    compiler: &mut Compilation<B>,
    strukt: &StructExpr,
) -> Result<B::Expression, Reported> {
    let name = strukt.name.as_string();
    let Some(decl) = compiler.scope.lookup_struct(&name).cloned() else {
        return Err(compiler
            .handler
            .error(ErrorImpl::UnknownStruct { name }, &strukt.name.span));
    };
    let Some(ty) = compiler.scope.lookup_type(&name).cloned() else {
        return Err(compiler
            .handler
            .error(ErrorImpl::UnknownType { name }, &strukt.name.span));
    };

    let mut values: Vec<Option<B::Expression>> = vec![None; decl.fields.len()];
    for field in &strukt.fields {
        let (index, value) = match field {
            StructExprField::Identifier { name, span } => {
                (decl.field_index(name), gen_identifier(compiler, name, span)?)
            }
            StructExprField::IdentifierValue { name, value, .. } => (
                decl.field_index(name),
                expect_value(compiler, value, "struct field initializer")?,
            ),
            StructExprField::IndexValue { index, value, .. } => (
                Some(*index),
                expect_value(compiler, value, "struct field initializer")?,
            ),
        };

        match index.and_then(|index| values.get_mut(index)) {
            Some(slot) => *slot = Some(value),
            None => {
                return Err(compiler.handler.error(
                    ErrorImpl::LoweringFailed {
                        what: format!("initializer for a field of `{}`", name),
                    },
                    field.get_span(),
                ))
            }
        }
    }

    let mut ordered = Vec::with_capacity(values.len());
    for (field, value) in decl.fields.iter().zip(values) {
        match value {
            Some(value) => ordered.push(value),
            None => {
                return Err(compiler.handler.error(
                    ErrorImpl::MissingStructField {
                        strukt: name,
                        field: field.name.clone(),
                    },
                    &strukt.span,
                ))
            }
        }
    }

    Ok(compiler
        .backend
        .constructor_expression(&ty, ordered, &strukt.span))
}

fn gen_call<B: Backend>(
    compiler: &mut Compilation<B>,
    call: &CallExpr,
) -> Result<B::Expression, Reported> {
    let callee = gen_callee(compiler, call)?;

    let mut args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        args.push(expect_value(compiler, arg, "argument")?);
    }

    let function = compiler.current_function()?;
    Ok(compiler
        .backend
        .call_expression(&function, callee, args, &call.span))
}

/// Named callees that are neither bound nor already declared are declared
/// from the signature type resolution attached to the call.
fn gen_callee<B: Backend>(
    compiler: &mut Compilation<B>,
    call: &CallExpr,
) -> Result<B::Expression, Reported> {
    let name = match call.function.as_ref() {
        Expr::Path(path) => path.as_string(),
        Expr::Identifier(identifier) => identifier.name.clone(),
        other => return expect_value(compiler, other, "callee"),
    };
    let span = call.function.get_span();

    let function = match compiler.lookup_function(&name) {
        Some(function) => function,
        None => match &call.callee_decl {
            Some(signature) => compiler.declare_function(signature)?,
            None => {
                return Err(compiler
                    .handler
                    .error(ErrorImpl::UnknownFunction { name }, span))
            }
        },
    };
    Ok(compiler.backend.function_code_expression(&function, span))
}
