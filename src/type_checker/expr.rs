//! Expression typing.
//!
//! [`resolve_expr`] yields `Ok(Some(ty))` for expressions with a value,
//! `Ok(None)` for expressions that only have effects (assignments, returns,
//! blocks used as statements) and `Err` once a failure has been reported.
//! Callers that need a value go through [`infer_type`], which reports the
//! missing value at their own location.

use crate::{
    ast::{
        expressions::{
            ArrayElems, ArrayExpr, ArrayIndexExpr, CallExpr, ElseBranch, Expr, IfExpr,
            LiteralExpr, LiteralKind, NegationExpr, NegationOperator, PathInExpression,
            ReturnExpr, StructExpr, StructExprField,
        },
        literals::{parse_float, parse_integer},
        statements::{FnSignature, StructStruct},
        types::{PrimitiveType, Ty},
    },
    errors::{diagnostics::Reported, errors::ErrorImpl},
    Span,
};

use super::{
    stmt::resolve_block,
    type_checker::{const_length, TypeResolution},
};

/// Resolves `expr` and requires it to produce a type. `what` names the
/// missing type in the "unable to determine ..." diagnostic.
pub fn infer_type(
    resolver: &mut TypeResolution,
    expr: &mut Expr,
    what: &str,
) -> Result<Ty, Reported> {
    match resolve_expr(resolver, expr) {
        Ok(Some(ty)) => Ok(ty),
        Err(reported) if reported.is_fatal() => Err(reported),
        _ => Err(resolver.handler.error(
            ErrorImpl::UnresolvedSubexpression {
                what: what.to_string(),
            },
            expr.get_span(),
        )),
    }
}

pub fn resolve_expr(
    resolver: &mut TypeResolution,
    expr: &mut Expr,
) -> Result<Option<Ty>, Reported> {
    match expr {
        Expr::Literal(literal) => resolve_literal(resolver, literal).map(Some),
        Expr::Identifier(identifier) => match resolver.scope.lookup_var(&identifier.name) {
            Some(binding) => Ok(Some(binding.ty.clone())),
            None => Err(resolver.handler.error(
                ErrorImpl::UnknownIdentifier {
                    name: identifier.name.clone(),
                },
                &identifier.span,
            )),
        },
        Expr::Path(path) => {
            // Function items have no value type; a single segment may still
            // name a local.
            if let [name] = path.segments.as_slice() {
                if let Some(binding) = resolver.scope.lookup_var(name) {
                    return Ok(Some(binding.ty.clone()));
                }
            }
            Ok(None)
        }
        Expr::Negation(negation) => resolve_negation(resolver, negation).map(Some),
        Expr::ArithmeticOrLogical(arithmetic) => {
            let lhs = infer_type(resolver, &mut arithmetic.lhs, "lhs type")?;
            let rhs = infer_type(resolver, &mut arithmetic.rhs, "rhs type")?;
            resolver.check_compatible(&lhs, &rhs, arithmetic.rhs.get_span())?;
            Ok(Some(lhs))
        }
        Expr::Comparison(comparison) => {
            let lhs = infer_type(resolver, &mut comparison.lhs, "lhs type")?;
            let rhs = infer_type(resolver, &mut comparison.rhs, "rhs type")?;
            resolver.check_compatible(&lhs, &rhs, comparison.rhs.get_span())?;
            Ok(Some(Ty::bool()))
        }
        Expr::LazyBoolean(lazy) => {
            let lhs = infer_type(resolver, &mut lazy.lhs, "lhs type")?;
            resolver.check_compatible(&Ty::bool(), &lhs, lazy.lhs.get_span())?;
            let rhs = infer_type(resolver, &mut lazy.rhs, "rhs type")?;
            resolver.check_compatible(&Ty::bool(), &rhs, lazy.rhs.get_span())?;
            Ok(Some(Ty::bool()))
        }
        Expr::Assignment(assignment) => {
            let lhs = infer_type(resolver, &mut assignment.lhs, "lhs type")?;
            let rhs = infer_type(resolver, &mut assignment.rhs, "rhs type")?;
            resolver.check_compatible(&lhs, &rhs, assignment.rhs.get_span())?;
            Ok(None)
        }
        Expr::Grouped(grouped) => resolve_expr(resolver, &mut grouped.inner),
        Expr::Array(array) => resolve_array(resolver, array).map(Some),
        Expr::ArrayIndex(index) => resolve_array_index(resolver, index).map(Some),
        Expr::Struct(strukt) => resolve_struct_expr(resolver, strukt).map(Some),
        Expr::Call(call) => resolve_call(resolver, call).map(Some),
        Expr::Block(block) => resolve_block(resolver, block).map(|_| None),
        Expr::Return(ret) => resolve_return(resolver, ret).map(|_| None),
        Expr::If(if_expr) => resolve_if(resolver, if_expr).map(|_| None),
        Expr::Unsupported(unsupported) => {
            log::warn!("skipping unsupported {}", unsupported.kind);
            Ok(None)
        }
    }
}

fn resolve_literal(resolver: &mut TypeResolution, literal: &LiteralExpr) -> Result<Ty, Reported> {
    // Suffixes never change the type: every integer is i32, every float f32.
    let primitive = match literal.kind {
        LiteralKind::Char => PrimitiveType::Char,
        LiteralKind::String | LiteralKind::RawString => PrimitiveType::Str,
        LiteralKind::Bool => PrimitiveType::Bool,
        LiteralKind::Byte => PrimitiveType::U8,
        LiteralKind::Float => PrimitiveType::F32,
        LiteralKind::Int => PrimitiveType::I32,
        LiteralKind::ByteString | LiteralKind::RawByteString => {
            return Err(resolver.handler.error(
                ErrorImpl::UnsupportedLiteral {
                    what: literal.kind.to_string(),
                },
                &literal.span,
            ))
        }
    };

    let malformed = match literal.kind {
        LiteralKind::Int => parse_integer(&literal.value).is_none(),
        LiteralKind::Float => parse_float(&literal.value).is_none(),
        _ => false,
    };
    if malformed {
        return Err(resolver.handler.fatal(
            ErrorImpl::InvalidLiteral {
                literal: literal.value.clone(),
            },
            &literal.span,
        ));
    }

    match resolver.scope.lookup_type(primitive.name()) {
        Some(ty) => Ok(ty.clone()),
        None => Err(resolver.handler.error(
            ErrorImpl::UnknownType {
                name: primitive.name().to_string(),
            },
            &literal.span,
        )),
    }
}

fn resolve_negation(
    resolver: &mut TypeResolution,
    negation: &mut NegationExpr,
) -> Result<Ty, Reported> {
    let ty = infer_type(resolver, &mut negation.operand, "type of negated operand")?;
    let (operator, valid) = match (negation.op, ty.as_primitive()) {
        (NegationOperator::Negate, Some(primitive)) => {
            ("-", primitive.is_integer() || primitive.is_float())
        }
        (NegationOperator::Not, Some(primitive)) => {
            ("!", primitive == PrimitiveType::Bool || primitive.is_integer())
        }
        (NegationOperator::Negate, None) => ("-", false),
        (NegationOperator::Not, None) => ("!", false),
    };
    if !valid {
        return Err(resolver.handler.error(
            ErrorImpl::InvalidOperand {
                operator: operator.to_string(),
                operand: ty.to_string(),
            },
            &negation.span,
        ));
    }
    Ok(ty)
}

fn resolve_array(resolver: &mut TypeResolution, array: &mut ArrayExpr) -> Result<Ty, Reported> {
    let ty = match &mut array.elements {
        ArrayElems::Values(values) => {
            if values.is_empty() {
                return Err(resolver.handler.error(
                    ErrorImpl::UnresolvedSubexpression {
                        what: String::from("element type of empty array"),
                    },
                    &array.span,
                ));
            }

            let mut types = Vec::with_capacity(values.len());
            for value in values.iter_mut() {
                types.push(infer_type(resolver, value, "element type")?);
            }

            // Every element is checked against the first, not its neighbour.
            let baseline = types[0].clone();
            for (ty, value) in types.iter().zip(values.iter()).skip(1) {
                resolver.check_compatible(&baseline, ty, value.get_span())?;
            }
            Ty::Array(Box::new(baseline), values.len())
        }
        ArrayElems::Copied { value, count } => {
            let element = infer_type(resolver, value, "element type")?;
            let Some(length) = const_length(count) else {
                return Err(resolver
                    .handler
                    .error(ErrorImpl::InvalidArrayLength, count.get_span()));
            };
            Ty::Array(Box::new(element), length)
        }
    };

    array.inferred_type = Some(ty.clone());
    Ok(ty)
}

fn resolve_array_index(
    resolver: &mut TypeResolution,
    index: &mut ArrayIndexExpr,
) -> Result<Ty, Reported> {
    let array_type = infer_type(
        resolver,
        &mut index.array,
        "type for array index expression",
    )?;
    let Ty::Array(element, _) = array_type else {
        return Err(resolver.handler.error(
            ErrorImpl::NotAnArray {
                found: array_type.to_string(),
            },
            index.array.get_span(),
        ));
    };

    let index_type = infer_type(
        resolver,
        &mut index.index,
        "type for array index expression",
    )?;
    resolver.check_compatible(&Ty::i32(), &index_type, index.index.get_span())?;
    Ok(*element)
}

fn resolve_struct_expr(
    resolver: &mut TypeResolution,
    strukt: &mut StructExpr,
) -> Result<Ty, Reported> {
    let name = strukt.name.as_string();
    let Some(decl) = resolver.scope.lookup_struct(&name).cloned() else {
        return Err(resolver
            .handler
            .error(ErrorImpl::UnknownStruct { name }, &strukt.name.span));
    };

    let mut initialised = vec![false; decl.fields.len()];
    let mut failure = None;
    for field in strukt.fields.iter_mut() {
        let span = field.get_span().clone();
        match resolve_struct_field(resolver, &decl, field) {
            Ok(index) if initialised[index] => {
                failure = Some(resolver.handler.error(
                    ErrorImpl::DuplicateStructField {
                        strukt: name.clone(),
                        field: decl.fields[index].name.clone(),
                    },
                    &span,
                ));
            }
            Ok(index) => initialised[index] = true,
            Err(reported) if reported.is_fatal() => return Err(reported),
            Err(reported) => failure = Some(reported),
        }
    }
    if let Some(reported) = failure {
        return Err(reported);
    }

    for (field, initialised) in decl.fields.iter().zip(initialised) {
        if !initialised {
            failure = Some(resolver.handler.error(
                ErrorImpl::MissingStructField {
                    strukt: name.clone(),
                    field: field.name.clone(),
                },
                &strukt.span,
            ));
        }
    }
    match failure {
        Some(reported) => Err(reported),
        None => Ok(Ty::Struct(name)),
    }
}

/// Types one field initializer and returns the index of the field it sets.
fn resolve_struct_field(
    resolver: &mut TypeResolution,
    decl: &StructStruct,
    field: &mut StructExprField,
) -> Result<usize, Reported> {
    let (index, found, span) = match field {
        StructExprField::Identifier { name, span } => {
            let index = field_by_name(resolver, decl, name, span)?;
            let found = match resolver.scope.lookup_var(name) {
                Some(binding) => binding.ty.clone(),
                None => {
                    return Err(resolver.handler.error(
                        ErrorImpl::UnknownIdentifier { name: name.clone() },
                        span,
                    ))
                }
            };
            (index, found, span.clone())
        }
        StructExprField::IdentifierValue { name, value, span } => {
            let index = field_by_name(resolver, decl, name, span)?;
            let found = infer_type(resolver, value, "type of struct field initializer")?;
            (index, found, value.get_span().clone())
        }
        StructExprField::IndexValue { index, value, span } => {
            if *index >= decl.fields.len() {
                return Err(resolver.handler.error(
                    ErrorImpl::UnknownFieldIndex {
                        strukt: decl.name.clone(),
                        index: *index,
                    },
                    span,
                ));
            }
            let found = infer_type(resolver, value, "type of struct field initializer")?;
            (*index, found, value.get_span().clone())
        }
    };

    let expected = resolver.resolve_type(&decl.fields[index].ty)?;
    resolver.check_compatible(&expected, &found, &span)?;
    Ok(index)
}

fn field_by_name(
    resolver: &mut TypeResolution,
    decl: &StructStruct,
    name: &str,
    span: &Span,
) -> Result<usize, Reported> {
    decl.field_index(name).ok_or_else(|| {
        resolver.handler.error(
            ErrorImpl::UnknownField {
                strukt: decl.name.clone(),
                field: name.to_string(),
            },
            span,
        )
    })
}

fn resolve_call(resolver: &mut TypeResolution, call: &mut CallExpr) -> Result<Ty, Reported> {
    let signature = lookup_callee(resolver, &call.function)?;

    if signature.params.len() != call.args.len() {
        return Err(resolver.handler.error(
            ErrorImpl::ArgumentCountMismatch {
                expected: signature.params.len(),
                received: call.args.len(),
            },
            &call.span,
        ));
    }

    let mut arg_types = Vec::with_capacity(call.args.len());
    for arg in call.args.iter_mut() {
        arg_types.push(infer_type(resolver, arg, "argument type")?);
    }

    for ((param, found), arg) in signature.params.iter().zip(&arg_types).zip(&call.args) {
        let expected = resolver.resolve_type(param)?;
        resolver.check_compatible(&expected, found, arg.get_span())?;
    }

    let result = match &signature.return_type {
        Some(return_type) => resolver.resolve_type(return_type)?,
        None => Ty::Unit,
    };
    call.callee_decl = Some(signature);
    Ok(result)
}

/// Local function bindings first, then the crate-wide scan.
fn lookup_callee(resolver: &mut TypeResolution, function: &Expr) -> Result<FnSignature, Reported> {
    let path = match function {
        Expr::Path(path) => path.clone(),
        Expr::Identifier(identifier) => PathInExpression {
            segments: vec![identifier.name.clone()],
            span: identifier.span.clone(),
        },
        other => {
            return Err(resolver.handler.error(
                ErrorImpl::UnknownFunction {
                    name: String::from("<expression>"),
                },
                other.get_span(),
            ))
        }
    };

    if let Some(signature) = resolver.scope.lookup_function(&path.as_string()) {
        return Ok(signature.clone());
    }
    match resolver.toplevel.lookup_function(&path) {
        Some(signature) => Ok(signature),
        None => Err(resolver.handler.error(
            ErrorImpl::UnknownFunction {
                name: path.as_string(),
            },
            &path.span,
        )),
    }
}

fn resolve_return(resolver: &mut TypeResolution, ret: &mut ReturnExpr) -> Result<(), Reported> {
    let expected = resolver
        .current_function()
        .and_then(|function| function.return_type.clone());

    match (expected, ret.value.as_mut()) {
        (None, Some(_)) => Err(resolver
            .handler
            .error(ErrorImpl::ReturnInVoidFunction, &ret.span)),
        (None, None) => Ok(()),
        (Some(expected), None) => Err(resolver.handler.error(
            ErrorImpl::MissingReturnValue {
                expected: expected.to_string(),
            },
            &ret.span,
        )),
        (Some(expected), Some(value)) => {
            let found = infer_type(resolver, value, "type of return expression")?;
            resolver.check_compatible(&expected, &found, value.get_span())
        }
    }
}

fn resolve_if(resolver: &mut TypeResolution, if_expr: &mut IfExpr) -> Result<(), Reported> {
    let condition = infer_type(resolver, &mut if_expr.condition, "type of if condition")
        .and_then(|ty| resolver.check_compatible(&Ty::bool(), &ty, if_expr.condition.get_span()));
    if matches!(condition, Err(reported) if reported.is_fatal()) {
        return condition;
    }

    // Both branches are resolved even when the condition failed.
    let then_branch = resolve_block(resolver, &mut if_expr.then_block);
    let else_branch = match if_expr.else_branch.as_mut() {
        None => Ok(()),
        Some(ElseBranch::Block(block)) => resolve_block(resolver, block),
        Some(ElseBranch::If(nested)) => resolve_if(resolver, nested),
    };

    [condition, then_branch, else_branch]
        .into_iter()
        .filter_map(Result::err)
        .max_by_key(|reported| reported.is_fatal())
        .map_or(Ok(()), Err)
}
