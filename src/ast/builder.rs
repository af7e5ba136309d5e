//! Helpers for constructing ASTs without a parser.
//!
//! Every node gets a null span. Annotation slots start out empty.

use crate::Span;

use super::{
    ast::{
        Crate, IdentifierPattern, Item, Pattern, UnsupportedExprKind, UnsupportedItem,
        UnsupportedItemKind, UnsupportedPattern, UnsupportedPatternKind, UnsupportedTypeKind,
    },
    expressions::{
        ArithmeticOrLogicalExpr, ArithmeticOrLogicalOperator, ArrayElems, ArrayExpr,
        ArrayIndexExpr, AssignmentExpr, BlockExpr, CallExpr, ComparisonExpr, ComparisonOperator,
        ElseBranch, Expr, GroupedExpr, IdentifierExpr, IfExpr, LazyBooleanExpr,
        LazyBooleanOperator, LiteralExpr, LiteralKind, NegationExpr, NegationOperator,
        PathInExpression, ReturnExpr, StructExpr, StructExprField, UnsupportedExpr,
    },
    statements::{ExprStmt, Function, FunctionParam, LetStmt, Stmt, StructField, StructStruct},
    types::{ArrayType, Type, TypePath, UnsupportedType},
};

fn span() -> Span {
    Span::null()
}

pub fn krate(items: Vec<Item>) -> Crate {
    Crate::new(items)
}

// Items

pub fn function(
    name: &str,
    params: Vec<(&str, Type)>,
    return_type: Option<Type>,
    body: Vec<Stmt>,
) -> Item {
    let params = params
        .into_iter()
        .map(|(name, ty)| param(ident_pattern(name), ty))
        .collect();
    function_with_params(name, params, return_type, body)
}

pub fn function_with_params(
    name: &str,
    params: Vec<FunctionParam>,
    return_type: Option<Type>,
    body: Vec<Stmt>,
) -> Item {
    Item::Function(Function {
        name: name.to_string(),
        params,
        return_type,
        body: block_node(body),
        locals: Vec::new(),
        span: span(),
    })
}

pub fn param(pattern: Pattern, ty: Type) -> FunctionParam {
    FunctionParam {
        pattern,
        ty,
        span: span(),
    }
}

pub fn struct_item(name: &str, fields: Vec<(&str, Type)>) -> Item {
    Item::Struct(StructStruct {
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, ty)| StructField {
                name: name.to_string(),
                ty,
                span: span(),
            })
            .collect(),
        span: span(),
    })
}

pub fn unsupported_item(kind: UnsupportedItemKind, name: &str) -> Item {
    Item::Unsupported(UnsupportedItem {
        kind,
        name: name.to_string(),
        span: span(),
    })
}

// Types

pub fn ty(name: &str) -> Type {
    Type::Path(TypePath {
        segments: name.split("::").map(String::from).collect(),
        span: span(),
    })
}

pub fn array_ty(element: Type, length: u64) -> Type {
    Type::Array(ArrayType {
        element: Box::new(element),
        size: Box::new(int(&length.to_string())),
        span: span(),
    })
}

pub fn unsupported_ty(kind: UnsupportedTypeKind) -> Type {
    Type::Unsupported(UnsupportedType { kind, span: span() })
}

// Patterns

pub fn ident_pattern(name: &str) -> Pattern {
    Pattern::Identifier(IdentifierPattern {
        name: name.to_string(),
        is_mut: false,
        span: span(),
    })
}

pub fn wildcard() -> Pattern {
    Pattern::Wildcard(span())
}

pub fn unsupported_pattern(kind: UnsupportedPatternKind) -> Pattern {
    Pattern::Unsupported(UnsupportedPattern { kind, span: span() })
}

// Statements

pub fn let_stmt(name: &str, ty: Option<Type>, init: Option<Expr>) -> Stmt {
    let_pattern(ident_pattern(name), ty, init)
}

pub fn let_pattern(pattern: Pattern, ty: Option<Type>, init: Option<Expr>) -> Stmt {
    Stmt::Let(LetStmt {
        pattern,
        ty,
        init,
        inferred_type: None,
        slots: Vec::new(),
        span: span(),
    })
}

/// Wraps an expression in the statement kind the parser would produce.
pub fn expr_stmt(expr: Expr) -> Stmt {
    let stmt = ExprStmt { expr, span: span() };
    if stmt.expr.is_with_block() {
        Stmt::ExprWithBlock(stmt)
    } else {
        Stmt::Expr(stmt)
    }
}

pub fn empty_stmt() -> Stmt {
    Stmt::Empty(span())
}

// Expressions

pub fn literal(kind: LiteralKind, value: &str) -> Expr {
    Expr::Literal(LiteralExpr {
        kind,
        value: value.to_string(),
        span: span(),
    })
}

pub fn int(value: &str) -> Expr {
    literal(LiteralKind::Int, value)
}

pub fn float(value: &str) -> Expr {
    literal(LiteralKind::Float, value)
}

pub fn boolean(value: bool) -> Expr {
    literal(LiteralKind::Bool, if value { "true" } else { "false" })
}

pub fn char_lit(value: char) -> Expr {
    literal(LiteralKind::Char, &value.to_string())
}

pub fn string_lit(value: &str) -> Expr {
    literal(LiteralKind::String, value)
}

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(IdentifierExpr {
        name: name.to_string(),
        span: span(),
    })
}

pub fn path(path: &str) -> Expr {
    Expr::Path(path_node(path))
}

pub fn path_node(path: &str) -> PathInExpression {
    PathInExpression {
        segments: path.split("::").map(String::from).collect(),
        span: span(),
    }
}

pub fn negate(op: NegationOperator, operand: Expr) -> Expr {
    Expr::Negation(NegationExpr {
        op,
        operand: Box::new(operand),
        span: span(),
    })
}

pub fn binary(op: ArithmeticOrLogicalOperator, lhs: Expr, rhs: Expr) -> Expr {
    Expr::ArithmeticOrLogical(ArithmeticOrLogicalExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: span(),
    })
}

pub fn compare(op: ComparisonOperator, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Comparison(ComparisonExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: span(),
    })
}

pub fn lazy(op: LazyBooleanOperator, lhs: Expr, rhs: Expr) -> Expr {
    Expr::LazyBoolean(LazyBooleanExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: span(),
    })
}

pub fn assign(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Assignment(AssignmentExpr {
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: span(),
    })
}

pub fn grouped(inner: Expr) -> Expr {
    Expr::Grouped(GroupedExpr {
        inner: Box::new(inner),
        span: span(),
    })
}

pub fn array(elements: Vec<Expr>) -> Expr {
    Expr::Array(ArrayExpr {
        elements: ArrayElems::Values(elements),
        inferred_type: None,
        span: span(),
    })
}

pub fn array_copied(value: Expr, count: Expr) -> Expr {
    Expr::Array(ArrayExpr {
        elements: ArrayElems::Copied {
            value: Box::new(value),
            count: Box::new(count),
        },
        inferred_type: None,
        span: span(),
    })
}

pub fn index(array: Expr, index: Expr) -> Expr {
    Expr::ArrayIndex(ArrayIndexExpr {
        array: Box::new(array),
        index: Box::new(index),
        span: span(),
    })
}

pub fn struct_expr(name: &str, fields: Vec<StructExprField>) -> Expr {
    Expr::Struct(StructExpr {
        name: path_node(name),
        fields,
        span: span(),
    })
}

pub fn field(name: &str, value: Expr) -> StructExprField {
    StructExprField::IdentifierValue {
        name: name.to_string(),
        value,
        span: span(),
    }
}

pub fn field_index(index: usize, value: Expr) -> StructExprField {
    StructExprField::IndexValue {
        index,
        value,
        span: span(),
    }
}

pub fn field_shorthand(name: &str) -> StructExprField {
    StructExprField::Identifier {
        name: name.to_string(),
        span: span(),
    }
}

pub fn call(function: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        function: Box::new(path(function)),
        args,
        callee_decl: None,
        span: span(),
    })
}

pub fn block(statements: Vec<Stmt>) -> Expr {
    Expr::Block(block_node(statements))
}

pub fn block_node(statements: Vec<Stmt>) -> BlockExpr {
    BlockExpr {
        statements,
        locals: Vec::new(),
        span: span(),
    }
}

pub fn ret(value: Option<Expr>) -> Expr {
    Expr::Return(ReturnExpr {
        value: value.map(Box::new),
        span: span(),
    })
}

pub fn if_expr(condition: Expr, then_block: Vec<Stmt>, else_branch: Option<ElseBranch>) -> Expr {
    Expr::If(if_node(condition, then_block, else_branch))
}

pub fn if_node(condition: Expr, then_block: Vec<Stmt>, else_branch: Option<ElseBranch>) -> IfExpr {
    IfExpr {
        condition: Box::new(condition),
        then_block: block_node(then_block),
        else_branch,
        span: span(),
    }
}

pub fn else_block(statements: Vec<Stmt>) -> ElseBranch {
    ElseBranch::Block(block_node(statements))
}

pub fn else_if(
    condition: Expr,
    then_block: Vec<Stmt>,
    else_branch: Option<ElseBranch>,
) -> ElseBranch {
    ElseBranch::If(Box::new(if_node(condition, then_block, else_branch)))
}

pub fn unsupported(kind: UnsupportedExprKind) -> Expr {
    Expr::Unsupported(UnsupportedExpr { kind, span: span() })
}
