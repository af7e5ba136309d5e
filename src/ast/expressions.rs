//! Expression nodes.
//!
//! Expressions are a closed enum; every traversal matches on [`Expr`]
//! exhaustively. Nodes that type resolution annotates carry an `Option` slot
//! that starts out empty and is written at most once.

use std::fmt::Display;

use crate::Span;

use super::{
    ast::UnsupportedExprKind,
    statements::{FnSignature, Local, Stmt},
    types::Ty,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Identifier(IdentifierExpr),
    Path(PathInExpression),
    Negation(NegationExpr),
    ArithmeticOrLogical(ArithmeticOrLogicalExpr),
    Comparison(ComparisonExpr),
    LazyBoolean(LazyBooleanExpr),
    Assignment(AssignmentExpr),
    Grouped(GroupedExpr),
    Array(ArrayExpr),
    ArrayIndex(ArrayIndexExpr),
    Struct(StructExpr),
    Call(CallExpr),
    Block(BlockExpr),
    Return(ReturnExpr),
    If(IfExpr),
    Unsupported(UnsupportedExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Literal(expr) => &expr.span,
            Expr::Identifier(expr) => &expr.span,
            Expr::Path(expr) => &expr.span,
            Expr::Negation(expr) => &expr.span,
            Expr::ArithmeticOrLogical(expr) => &expr.span,
            Expr::Comparison(expr) => &expr.span,
            Expr::LazyBoolean(expr) => &expr.span,
            Expr::Assignment(expr) => &expr.span,
            Expr::Grouped(expr) => &expr.span,
            Expr::Array(expr) => &expr.span,
            Expr::ArrayIndex(expr) => &expr.span,
            Expr::Struct(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
            Expr::Block(expr) => &expr.span,
            Expr::Return(expr) => &expr.span,
            Expr::If(expr) => &expr.span,
            Expr::Unsupported(expr) => &expr.span,
        }
    }

    /// Blocks and conditionals can stand as statements without a semicolon.
    pub fn is_with_block(&self) -> bool {
        matches!(self, Expr::Block(_) | Expr::If(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Char,
    String,
    RawString,
    Byte,
    ByteString,
    RawByteString,
    Int,
    Float,
    Bool,
}

impl Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LiteralKind::Char => "char literal",
            LiteralKind::String => "string literal",
            LiteralKind::RawString => "raw string literal",
            LiteralKind::Byte => "byte literal",
            LiteralKind::ByteString => "byte string literal",
            LiteralKind::RawByteString => "raw byte string literal",
            LiteralKind::Int => "integer literal",
            LiteralKind::Float => "float literal",
            LiteralKind::Bool => "boolean literal",
        };
        write!(f, "{}", name)
    }
}

/// `value` holds the literal's text: digits plus any suffix for numbers,
/// `true`/`false` for booleans, and the unquoted contents otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathInExpression {
    pub segments: Vec<String>,
    pub span: Span,
}

impl PathInExpression {
    pub fn as_string(&self) -> String {
        self.segments.join("::")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegationOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NegationExpr {
    pub op: NegationOperator,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOrLogicalOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticOrLogicalExpr {
    pub op: ArithmeticOrLogicalOperator,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    pub op: ComparisonOperator,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyBooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LazyBooleanExpr {
    pub op: LazyBooleanOperator,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElems {
    Values(Vec<Expr>),
    /// `[value; count]`
    Copied { value: Box<Expr>, count: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: ArrayElems,
    pub inferred_type: Option<Ty>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIndexExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructExprField {
    /// Shorthand `P { x }`.
    Identifier { name: String, span: Span },
    IdentifierValue { name: String, value: Expr, span: Span },
    IndexValue { index: usize, value: Expr, span: Span },
}

impl StructExprField {
    pub fn get_span(&self) -> &Span {
        match self {
            StructExprField::Identifier { span, .. }
            | StructExprField::IdentifierValue { span, .. }
            | StructExprField::IndexValue { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructExpr {
    pub name: PathInExpression,
    pub fields: Vec<StructExprField>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub function: Box<Expr>,
    pub args: Vec<Expr>,
    /// The callee's declaration, attached once the call type checks.
    pub callee_decl: Option<FnSignature>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockExpr {
    pub statements: Vec<Stmt>,
    /// Locals declared directly in this block.
    pub locals: Vec<Local>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnExpr {
    pub value: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(BlockExpr),
    If(Box<IfExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_block: BlockExpr,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedExpr {
    pub kind: UnsupportedExprKind,
    pub span: Span,
}
