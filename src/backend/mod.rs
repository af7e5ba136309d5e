//! The IR builder interface lowering targets.
//!
//! Lowering never constructs target code itself: it only calls into a
//! [`Backend`], which hands back opaque handles for types, expressions,
//! statements, blocks, functions and variables. Two implementations ship with
//! the crate:
//!
//! - [`ir::IrBackend`], an inspectable block-structured IR with a text form
//! - `llvm`, behind the `llvm` feature, which translates that IR through inkwell

use std::fmt::{Debug, Display};

use thiserror::Error;

use crate::Span;

pub mod ir;
#[cfg(feature = "llvm")]
pub mod llvm;
pub mod pretty;

#[cfg(test)]
mod tests;

/// Backend opcodes for unary and binary expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    AndAnd,
    OrOr,
    Not,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::LeftShift => "<<",
            Operator::RightShift => ">>",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::AndAnd => "&&",
            Operator::OrOr => "||",
            Operator::Not => "!",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::Greater
                | Operator::Less
                | Operator::GreaterOrEqual
                | Operator::LessOrEqual
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A name paired with a backend type: struct fields and function parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedIdentifier<T> {
    pub name: String,
    pub ty: T,
    pub span: Span,
}

impl<T> TypedIdentifier<T> {
    pub fn new(name: &str, ty: T, span: Span) -> Self {
        TypedIdentifier {
            name: name.to_string(),
            ty,
            span,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("type is not a struct placeholder")]
    NotAStruct,
    #[error("struct {name:?} already has a body")]
    StructAlreadyDefined { name: String },
    #[error("type is not a function type")]
    NotAFunctionType,
    #[error("function {name:?} expects {expected} parameters, received {received}")]
    ParameterCountMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("function body must be a block statement")]
    InvalidBody,
    #[error("function {name:?} already has a body")]
    BodyAlreadySet { name: String },
    #[error("program has already been emitted")]
    AlreadyEmitted,
    #[error("llvm: {0}")]
    Llvm(String),
}

/// IR construction interface.
///
/// Handles are cheap to clone. Statements are appended to blocks explicitly
/// through [`Backend::block_add_statements`]; a function's body is the
/// [`Backend::block_statement`] wrapping its outermost block.
pub trait Backend {
    type Type: Clone + Debug;
    type Expression: Clone + Debug;
    type Statement: Clone + Debug;
    type Block: Clone + Debug;
    type Function: Clone + Debug;
    type Variable: Clone + Debug;

    // Types

    fn bool_type(&mut self) -> Self::Type;
    fn integer_type(&mut self, is_unsigned: bool, bits: u32) -> Self::Type;
    fn float_type(&mut self, bits: u32) -> Self::Type;
    fn named_type(&mut self, name: &str, ty: Self::Type, span: &Span) -> Self::Type;
    fn array_type(&mut self, element: Self::Type, length: u64) -> Self::Type;
    fn placeholder_struct_type(&mut self, name: &str, span: &Span) -> Self::Type;
    fn set_placeholder_struct_type(
        &mut self,
        placeholder: &Self::Type,
        fields: Vec<TypedIdentifier<Self::Type>>,
    ) -> Result<(), BackendError>;
    fn function_type(
        &mut self,
        parameters: &[TypedIdentifier<Self::Type>],
        result: Option<Self::Type>,
        span: &Span,
    ) -> Self::Type;

    // Expressions

    fn boolean_constant_expression(&mut self, value: bool) -> Self::Expression;
    fn integer_constant_expression(&mut self, ty: &Self::Type, value: i128) -> Self::Expression;
    fn float_constant_expression(&mut self, ty: &Self::Type, value: f64) -> Self::Expression;
    fn var_expression(&mut self, var: &Self::Variable, span: &Span) -> Self::Expression;
    fn function_code_expression(&mut self, function: &Self::Function, span: &Span)
        -> Self::Expression;
    fn unary_expression(
        &mut self,
        op: Operator,
        operand: Self::Expression,
        span: &Span,
    ) -> Self::Expression;
    fn binary_expression(
        &mut self,
        op: Operator,
        lhs: Self::Expression,
        rhs: Self::Expression,
        span: &Span,
    ) -> Self::Expression;
    fn call_expression(
        &mut self,
        caller: &Self::Function,
        callee: Self::Expression,
        args: Vec<Self::Expression>,
        span: &Span,
    ) -> Self::Expression;
    fn array_constructor_expression(
        &mut self,
        ty: &Self::Type,
        indexes: Vec<u64>,
        values: Vec<Self::Expression>,
        span: &Span,
    ) -> Self::Expression;
    fn array_index_expression(
        &mut self,
        array: Self::Expression,
        index: Self::Expression,
        span: &Span,
    ) -> Self::Expression;
    fn constructor_expression(
        &mut self,
        ty: &Self::Type,
        values: Vec<Self::Expression>,
        span: &Span,
    ) -> Self::Expression;

    // Statements

    fn expression_statement(
        &mut self,
        function: &Self::Function,
        expr: Self::Expression,
    ) -> Self::Statement;
    fn init_statement(
        &mut self,
        function: &Self::Function,
        var: &Self::Variable,
        init: Self::Expression,
    ) -> Self::Statement;
    fn assignment_statement(
        &mut self,
        function: &Self::Function,
        lhs: Self::Expression,
        rhs: Self::Expression,
        span: &Span,
    ) -> Self::Statement;
    fn return_statement(
        &mut self,
        function: &Self::Function,
        values: Vec<Self::Expression>,
        span: &Span,
    ) -> Self::Statement;
    fn if_statement(
        &mut self,
        function: &Self::Function,
        condition: Self::Expression,
        then_block: Self::Block,
        else_block: Option<Self::Block>,
        span: &Span,
    ) -> Self::Statement;
    fn block_statement(&mut self, block: &Self::Block) -> Self::Statement;

    // Blocks

    fn block(
        &mut self,
        function: &Self::Function,
        enclosing: Option<&Self::Block>,
        vars: Vec<Self::Variable>,
        start: &Span,
        end: &Span,
    ) -> Self::Block;
    fn block_add_statements(&mut self, block: &Self::Block, statements: Vec<Self::Statement>);

    // Variables

    fn local_variable(
        &mut self,
        function: &Self::Function,
        name: &str,
        ty: &Self::Type,
        is_address_taken: bool,
        span: &Span,
    ) -> Self::Variable;
    fn parameter_variable(
        &mut self,
        function: &Self::Function,
        name: &str,
        ty: &Self::Type,
        span: &Span,
    ) -> Self::Variable;
    fn temporary_variable(
        &mut self,
        function: &Self::Function,
        block: &Self::Block,
        ty: &Self::Type,
        init: Option<Self::Expression>,
        span: &Span,
    ) -> (Self::Variable, Self::Statement);

    // Functions

    fn function(&mut self, fntype: &Self::Type, name: &str, span: &Span) -> Self::Function;
    fn function_set_parameters(
        &mut self,
        function: &Self::Function,
        params: Vec<Self::Variable>,
    ) -> Result<(), BackendError>;
    fn function_set_body(
        &mut self,
        function: &Self::Function,
        body: Self::Statement,
    ) -> Result<(), BackendError>;

    /// Emits the whole program. Called at most once, and only when neither
    /// pass recorded an error.
    fn write_global_definitions(
        &mut self,
        types: Vec<Self::Type>,
        constants: Vec<Self::Expression>,
        functions: Vec<Self::Function>,
        variables: Vec<Self::Variable>,
    ) -> Result<(), BackendError>;
}
