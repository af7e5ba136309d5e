use std::fmt::Display;

use thiserror::Error;

use crate::{backend::BackendError, Position};

#[derive(Error, Debug, Clone)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnknownIdentifier { .. } => "UnknownIdentifier",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::UnknownStruct { .. } => "UnknownStruct",
            ErrorImpl::UnknownField { .. } => "UnknownField",
            ErrorImpl::UnknownFieldIndex { .. } => "UnknownFieldIndex",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::MissingTypeInformation => "MissingTypeInformation",
            ErrorImpl::MissingStructField { .. } => "MissingStructField",
            ErrorImpl::DuplicateStructField { .. } => "DuplicateStructField",
            ErrorImpl::ReturnInVoidFunction => "ReturnInVoidFunction",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::VoidInitializer => "VoidInitializer",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::InvalidArrayLength => "InvalidArrayLength",
            ErrorImpl::UnsupportedPattern { .. } => "UnsupportedPattern",
            ErrorImpl::UnsupportedLiteral { .. } => "UnsupportedLiteral",
            ErrorImpl::UnsupportedType { .. } => "UnsupportedType",
            ErrorImpl::MultiSegmentPath { .. } => "MultiSegmentPath",
            ErrorImpl::InvalidLiteral { .. } => "InvalidLiteral",
            ErrorImpl::UnresolvedSubexpression { .. } => "UnresolvedSubexpression",
            ErrorImpl::LoweringFailed { .. } => "LoweringFailed",
            ErrorImpl::UnresolvedCrate => "UnresolvedCrate",
            ErrorImpl::Backend(_) => "Backend",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnknownIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", name))
            }
            ErrorImpl::UnknownType { name } => ErrorTip::Suggestion(format!(
                "Type `{}` must be declared before it is used",
                name
            )),
            ErrorImpl::UnknownFunction { name } => {
                ErrorTip::Suggestion(format!("No function named `{}` in this crate", name))
            }
            ErrorImpl::UnknownStruct { name } => {
                ErrorTip::Suggestion(format!("No struct named `{}` in scope", name))
            }
            ErrorImpl::UnknownField { strukt, field } => {
                ErrorTip::Suggestion(format!("Struct `{}` has no field `{}`", strukt, field))
            }
            ErrorImpl::UnknownFieldIndex { strukt, index } => ErrorTip::Suggestion(format!(
                "Struct `{}` has no field at index {}",
                strukt, index
            )),
            ErrorImpl::TypeMismatch { expected, found } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, found `{}`",
                expected, found
            )),
            ErrorImpl::ArgumentCountMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected {} arguments, received {}",
                    expected, received
                ))
            }
            ErrorImpl::MissingTypeInformation => ErrorTip::Suggestion(String::from(
                "Add a type annotation or an initializer to the declaration",
            )),
            ErrorImpl::MissingStructField { strukt, field } => ErrorTip::Suggestion(format!(
                "Initialise field `{}` of struct `{}`",
                field, strukt
            )),
            ErrorImpl::DuplicateStructField { field, .. } => {
                ErrorTip::Suggestion(format!("Field `{}` is initialised twice", field))
            }
            ErrorImpl::ReturnInVoidFunction => ErrorTip::Suggestion(String::from(
                "Declare a return type on the function or remove the returned value",
            )),
            ErrorImpl::MissingReturnValue { expected } => {
                ErrorTip::Suggestion(format!("Return a value of type `{}`", expected))
            }
            ErrorImpl::VoidInitializer => ErrorTip::None,
            ErrorImpl::NotAnArray { found } => {
                ErrorTip::Suggestion(format!("Only arrays can be indexed, found `{}`", found))
            }
            ErrorImpl::InvalidOperand { operator, operand } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot be applied to `{}`",
                operator, operand
            )),
            ErrorImpl::InvalidArrayLength => ErrorTip::Suggestion(String::from(
                "Array lengths must be integer literals no larger than 65536",
            )),
            ErrorImpl::UnsupportedPattern { .. }
            | ErrorImpl::UnsupportedLiteral { .. }
            | ErrorImpl::UnsupportedType { .. } => ErrorTip::None,
            ErrorImpl::MultiSegmentPath { path } => ErrorTip::Suggestion(format!(
                "Only single segment paths are supported, found `{}`",
                path
            )),
            ErrorImpl::InvalidLiteral { literal } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                literal
            )),
            ErrorImpl::UnresolvedSubexpression { .. } | ErrorImpl::LoweringFailed { .. } => {
                ErrorTip::None
            }
            ErrorImpl::UnresolvedCrate => ErrorTip::Suggestion(String::from(
                "Run type resolution without errors before compiling",
            )),
            ErrorImpl::Backend(_) => ErrorTip::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unknown identifier {name:?}")]
    UnknownIdentifier { name: String },
    #[error("unknown type {name:?}")]
    UnknownType { name: String },
    #[error("failed to lookup function {name:?}")]
    UnknownFunction { name: String },
    #[error("unknown struct {name:?}")]
    UnknownStruct { name: String },
    #[error("unknown field {field:?} in struct {strukt:?}")]
    UnknownField { strukt: String, field: String },
    #[error("unknown field at index {index} in struct {strukt:?}")]
    UnknownFieldIndex { strukt: String, index: usize },
    #[error("E0308: expected: {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("differing number of arguments vs parameters to function: expected {expected}, received {received}")]
    ArgumentCountMismatch { expected: usize, received: usize },
    #[error("E0282: type annotations or init expression needed")]
    MissingTypeInformation,
    #[error("E0063: missing field {field:?} in initializer of {strukt:?}")]
    MissingStructField { strukt: String, field: String },
    #[error("E0062: field {field:?} specified more than once in initializer of {strukt:?}")]
    DuplicateStructField { strukt: String, field: String },
    #[error("return for void function")]
    ReturnInVoidFunction,
    #[error("return without a value in function returning {expected}")]
    MissingReturnValue { expected: String },
    #[error("void type found for statement initialisation")]
    VoidInitializer,
    #[error("expected an array type, found {found}")]
    NotAnArray { found: String },
    #[error("operator `{operator}` cannot be applied to type {operand}")]
    InvalidOperand { operator: String, operand: String },
    #[error("array length must be an integer literal of at most 65536")]
    InvalidArrayLength,
    #[error("unsupported pattern: {what}")]
    UnsupportedPattern { what: String },
    #[error("unsupported literal: {what}")]
    UnsupportedLiteral { what: String },
    #[error("unsupported type: {what}")]
    UnsupportedType { what: String },
    #[error("unable to compile multi segment types yet: {path:?}")]
    MultiSegmentPath { path: String },
    #[error("bad number in literal {literal:?}")]
    InvalidLiteral { literal: String },
    #[error("unable to determine {what}")]
    UnresolvedSubexpression { what: String },
    #[error("failed to compile {what}")]
    LoweringFailed { what: String },
    #[error("crate has not been successfully type resolved")]
    UnresolvedCrate,
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
