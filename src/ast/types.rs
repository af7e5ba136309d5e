//! Type system definitions for the AST.
//!
//! This module defines both sides of the type system:
//!
//! - [`Type`], the type annotations written in source (paths and arrays)
//! - [`Ty`], the canonical resolved type produced by type resolution
//! - [`PrimitiveType`], the builtin scalar types seeded before every pass
//!
//! Source annotations are turned into [`Ty`] values during type resolution,
//! and those resolved types are what lowering reads back from the tree.

use std::fmt::Display;

use crate::Span;

use super::{ast::UnsupportedTypeKind, expressions::Expr};

/// A type annotation as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Path(TypePath),
    Array(ArrayType),
    Unsupported(UnsupportedType),
}

impl Type {
    pub fn get_span(&self) -> &Span {
        match self {
            Type::Path(path) => &path.span,
            Type::Array(array) => &array.span,
            Type::Unsupported(unsupported) => &unsupported.span,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Path(path) => write!(f, "{}", path.as_string()),
            Type::Array(array) => write!(f, "[{}; _]", array.element),
            Type::Unsupported(unsupported) => write!(f, "<{}>", unsupported.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypePath {
    pub segments: Vec<String>,
    pub span: Span,
}

impl TypePath {
    pub fn as_string(&self) -> String {
        self.segments.join("::")
    }

    pub fn is_single_segment(&self) -> bool {
        self.segments.len() == 1
    }
}

/// `[element; size]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: Box<Type>,
    pub size: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedType {
    pub kind: UnsupportedTypeKind,
    pub span: Span,
}

/// The builtin scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    Str,
    Bool,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 13] = [
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::F32,
        PrimitiveType::F64,
        PrimitiveType::Char,
        PrimitiveType::Str,
        PrimitiveType::Bool,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Char => "char",
            PrimitiveType::Str => "str",
            PrimitiveType::Bool => "bool",
        }
    }

    pub fn is_integer(&self) -> bool {
        self.bit_width().is_some() && !self.is_float()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, PrimitiveType::F32 | PrimitiveType::F64)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 | PrimitiveType::I64
        )
    }

    /// Width of the numeric types, `None` for bool, char and str.
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            PrimitiveType::U8 | PrimitiveType::I8 => Some(8),
            PrimitiveType::U16 | PrimitiveType::I16 => Some(16),
            PrimitiveType::U32 | PrimitiveType::I32 | PrimitiveType::F32 => Some(32),
            PrimitiveType::U64 | PrimitiveType::I64 | PrimitiveType::F64 => Some(64),
            PrimitiveType::Char | PrimitiveType::Str | PrimitiveType::Bool => None,
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A resolved type.
///
/// Two types are compatible exactly when they are structurally equal: same
/// primitive, same struct name, or arrays with compatible elements and the
/// same length. No coercions exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Primitive(PrimitiveType),
    Struct(String),
    Array(Box<Ty>, usize),
    /// Result of calling a function without a return type.
    Unit,
}

impl Ty {
    pub fn bool() -> Ty {
        Ty::Primitive(PrimitiveType::Bool)
    }

    pub fn i32() -> Ty {
        Ty::Primitive(PrimitiveType::I32)
    }

    pub fn is_compatible_with(&self, other: &Ty) -> bool {
        match (self, other) {
            (Ty::Unit, _) | (_, Ty::Unit) => false,
            (Ty::Array(lhs, lhs_len), Ty::Array(rhs, rhs_len)) => {
                lhs_len == rhs_len && lhs.is_compatible_with(rhs)
            }
            (lhs, rhs) => lhs == rhs,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Ty::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&Ty> {
        match self {
            Ty::Array(element, _) => Some(element),
            _ => None,
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Primitive(primitive) => write!(f, "{}", primitive),
            Ty::Struct(name) => write!(f, "{}", name),
            Ty::Array(element, length) => write!(f, "[{}; {}]", element, length),
            Ty::Unit => write!(f, "()"),
        }
    }
}
