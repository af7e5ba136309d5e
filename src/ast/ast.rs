use std::fmt::Display;

use crate::Span;

use super::statements::{Function, StructStruct};

/// A parsed, macro-expanded crate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Crate {
    pub items: Vec<Item>,
    /// Set by type resolution when it finished without recording an error.
    pub resolved: bool,
}

impl Crate {
    pub fn new(items: Vec<Item>) -> Self {
        Crate {
            items,
            resolved: false,
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructStruct> {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(strukt) => Some(strukt),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Struct(StructStruct),
    Unsupported(UnsupportedItem),
}

impl Item {
    pub fn get_span(&self) -> &Span {
        match self {
            Item::Function(function) => &function.span,
            Item::Struct(strukt) => &strukt.span,
            Item::Unsupported(unsupported) => &unsupported.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedItem {
    pub kind: UnsupportedItemKind,
    pub name: String,
    pub span: Span,
}

/// Binding patterns. Only identifiers and `_` bind anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Identifier(IdentifierPattern),
    Wildcard(Span),
    Unsupported(UnsupportedPattern),
}

impl Pattern {
    pub fn get_span(&self) -> &Span {
        match self {
            Pattern::Identifier(identifier) => &identifier.span,
            Pattern::Wildcard(span) => span,
            Pattern::Unsupported(unsupported) => &unsupported.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierPattern {
    pub name: String,
    pub is_mut: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedPattern {
    pub kind: UnsupportedPatternKind,
    pub span: Span,
}

// Node kinds the parser produces but neither pass analyses.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedItemKind {
    Enum,
    Trait,
    Impl,
    Constant,
    Static,
    TupleStruct,
    Module,
    Use,
    ExternBlock,
    TypeAlias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedExprKind {
    Closure,
    Match,
    MethodCall,
    FieldAccess,
    Loop,
    WhileLoop,
    ForLoop,
    Borrow,
    Dereference,
    TypeCast,
    Range,
    Tuple,
    TupleIndex,
    CompoundAssignment,
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedTypeKind {
    Tuple,
    Reference,
    RawPointer,
    Slice,
    Never,
    Inferred,
    FunctionPointer,
    TraitObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedPatternKind {
    Tuple,
    Struct,
    TupleStruct,
    Literal,
    Range,
    Reference,
    Slice,
}

impl Display for UnsupportedItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnsupportedItemKind::Enum => "enum",
            UnsupportedItemKind::Trait => "trait",
            UnsupportedItemKind::Impl => "impl block",
            UnsupportedItemKind::Constant => "constant item",
            UnsupportedItemKind::Static => "static item",
            UnsupportedItemKind::TupleStruct => "tuple struct",
            UnsupportedItemKind::Module => "module",
            UnsupportedItemKind::Use => "use declaration",
            UnsupportedItemKind::ExternBlock => "extern block",
            UnsupportedItemKind::TypeAlias => "type alias",
        };
        write!(f, "{}", name)
    }
}

impl Display for UnsupportedExprKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnsupportedExprKind::Closure => "closure",
            UnsupportedExprKind::Match => "match expression",
            UnsupportedExprKind::MethodCall => "method call",
            UnsupportedExprKind::FieldAccess => "field access",
            UnsupportedExprKind::Loop => "loop",
            UnsupportedExprKind::WhileLoop => "while loop",
            UnsupportedExprKind::ForLoop => "for loop",
            UnsupportedExprKind::Borrow => "borrow",
            UnsupportedExprKind::Dereference => "dereference",
            UnsupportedExprKind::TypeCast => "type cast",
            UnsupportedExprKind::Range => "range",
            UnsupportedExprKind::Tuple => "tuple",
            UnsupportedExprKind::TupleIndex => "tuple index",
            UnsupportedExprKind::CompoundAssignment => "compound assignment",
            UnsupportedExprKind::Break => "break",
            UnsupportedExprKind::Continue => "continue",
        };
        write!(f, "{}", name)
    }
}

impl Display for UnsupportedTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnsupportedTypeKind::Tuple => "tuple type",
            UnsupportedTypeKind::Reference => "reference type",
            UnsupportedTypeKind::RawPointer => "raw pointer type",
            UnsupportedTypeKind::Slice => "slice type",
            UnsupportedTypeKind::Never => "never type",
            UnsupportedTypeKind::Inferred => "inferred type",
            UnsupportedTypeKind::FunctionPointer => "function pointer type",
            UnsupportedTypeKind::TraitObject => "trait object type",
        };
        write!(f, "{}", name)
    }
}

impl Display for UnsupportedPatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnsupportedPatternKind::Tuple => "tuple pattern",
            UnsupportedPatternKind::Struct => "struct pattern",
            UnsupportedPatternKind::TupleStruct => "tuple struct pattern",
            UnsupportedPatternKind::Literal => "literal pattern",
            UnsupportedPatternKind::Range => "range pattern",
            UnsupportedPatternKind::Reference => "reference pattern",
            UnsupportedPatternKind::Slice => "slice pattern",
        };
        write!(f, "{}", name)
    }
}
