use crate::Span;

use super::{
    ast::Pattern,
    expressions::{BlockExpr, Expr},
    types::{Ty, Type},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    /// An expression followed by `;`.
    Expr(ExprStmt),
    /// A block or conditional used as a statement.
    ExprWithBlock(ExprStmt),
    Empty(Span),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Let(stmt) => &stmt.span,
            Stmt::Expr(stmt) | Stmt::ExprWithBlock(stmt) => &stmt.span,
            Stmt::Empty(span) => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub pattern: Pattern,
    pub ty: Option<Type>,
    pub init: Option<Expr>,
    /// Type inferred from the initializer when there is no annotation.
    pub inferred_type: Option<Ty>,
    /// Positions of the bound names in the owner's locals list.
    pub slots: Vec<usize>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub pattern: Pattern,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub return_type: Option<Type>,
    pub body: BlockExpr,
    /// Locals declared directly in the function body.
    pub locals: Vec<Local>,
    pub span: Span,
}

impl Function {
    pub fn signature(&self) -> FnSignature {
        FnSignature {
            name: self.name.clone(),
            params: self.params.iter().map(|param| param.ty.clone()).collect(),
            return_type: self.return_type.clone(),
            span: self.span.clone(),
        }
    }
}

/// The parts of a function declaration a caller needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSignature {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Option<Type>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructStruct {
    pub name: String,
    pub fields: Vec<StructField>,
    pub span: Span,
}

impl StructStruct {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// A name bound by `let`, harvested when its scope closes.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub name: String,
    pub ty: Ty,
    pub span: Span,
}
