//! A block-structured reference IR.
//!
//! Blocks, functions, variables and structs live in arenas inside
//! [`IrBackend`] and are referred to by id; expressions and statements are
//! plain owned trees. After [`Backend::write_global_definitions`] the emitted
//! [`Program`] can be inspected or rendered through `Display`.

use crate::Span;

use super::{Backend, BackendError, Operator, TypedIdentifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum IrType {
    Bool,
    Integer { unsigned: bool, bits: u32 },
    Float { bits: u32 },
    Named { name: String, ty: Box<IrType> },
    Array { element: Box<IrType>, length: u64 },
    Struct(StructId),
    Function {
        params: Vec<IrType>,
        result: Option<Box<IrType>>,
    },
}

impl IrType {
    /// The type with any `Named` wrappers removed.
    pub fn underlying(&self) -> &IrType {
        match self {
            IrType::Named { ty, .. } => ty.underlying(),
            ty => ty,
        }
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self.underlying(), IrType::Integer { unsigned: true, .. })
    }

    pub fn is_float(&self) -> bool {
        matches!(self.underlying(), IrType::Float { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    Bool(bool),
    Integer { ty: IrType, value: i128 },
    Float { ty: IrType, value: f64 },
    Var(VariableId),
    FunctionRef(FunctionId),
    Unary {
        op: Operator,
        operand: Box<IrExpr>,
    },
    Binary {
        op: Operator,
        lhs: Box<IrExpr>,
        rhs: Box<IrExpr>,
    },
    Call {
        callee: Box<IrExpr>,
        args: Vec<IrExpr>,
    },
    ArrayConstructor {
        ty: IrType,
        indexes: Vec<u64>,
        values: Vec<IrExpr>,
    },
    Index {
        array: Box<IrExpr>,
        index: Box<IrExpr>,
    },
    Constructor { ty: IrType, values: Vec<IrExpr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrStmt {
    Expression(IrExpr),
    Init { var: VariableId, value: IrExpr },
    Assign { lhs: IrExpr, rhs: IrExpr },
    Return(Vec<IrExpr>),
    If {
        condition: IrExpr,
        then_block: BlockId,
        else_block: Option<BlockId>,
    },
    Block(BlockId),
    Temporary {
        var: VariableId,
        init: Option<IrExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Local,
    Parameter,
    Temporary,
}

#[derive(Debug, Clone)]
pub struct VariableData {
    pub name: String,
    pub ty: IrType,
    pub kind: VariableKind,
    pub function: FunctionId,
    pub is_address_taken: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BlockData {
    pub function: FunctionId,
    pub parent: Option<BlockId>,
    pub vars: Vec<VariableId>,
    pub statements: Vec<IrStmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionData {
    pub name: String,
    pub ty: IrType,
    pub params: Vec<VariableId>,
    pub body: Option<BlockId>,
    pub span: Span,
}

impl FunctionData {
    pub fn result_type(&self) -> Option<&IrType> {
        match &self.ty {
            IrType::Function { result, .. } => result.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructData {
    pub name: String,
    /// `None` until the placeholder is completed.
    pub fields: Option<Vec<TypedIdentifier<IrType>>>,
    pub span: Span,
}

/// The four ordered collections handed to whole-program emission.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub types: Vec<IrType>,
    pub constants: Vec<IrExpr>,
    pub functions: Vec<FunctionId>,
    pub variables: Vec<VariableId>,
}

#[derive(Debug, Default)]
pub struct IrBackend {
    name: String,
    pub(crate) structs: Vec<StructData>,
    pub(crate) functions: Vec<FunctionData>,
    pub(crate) blocks: Vec<BlockData>,
    pub(crate) variables: Vec<VariableData>,
    program: Option<Program>,
}

impl IrBackend {
    pub fn new(name: &str) -> Self {
        IrBackend {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The emitted program, if emission has happened.
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn function(&self, id: FunctionId) -> &FunctionData {
        &self.functions[id.0]
    }

    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.0]
    }

    pub fn variable(&self, id: VariableId) -> &VariableData {
        &self.variables[id.0]
    }

    pub fn struct_data(&self, id: StructId) -> &StructData {
        &self.structs[id.0]
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.functions
            .iter()
            .position(|function| function.name == name)
            .map(FunctionId)
    }

    /// Every variable declared for `function`, parameters first.
    pub fn variables_of(&self, function: FunctionId) -> impl Iterator<Item = VariableId> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter(move |(_, var)| var.function == function)
            .map(|(index, _)| VariableId(index))
    }

    /// The type an expression evaluates to, `None` for calls to functions
    /// without a result.
    pub fn type_of(&self, expr: &IrExpr) -> Option<IrType> {
        match expr {
            IrExpr::Bool(_) => Some(IrType::Bool),
            IrExpr::Integer { ty, .. } | IrExpr::Float { ty, .. } => Some(ty.clone()),
            IrExpr::Var(var) => Some(self.variable(*var).ty.clone()),
            IrExpr::FunctionRef(function) => Some(self.function(*function).ty.clone()),
            IrExpr::Unary { operand, .. } => self.type_of(operand),
            IrExpr::Binary { op, lhs, .. } => {
                if op.is_comparison() || matches!(op, Operator::AndAnd | Operator::OrOr) {
                    Some(IrType::Bool)
                } else {
                    self.type_of(lhs)
                }
            }
            IrExpr::Call { callee, .. } => match self.type_of(callee)? {
                IrType::Function { result, .. } => result.map(|result| *result),
                _ => None,
            },
            IrExpr::ArrayConstructor { ty, .. } | IrExpr::Constructor { ty, .. } => {
                Some(ty.clone())
            }
            IrExpr::Index { array, .. } => match self.type_of(array)?.underlying() {
                IrType::Array { element, .. } => Some(*element.clone()),
                _ => None,
            },
        }
    }

    fn new_variable(
        &mut self,
        function: FunctionId,
        name: &str,
        ty: &IrType,
        kind: VariableKind,
        is_address_taken: bool,
        span: &Span,
    ) -> VariableId {
        self.variables.push(VariableData {
            name: name.to_string(),
            ty: ty.clone(),
            kind,
            function,
            is_address_taken,
            span: span.clone(),
        });
        VariableId(self.variables.len() - 1)
    }
}

impl Backend for IrBackend {
    type Type = IrType;
    type Expression = IrExpr;
    type Statement = IrStmt;
    type Block = BlockId;
    type Function = FunctionId;
    type Variable = VariableId;

    fn bool_type(&mut self) -> IrType {
        IrType::Bool
    }

    fn integer_type(&mut self, is_unsigned: bool, bits: u32) -> IrType {
        IrType::Integer {
            unsigned: is_unsigned,
            bits,
        }
    }

    fn float_type(&mut self, bits: u32) -> IrType {
        IrType::Float { bits }
    }

    fn named_type(&mut self, name: &str, ty: IrType, _span: &Span) -> IrType {
        IrType::Named {
            name: name.to_string(),
            ty: Box::new(ty),
        }
    }

    fn array_type(&mut self, element: IrType, length: u64) -> IrType {
        IrType::Array {
            element: Box::new(element),
            length,
        }
    }

    fn placeholder_struct_type(&mut self, name: &str, span: &Span) -> IrType {
        self.structs.push(StructData {
            name: name.to_string(),
            fields: None,
            span: span.clone(),
        });
        IrType::Struct(StructId(self.structs.len() - 1))
    }

    fn set_placeholder_struct_type(
        &mut self,
        placeholder: &IrType,
        fields: Vec<TypedIdentifier<IrType>>,
    ) -> Result<(), BackendError> {
        let IrType::Struct(id) = placeholder else {
            return Err(BackendError::NotAStruct);
        };
        let data = &mut self.structs[id.0];
        if data.fields.is_some() {
            return Err(BackendError::StructAlreadyDefined {
                name: data.name.clone(),
            });
        }
        data.fields = Some(fields);
        Ok(())
    }

    fn function_type(
        &mut self,
        parameters: &[TypedIdentifier<IrType>],
        result: Option<IrType>,
        _span: &Span,
    ) -> IrType {
        IrType::Function {
            params: parameters.iter().map(|param| param.ty.clone()).collect(),
            result: result.map(Box::new),
        }
    }

    fn boolean_constant_expression(&mut self, value: bool) -> IrExpr {
        IrExpr::Bool(value)
    }

    fn integer_constant_expression(&mut self, ty: &IrType, value: i128) -> IrExpr {
        IrExpr::Integer {
            ty: ty.clone(),
            value,
        }
    }

    fn float_constant_expression(&mut self, ty: &IrType, value: f64) -> IrExpr {
        IrExpr::Float {
            ty: ty.clone(),
            value,
        }
    }

    fn var_expression(&mut self, var: &VariableId, _span: &Span) -> IrExpr {
        IrExpr::Var(*var)
    }

    fn function_code_expression(&mut self, function: &FunctionId, _span: &Span) -> IrExpr {
        IrExpr::FunctionRef(*function)
    }

    fn unary_expression(&mut self, op: Operator, operand: IrExpr, _span: &Span) -> IrExpr {
        IrExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    fn binary_expression(
        &mut self,
        op: Operator,
        lhs: IrExpr,
        rhs: IrExpr,
        _span: &Span,
    ) -> IrExpr {
        IrExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn call_expression(
        &mut self,
        _caller: &FunctionId,
        callee: IrExpr,
        args: Vec<IrExpr>,
        _span: &Span,
    ) -> IrExpr {
        IrExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    fn array_constructor_expression(
        &mut self,
        ty: &IrType,
        indexes: Vec<u64>,
        values: Vec<IrExpr>,
        _span: &Span,
    ) -> IrExpr {
        IrExpr::ArrayConstructor {
            ty: ty.clone(),
            indexes,
            values,
        }
    }

    fn array_index_expression(&mut self, array: IrExpr, index: IrExpr, _span: &Span) -> IrExpr {
        IrExpr::Index {
            array: Box::new(array),
            index: Box::new(index),
        }
    }

    fn constructor_expression(&mut self, ty: &IrType, values: Vec<IrExpr>, _span: &Span) -> IrExpr {
        IrExpr::Constructor {
            ty: ty.clone(),
            values,
        }
    }

    fn expression_statement(&mut self, _function: &FunctionId, expr: IrExpr) -> IrStmt {
        IrStmt::Expression(expr)
    }

    fn init_statement(&mut self, _function: &FunctionId, var: &VariableId, init: IrExpr) -> IrStmt {
        IrStmt::Init {
            var: *var,
            value: init,
        }
    }

    fn assignment_statement(
        &mut self,
        _function: &FunctionId,
        lhs: IrExpr,
        rhs: IrExpr,
        _span: &Span,
    ) -> IrStmt {
        IrStmt::Assign { lhs, rhs }
    }

    fn return_statement(
        &mut self,
        _function: &FunctionId,
        values: Vec<IrExpr>,
        _span: &Span,
    ) -> IrStmt {
        IrStmt::Return(values)
    }

    fn if_statement(
        &mut self,
        _function: &FunctionId,
        condition: IrExpr,
        then_block: BlockId,
        else_block: Option<BlockId>,
        _span: &Span,
    ) -> IrStmt {
        IrStmt::If {
            condition,
            then_block,
            else_block,
        }
    }

    fn block_statement(&mut self, block: &BlockId) -> IrStmt {
        IrStmt::Block(*block)
    }

    fn block(
        &mut self,
        function: &FunctionId,
        enclosing: Option<&BlockId>,
        vars: Vec<VariableId>,
        start: &Span,
        end: &Span,
    ) -> BlockId {
        self.blocks.push(BlockData {
            function: *function,
            parent: enclosing.copied(),
            vars,
            statements: Vec::new(),
            span: Span::new(start.start.clone(), end.end.clone()),
        });
        BlockId(self.blocks.len() - 1)
    }

    fn block_add_statements(&mut self, block: &BlockId, statements: Vec<IrStmt>) {
        self.blocks[block.0].statements.extend(statements);
    }

    fn local_variable(
        &mut self,
        function: &FunctionId,
        name: &str,
        ty: &IrType,
        is_address_taken: bool,
        span: &Span,
    ) -> VariableId {
        self.new_variable(
            *function,
            name,
            ty,
            VariableKind::Local,
            is_address_taken,
            span,
        )
    }

    fn parameter_variable(
        &mut self,
        function: &FunctionId,
        name: &str,
        ty: &IrType,
        span: &Span,
    ) -> VariableId {
        self.new_variable(*function, name, ty, VariableKind::Parameter, false, span)
    }

    fn temporary_variable(
        &mut self,
        function: &FunctionId,
        _block: &BlockId,
        ty: &IrType,
        init: Option<IrExpr>,
        span: &Span,
    ) -> (VariableId, IrStmt) {
        let name = format!("__tmp{}", self.variables.len());
        let var = self.new_variable(*function, &name, ty, VariableKind::Temporary, false, span);
        (var, IrStmt::Temporary { var, init })
    }

    fn function(&mut self, fntype: &IrType, name: &str, span: &Span) -> FunctionId {
        self.functions.push(FunctionData {
            name: name.to_string(),
            ty: fntype.clone(),
            params: Vec::new(),
            body: None,
            span: span.clone(),
        });
        FunctionId(self.functions.len() - 1)
    }

    fn function_set_parameters(
        &mut self,
        function: &FunctionId,
        params: Vec<VariableId>,
    ) -> Result<(), BackendError> {
        let data = &mut self.functions[function.0];
        let IrType::Function { params: declared, .. } = &data.ty else {
            return Err(BackendError::NotAFunctionType);
        };
        if declared.len() != params.len() {
            return Err(BackendError::ParameterCountMismatch {
                name: data.name.clone(),
                expected: declared.len(),
                received: params.len(),
            });
        }
        data.params = params;
        Ok(())
    }

    fn function_set_body(
        &mut self,
        function: &FunctionId,
        body: IrStmt,
    ) -> Result<(), BackendError> {
        let IrStmt::Block(block) = body else {
            return Err(BackendError::InvalidBody);
        };
        let data = &mut self.functions[function.0];
        if data.body.is_some() {
            return Err(BackendError::BodyAlreadySet {
                name: data.name.clone(),
            });
        }
        data.body = Some(block);
        Ok(())
    }

    fn write_global_definitions(
        &mut self,
        types: Vec<IrType>,
        constants: Vec<IrExpr>,
        functions: Vec<FunctionId>,
        variables: Vec<VariableId>,
    ) -> Result<(), BackendError> {
        if self.program.is_some() {
            return Err(BackendError::AlreadyEmitted);
        }
        log::debug!(
            "emitting {}: {} types, {} functions",
            self.name,
            types.len(),
            functions.len()
        );
        self.program = Some(Program {
            types,
            constants,
            functions,
            variables,
        });
        Ok(())
    }
}
