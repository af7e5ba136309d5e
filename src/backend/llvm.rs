//! LLVM code generation for the reference IR.
//!
//! Translates the program emitted into an [`IrBackend`] into an inkwell
//! [`Module`]. Every variable lives in an entry-block alloca; aggregates are
//! built in a stack slot and loaded as a whole.

use std::{collections::HashMap, fmt::Debug, path::Path};

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::Module,
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, StructType},
    values::{
        BasicMetadataValueEnum, BasicValue, BasicValueEnum, FunctionValue, IntValue, PointerValue,
    },
    FloatPredicate, IntPredicate,
};

use super::{
    ir::{BlockId, FunctionId, IrBackend, IrExpr, IrStmt, IrType, StructId, VariableId},
    BackendError, Operator,
};

fn llvm_error<E: Debug>(error: E) -> BackendError {
    BackendError::Llvm(format!("{:?}", error))
}

/// Builds an LLVM module from the program emitted into `ir` and verifies it.
pub fn emit_module<'ctx>(
    ir: &IrBackend,
    context: &'ctx Context,
) -> Result<Module<'ctx>, BackendError> {
    let Some(program) = ir.program() else {
        return Err(BackendError::Llvm(format!(
            "no program has been emitted for {}",
            ir.name()
        )));
    };

    let mut emitter = LlvmEmitter::new(ir, context);
    emitter.declare_structs()?;
    emitter.declare_functions()?;
    for function in &program.functions {
        emitter.define_function(*function)?;
    }

    emitter
        .module
        .verify()
        .map_err(|message| BackendError::Llvm(message.to_string()))?;
    Ok(emitter.module)
}

/// Writes the textual form of `module` to `path`.
pub fn write_module(module: &Module, path: &Path) -> Result<(), BackendError> {
    module
        .print_to_file(path)
        .map_err(|message| BackendError::Llvm(message.to_string()))
}

struct LlvmEmitter<'ctx, 'ir> {
    ir: &'ir IrBackend,
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,

    structs: HashMap<StructId, StructType<'ctx>>,
    functions: HashMap<FunctionId, FunctionValue<'ctx>>,
    /// Stack slot of every variable of the function being defined
    variables: HashMap<VariableId, PointerValue<'ctx>>,
    current: Option<FunctionValue<'ctx>>,
}

impl<'ctx, 'ir> LlvmEmitter<'ctx, 'ir> {
    fn new(ir: &'ir IrBackend, context: &'ctx Context) -> Self {
        LlvmEmitter {
            ir,
            context,
            module: context.create_module(ir.name()),
            builder: context.create_builder(),
            structs: HashMap::new(),
            functions: HashMap::new(),
            variables: HashMap::new(),
            current: None,
        }
    }

    fn declare_structs(&mut self) -> Result<(), BackendError> {
        let ir = self.ir;
        // Opaque first so fields may refer to any struct.
        for (index, data) in ir.structs.iter().enumerate() {
            self.structs
                .insert(StructId(index), self.context.opaque_struct_type(&data.name));
        }
        for (index, data) in ir.structs.iter().enumerate() {
            let mut fields = Vec::new();
            for field in data.fields.iter().flatten() {
                fields.push(self.basic_type(&field.ty)?);
            }
            if let Some(struct_type) = self.structs.get(&StructId(index)) {
                struct_type.set_body(&fields, false);
            }
        }
        Ok(())
    }

    fn declare_functions(&mut self) -> Result<(), BackendError> {
        let ir = self.ir;
        for (index, data) in ir.functions.iter().enumerate() {
            let IrType::Function { params, result } = &data.ty else {
                return Err(BackendError::NotAFunctionType);
            };
            let mut param_types: Vec<BasicMetadataTypeEnum> = Vec::with_capacity(params.len());
            for param in params {
                param_types.push(self.basic_type(param)?.into());
            }
            let fn_type = match result {
                Some(result) => self.basic_type(result)?.fn_type(&param_types, false),
                None => self.context.void_type().fn_type(&param_types, false),
            };
            let function = self.module.add_function(&data.name, fn_type, None);
            self.functions.insert(FunctionId(index), function);
        }
        Ok(())
    }

    fn basic_type(&self, ty: &IrType) -> Result<BasicTypeEnum<'ctx>, BackendError> {
        Ok(match ty.underlying() {
            IrType::Bool => self.context.bool_type().into(),
            IrType::Integer { bits, .. } => self.context.custom_width_int_type(*bits).into(),
            IrType::Float { bits: 64 } => self.context.f64_type().into(),
            IrType::Float { .. } => self.context.f32_type().into(),
            IrType::Array { element, length } => {
                let length = u32::try_from(*length).map_err(llvm_error)?;
                self.basic_type(element)?.array_type(length).into()
            }
            IrType::Struct(id) => match self.structs.get(id) {
                Some(struct_type) => (*struct_type).into(),
                None => return Err(BackendError::NotAStruct),
            },
            IrType::Function { .. } | IrType::Named { .. } => {
                return Err(BackendError::Llvm(format!(
                    "no value type for {}",
                    self.ir.render_type(ty)
                )))
            }
        })
    }

    fn function_value(&self, id: FunctionId) -> Result<FunctionValue<'ctx>, BackendError> {
        self.functions
            .get(&id)
            .copied()
            .ok_or_else(|| BackendError::Llvm(format!("undeclared function #{}", id.0)))
    }

    fn define_function(&mut self, id: FunctionId) -> Result<(), BackendError> {
        let ir = self.ir;
        let data = ir.function(id);
        let Some(body) = data.body else {
            return Ok(());
        };
        let function = self.function_value(id)?;
        self.current = Some(function);
        self.variables.clear();

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        for var in ir.variables_of(id) {
            let data = ir.variable(var);
            let slot = self
                .builder
                .build_alloca(self.basic_type(&data.ty)?, &data.name)
                .map_err(llvm_error)?;
            self.variables.insert(var, slot);
        }
        for (index, param) in data.params.iter().enumerate() {
            let value = function
                .get_nth_param(index as u32)
                .ok_or_else(|| BackendError::ParameterCountMismatch {
                    name: data.name.clone(),
                    expected: data.params.len(),
                    received: index,
                })?;
            self.builder
                .build_store(self.slot(*param)?, value)
                .map_err(llvm_error)?;
        }

        self.emit_block(body)?;

        if !self.is_terminated() {
            if data.result_type().is_some() {
                self.builder.build_unreachable().map_err(llvm_error)?;
            } else {
                self.builder.build_return(None).map_err(llvm_error)?;
            }
        }
        Ok(())
    }

    fn slot(&self, var: VariableId) -> Result<PointerValue<'ctx>, BackendError> {
        self.variables.get(&var).copied().ok_or_else(|| {
            BackendError::Llvm(format!("no stack slot for {}", self.ir.variable(var).name))
        })
    }

    fn is_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }

    fn append_block(&self, name: &str) -> Result<BasicBlock<'ctx>, BackendError> {
        match self.current {
            Some(function) => Ok(self.context.append_basic_block(function, name)),
            None => Err(BackendError::Llvm(String::from("no function being defined"))),
        }
    }

    fn emit_block(&mut self, id: BlockId) -> Result<(), BackendError> {
        let ir = self.ir;
        for statement in &ir.block(id).statements {
            self.emit_statement(statement)?;
        }
        Ok(())
    }

    fn emit_statement(&mut self, statement: &IrStmt) -> Result<(), BackendError> {
        match statement {
            IrStmt::Expression(expr) => {
                self.emit_expr(expr)?;
            }
            IrStmt::Init { var, value } => {
                let value = self.emit_value(value)?;
                self.builder
                    .build_store(self.slot(*var)?, value)
                    .map_err(llvm_error)?;
            }
            IrStmt::Temporary { var, init } => {
                if let Some(init) = init {
                    let value = self.emit_value(init)?;
                    self.builder
                        .build_store(self.slot(*var)?, value)
                        .map_err(llvm_error)?;
                }
            }
            IrStmt::Assign { lhs, rhs } => {
                let value = self.emit_value(rhs)?;
                let place = self.place(lhs)?;
                self.builder.build_store(place, value).map_err(llvm_error)?;
            }
            IrStmt::Return(values) => {
                let value = match values.first() {
                    Some(value) => Some(self.emit_value(value)?),
                    None => None,
                };
                self.builder
                    .build_return(value.as_ref().map(|value| value as &dyn BasicValue))
                    .map_err(llvm_error)?;
                // Anything after a return is unreachable but still needs a block.
                let dead = self.append_block("after_return")?;
                self.builder.position_at_end(dead);
            }
            IrStmt::If {
                condition,
                then_block,
                else_block,
            } => {
                let condition = self.emit_value(condition)?.into_int_value();
                let then_bb = self.append_block("then")?;
                let else_bb = match else_block {
                    Some(_) => Some(self.append_block("else")?),
                    None => None,
                };
                let merge_bb = self.append_block("merge")?;

                self.builder
                    .build_conditional_branch(condition, then_bb, else_bb.unwrap_or(merge_bb))
                    .map_err(llvm_error)?;

                self.builder.position_at_end(then_bb);
                self.emit_block(*then_block)?;
                self.branch_to(merge_bb)?;

                if let (Some(else_bb), Some(else_block)) = (else_bb, else_block) {
                    self.builder.position_at_end(else_bb);
                    self.emit_block(*else_block)?;
                    self.branch_to(merge_bb)?;
                }

                self.builder.position_at_end(merge_bb);
            }
            IrStmt::Block(block) => self.emit_block(*block)?,
        }
        Ok(())
    }

    fn branch_to(&self, target: BasicBlock<'ctx>) -> Result<(), BackendError> {
        if !self.is_terminated() {
            self.builder
                .build_unconditional_branch(target)
                .map_err(llvm_error)?;
        }
        Ok(())
    }

    fn emit_value(&mut self, expr: &IrExpr) -> Result<BasicValueEnum<'ctx>, BackendError> {
        self.emit_expr(expr)?.ok_or_else(|| {
            BackendError::Llvm(format!(
                "expression {} has no value",
                self.ir.render_expr(expr)
            ))
        })
    }

    /// The address of an assignable expression. Other values are spilled to a
    /// fresh stack slot.
    fn place(&mut self, expr: &IrExpr) -> Result<PointerValue<'ctx>, BackendError> {
        match expr {
            IrExpr::Var(var) => self.slot(*var),
            IrExpr::Index { array, index } => {
                let base = self.place(array)?;
                let index = self.emit_value(index)?.into_int_value();
                self.element_pointer(base, index)
            }
            other => {
                let value = self.emit_value(other)?;
                let slot = self
                    .builder
                    .build_alloca(value.get_type(), "spill")
                    .map_err(llvm_error)?;
                self.builder.build_store(slot, value).map_err(llvm_error)?;
                Ok(slot)
            }
        }
    }

    fn element_pointer(
        &self,
        base: PointerValue<'ctx>,
        index: IntValue<'ctx>,
    ) -> Result<PointerValue<'ctx>, BackendError> {
        let zero = self.context.i32_type().const_zero();
        // The index was type checked as i32; bounds are not checked.
        unsafe { self.builder.build_in_bounds_gep(base, &[zero, index], "element") }
            .map_err(llvm_error)
    }

    fn emit_expr(&mut self, expr: &IrExpr) -> Result<Option<BasicValueEnum<'ctx>>, BackendError> {
        let value: BasicValueEnum<'ctx> = match expr {
            IrExpr::Bool(value) => self
                .context
                .bool_type()
                .const_int(u64::from(*value), false)
                .into(),
            IrExpr::Integer { ty, value } => self
                .basic_type(ty)?
                .into_int_type()
                .const_int(*value as u64, false)
                .into(),
            IrExpr::Float { ty, value } => self
                .basic_type(ty)?
                .into_float_type()
                .const_float(*value)
                .into(),
            IrExpr::Var(var) => {
                let name = &self.ir.variable(*var).name;
                self.builder
                    .build_load(self.slot(*var)?, name)
                    .map_err(llvm_error)?
            }
            IrExpr::FunctionRef(function) => self
                .function_value(*function)?
                .as_global_value()
                .as_pointer_value()
                .into(),
            IrExpr::Unary { op, operand } => self.emit_unary(*op, operand)?,
            IrExpr::Binary { op, lhs, rhs } => self.emit_binary(*op, lhs, rhs)?,
            IrExpr::Call { callee, args } => return self.emit_call(callee, args),
            IrExpr::ArrayConstructor { ty, indexes, values } => {
                let slot = self
                    .builder
                    .build_alloca(self.basic_type(ty)?, "array")
                    .map_err(llvm_error)?;
                for (index, value) in indexes.iter().zip(values) {
                    let value = self.emit_value(value)?;
                    let index = self.context.i32_type().const_int(*index, false);
                    let element = self.element_pointer(slot, index)?;
                    self.builder.build_store(element, value).map_err(llvm_error)?;
                }
                self.builder.build_load(slot, "").map_err(llvm_error)?
            }
            IrExpr::Index { .. } => {
                let element = self.place(expr)?;
                self.builder.build_load(element, "").map_err(llvm_error)?
            }
            IrExpr::Constructor { ty, values } => {
                let slot = self
                    .builder
                    .build_alloca(self.basic_type(ty)?, "struct")
                    .map_err(llvm_error)?;
                for (index, value) in values.iter().enumerate() {
                    let value = self.emit_value(value)?;
                    let field = self
                        .builder
                        .build_struct_gep(slot, index as u32, "")
                        .map_err(llvm_error)?;
                    self.builder.build_store(field, value).map_err(llvm_error)?;
                }
                self.builder.build_load(slot, "").map_err(llvm_error)?
            }
        };
        Ok(Some(value))
    }

    fn emit_call(
        &mut self,
        callee: &IrExpr,
        args: &[IrExpr],
    ) -> Result<Option<BasicValueEnum<'ctx>>, BackendError> {
        let IrExpr::FunctionRef(id) = callee else {
            return Err(BackendError::Llvm(format!(
                "cannot call {}",
                self.ir.render_expr(callee)
            )));
        };
        let function = self.function_value(*id)?;

        let mut values: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.emit_value(arg)?.into());
        }
        let call = self
            .builder
            .build_call(function, &values, "")
            .map_err(llvm_error)?;
        Ok(call.try_as_basic_value().left())
    }

    fn emit_unary(
        &mut self,
        op: Operator,
        operand: &IrExpr,
    ) -> Result<BasicValueEnum<'ctx>, BackendError> {
        let is_float = self.ir.type_of(operand).is_some_and(|ty| ty.is_float());
        let value = self.emit_value(operand)?;
        let result: BasicValueEnum = match (op, is_float) {
            (Operator::Minus, true) => self
                .builder
                .build_float_neg(value.into_float_value(), "")
                .map_err(llvm_error)?
                .into(),
            (Operator::Minus, false) => self
                .builder
                .build_int_neg(value.into_int_value(), "")
                .map_err(llvm_error)?
                .into(),
            (Operator::Not, _) => self
                .builder
                .build_not(value.into_int_value(), "")
                .map_err(llvm_error)?
                .into(),
            (other, _) => {
                return Err(BackendError::Llvm(format!(
                    "{} is not a unary operator",
                    other
                )))
            }
        };
        Ok(result)
    }

    fn emit_binary(
        &mut self,
        op: Operator,
        lhs: &IrExpr,
        rhs: &IrExpr,
    ) -> Result<BasicValueEnum<'ctx>, BackendError> {
        if matches!(op, Operator::AndAnd | Operator::OrOr) {
            return self.emit_lazy(op, lhs, rhs);
        }

        let operand_type = self.ir.type_of(lhs);
        let is_float = operand_type.as_ref().is_some_and(|ty| ty.is_float());
        let is_unsigned = operand_type.as_ref().is_some_and(|ty| ty.is_unsigned());

        let lhs = self.emit_value(lhs)?;
        let rhs = self.emit_value(rhs)?;
        if is_float {
            self.emit_float_binary(op, lhs, rhs)
        } else {
            self.emit_int_binary(op, lhs.into_int_value(), rhs.into_int_value(), is_unsigned)
        }
    }

    fn emit_int_binary(
        &self,
        op: Operator,
        lhs: IntValue<'ctx>,
        rhs: IntValue<'ctx>,
        is_unsigned: bool,
    ) -> Result<BasicValueEnum<'ctx>, BackendError> {
        let builder = &self.builder;
        let value = match op {
            Operator::Plus => builder.build_int_add(lhs, rhs, ""),
            Operator::Minus => builder.build_int_sub(lhs, rhs, ""),
            Operator::Mult => builder.build_int_mul(lhs, rhs, ""),
            Operator::Div if is_unsigned => builder.build_int_unsigned_div(lhs, rhs, ""),
            Operator::Div => builder.build_int_signed_div(lhs, rhs, ""),
            Operator::Mod if is_unsigned => builder.build_int_unsigned_rem(lhs, rhs, ""),
            Operator::Mod => builder.build_int_signed_rem(lhs, rhs, ""),
            Operator::BitAnd => builder.build_and(lhs, rhs, ""),
            Operator::BitOr => builder.build_or(lhs, rhs, ""),
            Operator::BitXor => builder.build_xor(lhs, rhs, ""),
            Operator::LeftShift => builder.build_left_shift(lhs, rhs, ""),
            Operator::RightShift => builder.build_right_shift(lhs, rhs, !is_unsigned, ""),
            comparison => {
                let predicate = match (comparison, is_unsigned) {
                    (Operator::Equal, _) => IntPredicate::EQ,
                    (Operator::NotEqual, _) => IntPredicate::NE,
                    (Operator::Greater, false) => IntPredicate::SGT,
                    (Operator::Greater, true) => IntPredicate::UGT,
                    (Operator::Less, false) => IntPredicate::SLT,
                    (Operator::Less, true) => IntPredicate::ULT,
                    (Operator::GreaterOrEqual, false) => IntPredicate::SGE,
                    (Operator::GreaterOrEqual, true) => IntPredicate::UGE,
                    (Operator::LessOrEqual, false) => IntPredicate::SLE,
                    (Operator::LessOrEqual, true) => IntPredicate::ULE,
                    (other, _) => {
                        return Err(BackendError::Llvm(format!(
                            "{} is not an integer operator",
                            other
                        )))
                    }
                };
                builder.build_int_compare(predicate, lhs, rhs, "")
            }
        };
        Ok(value.map_err(llvm_error)?.into())
    }

    fn emit_float_binary(
        &self,
        op: Operator,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>, BackendError> {
        let (lhs, rhs) = (lhs.into_float_value(), rhs.into_float_value());
        let builder = &self.builder;
        let value = match op {
            Operator::Plus => builder.build_float_add(lhs, rhs, ""),
            Operator::Minus => builder.build_float_sub(lhs, rhs, ""),
            Operator::Mult => builder.build_float_mul(lhs, rhs, ""),
            Operator::Div => builder.build_float_div(lhs, rhs, ""),
            Operator::Mod => builder.build_float_rem(lhs, rhs, ""),
            comparison => {
                let predicate = match comparison {
                    Operator::Equal => FloatPredicate::OEQ,
                    Operator::NotEqual => FloatPredicate::UNE,
                    Operator::Greater => FloatPredicate::OGT,
                    Operator::Less => FloatPredicate::OLT,
                    Operator::GreaterOrEqual => FloatPredicate::OGE,
                    Operator::LessOrEqual => FloatPredicate::OLE,
                    other => {
                        return Err(BackendError::Llvm(format!(
                            "{} is not a float operator",
                            other
                        )))
                    }
                };
                let compared = builder
                    .build_float_compare(predicate, lhs, rhs, "")
                    .map_err(llvm_error)?;
                return Ok(compared.into());
            }
        };
        Ok(value.map_err(llvm_error)?.into())
    }

    /// `&&` and `||` only evaluate the right operand when it decides the result.
    fn emit_lazy(
        &mut self,
        op: Operator,
        lhs: &IrExpr,
        rhs: &IrExpr,
    ) -> Result<BasicValueEnum<'ctx>, BackendError> {
        let lhs = self.emit_value(lhs)?.into_int_value();
        let lhs_end = self
            .builder
            .get_insert_block()
            .ok_or_else(|| BackendError::Llvm(String::from("builder is not positioned")))?;
        let rhs_bb = self.append_block("rhs")?;
        let merge_bb = self.append_block("lazy_merge")?;

        let branch = if op == Operator::AndAnd {
            self.builder.build_conditional_branch(lhs, rhs_bb, merge_bb)
        } else {
            self.builder.build_conditional_branch(lhs, merge_bb, rhs_bb)
        };
        branch.map_err(llvm_error)?;

        self.builder.position_at_end(rhs_bb);
        let rhs = self.emit_value(rhs)?.into_int_value();
        let rhs_end = self
            .builder
            .get_insert_block()
            .ok_or_else(|| BackendError::Llvm(String::from("builder is not positioned")))?;
        self.builder
            .build_unconditional_branch(merge_bb)
            .map_err(llvm_error)?;

        self.builder.position_at_end(merge_bb);
        let phi = self
            .builder
            .build_phi(self.context.bool_type(), "")
            .map_err(llvm_error)?;
        phi.add_incoming(&[(&lhs, lhs_end), (&rhs, rhs_end)]);
        Ok(phi.as_basic_value())
    }
}
