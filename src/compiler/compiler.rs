//! Main lowering module.
//!
//! This module contains the [`Compilation`] state and lowers items of a
//! resolved crate into calls on a [`Backend`]. Expressions and statements are
//! handled by [`gen_expression`](super::expr::gen_expression) and
//! [`gen_statement`](super::stmt::gen_statement).

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{Crate, Item, Pattern},
        statements::{FnSignature, Function, Local, StructStruct},
        types::{PrimitiveType, Ty, Type},
    },
    backend::{Backend, BackendError, TypedIdentifier},
    errors::{
        diagnostics::{DiagnosticSink, Handler, Reported, Severity},
        errors::ErrorImpl,
    },
    scope::scope::ScopeStack,
    type_checker::type_checker::const_length,
    Span,
};

use super::stmt::gen_statements;

/// The function whose body is being lowered.
#[derive(Debug, Clone)]
pub struct FunctionContext<B: Backend> {
    pub name: String,
    pub function: B::Function,
    pub return_type: Option<B::Type>,
    /// Hidden temporary holding the result of a non-void function
    pub return_slot: Option<B::Variable>,
}

pub type CompilationScope<B> = ScopeStack<
    <B as Backend>::Type,
    <B as Backend>::Function,
    StructStruct,
    <B as Backend>::Variable,
>;

/// The state of one lowering run.
///
/// This structure tracks:
/// - The backend that receives every type, expression and statement
/// - Names bound to backend handles, layered like the source scopes
/// - The open blocks and functions statements are appended to
/// - The declarations handed to whole-program emission
pub struct Compilation<'a, B: Backend> {
    /// The backend being driven
    pub backend: &'a mut B,
    /// Builtin layer, crate layer, then one layer per open function or block
    pub scope: CompilationScope<B>,
    /// Open blocks, innermost last
    pub blocks: Vec<B::Block>,
    /// Open functions, innermost last
    pub functions: Vec<FunctionContext<B>>,
    /// Backend variables for the locals of each open function or block,
    /// indexed by `LetStmt::slots`
    pub locals: Vec<Vec<B::Variable>>,
    /// Functions declared at a call site before their definition was reached
    pub forward_decls: HashMap<String, B::Function>,

    pub type_decls: Vec<B::Type>,
    pub const_decls: Vec<B::Expression>,
    pub func_decls: Vec<B::Function>,
    pub var_decls: Vec<B::Variable>,

    pub handler: Handler<'a>,
}

impl<'a, B: Backend> Compilation<'a, B> {
    pub fn new(backend: &'a mut B, sink: &'a mut dyn DiagnosticSink) -> Self {
        Compilation {
            backend,
            scope: ScopeStack::new(),
            blocks: Vec::new(),
            functions: Vec::new(),
            locals: Vec::new(),
            forward_decls: HashMap::new(),
            type_decls: Vec::new(),
            const_decls: Vec::new(),
            func_decls: Vec::new(),
            var_decls: Vec::new(),
            handler: Handler::new(sink, "compile"),
        }
    }

    /// Lowers every item of `krate` and, when nothing failed and `emit` is
    /// set, hands the collected declarations to the backend.
    pub fn run(&mut self, krate: &Crate, emit: bool) -> bool {
        log::debug!("lowering started: {} items", krate.items.len());

        self.scope.push();
        self.register_primitives();
        self.scope.push();

        for item in krate.items.iter() {
            // Failures are already reported; the next item is independent.
            let _ = compile_item(self, item);
        }

        self.scope.pop();
        self.scope.pop();

        if self.handler.saw_errors() {
            log::debug!(
                "lowering finished with {} errors, nothing emitted",
                self.handler.error_count()
            );
            return false;
        }
        if emit {
            return self.emit_program();
        }
        true
    }

    fn register_primitives(&mut self) {
        for primitive in PrimitiveType::ALL {
            let ty = match primitive {
                PrimitiveType::Bool => self.backend.bool_type(),
                PrimitiveType::F32 | PrimitiveType::F64 => {
                    self.backend.float_type(primitive.bit_width().unwrap_or(32))
                }
                PrimitiveType::Char => {
                    let code_point = self.backend.integer_type(true, 32);
                    self.backend
                        .named_type("char", code_point, &Span::predeclared())
                }
                // Strings have no runtime representation.
                PrimitiveType::Str => continue,
                integer => self
                    .backend
                    .integer_type(!integer.is_signed(), integer.bit_width().unwrap_or(32)),
            };
            self.scope.insert_type(primitive.name(), ty);
        }
    }

    fn emit_program(&mut self) -> bool {
        let types = std::mem::take(&mut self.type_decls);
        let constants = std::mem::take(&mut self.const_decls);
        let functions = std::mem::take(&mut self.func_decls);
        let variables = std::mem::take(&mut self.var_decls);

        match self
            .backend
            .write_global_definitions(types, constants, functions, variables)
        {
            Ok(()) => true,
            Err(error) => {
                self.backend_error(error, &Span::null());
                false
            }
        }
    }

    pub fn backend_error(&mut self, error: BackendError, span: &Span) -> Reported {
        self.handler.error(ErrorImpl::Backend(error), span)
    }

    pub fn lower_type(&mut self, ty: &Type) -> Result<B::Type, Reported> {
        self.lower_type_as(ty, Severity::Error)
    }

    /// Lowers a type annotation to its backend type.
    pub fn lower_type_as(&mut self, ty: &Type, severity: Severity) -> Result<B::Type, Reported> {
        match ty {
            Type::Path(path) => {
                if !path.is_single_segment() {
                    return Err(self.handler.report(
                        severity,
                        ErrorImpl::MultiSegmentPath {
                            path: path.as_string(),
                        },
                        &path.span,
                    ));
                }
                let name = path.as_string();
                match self.scope.lookup_type(&name) {
                    Some(ty) => Ok(ty.clone()),
                    None => Err(self.handler.report(
                        severity,
                        ErrorImpl::UnknownType { name },
                        &path.span,
                    )),
                }
            }
            Type::Array(array) => {
                let element = self.lower_type_as(&array.element, severity)?;
                let Some(length) = const_length(&array.size) else {
                    return Err(self.handler.report(
                        severity,
                        ErrorImpl::InvalidArrayLength,
                        array.size.get_span(),
                    ));
                };
                Ok(self.backend.array_type(element, length as u64))
            }
            Type::Unsupported(unsupported) => Err(self.handler.report(
                severity,
                ErrorImpl::UnsupportedType {
                    what: unsupported.kind.to_string(),
                },
                &unsupported.span,
            )),
        }
    }

    /// Lowers a type computed by type resolution.
    pub fn lower_ty(&mut self, ty: &Ty, span: &Span) -> Result<B::Type, Reported> {
        let name = match ty {
            Ty::Primitive(primitive) => primitive.name().to_string(),
            Ty::Struct(name) => name.clone(),
            Ty::Array(element, length) => {
                let element = self.lower_ty(element, span)?;
                return Ok(self.backend.array_type(element, *length as u64));
            }
            Ty::Unit => {
                return Err(self.handler.error(
                    ErrorImpl::UnsupportedType {
                        what: ty.to_string(),
                    },
                    span,
                ))
            }
        };

        match self.scope.lookup_type(&name) {
            Some(ty) => Ok(ty.clone()),
            None => Err(self
                .handler
                .error(ErrorImpl::UnsupportedType { what: name }, span)),
        }
    }

    pub fn current_function(&mut self) -> Result<B::Function, Reported> {
        match self.functions.last() {
            Some(context) => Ok(context.function.clone()),
            None => Err(self.handler.fatal(
                ErrorImpl::LoweringFailed {
                    what: String::from("statement outside of a function"),
                },
                &Span::null(),
            )),
        }
    }

    /// A function bound in scope or declared from an earlier call site.
    pub fn lookup_function(&self, name: &str) -> Option<B::Function> {
        self.scope
            .lookup_function(name)
            .or_else(|| self.forward_decls.get(name))
            .cloned()
    }

    /// Creates a backend variable for every local of the block being opened.
    pub fn materialize_locals(
        &mut self,
        function: &B::Function,
        locals: &[Local],
    ) -> Result<Vec<B::Variable>, Reported> {
        let mut vars = Vec::with_capacity(locals.len());
        for local in locals {
            let ty = self.lower_ty(&local.ty, &local.span)?;
            vars.push(
                self.backend
                    .local_variable(function, &local.name, &ty, false, &local.span),
            );
        }
        Ok(vars)
    }

    /// Opens a block nested in the current one.
    pub fn push_block(
        &mut self,
        vars: Vec<B::Variable>,
        span: &Span,
    ) -> Result<B::Block, Reported> {
        let function = self.current_function()?;
        let block = self
            .backend
            .block(&function, self.blocks.last(), vars, span, span);
        self.blocks.push(block.clone());
        Ok(block)
    }

    pub fn pop_block(&mut self) -> Option<B::Block> {
        self.blocks.pop()
    }

    /// Appends a statement to the innermost open block.
    pub fn add_statement(&mut self, statement: B::Statement) {
        match self.blocks.last() {
            Some(block) => self.backend.block_add_statements(block, vec![statement]),
            None => log::warn!("dropping statement compiled outside of a block"),
        }
    }

    /// Declares a function from its signature without compiling a body. Used
    /// for calls that precede the callee's definition.
    pub fn declare_function(&mut self, signature: &FnSignature) -> Result<B::Function, Reported> {
        let mut params = Vec::with_capacity(signature.params.len());
        for (index, ty) in signature.params.iter().enumerate() {
            let lowered = self.lower_type(ty)?;
            params.push(TypedIdentifier::new(
                &format!("arg{}", index),
                lowered,
                ty.get_span().clone(),
            ));
        }
        let result = signature
            .return_type
            .as_ref()
            .map(|ty| self.lower_type(ty))
            .transpose()?;

        let fntype = self
            .backend
            .function_type(&params, result, &signature.span);
        let function = self
            .backend
            .function(&fntype, &signature.name, &signature.span);
        log::trace!("forward declared function `{}`", signature.name);
        self.forward_decls
            .insert(signature.name.clone(), function.clone());
        Ok(function)
    }
}

/// Lowers a resolved crate through `backend`.
///
/// Refuses crates that type resolution did not accept. Returns true when no
/// error was recorded; emission only happens in that case and when `emit`
/// is set.
pub fn compile<B: Backend>(
    krate: &Crate,
    backend: &mut B,
    sink: &mut dyn DiagnosticSink,
    emit: bool,
) -> bool {
    let mut compilation = Compilation::new(backend, sink);
    if !krate.resolved {
        compilation
            .handler
            .fatal(ErrorImpl::UnresolvedCrate, &Span::null());
        return false;
    }
    compilation.run(krate, emit)
}

pub fn compile_item<B: Backend>(
    compiler: &mut Compilation<B>,
    item: &Item,
) -> Result<(), Reported> {
    match item {
        Item::Function(function) => compile_function(compiler, function),
        Item::Struct(strukt) => compile_struct(compiler, strukt),
        Item::Unsupported(unsupported) => {
            log::warn!("skipping {} `{}`", unsupported.kind, unsupported.name);
            Ok(())
        }
    }
}

fn compile_struct<B: Backend>(
    compiler: &mut Compilation<B>,
    strukt: &StructStruct,
) -> Result<(), Reported> {
    log::trace!("lowering struct `{}`", strukt.name);

    let mut fields = Vec::with_capacity(strukt.fields.len());
    for field in &strukt.fields {
        let ty = compiler.lower_type_as(&field.ty, Severity::Fatal)?;
        fields.push(TypedIdentifier::new(&field.name, ty, field.span.clone()));
    }

    let placeholder = compiler
        .backend
        .placeholder_struct_type(&strukt.name, &strukt.span);
    if let Err(error) = compiler
        .backend
        .set_placeholder_struct_type(&placeholder, fields)
    {
        return Err(compiler.backend_error(error, &strukt.span));
    }

    compiler
        .scope
        .insert_type(&strukt.name, placeholder.clone());
    compiler.scope.insert_struct(&strukt.name, strukt.clone());
    compiler.type_decls.push(placeholder);
    Ok(())
}

fn compile_function<B: Backend>(
    compiler: &mut Compilation<B>,
    function: &Function,
) -> Result<(), Reported> {
    log::trace!("lowering function `{}`", function.name);

    let mut params = Vec::with_capacity(function.params.len());
    for param in &function.params {
        let ty = compiler.lower_type(&param.ty)?;
        let name = match &param.pattern {
            Pattern::Identifier(identifier) => identifier.name.clone(),
            Pattern::Wildcard(_) => String::from("_"),
            Pattern::Unsupported(unsupported) => {
                return Err(compiler.handler.error(
                    ErrorImpl::UnsupportedPattern {
                        what: format!("{} in parameter", unsupported.kind),
                    },
                    &unsupported.span,
                ))
            }
        };
        params.push(TypedIdentifier::new(&name, ty, param.span.clone()));
    }
    let return_type = function
        .return_type
        .as_ref()
        .map(|ty| compiler.lower_type(ty))
        .transpose()?;

    let handle = match compiler.forward_decls.remove(&function.name) {
        Some(declared) => declared,
        None => {
            let fntype =
                compiler
                    .backend
                    .function_type(&params, return_type.clone(), &function.span);
            compiler
                .backend
                .function(&fntype, &function.name, &function.span)
        }
    };

    // Registered before the body so it can call itself.
    compiler
        .scope
        .insert_function(&function.name, handle.clone());
    compiler.scope.push();
    let result = compile_function_body(compiler, function, &handle, params, return_type);
    compiler.scope.pop();
    result?;

    compiler.func_decls.push(handle);
    Ok(())
}

fn compile_function_body<B: Backend>(
    compiler: &mut Compilation<B>,
    function: &Function,
    handle: &B::Function,
    params: Vec<TypedIdentifier<B::Type>>,
    return_type: Option<B::Type>,
) -> Result<(), Reported> {
    let mut param_vars = Vec::with_capacity(params.len());
    for param in &params {
        let var = compiler
            .backend
            .parameter_variable(handle, &param.name, &param.ty, &param.span);
        if param.name != "_" {
            compiler.scope.insert_var(&param.name, var.clone());
        }
        param_vars.push(var);
    }
    if let Err(error) = compiler
        .backend
        .function_set_parameters(handle, param_vars)
    {
        return Err(compiler.backend_error(error, &function.span));
    }

    let locals = compiler.materialize_locals(handle, &function.locals)?;

    compiler.functions.push(FunctionContext {
        name: function.name.clone(),
        function: handle.clone(),
        return_type: return_type.clone(),
        return_slot: None,
    });
    let result = compile_outer_block(compiler, function, handle, locals, return_type);
    compiler.functions.pop();

    let block = result?;
    let body = compiler.backend.block_statement(&block);
    compiler
        .backend
        .function_set_body(handle, body)
        .map_err(|error| compiler.backend_error(error, &function.span))
}

fn compile_outer_block<B: Backend>(
    compiler: &mut Compilation<B>,
    function: &Function,
    handle: &B::Function,
    locals: Vec<B::Variable>,
    return_type: Option<B::Type>,
) -> Result<B::Block, Reported> {
    let block = compiler.push_block(locals.clone(), &function.body.span)?;

    if let Some(ty) = return_type {
        let (slot, declaration) =
            compiler
                .backend
                .temporary_variable(handle, &block, &ty, None, &function.span);
        compiler.add_statement(declaration);
        if let Some(context) = compiler.functions.last_mut() {
            context.return_slot = Some(slot);
        }
    }

    compiler.locals.push(locals);
    let result = gen_statements(compiler, &function.body.statements);
    compiler.locals.pop();
    compiler.pop_block();

    result.map(|_| block)
}
