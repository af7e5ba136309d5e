//! Type resolution pass state and item-level resolution.

use crate::{
    ast::{
        ast::{Crate, Item, Pattern},
        expressions::{Expr, LiteralKind},
        literals::parse_integer,
        statements::{FnSignature, Function, Local, StructStruct},
        types::{PrimitiveType, Ty, Type},
    },
    errors::{
        diagnostics::{DiagnosticSink, Handler, Reported, Severity},
        errors::ErrorImpl,
    },
    scope::scope::ScopeStack,
    Span,
};

use super::{stmt::resolve_statements, toplevel::TopLevelScan};

/// What a name in the variable table is bound to.
#[derive(Debug, Clone)]
pub struct Binding {
    pub ty: Ty,
    pub kind: BindingKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Parameter,
    Local,
}

/// The function whose body is being resolved.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub name: String,
    /// `None` for functions without a return type.
    pub return_type: Option<Ty>,
}

pub type ResolutionScope = ScopeStack<Ty, FnSignature, StructStruct, Binding>;

/// State of one type resolution run.
///
/// Resolution annotates the crate in place:
/// - `LetStmt::inferred_type` and `LetStmt::slots`
/// - `ArrayExpr::inferred_type`
/// - `CallExpr::callee_decl`
/// - `Function::locals` and `BlockExpr::locals`
/// - `Crate::resolved`
pub struct TypeResolution<'a> {
    /// Builtin layer, crate layer, then one layer per open function or block
    pub scope: ResolutionScope,
    /// Innermost function last
    pub functions: Vec<FunctionContext>,
    /// Crate-wide function index consulted for callees not bound in scope
    pub toplevel: &'a dyn TopLevelScan,
    pub handler: Handler<'a>,
}

impl<'a> TypeResolution<'a> {
    pub fn new(toplevel: &'a dyn TopLevelScan, sink: &'a mut dyn DiagnosticSink) -> Self {
        TypeResolution {
            scope: ScopeStack::new(),
            functions: Vec::new(),
            toplevel,
            handler: Handler::new(sink, "resolve"),
        }
    }

    /// Resolves every item of `krate`, continuing past errors. Returns true
    /// when no error was recorded, which is also stored in `krate.resolved`.
    pub fn run(&mut self, krate: &mut Crate) -> bool {
        log::debug!("type resolution started: {} items", krate.items.len());

        self.scope.push();
        for primitive in PrimitiveType::ALL {
            self.scope
                .insert_type(primitive.name(), Ty::Primitive(primitive));
        }
        self.scope.push();

        for item in krate.items.iter_mut() {
            // Failures are already reported; the next item is independent.
            let _ = resolve_item(self, item);
        }

        self.scope.pop();
        self.scope.pop();

        krate.resolved = !self.handler.saw_errors();
        log::debug!(
            "type resolution finished with {} errors",
            self.handler.error_count()
        );
        krate.resolved
    }

    pub fn resolve_type(&mut self, ty: &Type) -> Result<Ty, Reported> {
        self.resolve_type_as(ty, Severity::Error)
    }

    /// Resolves a type annotation, reporting failures with `severity`.
    pub fn resolve_type_as(&mut self, ty: &Type, severity: Severity) -> Result<Ty, Reported> {
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
                match self.scope.lookup_type(&name).cloned() {
                    Some(ty) => Ok(ty),
                    None => Err(self.handler.report(
                        severity,
                        ErrorImpl::UnknownType { name },
                        &path.span,
                    )),
                }
            }
            Type::Array(array) => {
                let element = self.resolve_type_as(&array.element, severity)?;
                let Some(length) = const_length(&array.size) else {
                    return Err(self.handler.report(
                        severity,
                        ErrorImpl::InvalidArrayLength,
                        array.size.get_span(),
                    ));
                };
                Ok(Ty::Array(Box::new(element), length))
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

    /// Reports `E0308` unless `found` is compatible with `expected`.
    pub fn check_compatible(
        &mut self,
        expected: &Ty,
        found: &Ty,
        span: &Span,
    ) -> Result<(), Reported> {
        if expected.is_compatible_with(found) {
            return Ok(());
        }
        Err(self.handler.error(
            ErrorImpl::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
            span,
        ))
    }

    /// Binds a `let` name in the innermost layer and returns its position in
    /// that layer's locals list.
    pub fn declare_local(&mut self, name: &str, ty: Ty, span: &Span) -> usize {
        let slot = self
            .scope
            .peek_declared()
            .iter()
            .filter(|(_, binding)| binding.kind == BindingKind::Local)
            .count();
        self.scope.insert_var(
            name,
            Binding {
                ty,
                kind: BindingKind::Local,
                span: span.clone(),
            },
        );
        slot
    }

    /// Closes the innermost layer and returns the locals declared in it.
    pub fn pop_locals(&mut self) -> Vec<Local> {
        let Some(layer) = self.scope.pop() else {
            return Vec::new();
        };
        layer
            .into_declared()
            .into_iter()
            .filter(|(_, binding)| binding.kind == BindingKind::Local)
            .map(|(name, binding)| Local {
                name,
                ty: binding.ty,
                span: binding.span,
            })
            .collect()
    }

    pub fn current_function(&self) -> Option<&FunctionContext> {
        self.functions.last()
    }
}

/// Runs type resolution over `krate`.
pub fn resolve(
    krate: &mut Crate,
    toplevel: &dyn TopLevelScan,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    TypeResolution::new(toplevel, sink).run(krate)
}

/// Largest array length either pass accepts. Array values are lowered to one
/// constructor entry per element.
pub const MAX_ARRAY_LENGTH: usize = 1 << 16;

/// Array lengths must be plain integer literals no larger than
/// [`MAX_ARRAY_LENGTH`].
pub fn const_length(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Literal(literal) if literal.kind == LiteralKind::Int => parse_integer(&literal.value)
            .and_then(|value| usize::try_from(value).ok())
            .filter(|length| *length <= MAX_ARRAY_LENGTH),
        Expr::Grouped(grouped) => const_length(&grouped.inner),
        _ => None,
    }
}

pub fn resolve_item(resolver: &mut TypeResolution, item: &mut Item) -> Result<(), Reported> {
    match item {
        Item::Function(function) => resolve_function(resolver, function),
        Item::Struct(strukt) => resolve_struct(resolver, strukt),
        Item::Unsupported(unsupported) => {
            log::warn!("skipping {} `{}`", unsupported.kind, unsupported.name);
            Ok(())
        }
    }
}

fn resolve_function(
    resolver: &mut TypeResolution,
    function: &mut Function,
) -> Result<(), Reported> {
    log::trace!("resolving function `{}`", function.name);

    // Registered first so the body can call itself.
    resolver
        .scope
        .insert_function(&function.name, function.signature());
    resolver.scope.push();

    let return_type = match resolve_signature(resolver, function) {
        Ok(return_type) => return_type,
        Err(reported) => {
            resolver.scope.pop();
            return Err(reported);
        }
    };

    resolver.functions.push(FunctionContext {
        name: function.name.clone(),
        return_type,
    });
    let result = resolve_statements(resolver, &mut function.body.statements);
    resolver.functions.pop();

    function.locals = resolver.pop_locals();
    result
}

/// Binds the parameters in the function's layer and resolves the return type.
fn resolve_signature(
    resolver: &mut TypeResolution,
    function: &Function,
) -> Result<Option<Ty>, Reported> {
    for param in &function.params {
        let ty = resolver.resolve_type(&param.ty)?;
        match &param.pattern {
            Pattern::Identifier(identifier) => resolver.scope.insert_var(
                &identifier.name,
                Binding {
                    ty,
                    kind: BindingKind::Parameter,
                    span: identifier.span.clone(),
                },
            ),
            Pattern::Wildcard(_) => {}
            Pattern::Unsupported(unsupported) => {
                return Err(resolver.handler.error(
                    ErrorImpl::UnsupportedPattern {
                        what: format!("{} in parameter", unsupported.kind),
                    },
                    &unsupported.span,
                ))
            }
        }
    }

    function
        .return_type
        .as_ref()
        .map(|return_type| resolver.resolve_type(return_type))
        .transpose()
}

fn resolve_struct(resolver: &mut TypeResolution, strukt: &StructStruct) -> Result<(), Reported> {
    log::trace!("resolving struct `{}`", strukt.name);

    // Fields may only refer to types declared before this struct.
    for field in &strukt.fields {
        resolver.resolve_type_as(&field.ty, Severity::Fatal)?;
    }

    resolver
        .scope
        .insert_type(&strukt.name, Ty::Struct(strukt.name.clone()));
    resolver.scope.insert_struct(&strukt.name, strukt.clone());
    Ok(())
}
