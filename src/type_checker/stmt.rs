use crate::{
    ast::{
        ast::Pattern,
        expressions::BlockExpr,
        statements::{LetStmt, Stmt},
        types::Ty,
    },
    errors::{diagnostics::Reported, errors::ErrorImpl},
};

use super::{expr::infer_type, expr::resolve_expr, type_checker::TypeResolution};

/// Resolves statements in order. Non-fatal failures are already reported and
/// do not stop the following statements.
pub fn resolve_statements(
    resolver: &mut TypeResolution,
    statements: &mut [Stmt],
) -> Result<(), Reported> {
    for stmt in statements.iter_mut() {
        if let Err(reported) = resolve_stmt(resolver, stmt) {
            if reported.is_fatal() {
                return Err(reported);
            }
        }
    }
    Ok(())
}

pub fn resolve_stmt(resolver: &mut TypeResolution, stmt: &mut Stmt) -> Result<(), Reported> {
    match stmt {
        Stmt::Let(let_stmt) => resolve_let(resolver, let_stmt),
        Stmt::Expr(stmt) | Stmt::ExprWithBlock(stmt) => {
            resolve_expr(resolver, &mut stmt.expr).map(|_| ())
        }
        Stmt::Empty(_) => Ok(()),
    }
}

fn resolve_let(resolver: &mut TypeResolution, let_stmt: &mut LetStmt) -> Result<(), Reported> {
    let init_type = match let_stmt.init.as_mut() {
        Some(init) => {
            let ty = infer_type(resolver, init, "type for declaration from init expr")?;
            if ty == Ty::Unit {
                return Err(resolver
                    .handler
                    .error(ErrorImpl::VoidInitializer, init.get_span()));
            }
            Some(ty)
        }
        None => None,
    };

    let ty = match (&let_stmt.ty, init_type) {
        (Some(annotation), init_type) => {
            let declared = resolver.resolve_type(annotation)?;
            if let (Some(found), Some(init)) = (init_type, let_stmt.init.as_ref()) {
                resolver.check_compatible(&declared, &found, init.get_span())?;
            }
            declared
        }
        (None, Some(inferred)) => {
            let_stmt.inferred_type = Some(inferred.clone());
            inferred
        }
        (None, None) => {
            return Err(resolver
                .handler
                .error(ErrorImpl::MissingTypeInformation, &let_stmt.span))
        }
    };

    let_stmt.slots = match &let_stmt.pattern {
        Pattern::Identifier(identifier) => {
            vec![resolver.declare_local(&identifier.name, ty, &identifier.span)]
        }
        Pattern::Wildcard(_) => Vec::new(),
        Pattern::Unsupported(unsupported) => {
            return Err(resolver.handler.error(
                ErrorImpl::UnsupportedPattern {
                    what: unsupported.kind.to_string(),
                },
                &unsupported.span,
            ))
        }
    };
    Ok(())
}

/// Resolves a block in its own layer and records the locals declared in it.
pub fn resolve_block(resolver: &mut TypeResolution, block: &mut BlockExpr) -> Result<(), Reported> {
    resolver.scope.push();
    let result = resolve_statements(resolver, &mut block.statements);
    block.locals = resolver.pop_locals();
    result
}
