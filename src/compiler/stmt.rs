use crate::{
    ast::{
        ast::Pattern,
        expressions::{BlockExpr, ElseBranch, IfExpr},
        statements::{LetStmt, Stmt},
    },
    backend::Backend,
    errors::{diagnostics::Reported, errors::ErrorImpl},
};

use super::{
    compiler::Compilation,
    expr::{expect_value, gen_expression},
};

/// Lowers statements in order, carrying on past non-fatal failures.
pub fn gen_statements<B: Backend>(
    compiler: &mut Compilation<B>,
    statements: &[Stmt],
) -> Result<(), Reported> {
    for statement in statements {
        if let Err(reported) = gen_statement(compiler, statement) {
            if reported.is_fatal() {
                return Err(reported);
            }
        }
    }
    Ok(())
}

pub fn gen_statement<B: Backend>(
    compiler: &mut Compilation<B>,
    statement: &Stmt,
) -> Result<(), Reported> {
    match statement {
        Stmt::Let(let_stmt) => gen_let(compiler, let_stmt),
        Stmt::Expr(stmt) | Stmt::ExprWithBlock(stmt) => {
            if let Some(value) = gen_expression(compiler, &stmt.expr)? {
                let function = compiler.current_function()?;
                let statement = compiler.backend.expression_statement(&function, value);
                compiler.add_statement(statement);
            }
            Ok(())
        }
        Stmt::Empty(_) => Ok(()),
    }
}

fn gen_let<B: Backend>(compiler: &mut Compilation<B>, let_stmt: &LetStmt) -> Result<(), Reported> {
    // The initializer sees the bindings from before this statement.
    let value = match &let_stmt.init {
        Some(init) => Some(expect_value(compiler, init, "init expression")?),
        None => None,
    };
    let function = compiler.current_function()?;

    match &let_stmt.pattern {
        Pattern::Identifier(identifier) => {
            let var = let_stmt.slots.first().and_then(|slot| {
                compiler
                    .locals
                    .last()
                    .and_then(|frame| frame.get(*slot))
                    .cloned()
            });
            let Some(var) = var else {
                return Err(compiler.handler.error(
                    ErrorImpl::LoweringFailed {
                        what: format!("local `{}`", identifier.name),
                    },
                    &identifier.span,
                ));
            };

            compiler.scope.insert_var(&identifier.name, var.clone());
            if let Some(value) = value {
                let statement = compiler.backend.init_statement(&function, &var, value);
                compiler.add_statement(statement);
            }
            Ok(())
        }
        Pattern::Wildcard(_) => {
            if let Some(value) = value {
                let statement = compiler.backend.expression_statement(&function, value);
                compiler.add_statement(statement);
            }
            Ok(())
        }
        Pattern::Unsupported(unsupported) => Err(compiler.handler.error(
            ErrorImpl::UnsupportedPattern {
                what: unsupported.kind.to_string(),
            },
            &unsupported.span,
        )),
    }
}

/// Opens a nested block, lowers its statements into it and leaves it open.
/// The caller pops it once it has decided how the block is used.
pub fn compile_block<B: Backend>(
    compiler: &mut Compilation<B>,
    block: &BlockExpr,
) -> Result<B::Block, Reported> {
    let function = compiler.current_function()?;
    let vars = compiler.materialize_locals(&function, &block.locals)?;
    let handle = compiler.push_block(vars.clone(), &block.span)?;

    compiler.scope.push();
    compiler.locals.push(vars);
    let result = gen_statements(compiler, &block.statements);
    compiler.locals.pop();
    compiler.scope.pop();

    if let Err(reported) = result {
        compiler.pop_block();
        return Err(reported);
    }
    Ok(handle)
}

/// Lowers one level of an if chain to a conditional statement. A chained
/// `else if` becomes the only statement of a wrapper else block.
pub fn gen_if<B: Backend>(
    compiler: &mut Compilation<B>,
    if_expr: &IfExpr,
) -> Result<B::Statement, Reported> {
    let condition = expect_value(compiler, &if_expr.condition, "if condition")?;

    let then_block = compile_block(compiler, &if_expr.then_block)?;
    compiler.pop_block();

    let else_block = match &if_expr.else_branch {
        None => None,
        Some(ElseBranch::Block(block)) => {
            let else_block = compile_block(compiler, block)?;
            compiler.pop_block();
            Some(else_block)
        }
        Some(ElseBranch::If(nested)) => {
            let wrapper = compiler.push_block(Vec::new(), &nested.span)?;
            let result = gen_if(compiler, nested);
            if let Ok(statement) = &result {
                compiler.add_statement(statement.clone());
            }
            compiler.pop_block();
            result?;
            Some(wrapper)
        }
    };

    let function = compiler.current_function()?;
    Ok(compiler
        .backend
        .if_statement(&function, condition, then_block, else_block, &if_expr.span))
}
