//! Text rendering of the reference IR.
//!
//! The format is Rust-like: structs on one line, then one function per
//! paragraph with block variables declared at the top of each block.

use std::fmt::{Display, Write};

use super::ir::{BlockId, FunctionId, IrBackend, IrExpr, IrStmt, IrType};

const INDENT: &str = "    ";

impl IrBackend {
    pub fn render_type(&self, ty: &IrType) -> String {
        match ty {
            IrType::Bool => String::from("bool"),
            IrType::Integer { unsigned, bits } => {
                format!("{}{}", if *unsigned { "u" } else { "i" }, bits)
            }
            IrType::Float { bits } => format!("f{}", bits),
            IrType::Named { name, .. } => name.clone(),
            IrType::Array { element, length } => {
                format!("[{}; {}]", self.render_type(element), length)
            }
            IrType::Struct(id) => self.struct_data(*id).name.clone(),
            IrType::Function { params, result } => {
                let params: Vec<String> = params.iter().map(|ty| self.render_type(ty)).collect();
                match result {
                    Some(result) => {
                        format!("fn({}) -> {}", params.join(", "), self.render_type(result))
                    }
                    None => format!("fn({})", params.join(", ")),
                }
            }
        }
    }

    pub fn render_expr(&self, expr: &IrExpr) -> String {
        match expr {
            IrExpr::Bool(value) => value.to_string(),
            IrExpr::Integer { value, .. } => value.to_string(),
            IrExpr::Float { value, .. } => format!("{:?}", value),
            IrExpr::Var(var) => self.variable(*var).name.clone(),
            IrExpr::FunctionRef(function) => self.function(*function).name.clone(),
            IrExpr::Unary { op, operand } => format!("{}{}", op, self.render_expr(operand)),
            IrExpr::Binary { op, lhs, rhs } => format!(
                "({} {} {})",
                self.render_expr(lhs),
                op,
                self.render_expr(rhs)
            ),
            IrExpr::Call { callee, args } => {
                format!("{}({})", self.render_expr(callee), self.render_list(args))
            }
            IrExpr::ArrayConstructor { values, .. } => format!("[{}]", self.render_list(values)),
            IrExpr::Index { array, index } => {
                format!("{}[{}]", self.render_expr(array), self.render_expr(index))
            }
            IrExpr::Constructor { ty, values } => self.render_constructor(ty, values),
        }
    }

    pub fn render_function(&self, id: FunctionId) -> String {
        let function = self.function(id);
        let params: Vec<String> = function
            .params
            .iter()
            .map(|param| {
                let var = self.variable(*param);
                format!("{}: {}", var.name, self.render_type(&var.ty))
            })
            .collect();

        let mut out = format!("fn {}({})", function.name, params.join(", "));
        if let Some(result) = function.result_type() {
            let _ = write!(out, " -> {}", self.render_type(result));
        }
        match function.body {
            Some(body) => {
                out.push(' ');
                self.render_block(&mut out, body, 0);
            }
            None => out.push(';'),
        }
        out
    }

    fn render_list(&self, exprs: &[IrExpr]) -> String {
        exprs
            .iter()
            .map(|expr| self.render_expr(expr))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_constructor(&self, ty: &IrType, values: &[IrExpr]) -> String {
        let IrType::Struct(id) = ty.underlying() else {
            return format!("{} {{ {} }}", self.render_type(ty), self.render_list(values));
        };
        let data = self.struct_data(*id);
        let fields: Vec<String> = match &data.fields {
            Some(fields) => fields
                .iter()
                .zip(values)
                .map(|(field, value)| format!("{}: {}", field.name, self.render_expr(value)))
                .collect(),
            None => values.iter().map(|value| self.render_expr(value)).collect(),
        };
        format!("{} {{ {} }}", data.name, fields.join(", "))
    }

    fn render_block(&self, out: &mut String, id: BlockId, depth: usize) {
        let block = self.block(id);
        out.push_str("{\n");
        for var in &block.vars {
            let var = self.variable(*var);
            indent(out, depth + 1);
            let _ = writeln!(out, "let {}: {};", var.name, self.render_type(&var.ty));
        }
        for stmt in &block.statements {
            self.render_stmt(out, stmt, depth + 1);
        }
        indent(out, depth);
        out.push('}');
    }

    fn render_stmt(&self, out: &mut String, stmt: &IrStmt, depth: usize) {
        indent(out, depth);
        match stmt {
            IrStmt::Expression(expr) => {
                let _ = writeln!(out, "{};", self.render_expr(expr));
            }
            IrStmt::Init { var, value } => {
                let _ = writeln!(
                    out,
                    "{} = {};",
                    self.variable(*var).name,
                    self.render_expr(value)
                );
            }
            IrStmt::Temporary { var, init } => {
                let data = self.variable(*var);
                let _ = write!(out, "let {}: {}", data.name, self.render_type(&data.ty));
                if let Some(init) = init {
                    let _ = write!(out, " = {}", self.render_expr(init));
                }
                out.push_str(";\n");
            }
            IrStmt::Assign { lhs, rhs } => {
                let _ = writeln!(out, "{} = {};", self.render_expr(lhs), self.render_expr(rhs));
            }
            IrStmt::Return(values) => {
                if values.is_empty() {
                    out.push_str("return;\n");
                } else {
                    let _ = writeln!(out, "return {};", self.render_list(values));
                }
            }
            IrStmt::If {
                condition,
                then_block,
                else_block,
            } => {
                let _ = write!(out, "if {} ", self.render_expr(condition));
                self.render_block(out, *then_block, depth);
                if let Some(else_block) = else_block {
                    out.push_str(" else ");
                    self.render_block(out, *else_block, depth);
                }
                out.push('\n');
            }
            IrStmt::Block(block) => {
                self.render_block(out, *block, depth);
                out.push('\n');
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

impl Display for IrBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(program) = self.program() else {
            return Ok(());
        };

        let mut sections = Vec::new();
        for ty in &program.types {
            let IrType::Struct(id) = ty.underlying() else {
                continue;
            };
            let data = self.struct_data(*id);
            let fields: Vec<String> = data
                .fields
                .iter()
                .flatten()
                .map(|field| format!("{}: {}", field.name, self.render_type(&field.ty)))
                .collect();
            sections.push(format!("struct {} {{ {} }}", data.name, fields.join(", ")));
        }
        for function in &program.functions {
            sections.push(self.render_function(*function));
        }

        write!(f, "{}", sections.join("\n\n"))
    }
}
