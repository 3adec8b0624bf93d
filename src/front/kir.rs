pub mod context;
pub mod expr_kir;
pub mod stmt_kir;

#[cfg(test)]
mod tests;

use crate::front::ast::*;
use crate::front::kir::expr_kir::*;
use crate::front::kir::stmt_kir::*;
use crate::CompilerError;
pub use context::{IrContext, Resolved, Symbol, Value};

pub trait GenerateKir {
    type Output;
    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError>;
}

impl GenerateKir for CompUnit {
    type Output = ();

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        declare_library_functions(ctx);

        // 先注册所有用户函数的签名, 互递归的调用才能解析
        for item in &self.items {
            if let GlobalItem::FuncDef(func) = item {
                if ctx.func_table.contains_key(&func.name) {
                    return Err(ctx.error_at_span(
                        format!("function `{}` is defined more than once", func.name),
                        func.span,
                    ));
                }
                ctx.func_table.insert(func.name.clone(), func.ty);
            }
        }

        // 全局声明先于所有函数体, 后者可以引用前者
        for item in &self.items {
            if let GlobalItem::Decl(decl) = item {
                decl.generate_kir(ctx)?;
            }
        }

        for item in &self.items {
            if let GlobalItem::FuncDef(func) = item {
                ctx.blank();
                func.generate_kir(ctx)?;
            }
        }
        Ok(())
    }
}

/// 声明库函数并注册签名, 只有声明没有函数体, 后端会跳过它们
fn declare_library_functions(ctx: &mut IrContext) {
    let decls: [(&str, &str, DataType); 6] = [
        ("getint", "(): i32", DataType::Int),
        ("getch", "(): i32", DataType::Int),
        ("putint", "(i32)", DataType::Void),
        ("putch", "(i32)", DataType::Void),
        ("starttime", "()", DataType::Void),
        ("stoptime", "()", DataType::Void),
    ];
    for (name, signature, ty) in decls {
        ctx.line(&format!("decl @{}{}", name, signature));
        ctx.func_table.insert(name.to_string(), ty);
    }
}

impl GenerateKir for FuncDef {
    type Output = ();

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        let params_text = self
            .params
            .iter()
            .enumerate()
            .map(|(idx, _)| format!("%arg_{}: i32", idx))
            .collect::<Vec<_>>()
            .join(", ");
        let ret_text = match self.ty {
            DataType::Int => ": i32",
            DataType::Void => "",
        };
        ctx.line(&format!("fun @{}({}){} {{", self.name, params_text, ret_text));
        ctx.label("%entry");

        // 函数体是层级 2, 形参和函数级局部变量都住在这一层
        ctx.enter_scope();
        ctx.reset_function_allocations();

        for (idx, param) in self.params.iter().enumerate() {
            ctx.bind(param.name.clone(), Symbol::Var)?;
            let depth = ctx.depth();
            let slot = format!("@{}_{}", param.name, depth);
            ctx.inst(&format!("{} = alloc i32", slot));
            ctx.inst(&format!("store %arg_{}, {}", idx, slot));
        }

        let mut body_result = Value::unit();
        for item in &self.body {
            match item {
                BlockItem::Decl(decl) => decl.generate_kir(ctx)?,
                BlockItem::Stmt(stmt) => {
                    let result = stmt.generate_kir(ctx)?;
                    if result.diverted() {
                        body_result = result;
                        break;
                    }
                }
            }
        }

        // 函数体没有在所有路径上显式返回时补一个缺省 ret
        if !body_result.diverted() {
            match self.ty {
                DataType::Int => ctx.inst("ret 0"),
                DataType::Void => ctx.inst("ret"),
            }
        }

        ctx.leave_scope()?;
        ctx.line("}");
        Ok(())
    }
}

impl GenerateKir for Decl {
    type Output = ();

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        match self {
            Decl::ConstDecl(decl) => decl.generate_kir(ctx),
            Decl::VarDecl(decl) => decl.generate_kir(ctx),
        }
    }
}

impl GenerateKir for ConstDecl {
    type Output = ();

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        for def in &self.defs {
            // 常量不占存储, 折叠成一个 Const 绑定
            let value = def.init.generate_kir(ctx)?;
            let Some(folded) = value.as_imm() else {
                return Err(ctx.error_at_span(
                    format!("initializer of constant `{}` is not a compile-time constant", def.name),
                    def.span,
                ));
            };
            ctx.bind(def.name.clone(), Symbol::Const(folded))?;
        }
        Ok(())
    }
}

impl GenerateKir for VarDecl {
    type Output = ();

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        let is_global = ctx.is_global();
        for def in &self.defs {
            if is_global {
                let init_text = match &def.init {
                    Some(expr) => {
                        let value = expr.generate_kir(ctx)?;
                        let Some(folded) = value.as_imm() else {
                            return Err(ctx.error_at_span(
                                format!("initializer of global `{}` is not a compile-time constant", def.name),
                                def.span,
                            ));
                        };
                        folded.to_string()
                    }
                    None => "zeroinit".to_string(),
                };
                ctx.bind(def.name.clone(), Symbol::Var)?;
                let depth = ctx.depth();
                ctx.line(&format!("global @{}_{} = alloc i32, {}", def.name, depth, init_text));
            } else {
                // 初始化表达式先于绑定求值: `int a = a;` 里右边的 a 是外层的
                let init_value = match &def.init {
                    Some(expr) => Some(expr.generate_kir(ctx)?),
                    None => None,
                };
                ctx.bind(def.name.clone(), Symbol::Var)?;
                let depth = ctx.depth();
                let slot = format!("@{}_{}", def.name, depth);
                // 同一层级的兄弟块重绑同名变量时共用一次 alloc
                if !ctx.was_allocated(&def.name) {
                    ctx.inst(&format!("{} = alloc i32", slot));
                }
                ctx.mark_allocated(&def.name);
                if let Some(value) = init_value {
                    ctx.inst(&format!("store {}, {}", value, slot));
                }
            }
        }
        Ok(())
    }
}

impl GenerateKir for Stmt {
    type Output = Value;

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        match self {
            Stmt::Assign(lval, expr) => generate_assign_stmt(lval, expr, ctx),
            Stmt::Expr(expr) => generate_expr_stmt(expr.as_ref(), ctx),
            Stmt::Block(block) => generate_block_stmt(block, ctx),
            Stmt::Return(expr) => generate_return_stmt(expr.as_ref(), ctx),
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
                ..
            } => generate_if_stmt(cond, then_stmt, else_stmt.as_deref(), ctx),
            Stmt::While { cond, body, .. } => generate_while_stmt(cond, body, ctx),
            Stmt::Break(span) => generate_break_stmt(span, ctx),
            Stmt::Continue(span) => generate_continue_stmt(span, ctx),
        }
    }
}

impl GenerateKir for Expr {
    type Output = Value;

    fn generate_kir(&self, ctx: &mut IrContext) -> Result<Self::Output, CompilerError> {
        match self {
            Expr::Int(value, _) => Ok(Value::imm(*value)),
            Expr::LVal(lval) => generate_lval(lval, ctx),
            Expr::Unary(op, expr, _) => generate_unary(*op, expr, ctx),
            Expr::Binary(op, lhs, rhs, _) => generate_binary(*op, lhs, rhs, ctx),
            Expr::Rel(op, lhs, rhs, _) => generate_rel(*op, lhs, rhs, ctx),
            Expr::Eq(op, lhs, rhs, _) => generate_eq(*op, lhs, rhs, ctx),
            Expr::LAnd(lhs, rhs, _) => generate_land(lhs, rhs, ctx),
            Expr::LOr(lhs, rhs, _) => generate_lor(lhs, rhs, ctx),
            Expr::Assign(lval, expr, _) => generate_assign_expr(lval, expr, ctx),
            Expr::Call(name, args, span) => generate_call(name, args, *span, ctx),
        }
    }
}
