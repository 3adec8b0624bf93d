use crate::front::ast::*;
use crate::front::kir::context::{IrContext, Value};
use crate::front::kir::expr_kir::resolve_assign_target;
use crate::front::kir::GenerateKir;
use crate::CompilerError;

pub fn generate_assign_stmt(
    lval: &LVal,
    expr: &Expr,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    // 右侧先求值, 再解析赋值目标
    let value = expr.generate_kir(ctx)?;
    let target = resolve_assign_target(lval, ctx)?;
    ctx.inst(&format!("store {}, {}", value, target));
    Ok(Value::unit())
}

pub fn generate_expr_stmt(expr: Option<&Expr>, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    if let Some(expr) = expr {
        expr.generate_kir(ctx)?;
    }
    Ok(Value::unit())
}

pub fn generate_return_stmt(
    expr: Option<&Expr>,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    match expr {
        Some(expr) => {
            let value = expr.generate_kir(ctx)?;
            ctx.inst(&format!("ret {}", value));
        }
        None => ctx.inst("ret"),
    }
    Ok(Value::returned())
}

pub fn generate_block_stmt(block: &Block, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    ctx.enter_scope();
    let mut result = Value::unit();
    for item in block {
        match item {
            BlockItem::Decl(decl) => decl.generate_kir(ctx)?,
            BlockItem::Stmt(stmt) => {
                let r = stmt.generate_kir(ctx)?;
                if r.diverted() {
                    // 同块中后续语句不可达, 不再输出
                    result = r;
                    break;
                }
            }
        }
    }
    ctx.leave_scope()?;
    Ok(result)
}

pub fn generate_if_stmt(
    cond: &Expr,
    then_stmt: &Stmt,
    else_stmt: Option<&Stmt>,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let k = ctx.next_if();
    let then_label = format!("%then_{}", k);
    let else_label = format!("%else_{}", k);
    let end_label = format!("%end_{}", k);

    let cond_value = cond.generate_kir(ctx)?;
    let false_target = if else_stmt.is_some() {
        &else_label
    } else {
        &end_label
    };
    ctx.inst(&format!("br {}, {}, {}", cond_value, then_label, false_target));

    ctx.label(&then_label);
    let then_result = then_stmt.generate_kir(ctx)?;
    // 分支已经 return/break/continue 时不能再补跳转, 否则块里有两个终结指令
    if !then_result.diverted() {
        ctx.inst(&format!("jump {}", end_label));
    }

    let mut else_result = Value::unit();
    if let Some(else_s) = else_stmt {
        ctx.label(&else_label);
        else_result = else_s.generate_kir(ctx)?;
        if !else_result.diverted() {
            ctx.inst(&format!("jump {}", end_label));
        }
    }

    if else_stmt.is_some() && then_result.diverted() && else_result.diverted() {
        // 两个分支都不会落到汇合点, 省略空的 %end 块
        if then_result.flow_returned && else_result.flow_returned {
            Ok(Value::returned())
        } else {
            Ok(Value::interrupted())
        }
    } else {
        ctx.label(&end_label);
        Ok(Value::unit())
    }
}

pub fn generate_while_stmt(
    cond: &Expr,
    body: &Stmt,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let k = ctx.next_while();
    let entry_label = format!("%while_entry_{}", k);
    let body_label = format!("%while_body_{}", k);
    let end_label = format!("%while_end_{}", k);

    // 条件每轮都要重算, 所以入口块先跳到条件块
    ctx.inst(&format!("jump {}", entry_label));
    ctx.label(&entry_label);
    let cond_value = cond.generate_kir(ctx)?;
    ctx.inst(&format!("br {}, {}, {}", cond_value, body_label, end_label));

    ctx.label(&body_label);
    // continue 回到条件块, break 跳到结束块
    ctx.push_loop(entry_label.clone(), end_label.clone());
    let body_result = body.generate_kir(ctx)?;
    ctx.pop_loop();
    if !body_result.diverted() {
        ctx.inst(&format!("jump {}", entry_label));
    }

    ctx.label(&end_label);
    // 循环体是否执行取决于条件, 整个 while 不保证 return
    Ok(Value::unit())
}

pub fn generate_break_stmt(span: &Span, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    let Some(labels) = ctx.current_loop() else {
        return Err(ctx.error_at_span("break used outside of loop", *span));
    };
    let target = labels.break_label.clone();
    ctx.inst(&format!("jump {}", target));
    Ok(Value::interrupted())
}

pub fn generate_continue_stmt(span: &Span, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    let Some(labels) = ctx.current_loop() else {
        return Err(ctx.error_at_span("continue used outside of loop", *span));
    };
    let target = labels.continue_label.clone();
    ctx.inst(&format!("jump {}", target));
    Ok(Value::interrupted())
}
