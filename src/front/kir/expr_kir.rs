use crate::front::ast::*;
use crate::front::kir::context::{IrContext, Resolved, Value};
use crate::front::kir::GenerateKir;
use crate::CompilerError;

fn binary_op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Mod => "mod",
    }
}

fn rel_op_name(op: RelOp) -> &'static str {
    match op {
        RelOp::Lt => "lt",
        RelOp::Gt => "gt",
        RelOp::Le => "le",
        RelOp::Ge => "ge",
    }
}

fn eq_op_name(op: EqOp) -> &'static str {
    match op {
        EqOp::Eq => "eq",
        EqOp::Ne => "ne",
    }
}

/// 双立即数的算术折叠; 除零/模零在编译期就是错误
fn fold_binary(op: BinaryOp, lhs: i32, rhs: i32) -> Result<i32, CompilerError> {
    Ok(match op {
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div => {
            if rhs == 0 {
                return Err("division by zero in constant expression".into());
            }
            lhs.wrapping_div(rhs)
        }
        BinaryOp::Mod => {
            if rhs == 0 {
                return Err("modulo by zero in constant expression".into());
            }
            lhs.wrapping_rem(rhs)
        }
    })
}

fn fold_rel(op: RelOp, lhs: i32, rhs: i32) -> i32 {
    let result = match op {
        RelOp::Lt => lhs < rhs,
        RelOp::Gt => lhs > rhs,
        RelOp::Le => lhs <= rhs,
        RelOp::Ge => lhs >= rhs,
    };
    result as i32
}

fn fold_eq(op: EqOp, lhs: i32, rhs: i32) -> i32 {
    let result = match op {
        EqOp::Eq => lhs == rhs,
        EqOp::Ne => lhs != rhs,
    };
    result as i32
}

pub fn generate_unary(op: UnaryOp, expr: &Expr, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    let value = expr.generate_kir(ctx)?;
    match op {
        // 一元加号完全折叠掉
        UnaryOp::Plus => Ok(value),
        UnaryOp::Minus => match value.as_imm() {
            Some(v) => Ok(Value::imm(v.wrapping_neg())),
            None => {
                let temp = ctx.fresh_temp();
                ctx.inst(&format!("{} = sub 0, {}", temp, value));
                Ok(temp)
            }
        },
        UnaryOp::Not => match value.as_imm() {
            Some(v) => Ok(Value::imm((v == 0) as i32)),
            None => {
                let temp = ctx.fresh_temp();
                ctx.inst(&format!("{} = eq 0, {}", temp, value));
                Ok(temp)
            }
        },
    }
}

pub fn generate_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let left = lhs.generate_kir(ctx)?;
    let right = rhs.generate_kir(ctx)?;
    if let (Some(a), Some(b)) = (left.as_imm(), right.as_imm()) {
        return Ok(Value::imm(fold_binary(op, a, b)?));
    }
    let temp = ctx.fresh_temp();
    ctx.inst(&format!("{} = {} {}, {}", temp, binary_op_name(op), left, right));
    Ok(temp)
}

pub fn generate_rel(
    op: RelOp,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let left = lhs.generate_kir(ctx)?;
    let right = rhs.generate_kir(ctx)?;
    if let (Some(a), Some(b)) = (left.as_imm(), right.as_imm()) {
        return Ok(Value::imm(fold_rel(op, a, b)));
    }
    let temp = ctx.fresh_temp();
    ctx.inst(&format!("{} = {} {}, {}", temp, rel_op_name(op), left, right));
    Ok(temp)
}

pub fn generate_eq(
    op: EqOp,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let left = lhs.generate_kir(ctx)?;
    let right = rhs.generate_kir(ctx)?;
    if let (Some(a), Some(b)) = (left.as_imm(), right.as_imm()) {
        return Ok(Value::imm(fold_eq(op, a, b)));
    }
    let temp = ctx.fresh_temp();
    ctx.inst(&format!("{} = {} {}, {}", temp, eq_op_name(op), left, right));
    Ok(temp)
}

/// 短路求值的逻辑与
///
/// 左操作数是立即数时完全在编译期完成; 否则第二个操作数可能不执行,
/// 结果必须放进一个 alloc 的槽里, 两条路径在 %land_end 汇合后再读出
pub fn generate_land(lhs: &Expr, rhs: &Expr, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    let left = lhs.generate_kir(ctx)?;
    match left.as_imm() {
        // 左边恒假, 右操作数在编译期被丢弃
        Some(0) => Ok(Value::imm(0)),
        Some(_) => {
            let right = rhs.generate_kir(ctx)?;
            match right.as_imm() {
                Some(v) => Ok(Value::imm((v != 0) as i32)),
                None => {
                    let temp = ctx.fresh_temp();
                    ctx.inst(&format!("{} = ne {}, 0", temp, right));
                    Ok(temp)
                }
            }
        }
        None => {
            let k = ctx.next_land();
            let rhs_label = format!("%land_rhs_{}", k);
            let end_label = format!("%land_end_{}", k);
            let slot = format!("%land_slot_{}", k);

            let left_norm = ctx.fresh_temp();
            ctx.inst(&format!("{} = ne {}, 0", left_norm, left));
            ctx.inst(&format!("{} = alloc i32", slot));
            ctx.inst(&format!("store {}, {}", left_norm, slot));
            ctx.inst(&format!("br {}, {}, {}", left_norm, rhs_label, end_label));

            ctx.label(&rhs_label);
            let right = rhs.generate_kir(ctx)?;
            let right_norm = ctx.fresh_temp();
            ctx.inst(&format!("{} = ne {}, 0", right_norm, right));
            let combined = ctx.fresh_temp();
            ctx.inst(&format!("{} = and {}, {}", combined, left_norm, right_norm));
            ctx.inst(&format!("store {}, {}", combined, slot));
            ctx.inst(&format!("jump {}", end_label));

            ctx.label(&end_label);
            let result = ctx.fresh_temp();
            ctx.inst(&format!("{} = load {}", result, slot));
            Ok(result)
        }
    }
}

/// 短路求值的逻辑或, 与 generate_land 对称: 左边为真直接跳到汇合点
pub fn generate_lor(lhs: &Expr, rhs: &Expr, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    let left = lhs.generate_kir(ctx)?;
    match left.as_imm() {
        Some(0) => {
            let right = rhs.generate_kir(ctx)?;
            match right.as_imm() {
                Some(v) => Ok(Value::imm((v != 0) as i32)),
                None => {
                    let temp = ctx.fresh_temp();
                    ctx.inst(&format!("{} = ne {}, 0", temp, right));
                    Ok(temp)
                }
            }
        }
        Some(_) => Ok(Value::imm(1)),
        None => {
            let k = ctx.next_lor();
            let rhs_label = format!("%lor_rhs_{}", k);
            let end_label = format!("%lor_end_{}", k);
            let slot = format!("%lor_slot_{}", k);

            let left_norm = ctx.fresh_temp();
            ctx.inst(&format!("{} = ne {}, 0", left_norm, left));
            ctx.inst(&format!("{} = alloc i32", slot));
            ctx.inst(&format!("store {}, {}", left_norm, slot));
            ctx.inst(&format!("br {}, {}, {}", left_norm, end_label, rhs_label));

            ctx.label(&rhs_label);
            let right = rhs.generate_kir(ctx)?;
            let right_norm = ctx.fresh_temp();
            ctx.inst(&format!("{} = ne {}, 0", right_norm, right));
            let combined = ctx.fresh_temp();
            ctx.inst(&format!("{} = or {}, {}", combined, left_norm, right_norm));
            ctx.inst(&format!("store {}, {}", combined, slot));
            ctx.inst(&format!("jump {}", end_label));

            ctx.label(&end_label);
            let result = ctx.fresh_temp();
            ctx.inst(&format!("{} = load {}", result, slot));
            Ok(result)
        }
    }
}

/// 读左值: 常量直接给出立即数, 变量按所在层级的名字 load
pub fn generate_lval(lval: &LVal, ctx: &mut IrContext) -> Result<Value, CompilerError> {
    match ctx.resolve(&lval.name) {
        Some(Resolved::Const(v)) => Ok(Value::imm(v)),
        Some(Resolved::Var { depth }) => {
            let temp = ctx.fresh_temp();
            ctx.inst(&format!("{} = load @{}_{}", temp, lval.name, depth));
            Ok(temp)
        }
        None => Err(ctx.error_at_span(
            format!("identifier `{}` is not defined", lval.name),
            lval.span,
        )),
    }
}

/// 赋值目标按名字解析, 不产生 load; 常量不可赋值
pub(crate) fn resolve_assign_target(lval: &LVal, ctx: &IrContext) -> Result<String, CompilerError> {
    match ctx.resolve(&lval.name) {
        Some(Resolved::Var { depth }) => Ok(format!("@{}_{}", lval.name, depth)),
        Some(Resolved::Const(_)) => Err(ctx.error_at_span(
            format!("cannot assign to constant `{}`", lval.name),
            lval.span,
        )),
        None => Err(ctx.error_at_span(
            format!("identifier `{}` is not defined", lval.name),
            lval.span,
        )),
    }
}

/// 括号包裹的赋值表达式, 值为被赋的值
pub fn generate_assign_expr(
    lval: &LVal,
    expr: &Expr,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let value = expr.generate_kir(ctx)?;
    let target = resolve_assign_target(lval, ctx)?;
    ctx.inst(&format!("store {}, {}", value, target));
    Ok(value)
}

pub fn generate_call(
    name: &str,
    args: &[Expr],
    span: Span,
    ctx: &mut IrContext,
) -> Result<Value, CompilerError> {
    let Some(&ret_ty) = ctx.func_table.get(name) else {
        return Err(ctx.error_at_span(format!("function `{}` is not declared", name), span));
    };
    // 实参从左到右求值
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(arg.generate_kir(ctx)?);
    }
    let arg_text = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match ret_ty {
        DataType::Int => {
            let temp = ctx.fresh_temp();
            ctx.inst(&format!("{} = call @{}({})", temp, name, arg_text));
            Ok(temp)
        }
        DataType::Void => {
            ctx.inst(&format!("call @{}({})", name, arg_text));
            Ok(Value::unit())
        }
    }
}
