//! KIR 指令到 RISC-V 汇编的翻译
//!
//! 翻译纪律: 一次只看一条指令. 操作数装入新分配的临时寄存器
//! (立即数 li, 栈上值 lw, 形参 mv/lw, 全局变量 la + lw), 结果算出来
//! 之后立刻 sw 回该指令的栈槽, 再把用到的寄存器全部释放. 指令之间
//! 因此不存在寄存器依赖, 也就不需要真正的寄存器分配.

use crate::back::context::Context;
use crate::back::frame::StackPlan;
use crate::back::insts::{Instruction, Reg, ARG_REGS};
use crate::back::utils::{load_reg_with_offset, store_reg_with_offset};
use crate::CompilerError;
use koopa::ir::entities::ValueData;
use koopa::ir::values::{Binary, Branch, Call, GlobalAlloc, Jump, Load, Return, Store};
use koopa::ir::{BinaryOp, FunctionData, Program, Value, ValueKind};

pub trait GenerateAsm {
    fn generate(&self, program: &Program, ctx: &mut Context) -> Result<(), CompilerError>;
}

impl GenerateAsm for Program {
    fn generate(&self, program: &Program, ctx: &mut Context) -> Result<(), CompilerError> {
        // 先处理全局变量, 生成 .data 段
        for &global in self.inst_layout() {
            let data = program.borrow_value(global);
            if let ValueKind::GlobalAlloc(alloc) = data.kind() {
                generate_global_alloc(alloc, program, ctx, global)?;
            }
        }

        // 再按布局顺序生成函数 (.text 段); 库函数只有声明, 基本块
        // 列表为空, 跳过
        for &func in self.func_layout() {
            let func_data = self.func(func);
            if func_data.layout().entry_bb().is_none() {
                continue;
            }
            func_data.generate(program, ctx)?;
        }
        Ok(())
    }
}

impl GenerateAsm for FunctionData {
    fn generate(&self, program: &Program, ctx: &mut Context) -> Result<(), CompilerError> {
        let name = &self.name()[1..];
        ctx.program.push(Instruction::Section(".text".to_string()));
        ctx.program.push(Instruction::Global(name.to_string()));
        ctx.program.push(Instruction::Label(name.to_string()));

        // 扫一遍所有指令确定帧大小: 每个有结果的指令一个槽 + ra 一个槽
        // + 调用点里超过 8 个的出参
        let mut result_slots: usize = 0;
        let mut stack_args: usize = 0;
        for (_bb, node) in self.layout().bbs() {
            for &inst in node.insts().keys() {
                let data = self.dfg().value(inst);
                if !data.ty().is_unit() {
                    result_slots += 1;
                }
                if let ValueKind::Call(call) = data.kind() {
                    stack_args = stack_args.max(call.args().len().saturating_sub(8));
                }
            }
        }
        let frame_size = align_to_16(((result_slots + 1 + stack_args) * 4) as i32);
        ctx.enter_function(name, StackPlan::new(frame_size, (stack_args * 4) as i32))?;

        // 基本块 -> 标签: KIR 块名去掉前导记号; entry 由函数标签顺次
        // 进入, 不再单独输出 (否则多个函数会重复定义 entry)
        for (bb, _node) in self.layout().bbs() {
            let bb_name = self
                .dfg()
                .bb(*bb)
                .name()
                .clone()
                .ok_or_else(|| CompilerError::Codegen("basic block has no label".to_string()))?;
            ctx.bb_labels.insert(*bb, bb_name[1..].to_string());
        }

        // prologue: 开辟栈帧, 把 ra 存到帧顶
        ctx.adjust_sp(-frame_size)?;
        store_reg_with_offset(ctx, Reg::Ra, frame_size - 4)?;

        for (bb, node) in self.layout().bbs() {
            let label = ctx.label_of(*bb)?;
            if label != "entry" {
                ctx.program.push(Instruction::Label(label));
            }
            for &inst in node.insts().keys() {
                let data = self.dfg().value(inst);
                generate_inst(data, inst, self, program, ctx)?;
            }
        }
        Ok(())
    }
}

fn align_to_16(bytes: i32) -> i32 {
    (bytes + 15) / 16 * 16
}

fn generate_inst(
    data: &ValueData,
    inst: Value,
    func: &FunctionData,
    program: &Program,
    ctx: &mut Context,
) -> Result<(), CompilerError> {
    match data.kind() {
        // alloc 的空间由栈帧规划负责, 不产生指令
        ValueKind::Alloc(_) => Ok(()),
        ValueKind::Load(load) => generate_load(load, inst, ctx),
        ValueKind::Store(store) => generate_store(store, func, ctx),
        ValueKind::Binary(binary) => generate_binary(binary, inst, func, ctx),
        ValueKind::Branch(branch) => generate_branch(branch, func, ctx),
        ValueKind::Jump(jump) => generate_jump(jump, ctx),
        ValueKind::Call(call) => generate_call(call, inst, func, program, ctx),
        ValueKind::Return(ret) => generate_return(ret, func, ctx),
        other => Err(CompilerError::Codegen(format!(
            "unsupported KIR instruction: {:?}",
            other
        ))),
    }
}

/// 把一个操作数装进新分配的临时寄存器
///
/// 立即数 0 直接用 x0; 其他立即数 li; 形参前 8 个从 a0-a7 拷出,
/// 之后的从调用者栈帧里取; 其余值从自己的栈槽 lw
fn materialize_operand(
    value: Value,
    func: &FunctionData,
    ctx: &mut Context,
) -> Result<Reg, CompilerError> {
    match func.dfg().value(value).kind() {
        ValueKind::Integer(n) => {
            if n.value() == 0 {
                ctx.bind_zero(value)
            } else {
                let imm = n.value();
                let reg = ctx.allocate_reg(value)?;
                ctx.program.push(Instruction::Li(reg, imm));
                Ok(reg)
            }
        }
        ValueKind::FuncArgRef(arg) => {
            let index = arg.index();
            let reg = ctx.allocate_reg(value)?;
            if index < 8 {
                ctx.program.push(Instruction::Mv(reg, ARG_REGS[index]));
            } else {
                let offset = ctx.plan()?.frame_size() + ((index - 8) * 4) as i32;
                load_reg_with_offset(ctx, reg, offset)?;
            }
            Ok(reg)
        }
        _ => {
            let offset = ctx.plan_mut()?.slot_of(value)?;
            let reg = ctx.allocate_reg(value)?;
            load_reg_with_offset(ctx, reg, offset)?;
            Ok(reg)
        }
    }
}

fn generate_load(load: &Load, inst: Value, ctx: &mut Context) -> Result<(), CompilerError> {
    let dest = ctx.allocate_reg(inst)?;
    if let Some(global) = ctx.global_name(load.src()) {
        // 全局变量: la 取地址再 lw
        ctx.program.push(Instruction::La(dest, global));
        ctx.program.push(Instruction::Lw(dest, 0, dest));
    } else {
        let offset = ctx.plan_mut()?.slot_of(load.src())?;
        load_reg_with_offset(ctx, dest, offset)?;
    }
    let offset = ctx.plan_mut()?.slot_of(inst)?;
    store_reg_with_offset(ctx, dest, offset)?;
    ctx.free_reg(inst)
}

fn generate_store(store: &Store, func: &FunctionData, ctx: &mut Context) -> Result<(), CompilerError> {
    let src = materialize_operand(store.value(), func, ctx)?;
    if let Some(global) = ctx.global_name(store.dest()) {
        let addr = ctx.allocate_reg(store.dest())?;
        ctx.program.push(Instruction::La(addr, global));
        ctx.program.push(Instruction::Sw(src, 0, addr));
        ctx.free_reg(store.dest())?;
    } else {
        let offset = ctx.plan_mut()?.slot_of(store.dest())?;
        store_reg_with_offset(ctx, src, offset)?;
    }
    ctx.free_reg(store.value())
}

fn generate_binary(
    binary: &Binary,
    inst: Value,
    func: &FunctionData,
    ctx: &mut Context,
) -> Result<(), CompilerError> {
    let lhs = materialize_operand(binary.lhs(), func, ctx)?;
    let rhs = materialize_operand(binary.rhs(), func, ctx)?;
    // 操作数已经装进来了, 先释放再分配结果寄存器, 结果可以复用它们
    ctx.free_reg(binary.lhs())?;
    ctx.free_reg(binary.rhs())?;
    let dest = ctx.allocate_reg(inst)?;

    match binary.op() {
        BinaryOp::Add => ctx.program.push(Instruction::Add(dest, lhs, rhs)),
        BinaryOp::Sub => ctx.program.push(Instruction::Sub(dest, lhs, rhs)),
        BinaryOp::Mul => ctx.program.push(Instruction::Mul(dest, lhs, rhs)),
        BinaryOp::Div => ctx.program.push(Instruction::Div(dest, lhs, rhs)),
        BinaryOp::Mod => ctx.program.push(Instruction::Rem(dest, lhs, rhs)),
        BinaryOp::And => ctx.program.push(Instruction::And(dest, lhs, rhs)),
        BinaryOp::Or => ctx.program.push(Instruction::Or(dest, lhs, rhs)),
        BinaryOp::Eq => {
            ctx.program.push(Instruction::Xor(dest, lhs, rhs));
            ctx.program.push(Instruction::Seqz(dest, dest));
        }
        BinaryOp::NotEq => {
            ctx.program.push(Instruction::Xor(dest, lhs, rhs));
            ctx.program.push(Instruction::Snez(dest, dest));
        }
        BinaryOp::Lt => ctx.program.push(Instruction::Slt(dest, lhs, rhs)),
        BinaryOp::Gt => ctx.program.push(Instruction::Sgt(dest, lhs, rhs)),
        BinaryOp::Ge => {
            ctx.program.push(Instruction::Slt(dest, lhs, rhs));
            ctx.program.push(Instruction::Seqz(dest, dest));
        }
        BinaryOp::Le => {
            ctx.program.push(Instruction::Sgt(dest, lhs, rhs));
            ctx.program.push(Instruction::Seqz(dest, dest));
        }
        other => {
            return Err(CompilerError::Codegen(format!(
                "unsupported KIR binary operator: {:?}",
                other
            )))
        }
    }

    let offset = ctx.plan_mut()?.slot_of(inst)?;
    store_reg_with_offset(ctx, dest, offset)?;
    ctx.free_reg(inst)
}

fn generate_branch(branch: &Branch, func: &FunctionData, ctx: &mut Context) -> Result<(), CompilerError> {
    let cond = materialize_operand(branch.cond(), func, ctx)?;
    let true_label = ctx.label_of(branch.true_bb())?;
    let false_label = ctx.label_of(branch.false_bb())?;
    ctx.program.push(Instruction::Bnez(cond, true_label));
    ctx.program.push(Instruction::J(false_label));
    ctx.free_reg(branch.cond())
}

fn generate_jump(jump: &Jump, ctx: &mut Context) -> Result<(), CompilerError> {
    let target = ctx.label_of(jump.target())?;
    ctx.program.push(Instruction::J(target));
    Ok(())
}

fn generate_call(
    call: &Call,
    inst: Value,
    func: &FunctionData,
    program: &Program,
    ctx: &mut Context,
) -> Result<(), CompilerError> {
    for (idx, &arg) in call.args().iter().enumerate() {
        if idx < 8 {
            // 前 8 个参数走 a0-a7; 立即数不占池子, 直接 li 进去
            if let ValueKind::Integer(n) = func.dfg().value(arg).kind() {
                ctx.program.push(Instruction::Li(ARG_REGS[idx], n.value()));
            } else {
                let reg = materialize_operand(arg, func, ctx)?;
                ctx.program.push(Instruction::Mv(ARG_REGS[idx], reg));
                ctx.free_reg(arg)?;
            }
        } else {
            // 第 9 个起放进本函数栈帧底部的出参区
            let reg = materialize_operand(arg, func, ctx)?;
            store_reg_with_offset(ctx, reg, ((idx - 8) * 4) as i32)?;
            ctx.free_reg(arg)?;
        }
    }

    let callee = program.func(call.callee());
    ctx.program.push(Instruction::Call(callee.name()[1..].to_string()));

    // 有返回值的调用把 a0 落回自己的栈槽
    if !func.dfg().value(inst).ty().is_unit() {
        let offset = ctx.plan_mut()?.slot_of(inst)?;
        store_reg_with_offset(ctx, Reg::A0, offset)?;
    }
    Ok(())
}

fn generate_return(ret: &Return, func: &FunctionData, ctx: &mut Context) -> Result<(), CompilerError> {
    match ret.value() {
        Some(value) => match func.dfg().value(value).kind() {
            ValueKind::Integer(n) => {
                let imm = n.value();
                ctx.program.push(Instruction::Li(Reg::A0, imm));
            }
            ValueKind::FuncArgRef(arg) => {
                let index = arg.index();
                if index < 8 {
                    ctx.program.push(Instruction::Mv(Reg::A0, ARG_REGS[index]));
                } else {
                    let offset = ctx.plan()?.frame_size() + ((index - 8) * 4) as i32;
                    load_reg_with_offset(ctx, Reg::A0, offset)?;
                }
            }
            _ => {
                let offset = ctx.plan_mut()?.slot_of(value)?;
                load_reg_with_offset(ctx, Reg::A0, offset)?;
            }
        },
        None => ctx.program.push(Instruction::Li(Reg::A0, 0)),
    }

    let frame_size = ctx.plan()?.frame_size();
    load_reg_with_offset(ctx, Reg::Ra, frame_size - 4)?;
    ctx.adjust_sp(frame_size)?;
    ctx.program.push(Instruction::Ret);
    Ok(())
}

fn generate_global_alloc(
    alloc: &GlobalAlloc,
    program: &Program,
    ctx: &mut Context,
    value: Value,
) -> Result<(), CompilerError> {
    let name = ctx.register_global(value);
    ctx.program.push(Instruction::Section(".data".to_string()));
    ctx.program.push(Instruction::Global(name.clone()));
    ctx.program.push(Instruction::Label(name));

    let init = program.borrow_value(alloc.init());
    match init.kind() {
        ValueKind::Integer(n) => ctx.program.push(Instruction::Word(n.value())),
        ValueKind::ZeroInit(_) => ctx.program.push(Instruction::Zero(init.ty().size() as i32)),
        other => {
            return Err(CompilerError::Codegen(format!(
                "unsupported global initializer: {:?}",
                other
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::back::generate_asm;
    use koopa::front::Driver;
    use koopa::ir::Type;

    fn build_program(kir: &str) -> koopa::ir::Program {
        Type::set_ptr_size(4);
        Driver::from(kir.to_string())
            .generate_program()
            .expect("KIR text should parse")
    }

    fn compile_kir(kir: &str) -> String {
        generate_asm(&build_program(kir)).expect("asm generation should succeed")
    }

    fn compile_kir_err(kir: &str) -> String {
        generate_asm(&build_program(kir))
            .expect_err("asm generation should fail")
            .to_string()
    }

    fn compile_source(src: &str) -> String {
        let ast = crate::grammar::CompUnitParser::new()
            .parse(src)
            .expect("source should parse");
        let kir = crate::front::generate_kir(&ast, None).expect("lowering should succeed");
        compile_kir(&kir)
    }

    // === 栈帧与出入口 ===

    #[test]
    fn minimal_function_prologue_and_epilogue() {
        let asm = compile_kir("fun @main(): i32 {\n%entry:\n  ret 0\n}\n");
        assert_eq!(
            asm,
            "  .text\n\
             \x20 .globl main\n\
             main:\n\
             \x20 addi sp, sp, -16\n\
             \x20 sw ra, 12(sp)\n\
             \x20 li a0, 0\n\
             \x20 lw ra, 12(sp)\n\
             \x20 addi sp, sp, 16\n\
             \x20 ret\n"
        );
    }

    #[test]
    fn frame_size_is_16_aligned() {
        // 7 条有结果的指令 + ra = 32 字节
        let kir = "\
fun @main(): i32 {
%entry:
  %0 = add 1, 2
  %1 = eq %0, 3
  %2 = le %1, 0
  %3 = ge %2, 1
  %4 = gt %3, 0
  %5 = ne %4, 0
  %6 = lt %5, 2
  ret %6
}
";
        let asm = compile_kir(kir);
        assert!(asm.contains("addi sp, sp, -32"), "asm:\n{asm}");
        assert!(asm.contains("addi sp, sp, 32"), "asm:\n{asm}");
    }

    // === 指令选择 ===

    #[test]
    fn comparison_selection() {
        let kir = "\
fun @main(): i32 {
%entry:
  %0 = add 1, 2
  %1 = eq %0, 3
  %2 = le %1, 0
  %3 = ge %2, 1
  %4 = gt %3, 0
  %5 = ne %4, 0
  %6 = lt %5, 2
  ret %6
}
";
        let asm = compile_kir(kir);
        assert!(asm.contains("  add t0, t0, t1\n"), "asm:\n{asm}");
        assert!(asm.contains("  xor t0, t0, t1\n  seqz t0, t0\n"), "asm:\n{asm}");
        assert!(asm.contains("  sgt t0, t0, x0\n  seqz t0, t0\n"), "asm:\n{asm}");
        assert!(asm.contains("  slt t0, t0, t1\n  seqz t0, t0\n"), "asm:\n{asm}");
        assert!(asm.contains("  xor t0, t0, x0\n  snez t0, t0\n"), "asm:\n{asm}");
        assert!(asm.contains("  slt t0, t0, t1\n"), "asm:\n{asm}");
    }

    #[test]
    fn arithmetic_selection() {
        let kir = "\
fun @main(): i32 {
%entry:
  %0 = div 7, 2
  %1 = mod %0, 2
  %2 = mul %1, 3
  %3 = sub %2, 1
  %4 = and %3, 1
  %5 = or %4, 2
  ret %5
}
";
        let asm = compile_kir(kir);
        for inst in ["div", "rem", "mul", "sub", "and", "or"] {
            assert!(asm.contains(&format!("  {} t0, t0, t1\n", inst)), "asm:\n{asm}");
        }
    }

    #[test]
    fn zero_immediate_uses_hardware_zero() {
        let asm = compile_kir("fun @main(): i32 {\n%entry:\n  %0 = add 5, 0\n  ret %0\n}\n");
        assert!(asm.contains("  add t0, t0, x0\n"), "asm:\n{asm}");
        assert!(!asm.contains("li t1, 0"), "asm:\n{asm}");
    }

    // === 分支与标签 ===

    #[test]
    fn branch_and_labels() {
        let kir = "\
fun @main(): i32 {
%entry:
  br 1, %a, %b
%a:
  ret 1
%b:
  ret 2
}
";
        let asm = compile_kir(kir);
        assert!(asm.contains("  li t0, 1\n  bnez t0, a\n  j b\n"), "asm:\n{asm}");
        assert!(asm.contains("\na:\n"), "asm:\n{asm}");
        assert!(asm.contains("\nb:\n"), "asm:\n{asm}");
        // entry 由函数标签顺次进入, 不再单独输出
        assert!(!asm.contains("\nentry:\n"), "asm:\n{asm}");
    }

    // === 全局变量 ===

    #[test]
    fn globals_are_renamed_and_accessed_indirectly() {
        let kir = "\
global @a_1 = alloc i32, zeroinit

fun @f(%arg_0: i32): i32 {
%entry:
  @x_2 = alloc i32
  store %arg_0, @x_2
  %0 = load @x_2
  %1 = load @a_1
  %2 = add %0, %1
  ret %2
}

fun @main(): i32 {
%entry:
  store 5, @a_1
  %3 = call @f(3)
  ret %3
}
";
        let asm = compile_kir(kir);
        assert!(
            asm.contains("  .data\n  .globl global_var_0\nglobal_var_0:\n  .zero 4\n"),
            "asm:\n{asm}"
        );
        // 读全局: la 取地址再 lw
        assert!(asm.contains("  la t0, global_var_0\n  lw t0, 0(t0)\n"), "asm:\n{asm}");
        // 写全局: la 到另一个临时寄存器再 sw
        assert!(asm.contains("  li t0, 5\n  la t1, global_var_0\n  sw t0, 0(t1)\n"), "asm:\n{asm}");
        // 调用与返回值落栈
        assert!(asm.contains("  li a0, 3\n  call f\n  sw a0, 0(sp)\n"), "asm:\n{asm}");
        // 形参先拷出再落栈
        assert!(asm.contains("  mv t0, a0\n  sw t0, 0(sp)\n"), "asm:\n{asm}");
    }

    #[test]
    fn global_with_word_initializer() {
        let kir = "\
global @b_1 = alloc i32, 42

fun @main(): i32 {
%entry:
  %0 = load @b_1
  ret %0
}
";
        let asm = compile_kir(kir);
        assert!(asm.contains("global_var_0:\n  .word 42\n"), "asm:\n{asm}");
    }

    // === 调用约定 ===

    #[test]
    fn ninth_parameter_goes_through_the_stack() {
        let kir = "\
fun @first_plus_ninth(%arg_0: i32, %arg_1: i32, %arg_2: i32, %arg_3: i32, %arg_4: i32, %arg_5: i32, %arg_6: i32, %arg_7: i32, %arg_8: i32): i32 {
%entry:
  %0 = add %arg_0, %arg_8
  ret %0
}

fun @main(): i32 {
%entry:
  %1 = call @first_plus_ninth(1, 2, 3, 4, 5, 6, 7, 8, 9)
  ret %1
}
";
        let asm = compile_kir(kir);
        // 被调方: 第 1 个参数从 a0 拷出, 第 9 个在 sp + frame + 0
        assert!(asm.contains("  mv t0, a0\n"), "asm:\n{asm}");
        assert!(asm.contains("  lw t1, 16(sp)\n"), "asm:\n{asm}");
        // 调用方: 前 8 个走 a0-a7, 第 9 个进出参区 0(sp)
        for (idx, val) in (0..8).zip(1..9) {
            assert!(asm.contains(&format!("  li a{}, {}\n", idx, val)), "asm:\n{asm}");
        }
        assert!(asm.contains("  li t0, 9\n  sw t0, 0(sp)\n"), "asm:\n{asm}");
        // 调用结果的槽位在出参区之上
        assert!(asm.contains("  call first_plus_ninth\n  sw a0, 4(sp)\n"), "asm:\n{asm}");
    }

    // === 大偏移展开 ===

    fn chain_of_adds(count: usize) -> String {
        let mut kir = String::from("fun @main(): i32 {\n%entry:\n  %0 = add 0, 1\n");
        for i in 1..count {
            kir.push_str(&format!("  %{} = add %{}, 1\n", i, i - 1));
        }
        kir.push_str(&format!("  ret %{}\n}}\n", count - 1));
        kir
    }

    #[test]
    fn offset_expansion_triggers_at_exactly_2048() {
        // 511 条 add + ra = 2048 字节: -2048 还在 imm12 里, +2048 恰好不在
        let asm = compile_kir(&chain_of_adds(511));
        assert!(asm.contains("  addi sp, sp, -2048\n"), "prologue should stay addi");
        assert!(asm.contains("  sw ra, 2044(sp)\n"), "ra offset is still in range");
        assert!(asm.contains("  li t0, 2048\n  add sp, sp, t0\n"), "epilogue must expand");
        assert!(!asm.contains("  addi sp, sp, 2048\n"), "2048 is out of imm12 range");
    }

    #[test]
    fn large_frames_synthesize_offsets() {
        // 520 条 add + ra = 2084 -> 2096 字节帧
        let asm = compile_kir(&chain_of_adds(520));
        assert!(asm.contains("  li t0, -2096\n  add sp, sp, t0\n"), "asm:\n{asm}");
        // ra 的偏移 2092 也超范围
        assert!(asm.contains("  li t0, 2092\n  add t0, t0, sp\n  sw ra, 0(t0)\n"), "asm:\n{asm}");
        // 第一个越界的结果槽位 2048
        assert!(asm.contains("  li t1, 2048\n  add t1, t1, sp\n  sw t0, 0(t1)\n"), "asm:\n{asm}");
    }

    // === 错误用例 ===

    #[test]
    fn unsupported_binary_operator_is_fatal() {
        let err = compile_kir_err("fun @main(): i32 {\n%entry:\n  %0 = xor 1, 2\n  ret %0\n}\n");
        assert!(err.contains("unsupported KIR binary operator"), "err: {err}");
    }

    // === 全流程 ===

    #[test]
    fn end_to_end_pipeline() {
        let asm = compile_source(
            "int total;\n\
             int bump(int n) { total = total + n; return total; }\n\
             int main() {\n\
               int i = 0;\n\
               while (i < 4) {\n\
                 if (i % 2 == 0 && i > 0) { bump(i); } else { bump(1); }\n\
                 i = i + 1;\n\
               }\n\
               putint(total);\n\
               return total;\n\
             }",
        );
        assert!(asm.contains("  .data\n"), "asm:\n{asm}");
        assert!(asm.contains("  .globl bump\n"), "asm:\n{asm}");
        assert!(asm.contains("  .globl main\n"), "asm:\n{asm}");
        assert!(asm.contains("  call bump\n"), "asm:\n{asm}");
        assert!(asm.contains("  call putint\n"), "asm:\n{asm}");
        assert!(asm.contains("  bnez "), "asm:\n{asm}");
        // 库函数只有声明, 不输出代码
        assert!(!asm.contains("getint:"), "asm:\n{asm}");
    }
}
