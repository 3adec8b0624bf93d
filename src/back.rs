//! 后端: 把 koopa 解析出的 KIR 程序翻译成 RISC-V (rv32im) 汇编
//!
//! - `asm`: 逐指令的翻译逻辑
//! - `context`: 临时寄存器池、栈帧规划表、全局变量重命名
//! - `frame`: 单个函数的栈帧规划
//! - `insts`: RISC-V 指令定义和文本化
//! - `program`: 输出缓冲
//! - `utils`: 超出 imm12 范围的访存辅助

pub mod asm;
pub mod context;
pub mod frame;
pub mod insts;
pub mod program;
pub mod utils;

use crate::back::asm::GenerateAsm;
use crate::back::context::Context;
use crate::CompilerError;
use koopa::ir::Program;

/// 从 KIR 程序生成 RISC-V 汇编文本
pub fn generate_asm(program: &Program) -> Result<String, CompilerError> {
    let mut ctx = Context::new();
    program.generate(program, &mut ctx)?;
    Ok(ctx.program.dump())
}
