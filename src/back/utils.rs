use crate::back::context::Context;
use crate::back::insts::{Instruction, Reg};
use crate::CompilerError;

/// sw reg 到 sp+offset, 偏移超出 imm12 范围时用 li + add 合成地址
pub fn store_reg_with_offset(ctx: &mut Context, reg: Reg, offset: i32) -> Result<(), CompilerError> {
    if (-2048..2048).contains(&offset) {
        ctx.program.push(Instruction::Sw(reg, offset, Reg::Sp));
    } else {
        let addr = ctx.new_temp_reg()?;
        ctx.program.push(Instruction::Li(addr, offset));
        ctx.program.push(Instruction::Add(addr, addr, Reg::Sp));
        ctx.program.push(Instruction::Sw(reg, 0, addr));
    }
    Ok(())
}

/// lw 从 sp+offset 到 reg, 同样处理超范围偏移
pub fn load_reg_with_offset(ctx: &mut Context, reg: Reg, offset: i32) -> Result<(), CompilerError> {
    if (-2048..2048).contains(&offset) {
        ctx.program.push(Instruction::Lw(reg, offset, Reg::Sp));
    } else {
        let addr = ctx.new_temp_reg()?;
        ctx.program.push(Instruction::Li(addr, offset));
        ctx.program.push(Instruction::Add(addr, addr, Reg::Sp));
        ctx.program.push(Instruction::Lw(reg, 0, addr));
    }
    Ok(())
}
