use crate::back::frame::StackPlan;
use crate::back::insts::{Instruction, Reg};
use crate::back::program::AsmProgram;
use crate::CompilerError;
use koopa::ir::{BasicBlock, Value};
use std::collections::HashMap;

/// 可用作临时寄存器的池子, 按这个顺序分配
const SCRATCH: [Reg; 15] = [
    Reg::T0, Reg::T1, Reg::T2, Reg::T3, Reg::T4, Reg::T5, Reg::T6,
    Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7,
];

/// 汇编生成上下文
///
/// 每条 KIR 指令独立降级: 操作数按需装入临时寄存器, 结果写回栈,
/// 指令结束时释放所有寄存器, 所以一个池子就够用, 指令之间没有
/// 寄存器依赖
pub struct Context {
    pub program: AsmProgram,
    /// 函数名 -> 栈帧规划
    plans: HashMap<String, StackPlan>,
    current_func: String,
    /// 值 -> 当前占用的寄存器
    value_reg: HashMap<Value, Reg>,
    reg_used: HashMap<Reg, bool>,
    /// 全局 alloc -> 重命名后的外部符号 global_var_<k>
    globals: HashMap<Value, String>,
    next_global_id: usize,
    /// 基本块 -> 汇编标签 (KIR 名去掉前导记号)
    pub bb_labels: HashMap<BasicBlock, String>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            program: AsmProgram::new(),
            plans: HashMap::new(),
            current_func: String::new(),
            value_reg: HashMap::new(),
            reg_used: HashMap::new(),
            globals: HashMap::new(),
            next_global_id: 0,
            bb_labels: HashMap::new(),
        }
    }

    pub fn enter_function(&mut self, name: &str, plan: StackPlan) -> Result<(), CompilerError> {
        if self.plans.contains_key(name) {
            return Err(CompilerError::Codegen(format!(
                "function `{}` is defined more than once",
                name
            )));
        }
        self.plans.insert(name.to_string(), plan);
        self.current_func = name.to_string();
        self.value_reg.clear();
        self.reg_used.clear();
        self.bb_labels.clear();
        Ok(())
    }

    pub fn plan(&self) -> Result<&StackPlan, CompilerError> {
        self.plans
            .get(&self.current_func)
            .ok_or_else(|| CompilerError::Codegen("no stack plan for current function".to_string()))
    }

    pub fn plan_mut(&mut self) -> Result<&mut StackPlan, CompilerError> {
        self.plans
            .get_mut(&self.current_func)
            .ok_or_else(|| CompilerError::Codegen("no stack plan for current function".to_string()))
    }

    //////////////////////////////////////////
    // 寄存器池
    //////////////////////////////////////////

    /// 给 value 分配一个空闲的临时寄存器; 重复分配是硬错误
    pub fn allocate_reg(&mut self, value: Value) -> Result<Reg, CompilerError> {
        if self.value_reg.contains_key(&value) {
            return Err(CompilerError::Codegen(format!(
                "register already allocated for value {:?}",
                value
            )));
        }
        for reg in SCRATCH {
            if !self.reg_used.get(&reg).copied().unwrap_or(false) {
                self.reg_used.insert(reg, true);
                self.value_reg.insert(value, reg);
                return Ok(reg);
            }
        }
        Err(CompilerError::Codegen(
            "register exhaustion: all scratch registers are occupied".to_string(),
        ))
    }

    /// 立即数 0 直接映射到硬件零寄存器, 不占用池子
    pub fn bind_zero(&mut self, value: Value) -> Result<Reg, CompilerError> {
        if self.value_reg.contains_key(&value) {
            return Err(CompilerError::Codegen(format!(
                "register already allocated for value {:?}",
                value
            )));
        }
        self.value_reg.insert(value, Reg::X0);
        Ok(Reg::X0)
    }

    pub fn reg_of(&self, value: Value) -> Result<Reg, CompilerError> {
        self.value_reg.get(&value).copied().ok_or_else(|| {
            CompilerError::Codegen(format!("no register allocated for value {:?}", value))
        })
    }

    pub fn free_reg(&mut self, value: Value) -> Result<(), CompilerError> {
        let reg = self.reg_of(value)?;
        self.value_reg.remove(&value);
        if reg != Reg::X0 {
            self.reg_used.insert(reg, false);
        }
        Ok(())
    }

    /// 窥视一个空闲寄存器但不占用, 给超范围偏移的展开序列用
    pub fn new_temp_reg(&self) -> Result<Reg, CompilerError> {
        for reg in SCRATCH {
            if !self.reg_used.get(&reg).copied().unwrap_or(false) {
                return Ok(reg);
            }
        }
        Err(CompilerError::Codegen(
            "register exhaustion: no free scratch register".to_string(),
        ))
    }

    //////////////////////////////////////////
    // 全局变量重命名
    //////////////////////////////////////////

    pub fn register_global(&mut self, value: Value) -> String {
        let name = format!("global_var_{}", self.next_global_id);
        self.next_global_id += 1;
        self.globals.insert(value, name.clone());
        name
    }

    pub fn global_name(&self, value: Value) -> Option<String> {
        self.globals.get(&value).cloned()
    }

    //////////////////////////////////////////
    // 标签与栈指针
    //////////////////////////////////////////

    pub fn label_of(&self, bb: BasicBlock) -> Result<String, CompilerError> {
        self.bb_labels.get(&bb).cloned().ok_or_else(|| {
            CompilerError::Codegen(format!("basic block {:?} not found in label map", bb))
        })
    }

    /// 调整栈指针, 偏移超出 imm12 范围时用 li + add 合成
    pub fn adjust_sp(&mut self, delta: i32) -> Result<(), CompilerError> {
        if (-2048..2048).contains(&delta) {
            self.program.push(Instruction::Addi(Reg::Sp, Reg::Sp, delta));
        } else {
            let temp = self.new_temp_reg()?;
            self.program.push(Instruction::Li(temp, delta));
            self.program.push(Instruction::Add(Reg::Sp, Reg::Sp, temp));
        }
        Ok(())
    }
}
