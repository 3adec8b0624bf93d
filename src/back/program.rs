use crate::back::insts::Instruction;

/// 整个后端的输出缓冲, 最后一次性 dump 成文本
pub struct AsmProgram {
    instructions: Vec<Instruction>,
}

impl AsmProgram {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    pub fn dump(&self) -> String {
        let mut text = String::new();
        for inst in &self.instructions {
            text.push_str(&inst.to_string());
            text.push('\n');
        }
        text
    }
}
