use crate::CompilerError;
use koopa::ir::Value;
use std::collections::HashMap;

/// 单个函数的栈帧规划
///
/// 帧大小在进入函数时一次算定 (16 字节对齐), 之后的槽位分配是一个
/// 单调的 bump allocator:
///
/// ```text
/// +--------------------+ <- sp + frame_size
/// |     saved ra       |    (frame_size - 4)
/// +--------------------+
/// |   指令结果槽位 ...  |    (首次引用时从低往高分配)
/// +--------------------+ <- sp + arg_area
/// |  出参区 (>8 个参数) |
/// +--------------------+ <- sp
/// ```
pub struct StackPlan {
    frame_size: i32,
    arg_area: i32,
    used: i32,
    offsets: HashMap<Value, i32>,
}

impl StackPlan {
    pub fn new(frame_size: i32, arg_area: i32) -> Self {
        Self {
            frame_size,
            arg_area,
            used: arg_area,
            offsets: HashMap::new(),
        }
    }

    pub fn frame_size(&self) -> i32 {
        self.frame_size
    }

    /// 返回 value 的栈偏移, 第一次引用时分配一个 4 字节槽位
    pub fn slot_of(&mut self, value: Value) -> Result<i32, CompilerError> {
        if let Some(&offset) = self.offsets.get(&value) {
            return Ok(offset);
        }
        let offset = self.used;
        self.used += 4;
        // frame_size - 4 留给 ra
        if self.used > self.frame_size - 4 {
            return Err(CompilerError::Codegen(format!(
                "stack frame overflow: {} bytes used of {}",
                self.used, self.frame_size
            )));
        }
        self.offsets.insert(value, offset);
        Ok(offset)
    }
}
