use crate::front::ast::{DataType, Span};
use crate::utils::SourceMap;
use crate::CompilerError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 一次求值的结果: 立即数或 SSA 风格的临时值, 外加两个控制流标志
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Imm(i32),
    Temp(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct Value {
    pub kind: ValueKind,
    /// 下方所有路径都已经 return
    pub flow_returned: bool,
    /// 下方所有路径都已经 break/continue
    pub loop_interrupted: bool,
}

impl Value {
    pub fn imm(value: i32) -> Self {
        Value {
            kind: ValueKind::Imm(value),
            flow_returned: false,
            loop_interrupted: false,
        }
    }

    /// 不产生计算结果的语句的缺省返回值
    pub fn unit() -> Self {
        Value::imm(0)
    }

    pub fn returned() -> Self {
        Value {
            flow_returned: true,
            ..Value::unit()
        }
    }

    pub fn interrupted() -> Self {
        Value {
            loop_interrupted: true,
            ..Value::unit()
        }
    }

    pub fn as_imm(&self) -> Option<i32> {
        match self.kind {
            ValueKind::Imm(v) => Some(v),
            ValueKind::Temp(_) => None,
        }
    }

    /// 控制流是否已经离开当前位置 (return 或 break/continue)
    pub fn diverted(&self) -> bool {
        self.flow_returned || self.loop_interrupted
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ValueKind::Imm(v) => write!(f, "{}", v),
            ValueKind::Temp(n) => write!(f, "%{}", n),
        }
    }
}

/// 符号表里的一个绑定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Symbol {
    Const(i32),
    Var,
}

/// 解析结果: 变量带上它被找到的层级, 用于渲染 @name_<depth>
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    Const(i32),
    Var { depth: usize },
}

/// 一层循环的跳转目标
#[derive(Debug, Clone)]
pub struct LoopLabels {
    pub continue_label: String,
    pub break_label: String,
}

/// 前端降级的全部共享状态: 作用域栈、单调计数器、循环栈和输出缓冲
pub struct IrContext {
    out: String,
    scopes: Vec<HashMap<String, Symbol>>,
    // (名字, 层级) -> 该层已经输出过 alloc
    allocated: HashSet<(String, usize)>,
    next_temp: u32,
    if_count: u32,
    while_count: u32,
    land_count: u32,
    lor_count: u32,
    loop_stack: Vec<LoopLabels>,
    /// 函数表: 函数名 -> 返回类型 (调用点据此决定是否接收结果)
    pub func_table: HashMap<String, DataType>,
    pub source_map: Option<SourceMap>,
}

impl IrContext {
    pub fn new(source_map: Option<SourceMap>) -> Self {
        Self {
            out: String::new(),
            // 最外层是全局作用域 (层级 1)
            scopes: vec![HashMap::new()],
            allocated: HashSet::new(),
            next_temp: 0,
            if_count: 0,
            while_count: 0,
            land_count: 0,
            lor_count: 0,
            loop_stack: Vec::new(),
            func_table: HashMap::new(),
            source_map,
        }
    }

    pub fn error_at_span(&self, message: impl Into<String>, span: Span) -> CompilerError {
        let mut msg = message.into();
        if let Some(sm) = &self.source_map {
            msg = format!("{} at {}", msg, sm.format_location(span.begin));
        }
        CompilerError::Lowering(msg)
    }

    //////////////////////////////////////////
    // 作用域
    //////////////////////////////////////////

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn leave_scope(&mut self) -> Result<(), CompilerError> {
        self.scopes
            .pop()
            .ok_or_else(|| CompilerError::Lowering("cannot leave scope: scope stack is empty".to_string()))?;
        Ok(())
    }

    /// 当前作用域深度, 1 起始; 全局作用域是 1, 函数体是 2
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_global(&self) -> bool {
        self.scopes.len() == 1
    }

    /// 在当前作用域中绑定一个符号, 同一作用域内重复声明是错误
    pub fn bind(&mut self, name: String, symbol: Symbol) -> Result<(), CompilerError> {
        let frame = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompilerError::Lowering("cannot bind: scope stack is empty".to_string()))?;
        if frame.contains_key(&name) {
            return Err(CompilerError::Lowering(format!(
                "`{}` is already declared in this scope",
                name
            )));
        }
        frame.insert(name, symbol);
        Ok(())
    }

    /// 从内向外查找符号; 变量返回它被找到的层级
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        for (idx, frame) in self.scopes.iter().enumerate().rev() {
            if let Some(symbol) = frame.get(name) {
                return Some(match symbol {
                    Symbol::Const(v) => Resolved::Const(*v),
                    Symbol::Var => Resolved::Var { depth: idx + 1 },
                });
            }
        }
        None
    }

    //////////////////////////////////////////
    // alloc 去重
    //////////////////////////////////////////

    /// 记录当前层级已经为 name 输出过 alloc
    ///
    /// 函数入口层和全局层 (层级 <= 2) 不做记录: 每个函数都必须
    /// 重新为自己的局部变量分配空间
    pub fn mark_allocated(&mut self, name: &str) {
        if self.depth() <= 2 {
            return;
        }
        self.allocated.insert((name.to_string(), self.depth()));
    }

    pub fn was_allocated(&self, name: &str) -> bool {
        self.allocated.contains(&(name.to_string(), self.depth()))
    }

    /// 逐函数清空 alloc 记录, 兄弟函数之间互不影响
    pub fn reset_function_allocations(&mut self) {
        self.allocated.clear();
    }

    //////////////////////////////////////////
    // 循环栈
    //////////////////////////////////////////

    pub fn push_loop(&mut self, continue_label: String, break_label: String) {
        self.loop_stack.push(LoopLabels {
            continue_label,
            break_label,
        });
    }

    pub fn pop_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn current_loop(&self) -> Option<&LoopLabels> {
        self.loop_stack.last()
    }

    //////////////////////////////////////////
    // 计数器
    //////////////////////////////////////////

    pub fn fresh_temp(&mut self) -> Value {
        let value = Value {
            kind: ValueKind::Temp(self.next_temp),
            flow_returned: false,
            loop_interrupted: false,
        };
        self.next_temp += 1;
        value
    }

    pub fn next_if(&mut self) -> u32 {
        self.if_count += 1;
        self.if_count
    }

    pub fn next_while(&mut self) -> u32 {
        self.while_count += 1;
        self.while_count
    }

    pub fn next_land(&mut self) -> u32 {
        self.land_count += 1;
        self.land_count
    }

    pub fn next_lor(&mut self) -> u32 {
        self.lor_count += 1;
        self.lor_count
    }

    //////////////////////////////////////////
    // 文本输出
    //////////////////////////////////////////

    /// 输出一条缩进的指令
    pub fn inst(&mut self, text: &str) {
        self.out.push_str("  ");
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// 输出一个基本块标签
    pub fn label(&mut self, name: &str) {
        self.out.push_str(name);
        self.out.push_str(":\n");
    }

    /// 输出一行顶层文本 (decl / global / fun / "}")
    pub fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn into_output(self) -> String {
        self.out
    }
}
