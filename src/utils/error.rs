use std::fmt;

/// 整个编译流水线共用的错误类型, 所有错误都是致命的
#[derive(Debug)]
pub enum CompilerError {
    // I/O 错误
    Io(std::io::Error),
    // 命令行参数错误
    Args(String),
    // 词法/语法错误
    Parse(String),
    // AST 降级到 KIR 阶段的错误
    Lowering(String),
    // KIR 降级到汇编阶段的错误
    Codegen(String),
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompilerError::Io(e) => write!(f, "I/O error: {}", e),
            CompilerError::Args(msg) => write!(f, "argument error: {}", msg),
            CompilerError::Parse(msg) => write!(f, "parse error: {}", msg),
            CompilerError::Lowering(msg) => write!(f, "lowering error: {}", msg),
            CompilerError::Codegen(msg) => write!(f, "code generation error: {}", msg),
        }
    }
}

impl std::error::Error for CompilerError {}

impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::Io(err)
    }
}

// 前端的便捷转换
impl From<String> for CompilerError {
    fn from(msg: String) -> Self {
        CompilerError::Lowering(msg)
    }
}

impl From<&str> for CompilerError {
    fn from(msg: &str) -> Self {
        CompilerError::Lowering(msg.to_string())
    }
}
