pub mod ast;
pub mod kir;

use crate::front::ast::CompUnit;
use crate::front::kir::{GenerateKir, IrContext};
use crate::utils::SourceMap;
use crate::CompilerError;

/// 把 AST 降级为 KIR 文本
pub fn generate_kir(ast: &CompUnit, source_map: Option<SourceMap>) -> Result<String, CompilerError> {
    let mut ctx = IrContext::new(source_map);
    ast.generate_kir(&mut ctx)?;
    Ok(ctx.into_output())
}
