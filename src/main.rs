use koopa::front::Driver;
use koopa::ir::Type;
use lalrpop_util::lexer::Token;
use lalrpop_util::{lalrpop_mod, ParseError};
use std::fs::read_to_string;

mod back;
mod front;
mod utils;

use crate::back::generate_asm;
use crate::front::generate_kir;
use utils::args::Params;
use utils::logger::print_error_and_exit;
use utils::SourceMap;

pub use utils::CompilerError;

// lalrpop 生成的解析器, 语法在 src/grammar.lalrpop 里
lalrpop_mod!(pub grammar);

fn main() {
    if let Err(e) = run() {
        print_error_and_exit(&e, 1);
    }
}

fn format_expected(expected: Vec<String>) -> String {
    if expected.is_empty() {
        "no expected tokens".to_string()
    } else {
        expected.join(", ")
    }
}

fn format_parse_error(source_map: &SourceMap, err: ParseError<usize, Token<'_>, &str>) -> String {
    match err {
        ParseError::InvalidToken { location } => {
            format!("invalid token at {}", source_map.format_location(location))
        }
        ParseError::UnrecognizedEof { location, expected } => {
            format!(
                "unexpected end of file at {}, expected: {}",
                source_map.format_location(location),
                format_expected(expected)
            )
        }
        ParseError::UnrecognizedToken { token, expected } => {
            let (start, token, _end) = token;
            format!(
                "unrecognized token {:?} at {}, expected: {}",
                token,
                source_map.format_location(start),
                format_expected(expected)
            )
        }
        ParseError::ExtraToken { token } => {
            let (start, token, _end) = token;
            format!(
                "extra token {:?} at {}",
                token,
                source_map.format_location(start)
            )
        }
        ParseError::User { error } => error.to_string(),
    }
}

fn run() -> Result<(), CompilerError> {
    let params = Params::from_args()?;

    let input = read_to_string(&params.input)?;
    let source_map = SourceMap::new(&input);

    let ast = grammar::CompUnitParser::new()
        .parse(&input)
        .map_err(|e| CompilerError::Parse(format_parse_error(&source_map, e)))?;

    let kir = generate_kir(&ast, Some(source_map))?;

    if params.koopa {
        std::fs::write(&params.output, kir)?;
        return Ok(());
    }

    if params.riscv {
        // 目标是 riscv32, 指针按 4 字节计
        Type::set_ptr_size(4);

        // 把刚输出的 KIR 文本交给 koopa 重建为内存里的程序图
        let program = Driver::from(kir).generate_program().map_err(|_| {
            CompilerError::Codegen("emitted KIR was rejected by the IR parser".to_string())
        })?;

        let asm = generate_asm(&program)?;
        std::fs::write(&params.output, asm)?;
    }
    Ok(())
}
