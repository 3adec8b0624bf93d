use super::{Decl, Expr, LVal, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    // LVal "=" Exp ";"
    Assign(LVal, Expr),
    // [Exp] ";"
    Expr(Option<Expr>),
    // Block
    Block(Block),
    // "return" [Exp] ";"
    Return(Option<Expr>),
    // "if" "(" Exp ")" Stmt ["else" Stmt]
    If {
        cond: Expr,
        then_stmt: Box<Stmt>,
        else_stmt: Option<Box<Stmt>>,
        span: Span,
    },
    // "while" "(" Exp ")" Stmt
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    // "break" ";"
    Break(Span),
    // "continue" ";"
    Continue(Span),
}

// BlockItem ::= Decl | Stmt;
#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Decl(Decl),
    Stmt(Stmt),
}

// Block ::= "{" {BlockItem} "}";
pub type Block = Vec<BlockItem>;
