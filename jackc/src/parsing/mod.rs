//! Syntactic analysis.
//!
//! Recursive descent with one token of look ahead. Every production has a
//! node type implementing [`Parse`]. On entry the current token is the
//! first token of the production, and on a successful return the
//! production's last token has been consumed.
mod class;
mod expr;
mod ident;
mod stmts;
mod subroutine;

pub use self::{
    class::{Class, ClassVarDec, ClassVarKind},
    expr::{BinaryOp, Expr, ExprList, KeywordConst, Operand, SubroutineCall, Term, UnaryOp, MAX_INT},
    ident::{Ident, Type},
    stmts::{Block, DoStmt, IfStmt, LetStmt, ReturnStmt, Stmt, WhileStmt},
    subroutine::{Param, ParameterList, SubroutineBody, SubroutineDec, SubroutineKind, VarDec},
};

use crate::{
    error::JackResult,
    lex::{Lexer, TokenKind, TokenStream},
};

pub trait Parse: Sized {
    fn parse(input: &mut TokenStream) -> JackResult<Self>;
}

/// Parse the single class of a source unit.
pub fn parse_class(source: &str) -> JackResult<Class> {
    let mut stream = TokenStream::new(Lexer::new(source));
    Class::parse(&mut stream)
}

/// Parse one or more items separated by commas.
fn comma_separated<T: Parse>(input: &mut TokenStream) -> JackResult<Vec<T>> {
    let mut items = vec![T::parse(input)?];

    while input.match_token(TokenKind::Comma)? {
        items.push(T::parse(input)?);
    }

    Ok(items)
}
