//! Statement parsing.
use super::{Expr, Ident, Parse, SubroutineCall};
use crate::{
    error::JackResult,
    lex::{Keyword, TokenKind, TokenStream},
};

/// Sequence of zero or more statements.
///
/// Parsing stops at the first token that can't start a statement,
/// which is left for the caller to consume.
#[derive(Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Let(LetStmt),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    Return(ReturnStmt),
}

/// # Example
///
/// ```text
/// let a[i] = x + 1;
/// ```
#[derive(Debug)]
pub struct LetStmt {
    pub target: Ident,
    pub index: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
}

#[derive(Debug)]
pub struct DoStmt {
    pub call: SubroutineCall,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

impl Parse for Block {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let mut stmts = vec![];
        while input.is_statement_start() {
            stmts.push(Stmt::parse(input)?);
        }
        Ok(Block { stmts })
    }
}

impl Parse for Stmt {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        use Keyword as K;

        match input.keyword() {
            Some(K::Let) => LetStmt::parse(input).map(Stmt::Let),
            Some(K::If) => IfStmt::parse(input).map(Stmt::If),
            Some(K::While) => WhileStmt::parse(input).map(Stmt::While),
            Some(K::Do) => DoStmt::parse(input).map(Stmt::Do),
            Some(K::Return) => ReturnStmt::parse(input).map(Stmt::Return),
            _ => Err(input.unexpected("statement").into()),
        }
    }
}

/// Block between braces.
fn braced_block(input: &mut TokenStream) -> JackResult<Block> {
    input.consume(TokenKind::LeftBrace)?;
    let block = Block::parse(input)?;
    if input.current().kind != TokenKind::RightBrace {
        return Err(input.unexpected("statement or '}'").into());
    }
    input.advance()?;
    Ok(block)
}

/// Expression between parentheses.
fn paren_expr(input: &mut TokenStream) -> JackResult<Expr> {
    input.consume(TokenKind::LeftParen)?;
    let expr = Expr::parse(input)?;
    input.consume(TokenKind::RightParen)?;
    Ok(expr)
}

impl Parse for LetStmt {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume_keyword(Keyword::Let)?;
        let target = Ident::parse(input)?;

        let index = if input.match_token(TokenKind::LeftBracket)? {
            let index = Expr::parse(input)?;
            input.consume(TokenKind::RightBracket)?;
            Some(index)
        } else {
            None
        };

        input.consume(TokenKind::Eq)?;
        let value = Expr::parse(input)?;
        input.consume(TokenKind::Semicolon)?;

        Ok(LetStmt {
            target,
            index,
            value,
        })
    }
}

impl Parse for IfStmt {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume_keyword(Keyword::If)?;
        let cond = paren_expr(input)?;
        let then_block = braced_block(input)?;

        let else_block = if input.match_token(TokenKind::Keyword(Keyword::Else))? {
            Some(braced_block(input)?)
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_block,
            else_block,
        })
    }
}

impl Parse for WhileStmt {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume_keyword(Keyword::While)?;
        let cond = paren_expr(input)?;
        let body = braced_block(input)?;
        Ok(WhileStmt { cond, body })
    }
}

impl Parse for DoStmt {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume_keyword(Keyword::Do)?;
        let call = SubroutineCall::parse(input)?;
        input.consume(TokenKind::Semicolon)?;
        Ok(DoStmt { call })
    }
}

impl Parse for ReturnStmt {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume_keyword(Keyword::Return)?;

        let value = if input.current().kind == TokenKind::Semicolon {
            None
        } else {
            Some(Expr::parse(input)?)
        };
        input.consume(TokenKind::Semicolon)?;

        Ok(ReturnStmt { value })
    }
}
