use std::fmt;

use smol_str::SmolStr;

use super::Parse;
use crate::{
    error::JackResult,
    lex::{Keyword, Span, TokenKind, TokenStream},
};

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: SmolStr,
    pub span: Span,
}

impl Parse for Ident {
    #[inline]
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let token = input.consume(TokenKind::Ident)?;
        let name = SmolStr::from(input.span_fragment(&token.span));
        Ok(Ident { name, span: token.span })
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declared type of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Boolean,
    /// Object of the named class.
    Class(SmolStr),
}

impl Parse for Type {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let ty = match input.current().kind {
            TokenKind::Keyword(Keyword::Int) => Type::Int,
            TokenKind::Keyword(Keyword::Char) => Type::Char,
            TokenKind::Keyword(Keyword::Boolean) => Type::Boolean,
            TokenKind::Ident => return Ident::parse(input).map(|ident| Type::Class(ident.name)),
            _ => return Err(input.unexpected("a type").into()),
        };
        input.advance()?;
        Ok(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Boolean => write!(f, "boolean"),
            Type::Class(name) => write!(f, "{name}"),
        }
    }
}
