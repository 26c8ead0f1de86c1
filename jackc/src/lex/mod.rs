//! Lexical analysis
mod cursor;
mod lexer;
mod token_stream;
mod tokens;

pub use self::{
    lexer::{dump_tokens, Lexer, LexerIter},
    token_stream::TokenStream,
    tokens::{escape_symbol, unescape_symbol, Category, Keyword, Span, Token, TokenKind},
};
