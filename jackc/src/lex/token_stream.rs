//! Token cursor with one token of look ahead.
use std::fmt::Display;

use super::{Keyword, Lexer, Span, Token, TokenKind};
use crate::error::{JackResult, SyntaxError};

/// Cursor over the lexer with a current token and a single lookahead token.
///
/// Tokens are lazily lexed. Each [`advance`](TokenStream::advance) shifts
/// the lookahead into the current slot and scans exactly one new token. The
/// first call scans twice to fill both slots.
///
/// The previous token is kept so the parser can tell where it is in a
/// qualified call without backtracking.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    prev: Option<Token>,
    current: Token,
    lookahead: Token,
    primed: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let original = lexer.source_code();
        let eof = Token {
            span: Span::new(original.len() as u32, 0),
            kind: TokenKind::EOF,
        };

        Self {
            original,
            lexer,
            prev: None,
            current: eof.clone(),
            lookahead: eof,
            primed: false,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Indicates whether the first [`advance`](TokenStream::advance) has happened.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Discard the current token, promote the lookahead to current,
    /// and scan the next token into the lookahead slot.
    ///
    /// Returns `true` while the current token is not the end-of-file.
    pub fn advance(&mut self) -> JackResult<bool> {
        if self.primed {
            let next = self.lexer.next_token()?;
            let current = std::mem::replace(&mut self.lookahead, next);
            self.prev = Some(std::mem::replace(&mut self.current, current));
        } else {
            self.current = self.lexer.next_token()?;
            self.lookahead = self.lexer.next_token()?;
            self.primed = true;
        }

        Ok(self.has_more_tokens())
    }

    /// Exactly one of "more tokens" and "end-of-stream" holds.
    #[inline]
    pub fn has_more_tokens(&self) -> bool {
        self.current.kind != TokenKind::EOF
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// The lookahead token, which has been scanned but not made current.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.lookahead
    }

    #[inline]
    pub fn previous_token(&self) -> Option<&Token> {
        self.prev.as_ref()
    }

    /// Helper function to extract the span's string fragment
    /// from the original source code.
    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.original)
    }

    /// Return the current token and advance the cursor.
    ///
    /// The current token must match the given token kind, otherwise
    /// a syntax error is returned and the cursor is not advanced.
    pub fn consume(&mut self, token_kind: TokenKind) -> JackResult<Token> {
        if self.current.kind != token_kind {
            return Err(self.unexpected(token_kind).into());
        }

        let token = self.current.clone();
        self.advance()?;
        Ok(token)
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Does not consume the token
    /// if the kinds do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> JackResult<bool> {
        if self.current.kind == token_kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[inline]
    pub fn consume_keyword(&mut self, keyword: Keyword) -> JackResult<Token> {
        self.consume(TokenKind::Keyword(keyword))
    }

    /// Build an error for the current token, which doesn't fit
    /// what the parser expected.
    #[cold]
    pub fn unexpected(&self, expected: impl Display) -> SyntaxError {
        SyntaxError::unexpected(self.original, &self.current, expected)
    }

    /// True when the token three positions back in the produced stream
    /// (counting the lookahead as the latest) is the member access `.`.
    ///
    /// When this holds, the current token is the subroutine name of a
    /// qualified call like `Output.printInt`.
    pub fn part_of_subroutine_call(&self) -> bool {
        matches!(self.prev, Some(Token { kind: TokenKind::Dot, .. }))
    }
}

/// Classification of the current token.
impl<'a> TokenStream<'a> {
    #[inline]
    pub fn keyword(&self) -> Option<Keyword> {
        match self.current.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    #[inline]
    pub fn identifier(&self) -> Option<&'a str> {
        match self.current.kind {
            TokenKind::Ident => Some(self.span_fragment(&self.current.span)),
            _ => None,
        }
    }

    /// Contents of a string constant, without the delimiters.
    pub fn string_const(&self) -> Option<&'a str> {
        match self.current.kind {
            TokenKind::String => {
                let text = self.span_fragment(&self.current.span);
                Some(&text[1..text.len() - 1])
            }
            _ => None,
        }
    }

    /// Text of an integer constant.
    ///
    /// The range isn't checked here.
    #[inline]
    pub fn int_const(&self) -> Option<&'a str> {
        match self.current.kind {
            TokenKind::Number => Some(self.span_fragment(&self.current.span)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.keyword() == Some(Keyword::Null)
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        self.keyword().map(|k| k.is_boolean()).unwrap_or(false)
    }

    #[inline]
    pub fn is_statement_start(&self) -> bool {
        self.keyword().map(|k| k.is_statement()).unwrap_or(false)
    }

    #[inline]
    pub fn is_class_var_start(&self) -> bool {
        matches!(self.keyword(), Some(Keyword::Static | Keyword::Field))
    }

    #[inline]
    pub fn is_subroutine_start(&self) -> bool {
        matches!(
            self.keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        )
    }

    #[inline]
    pub fn is_binary_op(&self) -> bool {
        self.current.kind.is_binary_op()
    }

    #[inline]
    pub fn is_unary_op(&self) -> bool {
        self.current.kind.is_unary_op()
    }
}
