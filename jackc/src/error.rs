//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
};

use smol_str::SmolStr;

use crate::{
    compile::SymbolKind,
    lex::{Span, Token, TokenKind},
    parsing::MAX_INT,
};

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug)]
pub enum JackError {
    /// Source characters that don't form a valid token.
    Lex(LexError),
    /// Token stream doesn't match the grammar.
    Syntax(SyntaxError),
    /// Well formed source that can't be translated.
    Compile(CompileError),
    Io(io::Error),
    Fmt(fmt::Error),
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Syntax(err) => write!(f, "{err}"),
            Self::Compile(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Fmt(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for JackError {}

impl From<LexError> for JackError {
    fn from(err: LexError) -> Self {
        JackError::Lex(err)
    }
}

impl From<SyntaxError> for JackError {
    fn from(err: SyntaxError) -> Self {
        JackError::Syntax(err)
    }
}

impl From<CompileError> for JackError {
    fn from(err: CompileError) -> Self {
        JackError::Compile(err)
    }
}

impl From<io::Error> for JackError {
    fn from(err: io::Error) -> Self {
        JackError::Io(err)
    }
}

impl From<fmt::Error> for JackError {
    fn from(err: fmt::Error) -> Self {
        JackError::Fmt(err)
    }
}

/// Position in the source, with the surrounding line
/// kept for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl Location {
    pub fn new(source: &str, span: &Span) -> Self {
        let (text, _) = span.surrounding_line(source);
        Self {
            line: span.line(source),
            column: span.column(source),
            text: text.trim_end_matches('\r').to_owned(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Location { line, column, text } = self;
        let column = *column;
        let gutter = line.to_string().len();
        writeln!(f, "{:gutter$} |", "")?;
        writeln!(f, "{line} | {text}")?;
        write!(f, "{:gutter$} | {:>column$}", "", "^")
    }
}

#[derive(Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    /// Word that starts with a digit but isn't a number.
    MalformedIdentifier(String),
}

impl LexError {
    pub fn new(source: &str, span: &Span, kind: LexErrorKind) -> Self {
        Self {
            kind,
            location: Location::new(source, span),
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Location { line, column, .. } = &self.location;
        write!(f, "lexical error at {line}:{column}: ")?;
        match &self.kind {
            LexErrorKind::UnknownCharacter(c) => write!(f, "unknown character {c:?}")?,
            LexErrorKind::UnterminatedString => write!(f, "unterminated string constant")?,
            LexErrorKind::UnterminatedComment => write!(f, "unterminated block comment")?,
            LexErrorKind::MalformedIdentifier(word) => {
                write!(f, "identifiers can't start with a digit: {word}")?
            }
        }
        write!(f, "\n{}", self.location)
    }
}

#[derive(Debug)]
pub struct SyntaxError {
    pub message: String,
    pub location: Location,
}

impl SyntaxError {
    pub fn new(source: &str, span: &Span, message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            location: Location::new(source, span),
        }
    }

    /// Error for a token that doesn't fit the production being parsed.
    pub fn unexpected(source: &str, token: &Token, expected: impl Display) -> Self {
        let message = match token.kind {
            TokenKind::EOF => format!("unexpected end-of-file, expected {expected}"),
            _ => format!("unexpected token '{}', expected {expected}", token.span.fragment(source)),
        };
        Self::new(source, &token.span, message)
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Location { line, column, .. } = &self.location;
        write!(f, "syntax error at {line}:{column}: {}\n{}", self.message, self.location)
    }
}

#[derive(Debug)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// Variable is declared in neither the subroutine nor the class.
    UndefinedSymbol(SmolStr),
    /// Character whose code isn't a valid integer constant.
    CharOutOfRange(char),
    /// String constant with more characters than an integer constant can count.
    StringTooLong(usize),
    /// Scope already holds the most variables of one kind that can be indexed.
    TooManyVariables(SymbolKind),
}

impl CompileError {
    pub fn new(source: &str, span: &Span, kind: CompileErrorKind) -> Self {
        Self {
            kind,
            location: Location::new(source, span),
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Location { line, column, .. } = &self.location;
        write!(f, "compile error at {line}:{column}: ")?;
        match &self.kind {
            CompileErrorKind::UndefinedSymbol(name) => write!(f, "undefined variable '{name}'")?,
            CompileErrorKind::CharOutOfRange(c) => {
                write!(f, "character {c:?} is outside the constant range 0..={MAX_INT}")?
            }
            CompileErrorKind::StringTooLong(len) => {
                write!(f, "string constant of {len} characters is longer than {MAX_INT}")?
            }
            CompileErrorKind::TooManyVariables(kind) => {
                write!(f, "too many {kind} variables, at most {} per scope", u16::MAX)?
            }
        }
        write!(f, "\n{}", self.location)
    }
}
