//! Tokens

use std::{borrow::Cow, fmt};

#[derive(Debug, Clone)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

impl Token {
    /// Text of the token, with markup characters escaped.
    ///
    /// String constants keep their delimiters.
    pub fn text<'a>(&self, source: &'a str) -> Cow<'a, str> {
        match self.kind.symbol_char().and_then(escape_symbol) {
            Some(escaped) => Cow::Borrowed(escaped),
            None => Cow::Borrowed(self.span.fragment(source)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum TokenKind {
    // Symbols
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Amp,          // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// Integer constant
    Number,
    /// String constant, including its delimiters
    String,

    // ------------------------------------------------------------------------
    // Special
    /// End-of-file
    EOF,
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Keyword,
    Symbol,
    IntConst,
    StringConst,
    Identifier,
    EndOfSource,
}

impl fmt::Display for Category {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keyword     => write!(f, "keyword"),
            Self::Symbol      => write!(f, "symbol"),
            Self::IntConst    => write!(f, "integerConstant"),
            Self::StringConst => write!(f, "stringConstant"),
            Self::Identifier  => write!(f, "identifier"),
            Self::EndOfSource => write!(f, "end-of-source"),
        }
    }
}

impl TokenKind {
    /// Single character symbol.
    #[rustfmt::skip]
    pub fn from_symbol(c: char) -> Option<Self> {
        use TokenKind as TK;
        match c {
            '{' => Some(TK::LeftBrace),
            '}' => Some(TK::RightBrace),
            '(' => Some(TK::LeftParen),
            ')' => Some(TK::RightParen),
            '[' => Some(TK::LeftBracket),
            ']' => Some(TK::RightBracket),
            '.' => Some(TK::Dot),
            ',' => Some(TK::Comma),
            ';' => Some(TK::Semicolon),
            '+' => Some(TK::Plus),
            '-' => Some(TK::Minus),
            '*' => Some(TK::Star),
            '/' => Some(TK::Slash),
            '&' => Some(TK::Amp),
            '|' => Some(TK::Pipe),
            '<' => Some(TK::Less),
            '>' => Some(TK::Greater),
            '=' => Some(TK::Eq),
            '~' => Some(TK::Tilde),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn symbol_char(&self) -> Option<char> {
        use TokenKind as TK;
        match self {
            TK::LeftBrace    => Some('{'),
            TK::RightBrace   => Some('}'),
            TK::LeftParen    => Some('('),
            TK::RightParen   => Some(')'),
            TK::LeftBracket  => Some('['),
            TK::RightBracket => Some(']'),
            TK::Dot          => Some('.'),
            TK::Comma        => Some(','),
            TK::Semicolon    => Some(';'),
            TK::Plus         => Some('+'),
            TK::Minus        => Some('-'),
            TK::Star         => Some('*'),
            TK::Slash        => Some('/'),
            TK::Amp          => Some('&'),
            TK::Pipe         => Some('|'),
            TK::Less         => Some('<'),
            TK::Greater      => Some('>'),
            TK::Eq           => Some('='),
            TK::Tilde        => Some('~'),
            _ => None,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            TokenKind::Ident => Category::Identifier,
            TokenKind::Keyword(_) => Category::Keyword,
            TokenKind::Number => Category::IntConst,
            TokenKind::String => Category::StringConst,
            TokenKind::EOF => Category::EndOfSource,
            _ => Category::Symbol,
        }
    }

    /// Binary operators of the expression grammar.
    #[inline]
    pub fn is_binary_op(&self) -> bool {
        use TokenKind as TK;
        matches!(
            self,
            TK::Plus | TK::Minus | TK::Star | TK::Slash | TK::Amp | TK::Pipe | TK::Less | TK::Greater | TK::Eq
        )
    }

    #[inline]
    pub fn is_unary_op(&self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Tilde)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Keyword(keyword) => write!(f, "'{keyword}'"),
            TokenKind::Number => write!(f, "integer constant"),
            TokenKind::String => write!(f, "string constant"),
            TokenKind::EOF => write!(f, "end-of-file"),
            symbol => match symbol.symbol_char() {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "{symbol:?}"),
            },
        }
    }
}

/// Escaped form of the characters that collide with markup.
#[rustfmt::skip]
pub fn escape_symbol(c: char) -> Option<&'static str> {
    match c {
        '<'  => Some("&lt;"),
        '>'  => Some("&gt;"),
        '"'  => Some("&quot;"),
        '&'  => Some("&amp;"),
        _ => None,
    }
}

/// Inverse of [`escape_symbol`].
#[rustfmt::skip]
pub fn unescape_symbol(text: &str) -> Option<char> {
    match text {
        "&lt;"   => Some('<'),
        "&gt;"   => Some('>'),
        "&quot;" => Some('"'),
        "&amp;"  => Some('&'),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.index as usize + self.size as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// Line number, starting at 1, where the span begins.
    pub fn line(&self, text: &str) -> usize {
        let end = usize::min(self.index as usize, text.len());
        text[..end].matches('\n').count() + 1
    }

    /// Column, starting at 1 and counted in characters, where the span begins.
    pub fn column(&self, text: &str) -> usize {
        let end = usize::min(self.index as usize, text.len());
        let line_start = text[..end].rfind('\n').map(|i| i + 1).unwrap_or(0);
        text[line_start..end].chars().count() + 1
    }

    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        const NEWLINE: char = '\n';
        const RETURN: char = '\r';

        let mut chars = text.char_indices().peekable();
        let mut start = 0;
        let mut end = text.len();

        while let Some((i, c)) = chars.next() {
            if i < self.index as usize {
                if c == NEWLINE {
                    // Span not found yet, move the starting cursor to the next line.
                    if chars.peek().map(|(_, c)| *c) == Some(RETURN) {
                        chars.next();
                    }

                    match chars.peek() {
                        Some((i, _)) => start = *i,
                        None => start = text.len(),
                    }
                }
            } else if c == NEWLINE {
                end = i;
                break;
            }
        }

        let line_span = Span {
            index: start as u32,
            size: end as u32 - start as u32,
        };

        (&text[start..end], line_span)
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Program structure
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,

    // ------------------------------------------------------------------------
    // Types
    Int,
    Char,
    Boolean,
    Void,

    // ------------------------------------------------------------------------
    // Constants
    True,
    False,
    Null,
    This,

    // ------------------------------------------------------------------------
    // Statements
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "class"       => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function"    => Some(Self::Function),
            "method"      => Some(Self::Method),
            "field"       => Some(Self::Field),
            "static"      => Some(Self::Static),
            "var"         => Some(Self::Var),
            // ----------------------------------------------------------------
            "int"         => Some(Self::Int),
            "char"        => Some(Self::Char),
            "boolean"     => Some(Self::Boolean),
            "void"        => Some(Self::Void),
            // ----------------------------------------------------------------
            "true"        => Some(Self::True),
            "false"       => Some(Self::False),
            "null"        => Some(Self::Null),
            "this"        => Some(Self::This),
            // ----------------------------------------------------------------
            "let"         => Some(Self::Let),
            "do"          => Some(Self::Do),
            "if"          => Some(Self::If),
            "else"        => Some(Self::Else),
            "while"       => Some(Self::While),
            "return"      => Some(Self::Return),
            // ----------------------------------------------------------------
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        }
    }

    #[inline]
    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Let | Self::Do | Self::If | Self::While | Self::Return)
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::True | Self::False)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "let x = 42;";

        let spans = &[
            Span::new(0, 3),  // let
            Span::new(4, 1),  // x
            Span::new(6, 1),  // =
            Span::new(8, 2),  // 42
            Span::new(10, 1), // ;
        ];

        assert_eq!(spans[0].fragment(CODE), "let");
        assert_eq!(spans[1].fragment(CODE), "x");
        assert_eq!(spans[2].fragment(CODE), "=");
        assert_eq!(spans[3].fragment(CODE), "42");
        assert_eq!(spans[4].fragment(CODE), ";");
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line() {
        const CODE: &str = "------------\n....here....\n------------";

        let span = Span::new(17, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(line_span, Span { index: 13, size: 12 });
    }

    #[test]
    fn test_span_surrounding_full_text() {
        const CODE: &str = "....here....";

        let span = Span::new(4, 4);
        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(line_span, Span { index: 0, size: 12 });
    }

    #[test]
    fn test_span_line_and_column() {
        const CODE: &str = "class Main {\n  field int x;\n}";

        let span = Span::new(25, 1);
        assert_eq!(span.fragment(CODE), "x");
        assert_eq!(span.line(CODE), 2);
        assert_eq!(span.column(CODE), 13);
    }

    #[test]
    fn test_escaped_symbols_round_trip() {
        for c in ['<', '>', '"', '&'] {
            let escaped = escape_symbol(c).unwrap();
            assert_ne!(escaped.len(), 1);
            assert_eq!(unescape_symbol(escaped), Some(c));
        }

        assert_eq!(escape_symbol('+'), None);
        assert_eq!(unescape_symbol("+"), None);
    }

    #[test]
    fn test_symbol_kinds_round_trip() {
        for c in "{}()[].,;+-*/&|<>=~".chars() {
            let kind = TokenKind::from_symbol(c).unwrap();
            assert_eq!(kind.symbol_char(), Some(c));
            assert_eq!(kind.category(), Category::Symbol);
        }
        assert_eq!(TokenKind::from_symbol('#'), None);
    }

    #[test]
    fn test_keyword_parse() {
        assert_eq!(Keyword::parse("constructor"), Some(Keyword::Constructor));
        assert_eq!(Keyword::parse("while"), Some(Keyword::While));
        assert_eq!(Keyword::parse("While"), None);
        assert_eq!(Keyword::parse(Keyword::Boolean.as_str()), Some(Keyword::Boolean));
        assert!(Keyword::Return.is_statement());
        assert!(!Keyword::Else.is_statement());
    }
}
