//! Lexical analysis
use std::fmt::Write as FmtWrite;

use log::trace;

use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{Keyword, Span, Token, TokenKind},
};
use crate::error::{JackResult, LexError, LexErrorKind};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.next();

        let start_pos = cursor.offset();

        Self {
            cursor,
            original: source_code,
            start_pos,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// ## Implementation
    ///
    /// Each iteration starts with the assumption that the internal cursor
    /// is pointing to the start of the remaining source to be consumed.
    ///
    /// When an iteration is done building a token, it must leave the cursor
    /// at the first character after the token. Words and numbers are scanned
    /// by peeking, so the character that ends them is never consumed and is
    /// available to the next iteration.
    pub fn next_token(&mut self) -> JackResult<Token> {
        use TokenKind as TK;

        self.erase_trivia()?;

        self.start_token();

        let token = match self.cursor.current() {
            '"' => self.consume_string()?,
            c if is_letter_or_digit(c) => self.consume_word()?,
            EOF_CHAR if self.cursor.at_end() => self.make_token(TK::EOF),
            c => match TokenKind::from_symbol(c) {
                Some(kind) => self.make_token(kind),
                None => {
                    let span = Span::new(self.start_pos, c.len_utf8() as u32);
                    return Err(LexError::new(self.original, &span, LexErrorKind::UnknownCharacter(c)).into());
                }
            },
        };

        trace!("token {:?} {:?}", token.kind, token.span.fragment(self.original));

        Ok(token)
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.peek_offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);
        let size = end - start;

        Span { index: start, size }
    }

    fn fragment(&self) -> &'a str {
        self.make_span().fragment(self.original)
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Build a token, using the source text from the position
    /// stored by [`start_token`](struct.Lexer.html#fn-start_token) to the
    /// current cursor position.
    ///
    /// Also prepare the cursor for the next iteration.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            span: self.make_span(),
            kind,
        };

        // Position the cursor to the starting character for the
        // next token, so the lexer's internal state is primed
        // for the next iteration.
        self.cursor.next();
        debug_assert_eq!(self.cursor.offset(), token.span.end());

        token
    }

    #[cold]
    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError::new(self.original, &self.make_span(), kind)
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Skip whitespace and comments until the cursor rests on
    /// the first character of a token, or the end of the source.
    fn erase_trivia(&mut self) -> JackResult<()> {
        loop {
            if self.cursor.current().is_whitespace() {
                self.cursor.next();
                continue;
            }

            if self.cursor.current() == '/' {
                match self.cursor.peek() {
                    '/' => {
                        self.erase_line_comment();
                        continue;
                    }
                    '*' => {
                        self.erase_block_comment()?;
                        continue;
                    }
                    _ => {}
                }
            }

            return Ok(());
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        debug_assert_eq!(self.cursor.current(), '/');

        while !is_newline(self.cursor.current()) && !self.cursor.at_end() {
            self.cursor.next();
        }
    }

    /// Erase a `/* ... */` comment, including documentation comments
    /// starting with `/**`. Block comments don't nest.
    fn erase_block_comment(&mut self) -> JackResult<()> {
        debug_assert_eq!(self.cursor.current(), '/');
        self.start_token();

        // Opening `/*`
        self.cursor.next();
        self.cursor.next();

        loop {
            if self.cursor.at_end() {
                return Err(self.error(LexErrorKind::UnterminatedComment).into());
            }

            if self.cursor.current() == '*' && self.cursor.peek() == '/' {
                // Closing `*/`
                self.cursor.next();
                self.cursor.next();
                return Ok(());
            }

            self.cursor.next();
        }
    }

    /// Make a string constant token, delimiters included.
    fn consume_string(&mut self) -> JackResult<Token> {
        debug_assert_eq!(self.cursor.current(), '"');

        loop {
            let c = self.cursor.next();

            if self.cursor.at_end() || is_newline(c) {
                return Err(self.error(LexErrorKind::UnterminatedString).into());
            }

            if c == '"' {
                return Ok(self.make_token(TokenKind::String));
            }
        }
    }

    /// Make a keyword, identifier or integer constant token
    /// from the longest run of letters, digits and underscores.
    fn consume_word(&mut self) -> JackResult<Token> {
        debug_assert!(is_letter_or_digit(self.cursor.current()));

        while is_letter_or_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        let fragment = self.fragment();

        let token_kind = if fragment.chars().all(is_digit) {
            TokenKind::Number
        } else if fragment.starts_with(is_digit) {
            return Err(self.error(LexErrorKind::MalformedIdentifier(fragment.to_owned())).into());
        } else {
            match Keyword::parse(fragment) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Ident,
            }
        };

        Ok(self.make_token(token_kind))
    }
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = JackResult<Token>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields tokens up to and including the EOF token, and
/// stops after the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = JackResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        match &result {
            Ok(token) => self.done = token.kind == TokenKind::EOF,
            Err(_) => self.done = true,
        }
        Some(result)
    }
}

/// Write a table of the tokens in the source, one per line.
///
/// Markup characters are printed in their escaped form.
pub fn dump_tokens<W: FmtWrite>(source: &str, w: &mut W) -> JackResult<()> {
    writeln!(w, " offset:len  category         text")?;

    for result in Lexer::new(source) {
        let token = result?;
        let offset = token.span.index;
        let len = token.span.size;
        let category = token.kind.category().to_string(); // padding is ignored by Display of enums
        let text = token.text(source);
        writeln!(w, "{offset:7}:{len: <3} {category: <16} {text}")?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokens::Category;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .into_iter()
            .map(|result| result.unwrap().kind)
            .collect()
    }

    fn fragments(source: &str) -> Vec<String> {
        Lexer::new(source)
            .into_iter()
            .map(|result| result.unwrap())
            .filter(|token| token.kind != TokenKind::EOF)
            .map(|token| token.span.fragment(source).to_owned())
            .collect()
    }

    #[test]
    fn test_words_are_not_split_or_merged() {
        assert_eq!(
            fragments("let count=count+1;"),
            vec!["let", "count", "=", "count", "+", "1", ";"]
        );
        assert_eq!(fragments("a_b1 _c"), vec!["a_b1", "_c"]);
        assert_eq!(fragments("x[i]"), vec!["x", "[", "i", "]"]);
    }

    #[test]
    fn test_categories() {
        use TokenKind as TK;

        assert_eq!(
            kinds("class Foo { 12 \"hi\" < }"),
            vec![
                TK::Keyword(Keyword::Class),
                TK::Ident,
                TK::LeftBrace,
                TK::Number,
                TK::String,
                TK::Less,
                TK::RightBrace,
                TK::EOF,
            ]
        );
        assert_eq!(TK::String.category(), Category::StringConst);
    }

    #[test]
    fn test_comments_are_skipped() {
        const SOURCE: &str = r#"
            /** API documentation
             *  spanning lines */
            let x = 1; // trailing comment
            // full line comment
            /* block */ do y();
            return a / b;
        "#;

        assert_eq!(
            fragments(SOURCE),
            vec!["let", "x", "=", "1", ";", "do", "y", "(", ")", ";", "return", "a", "/", "b", ";"]
        );
    }

    #[test]
    fn test_comment_at_end_of_source() {
        assert_eq!(fragments("return; // done"), vec!["return", ";"]);
        assert_eq!(fragments("return; /* done */"), vec!["return", ";"]);
    }

    #[test]
    fn test_string_constant() {
        const SOURCE: &str = r#"do Output.printString("Hello, world!");"#;

        let tokens = Lexer::new(SOURCE)
            .into_iter()
            .collect::<JackResult<Vec<_>>>()
            .unwrap();
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.span.fragment(SOURCE), "\"Hello, world!\"");
    }

    #[test]
    fn test_escaped_text() {
        const SOURCE: &str = "a < b & c > d";

        let texts = Lexer::new(SOURCE)
            .into_iter()
            .map(|result| result.unwrap().text(SOURCE).into_owned())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["a", "&lt;", "b", "&amp;", "c", "&gt;", "d", ""]);
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new("let x = 1; /* never closed");
        let err = (0..10).find_map(|_| lexer.next_token().err()).unwrap();
        match err {
            crate::error::JackError::Lex(err) => assert_eq!(err.kind, LexErrorKind::UnterminatedComment),
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let result = Lexer::new("\"abc\nlet").next_token();
        assert!(matches!(
            result,
            Err(crate::error::JackError::Lex(LexError {
                kind: LexErrorKind::UnterminatedString,
                ..
            }))
        ));
    }

    #[test]
    fn test_unknown_character() {
        let result = Lexer::new("#").next_token();
        assert!(matches!(
            result,
            Err(crate::error::JackError::Lex(LexError {
                kind: LexErrorKind::UnknownCharacter('#'),
                ..
            }))
        ));
    }

    #[test]
    fn test_malformed_identifier() {
        let result = Lexer::new("3d").next_token();
        assert!(matches!(
            result,
            Err(crate::error::JackError::Lex(LexError {
                kind: LexErrorKind::MalformedIdentifier(_),
                ..
            }))
        ));
    }

    #[test]
    fn test_dump_tokens() {
        let mut buf = String::new();
        dump_tokens("x < 1", &mut buf).unwrap();
        let lines = buf.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("symbol"));
        assert!(lines[2].ends_with("&lt;"));
        assert!(lines[3].contains("integerConstant"));
    }
}
