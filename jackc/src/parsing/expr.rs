//! Expressions.
use std::fmt;

use super::{comma_separated, Ident, Parse};
use crate::{
    error::{JackResult, SyntaxError},
    lex::{Keyword, Span, TokenKind, TokenStream},
};

/// Largest integer constant the target machine accepts.
pub const MAX_INT: u16 = 32767;

/// Operands joined by binary operators.
///
/// There is no precedence. The tail keeps operators in the order
/// they appear in the source.
///
/// # Example
///
/// ```text
/// 1 + -x * (y - 2)
/// ```
#[derive(Debug)]
pub struct Expr {
    pub head: Operand,
    pub tail: Vec<(BinaryOp, Operand)>,
}

/// Term with its leading unary operators.
#[derive(Debug)]
pub struct Operand {
    /// Unary operators in source order, outermost first.
    pub unary: Vec<UnaryOp>,
    pub term: Term,
}

#[derive(Debug)]
pub enum Term {
    IntConst(u16),
    /// Contents without the quotes, and the span of the whole constant.
    StringConst(String, Span),
    Keyword(KeywordConst),
    Var(Ident),
    Index { array: Ident, index: Box<Expr> },
    Call(SubroutineCall),
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordConst {
    True,
    False,
    Null,
    This,
}

/// # Example
///
/// ```text
/// draw()
/// game.run()
/// Output.printInt(1 + 2)
/// ```
#[derive(Debug)]
pub struct SubroutineCall {
    /// Variable or class name before the `.`.
    pub receiver: Option<Ident>,
    pub name: Ident,
    pub args: ExprList,
}

/// Arguments between parentheses, possibly empty.
#[derive(Debug, Default)]
pub struct ExprList {
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    And, // &
    Or,  // |
    Lt,  // <
    Gt,  // >
    Eq,  // =
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum UnaryOp {
    Neg, // -
    Not, // ~
}

impl BinaryOp {
    #[rustfmt::skip]
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::Plus    => Some(BinaryOp::Add),
            T::Minus   => Some(BinaryOp::Sub),
            T::Star    => Some(BinaryOp::Mul),
            T::Slash   => Some(BinaryOp::Div),
            T::Amp     => Some(BinaryOp::And),
            T::Pipe    => Some(BinaryOp::Or),
            T::Less    => Some(BinaryOp::Lt),
            T::Greater => Some(BinaryOp::Gt),
            T::Eq      => Some(BinaryOp::Eq),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::And => '&',
            BinaryOp::Or  => '|',
            BinaryOp::Lt  => '<',
            BinaryOp::Gt  => '>',
            BinaryOp::Eq  => '=',
        };
        write!(f, "{c}")
    }
}

impl Parse for Expr {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let head = Operand::parse(input)?;

        let mut tail = vec![];
        while input.is_binary_op() {
            let op = BinaryOp::from_token(input.current().kind)
                .ok_or_else(|| input.unexpected("binary operator"))?;
            input.advance()?;
            tail.push((op, Operand::parse(input)?));
        }

        Ok(Expr { head, tail })
    }
}

impl Parse for Operand {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        // Any operator in operand position is unary.
        let mut unary = vec![];
        while input.is_unary_op() {
            let op = match input.current().kind {
                TokenKind::Tilde => UnaryOp::Not,
                _ => UnaryOp::Neg,
            };
            input.advance()?;
            unary.push(op);
        }

        let term = Term::parse(input)?;
        Ok(Operand { unary, term })
    }
}

impl Parse for Term {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        use TokenKind as T;

        if let Some(text) = input.int_const() {
            let value = match text.parse::<u16>() {
                Ok(value) if value <= MAX_INT => value,
                _ => {
                    let message = format!("integer constant {text} is out of range 0..={MAX_INT}");
                    let span = &input.current().span;
                    return Err(SyntaxError::new(input.source_code(), span, message).into());
                }
            };
            input.advance()?;
            return Ok(Term::IntConst(value));
        }

        if let Some(text) = input.string_const() {
            let token = input.consume(T::String)?;
            return Ok(Term::StringConst(text.to_owned(), token.span));
        }

        let constant = if input.is_boolean() {
            match input.keyword() {
                Some(Keyword::True) => Some(KeywordConst::True),
                _ => Some(KeywordConst::False),
            }
        } else if input.is_null() {
            Some(KeywordConst::Null)
        } else if input.keyword() == Some(Keyword::This) {
            Some(KeywordConst::This)
        } else {
            None
        };
        if let Some(constant) = constant {
            input.advance()?;
            return Ok(Term::Keyword(constant));
        }

        if input.identifier().is_some() {
            return match input.peek().kind {
                T::LeftBracket => {
                    let array = Ident::parse(input)?;
                    input.consume(T::LeftBracket)?;
                    let index = Expr::parse(input)?;
                    input.consume(T::RightBracket)?;
                    Ok(Term::Index {
                        array,
                        index: Box::new(index),
                    })
                }
                T::LeftParen | T::Dot => SubroutineCall::parse(input).map(Term::Call),
                _ => Ident::parse(input).map(Term::Var),
            };
        }

        if input.match_token(T::LeftParen)? {
            let expr = Expr::parse(input)?;
            input.consume(T::RightParen)?;
            return Ok(Term::Paren(Box::new(expr)));
        }

        Err(input.unexpected("term").into())
    }
}

impl Parse for SubroutineCall {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let first = Ident::parse(input)?;
        input.match_token(TokenKind::Dot)?;

        let (receiver, name) = if input.part_of_subroutine_call() {
            (Some(first), Ident::parse(input)?)
        } else {
            (None, first)
        };

        let args = ExprList::parse(input)?;

        Ok(SubroutineCall {
            receiver,
            name,
            args,
        })
    }
}

impl Parse for ExprList {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume(TokenKind::LeftParen)?;

        let exprs = if input.current().kind == TokenKind::RightParen {
            vec![]
        } else {
            comma_separated(input)?
        };

        input.consume(TokenKind::RightParen)?;
        Ok(ExprList { exprs })
    }
}

impl ExprList {
    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::JackError, lex::Lexer};

    fn parse_expr(source: &str) -> JackResult<Expr> {
        let mut input = TokenStream::new(Lexer::new(source));
        input.advance()?;
        Expr::parse(&mut input)
    }

    #[test]
    fn test_flat_binary_chain() {
        let expr = parse_expr("1 + 2 * 3").unwrap();
        assert!(matches!(expr.head.term, Term::IntConst(1)));
        let ops: Vec<_> = expr.tail.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, [BinaryOp::Add, BinaryOp::Mul]);
    }

    #[test]
    fn test_unary_in_operand_position() {
        let expr = parse_expr("x - -~y").unwrap();
        assert!(expr.head.unary.is_empty());
        let (op, operand) = &expr.tail[0];
        assert_eq!(*op, BinaryOp::Sub);
        assert_eq!(operand.unary, [UnaryOp::Neg, UnaryOp::Not]);
        assert!(matches!(&operand.term, Term::Var(ident) if ident.name == "y"));
    }

    #[test]
    fn test_terms() {
        let expr = parse_expr(r#"a[i + 1] = "txt""#).unwrap();
        assert!(matches!(&expr.head.term, Term::Index { array, .. } if array.name == "a"));
        assert!(matches!(&expr.tail[0].1.term, Term::StringConst(s, _) if s == "txt"));

        let expr = parse_expr("(true & ~null) | this").unwrap();
        assert!(matches!(expr.head.term, Term::Paren(_)));
        assert!(matches!(expr.tail[0].1.term, Term::Keyword(KeywordConst::This)));
    }

    #[test]
    fn test_keyword_constants() {
        let expr = parse_expr("true | false | null | this").unwrap();
        let constants: Vec<_> = std::iter::once(&expr.head)
            .chain(expr.tail.iter().map(|(_, operand)| operand))
            .map(|operand| match operand.term {
                Term::Keyword(constant) => constant,
                ref other => panic!("expected keyword constant, found {other:?}"),
            })
            .collect();
        assert_eq!(
            constants,
            [KeywordConst::True, KeywordConst::False, KeywordConst::Null, KeywordConst::This]
        );

        // Other keywords aren't terms.
        match parse_expr("1 + while") {
            Err(JackError::Syntax(err)) => assert!(err.message.ends_with("expected term"), "{}", err.message),
            other => panic!("expected syntax error, found {other:?}"),
        }
    }

    #[test]
    fn test_subroutine_calls() {
        let expr = parse_expr("draw()").unwrap();
        match expr.head.term {
            Term::Call(call) => {
                assert!(call.receiver.is_none());
                assert_eq!(call.name.name, "draw");
                assert!(call.args.is_empty());
            }
            other => panic!("expected call, found {other:?}"),
        }

        let expr = parse_expr("Output.printInt(1, x + 2, f())").unwrap();
        match expr.head.term {
            Term::Call(call) => {
                assert_eq!(call.receiver.map(|r| r.name), Some("Output".into()));
                assert_eq!(call.name.name, "printInt");
                assert_eq!(call.args.len(), 3);
            }
            other => panic!("expected call, found {other:?}"),
        }
    }

    #[test]
    fn test_integer_range() {
        let expr = parse_expr("32767").unwrap();
        assert!(matches!(expr.head.term, Term::IntConst(MAX_INT)));

        for text in ["32768", "99999999"] {
            match parse_expr(text) {
                Err(JackError::Syntax(err)) => assert!(err.message.contains("out of range")),
                other => panic!("expected syntax error, found {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_term() {
        assert!(parse_expr("1 + ;").is_err());
        assert!(parse_expr("Output.(1)").is_err());
    }
}
