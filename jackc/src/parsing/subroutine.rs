//! Subroutine declarations.
use log::debug;

use super::{comma_separated, Block, Ident, Parse, Type};
use crate::{
    error::JackResult,
    lex::{Keyword, TokenKind, TokenStream},
};

/// # Example
///
/// ```text
/// method int distance(Point other) {
///     var int dx, dy;
///     ...
/// }
/// ```
#[derive(Debug)]
pub struct SubroutineDec {
    pub kind: SubroutineKind,
    /// Declared return type, `None` for `void`.
    pub return_ty: Option<Type>,
    pub name: Ident,
    pub params: ParameterList,
    pub body: SubroutineBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// Parameters between parentheses, possibly empty.
#[derive(Debug, Default)]
pub struct ParameterList {
    pub params: Vec<Param>,
}

#[derive(Debug)]
pub struct Param {
    pub ty: Type,
    pub name: Ident,
}

#[derive(Debug)]
pub struct SubroutineBody {
    pub vars: Vec<VarDec>,
    pub block: Block,
}

/// # Example
///
/// ```text
/// var Array a, b;
/// ```
#[derive(Debug)]
pub struct VarDec {
    pub ty: Type,
    pub names: Vec<Ident>,
}

impl Parse for SubroutineDec {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let kind = match input.keyword() {
            Some(Keyword::Constructor) => SubroutineKind::Constructor,
            Some(Keyword::Function) => SubroutineKind::Function,
            Some(Keyword::Method) => SubroutineKind::Method,
            _ => return Err(input.unexpected("'constructor', 'function' or 'method'").into()),
        };
        input.advance()?;

        let return_ty = if input.match_token(TokenKind::Keyword(Keyword::Void))? {
            None
        } else {
            Some(Type::parse(input)?)
        };

        let name = Ident::parse(input)?;
        debug!("parsing {kind:?} {name}");
        let params = ParameterList::parse(input)?;
        let body = SubroutineBody::parse(input)?;

        Ok(SubroutineDec {
            kind,
            return_ty,
            name,
            params,
            body,
        })
    }
}

impl Parse for ParameterList {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume(TokenKind::LeftParen)?;

        let params = if input.current().kind == TokenKind::RightParen {
            vec![]
        } else {
            comma_separated(input)?
        };

        input.consume(TokenKind::RightParen)?;
        Ok(ParameterList { params })
    }
}

impl Parse for Param {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let ty = Type::parse(input)?;
        let name = Ident::parse(input)?;
        Ok(Param { ty, name })
    }
}

impl Parse for SubroutineBody {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume(TokenKind::LeftBrace)?;

        let mut vars = vec![];
        while input.keyword() == Some(Keyword::Var) {
            vars.push(VarDec::parse(input)?);
        }

        let block = Block::parse(input)?;
        if input.current().kind != TokenKind::RightBrace {
            return Err(input.unexpected("statement or '}'").into());
        }
        input.advance()?;

        Ok(SubroutineBody { vars, block })
    }
}

impl Parse for VarDec {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        input.consume_keyword(Keyword::Var)?;
        let ty = Type::parse(input)?;
        let names = comma_separated(input)?;
        input.consume(TokenKind::Semicolon)?;

        Ok(VarDec { ty, names })
    }
}

impl SubroutineBody {
    /// Number of locals declared across all `var` lines.
    pub fn local_count(&self) -> usize {
        self.vars.iter().map(|dec| dec.names.len()).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parsing::parse_class;

    #[test]
    fn test_parse_subroutines() {
        const CODE: &str = r#"
        class Point {
            constructor Point new(int ax, int ay) { return this; }
            method void dispose() { do Memory.deAlloc(this); return; }
            function int twice(int n) {
                var int a, b;
                var boolean c;
                return n + n;
            }
        }
        "#;
        let class = parse_class(CODE).unwrap();
        let subs = &class.subroutines;
        assert_eq!(subs.len(), 3);

        assert_eq!(subs[0].kind, SubroutineKind::Constructor);
        assert_eq!(subs[0].return_ty, Some(Type::Class("Point".into())));
        assert_eq!(subs[0].params.params.len(), 2);
        assert_eq!(subs[0].params.params[1].name.name, "ay");

        assert_eq!(subs[1].kind, SubroutineKind::Method);
        assert_eq!(subs[1].return_ty, None);
        assert!(subs[1].params.params.is_empty());
        assert_eq!(subs[1].body.block.stmts.len(), 2);

        assert_eq!(subs[2].name.name, "twice");
        assert_eq!(subs[2].body.local_count(), 3);
    }

    #[test]
    fn test_missing_return_type() {
        assert!(parse_class("class A { function main() { return; } }").is_err());
    }
}
