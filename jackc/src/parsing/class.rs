//! Class declaration parsing.
use log::debug;

use super::{comma_separated, Ident, Parse, SubroutineDec, Type};
use crate::{
    error::JackResult,
    lex::{Keyword, TokenKind, TokenStream},
};

/// The single class of a source unit.
///
/// # Example
///
/// ```text
/// class Main {
///     static int count;
///     function void main() { return; }
/// }
/// ```
#[derive(Debug)]
pub struct Class {
    pub name: Ident,
    pub vars: Vec<ClassVarDec>,
    pub subroutines: Vec<SubroutineDec>,
}

/// # Example
///
/// ```text
/// field int x, y;
/// ```
#[derive(Debug)]
pub struct ClassVarDec {
    pub kind: ClassVarKind,
    pub ty: Type,
    pub names: Vec<Ident>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

impl Parse for Class {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        if !input.is_primed() {
            input.advance()?;
        }

        input.consume_keyword(Keyword::Class)?;
        let name = Ident::parse(input)?;
        debug!("parsing class {name}");
        input.consume(TokenKind::LeftBrace)?;

        let mut vars = vec![];
        let mut subroutines = vec![];

        loop {
            if input.is_class_var_start() {
                vars.push(ClassVarDec::parse(input)?);
            } else if input.is_subroutine_start() {
                subroutines.push(SubroutineDec::parse(input)?);
            } else if input.current().kind == TokenKind::RightBrace {
                break;
            } else {
                return Err(input
                    .unexpected("class variable, subroutine or '}'")
                    .into());
            }
        }
        input.consume(TokenKind::RightBrace)?;

        // One class per source unit.
        if input.has_more_tokens() {
            return Err(input.unexpected("end-of-file after class").into());
        }

        Ok(Class {
            name,
            vars,
            subroutines,
        })
    }
}

impl Parse for ClassVarDec {
    fn parse(input: &mut TokenStream) -> JackResult<Self> {
        let kind = match input.keyword() {
            Some(Keyword::Static) => ClassVarKind::Static,
            Some(Keyword::Field) => ClassVarKind::Field,
            _ => return Err(input.unexpected("'static' or 'field'").into()),
        };
        input.advance()?;

        let ty = Type::parse(input)?;
        let names = comma_separated(input)?;
        input.consume(TokenKind::Semicolon)?;

        Ok(ClassVarDec { kind, ty, names })
    }
}
