use std::fmt;

use log::warn;
use smol_str::SmolStr;

use crate::parsing::Type;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: SmolStr,
    pub ty: Type,
    pub kind: SymbolKind,
    /// Position among the symbols of the same kind, counted from zero.
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    const COUNT: usize = 4;

    #[inline]
    fn slot(self) -> usize {
        match self {
            SymbolKind::Static => 0,
            SymbolKind::Field => 1,
            SymbolKind::Argument => 2,
            SymbolKind::Local => 3,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolKind::Static => write!(f, "static"),
            SymbolKind::Field => write!(f, "field"),
            SymbolKind::Argument => write!(f, "argument"),
            SymbolKind::Local => write!(f, "local"),
        }
    }
}

/// Variables of one scope, either a class or a subroutine.
///
/// Lookup is linear and the first definition of a name wins.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    counts: [u16; SymbolKind::COUNT],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new variable, taking the next index of its kind.
    ///
    /// Redefining a name isn't an error. The new symbol still takes an
    /// index, but lookups keep finding the earlier one.
    ///
    /// Returns `None` when every index of the kind is taken.
    pub fn define(&mut self, name: impl Into<SmolStr>, ty: Type, kind: SymbolKind) -> Option<&Symbol> {
        let count = &mut self.counts[kind.slot()];
        let index = *count;
        *count = count.checked_add(1)?;

        let name = name.into();
        if let Some(existing) = self.find(&name) {
            warn!(
                "redefinition of {} '{}' as {kind}, earlier definition shadows it",
                existing.kind, name
            );
        }

        self.symbols.push(Symbol { name, ty, kind, index });
        self.symbols.last()
    }

    /// Forget all symbols and restart every index at zero.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.counts = Default::default();
    }

    /// Number of variables of the given kind defined so far.
    #[inline]
    pub fn var_count(&self, kind: SymbolKind) -> usize {
        self.counts[kind.slot()] as usize
    }

    #[inline]
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name.as_str() == name)
    }

    #[inline]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.find(name).map(|symbol| symbol.kind)
    }

    #[inline]
    pub fn type_of(&self, name: &str) -> Option<&Type> {
        self.find(name).map(|symbol| &symbol.ty)
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.find(name).map(|symbol| symbol.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}
