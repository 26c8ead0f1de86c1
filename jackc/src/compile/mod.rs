//! Translation of a parsed class into VM instructions.
mod codegen;
mod labels;
mod symbol;
mod vm_writer;

pub use self::{
    codegen::CodeGen,
    labels::{Label, LabelAllocator, LabelKind},
    symbol::{Symbol, SymbolKind, SymbolTable},
    vm_writer::{Command, Segment, VmWriter},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compiler configuration parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompilerConf {
    pub if_labels: IfLabels,
    pub operator_order: OperatorOrder,
}

/// Numbering scheme for the labels of `if` statements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IfLabels {
    /// Every `if` in a subroutine takes a fresh number.
    #[default]
    Unique,
    /// Sibling statements share a number, and an `if` directly inside a
    /// branch of another takes the next one. Matches the output of the
    /// legacy toolchain, including its label collisions.
    Nested,
}

/// Order in which the operators of an expression are applied.
///
/// Operands are always pushed left to right.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OperatorOrder {
    /// Collect every operator, unary included, and apply them last seen
    /// first after all operands are pushed.
    #[default]
    Deferred,
    /// Apply each operator as soon as its right operand is pushed.
    LeftToRight,
}
