//! Textual VM instruction output.
use std::{fmt, io};

use log::trace;

use super::symbol::SymbolKind;

/// Memory segments of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Local    => "local",
            Segment::Argument => "argument",
            Segment::Static   => "static",
            Segment::This     => "this",
            Segment::That     => "that",
            Segment::Pointer  => "pointer",
            Segment::Temp     => "temp",
        };
        f.write_str(name)
    }
}

/// Fields live in the object that `pointer 0` anchors.
impl From<SymbolKind> for Segment {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Static => Segment::Static,
            SymbolKind::Field => Segment::This,
            SymbolKind::Argument => Segment::Argument,
            SymbolKind::Local => Segment::Local,
        }
    }
}

/// Arithmetic and logical commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for Command {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Command::Add => "add",
            Command::Sub => "sub",
            Command::Neg => "neg",
            Command::Eq  => "eq",
            Command::Gt  => "gt",
            Command::Lt  => "lt",
            Command::And => "and",
            Command::Or  => "or",
            Command::Not => "not",
        };
        f.write_str(name)
    }
}

/// Writes one instruction per line.
///
/// Nothing is buffered here. Wrap the sink in a `BufWriter` when
/// writing to a file.
pub struct VmWriter<W> {
    out: W,
}

impl<W: io::Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments) -> io::Result<()> {
        trace!("{args}");
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.line(format_args!("push {segment} {index}"))
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.line(format_args!("pop {segment} {index}"))
    }

    pub fn write_arithmetic(&mut self, command: Command) -> io::Result<()> {
        self.line(format_args!("{command}"))
    }

    pub fn write_label(&mut self, label: impl fmt::Display) -> io::Result<()> {
        self.line(format_args!("label {label}"))
    }

    pub fn write_goto(&mut self, label: impl fmt::Display) -> io::Result<()> {
        self.line(format_args!("goto {label}"))
    }

    pub fn write_if_goto(&mut self, label: impl fmt::Display) -> io::Result<()> {
        self.line(format_args!("if-goto {label}"))
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) -> io::Result<()> {
        self.line(format_args!("call {name} {n_args}"))
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) -> io::Result<()> {
        self.line(format_args!("function {name} {n_locals}"))
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        self.line(format_args!("return"))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
