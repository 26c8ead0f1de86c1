//! Compiler for the Jack language, targeting the text form of the
//! Hack stack machine.
//!
//! Each source file holds exactly one class, and compiles to one
//! listing of VM instructions.
//!
//! ```
//! let vm = jackc::compile("class Main { function void main() { return; } }").unwrap();
//! assert_eq!(vm, "function Main.main 0\npush constant 0\nreturn\n");
//! ```
pub mod compile;
pub mod error;
pub mod lex;
pub mod parsing;

use std::io;

use compile::{CodeGen, CompilerConf};
use error::JackResult;

pub use parsing::parse_class;

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        compile,
        compile::{CompilerConf, IfLabels, OperatorOrder},
        compile_into, compile_with,
        error::{JackError, JackResult},
        lex::dump_tokens,
    };
}

/// Compile a source unit with the default configuration.
pub fn compile(source: impl AsRef<str>) -> JackResult<String> {
    compile_with(source, CompilerConf::default())
}

pub fn compile_with(source: impl AsRef<str>, conf: CompilerConf) -> JackResult<String> {
    let mut buf = Vec::new();
    compile_into(source, conf, &mut buf)?;
    String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
}

/// Compile a source unit, writing instructions to the given sink.
///
/// The whole unit is parsed before anything is written, but a
/// compile error part way through code generation leaves the
/// instructions emitted so far in the sink.
pub fn compile_into<W: io::Write>(source: impl AsRef<str>, conf: CompilerConf, out: W) -> JackResult<()> {
    let source = source.as_ref();

    // Syntactic analysis
    let class = parse_class(source)?;

    // Code generation
    CodeGen::new(source, conf, out).compile(&class)
}
