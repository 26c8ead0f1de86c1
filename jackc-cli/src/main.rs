//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use jackc::{prelude::*, IMPL_VERSION};
use log::{debug, error, info};

static USAGE: &str = r#"
usage: jackc CMD PATH [OPTIONS]

commands:
    compile   Compile a .jack file, or every .jack file in a directory.
              Each class is written next to its source as a .vm file.
    tokens    Print the token table of a .jack file

options:
    --nested-if-labels   Number if labels like the legacy toolchain
    --left-to-right      Apply operators as soon as their operands are pushed

examples:
    jackc compile Main.jack
    jackc compile Square/ --left-to-right
    jackc tokens Main.jack
"#;

/// Compile every unit, returning the number that failed.
fn run_compile(path: impl AsRef<Path>, conf: CompilerConf) -> JackResult<usize> {
    let sources = source_files(path.as_ref())?;
    if sources.is_empty() {
        error!("no .jack files in {}", path.as_ref().display());
        return Ok(1);
    }

    let mut failed = 0;
    let start = Instant::now();

    for filepath in &sources {
        debug!("compiling {}", filepath.display());
        let source = fs::read_to_string(filepath)?;

        // Nothing is written for a unit that fails.
        match compile_with(&source, conf) {
            Ok(vm) => {
                let outpath = filepath.with_extension("vm");
                fs::write(&outpath, vm)?;
                info!("wrote {}", outpath.display());
            }
            Err(err) => {
                error!("{}: {err}", filepath.display());
                failed += 1;
            }
        }
    }

    info!(
        "compiled {} of {} units in {}ms",
        sources.len() - failed,
        sources.len(),
        start.elapsed().as_nanos() as f64 / 1000000.0
    );

    Ok(failed)
}

/// The file itself, or the `.jack` files of a directory in name order.
fn source_files(path: &Path) -> JackResult<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = vec![];
    for entry in fs::read_dir(path)? {
        let filepath = entry?.path();
        if filepath.is_file() && filepath.extension().map_or(false, |ext| ext == "jack") {
            files.push(filepath);
        }
    }
    files.sort();

    Ok(files)
}

fn run_tokens(filepath: impl AsRef<Path>) -> JackResult<()> {
    let source = fs::read_to_string(filepath)?;
    let mut table = String::new();
    dump_tokens(&source, &mut table)?;
    print!("{table}");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Compile { path, conf }) => {
            if run_compile(path, conf)? > 0 {
                std::process::exit(1)
            }
        }
        Some(Cmd::Tokens { filepath }) => run_tokens(filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next()?.as_str() {
        "compile" => {
            let mut path = None;
            let mut conf = CompilerConf::default();

            for arg in args {
                match arg.as_str() {
                    "--nested-if-labels" => conf.if_labels = IfLabels::Nested,
                    "--left-to-right" => conf.operator_order = OperatorOrder::LeftToRight,
                    flag if flag.starts_with("--") => return None,
                    _ if path.is_none() => path = Some(arg.clone()),
                    _ => return None,
                }
            }

            Some(Cmd::Compile { path: path?, conf })
        }
        "tokens" => Some(Cmd::Tokens {
            filepath: args.next()?,
        }),
        _ => None,
    }
}

fn print_usage() {
    println!("jackc v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Compile a file or directory
    Compile { path: String, conf: CompilerConf },
    /// Print the token table
    Tokens { filepath: String },
}
