//! The `coolc` command line driver.
//!
//! Reads one or more Cool source files (or stdin, named `<stdin>`, if none
//! are given), concatenates their classes into a single [`coolc::coolast::Program`]
//! sharing one [`coolc::context::CompilerContext`], and runs the pipeline in
//! order: parse, semantic analysis, type checking, code generation. The
//! driver halts before the next phase as soon as a phase reports any
//! diagnostics, so a syntax error never produces a confusing cascade of
//! semantic or type errors from a half-built AST.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info, LevelFilter};

use coolc::context::CompilerContext;
use coolc::{codegen, parser, pretty, semant, typecheck};

/// Compile Cool source files to MIPS/SPIM assembly.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Source files to compile. Reads stdin (named `<stdin>`) if none are given.
    files: Vec<PathBuf>,

    /// Write the generated assembly here (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity. Repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the pretty-printed AST instead of compiling.
    #[arg(long)]
    dump_ast: bool,

    /// Print the token stream as JSON instead of compiling.
    #[arg(long)]
    dump_tokens: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .expect("logger is only initialized once");

    let sources = match read_sources(&cli.files) {
        Ok(sources) => sources,
        Err(err) => {
            eprintln!("coolc: {err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.dump_tokens {
        return dump_tokens(&sources);
    }

    let mut ctx = CompilerContext::new();
    let mut program = coolc::coolast::Program::new();

    for (filename, source) in &sources {
        debug!("parsing {filename}");
        if let Some(parsed) = parser::parse_file(filename, source, &mut ctx) {
            program.extend(parsed);
        }
    }

    if ctx.diagnostics.has_errors() {
        return report_and_fail(&ctx);
    }

    if cli.dump_ast {
        print!("{}", pretty::print_program(&program));
        return ExitCode::SUCCESS;
    }

    info!("running semantic analysis");
    let map = semant::analyze(&mut program, &mut ctx);
    if ctx.diagnostics.has_errors() {
        return report_and_fail(&ctx);
    }

    info!("type checking");
    typecheck::check(&program, &map, &mut ctx);
    if ctx.diagnostics.has_errors() {
        return report_and_fail(&ctx);
    }

    info!("generating assembly");
    let assembly = codegen::generate(&program, &map, &mut ctx);

    match write_output(cli.output.as_deref(), &assembly) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("coolc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn report_and_fail(ctx: &CompilerContext) -> ExitCode {
    for diagnostic in ctx.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    ExitCode::FAILURE
}

fn read_sources(files: &[PathBuf]) -> io::Result<Vec<(String, String)>> {
    if files.is_empty() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(vec![("<stdin>".to_string(), source)]);
    }

    files
        .iter()
        .map(|path| {
            let source = fs::read_to_string(path)?;
            Ok((path.to_string_lossy().into_owned(), source))
        })
        .collect()
}

fn write_output(output: Option<&std::path::Path>, assembly: &str) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, assembly),
        None => io::stdout().write_all(assembly.as_bytes()),
    }
}

fn dump_tokens(sources: &[(String, String)]) -> ExitCode {
    let mut all = Vec::new();
    for (filename, source) in sources {
        match parser::dump_tokens(source) {
            Ok(tokens) => all.push((filename.clone(), tokens)),
            Err(message) => {
                eprintln!("{filename}: {message}");
                return ExitCode::FAILURE;
            }
        }
    }
    match serde_json::to_string_pretty(&all) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("coolc: failed to serialize tokens: {err}");
            ExitCode::FAILURE
        }
    }
}
