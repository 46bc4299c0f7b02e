use std::fs;

use anyhow::{Context, Result, bail};
use rill::diagnostics::Reporter;
use rill::interpreter::Interpreter;
use rill::lexer::Lexer;
use rill::parser::Parser;
use rill::semantic::SemanticAnalyzer;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(input_path) = args.next() else {
        bail!("Usage: rill <source_file>");
    };
    if args.next().is_some() {
        bail!("Only one input file is supported");
    }

    let source = fs::read_to_string(&input_path).with_context(|| format!("Reading {input_path}"))?;
    let source = source.strip_prefix('\u{feff}').unwrap_or(&source);

    let mut reporter = Reporter::new();
    let program = Parser::new(Lexer::new(source), &mut reporter).parse_program();
    SemanticAnalyzer::new(&mut reporter).analyze(&program);

    let mut interpreter = Interpreter::new();
    let result = interpreter.run(&program);

    for line in interpreter.output() {
        println!("{line}");
    }
    if let Err(error) = result {
        reporter.report(error);
    }
    for message in reporter.messages() {
        eprintln!("{message}");
    }

    // Diagnostics never change the exit code; only startup failures do.
    Ok(())
}
