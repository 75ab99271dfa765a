//! lbt - run a Lambdatron source file (or stdin) to its last value
//!
//! # Usage
//!
//! ```bash
//! lbt examples.lbt
//! echo '(+ 1 2)' | lbt
//! ```

use std::io::Read as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;

use lambdatron::{print, Interpreter};

/// Run a Lambdatron source file and print its last value
#[derive(Parser, Debug)]
#[command(name = "lbt")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file to run (reads stdin if omitted)
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let source = read_source(args.file.as_ref())?;

    let mut interp = Interpreter::new();
    match interp.evaluate(&source) {
        lambdatron::EvalResult::Success(value) => {
            let rendered = print::pr_str(&value, interp.context())
                .context("failed to print the result")?;
            println!("{rendered}");
            Ok(())
        }
        lambdatron::EvalResult::ReadFailure(e) => anyhow::bail!("{e}"),
        lambdatron::EvalResult::EvalFailure(e) => anyhow::bail!("{e}"),
    }
}

fn read_source(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
