use std::fs::read_to_string;
use std::io::Write;
use std::path::Path;
use std::process::exit;
use std::{env, io};

use thiserror::Error;

use crate::scanner::{tokenize, ScanningError};

mod scanner;
mod token;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("file does not seem to exist {0}")]
    FileDoesNotExist(String),
}

fn main() -> Result<(), color_eyre::eyre::Error> {
    color_eyre::install()?;

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        println!("Usage: budget [script]");
        exit(64);
    }
    if args.len() == 2 {
        run_file(&args[1])?;
    } else {
        run_prompt()?;
    }
    Ok(())
}

fn run_file(path_string: &str) -> Result<(), CliError> {
    let path = Path::new(path_string);
    if !path.try_exists()? {
        return Err(CliError::FileDoesNotExist(path_string.to_string()));
    }
    let source = read_to_string(path)?;
    if run(&source) {
        exit(65);
    }
    Ok(())
}

fn run_prompt() -> Result<(), CliError> {
    fn prompt() {
        print!("> ");
        io::stdout().flush().unwrap();
    }

    prompt();
    for line in io::stdin().lines() {
        // a bad line must not poison the next one; every run gets a fresh
        // diagnostics list so there is nothing to reset
        run(&line?);
        prompt();
    }
    Ok(())
}

/// scan one source unit, print diagnostics then tokens.
/// Returns whether any lexical error was reported.
fn run(source: &str) -> bool {
    let (tokens, errors) = tokenize(source);
    for error in &errors {
        report(error);
    }
    for token in tokens {
        println!("{token:?}");
    }
    !errors.is_empty()
}

fn report(error: &ScanningError) {
    println!("[line {}] Error: {error}", error.line());
}
