use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use itertools::Itertools;

use ssr_legacy::{MatchOptions, TransformError, transform_old_pattern};

const EXIT_MALFORMED: u8 = 1;
const EXIT_UNSUPPORTED: u8 = 2;
const EXIT_IO: u8 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Legacy pattern to transform
    #[arg(value_name = "PATTERN", conflicts_with = "file")]
    pattern: Option<String>,

    /// Read the legacy pattern from a file
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<String>,

    /// Print only the normalized pattern
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn read_pattern(args: &Args) -> Result<String> {
    if let Some(pattern) = &args.pattern {
        return Ok(pattern.clone());
    }
    let contents = if let Some(path) = &args.file {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    } else {
        let mut contents = String::new();
        io::stdin()
            .read_to_string(&mut contents)
            .context("Failed to read stdin")?;
        contents
    };
    Ok(strip_final_newline(contents))
}

/// Drop the single line terminator that ends a file or piped input.
fn strip_final_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

fn constraint_lines(options: &MatchOptions) -> String {
    options
        .constraints()
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .map(|c| format!("  {c}"))
        .join("\n")
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let pattern = match read_pattern(&args) {
        Ok(pattern) => pattern,
        Err(err) => {
            eprintln!("{:#}", err);
            return ExitCode::from(EXIT_IO);
        }
    };

    let mut options = MatchOptions::with_pattern(pattern);
    match transform_old_pattern(&mut options) {
        Ok(()) => {
            println!("{}", options.search_pattern());
            if !args.quiet && options.has_constraints() {
                println!("constraints:");
                println!("{}", constraint_lines(&options));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            match err {
                TransformError::Malformed { .. } => ExitCode::from(EXIT_MALFORMED),
                TransformError::Unsupported { .. } => ExitCode::from(EXIT_UNSUPPORTED),
            }
        }
    }
}
