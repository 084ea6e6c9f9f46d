// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use ucomp_lib::compile::{compile, CompileOutcome};
use ucomp_lib::grammar::ConfigError;
use crate::arg_opt::{parse_args, HELP_MESSAGE, USAGE_MESSAGE};

mod arg_opt;

enum ExeError {
    Help,
    Version,
    Option(String),
    Compile(ConfigError),
}

fn main() {
    let all_args: Vec<String> = std::env::args().skip(1).collect();
    let code = match execute(all_args) {
        Ok(CompileOutcome { errors: 0, .. }) => 0,
        Ok(_) => 1, // diagnostics already went to stderr
        Err(e) => {
            match e {
                ExeError::Help => {
                    eprintln!("{HELP_MESSAGE}");
                }
                ExeError::Version => {
                    let version = env!("CARGO_PKG_VERSION");
                    eprintln!("universal_compiler version {version}");
                }
                ExeError::Option(msg) => {
                    eprintln!("error: {msg}");
                    eprintln!("{USAGE_MESSAGE}");
                }
                ExeError::Compile(source) => {
                    eprintln!("error: {source}");
                }
            }
            1
        }
    };
    std::process::exit(code);
}

fn execute(all_args: Vec<String>) -> Result<CompileOutcome, ExeError> {
    let options = parse_args(all_args)?;
    compile(&options).map_err(ExeError::Compile)
}
