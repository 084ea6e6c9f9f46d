// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use ucomp_lib::options::CompileOptions;
use crate::ExeError;

/// Command-line arguments
pub(crate) static USAGE_MESSAGE: &str =
    "Usage: universal_compiler [OPTIONS] <grammar-file> <source-file> <output-file>";

pub(crate) static HELP_MESSAGE: &str = r##"Usage:    universal_compiler [OPTIONS] <grammar-file> <source-file> <output-file>

Compiles <source-file> according to the language defined in <grammar-file> and
writes the generated tuple code to <output-file>.

The grammar file has four sections separated by a line of five hyphens: the
terminal symbols, the scanner state table, the productions with embedded
semantic action symbols, and the start symbol.

Options (all off by default):

  --grammar           Print the grammar and its First/Follow/Predict sets
                      before compiling.

  --predict-table     Print the LL(1) predict table before compiling.

  --tokens            Print each token as the parser consumes it.

  --parse             Print a three-column parse trace: parser action,
                      remaining tokens, parse stack.

  --generation        Print a five-column trace of the whole parser state
                      (remaining tokens, parse stack, semantic stack, symbol
                      table, generated code) at every parse step.

  -h|--help           Show this message.

  -V|--version        Show the program version.

The exit code is 0 on a clean compile and 1 on any error.

Example:

  universal_compiler --parse micro.g program.micro program.tuples
"##;

pub(crate) fn parse_args(all_args: Vec<String>) -> Result<CompileOptions, ExeError> {
    let mut files = Vec::<String>::new();
    let mut print_grammar = false;
    let mut print_predict_table = false;
    let mut print_tokens = false;
    let mut print_parse = false;
    let mut print_generation = false;

    for arg in &all_args {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(ExeError::Help); // not a real error
            }
            "-V" | "--version" => {
                return Err(ExeError::Version); // not a real error
            }
            "--grammar" => print_grammar = true,
            "--predict-table" => print_predict_table = true,
            "--tokens" => print_tokens = true,
            "--parse" => print_parse = true,
            "--generation" => print_generation = true,
            s if s.starts_with('-') => {
                return Err(ExeError::Option(format!("unexpected argument '{s}'")));
            }
            s => files.push(s.to_string()),
        }
    }

    match <[String; 3]>::try_from(files) {
        Ok([grammar_file, source_file, output_file]) => {
            let mut options = CompileOptions::new(grammar_file, source_file, output_file);
            options.print_grammar = print_grammar;
            options.print_predict_table = print_predict_table;
            options.print_tokens = print_tokens;
            options.print_parse = print_parse;
            options.print_generation = print_generation;
            Ok(options)
        }
        Err(files) if files.is_empty() => Err(ExeError::Option("No input files provided.".to_string())),
        Err(files) => Err(ExeError::Option(format!(
            "expected <grammar-file> <source-file> <output-file>, got {} file argument(s)", files.len()))),
    }
}
