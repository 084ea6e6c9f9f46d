// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use ucomp_core::emit::CodeEmitter;
use ucomp_core::parser::{ParseTraces, Parser};
use ucomp_core::report::{Reporter, StderrReporter};
use ucomp_core::routines::SemanticRoutines;
use ucomp_core::scan_table::ScannerTable;
use ucomp_core::scanner::Scanner;
use crate::analyzer::Analysis;
use crate::grammar::{ConfigError, Grammar};
use crate::options::CompileOptions;

/// What a finished compilation reported. The exit code is 1 as soon as
/// `errors` is non-zero.
#[derive(Clone, Copy, Debug)]
pub struct CompileOutcome {
    pub errors: usize,
    pub warnings: usize,
}

/// Runs one compilation: loads the language definition, analyzes it and
/// builds the predict table, scans the source, then parses it with the
/// semantic routines emitting tuple code. Configuration problems (unreadable
/// or malformed grammar, unopenable source or output file) abort before any
/// compilation work; scan and parse errors are reported, counted, and do not
/// stop the run.
pub fn compile(options: &CompileOptions) -> Result<CompileOutcome, ConfigError> {
    let mut grammar_reporter = StderrReporter::new(&options.grammar_file);
    let mut scan_table = ScannerTable::new();
    let grammar = Grammar::load(&options.grammar_file, &mut scan_table, &mut grammar_reporter)?;
    let analysis = Analysis::analyze(&grammar);
    let predict = analysis.build_predict_table(&grammar, &mut grammar_reporter);

    if options.print_grammar {
        print!("{grammar}");
        println!();
        print!("{}", analysis.to_str(&grammar));
    }
    if options.print_predict_table {
        print!("{}", predict.to_str(grammar.symbols()));
        println!();
    }

    let mut source_reporter = StderrReporter::new(&options.source_file);
    let scanner = match Scanner::open(&options.source_file, &scan_table, &mut source_reporter) {
        Ok(scanner) => scanner,
        Err(source) => {
            source_reporter.error(format!("Failed to open '{}': {source}", options.source_file));
            return Err(ConfigError::FileOpen {
                what: "source file",
                file: options.source_file.clone(),
                source,
            });
        }
    };
    let emitter = match CodeEmitter::to_file(&options.output_file) {
        Ok(emitter) => emitter,
        Err(source) => {
            source_reporter.error(format!("Failed to open generated code file '{}': {source}", options.output_file));
            return Err(ConfigError::FileOpen {
                what: "generated code file",
                file: options.output_file.clone(),
                source,
            });
        }
    };

    let traces = ParseTraces {
        tokens: options.print_tokens,
        parse: options.print_parse,
        generation: options.print_generation,
    };
    let mut parser = Parser::new(
        grammar.symbols(),
        grammar.productions(),
        &predict,
        grammar.start(),
        scanner,
        SemanticRoutines::new(emitter),
        source_reporter,
        traces,
    );
    parser.parse();
    let (source_reporter, mut routines) = parser.finish();
    if let Err(source) = routines.finish_output() {
        return Err(ConfigError::FileOpen {
            what: "generated code file",
            file: options.output_file.clone(),
            source,
        });
    }

    Ok(CompileOutcome {
        errors: grammar_reporter.num_errors() + source_reporter.num_errors(),
        warnings: grammar_reporter.num_warnings() + source_reporter.num_warnings(),
    })
}
