// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

/// Options of one compilation: the three files and the debug traces.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Language-definition file driving the scanner and the parser
    pub grammar_file: String,
    /// Program to compile
    pub source_file: String,
    /// Where the tuple code goes
    pub output_file: String,
    /// Print the grammar and its First/Follow/Predict sets before compiling
    pub print_grammar: bool,
    /// Print the predict table before compiling
    pub print_predict_table: bool,
    /// Print each token as the parser consumes it
    pub print_tokens: bool,
    /// Print the three-column parse trace
    pub print_parse: bool,
    /// Print the five-column generation trace at every parse step
    pub print_generation: bool,
}

impl CompileOptions {
    pub fn new<T: Into<String>>(grammar_file: T, source_file: T, output_file: T) -> Self {
        CompileOptions {
            grammar_file: grammar_file.into(),
            source_file: source_file.into(),
            output_file: output_file.into(),
            print_grammar: false,
            print_predict_table: false,
            print_tokens: false,
            print_parse: false,
            print_generation: false,
        }
    }
}
