// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.


use crate::{CollectJoin, ProdNum, VarId};
use crate::predict::PredictTable;
use crate::production::Production;
use crate::report::Reporter;
use crate::routines::SemanticRoutines;
use crate::scanner::Scanner;
use crate::sem_record::SemanticRecord;
use crate::sem_stack::{EopFrame, SemanticStack};
use crate::symbol::{Symbol, Symbols};
use crate::token::Token;

/// Item of the parse stack: a grammar symbol, or the end-of-production marker
/// carrying the semantic-stack snapshot taken when its production was
/// predicted. The marker only ever exists on this stack, never in a grammar.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StackItem {
    Sym(Symbol),
    Eop(EopFrame),
}

impl StackItem {
    pub fn to_str(&self, symbols: &Symbols) -> String {
        match self {
            StackItem::Sym(symbol) => symbol.to_str(symbols),
            StackItem::Eop(frame) =>
                format!("EOP({},{},{},{})", frame.left, frame.right, frame.current, frame.top),
        }
    }
}

/// Which of the step-by-step traces the parser prints to stdout.
#[derive(Clone, Copy, Default, Debug)]
pub struct ParseTraces {
    /// Print each token as it is consumed
    pub tokens: bool,
    /// Three-column trace: parser action, remaining tokens, parse stack
    pub parse: bool,
    /// Five-column trace of the full parser state after every step
    pub generation: bool,
}

/// Column width of the generation trace (sized to fit a GenInfix action symbol).
const GEN_WIDTH: usize = 22;
const ACTION_WIDTH: usize = 17;

/// Predictive LL(1) driver.
///
/// The parse stack holds grammar symbols and end-of-production markers. On a
/// nonterminal the predict table picks a production: the nonterminal is
/// replaced by an EOP marker (snapshot of the semantic-stack indices) plus the
/// production's right-hand side in reverse, and a semantic frame is opened
/// with one slot per terminal or nonterminal of that right-hand side. Matched
/// terminals drop a placeholder record into the frame; action symbols run
/// their semantic routine; a popped EOP closes the frame again.
///
/// Every parse error is reported and recovered from by popping the offending
/// stack symbol, which may cascade into further diagnostics: one run collects
/// everything. The source is accepted when the stack empties with no errors
/// recorded.
pub struct Parser<'g, R: Reporter> {
    symbols: &'g Symbols,
    productions: &'g [Production],
    predict: &'g PredictTable,
    start: VarId,
    scanner: Scanner,
    stack: Vec<StackItem>,
    sem_stack: SemanticStack,
    routines: SemanticRoutines,
    reporter: R,
    traces: ParseTraces,
    printed_gen_header: bool,
}

impl<'g, R: Reporter> Parser<'g, R> {
    pub fn new(
        symbols: &'g Symbols,
        productions: &'g [Production],
        predict: &'g PredictTable,
        start: VarId,
        scanner: Scanner,
        routines: SemanticRoutines,
        reporter: R,
        traces: ParseTraces,
    ) -> Self {
        Parser {
            symbols,
            productions,
            predict,
            start,
            scanner,
            stack: Vec::new(),
            sem_stack: SemanticStack::new(),
            routines,
            reporter,
            traces,
            printed_gen_header: false,
        }
    }

    fn get_production(&self, number: ProdNum) -> &'g Production {
        let production = &self.productions[number as usize - 1];
        debug_assert_eq!(production.number, number);
        production
    }

    fn scan_next(&mut self) -> Token {
        let token = self.scanner.scan();
        if self.traces.tokens {
            println!("{}", token.to_str(self.symbols));
        }
        token
    }

    /// Runs the parse to completion. Acceptance is the pair (empty parse
    /// stack, no errors reported); the error count lives in the reporter.
    pub fn parse(&mut self) {
        self.stack.clear();
        self.sem_stack.initialize();
        self.stack.push(StackItem::Sym(Symbol::NT(self.start)));
        let mut token = self.scan_next();

        let mut tokens_width = 0;
        if self.traces.parse {
            // the second column is sized once, for the full token stream
            tokens_width = self.remaining_str(&token).len().max("Remaining Tokens".len());
            println!("{:<ACTION_WIDTH$} | {:<tokens_width$} | {}", "Parser Action", "Remaining Tokens", "Stack");
        }
        self.print_state(&token);

        while let Some(top) = self.stack.last().copied() {
            let (remaining, stack_str) = if self.traces.parse {
                (self.remaining_str(&token), self.stack_str())
            } else {
                (String::new(), String::new())
            };
            let mut action = String::new();

            match top {
                StackItem::Sym(Symbol::NT(var)) => {
                    let number = self.predict.lookup(var, token.terminal);
                    if number > 0 {
                        action = format!("Predict({number})");
                        self.stack.pop();
                        self.stack.push(StackItem::Eop(self.sem_stack.snapshot()));
                        let production = self.get_production(number);
                        for symbol in production.rhs.iter().rev() {
                            if !symbol.is_lambda() {
                                self.stack.push(StackItem::Sym(*symbol));
                            }
                        }
                        self.sem_stack.expand(production.num_sem_slots());
                    } else {
                        self.reporter.error_at(token.line, token.column, format!(
                            "No production found for symbol {} and token {}.",
                            self.symbols.get_nt_name(var),
                            self.symbols.get_t_name(token.terminal)));
                        self.stack.pop(); // move past the bad symbol
                    }
                }
                StackItem::Sym(Symbol::T(terminal)) => {
                    if terminal == token.terminal {
                        action = "Match".to_string();
                        self.stack.pop();
                        self.sem_stack.replace_at_current(SemanticRecord::Placeholder(token));
                        token = self.scan_next();
                    } else {
                        self.reporter.error_at(token.line, token.column, format!(
                            "Expected {}, instead found {}.",
                            self.symbols.get_t_name(terminal),
                            self.symbols.get_t_name(token.terminal)));
                        self.stack.pop(); // move past the bad symbol
                    }
                }
                StackItem::Sym(Symbol::Action(id)) => {
                    self.stack.pop();
                    let action_info = self.symbols.get_action(id);
                    self.routines.execute(action_info, &mut self.sem_stack, &mut self.reporter);
                }
                StackItem::Sym(Symbol::Lambda) => {
                    // lambda is never pushed; tolerate it anyway
                    self.stack.pop();
                }
                StackItem::Eop(frame) => {
                    self.sem_stack.restore(frame);
                    self.stack.pop();
                }
            }

            if self.traces.parse && !self.reporter.has_error() {
                println!("{action:>ACTION_WIDTH$} | {remaining:>tokens_width$} | {stack_str}");
            }
            self.print_state(&token);
        }
    }

    /// Hands back the reporter and the routines host (holding the emitted
    /// code) once the parse is done.
    pub fn finish(self) -> (R, SemanticRoutines) {
        (self.reporter, self.routines)
    }

    // -------------------------------------------------------------------------
    // traces

    /// Lookahead plus all unconsumed tokens. The end marker alone is not shown,
    /// so the last step doesn't list `$ $`.
    fn remaining_str(&self, lookahead: &Token) -> String {
        let mut parts = Vec::new();
        if lookahead.lexeme != "$" {
            parts.push(lookahead.lexeme.as_str());
        }
        parts.extend(self.scanner.remaining().map(|t| t.lexeme.as_str()));
        parts.join(" ")
    }

    fn stack_str(&self) -> String {
        self.stack.iter().rev().map(|item| item.to_str(self.symbols)).join(" ")
    }

    /// Five-column dump of the parser state (generation trace): remaining
    /// tokens, parse stack, semantic stack, symbol table, generated code.
    fn print_state(&mut self, lookahead: &Token) {
        if !self.traces.generation {
            return;
        }
        let divider = || {
            println!("{}", format!("{:-<w$}", "", w = GEN_WIDTH + 3).repeat(5));
        };
        if !self.printed_gen_header {
            self.printed_gen_header = true;
            let names = ["Remaining Tokens", "Parse Stack", "Semantic Stack", "Symbol Table", "Generated Code"];
            println!("{}", names.map(|n| format!("{n:>GEN_WIDTH$}")).join(" | "));
            divider();
        }

        let mut tokens = vec![lookahead.lexeme.clone()];
        tokens.extend(self.scanner.remaining().map(|t| t.lexeme.clone()));
        let mut token_iter = tokens.iter().peekable();
        let mut parse_iter = self.stack.iter().rev();
        let semantic: Vec<String> = self.sem_stack.records().map(|r| r.extract().to_string()).collect();
        let mut semantic_iter = semantic.iter();
        let table = self.routines.symbols();
        let mut table_iter = table.iter();
        let code = self.routines.code();
        let mut code_iter = code.iter();

        loop {
            let mut row = Vec::<String>::new();
            let mut any = false;

            // the token column packs as many lexemes as fit
            let mut cell = String::new();
            while let Some(lexeme) = token_iter.peek() {
                if !cell.is_empty() && cell.len() + lexeme.len() + 1 >= GEN_WIDTH {
                    break;
                }
                any = true;
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(lexeme);
                token_iter.next();
                if cell.len() >= GEN_WIDTH {
                    break;
                }
            }
            row.push(format!("{cell:>GEN_WIDTH$}"));

            match parse_iter.next() {
                Some(item) => {
                    any = true;
                    row.push(format!("{:>GEN_WIDTH$}", item.to_str(self.symbols)));
                }
                None => row.push(format!("{:>GEN_WIDTH$}", "")),
            }
            match semantic_iter.next() {
                Some(record) => {
                    any = true;
                    row.push(format!("{record:>GEN_WIDTH$}"));
                }
                None => row.push(format!("{:>GEN_WIDTH$}", "")),
            }
            match table_iter.next() {
                Some(symbol) => {
                    any = true;
                    row.push(format!("{symbol:<GEN_WIDTH$}"));
                }
                None => row.push(format!("{:>GEN_WIDTH$}", "")),
            }
            match code_iter.next() {
                Some(tuple) => {
                    any = true;
                    row.push(format!("{tuple:<GEN_WIDTH$}"));
                }
                None => row.push(format!("{:>GEN_WIDTH$}", "")),
            }

            if !any {
                break;
            }
            println!("{}", row.join(" | "));
        }
        divider();
    }
}
