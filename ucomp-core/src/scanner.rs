// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use crate::NO_TERMINAL;
use crate::EOF_TERMINAL;
use crate::report::Reporter;
use crate::scan_table::{ScanAction, ScannerTable};
use crate::token::Token;

/// Byte-at-a-time source with 1-based line/column upkeep. `line`/`col` always
/// give the position of the next unconsumed byte.
struct ByteSource {
    data: Vec<u8>,
    pos: usize,
    line: u32,
    col: u32,
}

impl ByteSource {
    fn new(data: Vec<u8>) -> Self {
        ByteSource { data, pos: 0, line: 1, col: 1 }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn consume(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += 1;
            if ch == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------

/// Table-driven scanner.
///
/// The whole source is scanned up front and the tokens cached in an ordered
/// queue, so that the parser can look at the remaining tokens when tracing.
/// [scan()](Scanner::scan) pops from the front and keeps returning the
/// end-of-source token once the queue is drained.
///
/// Lexical errors are reported through the [Reporter] as they are met; the
/// scanner then resets and continues, so a bad character never stops the scan.
pub struct Scanner {
    tokens: VecDeque<Token>,
    eof: Token,
}

impl Scanner {
    /// Scans `path` entirely. Only the file-open or read failure is an error;
    /// bad input characters are reported and skipped.
    pub fn open<R: Reporter>(path: &str, table: &ScannerTable, reporter: &mut R) -> std::io::Result<Scanner> {
        Scanner::from_reader(File::open(path)?, table, reporter)
    }

    pub fn from_reader<I: Read, R: Reporter>(mut input: I, table: &ScannerTable, reporter: &mut R) -> std::io::Result<Scanner> {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;
        let mut src = ByteSource::new(data);
        let mut tokens = VecDeque::new();
        while let Some(token) = Self::get_token(&mut src, table, reporter) {
            tokens.push_back(token);
        }
        let eof = Token::new("$", EOF_TERMINAL, src.line, src.col);
        Ok(Scanner { tokens, eof })
    }

    /// Runs the state machine until one token is recognized, or returns `None`
    /// at the end of the source (the caller synthesizes the EOF token).
    fn get_token<R: Reporter>(src: &mut ByteSource, table: &ScannerTable, reporter: &mut R) -> Option<Token> {
        'token: loop {
            let mut lexeme = String::new();
            let mut state = ScannerTable::START_STATE;
            let (line, col) = (src.line, src.col);

            while let Some(ch) = src.peek() {
                let entry = table.entry(state, ch);
                match entry.action {
                    ScanAction::Error => {
                        lexeme.push(ch as char);
                        src.consume();
                        reporter.error_at(src.line, src.col, format!("invalid token: '{lexeme}'"));
                        continue 'token;
                    }
                    ScanAction::MoveAppend => {
                        state = entry.next_state;
                        lexeme.push(ch as char);
                        src.consume();
                    }
                    ScanAction::MoveNoAppend => {
                        state = entry.next_state;
                        src.consume();
                    }
                    ScanAction::HaltAppend | ScanAction::HaltNoAppend | ScanAction::HaltReuse => {
                        if entry.action == ScanAction::HaltAppend {
                            lexeme.push(ch as char);
                        }
                        let terminal = table.check_exceptions(entry.terminal, &lexeme);
                        if entry.action != ScanAction::HaltReuse {
                            src.consume();
                        }
                        if terminal == NO_TERMINAL {
                            // whitespace or comment: scan the next token instead
                            continue 'token;
                        }
                        return Some(Token::new(lexeme, terminal, line, col));
                    }
                }
            }
            // End of source. If a token is pending, the catch-all column says
            // whether it can be finished here.
            if state != ScannerTable::START_STATE || !lexeme.is_empty() {
                let entry = table.eof_entry(state);
                if matches!(entry.action, ScanAction::HaltAppend | ScanAction::HaltNoAppend | ScanAction::HaltReuse) {
                    let terminal = table.check_exceptions(entry.terminal, &lexeme);
                    if terminal == NO_TERMINAL {
                        continue 'token;
                    }
                    return Some(Token::new(lexeme, terminal, line, col));
                }
            }
            return None;
        }
    }

    /// Scanner over an already-prepared token stream, for driving the parser
    /// without a source text (the EOF token is synthesized).
    pub fn from_tokens<T: Into<VecDeque<Token>>>(tokens: T) -> Scanner {
        Scanner { tokens: tokens.into(), eof: Token::new("$", EOF_TERMINAL, 0, 0) }
    }

    /// Next token; keeps returning the EOF token once the queue is empty.
    pub fn scan(&mut self) -> Token {
        self.tokens.pop_front().unwrap_or_else(|| self.eof.clone())
    }

    /// The tokens not yet handed to the parser (EOF excluded), for the traces.
    pub fn remaining(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

// ---------------------------------------------------------------------------------------------
