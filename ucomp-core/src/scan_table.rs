// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use crate::{StateId, TermId};

/// Action of one scanner-table entry.
///
/// The `Move*` actions change state and consume the character; the `Halt*`
/// actions end the token, look up its terminal and apply the reserved-word
/// post-check. `HaltReuse` leaves the trigger character in the stream for the
/// next token.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ScanAction {
    #[default] Error,
    MoveAppend,
    MoveNoAppend,
    HaltAppend,
    HaltNoAppend,
    HaltReuse,
}

impl ScanAction {
    /// Parses the acronym used in the language-definition file.
    pub fn from_acronym(acronym: &str) -> Result<ScanAction, String> {
        Ok(match acronym {
            "E" => ScanAction::Error,
            "MA" => ScanAction::MoveAppend,
            "MNA" => ScanAction::MoveNoAppend,
            "HA" => ScanAction::HaltAppend,
            "HNA" => ScanAction::HaltNoAppend,
            "HR" => ScanAction::HaltReuse,
            _ => return Err(format!("invalid action acronym: {acronym}")),
        })
    }
}

impl Display for ScanAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            ScanAction::Error => "E",
            ScanAction::MoveAppend => "MA",
            ScanAction::MoveNoAppend => "MNA",
            ScanAction::HaltAppend => "HA",
            ScanAction::HaltNoAppend => "HNA",
            ScanAction::HaltReuse => "HR",
        })
    }
}

/// One cell of the scanner table. `next_state` is meaningful for the `Move*`
/// actions, `terminal` for the `Halt*` actions.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Entry {
    pub next_state: StateId,
    pub action: ScanAction,
    pub terminal: TermId,
}

impl Entry {
    /// Parses a table cell: either the bare error marker `E` or
    /// `nextState:actionAcronym:terminalId`.
    pub fn parse(text: &str) -> Result<Entry, String> {
        if text == "E" {
            return Ok(Entry::default());
        }
        let mut parts = text.split(':');
        let (Some(state), Some(acronym), Some(terminal), None) =
            (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(format!("malformed table entry '{text}', expected 'state:action:terminal' or 'E'"));
        };
        let next_state = state.parse::<StateId>()
            .map_err(|e| format!("bad state in table entry '{text}': {e}"))?;
        let action = ScanAction::from_acronym(acronym)?;
        let terminal = terminal.parse::<TermId>()
            .map_err(|e| format!("bad terminal ID in table entry '{text}': {e}"))?;
        Ok(Entry { next_state, action, terminal })
    }
}

// ---------------------------------------------------------------------------------------------

/// Finite-state transducer table driving the [Scanner](crate::scanner::Scanner),
/// loaded from the language-definition file. Rows are states (0 is the start
/// state), columns are the declared character classes, matched in declaration
/// order; cells say where to go and what to do.
///
/// The table also holds the reserved-word map used by the post-check: the
/// table itself recognizes a generic identifier, and the final lexeme is then
/// compared (case-insensitively) against the reserved words to rewrite the
/// terminal. This keeps the state machine language-independent.
#[derive(Clone, Debug, Default)]
pub struct ScannerTable {
    columns: Vec<String>,
    entries: Vec<Vec<Entry>>,
    reserved: HashMap<String, TermId>,
}

impl ScannerTable {
    pub const START_STATE: StateId = 0;

    pub fn new() -> Self {
        ScannerTable::default()
    }

    /// Declares the next character-class column.
    pub fn add_column(&mut self, character_class: &str) {
        self.columns.push(character_class.to_string());
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_states(&self) -> usize {
        self.entries.len()
    }

    /// Stores one cell; rows are created on demand and filled with error cells.
    pub fn add_entry(&mut self, state: StateId, column: usize, entry: Entry) {
        let state = state as usize;
        if self.entries.len() <= state {
            self.entries.resize(state + 1, vec![Entry::default(); self.columns.len()]);
        }
        self.entries[state][column] = entry;
    }

    /// Registers a reserved word for the post-check; matching is done on the
    /// lowercased lexeme.
    pub fn add_reserved_word(&mut self, terminal: TermId, word: &str) {
        self.reserved.insert(word.to_lowercase(), terminal);
    }

    /// Finds the column of `ch`: the first class whose predicate matches.
    /// `letter`, `digit`, `whitespace` (space or tab) and `EOL` are built-in
    /// predicates; any other class matches the character against its first
    /// byte, except `Other` which always matches and must be declared last.
    pub fn column_of(&self, ch: u8) -> Option<usize> {
        self.columns.iter().position(|class| {
            match class.as_str() {
                "letter" => ch.is_ascii_alphabetic(),
                "digit" => ch.is_ascii_digit(),
                "whitespace" => ch == b' ' || ch == b'\t',
                "EOL" => ch == b'\n',
                "Other" => true,
                literal => literal.as_bytes().first() == Some(&ch),
            }
        })
    }

    /// The cell for `ch` in `state`; an unclassifiable character behaves as an
    /// error cell.
    pub fn entry(&self, state: StateId, ch: u8) -> Entry {
        match self.column_of(ch) {
            Some(column) => self.entries[state as usize][column],
            None => Entry::default(),
        }
    }

    /// The cell deciding what happens when the source ends while `state` is
    /// mid-token: the catch-all (last) column. A `Halt*` action there finishes
    /// the pending token; anything else drops the pending input.
    pub fn eof_entry(&self, state: StateId) -> Entry {
        self.entries[state as usize].last().copied().unwrap_or_default()
    }

    /// Reserved-word post-check: if the complete lexeme, lowercased, is a
    /// reserved word, returns that word's terminal instead of `terminal`.
    pub fn check_exceptions(&self, terminal: TermId, lexeme: &str) -> TermId {
        match self.reserved.get(&lexeme.to_lowercase()) {
            Some(reserved) => *reserved,
            None => terminal,
        }
    }

    /// Checks that every `Move*` cell targets an existing state, called once
    /// the whole section has been read.
    pub fn validate(&self) -> Result<(), String> {
        for (state, row) in self.entries.iter().enumerate() {
            for entry in row {
                let moves = matches!(entry.action, ScanAction::MoveAppend | ScanAction::MoveNoAppend);
                if moves && entry.next_state as usize >= self.entries.len() {
                    return Err(format!(
                        "state {state}: next state {} is out of range (must be 0 <= x < {})",
                        entry.next_state, self.entries.len()));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
