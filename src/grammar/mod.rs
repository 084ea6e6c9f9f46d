
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use ucomp_core::{TermId, VarId, EOF_TERMINAL};
use ucomp_core::production::Production;
use ucomp_core::report::Reporter;
use ucomp_core::routines::SemanticRoutines;
use ucomp_core::scan_table::{Entry, ScannerTable};
use ucomp_core::symbol::{Symbol, Symbols};

/// Line separating the four sections of a language-definition file.
pub const SECTION_DELIM: &str = "-----";

/// Fatal problem with the compilation setup: the language-definition file is
/// unreadable or malformed, or one of the other files cannot be opened. No
/// compilation is attempted; the error has also been reported through the
/// error sink when it was raised.
#[derive(Debug)]
pub enum ConfigError {
    FileOpen { what: &'static str, file: String, source: std::io::Error },
    Read { file: String, source: std::io::Error },
    Syntax { file: String, line: u32, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileOpen { what, file, source } =>
                write!(f, "Failed to open {what} '{file}': {source}"),
            ConfigError::Read { file, source } =>
                write!(f, "Error while reading '{file}': {source}"),
            ConfigError::Syntax { file, line, message } =>
                write!(f, "{file}:{line}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileOpen { source, .. } | ConfigError::Read { source, .. } => Some(source),
            ConfigError::Syntax { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------------------------

/// A loaded language definition: the symbol registry, the productions in file
/// order (numbered from 1), and the start symbol. Loading also fills the
/// [ScannerTable] that was passed in, since the scanner section lives in the
/// same file.
#[derive(Debug)]
pub struct Grammar {
    file_name: String,
    symbols: Symbols,
    productions: Vec<Production>,
    start: VarId,
}

impl Grammar {
    /// Loads the language-definition file at `path`.
    pub fn load<R: Reporter>(path: &str, scan_table: &mut ScannerTable, reporter: &mut R) -> Result<Grammar, ConfigError> {
        match File::open(path) {
            Ok(file) => Grammar::from_reader(path, BufReader::new(file), scan_table, reporter),
            Err(source) => {
                reporter.error(format!("Failed to open grammar definition file '{path}': {source}"));
                Err(ConfigError::FileOpen { what: "grammar definition file", file: path.to_string(), source })
            }
        }
    }

    /// Loads a language definition from any buffered reader; `name` is only
    /// used in diagnostics.
    pub fn from_reader<I: BufRead, R: Reporter>(
        name: &str,
        input: I,
        scan_table: &mut ScannerTable,
        reporter: &mut R,
    ) -> Result<Grammar, ConfigError> {
        Loader {
            file_name: name,
            lines: input.lines(),
            line_number: 0,
            scan_table,
            reporter,
            symbols: Symbols::new(),
            productions: Vec::new(),
        }.load()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Production `number`; numbers are dense from 1.
    pub fn get_production(&self, number: u32) -> &Production {
        &self.productions[number as usize - 1]
    }

    pub fn start(&self) -> VarId {
        self.start
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grammar Definition")?;
        writeln!(f, "==================")?;
        writeln!(f, " Source File: {}", self.file_name)?;
        writeln!(f)?;
        writeln!(f, "Productions")?;
        writeln!(f, "-----------")?;
        for production in &self.productions {
            writeln!(f, "{}", production.to_str(&self.symbols))?;
        }
        writeln!(f)?;
        writeln!(f, "Start Symbol: {}", self.symbols.get_nt_name(self.start))?;
        writeln!(f)?;
        writeln!(f, "Terminal Symbols")?;
        writeln!(f, "----------------")?;
        for (id, info) in self.symbols.get_terminals() {
            match &info.reserved {
                Some(word) => writeln!(f, "{id:3} {} (reserved word: {word})", info.name)?,
                None => writeln!(f, "{id:3} {}", info.name)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Non-Terminal Symbols")?;
        writeln!(f, "--------------------")?;
        for name in self.symbols.get_non_terminals() {
            writeln!(f, "{name}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------

struct Loader<'a, I: BufRead, R: Reporter> {
    file_name: &'a str,
    lines: std::io::Lines<I>,
    line_number: u32,
    scan_table: &'a mut ScannerTable,
    reporter: &'a mut R,
    symbols: Symbols,
    productions: Vec<Production>,
}

impl<'a, I: BufRead, R: Reporter> Loader<'a, I, R> {
    fn load(mut self) -> Result<Grammar, ConfigError> {
        self.read_terminals()?;
        self.read_scanner_table()?;
        self.read_productions()?;
        let start = self.read_start_symbol()?;
        Ok(Grammar {
            file_name: self.file_name.to_string(),
            symbols: self.symbols,
            productions: self.productions,
            start,
        })
    }

    /// The one place the line counter moves: every physical line read goes
    /// through here, so diagnostics always carry a valid line number. Blank
    /// lines and `#` comments are skipped; `None` is the end of the file.
    fn read_line(&mut self) -> Result<Option<String>, ConfigError> {
        loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(Err(source)) => {
                    return Err(ConfigError::Read { file: self.file_name.to_string(), source });
                }
                Some(Ok(line)) => {
                    self.line_number += 1;
                    if !line.is_empty() && !line.starts_with('#') {
                        return Ok(Some(line));
                    }
                }
            }
        }
    }

    /// Reports `message` through the sink and turns it into the fatal error.
    fn error(&mut self, message: String) -> ConfigError {
        self.reporter.error(message.clone());
        ConfigError::Syntax { file: self.file_name.to_string(), line: self.line_number, message }
    }

    fn unexpected_eof(&mut self, section: &str) -> ConfigError {
        self.error(format!("Unexpected end of file while reading the {section} section."))
    }

    // -------------------------------------------------------------------------

    /// Section 1: `id name [reservedWord]`, one terminal per line.
    fn read_terminals(&mut self) -> Result<(), ConfigError> {
        loop {
            let Some(line) = self.read_line()? else {
                return Err(self.unexpected_eof("terminal"));
            };
            if line == SECTION_DELIM {
                return Ok(());
            }
            let mut fields = line.split_whitespace();
            let (Some(id), Some(name)) = (fields.next(), fields.next()) else {
                let line_number = self.line_number;
                return Err(self.error(format!("Malformed terminal on line {line_number}, expected 'id name [reservedWord]'.")));
            };
            let id: TermId = match id.parse() {
                Ok(id) => id,
                Err(parse_error) => {
                    let (id, line_number) = (id.to_string(), self.line_number);
                    return Err(self.error(format!("Invalid terminal ID '{id}' on line {line_number}: {parse_error}.")));
                }
            };
            let reserved = fields.next().map(|word| word.to_string());
            if let Err(message) = self.symbols.add_terminal(id, name.to_string(), reserved.clone()) {
                let line_number = self.line_number;
                return Err(self.error(format!("{message} (line {line_number}).")));
            }
            if let Some(word) = reserved {
                self.scan_table.add_reserved_word(id, &word);
            }
        }
    }

    /// Section 2: the column header, then one line per state with one
    /// `next:action:terminal` entry (or `E`) per column.
    fn read_scanner_table(&mut self) -> Result<(), ConfigError> {
        let Some(header) = self.read_line()? else {
            return Err(self.unexpected_eof("scanner table"));
        };
        if header == SECTION_DELIM {
            return Err(self.error("The scanner table section is empty.".to_string()));
        }
        for character_class in header.split_whitespace() {
            self.scan_table.add_column(character_class);
        }
        let mut state = 0;
        loop {
            let Some(line) = self.read_line()? else {
                return Err(self.unexpected_eof("scanner table"));
            };
            if line == SECTION_DELIM {
                break;
            }
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != self.scan_table.num_columns() {
                let (found, expected) = (cells.len(), self.scan_table.num_columns());
                return Err(self.error(format!("State {state} has {found} entries, expected one per column ({expected}).")));
            }
            for (column, cell) in cells.iter().enumerate() {
                match Entry::parse(cell) {
                    Ok(entry) => self.scan_table.add_entry(state, column, entry),
                    Err(message) => return Err(self.error(format!("State {state}: {message}."))),
                }
            }
            state += 1;
        }
        if self.scan_table.num_states() == 0 {
            return Err(self.error("The scanner table has no states.".to_string()));
        }
        if let Err(message) = self.scan_table.validate() {
            return Err(self.error(format!("Invalid scanner table: {message}.")));
        }
        Ok(())
    }

    /// Section 3: `<lhs> -> sym sym ...`, one production per line. A bare `$`
    /// is the built-in EOF terminal, `#...` an action symbol, and any other
    /// bare token must be a declared terminal name.
    fn read_productions(&mut self) -> Result<(), ConfigError> {
        let mut number = 1;
        loop {
            let Some(line) = self.read_line()? else {
                return Err(self.unexpected_eof("production"));
            };
            if line == SECTION_DELIM {
                return Ok(());
            }
            let mut pos = 0;
            let lhs_name = match Self::next_symbol(&line, &mut pos) {
                Ok(Some(name)) if name.starts_with('<') => name,
                Ok(_) => {
                    let line_number = self.line_number;
                    return Err(self.error(format!("The left-hand side of the production on line {line_number} must be a non-terminal.")));
                }
                Err(message) => return Err(self.error(message)),
            };
            let lhs = self.symbols.intern_nt(&lhs_name);
            match Self::next_symbol(&line, &mut pos) {
                Ok(Some(arrow)) if arrow == "->" => {}
                _ => {
                    let line_number = self.line_number;
                    return Err(self.error(format!("Expected '->' after {lhs_name} on line {line_number}.")));
                }
            }
            let mut production = Production::new(number, lhs);
            loop {
                match Self::next_symbol(&line, &mut pos) {
                    Ok(Some(name)) => {
                        let symbol = self.make_symbol(&name)?;
                        production.rhs.push(symbol);
                    }
                    Ok(None) => break,
                    Err(message) => return Err(self.error(message)),
                }
            }
            if production.rhs.is_empty() {
                production.rhs.push(Symbol::Lambda);
            }
            self.productions.push(production);
            number += 1;
        }
    }

    fn make_symbol(&mut self, name: &str) -> Result<Symbol, ConfigError> {
        if name.starts_with('<') {
            Ok(Symbol::NT(self.symbols.intern_nt(name)))
        } else if name == "$" {
            Ok(Symbol::T(EOF_TERMINAL))
        } else if name.starts_with('#') {
            let id = match self.symbols.add_action(name) {
                Ok(id) => id,
                Err(message) => {
                    let line_number = self.line_number;
                    return Err(self.error(format!("{message} (line {line_number}).")));
                }
            };
            if let Err(message) = SemanticRoutines::validate(self.symbols.get_action(id)) {
                let line_number = self.line_number;
                return Err(self.error(format!("{message} (line {line_number}).")));
            }
            Ok(Symbol::Action(id))
        } else {
            match self.symbols.find_terminal(name) {
                Some(id) => Ok(Symbol::T(id)),
                None => {
                    let line_number = self.line_number;
                    Err(self.error(format!(
                        "Terminal symbol \"{name}\" on line {line_number} is not a valid symbol. \
                         Check it against terminals defined at the top of the grammar definition file.")))
                }
            }
        }
    }

    /// Scans the next symbol of a production line from `pos`: either a
    /// `<...>` non-terminal, which may contain spaces, or a bare token ending
    /// at the next whitespace.
    fn next_symbol(line: &str, pos: &mut usize) -> Result<Option<String>, String> {
        let bytes = line.as_bytes();
        while *pos < bytes.len() && (bytes[*pos] == b' ' || bytes[*pos] == b'\t') {
            *pos += 1;
        }
        if *pos >= bytes.len() {
            return Ok(None);
        }
        let start = *pos;
        if bytes[start] == b'<' {
            match line[start..].find('>') {
                Some(offset) => {
                    *pos = start + offset + 1;
                    Ok(Some(line[start..*pos].to_string()))
                }
                None => Err(format!("Unterminated non-terminal in production '{line}'.")),
            }
        } else {
            while *pos < bytes.len() && bytes[*pos] != b' ' && bytes[*pos] != b'\t' {
                *pos += 1;
            }
            Ok(Some(line[start..*pos].to_string()))
        }
    }

    /// Section 4: the start symbol, which must appear in some production.
    fn read_start_symbol(&mut self) -> Result<VarId, ConfigError> {
        let Some(line) = self.read_line()? else {
            return Err(self.unexpected_eof("start symbol"));
        };
        match self.symbols.find_nt(&line) {
            Some(var) => Ok(var),
            None => Err(self.error(format!("Start symbol '{line}' is not a defined symbol."))),
        }
    }
}
