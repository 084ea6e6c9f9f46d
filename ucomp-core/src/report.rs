// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fmt::Debug;

/// Common functionalities of a diagnostics consumer.
///
/// Diagnostics follow the usual compiler convention, `file:line:col: error: message`
/// when the position is known and `file: error: message` when it isn't. The first
/// recorded error closes the code-emission gate (see [CodeEmitter](crate::emit::CodeEmitter)),
/// so the counters must be exact.
pub trait Reporter: Debug {
    /// Reports an error with no source position.
    fn error<T: Into<String>>(&mut self, msg: T);
    /// Reports an error at `line:col` of the attached file.
    fn error_at<T: Into<String>>(&mut self, line: u32, col: u32, msg: T);
    /// Reports a warning with no source position.
    fn warning<T: Into<String>>(&mut self, msg: T);
    /// Reports a warning at `line:col` of the attached file.
    fn warning_at<T: Into<String>>(&mut self, line: u32, col: u32, msg: T);

    fn num_errors(&self) -> usize;
    fn num_warnings(&self) -> usize;

    #[inline]
    fn has_error(&self) -> bool {
        self.num_errors() > 0
    }
}

// ---------------------------------------------------------------------------------------------

/// Reporter that prints the diagnostics to stderr without storing them.
#[derive(Clone, Debug)]
pub struct StderrReporter {
    file: String,
    num_errors: usize,
    num_warnings: usize,
}

impl StderrReporter {
    pub fn new<T: Into<String>>(file: T) -> Self {
        StderrReporter { file: file.into(), num_errors: 0, num_warnings: 0 }
    }
}

impl Reporter for StderrReporter {
    fn error<T: Into<String>>(&mut self, msg: T) {
        self.num_errors += 1;
        eprintln!("{}: error: {}", self.file, msg.into());
    }

    fn error_at<T: Into<String>>(&mut self, line: u32, col: u32, msg: T) {
        self.num_errors += 1;
        eprintln!("{}:{line}:{col}: error: {}", self.file, msg.into());
    }

    fn warning<T: Into<String>>(&mut self, msg: T) {
        self.num_warnings += 1;
        eprintln!("{}: warning: {}", self.file, msg.into());
    }

    fn warning_at<T: Into<String>>(&mut self, line: u32, col: u32, msg: T) {
        self.num_warnings += 1;
        eprintln!("{}:{line}:{col}: warning: {}", self.file, msg.into());
    }

    fn num_errors(&self) -> usize {
        self.num_errors
    }

    fn num_warnings(&self) -> usize {
        self.num_warnings
    }
}

// ---------------------------------------------------------------------------------------------

/// Reporter that stores the rendered diagnostics, used by the tests to check what
/// a compilation reported.
#[derive(Clone, Debug, Default)]
pub struct BufReporter {
    file: String,
    messages: Vec<String>,
    num_errors: usize,
    num_warnings: usize,
}

impl BufReporter {
    pub fn new<T: Into<String>>(file: T) -> Self {
        BufReporter { file: file.into(), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Clears all messages and counters.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.num_errors = 0;
        self.num_warnings = 0;
    }
}

impl Reporter for BufReporter {
    fn error<T: Into<String>>(&mut self, msg: T) {
        self.num_errors += 1;
        self.messages.push(format!("{}: error: {}", self.file, msg.into()));
    }

    fn error_at<T: Into<String>>(&mut self, line: u32, col: u32, msg: T) {
        self.num_errors += 1;
        self.messages.push(format!("{}:{line}:{col}: error: {}", self.file, msg.into()));
    }

    fn warning<T: Into<String>>(&mut self, msg: T) {
        self.num_warnings += 1;
        self.messages.push(format!("{}: warning: {}", self.file, msg.into()));
    }

    fn warning_at<T: Into<String>>(&mut self, line: u32, col: u32, msg: T) {
        self.num_warnings += 1;
        self.messages.push(format!("{}:{line}:{col}: warning: {}", self.file, msg.into()));
    }

    fn num_errors(&self) -> usize {
        self.num_errors
    }

    fn num_warnings(&self) -> usize {
        self.num_warnings
    }
}

// ---------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buf_reporter_renders_positions() {
        let mut log = BufReporter::new("prog.micro");
        log.error_at(3, 7, "invalid token: '%'");
        log.warning("predict conflict");
        assert_eq!(log.messages()[0], "prog.micro:3:7: error: invalid token: '%'");
        assert_eq!(log.messages()[1], "prog.micro: warning: predict conflict");
        assert_eq!(log.num_errors(), 1);
        assert_eq!(log.num_warnings(), 1);
        assert!(log.has_error());
    }

    #[test]
    fn counters_start_clean() {
        let log = BufReporter::new("x");
        assert!(!log.has_error());
        assert_eq!(log.num_warnings(), 0);
    }
}
