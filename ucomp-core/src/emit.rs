// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fs::File;
use std::io::{BufWriter, Write};

/// Sink of the generated intermediate code.
///
/// Tuples are collected in emission order, numbered from 1 and rendered as
/// `(NN) (OP[, A[, B[, C]]])` with the number zero-padded to two digits.
///
/// Emission is gated: the first recorded compile error flips the gate off and
/// every later [generate](CodeEmitter::generate) is a no-op, so a source with
/// errors never produces partial tuple output. The output file is still
/// created up front (an unwritable target must fail before any compilation
/// work) but only receives the tuples on a clean [finish](CodeEmitter::finish).
pub struct CodeEmitter {
    tuples: Vec<String>,
    next_tuple: u32,
    enabled: bool,
    sink: Option<Box<dyn Write>>,
}

impl CodeEmitter {
    /// Emitter writing to `path` on a clean finish.
    pub fn to_file(path: &str) -> std::io::Result<CodeEmitter> {
        let file = File::create(path)?;
        Ok(CodeEmitter {
            tuples: Vec::new(),
            next_tuple: 0,
            enabled: true,
            sink: Some(Box::new(BufWriter::new(file))),
        })
    }

    /// Emitter with no output file, used by the tests and the traces.
    pub fn in_memory() -> CodeEmitter {
        CodeEmitter { tuples: Vec::new(), next_tuple: 0, enabled: true, sink: None }
    }

    /// Closes the gate as soon as any error has been recorded; called by the
    /// semantic routines before each emission.
    pub fn check_gate(&mut self, has_error: bool) {
        if has_error {
            self.enabled = false;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends one tuple, unless the gate is closed.
    pub fn generate(&mut self, instruction: &str, operands: &[&str]) {
        if !self.enabled {
            return;
        }
        self.next_tuple += 1;
        let body = if operands.is_empty() {
            instruction.to_string()
        } else {
            format!("{instruction}, {}", operands.join(", "))
        };
        self.tuples.push(format!("({:02}) ({body})", self.next_tuple));
    }

    /// The tuples emitted so far, for the generation trace.
    pub fn code(&self) -> &[String] {
        &self.tuples
    }

    /// Writes the collected tuples to the output sink. Nothing is written when
    /// the gate closed during compilation.
    pub fn finish(&mut self) -> std::io::Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            if self.enabled {
                for tuple in &self.tuples {
                    writeln!(sink, "{tuple}")?;
                }
            }
            sink.flush()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
