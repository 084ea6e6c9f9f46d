// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use crate::emit::CodeEmitter;
use crate::report::Reporter;
use crate::sem_record::{OpKind, SemanticRecord};
use crate::sem_stack::SemanticStack;
use crate::symbol::{ActionInfo, SemArg};
use crate::sym_table::SymbolTable;

/// Name and arity of every semantic routine an action symbol may call.
pub const ROUTINES: [(&str, usize); 10] = [
    ("start", 0),
    ("finish", 0),
    ("processid", 1),
    ("processliteral", 1),
    ("processop", 1),
    ("copy", 2),
    ("assign", 2),
    ("geninfix", 4),
    ("readid", 1),
    ("writeexpr", 1),
];

/// Host of the semantic action routines.
///
/// Executing an action reads and writes the current semantic-stack frame,
/// declares identifiers in the scoped symbol table on first use, and appends
/// tuples to the emitter. All emission goes through the gate: once any error
/// has been reported, the routines still run (so the parse completes and every
/// diagnostic is collected) but stop producing code.
pub struct SemanticRoutines {
    emitter: CodeEmitter,
    sym_table: SymbolTable,
    next_temp: u32,
}

impl SemanticRoutines {
    pub fn new(emitter: CodeEmitter) -> Self {
        SemanticRoutines { emitter, sym_table: SymbolTable::new(), next_temp: 0 }
    }

    /// Checks an action symbol against the routine table, for the grammar
    /// loader: the routine must exist and the argument count must match.
    pub fn validate(action: &ActionInfo) -> Result<(), String> {
        match ROUTINES.iter().find(|(name, _)| *name == action.name) {
            None => Err(format!("unknown semantic routine in action symbol '{}'", action.text)),
            Some((_, arity)) if *arity != action.args.len() =>
                Err(format!("action symbol '{}' passes {} argument(s), routine '{}' takes {}",
                            action.text, action.args.len(), action.name, arity)),
            Some(_) => Ok(()),
        }
    }

    /// Runs the routine named by `action`. A bad routine or argument is
    /// reported as an error, never a panic: the grammar was validated at load
    /// time, so this only fires on a grammar bypassing the loader.
    pub fn execute<R: Reporter>(&mut self, action: &ActionInfo, stack: &mut SemanticStack, reporter: &mut R) {
        if let Err(message) = self.run(action, stack, reporter) {
            reporter.error(message);
        }
    }

    fn run<R: Reporter>(&mut self, action: &ActionInfo, stack: &mut SemanticStack, reporter: &mut R) -> Result<(), String> {
        let arg = |k: usize| -> Result<SemArg, String> {
            action.args.get(k).copied()
                .ok_or_else(|| format!("action symbol '{}' is missing argument {}", action.text, k + 1))
        };
        match action.name.as_str() {
            "start" => {
                self.next_temp = 0;
            }
            "finish" => {
                self.generate(reporter, "HALT", &[]);
            }
            "processid" => {
                let name = stack.record_before_current().extract().to_string();
                let identifier = SemanticRecord::id(name);
                self.check_id(&identifier, reporter);
                stack.set_record(arg(0)?, identifier);
            }
            "processliteral" => {
                let value = stack.record_before_current().extract().to_string();
                stack.set_record(arg(0)?, SemanticRecord::literal(value));
            }
            "processop" => {
                let op = OpKind::from_lexeme(stack.record_before_current().extract());
                stack.set_record(arg(0)?, SemanticRecord::Operator(op));
            }
            "copy" => {
                let record = stack.record(arg(0)?).clone();
                stack.set_record(arg(1)?, record);
            }
            "assign" => {
                let target = stack.record(arg(0)?).operand();
                let source = stack.record(arg(1)?).operand();
                self.generate(reporter, "ASSIGN", &[source.as_str(), target.as_str()]);
            }
            "geninfix" => {
                let e1 = stack.record(arg(0)?).operand();
                let op = stack.record(arg(1)?).extract().to_string();
                let e2 = stack.record(arg(2)?).operand();
                let temporary = self.get_temp();
                self.generate(reporter, &op, &[e1.as_str(), e2.as_str(), temporary.extract()]);
                stack.set_record(arg(3)?, temporary);
            }
            "readid" => {
                let variable = stack.record(arg(0)?).extract().to_string();
                self.generate(reporter, "READI", &[variable.as_str()]);
            }
            "writeexpr" => {
                let expression = stack.record(arg(0)?).operand();
                self.generate(reporter, "WRITEI", &[expression.as_str()]);
            }
            name => return Err(format!("unknown semantic routine '{name}'")),
        }
        Ok(())
    }

    /// Declares the identifier on first sight, in the symbol table and in the
    /// generated code.
    fn check_id<R: Reporter>(&mut self, identifier: &SemanticRecord, reporter: &R) {
        let name = identifier.extract().to_string();
        if self.sym_table.find(&name).is_none() {
            let (_, attributes) = self.sym_table.add(&name);
            let data_type = attributes.data_type.to_string();
            self.generate(reporter, "DECLARE", &[name.as_str(), data_type.as_str()]);
        }
    }

    fn get_temp(&mut self) -> SemanticRecord {
        self.next_temp += 1;
        SemanticRecord::temporary(format!("Temp&{}", self.next_temp))
    }

    fn generate<R: Reporter>(&mut self, reporter: &R, instruction: &str, operands: &[&str]) {
        self.emitter.check_gate(reporter.has_error());
        self.emitter.generate(instruction, operands);
    }

    /// The code emitted so far, for the generation trace.
    pub fn code(&self) -> &[String] {
        self.emitter.code()
    }

    /// The symbol-table contents, for the generation trace.
    pub fn symbols(&self) -> Vec<String> {
        self.sym_table.all_symbols()
    }

    /// Flushes the emitted code to the output sink.
    pub fn finish_output(&mut self) -> std::io::Result<()> {
        self.emitter.finish()
    }
}

// ---------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::BufReporter;
    use crate::token::Token;

    fn action(text: &str) -> ActionInfo {
        ActionInfo::parse(text).unwrap()
    }

    fn host() -> (SemanticRoutines, SemanticStack, BufReporter) {
        (SemanticRoutines::new(CodeEmitter::in_memory()), SemanticStack::new(), BufReporter::new("test"))
    }

    #[test]
    fn validate_knows_the_routine_table() {
        assert!(SemanticRoutines::validate(&action("#start()")).is_ok());
        assert!(SemanticRoutines::validate(&action("#geninfix($$,$1,$2,$3)")).is_ok());
        assert!(SemanticRoutines::validate(&action("#geninfix($$,$1)")).is_err());
        assert!(SemanticRoutines::validate(&action("#frobnicate($$)")).is_err());
    }

    #[test]
    fn processid_declares_once() {
        let (mut routines, mut stack, mut reporter) = host();
        stack.expand(2);
        stack.replace_at_current(SemanticRecord::Placeholder(Token::new("X", 14, 1, 7)));
        routines.execute(&action("#processid($1)"), &mut stack, &mut reporter);
        assert_eq!(stack.record(SemArg::Rhs(1)).extract(), "X");
        assert_eq!(routines.code(), ["(01) (DECLARE, X, Integer)"]);
        assert_eq!(routines.symbols(), ["(0) X"]);

        // a second use, case changed, declares nothing new
        stack.replace_at_current(SemanticRecord::Placeholder(Token::new("x", 14, 2, 1)));
        routines.execute(&action("#processid($2)"), &mut stack, &mut reporter);
        assert_eq!(routines.code().len(), 1);
        assert!(!reporter.has_error());
    }

    #[test]
    fn geninfix_allocates_temporaries() {
        let (mut routines, mut stack, mut reporter) = host();
        routines.execute(&action("#start()"), &mut stack, &mut reporter);
        stack.expand(4);
        stack.set_record(SemArg::Rhs(1), SemanticRecord::literal("1"));
        stack.set_record(SemArg::Rhs(2), SemanticRecord::Operator(OpKind::Plus));
        stack.set_record(SemArg::Rhs(3), SemanticRecord::literal("2"));
        routines.execute(&action("#geninfix($1,$2,$3,$4)"), &mut stack, &mut reporter);
        assert_eq!(routines.code(), ["(01) (ADDI, 1, 2, Temp&1)"]);
        assert_eq!(stack.record(SemArg::Rhs(4)).extract(), "Temp&1");
    }

    #[test]
    fn assign_renders_source_then_target() {
        let (mut routines, mut stack, mut reporter) = host();
        stack.expand(2);
        stack.set_record(SemArg::Rhs(1), SemanticRecord::id("X"));
        stack.set_record(SemArg::Rhs(2), SemanticRecord::temporary("Temp&1"));
        routines.execute(&action("#assign($1,$2)"), &mut stack, &mut reporter);
        assert_eq!(routines.code(), ["(01) (ASSIGN, Temp&1, Addr(X))"]);
    }

    #[test]
    fn read_and_write_render_differently() {
        let (mut routines, mut stack, mut reporter) = host();
        stack.expand(1);
        stack.set_record(SemArg::Rhs(1), SemanticRecord::id("X"));
        routines.execute(&action("#readid($1)"), &mut stack, &mut reporter);
        routines.execute(&action("#writeexpr($1)"), &mut stack, &mut reporter);
        assert_eq!(routines.code(), ["(01) (READI, X)", "(02) (WRITEI, Addr(X))"]);
    }

    #[test]
    fn emission_is_gated_after_an_error() {
        let (mut routines, mut stack, mut reporter) = host();
        routines.execute(&action("#finish()"), &mut stack, &mut reporter);
        reporter.error("some parse error");
        routines.execute(&action("#finish()"), &mut stack, &mut reporter);
        assert_eq!(routines.code(), ["(01) (HALT)"]);
    }

    #[test]
    fn unknown_routine_reports_instead_of_crashing() {
        let (mut routines, mut stack, mut reporter) = host();
        routines.execute(&action("#nosuch()"), &mut stack, &mut reporter);
        assert_eq!(reporter.num_errors(), 1);
        assert!(reporter.messages()[0].contains("unknown semantic routine"));
    }
}
