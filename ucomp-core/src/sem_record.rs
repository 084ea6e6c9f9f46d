// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fmt::{Display, Formatter};
use crate::token::Token;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExprKind {
    Id,
    Literal,
    Temporary,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpKind {
    Plus,
    Minus,
}

impl OpKind {
    /// Parses the operator lexeme; anything but `-` reads as plus.
    pub fn from_lexeme(lexeme: &str) -> OpKind {
        if lexeme == "-" { OpKind::Minus } else { OpKind::Plus }
    }
}

/// One cell of the semantic stack.
///
/// `Placeholder` wraps a matched token until an action consumes it;
/// `Expression` and `Operator` are produced by the semantic routines; `Error`
/// marks a cell holding nothing (it is also the filler of freshly expanded
/// frames, rendered as an empty placeholder).
#[derive(Clone, Debug)]
pub enum SemanticRecord {
    Expression { kind: ExprKind, value: String },
    Operator(OpKind),
    Error,
    Placeholder(Token),
}

impl SemanticRecord {
    pub fn id<T: Into<String>>(value: T) -> Self {
        SemanticRecord::Expression { kind: ExprKind::Id, value: value.into() }
    }

    pub fn literal<T: Into<String>>(value: T) -> Self {
        SemanticRecord::Expression { kind: ExprKind::Literal, value: value.into() }
    }

    pub fn temporary<T: Into<String>>(value: T) -> Self {
        SemanticRecord::Expression { kind: ExprKind::Temporary, value: value.into() }
    }

    /// The string this record contributes to generated code: the expression
    /// value, the operator's opcode, the wrapped token's lexeme.
    pub fn extract(&self) -> &str {
        match self {
            SemanticRecord::Expression { value, .. } => value,
            SemanticRecord::Operator(OpKind::Plus) => "ADDI",
            SemanticRecord::Operator(OpKind::Minus) => "SUBI",
            SemanticRecord::Error => "",
            SemanticRecord::Placeholder(token) => &token.lexeme,
        }
    }

    /// Rendering as a tuple operand: literals and temporaries stand alone,
    /// identifiers are wrapped as addresses.
    pub fn operand(&self) -> String {
        match self {
            SemanticRecord::Expression { kind: ExprKind::Id, value } => format!("Addr({value})"),
            _ => self.extract().to_string(),
        }
    }
}

impl Default for SemanticRecord {
    fn default() -> Self {
        SemanticRecord::Placeholder(Token::new("", crate::NO_TERMINAL, 0, 0))
    }
}

/// Records compare by record class and extracted string; the expression kinds
/// do not distinguish two records.
impl PartialEq for SemanticRecord {
    fn eq(&self, other: &Self) -> bool {
        let same_class = matches!(
            (self, other),
            (SemanticRecord::Expression { .. }, SemanticRecord::Expression { .. })
            | (SemanticRecord::Operator(_), SemanticRecord::Operator(_))
            | (SemanticRecord::Error, SemanticRecord::Error)
            | (SemanticRecord::Placeholder(_), SemanticRecord::Placeholder(_)));
        same_class && self.extract() == other.extract()
    }
}

impl Display for SemanticRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extract())
    }
}

// ---------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_by_class() {
        assert_eq!(SemanticRecord::id("X").extract(), "X");
        assert_eq!(SemanticRecord::literal("42").extract(), "42");
        assert_eq!(SemanticRecord::Operator(OpKind::Plus).extract(), "ADDI");
        assert_eq!(SemanticRecord::Operator(OpKind::Minus).extract(), "SUBI");
        assert_eq!(SemanticRecord::Error.extract(), "");
        assert_eq!(SemanticRecord::Placeholder(Token::new("begin", 10, 1, 1)).extract(), "begin");
    }

    #[test]
    fn operands_wrap_identifiers_only() {
        assert_eq!(SemanticRecord::id("X").operand(), "Addr(X)");
        assert_eq!(SemanticRecord::literal("42").operand(), "42");
        assert_eq!(SemanticRecord::temporary("Temp&1").operand(), "Temp&1");
    }

    #[test]
    fn equality_is_class_plus_extract() {
        assert_eq!(SemanticRecord::id("x"), SemanticRecord::literal("x"));
        assert_ne!(SemanticRecord::id("x"), SemanticRecord::id("y"));
        assert_ne!(SemanticRecord::id("begin"), SemanticRecord::Placeholder(Token::new("begin", 10, 1, 1)));
    }
}
