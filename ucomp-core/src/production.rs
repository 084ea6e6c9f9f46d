// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use crate::{ProdNum, VarId};
use crate::symbol::{Symbol, Symbols};
use crate::CollectJoin;

/// One production of the grammar. Productions are numbered densely from 1 in
/// file order; an empty right-hand side is stored as the single symbol
/// [Symbol::Lambda], never as an empty vector.
#[derive(Clone, PartialEq, Debug)]
pub struct Production {
    pub number: ProdNum,
    pub lhs: VarId,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(number: ProdNum, lhs: VarId) -> Self {
        Production { number, lhs, rhs: Vec::new() }
    }

    /// The right-hand side restricted to grammar symbols (terminals,
    /// nonterminals, lambda), as seen by the FIRST/FOLLOW computations.
    pub fn grammar_rhs(&self) -> impl Iterator<Item = &Symbol> {
        self.rhs.iter().filter(|s| s.is_grammar_symbol())
    }

    /// Number of semantic-stack slots this production's frame needs: one per
    /// terminal or nonterminal of the right-hand side.
    pub fn num_sem_slots(&self) -> u32 {
        self.rhs.iter().filter(|s| s.takes_sem_slot()).count() as u32
    }

    /// `NNN <lhs> -> sym sym ...` (ε-productions render their lambda).
    pub fn to_str(&self, symbols: &Symbols) -> String {
        format!("{:3} {} -> {}",
                self.number,
                symbols.get_nt_name(self.lhs),
                self.rhs.iter().map(|s| s.to_str(symbols)).join(" "))
    }
}

// ---------------------------------------------------------------------------------------------
