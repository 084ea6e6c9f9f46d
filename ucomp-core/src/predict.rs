// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::HashMap;
use crate::{ProdNum, TermId, VarId};
use crate::symbol::Symbols;

/// LL(1) predict table: `(nonterminal, lookahead terminal) -> production number`.
/// The table is sparse; [lookup](PredictTable::lookup) returns 0 for an absent
/// cell and never fails.
#[derive(Clone, Debug, Default)]
pub struct PredictTable {
    table: HashMap<(VarId, TermId), ProdNum>,
}

impl PredictTable {
    pub fn new() -> Self {
        PredictTable::default()
    }

    /// Sets one cell, returning the previous production number if the cell was
    /// already taken (an LL(1) conflict; the caller decides how to report it).
    pub fn set(&mut self, nt: VarId, terminal: TermId, production: ProdNum) -> Option<ProdNum> {
        self.table.insert((nt, terminal), production)
    }

    /// Production predicted for `nt` on lookahead `terminal`; 0 if none.
    pub fn lookup(&self, nt: VarId, terminal: TermId) -> ProdNum {
        self.table.get(&(nt, terminal)).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Renders the table as a grid, terminals as columns and nonterminals as
    /// rows, production numbers in the cells.
    pub fn to_str(&self, symbols: &Symbols) -> String {
        let mut terminals: Vec<TermId> = self.table.keys().map(|(_, t)| *t).collect();
        terminals.sort_unstable();
        terminals.dedup();
        let mut vars: Vec<VarId> = self.table.keys().map(|(nt, _)| *nt).collect();
        vars.sort_unstable();
        vars.dedup();

        let row_width = vars.iter()
            .map(|v| symbols.get_nt_name(*v).len())
            .max().unwrap_or(0)
            .max("Predict Table".len());
        let col_widths: Vec<usize> = terminals.iter()
            .map(|t| symbols.get_t_name(*t).len().max(3))
            .collect();

        let mut out = String::new();
        out.push_str(&format!("{:row_width$}\n", "Predict Table"));
        out.push_str(&format!("{:row_width$}\n", "============="));
        out.push_str(&format!("{:row_width$}", ""));
        for (t, width) in terminals.iter().zip(&col_widths) {
            out.push_str(&format!(" | {:>width$}", symbols.get_t_name(*t)));
        }
        out.push('\n');
        for nt in vars {
            out.push_str(&format!("{:row_width$}", symbols.get_nt_name(nt)));
            for (t, width) in terminals.iter().zip(&col_widths) {
                match self.lookup(nt, *t) {
                    0 => out.push_str(&format!(" | {:>width$}", "")),
                    p => out.push_str(&format!(" | {p:>width$}")),
                }
            }
            out.push('\n');
        }
        out
    }
}

// ---------------------------------------------------------------------------------------------
