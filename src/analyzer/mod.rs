
use std::collections::{HashMap, HashSet};
use iter_index::IndexerIterator;
use ucomp_core::{ProdNum, VarId};
use ucomp_core::predict::PredictTable;
use ucomp_core::report::Reporter;
use ucomp_core::symbol::{Symbol, Symbols};
use crate::grammar::Grammar;

/// Static analysis of a loaded grammar, computed in fixed order: the
/// derives-λ flags, the FIRST sets, the FOLLOW sets, and the per-production
/// PREDICT sets feeding the LL(1) [PredictTable].
///
/// Lambda takes part in the computations as a grammar symbol, but only
/// survives in the FIRST sets (a λ-deriving nonterminal has λ in FIRST, and
/// FIRST(λ) = {λ}): the FOLLOW and PREDICT sets are λ-free once the analysis
/// is done. Action symbols are invisible throughout.
#[derive(Clone, PartialEq, Debug)]
pub struct Analysis {
    pub derives_lambda: HashSet<Symbol>,
    pub first: HashMap<Symbol, HashSet<Symbol>>,
    pub follow: HashMap<VarId, HashSet<Symbol>>,
    /// `predict[k]` belongs to production `k + 1`
    pub predict: Vec<HashSet<Symbol>>,
}

impl Analysis {
    pub fn analyze(grammar: &Grammar) -> Analysis {
        let derives_lambda = calc_derives_lambda(grammar);
        let first = calc_first(grammar, &derives_lambda);
        let follow = calc_follow(grammar, &first);
        let predict = calc_predict(grammar, &first, &follow);
        Analysis { derives_lambda, first, follow, predict }
    }

    pub fn derives_lambda(&self, symbol: Symbol) -> bool {
        self.derives_lambda.contains(&symbol)
    }

    pub fn predict_of(&self, production: ProdNum) -> &HashSet<Symbol> {
        &self.predict[production as usize - 1]
    }

    /// Builds the predict table. A non-LL(1) grammar is accepted: when two
    /// productions claim the same cell the later one wins, with a warning.
    pub fn build_predict_table<R: Reporter>(&self, grammar: &Grammar, reporter: &mut R) -> PredictTable {
        let mut table = PredictTable::new();
        for (index, predict) in self.predict.iter().index::<ProdNum>() {
            let number = index + 1;
            let production = grammar.get_production(number);
            for symbol in predict {
                if let Symbol::T(terminal) = symbol {
                    if let Some(previous) = table.set(production.lhs, *terminal, number) {
                        reporter.warning(format!(
                            "LL(1) conflict: {} on {} predicts productions {previous} and {number}, keeping {number}",
                            grammar.symbols().get_nt_name(production.lhs),
                            grammar.symbols().get_t_name(*terminal)));
                    }
                }
            }
        }
        table
    }

    /// The analysis report: First, Follow, and Predict sets.
    pub fn to_str(&self, grammar: &Grammar) -> String {
        let symbols = grammar.symbols();
        let mut out = String::new();
        out.push_str("Grammar Analysis\n");
        out.push_str("================\n\n");

        out.push_str("First Sets\n");
        out.push_str("----------\n");
        for var in 0..symbols.num_nt() as VarId {
            let symbol = Symbol::NT(var);
            out.push_str(&format!("{} = {}\n", symbols.get_nt_name(var), fmt_set(&self.first[&symbol], symbols)));
        }
        for (id, info) in symbols.get_terminals() {
            out.push_str(&format!("{} = {}\n", info.name, fmt_set(&self.first[&Symbol::T(id)], symbols)));
        }
        out.push('\n');

        out.push_str("Follow Sets\n");
        out.push_str("-----------\n");
        for var in 0..symbols.num_nt() as VarId {
            out.push_str(&format!("{} = {}\n", symbols.get_nt_name(var), fmt_set(&self.follow[&var], symbols)));
        }
        out.push('\n');

        out.push_str("Predict Sets\n");
        out.push_str("------------\n");
        for (index, predict) in self.predict.iter().index::<ProdNum>() {
            let production = grammar.get_production(index + 1);
            out.push_str(&format!("{} = {}\n", production.to_str(symbols), fmt_set(predict, symbols)));
        }
        out.push('\n');
        out
    }
}

fn fmt_set(set: &HashSet<Symbol>, symbols: &Symbols) -> String {
    let mut names: Vec<String> = set.iter().map(|s| s.to_str(symbols)).collect();
    names.sort();
    format!("{{{}}}", names.join(", "))
}

// ---------------------------------------------------------------------------------------------

/// Fixpoint over the productions: a nonterminal derives λ when some
/// right-hand side has every grammar symbol deriving λ (vacuously true for a
/// right-hand side of action symbols only). Terminals and actions never
/// derive λ; λ itself always does.
fn calc_derives_lambda(grammar: &Grammar) -> HashSet<Symbol> {
    let mut derives = HashSet::from([Symbol::Lambda]);
    let mut change = true;
    while change {
        change = false;
        for production in grammar.productions() {
            let lhs = Symbol::NT(production.lhs);
            if derives.contains(&lhs) {
                continue;
            }
            if production.grammar_rhs().all(|s| derives.contains(s)) {
                derives.insert(lhs);
                change = true;
            }
        }
    }
    derives
}

/// Adds `item` to FIRST(`target`). Adding to λ's own FIRST set is a silent
/// no-op: FIRST(λ) is {λ} by definition and must stay that way.
fn add_first(first: &mut HashMap<Symbol, HashSet<Symbol>>, target: Symbol, item: Symbol) {
    if target == Symbol::Lambda {
        return;
    }
    first.get_mut(&target).unwrap().insert(item);
}

/// FIRST of a symbol string: union of the member FIRST sets up to and
/// including the first member that cannot derive λ; λ itself is in the result
/// only when every member derives λ (so the empty string gives {λ}).
/// Action symbols in the string are skipped.
pub fn compute_first(string: &[Symbol], first: &HashMap<Symbol, HashSet<Symbol>>) -> HashSet<Symbol> {
    let mut result = HashSet::new();
    let mut all_lambda = true;
    for symbol in string.iter().filter(|s| s.is_grammar_symbol()) {
        let symbol_first = &first[symbol];
        result.extend(symbol_first.iter().copied().filter(|s| *s != Symbol::Lambda));
        if !symbol_first.contains(&Symbol::Lambda) {
            all_lambda = false;
            break;
        }
    }
    if all_lambda {
        result.insert(Symbol::Lambda);
    }
    result
}

fn calc_first(grammar: &Grammar, derives_lambda: &HashSet<Symbol>) -> HashMap<Symbol, HashSet<Symbol>> {
    let symbols = grammar.symbols();
    let mut first: HashMap<Symbol, HashSet<Symbol>> = HashMap::new();
    first.insert(Symbol::Lambda, HashSet::from([Symbol::Lambda]));
    for (id, _) in symbols.get_terminals() {
        first.insert(Symbol::T(id), HashSet::from([Symbol::T(id)]));
    }
    for var in 0..symbols.num_nt() as VarId {
        let symbol = Symbol::NT(var);
        let seed = if derives_lambda.contains(&symbol) {
            HashSet::from([Symbol::Lambda])
        } else {
            HashSet::new()
        };
        first.insert(symbol, seed);
    }
    // seed: a right-hand side starting with a terminal puts it in FIRST(lhs)
    for production in grammar.productions() {
        if let Some(symbol) = production.grammar_rhs().next() {
            if symbol.is_t() {
                add_first(&mut first, Symbol::NT(production.lhs), *symbol);
            }
        }
    }
    let mut change = true;
    while change {
        change = false;
        for production in grammar.productions() {
            let lhs = Symbol::NT(production.lhs);
            let rhs: Vec<Symbol> = production.grammar_rhs().copied().collect();
            let rhs_first = compute_first(&rhs, &first);
            let before = first[&lhs].len();
            for symbol in rhs_first {
                add_first(&mut first, lhs, symbol);
            }
            change |= first[&lhs].len() > before;
        }
    }
    first
}

fn calc_follow(grammar: &Grammar, first: &HashMap<Symbol, HashSet<Symbol>>) -> HashMap<VarId, HashSet<Symbol>> {
    let num_nt = grammar.symbols().num_nt() as VarId;
    let mut follow: HashMap<VarId, HashSet<Symbol>> = (0..num_nt).map(|var| (var, HashSet::new())).collect();
    // λ marks the end of input after the start symbol; it is stripped again below
    follow.get_mut(&grammar.start()).unwrap().insert(Symbol::Lambda);

    let mut change = true;
    while change {
        change = false;
        for production in grammar.productions() {
            let rhs: Vec<Symbol> = production.grammar_rhs().copied().collect();
            for (index, symbol) in rhs.iter().enumerate() {
                let Symbol::NT(var) = *symbol else {
                    continue;
                };
                let first_of_rest = compute_first(&rhs[index + 1..], first);
                let has_lambda = first_of_rest.contains(&Symbol::Lambda);
                let lhs_follow = follow[&production.lhs].clone();
                let target = follow.get_mut(&var).unwrap();
                let before = target.len();
                target.extend(first_of_rest.into_iter().filter(|s| *s != Symbol::Lambda));
                if has_lambda {
                    target.extend(lhs_follow);
                }
                change |= target.len() > before;
            }
        }
    }
    for set in follow.values_mut() {
        set.remove(&Symbol::Lambda);
    }
    follow
}

fn calc_predict(
    grammar: &Grammar,
    first: &HashMap<Symbol, HashSet<Symbol>>,
    follow: &HashMap<VarId, HashSet<Symbol>>,
) -> Vec<HashSet<Symbol>> {
    grammar.productions().iter().map(|production| {
        let rhs: Vec<Symbol> = production.grammar_rhs().copied().collect();
        let mut predict = compute_first(&rhs, first);
        if predict.remove(&Symbol::Lambda) {
            predict.extend(follow[&production.lhs].iter().copied());
        }
        predict
    }).collect()
}
