// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use crate::{ActionId, TermId, VarId, EOF_TERMINAL, NO_TERMINAL};

/// Grammar symbol. The four kinds that can appear on the right-hand side of a
/// production; the end-of-production marker used by the parser is *not* a grammar
/// symbol (see [StackItem](crate::parser::StackItem)).
///
/// Symbols are small copyable handles; the names and other per-symbol data live
/// in the [Symbols] registry.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Debug, Hash)]
pub enum Symbol {
    /// Terminal, identified by the ID declared in the language-definition file
    T(TermId),
    /// Nonterminal
    NT(VarId),
    /// The empty right-hand side
    Lambda,
    /// Semantic action, e.g. `#geninfix($$,$1,$2,$3)`
    Action(ActionId),
}

impl Symbol {
    pub fn is_t(&self) -> bool {
        matches!(self, Symbol::T(_))
    }

    pub fn is_nt(&self) -> bool {
        matches!(self, Symbol::NT(_))
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Symbol::Lambda)
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Symbol::Action(_))
    }

    /// Is this symbol visible to the FIRST/FOLLOW computations? Terminals,
    /// nonterminals and lambda are; action symbols are not.
    pub fn is_grammar_symbol(&self) -> bool {
        matches!(self, Symbol::T(_) | Symbol::NT(_) | Symbol::Lambda)
    }

    /// Does this symbol occupy a slot of the semantic-stack frame? Lambda and
    /// action symbols do not.
    pub fn takes_sem_slot(&self) -> bool {
        matches!(self, Symbol::T(_) | Symbol::NT(_))
    }

    pub fn to_str(&self, symbols: &Symbols) -> String {
        symbols.get_name(self)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::T(id) => write!(f, ":{id}"),
            Symbol::NT(id) => write!(f, "{id}"),
            Symbol::Lambda => write!(f, "lambda"),
            Symbol::Action(id) => write!(f, "#{id}"),
        }
    }
}

// ---------------------------------------------------------------------------------------------

/// Argument of a semantic action, referring to a slot of the current
/// semantic-stack frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SemArg {
    /// `$$`: the slot of the production's left-hand side in the parent frame
    Lhs,
    /// `$k`: the k-th grammar-symbol slot of the production's frame (1-based)
    Rhs(u32),
}

impl Display for SemArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SemArg::Lhs => write!(f, "$$"),
            SemArg::Rhs(k) => write!(f, "${k}"),
        }
    }
}

/// Terminal data: display name and optional reserved-word spelling.
#[derive(Clone, PartialEq, Debug)]
pub struct TerminalInfo {
    pub name: String,
    pub reserved: Option<String>,
}

/// Action-symbol data, parsed once at grammar-load time: the text as written in
/// the definition file, the lowercased routine name, and the frame arguments.
#[derive(Clone, PartialEq, Debug)]
pub struct ActionInfo {
    pub text: String,
    pub name: String,
    pub args: Vec<SemArg>,
}

impl ActionInfo {
    /// Parses an action symbol of the form `#name(arg, arg, ...)` where each
    /// argument is `$$` or `$k` (k >= 1). The argument list may be absent or empty.
    pub fn parse(text: &str) -> Result<ActionInfo, String> {
        let body = text.strip_prefix('#')
            .ok_or_else(|| format!("action symbol '{text}' must start with '#'"))?;
        let (name, args) = match body.find('(') {
            None => (body, Vec::new()),
            Some(lparen) => {
                let Some(rparen) = body.rfind(')') else {
                    return Err(format!("action symbol '{text}' is missing ')'"));
                };
                if rparen < lparen {
                    return Err(format!("action symbol '{text}' is missing ')'"));
                }
                let arg_str = &body[lparen + 1..rparen];
                let mut args = Vec::new();
                if !arg_str.trim().is_empty() {
                    for arg in arg_str.split(',') {
                        args.push(Self::parse_arg(arg.trim())
                            .ok_or_else(|| format!("invalid argument '{}' in action symbol '{text}'", arg.trim()))?);
                    }
                }
                (&body[..lparen], args)
            }
        };
        if name.is_empty() {
            return Err(format!("action symbol '{text}' has no routine name"));
        }
        Ok(ActionInfo { text: text.to_string(), name: name.to_lowercase(), args })
    }

    fn parse_arg(arg: &str) -> Option<SemArg> {
        match arg {
            "$$" => Some(SemArg::Lhs),
            _ => {
                let k: u32 = arg.strip_prefix('$')?.parse().ok()?;
                if k >= 1 { Some(SemArg::Rhs(k)) } else { None }
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------

/// Registry of all symbols of a loaded grammar: terminal names and reserved
/// words keyed by their declared IDs, dense nonterminal and action-symbol
/// tables. Symbols are interned here once during grammar load and referenced
/// everywhere else by [Symbol] handles.
///
/// The two built-in terminals are always present: `NoToken` (98), for scans
/// that must not reach the parser, and `EofSym` (99), the end of the source.
#[derive(Clone, Debug)]
pub struct Symbols {
    terminals: BTreeMap<TermId, TerminalInfo>,
    non_terminals: Vec<String>,
    nt_ids: HashMap<String, VarId>,
    actions: Vec<ActionInfo>,
}

impl Symbols {
    pub fn new() -> Self {
        let mut symbols = Symbols {
            terminals: BTreeMap::new(),
            non_terminals: Vec::new(),
            nt_ids: HashMap::new(),
            actions: Vec::new(),
        };
        symbols.terminals.insert(NO_TERMINAL, TerminalInfo { name: "NoToken".to_string(), reserved: None });
        symbols.terminals.insert(EOF_TERMINAL, TerminalInfo { name: "EofSym".to_string(), reserved: None });
        symbols
    }

    // -------------------------------------------------------------------------
    // terminals

    /// Declares a terminal. Fails on a duplicate ID (the built-ins 98 and 99
    /// may be redeclared to rename them).
    pub fn add_terminal(&mut self, id: TermId, name: String, reserved: Option<String>) -> Result<(), String> {
        let builtin = id == NO_TERMINAL || id == EOF_TERMINAL;
        if self.terminals.contains_key(&id) && !builtin {
            return Err(format!("terminal ID {id} ('{name}') is already declared"));
        }
        self.terminals.insert(id, TerminalInfo { name, reserved });
        Ok(())
    }

    /// Finds a terminal by its display name.
    pub fn find_terminal(&self, name: &str) -> Option<TermId> {
        self.terminals.iter().find(|(_, info)| info.name == name).map(|(id, _)| *id)
    }

    pub fn get_terminal(&self, id: TermId) -> Option<&TerminalInfo> {
        self.terminals.get(&id)
    }

    pub fn get_t_name(&self, id: TermId) -> String {
        self.terminals.get(&id).map(|info| info.name.clone()).unwrap_or_else(|| "UnknownToken".to_string())
    }

    /// All declared terminals, in ID order.
    pub fn get_terminals(&self) -> impl Iterator<Item = (TermId, &TerminalInfo)> {
        self.terminals.iter().map(|(id, info)| (*id, info))
    }

    // -------------------------------------------------------------------------
    // nonterminals

    /// Returns the nonterminal with that name, creating it on first sight.
    pub fn intern_nt(&mut self, name: &str) -> VarId {
        match self.nt_ids.get(name) {
            Some(var) => *var,
            None => {
                let var = self.non_terminals.len() as VarId;
                self.non_terminals.push(name.to_string());
                self.nt_ids.insert(name.to_string(), var);
                var
            }
        }
    }

    pub fn find_nt(&self, name: &str) -> Option<VarId> {
        self.nt_ids.get(name).copied()
    }

    pub fn get_nt_name(&self, var: VarId) -> &str {
        &self.non_terminals[var as usize]
    }

    pub fn num_nt(&self) -> usize {
        self.non_terminals.len()
    }

    pub fn get_non_terminals(&self) -> impl Iterator<Item = &String> {
        self.non_terminals.iter()
    }

    // -------------------------------------------------------------------------
    // actions

    /// Parses and registers an action symbol, returning its handle.
    pub fn add_action(&mut self, text: &str) -> Result<ActionId, String> {
        let info = ActionInfo::parse(text)?;
        let id = self.actions.len() as ActionId;
        self.actions.push(info);
        Ok(id)
    }

    pub fn get_action(&self, id: ActionId) -> &ActionInfo {
        &self.actions[id as usize]
    }

    // -------------------------------------------------------------------------

    /// Gets the symbol's display name: the terminal or nonterminal identifier,
    /// the action text, or `lambda`.
    pub fn get_name(&self, symbol: &Symbol) -> String {
        match symbol {
            Symbol::T(id) => self.get_t_name(*id),
            Symbol::NT(var) => self.get_nt_name(*var).to_string(),
            Symbol::Lambda => "lambda".to_string(),
            Symbol::Action(id) => self.get_action(*id).text.clone(),
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Symbols::new()
    }
}

// ---------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse() {
        let info = ActionInfo::parse("#GenInfix($$, $1, $2, $3)").unwrap();
        assert_eq!(info.name, "geninfix");
        assert_eq!(info.args, vec![SemArg::Lhs, SemArg::Rhs(1), SemArg::Rhs(2), SemArg::Rhs(3)]);
        assert_eq!(info.text, "#GenInfix($$, $1, $2, $3)");

        let info = ActionInfo::parse("#start()").unwrap();
        assert_eq!(info.name, "start");
        assert!(info.args.is_empty());

        let info = ActionInfo::parse("#finish").unwrap();
        assert_eq!(info.name, "finish");
        assert!(info.args.is_empty());
    }

    #[test]
    fn action_parse_rejects_malformed() {
        assert!(ActionInfo::parse("start()").is_err());
        assert!(ActionInfo::parse("#copy($1, $2").is_err());
        assert!(ActionInfo::parse("#copy($x)").is_err());
        assert!(ActionInfo::parse("#copy($0)").is_err());
        assert!(ActionInfo::parse("#($$)").is_err());
    }

    #[test]
    fn builtins_always_present() {
        let symbols = Symbols::new();
        assert_eq!(symbols.get_t_name(NO_TERMINAL), "NoToken");
        assert_eq!(symbols.get_t_name(EOF_TERMINAL), "EofSym");
        assert_eq!(symbols.get_t_name(42), "UnknownToken");
    }

    #[test]
    fn terminal_ids_are_unique() {
        let mut symbols = Symbols::new();
        symbols.add_terminal(10, "BeginSym".to_string(), Some("begin".to_string())).unwrap();
        assert!(symbols.add_terminal(10, "Duplicate".to_string(), None).is_err());
        assert_eq!(symbols.find_terminal("BeginSym"), Some(10));
        assert_eq!(symbols.find_terminal("EndSym"), None);
    }

    #[test]
    fn nonterminals_are_interned() {
        let mut symbols = Symbols::new();
        let a = symbols.intern_nt("<program>");
        let b = symbols.intern_nt("<statement list>");
        assert_eq!(symbols.intern_nt("<program>"), a);
        assert_ne!(a, b);
        assert_eq!(symbols.get_nt_name(b), "<statement list>");
    }
}
