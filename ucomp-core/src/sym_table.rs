// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fmt::{Display, Formatter};

/// Data type of a declared identifier. The language only knows integers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DataType {
    #[default]
    Integer,
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Integer => write!(f, "Integer"),
        }
    }
}

/// Attributes stored with each identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SymbolAttributes {
    pub data_type: DataType,
}

/// Error of [destroy_scope](SymbolTable::destroy_scope) at the outermost level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScopeUnderflow;

impl Display for ScopeUnderflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot reduce scope any further, already at minimum level")
    }
}

impl std::error::Error for ScopeUnderflow {}

// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct HashNode {
    /// Position of the identifier in the bucket's arena
    index: usize,
    length: usize,
    scope: u32,
    attributes: SymbolAttributes,
}

/// Per-bucket identifier storage: fixed-size segments addressed by
/// `(index / SEGMENT_SIZE, index % SEGMENT_SIZE)`. An identifier that would
/// cross a segment boundary is placed at the start of the next segment.
#[derive(Clone, Debug, Default)]
struct Arena {
    segments: Vec<Box<[u8; SymbolTable::SEGMENT_SIZE]>>,
}

impl Arena {
    fn store(&mut self, index: usize, name: &[u8]) {
        let segment = index / SymbolTable::SEGMENT_SIZE;
        let offset = index % SymbolTable::SEGMENT_SIZE;
        while self.segments.len() <= segment {
            self.segments.push(Box::new([0; SymbolTable::SEGMENT_SIZE]));
        }
        self.segments[segment][offset..offset + name.len()].copy_from_slice(name);
    }

    fn get(&self, index: usize, length: usize) -> &[u8] {
        let segment = index / SymbolTable::SEGMENT_SIZE;
        let offset = index % SymbolTable::SEGMENT_SIZE;
        &self.segments[segment][offset..offset + length]
    }
}

// ---------------------------------------------------------------------------------------------

/// Scoped identifier table: a fixed-size hash of LIFO collision chains, with
/// the identifier text kept in per-bucket segment arenas.
///
/// Scopes are levels starting at 0. [add](SymbolTable::add) only looks at the
/// current scope, so the same name may shadow an outer declaration;
/// [find](SymbolTable::find) sees every scope, newest declaration first.
/// Lookups are case-insensitive; the stored spelling is the declared one.
pub struct SymbolTable {
    buckets: Vec<Vec<HashNode>>,
    arenas: Vec<Arena>,
    scope: u32,
}

impl SymbolTable {
    /// Number of hash buckets (prime).
    pub const TABLE_SIZE: usize = 17;
    /// Size of one arena segment in bytes.
    pub const SEGMENT_SIZE: usize = 500;

    pub fn new() -> Self {
        SymbolTable {
            buckets: vec![Vec::new(); Self::TABLE_SIZE],
            arenas: vec![Arena::default(); Self::TABLE_SIZE],
            scope: 0,
        }
    }

    pub fn scope_level(&self) -> u32 {
        self.scope
    }

    fn hash(identifier: &str) -> usize {
        let sum: u32 = identifier.bytes().map(|b| b.to_ascii_lowercase() as u32).sum();
        sum as usize % Self::TABLE_SIZE
    }

    fn matches(&self, bucket: usize, node: &HashNode, identifier: &str) -> bool {
        node.length == identifier.len()
            && self.arenas[bucket].get(node.index, node.length).eq_ignore_ascii_case(identifier.as_bytes())
    }

    fn find_from_scope(&self, identifier: &str, bucket: usize, min_scope: u32) -> Option<SymbolAttributes> {
        self.buckets[bucket].iter().rev()
            .filter(|node| node.scope >= min_scope)
            .find(|node| self.matches(bucket, node, identifier))
            .map(|node| node.attributes)
    }

    /// Adds `identifier` at the current scope. If it is already declared at
    /// this scope, returns `(true, existing attributes)` and changes nothing;
    /// otherwise the identifier is stored and `(false, fresh attributes)` is
    /// returned.
    pub fn add(&mut self, identifier: &str) -> (bool, SymbolAttributes) {
        let bucket = Self::hash(identifier);
        if let Some(attributes) = self.find_from_scope(identifier, bucket, self.scope) {
            return (true, attributes);
        }
        let mut index = match self.buckets[bucket].last() {
            Some(newest) => newest.index + newest.length,
            None => 0,
        };
        let offset = index % Self::SEGMENT_SIZE;
        if offset + identifier.len() > Self::SEGMENT_SIZE {
            index += Self::SEGMENT_SIZE - offset;
        }
        self.arenas[bucket].store(index, identifier.as_bytes());
        let attributes = SymbolAttributes::default();
        self.buckets[bucket].push(HashNode {
            index,
            length: identifier.len(),
            scope: self.scope,
            attributes,
        });
        (false, attributes)
    }

    /// Finds `identifier` in any scope visible from the current one, taking
    /// the most recent declaration.
    pub fn find(&self, identifier: &str) -> Option<SymbolAttributes> {
        self.find_from_scope(identifier, Self::hash(identifier), 0)
    }

    pub fn create_scope(&mut self) {
        self.scope += 1;
    }

    /// Leaves the current scope, dropping every identifier declared in it.
    pub fn destroy_scope(&mut self) -> Result<(), ScopeUnderflow> {
        if self.scope == 0 {
            return Err(ScopeUnderflow);
        }
        self.scope -= 1;
        let scope = self.scope;
        for bucket in &mut self.buckets {
            while bucket.last().map(|node| node.scope > scope).unwrap_or(false) {
                bucket.pop();
            }
        }
        Ok(())
    }

    /// Every stored identifier rendered as `(level) name`, newest first within
    /// each bucket; used by the generation trace.
    pub fn all_symbols(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        for (bucket, nodes) in self.buckets.iter().enumerate() {
            for node in nodes.iter().rev() {
                let name = String::from_utf8_lossy(self.arenas[bucket].get(node.index, node.length));
                symbols.push(format!("({}) {}", node.scope, name));
            }
        }
        symbols
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

// ---------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_find_round_trip() {
        let mut table = SymbolTable::new();
        let (found, attributes) = table.add("X");
        assert!(!found);
        assert_eq!(attributes.data_type, DataType::Integer);
        assert_eq!(table.find("X"), Some(attributes));
        let (found, _) = table.add("X");
        assert!(found);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut table = SymbolTable::new();
        table.add("Counter");
        assert!(table.find("COUNTER").is_some());
        assert!(table.find("counter").is_some());
        let (found, _) = table.add("cOuNtEr");
        assert!(found);
    }

    #[test]
    fn scopes_shadow_and_unwind() {
        let mut table = SymbolTable::new();
        table.add("x");
        table.create_scope();
        // not present at the new scope, so add succeeds again
        let (found, _) = table.add("x");
        assert!(!found);
        assert_eq!(table.all_symbols().len(), 2);
        table.destroy_scope().unwrap();
        assert_eq!(table.all_symbols().len(), 1);
        assert!(table.find("x").is_some());
    }

    #[test]
    fn destroy_scope_underflows_at_level_zero() {
        let mut table = SymbolTable::new();
        assert_eq!(table.destroy_scope(), Err(ScopeUnderflow));
        table.create_scope();
        assert!(table.destroy_scope().is_ok());
        assert_eq!(table.destroy_scope(), Err(ScopeUnderflow));
    }

    #[test]
    fn all_symbols_render_scope_levels() {
        let mut table = SymbolTable::new();
        table.add("x");
        table.create_scope();
        table.add("y");
        let symbols = table.all_symbols();
        assert!(symbols.contains(&"(0) x".to_string()));
        assert!(symbols.contains(&"(1) y".to_string()));
    }

    #[test]
    fn colliding_names_chain_in_one_bucket() {
        // "ab" and "ba" hash identically (sum of bytes)
        let mut table = SymbolTable::new();
        table.add("ab");
        table.add("ba");
        assert!(table.find("ab").is_some());
        assert!(table.find("ba").is_some());
    }

    #[test]
    fn arena_segment_boundary() {
        let mut table = SymbolTable::new();
        // 25 distinct 30-byte names with identical byte sums: same bucket,
        // 750 bytes of text, so the arena must cross a segment boundary
        let mut names = Vec::new();
        for i in 0..25u8 {
            let n = format!("{}{}{}",
                            "a".repeat(28),
                            (b'a' + i) as char,
                            (b'z' - i) as char);
            let (found, _) = table.add(&n);
            assert!(!found);
            names.push(n);
        }
        for n in &names {
            assert!(table.find(n).is_some(), "lost identifier {n}");
        }
    }
}
