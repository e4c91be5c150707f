use std::{collections::HashMap, error::Error, fmt};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::{RIdx, SymIdx};

lazy_static! {
    static ref RE_IDENTIFIER: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

// Keywords can never name a reduction function or a token type, so they are
// rejected up front rather than left to surface as errors in emitted code.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Is `s` usable as a Rust identifier?
pub fn is_identifier(s: &str) -> bool {
    RE_IDENTIFIER.is_match(s) && !KEYWORDS.contains(&s)
}

/// Which identifier of an [`add_rule`](Grammar::add_rule) call failed
/// validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentKind {
    RuleName,
    TargetSymbol,
    ItemSymbol,
}

/// The ways a rule can be rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GrammarError {
    InvalidIdentifier { kind: IdentKind, value: String },
    DuplicateRuleName { name: String },
}

impl Error for GrammarError {}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::InvalidIdentifier { kind, value } => {
                let what = match kind {
                    IdentKind::RuleName => "rule name",
                    IdentKind::TargetSymbol => "target symbol",
                    IdentKind::ItemSymbol => "rule item",
                };
                write!(f, "{} '{}' is not a valid Rust identifier", what, value)
            }
            GrammarError::DuplicateRuleName { name } => {
                write!(f, "duplicate rule name: {}", name)
            }
        }
    }
}

/// Anything that can have grammar rules fed into it.
///
/// Rule producers (such as the source scanner in the command-line driver)
/// are written against this trait rather than [`Grammar`] directly.
pub trait RuleAdder {
    /// Add one rule to the grammar. Callers should ensure the same name is
    /// never used in two calls.
    fn add_rule(&mut self, name: &str, target: &str, items: &[&str]) -> Result<(), GrammarError>;
}

/// A named production: `target` is produced from the `items` in order.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    name: String,
    target: SymIdx,
    items: Vec<SymIdx>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> SymIdx {
        self.target
    }

    pub fn items(&self) -> &[SymIdx] {
        &self.items
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Sym {
    name: String,
    rules: Vec<RIdx>,
}

/// An accumulating store of grammar rules.
///
/// Symbols are interned on first reference and never removed; rules are
/// append-only. Parsers may be written from the grammar at any point, and
/// more rules added afterwards: a later parser covers the union.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grammar {
    name2symbol: IndexMap<String, SymIdx>,
    symbols: Vec<Sym>,
    rule_names: HashMap<String, RIdx>,
    rules: Vec<Rule>,
}

impl Grammar {
    pub fn new() -> Self {
        Grammar::default()
    }

    /// Add one rule to the grammar.
    ///
    /// `name` must be unique grammar-wide; `name`, `target`, and every item
    /// must be legal Rust identifiers. On error the grammar is unchanged.
    pub fn add_rule(
        &mut self,
        name: &str,
        target: &str,
        items: &[&str],
    ) -> Result<(), GrammarError> {
        if !is_identifier(name) {
            return Err(GrammarError::InvalidIdentifier {
                kind: IdentKind::RuleName,
                value: name.to_string(),
            });
        }
        if !is_identifier(target) {
            return Err(GrammarError::InvalidIdentifier {
                kind: IdentKind::TargetSymbol,
                value: target.to_string(),
            });
        }
        for item in items {
            if !is_identifier(item) {
                return Err(GrammarError::InvalidIdentifier {
                    kind: IdentKind::ItemSymbol,
                    value: item.to_string(),
                });
            }
        }
        if self.rule_names.contains_key(name) {
            return Err(GrammarError::DuplicateRuleName {
                name: name.to_string(),
            });
        }

        // All checks passed; nothing before this point touched the grammar.
        let ridx = RIdx::new(self.rules.len());
        self.rule_names.insert(name.to_string(), ridx);
        let target_idx = self.intern(target);
        let item_idxs = items.iter().map(|i| self.intern(i)).collect();
        self.rules.push(Rule {
            name: name.to_string(),
            target: target_idx,
            items: item_idxs,
        });
        self.symbols[usize::from(target_idx)].rules.push(ridx);
        Ok(())
    }

    fn intern(&mut self, name: &str) -> SymIdx {
        if let Some(&sidx) = self.name2symbol.get(name) {
            return sidx;
        }
        let sidx = SymIdx::new(self.symbols.len());
        self.name2symbol.insert(name.to_string(), sidx);
        self.symbols.push(Sym {
            name: name.to_string(),
            rules: Vec::new(),
        });
        sidx
    }

    /// How many rules does this grammar have?
    pub fn rules_len(&self) -> usize {
        self.rules.len()
    }

    /// How many symbols have been referenced so far?
    pub fn symbols_len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, ridx: RIdx) -> &Rule {
        &self.rules[usize::from(ridx)]
    }

    pub fn rule_idx(&self, name: &str) -> Option<RIdx> {
        self.rule_names.get(name).copied()
    }

    pub fn symbol_name(&self, sidx: SymIdx) -> &str {
        &self.symbols[usize::from(sidx)].name
    }

    /// The rules whose target is `sidx`, in insertion order.
    pub fn symbol_rules(&self, sidx: SymIdx) -> &[RIdx] {
        &self.symbols[usize::from(sidx)].rules
    }

    pub fn symbol_idx(&self, name: &str) -> Option<SymIdx> {
        self.name2symbol.get(name).copied()
    }

    /// Terminal symbols are not produced by any rule.
    pub fn is_terminal(&self, sidx: SymIdx) -> bool {
        self.symbols[usize::from(sidx)].rules.is_empty()
    }

    /// Iterate over all rule indices, in insertion order.
    pub fn iter_ridxs(&self) -> impl Iterator<Item = RIdx> {
        (0..self.rules.len()).map(RIdx::new)
    }

    /// Iterate over all symbol indices, in interning order.
    pub fn iter_symidxs(&self) -> impl Iterator<Item = SymIdx> {
        (0..self.symbols.len()).map(SymIdx::new)
    }
}

impl RuleAdder for Grammar {
    fn add_rule(&mut self, name: &str, target: &str, items: &[&str]) -> Result<(), GrammarError> {
        Grammar::add_rule(self, name, target, items)
    }
}
