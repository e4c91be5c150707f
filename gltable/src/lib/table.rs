use std::{error::Error, fmt};

use glgrammar::{Grammar, PfxIdx, RIdx, SymIdx};

use crate::prefixes::{self, Prefix};

/// The ways table construction can fail. The checks run in the order the
/// variants are listed; `DuplicateProduction` is found during trie
/// construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrefixTableError {
    NoTerminals,
    UnknownGoal(String),
    GoalIsTerminal(String),
    DuplicateProduction(RIdx, RIdx),
}

impl Error for PrefixTableError {}

impl fmt::Display for PrefixTableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrefixTableError::NoTerminals => write!(f, "grammar has no terminal symbols"),
            PrefixTableError::UnknownGoal(name) => {
                write!(f, "unknown goal symbol '{}'", name)
            }
            PrefixTableError::GoalIsTerminal(name) => {
                write!(f, "goal '{}' is a terminal symbol", name)
            }
            PrefixTableError::DuplicateProduction(r1, r2) => write!(
                f,
                "rules {} and {} have the same target and the same items",
                usize::from(*r1),
                usize::from(*r2)
            ),
        }
    }
}

/// A grammar rule renumbered into the table's symbol space.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct CompiledRule {
    pub(crate) name: String,
    pub(crate) target: SymIdx,
    pub(crate) items: Vec<SymIdx>,
    /// The complete node for this rule; filled during trie construction.
    pub(crate) full_prefix: Option<PfxIdx>,
}

/// Everything a chart parser needs to know about one grammar, keyed by
/// integer ids.
///
/// Symbols are renumbered so terminals occupy ids `0..terms_len()` and
/// non-terminals the rest, each class in grammar interning order. With rule
/// insertion order fixed the whole table is deterministic, and so is any
/// parser emitted from it. Rule ids are unchanged from the grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefixTable {
    terms_len: usize,
    sym_names: Vec<String>,
    rules: Vec<CompiledRule>,
    /// Rules of each non-terminal, sorted lexicographically by item ids.
    sorted_rules: Vec<Vec<RIdx>>,
    prefixes: Vec<Prefix>,
    /// The zero-length prefix of each non-terminal.
    prefix0: Vec<PfxIdx>,
    followers: Vec<Vec<PfxIdx>>,
    extensions: Vec<Vec<(PfxIdx, PfxIdx)>>,
    extended_by: Vec<Vec<(PfxIdx, PfxIdx)>>,
    last_terminal: Vec<Option<SymIdx>>,
    symbol_finished: Vec<Option<SymIdx>>,
    prefix_rules: Vec<Option<RIdx>>,
    goal_prefixes: Vec<PfxIdx>,
    goal: SymIdx,
}

impl PrefixTable {
    /// Number the grammar's symbols, build the prefix tries, and derive the
    /// parse tables for `goal`.
    pub fn new(grammar: &Grammar, goal: &str) -> Result<Self, PrefixTableError> {
        // Terminal-first numbering, stable within each class.
        let mut order = Vec::with_capacity(grammar.symbols_len());
        for sidx in grammar.iter_symidxs() {
            if grammar.is_terminal(sidx) {
                order.push(sidx);
            }
        }
        let terms_len = order.len();
        for sidx in grammar.iter_symidxs() {
            if !grammar.is_terminal(sidx) {
                order.push(sidx);
            }
        }
        if terms_len == 0 {
            return Err(PrefixTableError::NoTerminals);
        }

        let mut compiled = vec![SymIdx(0); order.len()];
        let mut sym_names = Vec::with_capacity(order.len());
        for (n, &sidx) in order.iter().enumerate() {
            compiled[usize::from(sidx)] = SymIdx::new(n);
            sym_names.push(grammar.symbol_name(sidx).to_string());
        }

        let goal_sym = match grammar.symbol_idx(goal) {
            Some(sidx) => compiled[usize::from(sidx)],
            None => return Err(PrefixTableError::UnknownGoal(goal.to_string())),
        };
        if usize::from(goal_sym) < terms_len {
            return Err(PrefixTableError::GoalIsTerminal(goal.to_string()));
        }

        let mut rules = Vec::with_capacity(grammar.rules_len());
        for ridx in grammar.iter_ridxs() {
            let r = grammar.rule(ridx);
            rules.push(CompiledRule {
                name: r.name().to_string(),
                target: compiled[usize::from(r.target())],
                items: r
                    .items()
                    .iter()
                    .map(|&i| compiled[usize::from(i)])
                    .collect(),
                full_prefix: None,
            });
        }

        // Sort each non-terminal's rules so rules with common prefixes are
        // adjacent, then build the tries depth-first.
        let mut sorted_rules = Vec::with_capacity(order.len() - terms_len);
        let mut prefixes = Vec::new();
        let mut prefix0 = Vec::with_capacity(order.len() - terms_len);
        for &sidx in &order[terms_len..] {
            let mut rs = grammar.symbol_rules(sidx).to_vec();
            rs.sort_by(|&a, &b| rules[usize::from(a)].items.cmp(&rules[usize::from(b)].items));
            let target = compiled[usize::from(sidx)];
            prefix0.push(prefixes::build(
                &mut prefixes,
                &mut rules,
                target,
                0,
                rs.clone(),
            )?);
            sorted_rules.push(rs);
        }

        let mut table = PrefixTable {
            terms_len,
            sym_names,
            rules,
            sorted_rules,
            prefixes,
            prefix0,
            followers: Vec::new(),
            extensions: Vec::new(),
            extended_by: Vec::new(),
            last_terminal: Vec::new(),
            symbol_finished: Vec::new(),
            prefix_rules: Vec::new(),
            goal_prefixes: Vec::new(),
            goal: goal_sym,
        };
        table.derive();
        Ok(table)
    }

    /// The item symbol consumed by the step from `p` to its child `q`.
    fn step_symbol(&self, p: &Prefix, q: PfxIdx) -> SymIdx {
        let first = self.prefixes[usize::from(q)].rules[0];
        self.rules[usize::from(first)].items[p.length]
    }

    fn derive(&mut self) {
        let plen = self.prefixes.len();
        let mut followers = vec![Vec::new(); plen];
        let mut extensions = vec![Vec::new(); plen];
        let mut extended_by = vec![Vec::new(); self.sym_names.len()];
        let mut last_terminal = vec![None; plen];
        let mut symbol_finished = vec![None; plen];
        let mut prefix_rules = vec![None; plen];

        for (n, p) in self.prefixes.iter().enumerate() {
            let pidx = PfxIdx::new(n);
            for &q in &p.children {
                let s = self.step_symbol(p, q);
                extended_by[usize::from(s)].push((pidx, q));
                if !self.is_terminal(s) {
                    followers[n].push(self.prefix0[usize::from(s) - self.terms_len]);
                    for &r in &self.sorted_rules[usize::from(s) - self.terms_len] {
                        extensions[n]
                            .push((self.rules[usize::from(r)].full_prefix.unwrap(), q));
                    }
                }
            }
            if p.length > 0 {
                let s = self.rules[usize::from(p.rules[0])].items[p.length - 1];
                if self.is_terminal(s) {
                    last_terminal[n] = Some(s);
                }
            }
            if let Some(r) = p.completed_rule(&self.rules) {
                symbol_finished[n] = Some(self.rules[usize::from(r)].target);
                prefix_rules[n] = Some(r);
            }
        }

        self.goal_prefixes = self.sorted_rules[usize::from(self.goal) - self.terms_len]
            .iter()
            .map(|&r| self.rules[usize::from(r)].full_prefix.unwrap())
            .collect();

        self.followers = followers;
        self.extensions = extensions;
        self.extended_by = extended_by;
        self.last_terminal = last_terminal;
        self.symbol_finished = symbol_finished;
        self.prefix_rules = prefix_rules;
    }

    pub fn terms_len(&self) -> usize {
        self.terms_len
    }

    pub fn symbols_len(&self) -> usize {
        self.sym_names.len()
    }

    pub fn rules_len(&self) -> usize {
        self.rules.len()
    }

    pub fn prefixes_len(&self) -> usize {
        self.prefixes.len()
    }

    /// Terminals occupy the low symbol ids.
    pub fn is_terminal(&self, sidx: SymIdx) -> bool {
        usize::from(sidx) < self.terms_len
    }

    pub fn symbol_name(&self, sidx: SymIdx) -> &str {
        &self.sym_names[usize::from(sidx)]
    }

    pub fn symbol_idx(&self, name: &str) -> Option<SymIdx> {
        self.sym_names
            .iter()
            .position(|n| n == name)
            .map(SymIdx::new)
    }

    pub fn rule_name(&self, ridx: RIdx) -> &str {
        &self.rules[usize::from(ridx)].name
    }

    pub fn rule_target(&self, ridx: RIdx) -> SymIdx {
        self.rules[usize::from(ridx)].target
    }

    pub fn rule_items(&self, ridx: RIdx) -> &[SymIdx] {
        &self.rules[usize::from(ridx)].items
    }

    /// The complete prefix node for `ridx`.
    pub fn full_prefix(&self, ridx: RIdx) -> PfxIdx {
        self.rules[usize::from(ridx)].full_prefix.unwrap()
    }

    /// The zero-length prefix node of a non-terminal.
    pub fn prefix0(&self, sidx: SymIdx) -> Option<PfxIdx> {
        if self.is_terminal(sidx) {
            None
        } else {
            Some(self.prefix0[usize::from(sidx) - self.terms_len])
        }
    }

    pub fn prefix_length(&self, pidx: PfxIdx) -> usize {
        self.prefixes[usize::from(pidx)].length
    }

    pub fn prefix_target(&self, pidx: PfxIdx) -> SymIdx {
        self.prefixes[usize::from(pidx)].target
    }

    /// The rules still consistent with prefix `pidx`.
    pub fn prefix_rules(&self, pidx: PfxIdx) -> &[RIdx] {
        &self.prefixes[usize::from(pidx)].rules
    }

    /// The child of `pidx` reached by consuming `item`, if any.
    pub fn prefix_child(&self, pidx: PfxIdx, item: SymIdx) -> Option<PfxIdx> {
        let p = &self.prefixes[usize::from(pidx)];
        p.children
            .iter()
            .copied()
            .find(|&q| self.step_symbol(p, q) == item)
    }

    /// The zero-length prefixes of the non-terminals that can directly
    /// extend `pidx`.
    pub fn followers(&self, pidx: PfxIdx) -> &[PfxIdx] {
        &self.followers[usize::from(pidx)]
    }

    /// Pairs `(by, to)`: a complete match for the rule whose complete node
    /// is `by`, adjacent to the right, extends `pidx` to `to`.
    pub fn extensions(&self, pidx: PfxIdx) -> &[(PfxIdx, PfxIdx)] {
        &self.extensions[usize::from(pidx)]
    }

    /// Pairs `(from, to)`: consuming symbol `sidx` moves `from` to `to`.
    pub fn extended_by(&self, sidx: SymIdx) -> &[(PfxIdx, PfxIdx)] {
        &self.extended_by[usize::from(sidx)]
    }

    /// The terminal whose consumption reaches `pidx`, if the last step into
    /// it was a terminal step.
    pub fn last_terminal(&self, pidx: PfxIdx) -> Option<SymIdx> {
        self.last_terminal[usize::from(pidx)]
    }

    /// The symbol a complete prefix finishes, if `pidx` is complete.
    pub fn symbol_finished(&self, pidx: PfxIdx) -> Option<SymIdx> {
        self.symbol_finished[usize::from(pidx)]
    }

    /// The rule a complete prefix completes.
    pub fn prefix_rule(&self, pidx: PfxIdx) -> Option<RIdx> {
        self.prefix_rules[usize::from(pidx)]
    }

    /// The complete prefixes of the goal symbol's rules.
    pub fn goal_prefixes(&self) -> &[PfxIdx] {
        &self.goal_prefixes
    }

    pub fn goal(&self) -> SymIdx {
        self.goal
    }

    /// Where recognition is seeded: the goal's zero-length prefix.
    pub fn goal_prefix0(&self) -> PfxIdx {
        self.prefix0[usize::from(self.goal) - self.terms_len]
    }
}
