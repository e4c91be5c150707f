//! Chart recognition and trace extraction, run directly against a
//! [`PrefixTable`].
//!
//! Input tokens arrive already classified as terminal symbol ids; the
//! emitted parser's `token_type` dispatcher is the only place real token
//! values exist. Handing in a non-terminal id is a programmer error and
//! panics, mirroring the emitted dispatcher's behavior for undeclared token
//! types.

use std::collections::HashMap;

use glerrors::{Location, ParseError, Range, Rule};
use glgrammar::{PfxIdx, RIdx, SymIdx};
use gltable::PrefixTable;

/// One step of a reduction trace.
///
/// A trace is recorded goal-first and replayed in reverse, so that playback
/// meets tokens left to right.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceStep {
    /// Consume the next input token; it belongs to the given terminal.
    Consume(SymIdx),
    /// Apply the rule whose complete prefix node this is.
    Apply(PfxIdx),
}

/// A recognition state: some derivation of `prefix`'s target reaches
/// `prefix` over the span `start..end`. `shorter` is the match this one
/// extends (same target, one item fewer); `last` is the completed sub-match
/// consumed by the final step, where that step was a non-terminal.
///
/// `shorter2`/`last2` hold one alternative set of predecessors discovered
/// later; their presence is what ambiguity detection keys on.
#[derive(Clone, Copy, Debug)]
struct Match {
    prefix: PfxIdx,
    complete_prefix: Option<PfxIdx>,
    start: usize,
    end: usize,
    shorter: Option<usize>,
    last: Option<usize>,
    shorter2: Option<usize>,
    last2: Option<usize>,
}

struct Parser<'a> {
    tables: &'a PrefixTable,
    tokens: &'a [SymIdx],
    /// All matches, in creation order; back-pointers are indices here.
    matches: Vec<Match>,
    /// Per end position, the matches ending there, grouped by prefix.
    by_end: Vec<HashMap<PfxIdx, Vec<usize>>>,
    /// Per end position, the matches not yet processed.
    todo: Vec<Vec<usize>>,
    trace: Vec<TraceStep>,
}

/// Recognize `tokens` and extract a reduction trace for the table's goal
/// symbol.
///
/// # Panics
///
/// If any element of `tokens` is not a terminal symbol id.
pub fn parse(tables: &PrefixTable, tokens: &[SymIdx]) -> Result<Vec<TraceStep>, ParseError> {
    for &t in tokens {
        if !tables.is_terminal(t) {
            panic!(
                "input token {} ({}) is not a terminal symbol",
                usize::from(t),
                tables.symbol_name(t)
            );
        }
    }
    if tokens.is_empty() {
        return Err(ParseError::NoInput);
    }

    let n = tokens.len();
    let mut parser = Parser {
        tables,
        tokens,
        matches: Vec::new(),
        by_end: (0..=n).map(|_| HashMap::new()).collect(),
        todo: vec![Vec::new(); n + 1],
        trace: Vec::new(),
    };
    parser.find_matches()?;
    parser.find_trace()?;
    Ok(parser.trace)
}

impl<'a> Parser<'a> {
    /// Record a match unless an equal one exists. A second arrival at the
    /// same (prefix, start, end) with different predecessors fills the
    /// alternative slot once; further evidence is dropped, since one
    /// alternative is enough to detect ambiguity.
    fn add_match(
        &mut self,
        prefix: PfxIdx,
        start: usize,
        end: usize,
        shorter: Option<usize>,
        last: Option<usize>,
    ) {
        let mut found = None;
        if let Some(list) = self.by_end[end].get(&prefix) {
            for &mi in list {
                if self.matches[mi].start == start {
                    found = Some(mi);
                    break;
                }
            }
        }
        if let Some(mi) = found {
            let m = &mut self.matches[mi];
            if (m.shorter != shorter || m.last != last) && m.shorter2.is_none() {
                m.shorter2 = shorter;
                m.last2 = last;
            }
            return;
        }

        let mi = self.matches.len();
        self.matches.push(Match {
            prefix,
            complete_prefix: None,
            start,
            end,
            shorter,
            last,
            shorter2: None,
            last2: None,
        });
        self.by_end[end].entry(prefix).or_default().push(mi);
        self.todo[end].push(mi);
    }

    /// The matches ending at `end` under `prefix`, snapshotted so callers
    /// can add matches while walking them.
    fn matches_at(&self, end: usize, prefix: PfxIdx) -> Vec<(usize, usize)> {
        match self.by_end[end].get(&prefix) {
            Some(list) => list
                .iter()
                .map(|&mi| (mi, self.matches[mi].start))
                .collect(),
            None => Vec::new(),
        }
    }

    fn find_matches(&mut self) -> Result<(), ParseError> {
        let tables = self.tables;
        self.add_match(tables.goal_prefix0(), 0, 0, None, None);

        for end in 0..self.todo.len() {
            let token = self.tokens.get(end).copied();

            let mut k = 0;
            while k < self.todo[end].len() {
                let ti = self.todo[end][k];
                k += 1;
                let (t_prefix, t_start) = (self.matches[ti].prefix, self.matches[ti].start);

                // Prediction: every non-terminal that may start here.
                for &q in tables.followers(t_prefix) {
                    self.add_match(q, end, end, None, None);
                }

                // A completed non-terminal sitting to our right extends us.
                for &(by, to) in tables.extensions(t_prefix) {
                    let sub = self
                        .matches_at(end, by)
                        .into_iter()
                        .find(|&(_, s)| s == end);
                    if let Some((mi, _)) = sub {
                        self.add_match(to, t_start, end, Some(ti), Some(mi));
                    }
                }

                // If we completed a non-terminal, extend everything that was
                // waiting for it at our start position.
                if let Some(finished) = tables.symbol_finished(t_prefix) {
                    for &(from, to) in tables.extended_by(finished) {
                        for (mi, mstart) in self.matches_at(t_start, from) {
                            self.add_match(to, mstart, end, Some(mi), Some(ti));
                        }
                    }
                }

                // Terminal shift into the next end position.
                if let Some(tok) = token {
                    for &(from, to) in tables.extended_by(tok) {
                        for (mi, mstart) in self.matches_at(end, from) {
                            self.add_match(to, mstart, end + 1, Some(mi), None);
                        }
                    }
                }
            }

            if let Some(tok) = token {
                if self.todo[end + 1].is_empty() {
                    return Err(ParseError::Unexpected {
                        location: Location {
                            index: end,
                            token: Some(tables.symbol_name(tok).to_string()),
                        },
                    });
                }
            }
        }
        Ok(())
    }

    fn rule_desc(&self, ridx: RIdx) -> Rule {
        let t = self.tables;
        Rule {
            name: t.rule_name(ridx).to_string(),
            target: t.symbol_name(t.rule_target(ridx)).to_string(),
            items: t
                .rule_items(ridx)
                .iter()
                .map(|&s| t.symbol_name(s).to_string())
                .collect(),
        }
    }

    /// Report the two rules derivable over `m1`'s span. Both arguments must
    /// already carry a `complete_prefix`.
    fn ambiguous(&self, m1: usize, m2: usize) -> ParseError {
        let desc = |mi: usize| {
            let p = self.matches[mi].complete_prefix.unwrap();
            self.rule_desc(self.tables.prefix_rule(p).unwrap())
        };
        ParseError::Ambiguous {
            range: Range {
                start: self.matches[m1].start,
                end: self.matches[m1].end,
            },
            rule1: desc(m1),
            rule2: desc(m2),
        }
    }

    /// Walk backwards from the goal match, emitting the reduction trace and
    /// watching for alternative predecessors. The walk carries an explicit
    /// match stack so deeply nested input cannot overflow the call stack.
    fn find_trace(&mut self) -> Result<(), ParseError> {
        let n = self.tokens.len();

        let goal_prefixes = self.tables.goal_prefixes();
        let mut goalmatch = None;
        for &p in goal_prefixes {
            let found = self
                .matches_at(n, p)
                .into_iter()
                .find(|&(_, start)| start == 0);
            if let Some((mi, _)) = found {
                let prefix = self.matches[mi].prefix;
                self.matches[mi].complete_prefix = Some(prefix);
                match goalmatch {
                    None => goalmatch = Some(mi),
                    Some(g) => return Err(self.ambiguous(g, mi)),
                }
            }
        }
        let goalmatch = match goalmatch {
            Some(g) => g,
            None => {
                return Err(ParseError::Unexpected {
                    location: Location {
                        index: n,
                        token: None,
                    },
                })
            }
        };

        self.trace.clear();
        self.trace
            .push(TraceStep::Apply(self.matches[goalmatch].prefix));

        let mut stack = vec![goalmatch];
        while let Some(mi) = stack.pop() {
            let m = self.matches[mi];

            // A shorter match belongs to the same derivation as its parent;
            // a last match starts a completed sub-derivation of its own.
            if let Some(s) = m.shorter {
                self.matches[s].complete_prefix = m.complete_prefix;
            }
            if let Some(s2) = m.shorter2 {
                self.matches[s2].complete_prefix = m.complete_prefix;
            }
            if let Some(l) = m.last {
                let p = self.matches[l].prefix;
                self.matches[l].complete_prefix = Some(p);
            }
            if let Some(l2) = m.last2 {
                let p = self.matches[l2].prefix;
                self.matches[l2].complete_prefix = Some(p);
            }

            if m.shorter2.is_some() || m.last2.is_some() {
                if m.shorter2.is_some() && m.shorter2 != m.shorter {
                    return Err(self.ambiguous(mi, mi));
                }
                match (m.last, m.last2) {
                    (Some(l), Some(l2)) if l != l2 => return Err(self.ambiguous(l, l2)),
                    _ => unreachable!("alternative predecessors must differ in their last match"),
                }
            }

            if let Some(s) = m.shorter {
                stack.push(s);
            }
            if let Some(l) = m.last {
                self.trace.push(TraceStep::Apply(self.matches[l].prefix));
                stack.push(l);
            } else if let Some(t) = self.tables.last_terminal(m.prefix) {
                self.trace.push(TraceStep::Consume(t));
            }
        }
        Ok(())
    }
}

/// Replay a trace, building one value per reduction.
///
/// `token_value` maps an input position to the value of the token there;
/// `reduce` receives each rule with its item values in rule order and
/// returns the target value. One stack is kept per symbol; after the whole
/// trace runs, the goal stack holds exactly one value, which is returned.
///
/// # Panics
///
/// If `trace` was not produced by [`parse`] over the same table and input
/// length.
pub fn apply_trace<V>(
    tables: &PrefixTable,
    trace: &[TraceStep],
    mut token_value: impl FnMut(usize) -> V,
    mut reduce: impl FnMut(RIdx, Vec<V>) -> V,
) -> V {
    let mut stacks: Vec<Vec<V>> = (0..tables.symbols_len()).map(|_| Vec::new()).collect();
    let mut tokens_used = 0;

    for step in trace.iter().rev() {
        match *step {
            TraceStep::Consume(s) => {
                let v = token_value(tokens_used);
                tokens_used += 1;
                stacks[usize::from(s)].push(v);
            }
            TraceStep::Apply(p) => {
                let ridx = tables.prefix_rule(p).unwrap();
                let items = tables.rule_items(ridx);
                let mut args = Vec::with_capacity(items.len());
                for &item in items.iter().rev() {
                    args.push(stacks[usize::from(item)].pop().unwrap());
                }
                args.reverse();
                let v = reduce(ridx, args);
                stacks[usize::from(tables.rule_target(ridx))].push(v);
            }
        }
    }
    stacks[usize::from(tables.goal())].pop().unwrap()
}

#[cfg(test)]
pub(crate) mod test {
    use glgrammar::Grammar;

    use super::*;

    pub(crate) fn arith_grammar() -> Grammar {
        let mut g = Grammar::new();
        g.add_rule("RuleSum", "Sum", &["Product"]).unwrap();
        g.add_rule("RuleAdd", "Sum", &["Sum", "Plus", "Product"]).unwrap();
        g.add_rule("RuleSubtract", "Sum", &["Sum", "Minus", "Product"]).unwrap();
        g.add_rule("RuleProduct", "Product", &["Item"]).unwrap();
        g.add_rule("RuleMultiply", "Product", &["Product", "Times", "Item"]).unwrap();
        g.add_rule("RuleDivide", "Product", &["Product", "Divide", "Item"]).unwrap();
        g.add_rule("RuleParenthesis", "Item", &["Open", "Sum", "Close"]).unwrap();
        g.add_rule("RuleItem", "Item", &["Int"]).unwrap();
        g
    }

    fn toks(t: &PrefixTable, names: &[&str]) -> Vec<SymIdx> {
        names.iter().map(|n| t.symbol_idx(n).unwrap()).collect()
    }

    /// Tokenize, parse, and evaluate an arithmetic expression.
    fn arith_eval(expr: &str) -> Result<i64, ParseError> {
        let t = PrefixTable::new(&arith_grammar(), "Sum").unwrap();
        let mut syms = Vec::new();
        let mut vals = Vec::new();
        for w in expr.split_whitespace() {
            let (name, v) = match w {
                "+" => ("Plus", 0),
                "-" => ("Minus", 0),
                "*" => ("Times", 0),
                "/" => ("Divide", 0),
                "(" => ("Open", 0),
                ")" => ("Close", 0),
                _ => ("Int", w.parse().unwrap()),
            };
            syms.push(t.symbol_idx(name).unwrap());
            vals.push(v);
        }
        let trace = parse(&t, &syms)?;
        Ok(apply_trace(
            &t,
            &trace,
            |i| vals[i],
            |r, args| match t.rule_name(r) {
                "RuleSum" | "RuleProduct" | "RuleItem" => args[0],
                "RuleAdd" => args[0] + args[2],
                "RuleSubtract" => args[0] - args[2],
                "RuleMultiply" => args[0] * args[2],
                "RuleDivide" => args[0] / args[2],
                "RuleParenthesis" => args[1],
                name => panic!("unknown rule {}", name),
            },
        ))
    }

    #[test]
    fn test_simple_sum() {
        let mut g = Grammar::new();
        g.add_rule("RuleInt", "Sum", &["Int"]).unwrap();
        g.add_rule("RuleAdd", "Sum", &["Sum", "Plus", "Int"]).unwrap();
        let t = PrefixTable::new(&g, "Sum").unwrap();

        let vals = [9, 0, 8];
        let trace = parse(&t, &toks(&t, &["Int", "Plus", "Int"])).unwrap();
        let r = apply_trace(
            &t,
            &trace,
            |i| vals[i],
            |r, args| match t.rule_name(r) {
                "RuleInt" => args[0],
                "RuleAdd" => args[0] + args[2],
                _ => unreachable!(),
            },
        );
        assert_eq!(r, 17);
    }

    #[test]
    fn test_sum_and_difference() {
        let mut g = Grammar::new();
        g.add_rule("RuleInt", "Sum", &["Int"]).unwrap();
        g.add_rule("RuleAdd", "Sum", &["Sum", "Plus", "Int"]).unwrap();
        g.add_rule("RuleSubtract", "Sum", &["Sum", "Minus", "Int"]).unwrap();
        let t = PrefixTable::new(&g, "Sum").unwrap();

        // 7 - 20 + 3, left associative.
        let vals = [7, 0, 20, 0, 3];
        let trace = parse(&t, &toks(&t, &["Int", "Minus", "Int", "Plus", "Int"])).unwrap();
        let r = apply_trace(
            &t,
            &trace,
            |i| vals[i],
            |r, args| match t.rule_name(r) {
                "RuleInt" => args[0],
                "RuleAdd" => args[0] + args[2],
                "RuleSubtract" => args[0] - args[2],
                _ => unreachable!(),
            },
        );
        assert_eq!(r, -10);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(arith_eval("5").unwrap(), 5);
        assert_eq!(arith_eval("9 / 3").unwrap(), 3);
        assert_eq!(arith_eval("( 2 + 1 ) * ( 7 - 2 )").unwrap(), 15);
        assert_eq!(arith_eval("1 * ( 1 + 1 ) * 3 * ( 3 + 1 )").unwrap(), 24);
        assert_eq!(arith_eval("1 + 2 * 3").unwrap(), 7);
        assert_eq!(arith_eval("1 * 2 + 3").unwrap(), 5);
    }

    #[test]
    fn test_deep_nesting() {
        let mut expr = String::new();
        for _ in 0..9 {
            expr.push_str("( ");
        }
        expr.push_str("17");
        for _ in 0..9 {
            expr.push_str(" )");
        }
        assert_eq!(arith_eval(&expr).unwrap(), 17);
    }

    #[test]
    fn test_no_input() {
        let t = PrefixTable::new(&arith_grammar(), "Sum").unwrap();
        assert_eq!(parse(&t, &[]).unwrap_err(), ParseError::NoInput);
    }

    #[test]
    fn test_unexpected_token() {
        let t = PrefixTable::new(&arith_grammar(), "Sum").unwrap();
        // 3 17: no operator between the two integers.
        let e = parse(&t, &toks(&t, &["Int", "Int"])).unwrap_err();
        assert_eq!(
            e,
            ParseError::Unexpected {
                location: Location {
                    index: 1,
                    token: Some("Int".to_string()),
                },
            }
        );
    }

    #[test]
    fn test_unexpected_end() {
        let t = PrefixTable::new(&arith_grammar(), "Sum").unwrap();
        // 100 +: incomplete.
        let e = parse(&t, &toks(&t, &["Int", "Plus"])).unwrap_err();
        assert_eq!(
            e,
            ParseError::Unexpected {
                location: Location {
                    index: 2,
                    token: None,
                },
            }
        );
        assert_eq!(e.to_string(), "unexpected end of input");
    }

    #[test]
    fn test_unexpected_first_token() {
        // The goal can only start with Int; Open is a declared terminal
        // that cannot begin any derivation of it.
        let mut g = Grammar::new();
        g.add_rule("RuleGoal", "Goal", &["A"]).unwrap();
        g.add_rule("RuleA", "A", &["Int"]).unwrap();
        g.add_rule("RulePair", "Pair", &["Open", "Close"]).unwrap();
        let t = PrefixTable::new(&g, "Goal").unwrap();
        let e = parse(&t, &toks(&t, &["Open", "Close"])).unwrap_err();
        assert_eq!(
            e,
            ParseError::Unexpected {
                location: Location {
                    index: 0,
                    token: Some("Open".to_string()),
                },
            }
        );
    }

    #[test]
    #[should_panic(expected = "is not a terminal symbol")]
    fn test_nonterminal_token_panics() {
        let t = PrefixTable::new(&arith_grammar(), "Sum").unwrap();
        let sum = t.symbol_idx("Sum").unwrap();
        let _ = parse(&t, &[sum]);
    }

    #[test]
    fn test_ambiguous_same_rule() {
        // Expr -> Int | Expr Plus Expr is ambiguous for 2 + 3 + 5, with
        // RuleAdd derivable two ways over the whole span.
        let mut g = Grammar::new();
        g.add_rule("RuleInt", "Expr", &["Int"]).unwrap();
        g.add_rule("RuleAdd", "Expr", &["Expr", "Plus", "Expr"]).unwrap();
        let t = PrefixTable::new(&g, "Expr").unwrap();
        let e = parse(&t, &toks(&t, &["Int", "Plus", "Int", "Plus", "Int"])).unwrap_err();
        match e {
            ParseError::Ambiguous {
                range,
                rule1,
                rule2,
            } => {
                assert_eq!(range, Range { start: 0, end: 5 });
                assert_eq!(rule1.name, "RuleAdd");
                assert_eq!(rule2.name, "RuleAdd");
            }
            e => panic!("wrong error: {}", e),
        }
    }

    #[test]
    fn test_ambiguous_two_goal_rules() {
        let mut g = Grammar::new();
        g.add_rule("RuleOpenClose", "Goal", &["Open", "Close"]).unwrap();
        g.add_rule("RulePair", "Goal", &["Pair"]).unwrap();
        g.add_rule("RuleMakePair", "Pair", &["Open", "Close"]).unwrap();
        let t = PrefixTable::new(&g, "Goal").unwrap();
        let e = parse(&t, &toks(&t, &["Open", "Close"])).unwrap_err();
        match e {
            ParseError::Ambiguous { rule1, rule2, .. } => {
                assert_eq!(rule1.name, "RuleOpenClose");
                assert_eq!(rule2.name, "RulePair");
            }
            e => panic!("wrong error: {}", e),
        }
    }

    #[test]
    fn test_ambiguous_inner_nonterminal() {
        // The ambiguity sits below the goal rule: Nothing derives the empty
        // span through either Nil or Null.
        let mut g = Grammar::new();
        g.add_rule("RuleNil", "Nil", &[]).unwrap();
        g.add_rule("RuleNull", "Null", &[]).unwrap();
        g.add_rule("RuleNil0", "Nothing", &["Nil"]).unwrap();
        g.add_rule("RuleNull0", "Nothing", &["Null"]).unwrap();
        g.add_rule("RuleNothing", "Goal", &["Plus", "Nothing", "Open", "Close"]).unwrap();
        let t = PrefixTable::new(&g, "Goal").unwrap();
        let e = parse(&t, &toks(&t, &["Plus", "Open", "Close"])).unwrap_err();
        match e {
            ParseError::Ambiguous { rule1, rule2, .. } => {
                let mut names = [rule1.name, rule2.name];
                names.sort();
                assert_eq!(names, ["RuleNil0", "RuleNull0"]);
            }
            e => panic!("wrong error: {}", e),
        }
    }

    #[test]
    fn test_ambiguous_epsilon_chain() {
        // Blank -> (empty) | Blank Blank reaches the empty derivation along
        // two routes; this is reported as ambiguous even though every route
        // reduces to the same value.
        let mut g = Grammar::new();
        g.add_rule("RuleBlank", "Blank", &[]).unwrap();
        g.add_rule("RuleUnderscore", "Blank", &["Underscore"]).unwrap();
        g.add_rule("RuleBlank2", "Blank", &["Blank", "Blank"]).unwrap();
        g.add_rule("RuleInfinite", "Goal", &["Blank", "Int", "Open", "Close"]).unwrap();
        let t = PrefixTable::new(&g, "Goal").unwrap();
        let e = parse(&t, &toks(&t, &["Int", "Open", "Close"])).unwrap_err();
        match e {
            ParseError::Ambiguous { rule1, rule2, .. } => {
                let mut names = [rule1.name, rule2.name];
                names.sort();
                assert_eq!(names, ["RuleBlank", "RuleBlank2"]);
            }
            e => panic!("wrong error: {}", e),
        }
    }

    #[test]
    fn test_epsilon_goal() {
        let mut g = Grammar::new();
        g.add_rule("RuleEmpty", "Goal", &[]).unwrap();
        g.add_rule("RuleInt", "Goal", &["Int"]).unwrap();
        let t = PrefixTable::new(&g, "Goal").unwrap();

        let trace = parse(&t, &toks(&t, &["Int"])).unwrap();
        let r = apply_trace(&t, &trace, |_| 42, |_, args| args[0]);
        assert_eq!(r, 42);

        // Empty input is NoInput even though the goal derives epsilon.
        assert_eq!(parse(&t, &[]).unwrap_err(), ParseError::NoInput);
    }

    #[test]
    fn test_trace_shape_and_conservation() {
        let t = PrefixTable::new(&arith_grammar(), "Sum").unwrap();
        let syms = toks(&t, &["Int", "Plus", "Int"]);
        let trace = parse(&t, &syms).unwrap();

        // Replay by hand to check the playback contract: every non-goal
        // stack drains, and every token is used exactly once.
        let mut stacks: Vec<Vec<i64>> = (0..t.symbols_len()).map(|_| Vec::new()).collect();
        let mut tokens_used = 0;
        for step in trace.iter().rev() {
            match *step {
                TraceStep::Consume(s) => {
                    assert!(t.is_terminal(s));
                    stacks[usize::from(s)].push(1);
                    tokens_used += 1;
                }
                TraceStep::Apply(p) => {
                    let r = t.prefix_rule(p).expect("apply step must be complete");
                    let mut v = 0;
                    for &item in t.rule_items(r).iter().rev() {
                        v += stacks[usize::from(item)].pop().unwrap();
                    }
                    stacks[usize::from(t.rule_target(r))].push(v);
                }
            }
        }
        assert_eq!(tokens_used, syms.len());
        for (n, stack) in stacks.iter().enumerate() {
            if SymIdx::new(n) == t.goal() {
                assert_eq!(stack.len(), 1);
            } else {
                assert!(stack.is_empty());
            }
        }
    }

    #[test]
    fn test_grammar_reuse() {
        let mut g = Grammar::new();
        g.add_rule("RuleInt", "Sum", &["Int"]).unwrap();
        g.add_rule("RuleAdd", "Sum", &["Sum", "Plus", "Int"]).unwrap();
        let t1 = PrefixTable::new(&g, "Sum").unwrap();
        assert!(parse(&t1, &toks(&t1, &["Int", "Plus", "Int"])).is_ok());

        g.add_rule("RuleSubtract", "Sum", &["Sum", "Minus", "Int"]).unwrap();
        let t2 = PrefixTable::new(&g, "Sum").unwrap();

        // The new table accepts both the old and the new language...
        assert!(parse(&t2, &toks(&t2, &["Int", "Plus", "Int"])).is_ok());
        assert!(parse(&t2, &toks(&t2, &["Int", "Minus", "Int"])).is_ok());
        // ...and the old table still works, unchanged.
        assert!(parse(&t1, &toks(&t1, &["Int", "Plus", "Int"])).is_ok());
    }
}
