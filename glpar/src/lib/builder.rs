//! Emission of a grammar's parser as Rust source text.
//!
//! The output file is self-contained: the recognition engine of
//! [`crate::parser`] in fixed skeleton form, the [`gltable`] tables as
//! statics, and one dispatch function per terminal and per complete prefix.
//! It references only `std`, the `glerrors` crate, and the token types and
//! reduction functions the user declares alongside it.

use std::{error::Error, fmt, fmt::Write};

use glgrammar::{is_identifier, Grammar, PfxIdx, RIdx, SymIdx};
use gltable::{PrefixTable, PrefixTableError};

/// The first line of every emitted file. The command-line driver refuses to
/// overwrite a file that does not start with this marker.
pub const GENERATED_MARKER: &str = "// Code generated by gleanc. DO NOT EDIT.";

/// The ways parser emission can fail. On error, no text is produced and the
/// grammar is untouched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EmitError {
    NoRules,
    InvalidGoal(String),
    InvalidModName(String),
    InvalidPrefix(String),
    Table(PrefixTableError),
}

impl Error for EmitError {}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmitError::NoRules => write!(f, "grammar has no rules"),
            EmitError::InvalidGoal(name) => {
                write!(f, "goal '{}' is not a valid Rust identifier", name)
            }
            EmitError::InvalidModName(name) => {
                write!(f, "module name '{}' is not a valid Rust identifier", name)
            }
            EmitError::InvalidPrefix(name) => {
                write!(f, "prefix '{}' is not a valid Rust identifier", name)
            }
            EmitError::Table(e) => e.fmt(f),
        }
    }
}

impl From<PrefixTableError> for EmitError {
    fn from(e: PrefixTableError) -> Self {
        EmitError::Table(e)
    }
}

/// Configures and writes a parser for a grammar.
///
/// ```text
/// let src = ParserBuilder::new()
///     .goal("Sum")
///     .mod_name("parse")
///     .prefix("_glean_")
///     .write_parser(&grammar)?;
/// ```
///
/// The same builder (and the same grammar) may be used repeatedly; each call
/// recomputes the tables from the grammar's current rule set.
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    goal: String,
    mod_name: String,
    prefix: String,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        ParserBuilder::new()
    }
}

impl ParserBuilder {
    pub fn new() -> Self {
        ParserBuilder {
            goal: "Program".to_string(),
            mod_name: "parse".to_string(),
            prefix: "_glean_".to_string(),
        }
    }

    /// Set the goal symbol; the emitted entry point returns one value of
    /// this type.
    pub fn goal(mut self, goal: &str) -> Self {
        self.goal = goal.to_string();
        self
    }

    /// Set the name of the module the emitted file wraps everything in.
    pub fn mod_name(mut self, mod_name: &str) -> Self {
        self.mod_name = mod_name.to_string();
        self
    }

    /// Set the string prepended to every file-scope identifier the emitter
    /// introduces. May be empty.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Write parser source for `grammar`'s current rules.
    pub fn write_parser(&self, grammar: &Grammar) -> Result<String, EmitError> {
        if grammar.is_empty() {
            return Err(EmitError::NoRules);
        }
        if !is_identifier(&self.goal) {
            return Err(EmitError::InvalidGoal(self.goal.clone()));
        }
        if !is_identifier(&self.mod_name) {
            return Err(EmitError::InvalidModName(self.mod_name.clone()));
        }
        if !self.prefix.is_empty() && !is_identifier(&self.prefix) {
            return Err(EmitError::InvalidPrefix(self.prefix.clone()));
        }

        let table = PrefixTable::new(grammar, &self.goal)?;
        let mut emitter = Emitter {
            table: &table,
            goal: &self.goal,
            mod_name: &self.mod_name,
            prefix: &self.prefix,
            out: String::new(),
        };
        emitter.emit();
        Ok(emitter.out)
    }
}

struct Emitter<'a> {
    table: &'a PrefixTable,
    goal: &'a str,
    mod_name: &'a str,
    prefix: &'a str,
    out: String,
}

impl<'a> Emitter<'a> {
    fn emit(&mut self) {
        self.add_text(SKELETON);
        self.add_parser_type();
        self.add_apply_trace();
        self.add_token_type();
        self.add_followers();
        self.add_last_terminal();
        self.add_extended_by();
        self.add_extensions();
        self.add_symbol_finished();
        self.add_goal_prefixes();
        self.add_consumers();
        self.add_appliers();
        self.add_prefix_rule();
        self.add_rule_descriptions();
        self.out.push_str("}\n");
    }

    /// Append skeleton text, replacing the placeholder markers: `@` becomes
    /// the identifier prefix, `#G` the goal type, `#g` the goal's
    /// zero-length prefix id, `#P` the module name. Any other `#` pair is
    /// copied through unchanged (so attribute syntax survives).
    fn add_text(&mut self, s: &str) {
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            match c {
                '@' => self.out.push_str(self.prefix),
                '#' => match chars.next() {
                    Some('G') => self.out.push_str(self.goal),
                    Some('g') => {
                        let p0 = usize::from(self.table.goal_prefix0());
                        write!(self.out, "{}", p0).unwrap();
                    }
                    Some('P') => self.out.push_str(self.mod_name),
                    Some(d) => {
                        self.out.push('#');
                        self.out.push(d);
                    }
                    None => self.out.push('#'),
                },
                _ => self.out.push(c),
            }
        }
    }

    fn addf(&mut self, args: fmt::Arguments) {
        self.out.write_fmt(args).unwrap()
    }

    fn sym_name(&self, sidx: SymIdx) -> &'a str {
        // The table outlives the emitter's borrow of it.
        self.table.symbol_name(sidx)
    }

    /// The parser state type: fixed bookkeeping fields plus one value stack
    /// per symbol.
    fn add_parser_type(&mut self) {
        self.add_text(
            "
    #[derive(Default)]
    struct @Parser {
        tokens: Vec<Option<Box<dyn Any>>>,
        matches: Vec<@Match>,
        by_end: Vec<HashMap<@Prefix, Vec<usize>>>,
        todo: Vec<Vec<usize>>,
        trace: Vec<fn(&mut @Parser)>,
        tokens_used: usize,
",
        );
        for n in 0..self.table.symbols_len() {
            let name = self.table.symbol_name(SymIdx::new(n)).to_string();
            self.addf(format_args!("        stack_{}: Vec<{}>,\n", name, name));
        }
        self.out.push_str("    }\n");
    }

    fn add_apply_trace(&mut self) {
        self.add_text(
            "
    impl @Parser {
        fn apply_trace(&mut self) -> #G {
            self.tokens_used = 0;
",
        );
        for n in self.table.terms_len()..self.table.symbols_len() {
            let name = self.table.symbol_name(SymIdx::new(n)).to_string();
            self.addf(format_args!("            self.stack_{}.clear();\n", name));
        }
        self.add_text(
            "            for n in (0..self.trace.len()).rev() {
                let f = self.trace[n];
                f(self);
            }
            self.stack_#G.pop().unwrap()
        }
    }
",
        );
    }

    /// The token classifier: one type-case per terminal. A token of any
    /// other type is a programmer error, not a parse error.
    fn add_token_type(&mut self) {
        self.add_text("\n    fn @token_type(t: &dyn Any) -> @Symbol {\n");
        for n in 0..self.table.terms_len() {
            let name = self.table.symbol_name(SymIdx::new(n)).to_string();
            self.addf(format_args!(
                "        if t.is::<{}>() {{\n            return {};\n        }}\n",
                name, n
            ));
        }
        self.out.push_str(
            "        panic!(\"input token (type {:?}) is not a terminal symbol\", t.type_id());\n    }\n",
        );
    }

    fn add_followers(&mut self) {
        self.add_text("\n    static @FOLLOWERS: &[&[@Prefix]] = &[\n");
        for p in 0..self.table.prefixes_len() {
            let row = self
                .table
                .followers(PfxIdx::new(p))
                .iter()
                .map(|&q| usize::from(q).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            self.addf(format_args!("        &[{}],\n", row));
        }
        self.out.push_str("    ];\n");
    }

    fn add_last_terminal(&mut self) {
        self.add_text("\n    static @LAST_TERMINAL: &[@Symbol] = &[\n");
        for p in 0..self.table.prefixes_len() {
            let t = match self.table.last_terminal(PfxIdx::new(p)) {
                Some(s) => usize::from(s) as i64,
                None => -1,
            };
            self.addf(format_args!("        {},\n", t));
        }
        self.out.push_str("    ];\n");
    }

    fn pair_rows(&mut self, name: &str, rows: Vec<Vec<(PfxIdx, PfxIdx)>>) {
        self.add_text(&format!("\n    static @{}: &[&[(@Prefix, @Prefix)]] = &[\n", name));
        for row in rows {
            let cells = row
                .iter()
                .map(|&(a, b)| format!("({}, {})", usize::from(a), usize::from(b)))
                .collect::<Vec<_>>()
                .join(", ");
            self.addf(format_args!("        &[{}],\n", cells));
        }
        self.out.push_str("    ];\n");
    }

    fn add_extended_by(&mut self) {
        let rows = (0..self.table.symbols_len())
            .map(|s| self.table.extended_by(SymIdx::new(s)).to_vec())
            .collect();
        self.pair_rows("EXTENDED_BY", rows);
    }

    fn add_extensions(&mut self) {
        let rows = (0..self.table.prefixes_len())
            .map(|p| self.table.extensions(PfxIdx::new(p)).to_vec())
            .collect();
        self.pair_rows("EXTENSIONS", rows);
    }

    fn add_symbol_finished(&mut self) {
        self.add_text("\n    static @SYMBOL_FINISHED: &[@Symbol] = &[\n");
        for p in 0..self.table.prefixes_len() {
            let s = match self.table.symbol_finished(PfxIdx::new(p)) {
                Some(s) => usize::from(s) as i64,
                None => -1,
            };
            self.addf(format_args!("        {},\n", s));
        }
        self.out.push_str("    ];\n");
    }

    fn add_goal_prefixes(&mut self) {
        self.add_text("\n    static @GOAL_PREFIXES: &[@Prefix] = &[\n");
        for &p in self.table.goal_prefixes() {
            self.addf(format_args!("        {},\n", usize::from(p)));
        }
        self.out.push_str("    ];\n");
    }

    /// Consume functions: move the next token onto its terminal's stack.
    fn add_consumers(&mut self) {
        for n in 0..self.table.terms_len() {
            let name = self.table.symbol_name(SymIdx::new(n)).to_string();
            self.add_text(&format!(
                "
    fn @consume_{name}(parser: &mut @Parser) {{
        let t = parser.tokens[parser.tokens_used].take().unwrap();
        parser.stack_{name}.push(*t.downcast::<{name}>().unwrap());
        parser.tokens_used += 1;
    }}
",
                name = name
            ));
        }

        self.add_text("\n    static @CONSUMERS: &[fn(&mut @Parser)] = &[\n");
        for n in 0..self.table.terms_len() {
            let name = self.table.symbol_name(SymIdx::new(n)).to_string();
            self.add_text(&format!(
                "        @consume_{} as fn(&mut @Parser),\n",
                name
            ));
        }
        self.out.push_str("    ];\n");
    }

    /// Reduce functions: one per complete prefix. Item values are popped in
    /// reverse and handed to the user's reduction function in rule order.
    fn add_appliers(&mut self) {
        for p in 0..self.table.prefixes_len() {
            let ridx = match self.table.prefix_rule(PfxIdx::new(p)) {
                Some(r) => r,
                None => continue,
            };
            self.add_text(&format!("\n    fn @reduce_{}(parser: &mut @Parser) {{\n", p));
            let items = self.table.rule_items(ridx).to_vec();
            for n in (0..items.len()).rev() {
                let name = self.sym_name(items[n]).to_string();
                self.addf(format_args!(
                    "        let x{} = parser.stack_{}.pop().unwrap();\n",
                    n, name
                ));
            }
            let args = (0..items.len())
                .map(|n| format!("x{}", n))
                .collect::<Vec<_>>()
                .join(", ");
            let rule_name = self.table.rule_name(ridx).to_string();
            self.addf(format_args!("        let y = {}({});\n", rule_name, args));
            let target = self.sym_name(self.table.rule_target(ridx)).to_string();
            self.addf(format_args!("        parser.stack_{}.push(y);\n", target));
            self.out.push_str("    }\n");
        }

        self.add_text("\n    static @APPLIERS: &[Option<fn(&mut @Parser)>] = &[\n");
        for p in 0..self.table.prefixes_len() {
            if self.table.prefix_rule(PfxIdx::new(p)).is_some() {
                self.add_text(&format!(
                    "        Some(@reduce_{} as fn(&mut @Parser)),\n",
                    p
                ));
            } else {
                self.out.push_str("        None,\n");
            }
        }
        self.out.push_str("    ];\n");
    }

    fn add_prefix_rule(&mut self) {
        self.add_text("\n    static @PREFIX_RULE: &[@Rule] = &[\n");
        for p in 0..self.table.prefixes_len() {
            let r = match self.table.prefix_rule(PfxIdx::new(p)) {
                Some(r) => usize::from(r) as i64,
                None => -1,
            };
            self.addf(format_args!("        {},\n", r));
        }
        self.out.push_str("    ];\n");
    }

    fn add_rule_descriptions(&mut self) {
        self.add_text("\n    static @SYMBOL_NAMES: &[&str] = &[\n");
        for n in 0..self.table.symbols_len() {
            let name = self.table.symbol_name(SymIdx::new(n)).to_string();
            self.addf(format_args!("        \"{}\",\n", name));
        }
        self.out.push_str("    ];\n");

        self.add_text("\n    static @RULE_NAMES: &[&str] = &[\n");
        for r in 0..self.table.rules_len() {
            let name = self.table.rule_name(RIdx::new(r)).to_string();
            self.addf(format_args!("        \"{}\",\n", name));
        }
        self.out.push_str("    ];\n");

        self.add_text("\n    static @RULE_TARGETS: &[&str] = &[\n");
        for r in 0..self.table.rules_len() {
            let target = self.sym_name(self.table.rule_target(RIdx::new(r))).to_string();
            self.addf(format_args!("        \"{}\",\n", target));
        }
        self.out.push_str("    ];\n");

        self.add_text("\n    static @RULE_ITEMS: &[&[&str]] = &[\n");
        for r in 0..self.table.rules_len() {
            let row = self
                .table
                .rule_items(RIdx::new(r))
                .iter()
                .map(|&s| format!("\"{}\"", self.sym_name(s)))
                .collect::<Vec<_>>()
                .join(", ");
            self.addf(format_args!("        &[{}],\n", row));
        }
        self.out.push_str("    ];\n");

        self.add_text(
            "
    fn @ruledesc(r: @Rule) -> ::glerrors::Rule {
        ::glerrors::Rule {
            name: @RULE_NAMES[r as usize].to_string(),
            target: @RULE_TARGETS[r as usize].to_string(),
            items: @RULE_ITEMS[r as usize].iter().map(|s| s.to_string()).collect(),
        }
    }
",
        );
    }
}

/// The fixed portion of every emitted parser: the recognition engine and
/// trace machinery, identical in behavior to [`crate::parser`].
const SKELETON: &str = r#"// Code generated by gleanc. DO NOT EDIT.

// A parser for the goal type `#G`, emitted for inclusion next to the token
// types and reduction functions it references:
//
//     include!("<this file>");
//
//     let value = #P::@parse(tokens)?;
//
// `tokens` is a `Vec<Box<dyn Any>>` whose every element is a value of one
// of the grammar's terminal types. The surrounding crate must depend on the
// `glerrors` crate.
#[allow(non_camel_case_types, non_snake_case, dead_code, clippy::all)]
pub mod #P {
    use std::any::Any;
    use std::collections::HashMap;

    use ::glerrors::{Location, ParseError, Range};

    use super::*;

    pub type @Prefix = i32;
    pub type @Rule = i32;
    pub type @Symbol = i32;

    #[derive(Clone, Copy)]
    struct @Match {
        prefix: @Prefix,
        complete_prefix: @Prefix,
        start: usize,
        end: usize,
        shorter: Option<usize>,
        last: Option<usize>,
        shorter2: Option<usize>,
        last2: Option<usize>,
    }

    /// Parse `tokens` into a single `#G`.
    pub fn @parse(tokens: Vec<Box<dyn Any>>) -> Result<#G, ParseError> {
        let mut parser = @Parser::default();
        parser.tokens = tokens.into_iter().map(Some).collect();
        parser.parse()
    }

    impl @Parser {
        fn parse(&mut self) -> Result<#G, ParseError> {
            let n = self.tokens.len();
            self.matches = Vec::new();
            self.by_end = (0..=n).map(|_| HashMap::new()).collect();
            self.todo = vec![Vec::new(); n + 1];
            if n == 0 {
                return Err(ParseError::NoInput);
            }
            self.find_matches()?;
            self.find_trace()?;
            Ok(self.apply_trace())
        }

        fn add_match(
            &mut self,
            prefix: @Prefix,
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
            self.matches.push(@Match {
                prefix,
                complete_prefix: -1,
                start,
                end,
                shorter,
                last,
                shorter2: None,
                last2: None,
            });
            self.by_end[end].entry(prefix).or_insert_with(Vec::new).push(mi);
            self.todo[end].push(mi);
        }

        fn matches_at(&self, end: usize, prefix: @Prefix) -> Vec<(usize, usize)> {
            match self.by_end[end].get(&prefix) {
                Some(list) => list.iter().map(|&mi| (mi, self.matches[mi].start)).collect(),
                None => Vec::new(),
            }
        }

        fn find_matches(&mut self) -> Result<(), ParseError> {
            self.add_match(#g, 0, 0, None, None);
            for end in 0..self.todo.len() {
                let token: @Symbol = if end < self.tokens.len() {
                    @token_type(&**self.tokens[end].as_ref().unwrap())
                } else {
                    -1
                };
                let mut k = 0;
                while k < self.todo[end].len() {
                    let ti = self.todo[end][k];
                    k += 1;
                    let (t_prefix, t_start) = (self.matches[ti].prefix, self.matches[ti].start);
                    for &q in @FOLLOWERS[t_prefix as usize] {
                        self.add_match(q, end, end, None, None);
                    }
                    for &(by, to) in @EXTENSIONS[t_prefix as usize] {
                        let sub = self.matches_at(end, by).into_iter().find(|&(_, s)| s == end);
                        if let Some((mi, _)) = sub {
                            self.add_match(to, t_start, end, Some(ti), Some(mi));
                        }
                    }
                    let finished = @SYMBOL_FINISHED[t_prefix as usize];
                    if finished >= 0 {
                        for &(from, to) in @EXTENDED_BY[finished as usize] {
                            for (mi, mstart) in self.matches_at(t_start, from) {
                                self.add_match(to, mstart, end, Some(mi), Some(ti));
                            }
                        }
                    }
                    if token >= 0 {
                        for &(from, to) in @EXTENDED_BY[token as usize] {
                            for (mi, mstart) in self.matches_at(end, from) {
                                self.add_match(to, mstart, end + 1, Some(mi), None);
                            }
                        }
                    }
                }
                if token >= 0 && self.todo[end + 1].is_empty() {
                    return Err(ParseError::Unexpected {
                        location: Location {
                            index: end,
                            token: Some(@SYMBOL_NAMES[token as usize].to_string()),
                        },
                    });
                }
            }
            Ok(())
        }

        fn ambiguous(&self, m1: usize, m2: usize) -> ParseError {
            let (m1, m2) = (&self.matches[m1], &self.matches[m2]);
            ParseError::Ambiguous {
                range: Range {
                    start: m1.start,
                    end: m1.end,
                },
                rule1: @ruledesc(@PREFIX_RULE[m1.complete_prefix as usize]),
                rule2: @ruledesc(@PREFIX_RULE[m2.complete_prefix as usize]),
            }
        }

        fn find_trace(&mut self) -> Result<(), ParseError> {
            let n = self.tokens.len();
            let mut goalmatch = None;
            for &p in @GOAL_PREFIXES {
                let found = self.matches_at(n, p).into_iter().find(|&(_, s)| s == 0);
                if let Some((mi, _)) = found {
                    let prefix = self.matches[mi].prefix;
                    self.matches[mi].complete_prefix = prefix;
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
                .push(@APPLIERS[self.matches[goalmatch].prefix as usize].unwrap());
            let mut stack = vec![goalmatch];
            while let Some(mi) = stack.pop() {
                let m = self.matches[mi];
                if let Some(s) = m.shorter {
                    self.matches[s].complete_prefix = m.complete_prefix;
                }
                if let Some(s2) = m.shorter2 {
                    self.matches[s2].complete_prefix = m.complete_prefix;
                }
                if let Some(l) = m.last {
                    let p = self.matches[l].prefix;
                    self.matches[l].complete_prefix = p;
                }
                if let Some(l2) = m.last2 {
                    let p = self.matches[l2].prefix;
                    self.matches[l2].complete_prefix = p;
                }
                if m.shorter2.is_some() || m.last2.is_some() {
                    if m.shorter2.is_some() && m.shorter2 != m.shorter {
                        return Err(self.ambiguous(mi, mi));
                    }
                    match (m.last, m.last2) {
                        (Some(l), Some(l2)) if l != l2 => return Err(self.ambiguous(l, l2)),
                        _ => unreachable!(),
                    }
                }
                if let Some(s) = m.shorter {
                    stack.push(s);
                }
                if let Some(l) = m.last {
                    self.trace
                        .push(@APPLIERS[self.matches[l].prefix as usize].unwrap());
                    stack.push(l);
                } else {
                    let t = @LAST_TERMINAL[m.prefix as usize];
                    if t >= 0 {
                        self.trace.push(@CONSUMERS[t as usize]);
                    }
                }
            }
            Ok(())
        }
    }
"#;
