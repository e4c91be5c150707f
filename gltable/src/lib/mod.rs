//! Turns a [`glgrammar::Grammar`] into the tables a chart parser runs on.
//!
//! The central structure is the shared-prefix trie built per non-terminal:
//! every rule prefix that matters during recognition gets one node, shared
//! across all rules with the same leading items, so a "dotted rule" is just
//! an integer `PfxIdx`. [`PrefixTable::new`] numbers the grammar's symbols
//! terminal-first, builds the tries, and derives the follower / extension /
//! completion tables that both the in-tool recognizer and emitted parsers
//! index by those integers.
//!
//! Tables are cheap to build and are rebuilt from scratch for every parser
//! written, so a grammar can keep growing between emissions.

mod prefixes;
mod table;

pub use table::{PrefixTable, PrefixTableError};
