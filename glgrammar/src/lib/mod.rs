//! A library for accumulating the rules of a context-free grammar, one rule
//! at a time, ready for parser generation.
//!
//! A note on the terminology we use, since there's no universal standard:
//!
//!   * A rule is a single named production: a mapping from a target symbol
//!     to a (possibly empty) ordered sequence of item symbols. A target with
//!     several alternatives simply has several rules.
//!   * A symbol is either a terminal or a non-terminal. Symbols are interned
//!     on first reference; a symbol is a terminal iff no rule produces it.
//!     That classification is not fixed until a parser is written, so a
//!     symbol used only as an item today may become a non-terminal when a
//!     later rule targets it.
//!
//! `glgrammar` makes the following guarantees about grammars:
//!
//!   * Rules are numbered from `0` to `rules_len() - 1` in insertion order.
//!   * Symbols are numbered from `0` to `symbols_len() - 1` in the order
//!     they were first referenced.
//!   * A failed [`Grammar::add_rule`] call leaves the grammar exactly as it
//!     was: no rule and no symbol is partially added.
//!
//! Rule and symbol names must be legal Rust identifiers, since they become
//! function and type references in emitted parsers.

mod grammar;
mod idxnewtype;

pub use grammar::{is_identifier, Grammar, GrammarError, IdentKind, Rule, RuleAdder};
pub use idxnewtype::{PfxIdx, RIdx, SymIdx};
