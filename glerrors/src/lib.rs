//! Error values returned at runtime by glean-generated parsers.
//!
//! Generated parsers depend on this crate alone. The same values are
//! produced by `glpar`'s in-tool recognition engine, so diagnostics look
//! identical whether a grammar is exercised directly or through emitted
//! code.

use std::{error::Error, fmt};

/// A position in the input token sequence.
///
/// `token` carries the terminal symbol name of the offending token where
/// one exists; `None` means the position is past the last token (end of
/// input).
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub index: usize,
    pub token: Option<String>,
}

/// A half-open span `start..end` of input token positions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

/// A grammar rule, as presented to users in diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub name: String,
    pub target: String,
    pub items: Vec<String>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for item in &self.items {
            write!(f, " {}", item)?;
        }
        Ok(())
    }
}

/// The reasons a parse can fail.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// The token sequence was empty.
    NoInput,
    /// No grammar rule could consume the token at `location` (or the input
    /// ended while a rule was still incomplete).
    Unexpected { location: Location },
    /// Two distinct derivations cover the same span of input; `rule1` and
    /// `rule2` name the competing top-level reductions.
    Ambiguous {
        range: Range,
        rule1: Rule,
        rule2: Rule,
    },
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NoInput => write!(f, "no tokens in parser input"),
            ParseError::Unexpected { location } => match &location.token {
                Some(token) => write!(
                    f,
                    "unexpected token at index {}: {}",
                    location.index, token
                ),
                None => write!(f, "unexpected end of input"),
            },
            ParseError::Ambiguous { rule1, rule2, .. } => {
                writeln!(f, "ambiguous match for {}", rule1.target)?;
                writeln!(f, "   {}", rule1)?;
                write!(f, "or {}", rule2)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn rule(name: &str, target: &str, items: &[&str]) -> Rule {
        Rule {
            name: name.to_string(),
            target: target.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_input_message() {
        assert_eq!(ParseError::NoInput.to_string(), "no tokens in parser input");
    }

    #[test]
    fn test_unexpected_messages() {
        let e = ParseError::Unexpected {
            location: Location {
                index: 1,
                token: Some("Plus".to_string()),
            },
        };
        assert_eq!(e.to_string(), "unexpected token at index 1: Plus");

        let e = ParseError::Unexpected {
            location: Location {
                index: 2,
                token: None,
            },
        };
        assert_eq!(e.to_string(), "unexpected end of input");
    }

    #[test]
    fn test_ambiguous_message() {
        let e = ParseError::Ambiguous {
            range: Range { start: 0, end: 5 },
            rule1: rule("RuleAdd", "Expr", &["Expr", "Plus", "Expr"]),
            rule2: rule("RuleAdd", "Expr", &["Expr", "Plus", "Expr"]),
        };
        assert_eq!(
            e.to_string(),
            "ambiguous match for Expr\n   RuleAdd: Expr Plus Expr\nor RuleAdd: Expr Plus Expr"
        );
    }

    #[test]
    fn test_epsilon_rule_display() {
        assert_eq!(rule("RuleBlank", "Blank", &[]).to_string(), "RuleBlank:");
    }
}
