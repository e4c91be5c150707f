//! The parsing half of glean: a chart-based recognition engine over the
//! tables of [`gltable`], and an emitter that writes the same engine out as
//! a self-contained, table-driven Rust source file.
//!
//! The engine lives twice. [`parser::parse`] runs it directly
//! against a [`gltable::PrefixTable`], which is how this tool tests a
//! grammar; [`ParserBuilder::write_parser`] emits it as source text with the
//! tables baked in as statics, which is what users compile against their
//! reduction functions. Both produce identical accept/reject/ambiguity
//! behavior and identical [`glerrors`] values.

pub mod builder;
pub mod parser;

pub use builder::{EmitError, ParserBuilder, GENERATED_MARKER};
pub use parser::{apply_trace, parse, TraceStep};
