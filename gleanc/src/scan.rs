//! Harvests grammar rules from Rust source files.
//!
//! Every free function whose name starts with `Rule` or `rule` declares a
//! rule: its parameter types are the items, its return type is the target.
//! Functions that almost qualify (a non-identifier parameter or return
//! type, or no return value) are skipped with a warning, so that helper
//! functions which happen to share the prefix do not silently distort the
//! grammar. Two candidate functions with the same name are a hard error:
//! the emitted parser could only call one of them.

use std::{collections::HashMap, error::Error, fmt, fs, io, path::Path};

use glgrammar::{GrammarError, RuleAdder};
use syn::{FnArg, Item, ReturnType, Type};

#[derive(Debug)]
pub enum ScanError {
    Io(String, io::Error),
    Parse(String, syn::Error),
    DuplicateFunction {
        name: String,
        file: String,
        previous: String,
    },
    Grammar(GrammarError),
}

impl Error for ScanError {}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanError::Io(file, e) => write!(f, "{}: {}", file, e),
            ScanError::Parse(file, e) => write!(f, "{}: {}", file, e),
            ScanError::DuplicateFunction {
                name,
                file,
                previous,
            } => write!(
                f,
                "{}: {} previously declared in {}",
                file, name, previous
            ),
            ScanError::Grammar(e) => e.fmt(f),
        }
    }
}

impl From<GrammarError> for ScanError {
    fn from(e: GrammarError) -> Self {
        ScanError::Grammar(e)
    }
}

/// Scan `paths` for rule functions, feeding each into `rules`. Returns the
/// warnings for skipped near-candidates.
pub fn scan_files<R: RuleAdder>(
    rules: &mut R,
    paths: &[impl AsRef<Path>],
) -> Result<Vec<String>, ScanError> {
    let mut scanner = Scanner::default();
    for path in paths {
        let name = path.as_ref().display().to_string();
        let src = fs::read_to_string(path).map_err(|e| ScanError::Io(name.clone(), e))?;
        scanner.scan_str(rules, &name, &src)?;
    }
    Ok(scanner.warnings)
}

#[derive(Default)]
struct Scanner {
    /// Function name -> file it was first seen in.
    seen: HashMap<String, String>,
    warnings: Vec<String>,
}

impl Scanner {
    fn scan_str<R: RuleAdder>(
        &mut self,
        rules: &mut R,
        file: &str,
        src: &str,
    ) -> Result<(), ScanError> {
        let ast =
            syn::parse_file(src).map_err(|e| ScanError::Parse(file.to_string(), e))?;
        for item in &ast.items {
            let func = match item {
                Item::Fn(f) => f,
                _ => continue,
            };
            let name = func.sig.ident.to_string();
            if !(name.starts_with("Rule") || name.starts_with("rule")) {
                continue;
            }

            let mut items = Vec::new();
            let mut skip = false;
            for input in &func.sig.inputs {
                let ident = match input {
                    FnArg::Typed(pt) => type_ident(&pt.ty),
                    FnArg::Receiver(_) => None,
                };
                match ident {
                    Some(i) => items.push(i),
                    None => {
                        self.warnings.push(format!(
                            "{}: ignoring {}: parameter type is not an identifier",
                            file, name
                        ));
                        skip = true;
                        break;
                    }
                }
            }
            if skip {
                continue;
            }

            let target = match &func.sig.output {
                ReturnType::Default => {
                    self.warnings.push(format!(
                        "{}: ignoring {}: function does not return a value",
                        file, name
                    ));
                    continue;
                }
                ReturnType::Type(_, ty) => match type_ident(ty) {
                    Some(t) => t,
                    None => {
                        self.warnings.push(format!(
                            "{}: ignoring {}: result type is not an identifier",
                            file, name
                        ));
                        continue;
                    }
                },
            };

            if let Some(previous) = self.seen.get(&name) {
                return Err(ScanError::DuplicateFunction {
                    name,
                    file: file.to_string(),
                    previous: previous.clone(),
                });
            }
            self.seen.insert(name.clone(), file.to_string());

            let item_refs: Vec<&str> = items.iter().map(|s| s.as_str()).collect();
            rules.add_rule(&name, &target, &item_refs)?;
        }
        Ok(())
    }
}

/// The bare identifier named by `ty`, if it is one (a single path segment
/// with no generics, qualifier, reference, or tuple shape).
fn type_ident(ty: &Type) -> Option<String> {
    if let Type::Path(tp) = ty {
        if tp.qself.is_none() && tp.path.segments.len() == 1 {
            let seg = &tp.path.segments[0];
            if seg.arguments.is_none() {
                return Some(seg.ident.to_string());
            }
        }
    }
    None
}
