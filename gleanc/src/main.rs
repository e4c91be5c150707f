mod scan;

use getopts::Options;
use glgrammar::Grammar;
use glpar::{ParserBuilder, GENERATED_MARKER};
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

const WARNING: &str = "[Warning]";
const ERROR: &str = "[Error]";

fn usage(prog: &str, msg: &str) -> ! {
    let path = Path::new(prog);
    let leaf = match path.file_name() {
        Some(m) => m.to_str().unwrap(),
        None => "gleanc",
    };
    if !msg.is_empty() {
        eprintln!("{}", msg);
    }
    eprintln!(
        "Usage: {} [-o <output.rs>] [-t <goal symbol>] [-p <prefix>] <input.rs ...| directory>",
        leaf
    );
    process::exit(1);
}

fn error_exit(msg: &str) -> ! {
    eprintln!("{} {}", ERROR, msg);
    process::exit(1);
}

/// Expand the positional arguments into the list of files to scan. A single
/// directory argument means all its `.rs` files except test files and the
/// output file itself.
fn collect_inputs(free: &[String], output: &Path) -> Vec<PathBuf> {
    if free.len() == 1 && Path::new(&free[0]).is_dir() {
        let dir = Path::new(&free[0]);
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => error_exit(&format!("can't read directory {}: {}", dir.display(), e)),
        };
        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(e) => e.path(),
                Err(e) => error_exit(&format!("can't read directory {}: {}", dir.display(), e)),
            };
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if !name.ends_with(".rs") || name.ends_with("_test.rs") {
                continue;
            }
            if output.file_name().map_or(false, |o| o.to_str() == Some(name)) {
                continue;
            }
            files.push(path);
        }
        if files.is_empty() {
            error_exit(&format!("no Rust files found in directory {}", dir.display()));
        }
        // Scan in a stable order so rule ids do not depend on directory
        // iteration order.
        files.sort();
        files
    } else {
        free.iter().map(PathBuf::from).collect()
    }
}

/// Refuse to clobber anything that is not a regular file we generated.
fn check_overwrite(output: &Path) {
    let md = match fs::symlink_metadata(output) {
        Ok(md) => md,
        Err(_) => return,
    };
    if !md.file_type().is_file() {
        error_exit(&format!(
            "output path {} is not a regular file",
            output.display()
        ));
    }
    match fs::read_to_string(output) {
        Ok(existing) if existing.starts_with(GENERATED_MARKER) => (),
        Ok(_) => error_exit(&format!(
            "output file {} was not generated by gleanc; refusing to overwrite",
            output.display()
        )),
        Err(e) => error_exit(&format!("can't read {}: {}", output.display(), e)),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = &args[0];
    let matches = match Options::new()
        .optflag("h", "help", "")
        .optopt("o", "output", "Output file (default: parse.rs)", "path")
        .optopt("t", "target", "Goal symbol (default: Program)", "symbol")
        .optopt("p", "prefix", "Identifier prefix (default: _glean_)", "prefix")
        .parse(&args[1..])
    {
        Ok(m) => m,
        Err(f) => usage(prog, f.to_string().as_str()),
    };

    if matches.opt_present("h") {
        usage(prog, "");
    }
    if matches.free.is_empty() {
        usage(prog, "No input files listed");
    }

    let output = PathBuf::from(
        matches
            .opt_str("o")
            .unwrap_or_else(|| "parse.rs".to_string()),
    );
    let goal = matches
        .opt_str("t")
        .unwrap_or_else(|| "Program".to_string());
    let prefix = matches
        .opt_str("p")
        .unwrap_or_else(|| "_glean_".to_string());

    // The emitted module is named after the output file.
    let mod_name = match output.file_stem().and_then(|s| s.to_str()) {
        Some(s) => s.to_string(),
        None => error_exit(&format!(
            "can't derive a module name from output path {}",
            output.display()
        )),
    };

    let files = collect_inputs(&matches.free, &output);

    let mut grammar = Grammar::new();
    let warnings = match scan::scan_files(&mut grammar, &files) {
        Ok(w) => w,
        Err(e) => error_exit(&e.to_string()),
    };
    for w in &warnings {
        eprintln!("{} {}", WARNING, w);
    }

    let src = match ParserBuilder::new()
        .goal(&goal)
        .mod_name(&mod_name)
        .prefix(&prefix)
        .write_parser(&grammar)
    {
        Ok(src) => src,
        Err(e) => error_exit(&e.to_string()),
    };

    check_overwrite(&output);
    if let Err(e) = fs::write(&output, src) {
        error_exit(&format!("can't write {}: {}", output.display(), e));
    }
}
