//! Build script to generate the embedded word catalog
//!
//! Reads the catalog source file and generates a Rust const array, enforcing
//! the catalog invariants (3-5 uppercase letters, no duplicates) at build time
//! so a bad list edit fails the build instead of shifting puzzles silently.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    generate_catalog(
        "data/words.txt",
        &Path::new(&out_dir).join("catalog.rs"),
        "CATALOG_WORDS",
        "Daily puzzle word catalog (ordered; index = days since epoch mod length)",
    );

    // Rebuild if the catalog changes
    println!("cargo:rerun-if-changed=data/words.txt");
}

fn generate_catalog(input_path: &str, output_path: &Path, const_name: &str, doc_comment: &str) {
    let content = fs::read_to_string(input_path)
        .unwrap_or_else(|e| panic!("Failed to read {input_path}: {e}"));

    let words: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let count = words.len();

    let mut seen = HashSet::new();
    for word in &words {
        assert!(
            (3..=5).contains(&word.len()),
            "Catalog word '{word}' must be 3-5 letters"
        );
        assert!(
            word.bytes().all(|b| b.is_ascii_uppercase()),
            "Catalog word '{word}' must be uppercase ASCII letters"
        );
        assert!(seen.insert(*word), "Catalog contains duplicate word '{word}'");
    }

    let mut output = fs::File::create(output_path)
        .unwrap_or_else(|e| panic!("Failed to create {}: {e}", output_path.display()));

    writeln!(output, "// Generated word catalog").unwrap();
    writeln!(output, "//").unwrap();
    writeln!(output, "// {doc_comment}").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "/// {doc_comment}").unwrap();
    writeln!(output, "pub const {const_name}: &[&str] = &[").unwrap();

    for word in words {
        writeln!(output, "    \"{word}\",").unwrap();
    }

    writeln!(output, "];").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "/// Number of words in {const_name}").unwrap();
    writeln!(output, "pub const {const_name}_COUNT: usize = {count};").unwrap();
}
