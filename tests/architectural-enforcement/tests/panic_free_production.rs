//! Integration Test: No Panicking Shortcuts in Production Code
//!
//! **Policy**: production code in the core and the TUI propagates errors
//! with `?` or handles them. `.unwrap()` and `.expect(..)` are allowed only
//! in test code.

use architectural_enforcement::{code_part, production_lines, rust_sources};

fn find_violations(dir: &str) -> Vec<String> {
    let mut violations = Vec::new();

    for path in rust_sources(dir) {
        for (line_number, line) in production_lines(&path) {
            let code = code_part(&line);
            if code.contains(".unwrap()") || code.contains(".expect(") {
                violations.push(format!("{}:{line_number} - {}", path.display(), line.trim()));
            }
        }
    }

    violations
}

#[test]
fn test_no_unwrap_in_production_code() {
    let mut violations = find_violations("studio/core/src");
    violations.extend(find_violations("tui/src"));

    if !violations.is_empty() {
        eprintln!("\nPanicking shortcuts found in production code:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        panic!(
            "Found {} unwrap/expect call(s) outside tests",
            violations.len()
        );
    }
}
