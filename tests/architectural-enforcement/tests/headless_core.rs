//! Integration Test: Headless Core
//!
//! **Policy**: `studio-core` MUST NOT depend on terminal or clipboard
//! backends. Surfaces inject those through `DisplaySurface` and
//! `ClipboardSink`.

use std::fs;

use architectural_enforcement::{code_part, production_lines, rust_sources, workspace_root};

const FORBIDDEN_CRATES: &[&str] = &["ratatui", "crossterm", "arboard"];

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("studio/core/Cargo.toml"))
        .expect("studio/core/Cargo.toml should exist");

    let violations: Vec<&str> = FORBIDDEN_CRATES
        .iter()
        .copied()
        .filter(|name| {
            manifest.lines().any(|line| {
                let line = line.trim_start();
                line.starts_with(&format!("{name} ")) || line.starts_with(&format!("{name}="))
            })
        })
        .collect();

    assert!(
        violations.is_empty(),
        "studio-core depends on UI crates: {violations:?}"
    );
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let sources = rust_sources("studio/core/src");
    assert!(!sources.is_empty(), "no sources found under studio/core/src");

    let mut violations = Vec::new();
    for path in &sources {
        for (line_number, line) in production_lines(path) {
            let code = code_part(&line);
            for name in FORBIDDEN_CRATES {
                if code.contains(&format!("{name}::")) || code.contains(&format!("use {name}")) {
                    violations.push(format!("{}:{line_number} - {}", path.display(), line.trim()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "UI crate usage in studio-core:\n  {}",
        violations.join("\n  ")
    );
}
