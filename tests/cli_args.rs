//! Integration tests for CLI argument handling
//!
//! Runs the compiled binary for the commands that complete without touching
//! the network: help output, prompt templates, cache maintenance, and
//! argument validation errors.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_arxscout"))
        .args(args)
        .output()
        .expect("Failed to execute arxscout")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("arxscout"), "Help should mention arxscout");
    assert!(stdout.contains("search"), "Help should list search command");
    assert!(stdout.contains("cite"), "Help should list cite command");
    assert!(
        stdout.contains("--no-cache"),
        "Help should list the global cache flag"
    );
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success(), "Expected bare invocation to fail");
}

#[test]
fn test_unknown_subcommand_fails() {
    let output = run_cli(&["teleport"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unrecognized") || stderr.contains("invalid"),
        "Should print a parse error: {}",
        stderr
    );
}

#[test]
fn test_prompt_list_prints_all_names() {
    let output = run_cli(&["prompt", "list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "quick",
        "methodology",
        "contribution",
        "critical",
        "compare",
        "literature",
        "implementation",
        "evidence",
    ] {
        assert!(stdout.contains(name), "Listing should mention {}", name);
    }
}

#[test]
fn test_prompt_get_prints_template() {
    let output = run_cli(&["prompt", "get", "quick"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Problem"));
    assert!(stdout.contains("## Key Takeaway"));
}

#[test]
fn test_prompt_get_rejects_unknown_prompt() {
    let output = run_cli(&["prompt", "get", "telepathy"]);
    assert!(!output.status.success());
}

#[test]
fn test_cache_stats_on_fresh_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir_arg = temp_dir.path().to_str().unwrap();

    let output = run_cli(&["cache", "stats", "--cache-dir", dir_arg]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Entries: 0"));
    assert!(stdout.contains(dir_arg));
}

#[test]
fn test_cache_clear_reports_removed_count() {
    let temp_dir = TempDir::new().unwrap();
    let dir_arg = temp_dir.path().to_str().unwrap();

    let output = run_cli(&["cache", "clear", "--cache-dir", dir_arg]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Removed 0 cache entries"));
}

#[test]
fn test_cache_commands_fail_with_no_cache() {
    let output = run_cli(&["cache", "stats", "--no-cache"]);
    assert!(
        !output.status.success(),
        "cache stats should fail when the cache is disabled"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cache is disabled"), "stderr: {}", stderr);
}

#[test]
fn test_cite_rejects_invalid_paper_id() {
    let output = run_cli(&["cite", "bibtex", "not-a-paper-id", "--no-cache"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid arXiv ID"),
        "Should explain the bad ID: {}",
        stderr
    );
}

#[test]
fn test_search_rejects_invalid_format() {
    let output = run_cli(&["search", "quantum", "--format", "interpretive-dance"]);
    assert!(!output.status.success());
}
