//! Integration tests for the itinerary-planner CLI

use std::fs;
use std::io::Write;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the binary from an empty directory against an empty config, without API keys
///
/// The working directory keeps a `.env` next to the crate from refilling the keys.
fn run(args: &[&str]) -> Output {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = dir.path().join("config.toml");
    let mut file = fs::File::create(&config).expect("Failed to create temp config");
    writeln!(file, "[logging]\nlevel = \"warn\"").expect("Failed to write temp config");

    Command::new(env!("CARGO_BIN_EXE_itinerary-planner"))
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_PLACES_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("suggest"));
    assert!(stdout.contains("itinerary"));
}

#[test]
fn test_summary_without_subcommand() {
    let output = run(&[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gemini API key: missing"));
    assert!(stdout.contains("itinerary-planner serve"));
}

#[test]
fn test_days_out_of_range() {
    let output = run(&["suggest", "--destination", "Kerala", "--days", "31"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid input"));
    assert!(stderr.contains("between 1 and 30"));
}

#[test]
fn test_negative_days() {
    let output = run(&["itinerary", "--destination", "Kerala", "--days", "-3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid input"));
}

#[test]
fn test_empty_destination() {
    let output = run(&["suggest", "--destination", "  "]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Destination cannot be empty"));
}

#[test]
fn test_missing_llm_key() {
    let output = run(&["suggest", "--destination", "Kerala", "--days", "3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GEMINI_API_KEY is not set"));
}

#[test]
fn test_dotenv_in_working_dir_is_loaded() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join(".env"), "GEMINI_API_KEY=from_dotenv_12345\n")
        .expect("Failed to write .env");
    let config = dir.path().join("config.toml");
    fs::write(&config, "").expect("Failed to write temp config");

    let output = Command::new(env!("CARGO_BIN_EXE_itinerary-planner"))
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_PLACES_API_KEY")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gemini API key: configured"));
    assert!(stdout.contains("Google Places API key: missing"));
}
