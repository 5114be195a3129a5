//! Integration tests for oracle configuration files.

use std::io::Write;
use strictly_hanoi::{Peg, Puzzle};
use strictly_towers::{Oracle, OracleConfig, OracleProvider, build_oracle};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        provider = "anthropic"
        model = "claude-3-5-haiku-20241022"
        max_tokens = 128
        max_iterations = 40
        request_timeout_secs = 15
        base_url = "http://localhost:9000/"
        "#,
    );

    let config = OracleConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.provider(), OracleProvider::Anthropic);
    assert_eq!(config.model(), "claude-3-5-haiku-20241022");
    assert_eq!(*config.max_tokens(), 128);
    assert_eq!(*config.max_iterations(), 40);
    assert_eq!(config.request_timeout().as_secs(), 15);
    assert_eq!(config.base_url().as_deref(), Some("http://localhost:9000/"));
}

#[test]
fn test_zero_iterations_in_file_rejected() {
    let file = write_config("max_iterations = 0\n");
    assert!(OracleConfig::from_file(file.path()).is_err());
}

#[test]
fn test_unknown_provider_rejected() {
    let file = write_config("provider = \"cohere\"\n");
    assert!(OracleConfig::from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = OracleConfig::load_or_default(dir.path().join("towers.toml")).unwrap();
    assert_eq!(config, OracleConfig::default());
}

#[test]
fn test_planner_provider_needs_no_key() {
    let file = write_config("provider = \"planner\"\n");
    let config = OracleConfig::from_file(file.path()).unwrap();
    let puzzle = Puzzle::new(3).unwrap();

    let oracle = build_oracle(&config, &puzzle, Peg::C).unwrap();
    assert_eq!(oracle.name(), "planner");
}
