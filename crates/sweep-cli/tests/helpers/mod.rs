#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("sweep").expect("Failed to find sweep binary");

        // Run inside the temp dir so no stray sweep.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("SWEEP_DATABASE_PATH", &self.db_path);
        cmd.env("SWEEP_TIMEZONE", "UTC");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs a command that must succeed and returns its stdout
    pub fn stdout_of(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }

    /// Runs a command that prints JSON and parses it
    pub fn json_of(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.stdout_of(args)).expect("stdout is not JSON")
    }

    /// Adds a job and returns its full ID
    pub fn add(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        extract_id(&self.stdout_of(&full)).expect("no job ID in add output")
    }
}

/// Finds the first full UUID in command output, ignoring colour codes
pub fn extract_id(output: &str) -> Option<String> {
    output
        .split(|c: char| !(c.is_ascii_hexdigit() || c == '-'))
        .find(|token| token.len() == 36 && Uuid::parse_str(token).is_ok())
        .map(String::from)
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn job_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓").and(
            predicate::str::contains("Created job")
                .or(predicate::str::contains("Created recurring series")),
        )
    }

    pub fn has_job_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Status"))
    }

    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No jobs found")
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
