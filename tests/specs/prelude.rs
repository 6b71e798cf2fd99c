//! Shared helpers for fdesk specs
//!
//! A [`Project`] is a scratch directory holding scenario and config files;
//! `project.fdesk()` runs the binary inside it.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use std::process::Output;

/// Two rooms, one guest and a two-night stay at 100.00 a night
pub const HOTEL: &str = r#"
tenant = "hotel-1"
actor = "clerk-1"
now = "2026-03-01T12:00:00Z"
guests = ["guest-1"]

[[rooms]]
number = "101"
floor = 1
type = "double"

[[rooms]]
number = "102"
floor = 1
type = "double"

[[reservations]]
ref = "smith"
guest = "guest-1"
check_in = "2026-03-01"
check_out = "2026-03-03"
adults = 2
rate = 10000
"#;

pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// [`HOTEL`] followed by `steps`, written to `scenario.toml`
    pub fn hotel(steps: &str) -> Self {
        let project = Self::empty();
        project.file("scenario.toml", &format!("{HOTEL}\n{steps}"));
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn fdesk(&self) -> Fdesk {
        Fdesk::new(self.path())
    }
}

pub struct Fdesk {
    cmd: Command,
}

impl Fdesk {
    fn new(dir: &Path) -> Self {
        let mut cmd = Command::cargo_bin("fdesk").unwrap();
        cmd.current_dir(dir).env_remove("FDESK_LOG");
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        let run = Run { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status.code(),
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        let run = Run { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

pub struct Run {
    output: Output,
}

impl Run {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout lacks {expected:?}:\n{stdout}"
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout has {unexpected:?}:\n{stdout}"
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr lacks {expected:?}:\n{stderr}"
        );
        self
    }

    pub fn stderr_lacks(self, unexpected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            !stderr.contains(unexpected),
            "stderr has {unexpected:?}:\n{stderr}"
        );
        self
    }
}
