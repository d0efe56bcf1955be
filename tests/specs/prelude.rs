//! Shared helpers for CLI specs

use assert_cmd::Command;
use tempfile::TempDir;

/// Endpoint nothing listens on, so connects fail fast
pub const DEAD_ENDPOINT: &str = "127.0.0.1:1";

/// A scratch directory to run the CLI in
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write a file relative to the project directory
    pub fn file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn zb(&self) -> Cli {
        let mut cmd = Command::cargo_bin("zb").unwrap();
        cmd.current_dir(self.dir.path()).env("RUST_LOG", "off");
        Cli { cmd, args: Vec::new() }
    }
}

/// Builder for one CLI invocation
pub struct Cli {
    cmd: Command,
    args: Vec<String>,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    fn run(mut self) -> std::process::Output {
        self.cmd.args(&self.args).output().unwrap()
    }

    /// Run and require exit code zero
    pub fn passes(self) -> Outcome {
        let args = self.args.join(" ");
        let output = self.run();
        assert!(
            output.status.success(),
            "`zb {}` failed\nstdout:\n{}\nstderr:\n{}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Outcome::new(output)
    }

    /// Run and require a non-zero exit code
    pub fn fails(self) -> Outcome {
        let args = self.args.join(" ");
        let output = self.run();
        assert!(
            !output.status.success(),
            "`zb {}` unexpectedly succeeded\nstdout:\n{}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        Outcome::new(output)
    }
}

/// Captured output of a finished invocation
pub struct Outcome {
    stdout: String,
    stderr: String,
}

impl Outcome {
    fn new(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(
            self.stdout.contains(expected),
            "stdout does not contain {:?}\nstdout:\n{}",
            expected,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(
            self.stderr.contains(expected),
            "stderr does not contain {:?}\nstderr:\n{}",
            expected,
            self.stderr
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }
}
