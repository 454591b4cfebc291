//! Test utilities and mocks for syscfg unit tests.
//!
//! Provides a scripted [`MockExecutor`] standing in for `reg.exe` and the
//! escalation child, plus fixtures for provider directories.
//!
//! # Example
//!
//! ```rust,ignore
//! use syscfg::test_support::{MockExecutor, MockProcessOutput};
//!
//! let exec = MockExecutor::new();
//! exec.expect_prefix("reg query", MockProcessOutput::failure(1, "not found"));
//! ```

pub mod fixtures;

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(mock: MockProcessOutput) -> Self {
        ProcessOutput {
            code: Some(mock.status),
            stdout: mock.stdout,
            stderr: mock.stderr,
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// Side effect run when an expectation matches, e.g. to imitate a child
/// process writing files.
pub type CommandHook = Box<dyn Fn(&ProcessBuilder) + Send + Sync>;

struct CommandExpectation {
    pattern: CommandPattern,
    output: MockProcessOutput,
    hook: Option<CommandHook>,
}

#[derive(Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
}

/// Mock process executor for testing command execution.
///
/// Expectations are matched in the order they were added; the first match
/// wins. Unmatched commands fail.
#[derive(Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: CommandPattern, output: MockProcessOutput, hook: Option<CommandHook>) {
        self.state
            .lock()
            .expect("mock executor poisoned")
            .expectations
            .push(CommandExpectation {
                pattern,
                output,
                hook,
            });
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output, None);
        self
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output, None);
        self
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output, None);
        self
    }

    /// Add an expectation that also runs `hook` before returning `output`.
    pub fn expect_with_hook(
        &self,
        pattern: CommandPattern,
        output: MockProcessOutput,
        hook: impl Fn(&ProcessBuilder) + Send + Sync + 'static,
    ) -> &Self {
        self.push(pattern, output, Some(Box::new(hook)));
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("mock executor poisoned")
            .calls
            .clone()
    }
}

impl Executor for MockExecutor {
    fn exec(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        let mut state = self.state.lock().expect("mock executor poisoned");
        state.calls.push(full_cmd.clone());

        let Some(exp) = state
            .expectations
            .iter()
            .find(|exp| exp.pattern.matches(&full_cmd))
        else {
            bail!("unexpected command: {}", full_cmd)
        };

        if let Some(hook) = &exp.hook {
            hook(cmd);
        }
        Ok(exp.output.clone().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_matches_in_order() {
        let exec = MockExecutor::new();
        exec.expect("reg query KEY", MockProcessOutput::success("exact"))
            .expect_prefix("reg", MockProcessOutput::failure(2, "prefix"));

        let exact = exec
            .exec(&ProcessBuilder::new("reg").args(["query", "KEY"]))
            .unwrap();
        assert_eq!(exact.stdout, "exact");

        let prefix = exec
            .exec(&ProcessBuilder::new("reg").args(["delete", "KEY"]))
            .unwrap();
        assert_eq!(prefix.code, Some(2));

        assert!(exec.exec(&ProcessBuilder::new("other")).is_err());
        assert_eq!(exec.calls().len(), 3);
    }
}
