//! forge::mock
//!
//! Scripted command runner for deterministic adapter tests.
//!
//! # Design
//!
//! `ScriptedRunner` implements [`CommandRunner`] without spawning anything.
//! Each rule matches a program name and an argument prefix; the first
//! matching rule answers. Unmatched invocations behave like a missing
//! binary. Every call is recorded so tests can assert which tier ran.
//!
//! # Example
//!
//! ```
//! use forgekit::forge::mock::{Scripted, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new()
//!     .on("gh", &["auth", "status"], Scripted::Success(String::new()))
//!     .on("gh", &["pr", "view"], Scripted::Exit { code: 1, stderr: "no PR".into() });
//!
//! assert!(runner.calls().is_empty());
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::process::{CommandOutput, CommandRunner, ProcessError};

/// Canned response for a scripted invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// Exit 0 with this stdout.
    Success(String),
    /// Exit with a non-zero code.
    Exit { code: i32, stderr: String },
    /// Behave as if the timeout fired.
    Timeout,
    /// Behave as if the program is not installed.
    NotFound,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    prefix: Vec<String>,
    response: Scripted,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct ScriptedRunnerInner {
    rules: Vec<Rule>,
    calls: Vec<RecordedCall>,
}

/// Command runner that answers from a script.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share the
/// script and the call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    inner: Arc<Mutex<ScriptedRunnerInner>>,
}

impl ScriptedRunner {
    /// Create a runner with no rules (every program is "not installed").
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule: `program` invoked with arguments starting with `prefix`.
    pub fn on(self, program: &str, prefix: &[&str], response: Scripted) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.rules.push(Rule {
                program: program.to_string(),
                prefix: prefix.iter().map(|s| s.to_string()).collect(),
                response,
            });
        }
        self
    }

    /// All invocations so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Invocations of one program.
    pub fn calls_to(&self, program: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn lookup(&self, program: &str, args: &[String]) -> Option<Scripted> {
        let inner = self.inner.lock().unwrap();
        inner
            .rules
            .iter()
            .find(|rule| rule.program == program && args.starts_with(&rule.prefix))
            .map(|rule| rule.response.clone())
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn resolve(&self, program: &str) -> Option<PathBuf> {
        let inner = self.inner.lock().unwrap();
        inner
            .rules
            .iter()
            .any(|rule| rule.program == program && rule.response != Scripted::NotFound)
            .then(|| PathBuf::from(format!("/usr/bin/{}", program)))
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
            });
        }

        match self.lookup(program, args) {
            Some(Scripted::Success(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
                exit_code: 0,
            }),
            Some(Scripted::Exit { code, stderr }) => Ok(CommandOutput {
                stdout: String::new(),
                stderr,
                exit_code: code,
            }),
            Some(Scripted::Timeout) => Err(ProcessError::Timeout {
                program: program.to_string(),
                timeout,
            }),
            Some(Scripted::NotFound) | None => Err(ProcessError::NotFound(program.to_string())),
        }
    }
}
