use serde::{Deserialize, Serialize};

/// One candidate code submission handed to the sandbox.
///
/// The language field carries the raw tag from the wire; the sandbox resolves
/// it against the supported-language table and reports unknown tags in the
/// result rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source code text
    pub source: String,

    /// Language tag (e.g., "python", "cpp")
    pub language: String,
}

impl ExecutionRequest {
    pub fn new(source: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            language: language.into(),
        }
    }
}

/// Outcome of one sandbox invocation.
///
/// Produced exactly once per [`ExecutionRequest`] and never mutated after
/// creation. Every sandbox failure mode is encoded here; the sandbox's
/// public contract is "always returns a result, never an error".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Exit status of the run step (or the failing step)
    pub exit_status: i32,

    /// Whether the wall-clock deadline fired
    pub timed_out: bool,

    /// Compiler diagnostics when the compile step failed.
    /// When set, the run step was never entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_error: Option<String>,

    /// Sandbox-internal failure (unsupported language, workspace allocation,
    /// spawn failure). When set, no meaningful program output exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Check if the execution ran to completion with exit status 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
            && !self.timed_out
            && self.compile_error.is_none()
            && self.error.is_none()
    }

    /// Result for a failure that happened before any process was spawned
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            exit_status: 1,
            ..Default::default()
        }
    }

    /// Result for a compile step that exited non-zero
    pub fn compile_failed(stderr: impl Into<String>, exit_status: i32) -> Self {
        let stderr = stderr.into();
        Self {
            compile_error: Some(stderr.clone()),
            stderr,
            exit_status: if exit_status == 0 { 1 } else { exit_status },
            ..Default::default()
        }
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_status: 0,
            timed_out: false,
            compile_error: None,
            error: None,
        }
    }
}
