//! Execution sandbox
//!
//! Runs untrusted candidate code as isolated child processes. Each
//! invocation walks a fixed pipeline — PREPARE → (COMPILE) → RUN → CLEANUP —
//! and always reaches CLEANUP: the workspace is a scoped temporary directory
//! released on drop, so no early return, deadline kill, or spawn failure can
//! leak artifacts.
//!
//! The public contract is "always returns a result": every failure mode is
//! encoded in [`ExecutionResult`], never propagated as an error.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

pub use crate::sandbox::language::{CompileSpec, Language, LanguageSpec, expand_command};
pub use crate::sandbox::process::{ProcessOutput, run_limited};
pub use crate::sandbox::workspace::Workspace;

use crate::config::ExecutionConfig;
use crate::types::{ExecutionRequest, ExecutionResult};

pub mod language;
pub mod process;
pub mod workspace;

/// Errors internal to the sandbox pipeline.
///
/// These never cross the public boundary: [`Sandbox::execute`] converts them
/// into the `error` field of [`ExecutionResult`].
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to allocate workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("execution pool closed")]
    PoolClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The per-language compile/execute pipeline.
///
/// Holds the wall-clock budget and a semaphore bounding concurrent child
/// processes across all sessions.
#[derive(Debug)]
pub struct Sandbox {
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl Sandbox {
    /// Create a sandbox from execution settings
    pub fn new(config: &ExecutionConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            permits: Arc::new(Semaphore::new(config.max_concurrent)),
        }
    }

    /// Create a sandbox with an explicit timeout and concurrency cap
    pub fn with_limits(timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Number of executions that could start without waiting
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Compile (if needed) and run one submission.
    ///
    /// Unsupported language tags are reported in the result without spawning
    /// any process. Compile failures short-circuit past RUN. The deadline
    /// kills the child and is reported as `timed_out`.
    #[instrument(skip(self, request), fields(language = %request.language))]
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let Some(language) = Language::from_tag(&request.language) else {
            debug!(tag = %request.language, "unsupported language");
            return ExecutionResult::failed(
                SandboxError::UnsupportedLanguage(request.language.clone()).to_string(),
            );
        };

        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return ExecutionResult::failed(SandboxError::PoolClosed.to_string()),
        };

        match self.run_pipeline(language, &request.source).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "sandbox pipeline failed");
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    /// Run an auxiliary command under the same concurrency cap as
    /// executions, so every child process this crate spawns counts against
    /// one semaphore.
    pub(crate) async fn run_aux(
        &self,
        command: &[String],
        cwd: &std::path::Path,
        deadline: Duration,
        stdin_data: Option<&[u8]>,
    ) -> Result<ProcessOutput, SandboxError> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| SandboxError::PoolClosed)?;
        run_limited(command, cwd, deadline, stdin_data).await
    }

    /// PREPARE → (COMPILE) → RUN. The workspace drops at the end of this
    /// function on every path, which is the CLEANUP phase.
    async fn run_pipeline(
        &self,
        language: Language,
        source: &str,
    ) -> Result<ExecutionResult, SandboxError> {
        let spec = language.spec();

        // PREPARE
        let workspace = Workspace::create()?;
        workspace
            .write_file(spec.source_name, source.as_bytes())
            .await?;

        // COMPILE
        if let Some(ref compile) = spec.compile {
            let compile_cmd = expand_command(compile.command, spec.source_name, binary_stem(&spec));
            debug!(?compile_cmd, "compiling");

            let out = run_limited(&compile_cmd, workspace.path(), self.timeout, None).await?;
            if out.timed_out {
                return Ok(ExecutionResult {
                    compile_error: Some("compilation timed out".to_owned()),
                    timed_out: true,
                    exit_status: 1,
                    ..Default::default()
                });
            }
            if out.exit_status != 0 {
                debug!(exit_status = out.exit_status, "compilation failed");
                return Ok(ExecutionResult::compile_failed(out.stderr, out.exit_status));
            }
        }

        // RUN
        let run_cmd = expand_command(spec.run_command, spec.source_name, binary_stem(&spec));
        debug!(?run_cmd, "running");

        let out = run_limited(&run_cmd, workspace.path(), self.timeout, None).await?;
        Ok(ExecutionResult {
            stdout: out.stdout,
            stderr: out.stderr,
            exit_status: out.exit_status,
            timed_out: out.timed_out,
            compile_error: None,
            error: None,
        })
    }
}

/// The `{binary}` placeholder value: the compiler output without a `.class`
/// style suffix for run commands like `./main`.
fn binary_stem(spec: &LanguageSpec) -> &'static str {
    match &spec.compile {
        Some(compile) => compile
            .output_name
            .strip_suffix(".class")
            .unwrap_or(compile.output_name),
        None => spec.source_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sandbox() -> Sandbox {
        Sandbox::with_limits(Duration::from_secs(5), 2)
    }

    #[tokio::test]
    async fn unsupported_language_reported_without_spawn() {
        let sandbox = test_sandbox();
        let result = sandbox
            .execute(&ExecutionRequest::new("puts 1", "ruby"))
            .await;

        assert_eq!(result.exit_status, 1);
        assert!(result.error.as_deref().unwrap().contains("ruby"));
        assert!(result.stdout.is_empty());
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn unsupported_language_leaves_all_slots_free() {
        let sandbox = test_sandbox();
        let before = sandbox.available_slots();
        let _ = sandbox.execute(&ExecutionRequest::new("", "brainfuck")).await;
        assert_eq!(sandbox.available_slots(), before);
    }

    #[test]
    fn binary_stem_strips_class_suffix() {
        assert_eq!(binary_stem(&Language::Java.spec()), "Solution");
        assert_eq!(binary_stem(&Language::Cpp.spec()), "main");
        assert_eq!(binary_stem(&Language::Python.spec()), "main.py");
    }

    #[tokio::test]
    async fn aux_commands_share_the_execution_slots() {
        let sandbox = Sandbox::with_limits(Duration::from_secs(5), 1);
        let command: Vec<String> = ["sh", "-c", "sleep 0.3"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let started = std::time::Instant::now();
        let (a, b) = tokio::join!(
            sandbox.run_aux(&command, std::path::Path::new("/tmp"), Duration::from_secs(5), None),
            sandbox.run_aux(&command, std::path::Path::new("/tmp"), Duration::from_secs(5), None),
        );
        a.unwrap();
        b.unwrap();

        // One permit forces the two children to run back to back
        assert!(started.elapsed() >= Duration::from_millis(550));
    }

    #[test]
    fn sandbox_from_config_uses_settings() {
        let config = ExecutionConfig {
            timeout_secs: 3,
            max_concurrent: 4,
        };
        let sandbox = Sandbox::new(&config);
        assert_eq!(sandbox.timeout, Duration::from_secs(3));
        assert_eq!(sandbox.available_slots(), 4);
    }
}
