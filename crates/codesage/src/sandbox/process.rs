//! Child-process spawning with a hard wall-clock deadline
//!
//! Every compile and run step goes through [`run_limited`]: a fresh process
//! with captured stdout/stderr, killed forcibly when the deadline fires.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::sandbox::SandboxError;

/// Raw output of one bounded child process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Output reported when the deadline fired and the child was killed
    fn deadline_exceeded() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_status: 1,
            timed_out: true,
        }
    }
}

/// Run a command in `cwd` with captured output and a wall-clock deadline.
///
/// The child is spawned with `kill_on_drop`, so when the deadline elapses
/// and the wait future is dropped the process is forcibly reclaimed. The
/// deadline case is reported in the output, not as an error; `Err` is
/// reserved for spawn/I-O failures.
#[instrument(skip(command, stdin_data), fields(program = %command.first().map(String::as_str).unwrap_or("")))]
pub async fn run_limited(
    command: &[String],
    cwd: &Path,
    deadline: Duration,
    stdin_data: Option<&[u8]>,
) -> Result<ProcessOutput, SandboxError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| SandboxError::InvalidCommand("empty command".to_owned()))?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(SandboxError::Spawn)?;

    let stdin_pipe = child.stdin.take();

    debug!(?deadline, "child spawned, waiting");

    // The stdin write runs under the same deadline as the wait: a child
    // that never drains its stdin pipe cannot stall the caller
    let wait = async move {
        if let (Some(data), Some(mut stdin)) = (stdin_data, stdin_pipe) {
            stdin.write_all(data).await?;
            // Drop closes the pipe so the child sees EOF
        }
        child.wait_with_output().await
    };

    match tokio::time::timeout(deadline, wait).await {
        Ok(output) => {
            let output = output?;
            let result = ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_status: output.status.code().unwrap_or(1),
                timed_out: false,
            };
            debug!(exit_status = result.exit_status, "child exited");
            Ok(result)
        }
        Err(_) => {
            // The wait future was dropped, which kills the child via
            // kill_on_drop. No retry.
            debug!("deadline exceeded, child killed");
            Ok(ProcessOutput::deadline_exceeded())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn captures_stdout() {
        let out = run_limited(
            &cmd(&["sh", "-c", "echo hello"]),
            Path::new("/tmp"),
            Duration::from_secs(5),
            None,
        )
        .await
        .unwrap();
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.exit_status, 0);
        assert!(!out.timed_out);
    }

    #[tokio::test]
    async fn captures_stderr_and_exit_status() {
        let out = run_limited(
            &cmd(&["sh", "-c", "echo oops >&2; exit 3"]),
            Path::new("/tmp"),
            Duration::from_secs(5),
            None,
        )
        .await
        .unwrap();
        assert_eq!(out.stderr, "oops\n");
        assert_eq!(out.exit_status, 3);
    }

    #[tokio::test]
    async fn deadline_kills_child() {
        let started = std::time::Instant::now();
        let out = run_limited(
            &cmd(&["sh", "-c", "sleep 30"]),
            Path::new("/tmp"),
            Duration::from_millis(200),
            None,
        )
        .await
        .unwrap();
        assert!(out.timed_out);
        assert_ne!(out.exit_status, 0);
        // The child must be reclaimed promptly, not after its sleep
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn stdin_is_delivered() {
        let out = run_limited(
            &cmd(&["sh", "-c", "cat"]),
            Path::new("/tmp"),
            Duration::from_secs(5),
            Some(b"piped input"),
        )
        .await
        .unwrap();
        assert_eq!(out.stdout, "piped input");
    }

    #[tokio::test]
    async fn deadline_covers_a_stalled_stdin_write() {
        // The child never reads stdin, so a payload larger than the pipe
        // buffer would block the writer forever without the deadline
        let payload = vec![b'x'; 4 * 1024 * 1024];
        let started = std::time::Instant::now();
        let out = run_limited(
            &cmd(&["sh", "-c", "sleep 30"]),
            Path::new("/tmp"),
            Duration::from_millis(200),
            Some(&payload),
        )
        .await
        .unwrap();
        assert!(out.timed_out);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let result = run_limited(
            &cmd(&["codesage-no-such-binary-xyz"]),
            Path::new("/tmp"),
            Duration::from_secs(1),
            None,
        )
        .await;
        assert!(matches!(result, Err(SandboxError::Spawn(_))));
    }

    #[tokio::test]
    async fn empty_command_rejected() {
        let result = run_limited(&[], Path::new("/tmp"), Duration::from_secs(1), None).await;
        assert!(matches!(result, Err(SandboxError::InvalidCommand(_))));
    }
}
