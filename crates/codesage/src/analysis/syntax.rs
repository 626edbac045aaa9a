//! Syntax stage
//!
//! Python sources are parse-checked by the interpreter's own parser via a
//! short-lived child process. Languages without a parser hook report valid
//! with no errors: "cannot assess" is treated as "no known problem", an
//! explicit policy choice, not a correctness guarantee. The same permissive
//! fallback applies when the checker itself cannot run.

use std::time::Duration;

use tracing::debug;

use crate::sandbox::{Language, Sandbox};

/// Deadline for the parse-check process
const CHECK_DEADLINE: Duration = Duration::from_secs(3);

/// One-liner that parses stdin and reports the first syntax error on stderr
const PYTHON_PARSE_CHECK: &str = concat!(
    "import ast, sys\n",
    "try:\n",
    "    ast.parse(sys.stdin.read())\n",
    "except SyntaxError as e:\n",
    "    print(f'Line {e.lineno}: {e.msg}', file=sys.stderr)\n",
    "    sys.exit(1)\n",
);

/// Outcome of the syntax stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl SyntaxReport {
    /// The permissive default used when no parser is available
    pub fn assumed_valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Parse-check a submission.
///
/// Never fails: checker errors degrade to the permissive default. The
/// checker child counts against the sandbox's concurrency cap like any
/// other spawned process.
pub async fn check(code: &str, language: Option<Language>, sandbox: &Sandbox) -> SyntaxReport {
    match language {
        Some(Language::Python) => check_python(code, sandbox).await,
        _ => SyntaxReport::assumed_valid(),
    }
}

async fn check_python(code: &str, sandbox: &Sandbox) -> SyntaxReport {
    let command = vec![
        "python3".to_owned(),
        "-c".to_owned(),
        PYTHON_PARSE_CHECK.to_owned(),
    ];

    let out = match sandbox
        .run_aux(
            &command,
            &std::env::temp_dir(),
            CHECK_DEADLINE,
            Some(code.as_bytes()),
        )
        .await
    {
        Ok(out) => out,
        Err(e) => {
            debug!(error = %e, "python parse check unavailable, assuming valid");
            return SyntaxReport::assumed_valid();
        }
    };

    if out.timed_out {
        debug!("python parse check timed out, assuming valid");
        return SyntaxReport::assumed_valid();
    }

    if out.exit_status == 0 {
        return SyntaxReport::assumed_valid();
    }

    let errors: Vec<String> = out
        .stderr
        .lines()
        .map(str::to_owned)
        .filter(|line| !line.is_empty())
        .collect();

    if errors.is_empty() {
        // Non-zero exit without diagnostics means the checker itself broke
        SyntaxReport::assumed_valid()
    } else {
        SyntaxReport::invalid(errors)
    }
}
