//! Analysis pipeline
//!
//! Turns one submission into a structured verdict by composing independent
//! stages: syntax check, sandboxed execution, complexity heuristic, quality
//! rubric, and a fixed score aggregation. A failure in one stage never
//! aborts the others; each degrades to a valid sub-result on its own.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use crate::analysis::complexity::{ComplexityClass, ComplexityEstimate, StaticAnalyzer};
pub use crate::analysis::quality::{Grade, QualityReport};
pub use crate::analysis::syntax::SyntaxReport;

use crate::sandbox::{Language, Sandbox};
use crate::types::{ExecutionRequest, ExecutionResult};

pub mod complexity;
pub mod quality;
pub mod syntax;

/// Structured verdict for one submission.
///
/// Derived and immutable; attached to exactly one [`Submission`].
///
/// [`Submission`]: crate::session::Submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Whether the source parsed (permissively true when unassessable)
    pub syntax_valid: bool,

    /// Parser diagnostics, empty when valid
    pub syntax_errors: Vec<String>,

    /// Outcome of the sandboxed run
    pub execution: ExecutionResult,

    /// Wall-clock duration of the sandbox call, measured by this pipeline
    pub execution_secs: f64,

    /// Heuristic time-complexity label (approximate, not a verified bound)
    pub time_complexity: ComplexityClass,

    /// Heuristic space-complexity label
    pub space_complexity: ComplexityClass,

    /// Rubric score, 0..=100
    pub quality_score: u8,

    /// Letter grade from the rubric thresholds
    pub quality_grade: Grade,

    /// Named issues for unmet rubric checks
    pub quality_issues: Vec<String>,

    /// Weighted aggregate, 0..=100
    pub overall_score: u8,
}

/// Composes the analysis stages over a shared sandbox
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    sandbox: Arc<Sandbox>,
}

impl AnalysisPipeline {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }

    /// Analyze one submission.
    ///
    /// Infallible by contract: every stage encodes its own failure mode in
    /// its sub-result.
    #[instrument(skip_all, fields(language = %language_tag))]
    pub async fn analyze(&self, code: &str, language_tag: &str) -> AnalysisResult {
        let language = Language::from_tag(language_tag);

        // Syntax stage; the checker child shares the sandbox's slots
        let syntax = syntax::check(code, language, &self.sandbox).await;

        // Runtime stage, with the duration measured here
        let started = Instant::now();
        let execution = self
            .sandbox
            .execute(&ExecutionRequest::new(code, language_tag))
            .await;
        let execution_secs = started.elapsed().as_secs_f64();

        // Static stages
        let complexity = complexity::analyzer_for(language).estimate(code);
        let quality = quality::assess(code);

        let overall_score = overall_score(syntax.valid, execution.is_success(), quality.score);

        debug!(
            syntax_valid = syntax.valid,
            runtime_ok = execution.is_success(),
            quality = quality.score,
            overall = overall_score,
            "analysis complete"
        );

        AnalysisResult {
            syntax_valid: syntax.valid,
            syntax_errors: syntax.errors,
            execution,
            execution_secs,
            time_complexity: complexity.time,
            space_complexity: complexity.space,
            quality_score: quality.score,
            quality_grade: quality.grade,
            quality_issues: quality.issues,
            overall_score,
        }
    }
}

/// Fixed aggregation policy: 25 points each for valid syntax and a clean
/// run, a quarter of the quality score, and a 25-point performance
/// placeholder; truncated and clamped to [0, 100]. Documented contract,
/// not a tunable.
fn overall_score(syntax_valid: bool, runtime_ok: bool, quality_score: u8) -> u8 {
    let mut score = 25.0; // performance placeholder
    if syntax_valid {
        score += 25.0;
    }
    if runtime_ok {
        score += 25.0;
    }
    score += f64::from(quality_score) * 0.25;

    (score as u8).min(100)
}
