//! Heuristic complexity estimation
//!
//! This is a textual pattern match over the source, not a static analysis:
//! the labels are best-effort hints for the interviewer, never verified
//! bounds. The heuristics live behind [`StaticAnalyzer`] so a real
//! parser/AST-based implementation can be substituted per language without
//! touching the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sandbox::Language;

/// Closed set of complexity labels the heuristics can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityClass {
    #[serde(rename = "O(1)")]
    Constant,

    #[serde(rename = "O(n)")]
    Linear,

    #[serde(rename = "O(n²)")]
    Quadratic,

    #[serde(rename = "Unknown")]
    Unknown,
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComplexityClass::Constant => "O(1)",
            ComplexityClass::Linear => "O(n)",
            ComplexityClass::Quadratic => "O(n²)",
            ComplexityClass::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Time and space estimate for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityEstimate {
    pub time: ComplexityClass,
    pub space: ComplexityClass,
}

impl ComplexityEstimate {
    fn unknown() -> Self {
        Self {
            time: ComplexityClass::Unknown,
            space: ComplexityClass::Unknown,
        }
    }
}

/// Per-language complexity strategy
pub trait StaticAnalyzer: Send + Sync {
    /// Estimate time/space complexity from source text
    fn estimate(&self, code: &str) -> ComplexityEstimate;
}

/// Select the strategy for a language tag.
///
/// Languages without a heuristic get the Unknown/Unknown strategy.
pub fn analyzer_for(language: Option<Language>) -> &'static dyn StaticAnalyzer {
    match language {
        Some(Language::Python) => &PythonHeuristics,
        Some(Language::Javascript) => &JavascriptHeuristics,
        _ => &NoHeuristics,
    }
}

/// Pattern heuristics for Python: nested `range` loops read as quadratic,
/// any `for` as linear.
struct PythonHeuristics;

impl StaticAnalyzer for PythonHeuristics {
    fn estimate(&self, code: &str) -> ComplexityEstimate {
        let time = if code.contains("for i in range") && code.contains("for j in range") {
            ComplexityClass::Quadratic
        } else if code.contains("for ") {
            ComplexityClass::Linear
        } else {
            ComplexityClass::Constant
        };
        ComplexityEstimate {
            time,
            space: ComplexityClass::Constant,
        }
    }
}

/// Pattern heuristics for JavaScript
struct JavascriptHeuristics;

impl StaticAnalyzer for JavascriptHeuristics {
    fn estimate(&self, code: &str) -> ComplexityEstimate {
        let time = if code.contains("for (let i") && code.contains("for (let j") {
            ComplexityClass::Quadratic
        } else if code.contains("for (") || code.contains("forEach") {
            ComplexityClass::Linear
        } else {
            ComplexityClass::Constant
        };
        ComplexityEstimate {
            time,
            space: ComplexityClass::Constant,
        }
    }
}

/// Fallback for languages without a heuristic
struct NoHeuristics;

impl StaticAnalyzer for NoHeuristics {
    fn estimate(&self, _code: &str) -> ComplexityEstimate {
        ComplexityEstimate::unknown()
    }
}
