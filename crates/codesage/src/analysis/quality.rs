//! Code quality rubric
//!
//! A fixed set of independent checks, each worth a fixed point value. The
//! rubric is a documented policy, not a tunable: unmet checks are recorded
//! as named issues and the grade thresholds are part of the contract.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Points awarded per satisfied check
const POINTS_PER_CHECK: u8 = 20;

static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][a-zA-Z0-9]*").expect("identifier pattern is valid"));

/// Letter grade derived from the rubric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
}

impl Grade {
    fn from_score(score: u8) -> Self {
        if score >= 80 {
            Grade::A
        } else if score >= 60 {
            Grade::B
        } else {
            Grade::C
        }
    }
}

/// Rubric outcome for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    /// Total points, 0..=100
    pub score: u8,

    /// Letter grade from the score thresholds (≥80 A, ≥60 B, else C)
    pub grade: Grade,

    /// Named issues for each unmet check
    pub issues: Vec<String>,
}

/// Run the rubric over a submission
pub fn assess(code: &str) -> QualityReport {
    let mut score = 0;
    let mut issues = Vec::new();

    let mut check = |passed: bool, issue: &str| {
        if passed {
            score += POINTS_PER_CHECK;
        } else {
            issues.push(issue.to_owned());
        }
    };

    // Comment markers
    check(
        code.contains("//") || code.contains('#') || code.contains("/*"),
        "No comments found",
    );

    // Identifier naming
    check(IDENTIFIER_PATTERN.is_match(code), "Poor variable naming");

    // Multi-line formatting
    check(code.lines().count() > 1, "Poor formatting");

    // Conditional / error-handling constructs
    check(
        code.contains("try") || code.contains("catch") || code.contains("if"),
        "No error handling",
    );

    // Iteration constructs
    check(
        code.contains("for") && code.contains("in"),
        "Could be more efficient",
    );

    QualityReport {
        score,
        grade: Grade::from_score(score),
        issues,
    }
}
