//! Interviewer feedback
//!
//! Conversational feedback comes from an external text generator behind the
//! [`FeedbackGenerator`] trait. The [`Interviewer`] wraps a generator with
//! the prompt builders and a deadline, and guarantees that every call site
//! produces usable text: generator failure or deadline expiry degrades to a
//! deterministic fallback specific to that call site, never to an error the
//! connection layer has to handle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::analysis::{AnalysisResult, ComplexityClass};
use crate::config::GeneratorConfig;
use crate::session::SessionData;

mod gemini;

pub use gemini::GeminiClient;

/// How many recent conversation turns to quote in the adaptive prompt
const CONTEXT_TURNS: usize = 3;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("generator response contained no text")]
    EmptyResponse,
}

/// External text generator.
///
/// Implementations are expected to be slow and unreliable; the
/// [`Interviewer`] owns the deadline and the recovery policy.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, FeedbackError>;
}

/// Prompt construction and fallback policy over a [`FeedbackGenerator`]
pub struct Interviewer {
    generator: Arc<dyn FeedbackGenerator>,
    deadline: Duration,
}

impl Interviewer {
    pub fn new(generator: Arc<dyn FeedbackGenerator>, config: &GeneratorConfig) -> Self {
        Self {
            generator,
            deadline: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Adaptive reply to a submission or chat message. Chat messages carry
    /// no analysis; the prompt and fallback degrade accordingly.
    #[instrument(skip_all)]
    pub async fn adaptive_reply(
        &self,
        code: &str,
        analysis: Option<&AnalysisResult>,
        session: &SessionData,
        problem_description: &str,
    ) -> String {
        let prompt = build_adaptive_prompt(code, analysis, session, problem_description);
        let score = analysis.map_or(0, |a| a.overall_score);
        self.generate_or(&prompt, || adaptive_fallback(score)).await
    }

    /// Progressive hint; levels outside 1..=3 are treated as level 1
    #[instrument(skip_all, fields(hint_level = hint_level))]
    pub async fn hint(&self, code: &str, problem_description: &str, hint_level: u8) -> String {
        let prompt = build_hint_prompt(code, problem_description, hint_level);
        self.generate_or(&prompt, || hint_fallback(hint_level)).await
    }

    /// Follow-up question probing the candidate's understanding
    #[instrument(skip_all)]
    pub async fn follow_up(
        &self,
        code: &str,
        analysis: Option<&AnalysisResult>,
        problem_description: &str,
    ) -> String {
        let prompt = build_follow_up_prompt(code, analysis, problem_description);
        self.generate_or(&prompt, || FOLLOW_UP_FALLBACK.to_owned())
            .await
    }

    /// End-of-interview performance report over the whole session
    #[instrument(skip_all)]
    pub async fn report(&self, session: &SessionData) -> String {
        let prompt = build_report_prompt(session);
        self.generate_or(&prompt, || REPORT_FALLBACK.to_owned())
            .await
    }

    async fn generate_or(&self, prompt: &str, fallback: impl FnOnce() -> String) -> String {
        match tokio::time::timeout(self.deadline, self.generator.generate(prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "feedback generator failed, using fallback");
                fallback()
            }
            Err(_) => {
                warn!(deadline_secs = self.deadline.as_secs(), "feedback generator timed out, using fallback");
                fallback()
            }
        }
    }
}

fn build_adaptive_prompt(
    code: &str,
    analysis: Option<&AnalysisResult>,
    session: &SessionData,
    problem_description: &str,
) -> String {
    let context = if session.turns.is_empty() {
        "No previous context".to_owned()
    } else {
        session
            .recent_turns(CONTEXT_TURNS)
            .iter()
            .map(|turn| format!("{:?}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are CodeSage, an AI technical interviewer conducting a live coding \
         interview. You are supportive, educational, and adaptive.\n\n\
         Problem: {problem_description}\n\n\
         Candidate's Code:\n```\n{code}\n```\n\n\
         Analysis Results:\n\
         - Syntax Valid: {syntax_valid}\n\
         - Runtime Success: {runtime_ok}\n\
         - Overall Score: {overall}/100\n\
         - Time Complexity: {time_complexity}\n\
         - Space Complexity: {space_complexity}\n\
         - Quality Issues: {issues:?}\n\
         - Execution Time: {execution_secs:.3}s\n\n\
         Recent Conversation:\n{context}\n\n\
         Provide adaptive feedback:\n\
         1. Acknowledge what's working well (be specific)\n\
         2. Provide constructive suggestions for improvement\n\
         3. Ask follow-up questions to probe understanding\n\
         4. Discuss complexity and optimization opportunities\n\
         5. Offer encouragement and guidance\n\n\
         Be conversational, supportive, and educational. Adapt your response \
         based on performance. Keep responses concise but helpful (2-4 \
         sentences max). If the code has issues, guide them toward the \
         solution without giving it away. If the code is good, praise it \
         briefly, then ask them to explain it in a different way or describe \
         a potential pitfall of their approach.",
        syntax_valid = analysis.is_some_and(|a| a.syntax_valid),
        runtime_ok = analysis.is_some_and(|a| a.execution.is_success()),
        overall = analysis.map_or(0, |a| a.overall_score),
        time_complexity = analysis.map_or(ComplexityClass::Unknown, |a| a.time_complexity),
        space_complexity = analysis.map_or(ComplexityClass::Unknown, |a| a.space_complexity),
        issues = analysis.map_or(&[][..], |a| a.quality_issues.as_slice()),
        execution_secs = analysis.map_or(0.0, |a| a.execution_secs),
    )
}

fn build_hint_prompt(code: &str, problem_description: &str, hint_level: u8) -> String {
    let instruction = match hint_level {
        2 => {
            "Directly provide a more specific hint pointing towards the \
             solution approach for the following problem. Do not explain your \
             process."
        }
        3 => {
            "Directly provide a specific guidance on the data structure or \
             algorithm to use for the following problem. Be direct and \
             educational, but do not give the full code. If the candidate's \
             code is empty, suggest a common approach for this type of \
             problem. Do not explain your process."
        }
        _ => {
            "Directly provide one subtle, encouraging hint for the following \
             coding problem based on the user's code. Do not explain your \
             process or philosophy."
        }
    };

    format!(
        "{instruction}\n\n\
         Problem: {problem_description}\n\
         Candidate's Code:\n```\n{code}\n```\n\n\
         Your Hint:"
    )
}

fn build_follow_up_prompt(
    code: &str,
    analysis: Option<&AnalysisResult>,
    problem_description: &str,
) -> String {
    let analysis_json =
        serde_json::to_string(&analysis).unwrap_or_else(|_| "unavailable".to_owned());

    format!(
        "You are CodeSage, an AI technical interviewer. Generate a follow-up \
         question based on the candidate's code:\n\n\
         Problem: {problem_description}\n\
         Code: {code}\n\
         Analysis: {analysis_json}\n\n\
         Ask a thoughtful question that:\n\
         1. Probes the candidate's understanding of their approach\n\
         2. Tests their knowledge of time/space complexity\n\
         3. Explores alternative solutions\n\
         4. Validates their problem-solving methodology\n\n\
         Be conversational and educational. Ask one specific question."
    )
}

fn build_report_prompt(session: &SessionData) -> String {
    let session_json =
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "unavailable".to_owned());

    format!(
        "You are CodeSage, an AI technical interviewer. Generate a \
         comprehensive performance report:\n\n\
         Interview Data: {session_json}\n\n\
         Create a detailed report that includes:\n\
         1. Overall performance assessment\n\
         2. Strengths and areas for improvement\n\
         3. Technical skills evaluation\n\
         4. Problem-solving approach analysis\n\
         5. Communication and collaboration assessment\n\
         6. Recommendations for development\n\n\
         Be professional, constructive, and specific. Provide actionable \
         feedback."
    )
}

const FOLLOW_UP_FALLBACK: &str =
    "Can you explain your approach and what you think the time complexity is?";

const REPORT_FALLBACK: &str = "Performance report generation failed. Please try again.";

/// Score-tiered canned replies for when the generator is unavailable
fn adaptive_fallback(overall_score: u8) -> String {
    let text = if overall_score >= 90 {
        "Excellent work! Your solution is efficient and well-structured. Can \
         you explain your approach and what you think the time complexity is?"
    } else if overall_score >= 70 {
        "Good progress! I can see you're on the right track. Let's think \
         about how we can optimize this further. What data structures could \
         help?"
    } else if overall_score >= 50 {
        "You're making progress! Let me give you a hint to help you improve. \
         Think about the most efficient way to solve this problem."
    } else {
        "Let's work through this together. I'll help you break it down step \
         by step. What's your initial approach?"
    };
    text.to_owned()
}

fn hint_fallback(hint_level: u8) -> String {
    let text = match hint_level {
        2 => {
            "Consider using a hash map or set for O(1) lookups to avoid \
             nested loops. How could you track elements you've seen?"
        }
        3 => {
            "Try this approach: Use a set to track seen elements, then \
             iterate once through the array. This will give you O(n) time \
             complexity."
        }
        _ => {
            "Think about the data structures you could use to solve this \
             efficiently. What would give you the best time complexity?"
        }
    };
    text.to_owned()
}
