//! Wire events
//!
//! Tagged inbound/outbound event types for the per-interview channel. The
//! event kind is a closed enum with exhaustive dispatch, so adding a kind is
//! a compile-time-checked change rather than a stringly-typed branch.
//! Missing optional fields decode to the documented defaults instead of
//! rejecting the frame.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

/// Events a client may send over an interview channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Submit code for the full analysis pipeline
    AnalyzeCode {
        #[serde(default)]
        code: String,

        /// Language tag; defaults to python when omitted
        #[serde(default = "default_language")]
        language: String,

        #[serde(default)]
        problem_description: String,
    },

    /// Free-form chat message from the candidate
    SendMessage {
        #[serde(default)]
        message: String,
    },

    /// Ask for a progressive hint
    RequestHint {
        #[serde(default)]
        question_id: String,

        #[serde(default)]
        code: String,

        #[serde(default)]
        problem_description: String,

        /// 1..=3; out-of-range values are clamped at dispatch
        #[serde(default = "default_hint_level")]
        hint_level: u8,
    },

    /// Ask for a follow-up question probing the current solution
    RequestFollowUp {
        #[serde(default)]
        code: String,

        #[serde(default)]
        problem_description: String,
    },

    /// Ask for the end-of-interview performance report
    GenerateReport,
}

/// Events the server sends back over an interview channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Analysis verdict plus the interviewer's adaptive reply (broadcast)
    CodeAnalysis {
        analysis: AnalysisResult,
        ai_response: String,
    },

    /// Interviewer reply to a chat message (broadcast)
    ChatMessage { ai_response: String },

    /// Hint text for the requesting connection only
    HintResponse { hint: String, hint_level: u8 },

    /// Follow-up question for the requesting connection only
    FollowUpQuestion { question: String },

    /// Performance report for the requesting connection only
    PerformanceReport { report: String },
}

fn default_language() -> String {
    "python".to_owned()
}

fn default_hint_level() -> u8 {
    1
}
