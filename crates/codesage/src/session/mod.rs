//! Session registry
//!
//! Per-interview mutable state: conversation history, submission log, and
//! hint log, keyed by interview identifier. The registry is an explicit,
//! lifecycle-scoped object injected into whatever needs it — never ambient
//! global state. Logs are append-only; nothing here ever merges, splits,
//! edits, or drops an entry. A session outlives any individual connection
//! and is only removed through the explicit teardown hook.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::analysis::AnalysisResult;

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Assistant,
}

/// What a conversation turn carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Text,
    Code,
    Hint,
    Analysis,
}

/// One entry in the conversation log, ordered by insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub kind: TurnKind,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, kind: TurnKind, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            kind,
            at: Utc::now(),
        }
    }

    pub fn candidate(content: impl Into<String>) -> Self {
        Self::new(Role::Candidate, TurnKind::Text, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, TurnKind::Text, content)
    }
}

/// One candidate code attempt plus its derived analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub code: String,
    pub language: String,
    pub analysis: AnalysisResult,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        code: impl Into<String>,
        language: impl Into<String>,
        analysis: AnalysisResult,
    ) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            analysis,
            submitted_at: Utc::now(),
        }
    }
}

/// One hint handed to the candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintEvent {
    pub level: u8,
    pub question_id: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl HintEvent {
    pub fn new(level: u8, question_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            question_id: question_id.into(),
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Defensive copy of a session's logs, suitable for handing to the
/// external report generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub turns: Vec<ConversationTurn>,
    pub submissions: Vec<Submission>,
    pub hints: Vec<HintEvent>,
}

impl SessionData {
    /// The most recent `count` conversation turns, oldest first
    pub fn recent_turns(&self, count: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(count);
        &self.turns[start..]
    }
}

/// Append-only logs for one interview
#[derive(Debug, Default)]
struct SessionLog {
    turns: Vec<ConversationTurn>,
    submissions: Vec<Submission>,
    hints: Vec<HintEvent>,
}

/// The single authoritative in-memory map of sessions.
///
/// Exactly one session exists per interview identifier; every connection
/// for that identifier shares it. The per-session mutex makes each append
/// operation atomic across concurrent connections.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionLog>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a session exists for the interview (idempotent)
    pub async fn ensure(&self, interview_id: &str) {
        let _ = self.get_or_create(interview_id).await;
    }

    async fn get_or_create(&self, interview_id: &str) -> Arc<Mutex<SessionLog>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(interview_id) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(interview_id.to_owned())
                .or_insert_with(|| {
                    debug!(interview_id, "session created");
                    Arc::new(Mutex::new(SessionLog::default()))
                }),
        )
    }

    /// Append one conversation turn
    pub async fn record_turn(&self, interview_id: &str, turn: ConversationTurn) {
        let session = self.get_or_create(interview_id).await;
        session.lock().await.turns.push(turn);
    }

    /// Append several conversation turns as one atomic commit, so the
    /// entries land contiguously even under concurrent connections
    pub async fn record_turns(&self, interview_id: &str, turns: Vec<ConversationTurn>) {
        let session = self.get_or_create(interview_id).await;
        session.lock().await.turns.extend(turns);
    }

    /// Commit a submission together with its conversation turns atomically:
    /// either everything lands or nothing does
    pub async fn record_submission_exchange(
        &self,
        interview_id: &str,
        submission: Submission,
        turns: Vec<ConversationTurn>,
    ) {
        let session = self.get_or_create(interview_id).await;
        let mut log = session.lock().await;
        log.submissions.push(submission);
        log.turns.extend(turns);
    }

    /// Append a hint event
    pub async fn record_hint(&self, interview_id: &str, hint: HintEvent) {
        let session = self.get_or_create(interview_id).await;
        session.lock().await.hints.push(hint);
    }

    /// Defensive copy of the session's logs
    pub async fn snapshot(&self, interview_id: &str) -> SessionData {
        let session = self.get_or_create(interview_id).await;
        let log = session.lock().await;
        SessionData {
            turns: log.turns.clone(),
            submissions: log.submissions.clone(),
            hints: log.hints.clone(),
        }
    }

    /// Teardown hook for interview completion/cancellation.
    ///
    /// The core never calls this on disconnect; it is for the external
    /// lifecycle manager.
    pub async fn remove(&self, interview_id: &str) {
        if self.sessions.write().await.remove(interview_id).is_some() {
            debug!(interview_id, "session removed");
        }
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
