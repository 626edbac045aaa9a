//! Event handlers
//!
//! One handler per inbound event kind, dispatched exhaustively. Handlers
//! are transport-free: they read and mutate the session registry, call the
//! analysis pipeline and the interviewer, and emit outbound events through
//! the [`ConnectionMap`], which is what makes them directly testable.
//!
//! [`ConnectionMap`]: crate::state::ConnectionMap

use codesage::{
    ConversationTurn, HintEvent, InboundEvent, OutboundEvent, Role, Submission, TurnKind,
};
use tracing::{info, instrument};

use crate::state::AppState;

/// Max source characters quoted in the conversation-log digest of a
/// submission
const DIGEST_CHARS: usize = 100;

/// Route one decoded event to its handler.
///
/// Called inline from the connection's read loop, so events from one
/// connection are processed strictly in arrival order.
#[instrument(skip(state, event))]
pub async fn dispatch(
    state: &AppState,
    interview_id: &str,
    connection_id: u64,
    event: InboundEvent,
) {
    match event {
        InboundEvent::AnalyzeCode {
            code,
            language,
            problem_description,
        } => analyze_code(state, interview_id, &code, &language, &problem_description).await,
        InboundEvent::SendMessage { message } => send_message(state, interview_id, &message).await,
        InboundEvent::RequestHint {
            question_id,
            code,
            problem_description,
            hint_level,
        } => {
            request_hint(
                state,
                interview_id,
                connection_id,
                &question_id,
                &code,
                &problem_description,
                hint_level,
            )
            .await
        }
        InboundEvent::RequestFollowUp {
            code,
            problem_description,
        } => {
            request_follow_up(
                state,
                interview_id,
                connection_id,
                &code,
                &problem_description,
            )
            .await
        }
        InboundEvent::GenerateReport => generate_report(state, interview_id, connection_id).await,
    }
}

async fn analyze_code(
    state: &AppState,
    interview_id: &str,
    code: &str,
    language: &str,
    problem_description: &str,
) {
    // Context is the conversation as it stood before this submission
    let context = state.registry.snapshot(interview_id).await;

    let analysis = state.pipeline.analyze(code, language).await;
    let reply = state
        .interviewer
        .adaptive_reply(code, Some(&analysis), &context, problem_description)
        .await;

    info!(
        interview_id,
        language,
        overall_score = analysis.overall_score,
        "code submission analyzed"
    );

    // The submission and both turns land in one atomic commit, so they are
    // contiguous in the log and precede the broadcast
    state
        .registry
        .record_submission_exchange(
            interview_id,
            Submission::new(code, language, analysis.clone()),
            vec![
                ConversationTurn::new(Role::Candidate, TurnKind::Code, code_digest(code)),
                ConversationTurn::new(Role::Assistant, TurnKind::Analysis, reply.clone()),
            ],
        )
        .await;

    state
        .connections
        .broadcast(
            interview_id,
            &OutboundEvent::CodeAnalysis {
                analysis,
                ai_response: reply,
            },
        )
        .await;
}

async fn send_message(state: &AppState, interview_id: &str, message: &str) {
    state
        .registry
        .record_turn(interview_id, ConversationTurn::candidate(message))
        .await;

    // Chat replies have no code or analysis context
    let context = state.registry.snapshot(interview_id).await;
    let reply = state.interviewer.adaptive_reply("", None, &context, "").await;

    state
        .registry
        .record_turn(interview_id, ConversationTurn::assistant(reply.clone()))
        .await;

    state
        .connections
        .broadcast(interview_id, &OutboundEvent::ChatMessage { ai_response: reply })
        .await;
}

async fn request_hint(
    state: &AppState,
    interview_id: &str,
    connection_id: u64,
    question_id: &str,
    code: &str,
    problem_description: &str,
    hint_level: u8,
) {
    // Hint levels are 1..=3 everywhere past this point: in the log entry,
    // the generator call, and the echoed reply
    let hint_level = hint_level.clamp(1, 3);

    let hint = state
        .interviewer
        .hint(code, problem_description, hint_level)
        .await;

    state
        .registry
        .record_hint(interview_id, HintEvent::new(hint_level, question_id, hint.clone()))
        .await;

    info!(interview_id, hint_level, "hint issued");

    state
        .connections
        .send_to(
            interview_id,
            connection_id,
            OutboundEvent::HintResponse { hint, hint_level },
        )
        .await;
}

async fn request_follow_up(
    state: &AppState,
    interview_id: &str,
    connection_id: u64,
    code: &str,
    problem_description: &str,
) {
    // Grounded in the latest submission's analysis when one exists; the
    // logs themselves are not mutated
    let snapshot = state.registry.snapshot(interview_id).await;
    let analysis = snapshot.submissions.last().map(|s| &s.analysis);

    let question = state
        .interviewer
        .follow_up(code, analysis, problem_description)
        .await;

    state
        .connections
        .send_to(
            interview_id,
            connection_id,
            OutboundEvent::FollowUpQuestion { question },
        )
        .await;
}

async fn generate_report(state: &AppState, interview_id: &str, connection_id: u64) {
    let snapshot = state.registry.snapshot(interview_id).await;
    let report = state.interviewer.report(&snapshot).await;

    info!(interview_id, "performance report generated");

    state
        .connections
        .send_to(
            interview_id,
            connection_id,
            OutboundEvent::PerformanceReport { report },
        )
        .await;
}

/// Short conversation-log form of a submission
fn code_digest(code: &str) -> String {
    let head: String = code.chars().take(DIGEST_CHARS).collect();
    format!("Code submission: {head}...")
}
