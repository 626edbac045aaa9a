//! A library for AI-assisted live coding interviews.
//!
//! CodeSage provides an async Rust API for running candidate code in
//! sandboxed child processes, analyzing submissions, and tracking interview
//! sessions, with conversational feedback from an external text generator.
//!
//! # Features
//!
//! - **Sandboxed execution** — Per-language compile/run pipeline with hard
//!   wall-clock deadlines and unconditional workspace cleanup.
//! - **Submission analysis** — Syntax check, runtime verdict, complexity
//!   heuristics, quality rubric, and a weighted overall score.
//! - **Session registry** — Append-only per-interview conversation,
//!   submission, and hint logs, safe under concurrent connections.
//! - **Interviewer feedback** — Prompted external generator with a deadline
//!   and deterministic per-call-site fallbacks.
//! - **Typed wire events** — Closed tagged enums for the per-interview
//!   channel.

pub use analysis::{
    AnalysisPipeline, AnalysisResult, ComplexityClass, ComplexityEstimate, Grade, QualityReport,
    StaticAnalyzer, SyntaxReport,
};
pub use config::{
    Config, ConfigError, EXAMPLE_CONFIG, ExecutionConfig, GeneratorConfig, ServerConfig,
};
pub use events::{InboundEvent, OutboundEvent};
pub use feedback::{FeedbackError, FeedbackGenerator, GeminiClient, Interviewer};
pub use sandbox::{Language, Sandbox, SandboxError, Workspace};
pub use session::{
    ConversationTurn, HintEvent, Role, SessionData, SessionRegistry, Submission, TurnKind,
};
pub use types::{ExecutionRequest, ExecutionResult};

pub mod analysis;
pub mod config;
pub mod events;
pub mod feedback;
pub mod sandbox;
pub mod session;
pub mod types;
