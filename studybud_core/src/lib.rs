#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Conversation orchestration core for the studybud service.
//!
//! This crate holds the domain types, the capability traits for the
//! generative backend and durable history storage, the content generators
//! with their deterministic fallbacks, the process-wide session registry,
//! and the [`ChatEngine`] that ties a chat turn together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod engine;
pub mod generate;
pub mod intent;
pub mod registry;

pub use engine::{ChatEngine, ChatOutcome, ChatPayload};
pub use generate::{GeneratorDefaults, QuizResult};
pub use intent::Intent;
pub use registry::SessionRegistry;

/// Who authored a stored message. The set is closed: every record in the
/// history log is either side of one exchange.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    /// Read a role back from its stored form.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "user" => Self::User,
            _ => Self::Bot,
        }
    }
}

/// A single message as recorded in the history store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Metadata tracked per session in the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionMeta {
    pub created_at: DateTime<Utc>,
}

/// One multiple-choice quiz question. Well-formed questions carry exactly
/// four choices; `answer` is the zero-based index of the correct one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub choices: Vec<String>,
    pub answer: usize,
}

/// Failures of the generative backend. All of these are absorbed at the
/// generator boundary and converted into fallback output; none reach the
/// orchestrator's caller.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("generative backend is not configured")]
    Unavailable,

    #[error("backend request failed: {0}")]
    Invocation(String),

    #[error("backend returned an unusable response: {0}")]
    MalformedOutput(String),
}

/// An external language-model capability invoked via prompts.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

#[async_trait]
impl<T> GenerativeBackend for Arc<T>
where
    T: GenerativeBackend + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).generate(prompt).await
    }
}

/// Durable, append-only per-session message log.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one message; the write is committed before this returns.
    async fn append(&self, session_id: &str, role: Role, text: &str) -> anyhow::Result<()>;

    /// The most recent `limit` messages of a session, oldest first.
    async fn list(&self, session_id: &str, limit: u64) -> anyhow::Result<Vec<StoredMessage>>;

    /// Remove every message of a session. Clearing an unknown session is a
    /// no-op.
    async fn clear(&self, session_id: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl<T> HistoryStore for Arc<T>
where
    T: HistoryStore + ?Sized,
{
    async fn append(&self, session_id: &str, role: Role, text: &str) -> anyhow::Result<()> {
        (**self).append(session_id, role, text).await
    }

    async fn list(&self, session_id: &str, limit: u64) -> anyhow::Result<Vec<StoredMessage>> {
        (**self).list(session_id, limit).await
    }

    async fn clear(&self, session_id: &str) -> anyhow::Result<()> {
        (**self).clear(session_id).await
    }
}

/// Best-effort reference lookup used to enrich explain prompts.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Summary text for a query, or an empty string when nothing useful
    /// could be found. Never errors.
    async fn search(&self, query: &str) -> String;
}
