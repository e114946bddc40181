//! The conversation orchestrator.
//!
//! [`ChatEngine::handle`] is the single entry point for a chat turn: it
//! resolves the session, records the inbound message, classifies intent,
//! dispatches to the matching content generator and records the reply.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::generate::{self, GeneratorDefaults};
use crate::intent::{self, Intent, Resolution};
use crate::registry::SessionRegistry;
use crate::{Encyclopedia, GenerativeBackend, HistoryStore, QuizQuestion, Role};

/// Payload of a chat turn: plain text, or structured quiz data.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatPayload {
    Text(String),
    Quiz(Vec<QuizQuestion>),
}

impl ChatPayload {
    /// Textual form recorded in the history log.
    pub fn to_log_text(&self) -> anyhow::Result<String> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Quiz(questions) => Ok(serde_json::to_string(questions)?),
        }
    }
}

/// Result of one orchestrated chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Response tag: `explain`, `quiz` or `summary`.
    pub kind: &'static str,
    pub payload: ChatPayload,
    pub session_id: String,
}

/// Session-scoped conversation orchestrator.
///
/// Generator failures are absorbed inside the generators themselves; the
/// engine only surfaces storage errors. Every turn performs exactly two
/// history appends (user, then bot) and at most one registry insert.
pub struct ChatEngine<B = Arc<dyn GenerativeBackend>, H = Arc<dyn HistoryStore>>
where
    B: Send + Sync,
    H: Send + Sync,
{
    backend: Option<B>,
    history: H,
    registry: Arc<SessionRegistry>,
    encyclopedia: Option<Arc<dyn Encyclopedia>>,
    defaults: GeneratorDefaults,
}

impl<B, H> ChatEngine<B, H>
where
    B: GenerativeBackend + Send + Sync,
    H: HistoryStore + Send + Sync,
{
    pub fn new(backend: Option<B>, history: H, registry: Arc<SessionRegistry>) -> Self {
        Self {
            backend,
            history,
            registry,
            encyclopedia: None,
            defaults: GeneratorDefaults::default(),
        }
    }

    /// Attach an encyclopedia capability used to enrich explain prompts
    /// when a backend is configured.
    #[must_use]
    pub fn with_encyclopedia(mut self, encyclopedia: Arc<dyn Encyclopedia>) -> Self {
        self.encyclopedia = Some(encyclopedia);
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: GeneratorDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Handle one chat turn.
    pub async fn handle(
        &self,
        message: &str,
        explicit_intent: Option<&str>,
        session_id: Option<&str>,
    ) -> anyhow::Result<ChatOutcome> {
        let text = message.trim();
        let session_id = self.resolve_session(session_id).await;
        info!("Handling chat turn for session: {session_id}");

        // Recorded before classification so history reflects the request
        // even when generation degrades.
        self.history.append(&session_id, Role::User, text).await?;

        let resolution = intent::resolve(explicit_intent, text);
        debug!("Resolved intent: {:?}", resolution.intent);

        let payload = self.dispatch(&resolution).await;

        let bot_text = payload.to_log_text()?;
        self.history.append(&session_id, Role::Bot, &bot_text).await?;

        Ok(ChatOutcome {
            kind: resolution.intent.response_kind(),
            payload,
            session_id,
        })
    }

    /// Resolve the session for a request. A missing or blank id mints a new
    /// one; an unknown-but-supplied id is adopted as a new session rather
    /// than rejected.
    async fn resolve_session(&self, supplied: Option<&str>) -> String {
        match supplied.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                self.registry.track(id).await;
                id.to_string()
            }
            None => self.registry.create().await.0,
        }
    }

    async fn dispatch(&self, resolution: &Resolution) -> ChatPayload {
        let backend = self.backend.as_ref();
        let text = resolution.payload.as_str();

        match resolution.intent {
            Intent::Explain => {
                let reference = self.reference_for(text).await;
                ChatPayload::Text(
                    generate::explain(
                        backend,
                        text,
                        &self.defaults.explain_level,
                        reference.as_deref(),
                    )
                    .await,
                )
            }
            Intent::Quiz => {
                ChatPayload::Quiz(generate::quiz(backend, text, self.defaults.quiz_count).await)
            }
            Intent::Summarize => ChatPayload::Text(
                generate::summarize(backend, text, self.defaults.summary_sentences).await,
            ),
        }
    }

    /// Best-effort reference text for the explain prompt. Skipped entirely
    /// in fallback mode so fallback output stays deterministic.
    async fn reference_for(&self, topic: &str) -> Option<String> {
        if self.backend.is_none() {
            return None;
        }
        let encyclopedia = self.encyclopedia.as_ref()?;
        let summary = encyclopedia.search(topic.trim()).await;
        (!summary.is_empty()).then_some(summary)
    }
}
