//! One-shot chat command.
//!
//! Sends a single message through the orchestration engine without going
//! over HTTP. Useful for smoke-testing a configuration.

use studybud_core::ChatPayload;
use tracing::info;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Message to send
    pub message: String,
    /// Optional session to attach the message to
    pub session_id: Option<String>,
    /// Optional explicit intent
    pub intent: Option<String>,
}

/// Strategy for executing a single chat turn.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = super::init_common_components().await?;

        let outcome = common
            .engine
            .handle(
                &input.message,
                input.intent.as_deref(),
                input.session_id.as_deref(),
            )
            .await?;

        info!("Session: {} ({})", outcome.session_id, outcome.kind);

        match outcome.payload {
            ChatPayload::Text(text) => println!("{text}"),
            ChatPayload::Quiz(questions) => {
                println!("{}", serde_json::to_string_pretty(&questions)?);
            }
        }

        Ok(())
    }
}
