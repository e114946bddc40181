//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`. Adding a command means implementing
//! [`CommandStrategy`] — no boxing, no runtime registry.

use std::sync::Arc;

use studybud_config::Config;
use studybud_core::{ChatEngine, GenerativeBackend, HistoryStore, SessionRegistry};
use studybud_history::ConversationStore;
use studybud_tools::WikipediaClient;
use tracing::info;

mod chat;
mod init;
mod serve;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components shared by the serve and chat commands.
pub struct CommonComponents {
    pub config: Config,
    pub engine: Arc<ChatEngine>,
    pub registry: Arc<SessionRegistry>,
    pub history: Arc<dyn HistoryStore>,
}

/// Load configuration and wire up the engine with its store, registry,
/// backend handle and encyclopedia capability.
pub async fn init_common_components() -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;

    let db_path = config.database_path()?;
    info!("Database path: {}", db_path.display());
    let history: Arc<dyn HistoryStore> = Arc::new(ConversationStore::new(db_path).await?);

    let registry = Arc::new(SessionRegistry::new());

    let backend: Option<Arc<dyn GenerativeBackend>> = studybud_providers::shared(
        &config.providers.gemini.api_key,
        &config.providers.gemini.model,
    );

    let mut engine = ChatEngine::new(backend, Arc::clone(&history), Arc::clone(&registry))
        .with_defaults(config.generators.clone());

    match WikipediaClient::new() {
        Ok(client) => engine = engine.with_encyclopedia(Arc::new(client)),
        Err(e) => info!("Encyclopedia lookup disabled: {e}"),
    }

    Ok(CommonComponents {
        config,
        engine: Arc::new(engine),
        registry,
        history,
    })
}
