//! HTTP service command.

use studybud_api::{AppState, build_router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Input parameters for the Serve command strategy.
#[derive(Debug, Clone)]
pub struct ServeInput {
    /// Optional bind address override
    pub host: Option<String>,
    /// Optional port override
    pub port: Option<u16>,
}

/// Strategy for running the HTTP service.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = super::init_common_components().await?;

        let host = input
            .host
            .unwrap_or_else(|| common.config.server.host.clone());
        let port = input.port.unwrap_or(common.config.server.port);

        // Permissive CORS so external integrations can call the API.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let state = AppState::new(common.engine, common.registry, common.history);
        let app = build_router(state).layer(cors);

        let addr = format!("{host}:{port}");
        info!("Starting HTTP server on {addr}");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
