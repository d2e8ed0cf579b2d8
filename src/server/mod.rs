//! HTTP surface - the chat endpoint and its CORS envelope

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

use crate::chat::ChatOrchestrator;
use crate::config::ServerConfig;
use crate::error::Result;

pub use handlers::INTERNAL_ERROR_MESSAGE;
pub use routes::create_router;

/// Shared, read-only state handed to every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Bind `config.bind` and serve until Ctrl-C
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    serve(listener, config, state).await
}

/// Serve on an already bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_router(config, state)?;
    info!("Shopmate listening on http://{}{}", listener.local_addr()?, config.path);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
