//! Main Entrypoint for the EduGPT API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading the prompt templates.
//! 3. Initializing shared services (the LLM client and the translator).
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use edugpt_api::{config::Config, router::create_router, state::AppState};
use edugpt_core::{
    llm_client::OpenAICompatibleClient, prompts::Prompts, translation::GoogleTranslator,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Load Prompts ---
    let prompts = match &config.prompts_path {
        Some(path) => Prompts::load_dir(path)
            .with_context(|| format!("Failed to load prompts from {}", path.display()))?,
        None => Prompts::default(),
    };

    // --- 4. Initialize Shared Services ---
    let llm_client = OpenAICompatibleClient::from_config(&config.llm_config())
        .context("Failed to create the LLM client")?;
    let translator = GoogleTranslator::new(config.translate_api_base.clone());

    let app_state = Arc::new(AppState::new(
        &config,
        Arc::new(llm_client),
        Arc::new(translator),
        Arc::new(prompts),
    ));

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        model = %config.chat_model,
        api_base = %config.api_base,
        progress_path = %config.progress_path.display(),
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
