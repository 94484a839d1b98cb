use anyhow::Context;
use channel_api::config::AppConfig;
use channel_api::logging::init_logging;
use channel_api::{create_app, AppState};
use channel_orchestrator::CancelToken;
use channel_providers::evolution::EvolutionProvider;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Missing EVOLUTION_URL / EVOLUTION_API_KEY stops us here, not on the first request.
    let config = AppConfig::from_env()?;
    init_logging(config.server.log_format);

    if config.server.cors_origins.is_none() {
        warn!("CORS allows any origin; set CORS_ALLOWED_ORIGINS to restrict it");
    }

    let provider = EvolutionProvider::new(config.evolution.clone())?;
    info!(
        upstream = %config.evolution.base_url,
        integration = %config.evolution.integration,
        "Evolution API client ready"
    );

    let state = AppState::new(
        Arc::new(provider),
        config.server.settle_interval,
        config.evolution.integration.clone(),
    );
    let app = create_app(state.clone(), config.server.cors_origins.as_deref());

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Backend listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await
        .context("HTTP server failed")?;
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM, then cancel in-flight provisioning runs so
/// graceful shutdown does not wait on a settling delay or a slow upstream.
async fn shutdown_signal(shutdown: CancelToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown requested, cancelling in-flight provisioning");
    shutdown.cancel();
}
