use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use telegram_webhook_relay::config::Settings;
use telegram_webhook_relay::delivery::TelegramGateway;
use telegram_webhook_relay::server::{create_app, AppState};
use telegram_webhook_relay::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    // Check the bot token before accepting webhooks
    let gateway = TelegramGateway::new(&settings.telegram)?;
    let account = gateway.verify().await?;
    tracing::info!(account = %account, "Authorized on Telegram account");

    // Create application state
    let state = AppState::new(settings.clone(), Arc::new(gateway));
    let registry = state.dispatcher.registry();
    tracing::info!(
        hosts = ?registry.enabled_hosts(),
        configured_hosts = registry.host_count(),
        destinations = registry.destinations().len(),
        "Relay initialized"
    );

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Webhook endpoint: http://{}/webhook/{{host}}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
