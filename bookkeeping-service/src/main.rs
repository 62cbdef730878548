use bookkeeping_service::config::BookkeepingConfig;
use bookkeeping_service::services::init_metrics;
use bookkeeping_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let config = BookkeepingConfig::load().map_err(|e| {
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("bookkeeping-service", &config.common.log_level);

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    application.run_until_stopped().await
}
