use finance_assistant::{
    api::start_server,
    assistant::Assistant,
    clock::SystemClock,
    config::Config,
    inference::GeminiClient,
    ledger::SqliteLedger,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Missing credentials are fatal before any message is served.
    let config = Config::from_env()?;

    info!("🚀 Finance Assistant - API server");
    info!("📍 Port: {}", config.port);

    // Create components
    let clock = Arc::new(SystemClock);
    let inference = Arc::new(GeminiClient::new(config.gemini_api_key.clone())?);
    let ledger = Arc::new(SqliteLedger::connect(&config.database_url, clock.clone())?);

    let assistant = Arc::new(Assistant::new(inference, ledger, clock));

    info!("✅ Assistant initialized");
    info!("📡 Starting API server...");

    start_server(assistant, config.transport_token.clone(), config.port).await?;

    Ok(())
}
