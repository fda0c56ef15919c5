use std::error::Error;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use zhipu_llm_service::config::default_config::config_from_env;
use zhipu_llm_service::{GlmService, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from a .env file when present; deployments
    // without one set the variables directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", tracing::Level::INFO))
        .with(telemetry::layer())
        .init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let prompt = if prompt.is_empty() {
        "Who are you?".to_string()
    } else {
        prompt
    };

    let service = GlmService::new(config_from_env()?)?;
    let text = service.invoke(&prompt, None, &serde_json::Map::new()).await?;

    println!("{text}");
    Ok(())
}
