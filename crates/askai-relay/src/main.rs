use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askai_relay::{router, serve, GeminiClient, RelayConfig, RelayState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RelayConfig::parse();

    let default_filter = if config.verbose {
        "askai_relay=debug,tower_http=debug,info"
    } else {
        "askai_relay=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(upstream = %config.upstream_url, "Starting askai relay");

    let gemini = GeminiClient::new(&config.upstream_url, &config.api_key);
    let app = router(RelayState::new(Arc::new(gemini)));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to address {}", config.bind))?;

    serve(listener, app).await
}
