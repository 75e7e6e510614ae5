use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use afterschool_api::{app::app, cli::Cli, config::AppConfig, database::open_store, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    cli.apply(&mut config);
    tracing::info!(
        "Starting after-school API in {:?} mode with {:?} store",
        config.environment,
        config.database.store
    );

    let store = open_store(&config.database).await.context("failed to open document store")?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
