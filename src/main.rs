//! Fluxo de Caixa
//!
//! Runs one refresh of the cash-flow dashboard against PostgreSQL and prints
//! the committed result as JSON on stdout.

use fluxo_caixa::config::AppConfig;
use fluxo_caixa::database::create_pool;
use fluxo_caixa::error::{AppError, AppResult};
use fluxo_caixa::AppState;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal: {}", e);
        if e.is_connection_error() {
            eprintln!("fluxo-caixa: check DATABASE_URL and that PostgreSQL is reachable");
        }
        eprintln!("fluxo-caixa: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Logs go to stderr so stdout stays pure JSON
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fluxo_caixa={},sqlx=warn", config.log_level).into());
    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }

    info!("Fluxo de Caixa starting");
    info!("Environment: {}", config.environment);
    info!(
        "Horizons: {:?}, trailing window: {} days",
        config.cash_flow.horizons, config.cash_flow.trailing_window_days
    );

    info!("Connecting to database...");
    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;
    info!("Max connections: {}", config.database.max_connections);

    let state = AppState::new(pool, &config)?;

    let outcome = state.cash_flow.refresh().await;
    for failure in &outcome.diagnostics.source_failures {
        warn!("Source {} unavailable: {}", failure.source.as_str(), failure.message);
    }
    if !outcome.diagnostics.dropped.is_empty() {
        warn!("{} malformed records dropped", outcome.diagnostics.dropped.len());
    }

    let dashboard = state
        .cash_flow
        .dashboard()
        .await
        .ok_or_else(|| AppError::Message("refresh produced no dashboard".to_string()))?;

    info!(
        "Generation {}: {} movements, liquidity {}, {} active alerts",
        dashboard.generation,
        dashboard.movement_count,
        dashboard.snapshot.liquidity.as_str(),
        dashboard.active_alerts().len()
    );

    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    state.database.pool().close().await;
    Ok(())
}
