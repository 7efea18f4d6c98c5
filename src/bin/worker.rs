//! Trendgate Worker
//!
//! Polls candle snapshots on a fixed cadence, runs the signal engine for each
//! configured instrument and routes actions to the paper executor.

use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::info;
use trendgate::config::{get_environment, WorkerConfig};
use trendgate::core::cycle::DecisionCycle;
use trendgate::core::scheduler::PollScheduler;
use trendgate::logging;
use trendgate::services::execution::{OrderExecutor, PaperExecutor};
use trendgate::services::hyperliquid::HyperliquidRestClient;
use trendgate::services::market_data::MarketDataProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let env = get_environment();
    info!("Starting Trendgate Worker");
    info!(environment = %env, "Environment");

    let config = WorkerConfig::from_env()?;
    info!(
        interval = config.poll_interval_seconds,
        symbols = ?config.symbols,
        trend_window = config.engine.trend_window,
        allow_short = config.engine.allow_short,
        "Decision cycle: every {} seconds for {}",
        config.poll_interval_seconds,
        config.symbols.join(", ")
    );

    let starting_cash: f64 = env::var("PAPER_STARTING_CASH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10_000.0);

    let provider: Arc<dyn MarketDataProvider> = Arc::new(HyperliquidRestClient::new(
        config.hyperliquid_url.clone(),
        config.candle_interval.clone(),
    ));
    let executor: Arc<dyn OrderExecutor> = Arc::new(PaperExecutor::new(starting_cash));

    let cycle = Arc::new(Mutex::new(DecisionCycle::new(&config, provider, executor)));
    let scheduler = PollScheduler::new(cycle, config.poll_interval_seconds)?;
    scheduler.start().await;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;

    info!("Shutting down worker...");
    scheduler.stop().await;
    info!("Worker stopped");

    Ok(())
}
