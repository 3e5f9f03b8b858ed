use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use adapters::binance::api::DirectoryClient;
use adapters::binance::partition::partition;
use adapters::binance::ws::{KlineStreamClient, RetryPolicy};
use adapters::notify::BarkNotifier;
use backend::config::AppConfig;
use backend::history_repo::JsonFileRepository;
use backend::monitor::MonitorManager;
use common::logger::init_logger;
use market::repository::BarRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("market-monitor");
    info!("starting market anomaly monitor...");

    let cfg = AppConfig::from_env();

    let directory =
        DirectoryClient::new(cfg.rest_base.clone()).context("build directory client")?;
    let symbols = directory
        .fetch_symbols(&cfg.contract_type, &cfg.quote_asset)
        .await
        .context("fetch instrument listing")?;
    info!(
        count = symbols.len(),
        contract_type = %cfg.contract_type,
        quote_asset = %cfg.quote_asset,
        "instruments discovered"
    );

    let groups = partition(&symbols, cfg.batch_size);
    info!(
        groups = groups.len(),
        batch_size = cfg.batch_size,
        "stream groups partitioned"
    );

    let stream_api = Arc::new(KlineStreamClient::new(
        cfg.ws_base.clone(),
        cfg.interval.clone(),
        RetryPolicy {
            max_retries: cfg.max_retries,
            retry_interval: Duration::from_secs(cfg.retry_interval_secs),
            reset_on_success: cfg.reset_retries_on_success,
        },
    ));

    let notifier = Arc::new(BarkNotifier::new(cfg.bark_api_url.clone()).context("build notifier")?);

    let repository: Option<Arc<dyn BarRepository>> = match &cfg.history_dir {
        Some(dir) => {
            Some(Arc::new(JsonFileRepository::new(dir.clone()).context("open history dir")?))
        }
        None => None,
    };

    let manager = MonitorManager::new(&cfg, stream_api, notifier, repository.clone());

    // Warm-up: persisted history first, then REST backfill for instruments
    // that still have nothing. Both are best-effort per symbol.
    if let Some(repo) = &repository {
        for symbol in &symbols {
            match repo.load(symbol).await {
                Ok(bars) if !bars.is_empty() => manager.preload(symbol, bars),
                Ok(_) => {}
                Err(e) => warn!(symbol = %symbol, error = %e, "history load failed"),
            }
        }
        info!("persisted history loaded");
    }

    if cfg.preload_history {
        for symbol in &symbols {
            if manager.history_len(symbol) > 0 {
                continue;
            }
            match directory
                .fetch_klines(symbol, &cfg.interval, cfg.bar_window as u32)
                .await
            {
                Ok(bars) if !bars.is_empty() => manager.preload(symbol, bars),
                Ok(_) => {}
                Err(e) => warn!(symbol = %symbol, error = %e, "kline preload failed"),
            }
        }
        info!("history preload complete");
    }

    Arc::clone(&manager).start(groups);

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    Ok(())
}
