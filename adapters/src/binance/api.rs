use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use market::types::Bar;

use crate::binance::errors::FeedError;
use crate::binance::types::ExchangeInfo;

/// REST client for instrument discovery and history warm-up.
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(base_url: String) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Current instrument listing, filtered by contract type and quote
    /// asset, lowercased. One call, no pagination; assumed complete.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_symbols(
        &self,
        contract_type: &str,
        quote_asset: &str,
    ) -> Result<Vec<String>, FeedError> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.base_url.trim_end_matches('/'));

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let info: ExchangeInfo = resp.json().await?;

        let symbols: Vec<String> = info
            .symbols
            .into_iter()
            .filter(|s| s.contract_type == contract_type && s.quote_asset == quote_asset)
            .map(|s| s.symbol.to_lowercase())
            .collect();

        debug!(count = symbols.len(), "instrument listing fetched");
        Ok(symbols)
    }

    /// Most recent `limit` completed bars for one instrument, oldest first.
    /// Used to warm rolling history so detection does not wait for a full
    /// live window.
    #[instrument(skip(self), fields(symbol = %symbol), level = "debug")]
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Bar>, FeedError> {
        let url = format!(
            "{}/fapi/v1/klines?symbol={}&interval={}&limit={}",
            self.base_url.trim_end_matches('/'),
            symbol.to_uppercase(),
            interval,
            limit
        );

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let rows: Vec<Value> = resp.json().await?;

        // Kline row layout: [open_time, open, high, low, close, volume,
        // close_time, ...]; numerics are strings.
        let bars: Vec<Bar> = rows.iter().filter_map(bar_from_row).collect();

        debug!(count = bars.len(), "history preloaded");
        Ok(bars)
    }
}

fn bar_from_row(row: &Value) -> Option<Bar> {
    let field = |i: usize| row.get(i)?.as_str()?.parse::<f64>().ok();

    Some(Bar {
        open: field(1)?,
        close: field(4)?,
        volume: field(5)?,
        close_time_ms: row.get(6)?.as_u64()?,
    })
}
