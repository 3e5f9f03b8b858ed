use serde::Deserialize;

/// Subset of `/fapi/v1/exchangeInfo` the directory cares about.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub contract_type: String,
    pub quote_asset: String,
}

/// The `k` payload inside a combined-stream kline frame.
///
/// Binance serializes prices and volumes as strings; they are parsed at the
/// edge, once, when a frame becomes a `Bar`.
#[derive(Debug, Deserialize)]
pub struct KlineFrame {
    /// Bar close time in epoch milliseconds.
    #[serde(rename = "T")]
    pub close_time_ms: u64,

    #[serde(rename = "o")]
    pub open: String,

    #[serde(rename = "c")]
    pub close: String,

    #[serde(rename = "v")]
    pub volume: String,

    /// Set once the bar is final; only such frames become events.
    #[serde(rename = "x")]
    pub is_closed: bool,
}
