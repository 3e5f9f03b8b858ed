//! Stream partitioning.
//!
//! One transport connection multiplexes a bounded number of subscriptions,
//! so the instrument listing is cut into fixed-size batches, each batch
//! owning one combined-stream URL. Groups are immutable for the process
//! lifetime; there is no dynamic rebalancing.

/// A batch of instruments assigned to one subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionGroup {
    pub index: usize,
    pub symbols: Vec<String>,
}

impl ConnectionGroup {
    /// Combined-stream subscription URL for this group, e.g.
    /// `wss://.../stream?streams=btcusdt@kline_15m/ethusdt@kline_15m`.
    pub fn stream_url(&self, ws_base: &str, interval: &str) -> String {
        let streams = self
            .symbols
            .iter()
            .map(|s| format!("{s}@kline_{interval}"))
            .collect::<Vec<_>>()
            .join("/");

        format!("{}/stream?streams={}", ws_base.trim_end_matches('/'), streams)
    }
}

/// Cut the listing into groups of at most `batch_size`, in listing order.
pub fn partition(symbols: &[String], batch_size: usize) -> Vec<ConnectionGroup> {
    symbols
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(index, chunk)| ConnectionGroup {
            index,
            symbols: chunk.to_vec(),
        })
        .collect()
}
