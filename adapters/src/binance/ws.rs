//! Connection supervisor: one persistent combined-stream WebSocket per
//! connection group.
//!
//! The supervisor is the sole writer feeding decoded closed-bar events into
//! the pipeline for its group. Failure handling is per-group: a dead stream
//! is re-established after a fixed pause until the group's reconnect budget
//! runs out, at which point the group stops permanently — other groups keep
//! running.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, instrument, warn};

use market::types::BarEvent;

use crate::binance::errors::FeedError;
use crate::binance::parser::parse_stream_frame;
use crate::binance::partition::ConnectionGroup;
use crate::binance::BarStreamApi;

/// Per-group reconnect policy.
///
/// The retry counter lives for the whole life of the group. The baseline
/// behavior never resets it: a mostly-stable group still spends its budget
/// one sparse disconnect at a time. `reset_on_success` opts into starting
/// over after every established connection.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_interval: Duration,
    pub reset_on_success: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_interval: Duration::from_secs(10),
            reset_on_success: false,
        }
    }
}

/// Combined-stream kline client.
pub struct KlineStreamClient {
    ws_base: String,
    interval: String,
    retry: RetryPolicy,
}

impl KlineStreamClient {
    pub fn new(ws_base: String, interval: String, retry: RetryPolicy) -> Self {
        Self {
            ws_base,
            interval,
            retry,
        }
    }
}

#[async_trait]
impl BarStreamApi for KlineStreamClient {
    #[instrument(
        skip(self, sender),
        fields(group = group.index, symbols = group.symbols.len())
    )]
    async fn stream_bars(
        &self,
        group: ConnectionGroup,
        sender: Sender<BarEvent>,
    ) -> Result<(), FeedError> {
        let url = group.stream_url(&self.ws_base, &self.interval);
        let mut attempts: u32 = 0;

        loop {
            match connect_async(&url).await {
                Ok((ws, _)) => {
                    info!("kline stream connected");
                    if self.retry.reset_on_success {
                        attempts = 0;
                    }

                    let (_write, mut read) = ws.split();

                    while let Some(msg) = read.next().await {
                        let msg = match msg {
                            Ok(m) => m,
                            Err(e) => {
                                warn!(error = %e, "websocket stream error");
                                break;
                            }
                        };

                        if msg.is_ping() || msg.is_pong() {
                            continue;
                        }

                        if msg.is_close() {
                            info!("close frame received from venue");
                            break;
                        }

                        if !msg.is_text() {
                            debug!("ignoring non-text websocket message");
                            continue;
                        }

                        let raw = match msg.to_text() {
                            Ok(t) => t,
                            Err(e) => {
                                warn!(error = %e, "failed to read text frame");
                                continue;
                            }
                        };

                        match parse_stream_frame(raw) {
                            Ok(Some(event)) => {
                                if sender.send(event).await.is_err() {
                                    info!("event receiver dropped; stopping group");
                                    return Ok(());
                                }
                            }
                            Ok(None) => {}
                            // One bad message never costs the connection.
                            Err(e) => warn!(error = %e, "skipping undecodable frame"),
                        }
                    }
                }
                Err(e) => warn!(error = %e, "websocket connection failed"),
            }

            attempts += 1;
            if attempts >= self.retry.max_retries {
                error!(attempts, "reconnect budget exhausted; stopping group");
                return Err(FeedError::RetriesExhausted {
                    group: group.index,
                    attempts,
                });
            }

            warn!(
                attempt = attempts,
                max = self.retry.max_retries,
                "stream down; reconnecting after fixed pause"
            );
            tokio::time::sleep(self.retry.retry_interval).await;
        }
    }
}
