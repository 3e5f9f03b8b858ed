//! Combined-stream frame decoding.
//!
//! Decoding is tolerant by contract: a frame that is not a terminal
//! closed-bar event (subscription acks, intra-bar partial updates, non-kline
//! streams) yields `Ok(None)` and no downstream work; only a frame that
//! claims to be a kline but cannot be decoded is an error, and the caller
//! skips it without tearing the connection down.

use serde_json::Value;

use market::types::{Bar, BarEvent};

use crate::binance::errors::FeedError;
use crate::binance::types::KlineFrame;

/// Decode one raw text frame into zero-or-one closed-bar events.
pub fn parse_stream_frame(raw: &str) -> Result<Option<BarEvent>, FeedError> {
    let json: Value = serde_json::from_str(raw)?;

    // Combined-stream payloads nest under "data"; anything else (ack,
    // error envelope) is non-actionable.
    let Some(data) = json.get("data") else {
        return Ok(None);
    };
    let Some(kline) = data.get("k") else {
        return Ok(None);
    };

    let symbol = data
        .get("s")
        .and_then(Value::as_str)
        .ok_or(FeedError::InvalidFrame)?
        .to_lowercase();

    let frame: KlineFrame = serde_json::from_value(kline.clone())?;
    if !frame.is_closed {
        return Ok(None);
    }

    let bar = Bar {
        open: frame.open.parse()?,
        close: frame.close.parse()?,
        volume: frame.volume.parse()?,
        close_time_ms: frame.close_time_ms,
    };

    Ok(Some(BarEvent { symbol, bar }))
}
