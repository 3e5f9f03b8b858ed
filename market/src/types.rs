use serde::{Deserialize, Serialize};

/// One completed kline interval for one instrument.
///
/// Immutable once decoded from the feed. `close_time_ms` is the venue's
/// close-time marker; on a well-behaved stream it is monotonic per
/// instrument, and it is only consulted for ordering decisions
/// (`DedupPolicy::ByCloseTime`), never for windowing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time_ms: u64,
}

impl Bar {
    /// Fractional price change over the bar.
    ///
    /// `None` when `open == 0` — such bars carry no usable return and must
    /// not contribute to baselines either.
    pub fn bar_return(&self) -> Option<f64> {
        if self.open == 0.0 {
            return None;
        }
        Some((self.close - self.open) / self.open)
    }
}

/// A completed bar tagged with its instrument, as forwarded by a
/// connection supervisor into the processing pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct BarEvent {
    /// Exchange-normalized symbol, lowercased at the edge.
    pub symbol: String,
    pub bar: Bar,
}

/// How to treat duplicate or out-of-order completed bars at append time.
///
/// The upstream feed gives no exactly-once guarantee, so both can occur.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Append completed bars exactly as they arrive (feed order is window
    /// order). This is the baseline behavior.
    #[default]
    AppendAll,
    /// Drop any bar whose close time is not strictly newer than the newest
    /// retained bar for that instrument.
    ByCloseTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_return_is_fractional_change() {
        let bar = Bar {
            open: 100.0,
            close: 105.0,
            volume: 1.0,
            close_time_ms: 0,
        };
        assert!((bar.bar_return().unwrap() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn bar_return_undefined_for_zero_open() {
        let bar = Bar {
            open: 0.0,
            close: 105.0,
            volume: 1.0,
            close_time_ms: 0,
        };
        assert_eq!(bar.bar_return(), None);
    }
}
