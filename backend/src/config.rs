use std::path::PathBuf;
use std::str::FromStr;

use market::detector::DetectionPolicy;
use market::types::DedupPolicy;

use crate::alert::ThrottleConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Feed configuration
    // =========================
    /// Futures REST endpoint (instrument directory + kline preload).
    pub rest_base: String,

    /// Combined-stream WebSocket endpoint.
    pub ws_base: String,

    /// Kline interval subscribed per instrument, e.g. `15m`.
    pub interval: String,

    /// Directory filters: only instruments matching both are monitored.
    pub contract_type: String,
    pub quote_asset: String,

    /// Maximum instruments multiplexed over one connection.
    ///
    /// One transport connection carries a bounded number of subscriptions,
    /// so the listing is cut into groups of this size, one worker each.
    pub batch_size: usize,

    // =========================
    // Connection supervision
    // =========================
    /// Reconnect budget per connection group. Once spent, that group stops
    /// permanently; the rest of the system keeps running.
    pub max_retries: u32,

    /// Fixed pause between reconnect attempts, in seconds.
    pub retry_interval_secs: u64,

    /// Whether a successful connection restores the group's budget.
    /// Off by default: the budget spans the group's whole life.
    pub reset_retries_on_success: bool,

    // =========================
    // Rolling history
    // =========================
    /// Bar window capacity per instrument. Detection produces no verdict
    /// until a window is full, so this is also the warm-up length.
    pub bar_window: usize,

    /// Volume window capacity per instrument, bounded independently.
    pub volume_window: usize,

    /// Treatment of duplicate/out-of-order completed bars.
    pub dedup_policy: DedupPolicy,

    /// Where per-instrument history files live; `None` disables
    /// persistence entirely.
    pub history_dir: Option<PathBuf>,

    /// Backfill empty windows over REST at startup so detection does not
    /// wait for a full live window.
    pub preload_history: bool,

    // =========================
    // Detection
    // =========================
    /// Threshold policy for return spikes (two-sided).
    pub return_policy: DetectionPolicy,

    /// Threshold policy for volume spikes (one-sided).
    pub volume_policy: DetectionPolicy,

    // =========================
    // Alerting
    // =========================
    /// Global alert budget per period.
    pub max_alerts_per_period: u32,

    /// Length of the global budget period, in seconds.
    pub cooldown_period_secs: u64,

    /// Minimum spacing between alerts for one instrument, in seconds.
    pub per_instrument_cooldown_secs: u64,

    /// Bark-style push endpoint.
    pub bark_api_url: String,

    // =========================
    // Pipeline
    // =========================
    /// Capacity of each group's supervisor → processor channel. Acts as
    /// backpressure if a processor falls behind its stream.
    pub event_queue_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            rest_base: env_or("REST_BASE", "https://fapi.binance.com".to_string()),
            ws_base: env_or("WS_BASE", "wss://fstream.binance.com".to_string()),
            interval: env_or("KLINE_INTERVAL", "15m".to_string()),
            contract_type: env_or("CONTRACT_TYPE", "PERPETUAL".to_string()),
            quote_asset: env_or("QUOTE_ASSET", "USDT".to_string()),
            batch_size: env_or("STREAM_BATCH_SIZE", 200),

            max_retries: env_or("MAX_RETRIES", 10),
            retry_interval_secs: env_or("RETRY_INTERVAL_SECS", 10),
            reset_retries_on_success: env_or("RESET_RETRIES_ON_SUCCESS", false),

            bar_window: env_or("BAR_WINDOW", 1000),
            volume_window: env_or("VOLUME_WINDOW", 1000),
            dedup_policy: dedup_from_env(),
            history_dir: std::env::var("HISTORY_DIR").ok().map(PathBuf::from),
            preload_history: env_or("PRELOAD_HISTORY", false),

            // Defaults: returns use a wide 8σ band, volume a tight 2σ band.
            return_policy: policy_from_env("RETURN", 8.0),
            volume_policy: policy_from_env("VOLUME", 2.0),

            max_alerts_per_period: env_or("MAX_ALERTS_PER_PERIOD", 5),
            cooldown_period_secs: env_or("COOLDOWN_PERIOD_SECS", 1800),
            per_instrument_cooldown_secs: env_or("PER_INSTRUMENT_COOLDOWN_SECS", 600),
            bark_api_url: env_or("BARK_API_URL", "https://api.day.app/changeme".to_string()),

            event_queue_capacity: env_or("EVENT_QUEUE_CAPACITY", 256),
        }
    }

    pub fn throttle(&self) -> ThrottleConfig {
        ThrottleConfig {
            max_alerts_per_period: self.max_alerts_per_period,
            cooldown_period_ms: self.cooldown_period_secs * 1000,
            per_instrument_cooldown_ms: self.per_instrument_cooldown_secs * 1000,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn dedup_from_env() -> DedupPolicy {
    match std::env::var("DEDUP_POLICY").as_deref() {
        Ok("by_close_time") => DedupPolicy::ByCloseTime,
        _ => DedupPolicy::AppendAll,
    }
}

/// `{PREFIX}_POLICY=quantile` selects the quantile policy with
/// `{PREFIX}_QUANTILE` (default 0.95); anything else is the sigma policy
/// with `{PREFIX}_SIGMA_N` (default per signal).
fn policy_from_env(prefix: &str, default_n: f64) -> DetectionPolicy {
    match std::env::var(format!("{prefix}_POLICY")).as_deref() {
        Ok("quantile") => DetectionPolicy::Quantile {
            q: env_or(&format!("{prefix}_QUANTILE"), 0.95),
        },
        _ => DetectionPolicy::Sigma {
            n: env_or(&format!("{prefix}_SIGMA_N"), default_n),
        },
    }
}
