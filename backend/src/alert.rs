//! Alert throttling.
//!
//! Two gates, evaluated in order for every candidate alert: a global budget
//! that resets each period, then a per-instrument cooldown. Both thresholds
//! are independent and re-checked on every call — this is not a token
//! bucket, there is no smoothing. The whole check-then-increment runs under
//! one lock so concurrent triggers from many instruments can never
//! over-admit.
//!
//! Callers supply `now_ms`; the throttle never reads the clock itself.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    pub max_alerts_per_period: u32,
    pub cooldown_period_ms: u64,
    pub per_instrument_cooldown_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_alerts_per_period: 5,
            cooldown_period_ms: 1_800_000,
            per_instrument_cooldown_ms: 600_000,
        }
    }
}

struct BudgetState {
    count: u32,
    period_start_ms: u64,
    last_alert_ms: HashMap<String, u64>,
}

/// Sole owner of the alert budget; every worker's detection path goes
/// through `admit`.
pub struct AlertThrottle {
    cfg: ThrottleConfig,
    state: Mutex<BudgetState>,
}

impl AlertThrottle {
    pub fn new(cfg: ThrottleConfig, now_ms: u64) -> Self {
        Self {
            cfg,
            state: Mutex::new(BudgetState {
                count: 0,
                period_start_ms: now_ms,
                last_alert_ms: HashMap::new(),
            }),
        }
    }

    /// Decide whether an alert for `symbol` may go out now.
    ///
    /// Acceptance consumes budget immediately — delivery outcome is not
    /// this component's concern. The per-instrument map survives period
    /// resets, so a noisy instrument stays quiet across periods.
    pub fn admit(&self, symbol: &str, now_ms: u64) -> bool {
        let mut state = self.state.lock();

        if now_ms.saturating_sub(state.period_start_ms) > self.cfg.cooldown_period_ms {
            state.count = 0;
            state.period_start_ms = now_ms;
            debug!("alert period elapsed; budget reset");
        }

        if state.count >= self.cfg.max_alerts_per_period {
            return false;
        }

        if let Some(last) = state.last_alert_ms.get(symbol) {
            if now_ms.saturating_sub(*last) < self.cfg.per_instrument_cooldown_ms {
                return false;
            }
        }

        state.count += 1;
        state.last_alert_ms.insert(symbol.to_string(), now_ms);
        true
    }
}
