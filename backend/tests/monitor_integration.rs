//! End-to-end pipeline tests driven through a scripted stream API and a
//! recording notifier — no venue, no network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;

use adapters::binance::errors::FeedError;
use adapters::binance::partition::ConnectionGroup;
use adapters::binance::BarStreamApi;
use adapters::notify::{Notifier, NotifyError};
use backend::config::AppConfig;
use backend::monitor::MonitorManager;
use market::detector::DetectionPolicy;
use market::types::{Bar, BarEvent};

/// Replays a fixed series of events, then ends the stream cleanly.
struct ScriptedStream {
    events: Vec<BarEvent>,
}

#[async_trait]
impl BarStreamApi for ScriptedStream {
    async fn stream_bars(
        &self,
        _group: ConnectionGroup,
        sender: Sender<BarEvent>,
    ) -> Result<(), FeedError> {
        for event in &self.events {
            if sender.send(event.clone()).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().push((title.to_string(), body.to_string()));
        if self.fail {
            return Err(NotifyError::Rejected("503 Service Unavailable".into()));
        }
        Ok(())
    }
}

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::from_env();
    cfg.bar_window = 6;
    cfg.volume_window = 6;
    cfg.return_policy = DetectionPolicy::Sigma { n: 2.0 };
    cfg.volume_policy = DetectionPolicy::Sigma { n: 2.0 };
    cfg.max_alerts_per_period = 5;
    cfg.cooldown_period_secs = 1800;
    cfg.per_instrument_cooldown_secs = 600;
    cfg
}

fn calm_bar(seq: u64) -> Bar {
    // Small alternating moves so the baseline has a real (tiny) std.
    let drift = if seq % 2 == 0 { 0.001 } else { -0.001 };
    Bar {
        open: 100.0,
        close: 100.0 * (1.0 + drift),
        volume: 1_000.0 + (seq % 3) as f64,
        close_time_ms: seq * 60_000,
    }
}

fn spike_bar(seq: u64) -> Bar {
    Bar {
        open: 100.0,
        close: 150.0,
        volume: 100_000.0,
        close_time_ms: seq * 60_000,
    }
}

fn events(symbol: &str, bars: Vec<Bar>) -> Vec<BarEvent> {
    bars.into_iter()
        .map(|bar| BarEvent {
            symbol: symbol.to_string(),
            bar,
        })
        .collect()
}

fn one_group() -> Vec<ConnectionGroup> {
    vec![ConnectionGroup {
        index: 0,
        symbols: vec!["btcusdt".into()],
    }]
}

#[tokio::test]
async fn spike_after_warmup_produces_exactly_one_alert() {
    let mut bars: Vec<Bar> = (0..5).map(calm_bar).collect();
    bars.push(spike_bar(5));

    let stream = Arc::new(ScriptedStream {
        events: events("btcusdt", bars),
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let manager = MonitorManager::new(&test_config(), stream, notifier.clone(), None);
    manager.start(one_group());

    sleep(Duration::from_millis(200)).await;

    let sent = notifier.sent.lock();
    // The spike trips both detectors, but the per-instrument cooldown lets
    // only the first verdict (the return spike) through.
    assert_eq!(sent.len(), 1, "alerts: {sent:?}");
    assert_eq!(sent[0].0, "BTCUSDT move");
    assert!(sent[0].1.contains("15m"));
}

#[tokio::test]
async fn no_alerts_while_history_is_warming_up() {
    // The spike arrives before the window is full: no verdict, no alert.
    let bars = vec![calm_bar(0), calm_bar(1), spike_bar(2)];

    let stream = Arc::new(ScriptedStream {
        events: events("btcusdt", bars),
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let manager = MonitorManager::new(&test_config(), stream, notifier.clone(), None);
    manager.start(one_group());

    sleep(Duration::from_millis(200)).await;

    assert!(notifier.sent.lock().is_empty());
}

#[tokio::test]
async fn repeated_spikes_on_one_instrument_are_throttled() {
    let mut bars: Vec<Bar> = (0..5).map(calm_bar).collect();
    bars.push(spike_bar(5));
    bars.push(spike_bar(6));
    bars.push(spike_bar(7));

    let stream = Arc::new(ScriptedStream {
        events: events("btcusdt", bars),
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let manager = MonitorManager::new(&test_config(), stream, notifier.clone(), None);
    manager.start(one_group());

    sleep(Duration::from_millis(200)).await;

    assert_eq!(notifier.sent.lock().len(), 1);
}

#[tokio::test]
async fn failed_delivery_still_consumes_the_global_budget() {
    let mut cfg = test_config();
    cfg.max_alerts_per_period = 1;

    let mut bars = events("aaausdt", (0..5).map(calm_bar).collect());
    bars.push(BarEvent {
        symbol: "aaausdt".into(),
        bar: spike_bar(5),
    });
    let mut other = events("bbbusdt", (0..5).map(calm_bar).collect());
    other.push(BarEvent {
        symbol: "bbbusdt".into(),
        bar: spike_bar(5),
    });
    bars.extend(other);

    let stream = Arc::new(ScriptedStream { events: bars });
    let notifier = Arc::new(RecordingNotifier {
        sent: Mutex::new(Vec::new()),
        fail: true,
    });

    let manager = MonitorManager::new(&cfg, stream, notifier.clone(), None);
    manager.start(one_group());

    sleep(Duration::from_millis(200)).await;

    // One delivery was attempted and failed; the budget is spent, so the
    // second instrument's spike never reaches the notifier.
    assert_eq!(notifier.sent.lock().len(), 1);
}

/// Fails permanently for group 0, streams normally for every other group.
struct HalfDeadStream {
    events: Vec<BarEvent>,
}

#[async_trait]
impl BarStreamApi for HalfDeadStream {
    async fn stream_bars(
        &self,
        group: ConnectionGroup,
        sender: Sender<BarEvent>,
    ) -> Result<(), FeedError> {
        if group.index == 0 {
            return Err(FeedError::RetriesExhausted { group: 0, attempts: 10 });
        }
        for event in &self.events {
            if sender.send(event.clone()).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[tokio::test]
async fn a_dead_group_does_not_stop_the_others() {
    let mut bars: Vec<Bar> = (0..5).map(calm_bar).collect();
    bars.push(spike_bar(5));

    let stream = Arc::new(HalfDeadStream {
        events: events("ethusdt", bars),
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let manager = MonitorManager::new(&test_config(), stream, notifier.clone(), None);
    manager.start(vec![
        ConnectionGroup {
            index: 0,
            symbols: vec!["btcusdt".into()],
        },
        ConnectionGroup {
            index: 1,
            symbols: vec!["ethusdt".into()],
        },
    ]);

    sleep(Duration::from_millis(200)).await;

    // Group 0 died on arrival; group 1's spike still alerts.
    assert_eq!(notifier.sent.lock().len(), 1);
}

#[tokio::test]
async fn preloaded_history_arms_detection_immediately() {
    let stream = Arc::new(ScriptedStream {
        events: events("btcusdt", vec![spike_bar(10)]),
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let manager = MonitorManager::new(&test_config(), stream, notifier.clone(), None);
    manager.preload("btcusdt", (0..5).map(calm_bar).collect());
    assert_eq!(manager.history_len("btcusdt"), 5);

    manager.start(one_group());

    sleep(Duration::from_millis(200)).await;

    assert_eq!(notifier.sent.lock().len(), 1);
}
