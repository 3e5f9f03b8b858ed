//! MonitorManager
//!
//! This module wires the ingestion edge to the detection core.
//! Responsibilities:
//!   • Spawn one stream worker plus one processing task per connection group
//!   • Append decoded closed bars into the shared rolling stores
//!   • Run the spike detectors over point-in-time snapshots
//!   • Gate anomalies through the alert throttle and hand admitted alerts
//!     to the notifier, fire-and-forget
//!
//! MonitorManager is an Arc-managed async service: long-lived tasks capture
//! `Arc<Self>` so group workers never fight over lifetimes. Failure
//! isolation is per group — a group that exhausts its reconnect budget only
//! logs; every other group keeps streaming.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use adapters::binance::BarStreamApi;
use adapters::binance::partition::ConnectionGroup;
use adapters::notify::Notifier;
use common::time::now_ms;
use market::detector::returns::ReturnSpikeDetector;
use market::detector::volume::VolumeSpikeDetector;
use market::detector::{Detector, Verdict, VerdictKind};
use market::history::{BarStore, SeriesStore, VolumeStore};
use market::repository::BarRepository;
use market::types::{Bar, BarEvent};

use crate::alert::AlertThrottle;
use crate::config::AppConfig;

pub struct MonitorManager<S> {
    stream_api: Arc<S>,

    /// Shared rolling history; workers append, detectors read snapshots.
    bars: Arc<BarStore>,
    volumes: Arc<VolumeStore>,

    return_detector: ReturnSpikeDetector,
    volume_detector: VolumeSpikeDetector,

    throttle: AlertThrottle,
    notifier: Arc<dyn Notifier>,
    repository: Option<Arc<dyn BarRepository>>,

    interval: String,
    queue_capacity: usize,
}

impl<S: BarStreamApi + 'static> MonitorManager<S> {
    pub fn new(
        cfg: &AppConfig,
        stream_api: Arc<S>,
        notifier: Arc<dyn Notifier>,
        repository: Option<Arc<dyn BarRepository>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            stream_api,
            bars: Arc::new(BarStore::new(cfg.bar_window, cfg.dedup_policy)),
            volumes: Arc::new(SeriesStore::new(cfg.volume_window)),
            return_detector: ReturnSpikeDetector::new(cfg.return_policy, cfg.bar_window),
            volume_detector: VolumeSpikeDetector::new(cfg.volume_policy, cfg.volume_window),
            throttle: AlertThrottle::new(cfg.throttle(), now_ms()),
            notifier,
            repository,
            interval: cfg.interval.clone(),
            queue_capacity: cfg.event_queue_capacity,
        })
    }

    /// Warm one instrument's windows from persisted or fetched history.
    pub fn preload(&self, symbol: &str, bars: Vec<Bar>) {
        self.volumes.extend(symbol, bars.iter().map(|b| b.volume));
        self.bars.extend(symbol, bars);
    }

    pub fn history_len(&self, symbol: &str) -> usize {
        self.bars.len(symbol)
    }

    /// Spawn the per-group worker pairs. Returns once everything is
    /// spawned; the tasks run for the process lifetime.
    pub fn start(self: Arc<Self>, groups: Vec<ConnectionGroup>) {
        for group in groups {
            let (tx, rx) = mpsc::channel(self.queue_capacity);

            let api = Arc::clone(&self.stream_api);
            let stream_group = group.clone();
            tokio::spawn(async move {
                if let Err(e) = api.stream_bars(stream_group, tx).await {
                    // Fatal for this group only; coverage shrinks, the
                    // process does not.
                    error!(error = %e, "connection group stopped permanently");
                }
            });

            let mgr = Arc::clone(&self);
            tokio::spawn(async move {
                mgr.process_event_stream(rx, group.index).await;
            });
        }
    }

    /// Drain one group's decoded closed-bar events.
    pub async fn process_event_stream(
        self: Arc<Self>,
        mut events: mpsc::Receiver<BarEvent>,
        group: usize,
    ) {
        while let Some(event) = events.recv().await {
            self.handle_bar(event).await;
        }

        info!(group, "event stream ended");
    }

    /// One completed bar: update history, persist, detect, alert.
    pub async fn handle_bar(&self, event: BarEvent) {
        let BarEvent { symbol, bar } = event;

        if !self.bars.append(&symbol, bar) {
            debug!(
                symbol = %symbol,
                close_time_ms = bar.close_time_ms,
                "stale or duplicate bar dropped"
            );
            return;
        }
        self.volumes.append(&symbol, bar.volume);

        if let Some(repo) = &self.repository {
            if let Some(snapshot) = self.bars.snapshot(&symbol) {
                if let Err(e) = repo.save(&symbol, &snapshot).await {
                    warn!(symbol = %symbol, error = %e, "history save failed");
                }
            }
        }

        if let Some(bars) = self.bars.snapshot(&symbol) {
            if let Some(verdict) = self.return_detector.evaluate(&bars) {
                if verdict.is_anomalous {
                    self.dispatch_alert(&symbol, &bar, verdict);
                }
            }
        }

        if let Some(volumes) = self.volumes.snapshot(&symbol) {
            if let Some(verdict) = self.volume_detector.evaluate(&volumes) {
                if verdict.is_anomalous {
                    self.dispatch_alert(&symbol, &bar, verdict);
                }
            }
        }
    }

    /// Gate through the throttle, then fire-and-forget to the notifier.
    ///
    /// An admitted alert consumes budget whether or not delivery succeeds;
    /// a failed push is logged and never retried.
    fn dispatch_alert(&self, symbol: &str, bar: &Bar, verdict: Verdict) {
        if !self.throttle.admit(symbol, now_ms()) {
            info!(symbol = %symbol, kind = ?verdict.kind, "anomaly suppressed by alert budget");
            return;
        }

        warn!(
            symbol = %symbol,
            kind = ?verdict.kind,
            observed = verdict.observed,
            threshold = verdict.threshold,
            "anomaly detected"
        );

        let (title, body) = format_alert(symbol, &self.interval, bar, &verdict);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&title, &body).await {
                warn!(error = %e, "alert delivery failed");
            }
        });
    }
}

/// Alert text is single-line on purpose: the push boundary interpolates it
/// into a URL path.
fn format_alert(symbol: &str, interval: &str, bar: &Bar, verdict: &Verdict) -> (String, String) {
    let upper = symbol.to_uppercase();

    match verdict.kind {
        VerdictKind::Return => (
            format!("{upper} move"),
            format!(
                "{upper} {interval} return {:+.2}% vs threshold {:.2}% (open {}, close {})",
                verdict.observed * 100.0,
                verdict.threshold * 100.0,
                bar.open,
                bar.close
            ),
        ),
        VerdictKind::Volume => (
            format!("{upper} volume"),
            format!(
                "{upper} {interval} volume {:.2} vs threshold {:.2} (open {}, close {})",
                verdict.observed, verdict.threshold, bar.open, bar.close
            ),
        ),
    }
}
