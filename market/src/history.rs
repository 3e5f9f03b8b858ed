//! Keyed rolling-history stores shared by the ingest workers.
//!
//! Layout: an outer `RwLock` guards only the symbol → window map; every
//! window carries its own mutex, so appends for different instruments never
//! contend and an append for one instrument is atomic with respect to its
//! eviction. Readers take `snapshot()` copies and compute statistics without
//! holding any store lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::rolling_window::RollingWindow;
use crate::types::{Bar, DedupPolicy};

/// Bounded per-instrument sample windows, keyed by symbol.
pub struct SeriesStore<T> {
    windows: RwLock<HashMap<String, Arc<Mutex<RollingWindow<T>>>>>,
    capacity: usize,
}

impl<T: Clone> SeriesStore<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub(crate) fn window(&self, symbol: &str) -> Arc<Mutex<RollingWindow<T>>> {
        if let Some(w) = self.windows.read().get(symbol) {
            return Arc::clone(w);
        }

        let mut map = self.windows.write();
        Arc::clone(
            map.entry(symbol.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(RollingWindow::new(self.capacity)))),
        )
    }

    pub fn append(&self, symbol: &str, value: T) {
        self.window(symbol).lock().push(value);
    }

    /// Bulk append, used to warm a window from persisted or fetched history.
    pub fn extend(&self, symbol: &str, values: impl IntoIterator<Item = T>) {
        let window = self.window(symbol);
        let mut guard = window.lock();
        for v in values {
            guard.push(v);
        }
    }

    /// Point-in-time copy of the window, oldest first. `None` for an
    /// instrument that has never been appended to.
    pub fn snapshot(&self, symbol: &str) -> Option<Vec<T>> {
        let w = Arc::clone(self.windows.read().get(symbol)?);
        let snap = w.lock().snapshot();
        Some(snap)
    }

    pub fn len(&self, symbol: &str) -> usize {
        match self.windows.read().get(symbol) {
            Some(w) => w.lock().len(),
            None => 0,
        }
    }
}

/// Raw volume windows, independently bounded from the bar windows.
pub type VolumeStore = SeriesStore<f64>;

/// Bar windows with the configured duplicate policy applied at append time.
pub struct BarStore {
    series: SeriesStore<Bar>,
    dedup: DedupPolicy,
}

impl BarStore {
    pub fn new(capacity: usize, dedup: DedupPolicy) -> Self {
        Self {
            series: SeriesStore::new(capacity),
            dedup,
        }
    }

    /// Append a completed bar. Returns `false` when the dedup policy
    /// rejected it; the caller must then skip the volume append and the
    /// detection pass as well, so a dropped bar contributes nothing.
    pub fn append(&self, symbol: &str, bar: Bar) -> bool {
        let window = self.series.window(symbol);
        let mut guard = window.lock();

        if self.dedup == DedupPolicy::ByCloseTime {
            if let Some(last) = guard.latest() {
                if bar.close_time_ms <= last.close_time_ms {
                    return false;
                }
            }
        }

        guard.push(bar);
        true
    }

    pub fn extend(&self, symbol: &str, bars: impl IntoIterator<Item = Bar>) {
        self.series.extend(symbol, bars);
    }

    pub fn snapshot(&self, symbol: &str) -> Option<Vec<Bar>> {
        self.series.snapshot(symbol)
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.series.len(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close_time_ms: u64, close: f64) -> Bar {
        Bar {
            open: 1.0,
            close,
            volume: 10.0,
            close_time_ms,
        }
    }

    #[test]
    fn append_is_bounded_per_symbol() {
        let store = BarStore::new(3, DedupPolicy::AppendAll);
        for i in 0..10u64 {
            assert!(store.append("btcusdt", bar(i, i as f64)));
        }
        store.append("ethusdt", bar(0, 1.0));

        let snap = store.snapshot("btcusdt").unwrap();
        assert_eq!(snap.len(), 3);
        assert_eq!(
            snap.iter().map(|b| b.close_time_ms).collect::<Vec<_>>(),
            vec![7, 8, 9]
        );
        assert_eq!(store.len("ethusdt"), 1);
    }

    #[test]
    fn snapshot_of_unknown_symbol_is_none() {
        let store: SeriesStore<f64> = SeriesStore::new(4);
        assert_eq!(store.snapshot("nope"), None);
        assert_eq!(store.len("nope"), 0);
    }

    #[test]
    fn append_all_keeps_duplicates_and_out_of_order_bars() {
        let store = BarStore::new(10, DedupPolicy::AppendAll);
        assert!(store.append("s", bar(5, 1.0)));
        assert!(store.append("s", bar(5, 1.0)));
        assert!(store.append("s", bar(3, 1.0)));
        assert_eq!(store.len("s"), 3);
    }

    #[test]
    fn by_close_time_drops_stale_bars() {
        let store = BarStore::new(10, DedupPolicy::ByCloseTime);
        assert!(store.append("s", bar(5, 1.0)));
        assert!(!store.append("s", bar(5, 2.0)));
        assert!(!store.append("s", bar(3, 2.0)));
        assert!(store.append("s", bar(6, 2.0)));

        let snap = store.snapshot("s").unwrap();
        assert_eq!(
            snap.iter().map(|b| b.close_time_ms).collect::<Vec<_>>(),
            vec![5, 6]
        );
    }

    #[test]
    fn extend_warms_a_window_bounded() {
        let store: VolumeStore = SeriesStore::new(4);
        store.extend("s", (0..10).map(|v| v as f64));
        assert_eq!(store.snapshot("s").unwrap(), vec![6.0, 7.0, 8.0, 9.0]);
    }
}
