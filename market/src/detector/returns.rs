//! Return-spike detection.
//!
//! The candidate is the newest bar's return; the baseline is every earlier
//! bar in the snapshot. Bars with `open == 0` carry no return and are
//! excluded from the baseline; a candidate bar with `open == 0` yields no
//! verdict at all. Returns are judged two-sided: a crash is as anomalous as
//! a pump.

use super::{DetectionPolicy, Detector, Verdict, VerdictKind};
use crate::types::Bar;

pub struct ReturnSpikeDetector {
    policy: DetectionPolicy,
    /// Minimum bars in the snapshot before any verdict is produced.
    min_history: usize,
}

impl ReturnSpikeDetector {
    pub fn new(policy: DetectionPolicy, min_history: usize) -> Self {
        Self {
            policy,
            // A candidate needs at least one baseline value behind it.
            min_history: min_history.max(2),
        }
    }
}

impl Detector for ReturnSpikeDetector {
    type Sample = Bar;

    fn evaluate(&self, history: &[Bar]) -> Option<Verdict> {
        if history.len() < self.min_history {
            return None;
        }

        let (candidate, baseline_bars) = history.split_last()?;
        let observed = candidate.bar_return()?;

        let baseline: Vec<f64> = baseline_bars.iter().filter_map(Bar::bar_return).collect();
        if baseline.is_empty() {
            return None;
        }

        let threshold = self.policy.threshold(&baseline);

        Some(Verdict {
            is_anomalous: observed.abs() > threshold,
            observed,
            threshold,
            kind: VerdictKind::Return,
        })
    }
}
