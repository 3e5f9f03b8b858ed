//! Volume-spike detection.
//!
//! Same baseline/candidate split as the return detector, but one-sided:
//! only a volume *above* the threshold is a spike, a quiet bar never is.

use super::{DetectionPolicy, Detector, Verdict, VerdictKind};

pub struct VolumeSpikeDetector {
    policy: DetectionPolicy,
    min_history: usize,
}

impl VolumeSpikeDetector {
    pub fn new(policy: DetectionPolicy, min_history: usize) -> Self {
        Self {
            policy,
            min_history: min_history.max(2),
        }
    }
}

impl Detector for VolumeSpikeDetector {
    type Sample = f64;

    fn evaluate(&self, history: &[f64]) -> Option<Verdict> {
        if history.len() < self.min_history {
            return None;
        }

        let (candidate, baseline) = history.split_last()?;
        let threshold = self.policy.threshold(baseline);

        Some(Verdict {
            is_anomalous: *candidate > threshold,
            observed: *candidate,
            threshold,
            kind: VerdictKind::Volume,
        })
    }
}
