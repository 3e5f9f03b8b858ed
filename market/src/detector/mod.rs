pub mod returns;
pub mod stats;
pub mod volume;

/// What kind of observation a verdict judges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerdictKind {
    Return,
    Volume,
}

/// Structured detection outcome for one candidate observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
    pub is_anomalous: bool,
    pub observed: f64,
    pub threshold: f64,
    pub kind: VerdictKind,
}

/// Threshold policy shared by the spike detectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DetectionPolicy {
    /// `threshold = mean + n · population-std` over the baseline.
    ///
    /// With a (near-)zero-std baseline this collapses to "anomalous iff the
    /// observation moves past the mean at all"; that is intentional and the
    /// computation never divides by anything.
    Sigma { n: f64 },
    /// `threshold = quantile(|baseline|, q)`, linear interpolation.
    Quantile { q: f64 },
}

impl DetectionPolicy {
    /// Threshold over a baseline of signed values (the candidate itself is
    /// never part of the baseline).
    pub fn threshold(&self, baseline: &[f64]) -> f64 {
        match *self {
            DetectionPolicy::Sigma { n } => {
                let (mean, std) = stats::mean_std(baseline);
                mean + n * std
            }
            DetectionPolicy::Quantile { q } => stats::quantile_abs(baseline, q),
        }
    }
}

/// A spike detector consumes a point-in-time history snapshot (newest value
/// last, the candidate under test) and judges that newest value.
///
/// Detectors are composed side by side — one instance per signal — rather
/// than layered; each owns nothing but its policy and warm-up bound.
/// While the history is below the warm-up bound no verdict is produced.
pub trait Detector {
    type Sample;

    fn evaluate(&self, history: &[Self::Sample]) -> Option<Verdict>;
}
