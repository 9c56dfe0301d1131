//! Level set classification of candidate points from their confidence intervals.
//!
//! The confidence interval of point `i` is `mu_i -/+ sqrt(beta) * proxy_i` where `proxy_i`
//! is the variance reduction computed by the linear solver. With `h` the level and
//! `eps` the tolerance, a point is classified:
//! * upper when `mu_i - sqrt(beta) * proxy_i + eps > h`,
//! * lower when `mu_i + sqrt(beta) * proxy_i - eps < h`,
//! * ambiguous otherwise.
//!
//! The next point to activate is the ambiguous one with the widest interval.

use crate::pool::CandidatePool;

use ndarray::{ArrayBase, Data, Ix1};

/// Status of a candidate point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointStatus {
    /// Point is in the active set
    Active,
    /// Point confidently above the level
    Upper,
    /// Point confidently below the level
    Lower,
    /// Point neither active nor classified yet
    Unclassified,
}

/// Upper and lower classification flags over the whole candidate pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationStore {
    upper: Vec<bool>,
    lower: Vec<bool>,
}

impl ClassificationStore {
    /// Store for `n_points` unclassified points
    pub fn new(n_points: usize) -> Self {
        ClassificationStore {
            upper: vec![false; n_points],
            lower: vec![false; n_points],
        }
    }

    /// Upper flags
    pub fn upper(&self) -> &[bool] {
        &self.upper
    }

    /// Lower flags
    pub fn lower(&self) -> &[bool] {
        &self.lower
    }

    /// Whether point `index` was classified upper or lower
    pub fn is_classified(&self, index: usize) -> bool {
        self.upper[index] || self.lower[index]
    }

    /// Number of points classified upper
    pub fn n_upper(&self) -> usize {
        self.upper.iter().filter(|&&f| f).count()
    }

    /// Number of points classified lower
    pub fn n_lower(&self) -> usize {
        self.lower.iter().filter(|&&f| f).count()
    }

    /// Status of point `index` given the pool active flags
    pub fn status(&self, pool: &CandidatePool, index: usize) -> PointStatus {
        if pool.is_active(index) {
            PointStatus::Active
        } else if self.upper[index] {
            PointStatus::Upper
        } else if self.lower[index] {
            PointStatus::Lower
        } else {
            PointStatus::Unclassified
        }
    }

    /// Indices of points neither active nor classified
    pub fn unclassified(&self, pool: &CandidatePool) -> Vec<usize> {
        (0..pool.n_points())
            .filter(|&i| !pool.is_active(i) && !self.is_classified(i))
            .collect()
    }
}

/// Decision thresholds of the classification rule
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelRule {
    /// Level the target function is compared to
    pub level: f64,
    /// Classification slack
    pub tolerance: f64,
    /// Confidence schedule value of the round
    pub beta: f64,
}

impl LevelRule {
    /// Classify a point from its posterior mean and variance proxy.
    ///
    /// Returns the status (`Upper`, `Lower` or `Unclassified`) and the interval width.
    /// Upper is checked first so both flags are never set together.
    pub fn classify(&self, mu: f64, proxy: f64) -> (PointStatus, f64) {
        let half_width = self.beta.sqrt() * proxy.max(0.);
        let (lo, hi) = (mu - half_width, mu + half_width);
        let status = if lo + self.tolerance > self.level {
            PointStatus::Upper
        } else if hi - self.tolerance < self.level {
            PointStatus::Lower
        } else {
            PointStatus::Unclassified
        };
        (status, hi - lo)
    }
}

/// Outcome of a classification pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Ambiguous point to activate next, if any
    pub next: Option<usize>,
    /// Points newly classified upper during the pass
    pub n_new_upper: usize,
    /// Points newly classified lower during the pass
    pub n_new_lower: usize,
    /// Points left ambiguous after the pass
    pub n_ambiguous: usize,
}

impl Selection {
    /// Whether unclassified points remain after the pass
    pub fn points_left(&self) -> bool {
        self.n_ambiguous > 0
    }
}

/// Classify every inactive unclassified point of the pool and select the
/// widest ambiguous one in the same pass (lowest index wins ties).
pub fn classify_and_select(
    pool: &CandidatePool,
    store: &mut ClassificationStore,
    mu: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    proxy: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    rule: &LevelRule,
) -> Selection {
    let mut selection = Selection::default();
    let mut widest = f64::NEG_INFINITY;
    for i in 0..pool.n_points() {
        if pool.is_active(i) || store.is_classified(i) {
            continue;
        }
        match rule.classify(mu[i], proxy[i]) {
            (PointStatus::Upper, _) => {
                store.upper[i] = true;
                selection.n_new_upper += 1;
            }
            (PointStatus::Lower, _) => {
                store.lower[i] = true;
                selection.n_new_lower += 1;
            }
            (_, width) => {
                selection.n_ambiguous += 1;
                if selection.next.is_none() || width > widest {
                    selection.next = Some(i);
                    widest = width;
                }
            }
        }
    }
    selection
}
