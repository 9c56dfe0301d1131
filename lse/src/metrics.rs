use ndarray::{Array1, ArrayBase, Data, Ix1};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

/// Absolute prediction error statistics over points never activated
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionError {
    /// Number of points the statistics are computed on
    pub n_points: usize,
    /// Mean absolute error
    pub mean: f64,
    /// Mean squared error (uncentered second moment of absolute errors)
    pub std: f64,
    /// Median absolute error
    pub median: f64,
    /// Minimum absolute error
    pub min: f64,
    /// Maximum absolute error
    pub max: f64,
}

impl std::fmt::Display for PredictionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "mean={:.6} std={:.6} median={:.6} min={:.6} max={:.6} (on {} points)",
            self.mean, self.std, self.median, self.min, self.max, self.n_points
        )
    }
}

/// Compute `|mu - targets|` statistics over points not flagged in `active`.
///
/// When every point is active, all statistics are zero.
pub fn evaluate_errors(
    mu: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    targets: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    active: &[bool],
) -> PredictionError {
    let errors: Array1<f64> = mu
        .iter()
        .zip(targets.iter())
        .zip(active.iter())
        .filter(|(_, is_active)| !**is_active)
        .map(|((m, y), _)| (m - y).abs())
        .collect();
    if errors.is_empty() {
        return PredictionError::default();
    }

    let mut sorted = errors.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    };

    PredictionError {
        n_points: n,
        mean: errors.mean().unwrap_or(0.),
        std: errors.mapv(|e| e * e).mean().unwrap_or(0.),
        median,
        min: *errors.min_skipnan(),
        max: *errors.max_skipnan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_errors_on_held_out_points() {
        let mu = array![1., 2., 3., 4., 100.];
        let targets = array![1.5, 2., 1., 5., 0.];
        let active = [false, false, false, false, true];
        let err = evaluate_errors(&mu, &targets, &active);
        // |errors| = [0.5, 0, 2, 1]
        assert_eq!(err.n_points, 4);
        assert_abs_diff_eq!(err.mean, 0.875);
        assert_abs_diff_eq!(err.std, (0.25 + 4. + 1.) / 4.);
        assert_abs_diff_eq!(err.median, 0.75);
        assert_abs_diff_eq!(err.min, 0.);
        assert_abs_diff_eq!(err.max, 2.);
    }

    #[test]
    fn test_odd_median() {
        let err = evaluate_errors(&array![0., 0., 0.], &array![3., -1., 2.], &[false; 3]);
        assert_abs_diff_eq!(err.median, 2.);
    }

    #[test]
    fn test_no_held_out_point() {
        let err = evaluate_errors(&array![1., 2.], &array![0., 0.], &[true, true]);
        assert_eq!(err, PredictionError::default());
        assert_eq!(err.mean, 0.);
        assert_eq!(err.std, 0.);
        assert_eq!(err.median, 0.);
        assert_eq!(err.min, 0.);
        assert_eq!(err.max, 0.);
    }
}
