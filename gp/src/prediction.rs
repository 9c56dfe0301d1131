use crate::active_set::ActiveSet;
use crate::correlation_models::CorrelationModel;
use crate::errors::{GpError, Result};
use crate::solvers::LinearSolver;

use linfa::Float;
use log::trace;
use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};

/// Default number of points predicted together
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Posterior predictions over candidate points processed by batches.
///
/// Each batch builds the (len, batch) kernel vectors matrix between
/// the active points and the batch points before calling the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPredictor {
    batch_size: usize,
}

impl Default for BatchPredictor {
    fn default() -> Self {
        BatchPredictor {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchPredictor {
    /// Constructor given the number of points predicted at once (at least 1)
    pub fn new(batch_size: usize) -> Self {
        BatchPredictor {
            batch_size: batch_size.max(1),
        }
    }

    /// Number of points predicted at once
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Predict posterior mean and variance proxy at rows `indices` of `x`,
    /// writing results at the same positions in `mu` and `proxy`.
    ///
    /// Other positions of `mu` and `proxy` are left untouched.
    pub fn predict_into<F: Float, Corr: CorrelationModel<F>>(
        &self,
        active_set: &ActiveSet<F, Corr>,
        solver: &dyn LinearSolver<F>,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        indices: &[usize],
        mu: &mut Array1<F>,
        proxy: &mut Array1<F>,
    ) -> Result<()> {
        if active_set.is_empty() {
            return Err(GpError::EmptyActiveSetError(
                "no point to condition predictions on".to_string(),
            ));
        }
        if mu.len() != x.nrows() || proxy.len() != x.nrows() {
            return Err(GpError::InvalidValueError(format!(
                "Prediction buffers should have length {}",
                x.nrows()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= x.nrows()) {
            return Err(GpError::InvalidValueError(format!(
                "Point index {} out of range (nb points = {})",
                bad,
                x.nrows()
            )));
        }
        for batch in indices.chunks(self.batch_size) {
            let xb = x.select(Axis(0), batch);
            let kv = active_set.kernel_vectors(&xb);
            let (mu_b, proxy_b) = solver.predict(&kv.view())?;
            for (j, &i) in batch.iter().enumerate() {
                mu[i] = mu_b[j];
                proxy[i] = proxy_b[j];
            }
        }
        trace!(
            "{} predictions with {} solver ({} batches)",
            indices.len(),
            solver.name(),
            (indices.len() + self.batch_size - 1) / self.batch_size
        );
        Ok(())
    }

    /// Predict posterior mean and variance proxy at every row of `x`
    pub fn predict<F: Float, Corr: CorrelationModel<F>>(
        &self,
        active_set: &ActiveSet<F, Corr>,
        solver: &dyn LinearSolver<F>,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut mu = Array1::zeros(x.nrows());
        let mut proxy = Array1::zeros(x.nrows());
        self.predict_into(active_set, solver, x, &indices, &mut mu, &mut proxy)?;
        Ok((mu, proxy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::GpParams;
    use crate::solvers::{CholeskySolver, ConjugateGradientSolver};
    use approx::assert_abs_diff_eq;
    use linfa::ParamGuard;
    use ndarray::{array, Array2};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn fitted_active_set(xt: &Array2<f64>, yt: &Array1<f64>) -> ActiveSet<f64> {
        let params = GpParams::new(0.5, 0.).check().unwrap();
        let mut active = ActiveSet::new(xt.ncols(), xt.nrows(), params);
        for (i, (x, &y)) in xt.rows().into_iter().zip(yt.iter()).enumerate() {
            active.absorb(i, &x, y).unwrap();
        }
        active
    }

    #[test]
    fn test_interpolation_at_active_points() {
        let xt = array![[0., 0.], [1., 0.], [0., 1.], [1., 1.]];
        let yt = array![0., 100., -3., 7.];
        let active = fitted_active_set(&xt, &yt);
        let mut solver = CholeskySolver::new();
        solver
            .solve(&active.system_matrix().view(), &active.targets())
            .unwrap();
        let (mu, proxy) = BatchPredictor::new(3)
            .predict(&active, &solver, &xt)
            .unwrap();
        assert_abs_diff_eq!(mu, yt, epsilon = 1e-8);
        // |L^-1 k(x_i)| = |e_i|_K = 1 at active point i
        assert_abs_diff_eq!(proxy, Array1::ones(4), epsilon = 1e-8);
    }

    #[test]
    fn test_batch_size_does_not_change_predictions() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let xt: Array2<f64> = Array2::random_using((6, 2), Uniform::new(0., 3.), &mut rng);
        let yt = xt.map_axis(Axis(1), |r| r[0].sin() + r[1]);
        let active = fitted_active_set(&xt, &yt);
        let mut solver = CholeskySolver::new();
        solver
            .solve(&active.system_matrix().view(), &active.targets())
            .unwrap();

        let x = Array2::random_using((37, 2), Uniform::new(0., 3.), &mut rng);
        let (mu1, proxy1) = BatchPredictor::new(1).predict(&active, &solver, &x).unwrap();
        let (mu2, proxy2) = BatchPredictor::new(8).predict(&active, &solver, &x).unwrap();
        let (mu3, proxy3) = BatchPredictor::new(100).predict(&active, &solver, &x).unwrap();
        assert_abs_diff_eq!(mu1, mu2, epsilon = 1e-12);
        assert_abs_diff_eq!(mu1, mu3, epsilon = 1e-12);
        assert_abs_diff_eq!(proxy1, proxy2, epsilon = 1e-12);
        assert_abs_diff_eq!(proxy1, proxy3, epsilon = 1e-12);
    }

    #[test]
    fn test_predict_into_only_touches_indices() {
        let xt = array![[0.], [1.]];
        let yt = array![1., 2.];
        let active = fitted_active_set(&xt, &yt);
        let mut solver = ConjugateGradientSolver::new(1e-20);
        solver
            .solve(&active.system_matrix().view(), &active.targets())
            .unwrap();
        let x = array![[0.], [0.5], [1.]];
        let mut mu = Array1::from_elem(3, -1.);
        let mut proxy = Array1::from_elem(3, -1.);
        BatchPredictor::default()
            .predict_into(&active, &solver, &x, &[0, 2], &mut mu, &mut proxy)
            .unwrap();
        assert_abs_diff_eq!(mu[0], 1., epsilon = 1e-8);
        assert_abs_diff_eq!(mu[2], 2., epsilon = 1e-8);
        assert_abs_diff_eq!(mu[1], -1.);
        assert_abs_diff_eq!(proxy[1], -1.);
    }

    #[test]
    fn test_predict_with_empty_active_set() {
        let params = GpParams::new(1., 0.).check().unwrap();
        let active = ActiveSet::<f64>::new(1, 2, params);
        let solver = CholeskySolver::new();
        let res = BatchPredictor::default().predict(&active, &solver, &array![[0.]]);
        assert!(matches!(res, Err(GpError::EmptyActiveSetError(_))));
    }
}
