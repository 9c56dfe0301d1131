//! Linear solvers used to condition the gaussian process on the active set.
//!
//! Both solvers compute `alpha` such that `(K + beta.I) alpha = y` and predict,
//! for a batch of kernel vectors `kv`, the posterior mean `alpha . kv` and a
//! variance reduction proxy used as the uncertainty of the prediction:
//! * [`ConjugateGradientSolver`]: iterative, proxy is `kv . (K + beta.I)^-1 kv`,
//! * [`CholeskySolver`]: direct, proxy is `|L^-1 kv|` with `L` the lower Cholesky factor.

mod cholesky;
mod conjugate_gradient;

pub use cholesky::*;
pub use conjugate_gradient::*;

use crate::errors::Result;
use linfa::Float;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// A trait for solvers of the active set linear system
pub trait LinearSolver<F: Float>: Send + Sync {
    /// Solver name used in logs
    fn name(&self) -> &'static str;

    /// Solve `matrix . alpha = target` and keep what is needed for later predictions
    fn solve(&mut self, matrix: &ArrayView2<F>, target: &ArrayView1<F>) -> Result<()>;

    /// Weights of the last solve
    fn alpha(&self) -> ArrayView1<F>;

    /// Posterior mean and variance proxy for each column of `kernel_vectors` (len, nb)
    fn predict(&self, kernel_vectors: &ArrayView2<F>) -> Result<(Array1<F>, Array1<F>)>;
}
