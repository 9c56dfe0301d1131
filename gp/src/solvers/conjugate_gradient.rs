use crate::errors::{GpError, Result};
use crate::solvers::LinearSolver;

use linfa::Float;
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Data, Ix1, Ix2, Zip};

/// Default convergence threshold on the squared residual norm
pub const CG_TOLERANCE: f64 = 1e-6;

/// Result of a conjugate gradient run
#[derive(Clone, Debug)]
pub struct CgSolution<F: Float> {
    /// Approximate solution
    pub x: Array1<F>,
    /// Number of iterations performed
    pub n_iters: usize,
    /// Squared norm of the final residual
    pub residual: F,
}

/// Solve `a . x = b` for a symmetric positive definite matrix `a` with the
/// conjugate gradient method started from `x = 0`.
///
/// Iterates while the squared residual norm is greater than `tolerance`
/// and less than `max_iters` iterations were done.
pub fn conjugate_gradient<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix2>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    tolerance: F,
    max_iters: usize,
) -> CgSolution<F> {
    let mut x = Array1::zeros(b.len());
    let mut r = b.to_owned();
    let mut p = r.clone();
    let mut delta = r.dot(&r);
    let mut n_iters = 0;

    while delta > tolerance && n_iters < max_iters {
        let q = a.dot(&p);
        let curvature = p.dot(&q);
        if curvature <= F::zero() {
            // matrix not positive definite along p, keep current iterate
            break;
        }
        let step = delta / curvature;
        x.scaled_add(step, &p);
        r.scaled_add(-step, &q);

        let delta_old = delta;
        delta = r.dot(&r);
        let ratio = delta / delta_old;
        p.mapv_inplace(|v| v * ratio);
        p += &r;
        n_iters += 1;
    }
    CgSolution {
        x,
        n_iters,
        residual: delta,
    }
}

/// Conjugate gradient solver of the active set system.
///
/// The system matrix is kept to solve for each prediction point.
#[derive(Clone, Debug)]
pub struct ConjugateGradientSolver<F: Float> {
    tolerance: F,
    max_iters: Option<usize>,
    matrix: Array2<F>,
    alpha: Array1<F>,
}

impl<F: Float> Default for ConjugateGradientSolver<F> {
    fn default() -> Self {
        Self::new(F::cast(CG_TOLERANCE))
    }
}

impl<F: Float> ConjugateGradientSolver<F> {
    /// Constructor given the convergence threshold on the squared residual norm
    pub fn new(tolerance: F) -> Self {
        ConjugateGradientSolver {
            tolerance,
            max_iters: None,
            matrix: Array2::zeros((0, 0)),
            alpha: Array1::zeros(0),
        }
    }

    /// Set the iteration cap, default to the system size
    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = Some(max_iters);
        self
    }

    /// Convergence threshold
    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    fn iteration_cap(&self, n: usize) -> usize {
        self.max_iters.unwrap_or(n)
    }
}

impl<F: Float> LinearSolver<F> for ConjugateGradientSolver<F> {
    fn name(&self) -> &'static str {
        "ConjugateGradient"
    }

    fn solve(&mut self, matrix: &ArrayView2<F>, target: &ArrayView1<F>) -> Result<()> {
        if matrix.nrows() == 0 {
            return Err(GpError::EmptyActiveSetError("nothing to solve".to_string()));
        }
        if !matrix.is_square() || matrix.nrows() != target.len() {
            return Err(GpError::InvalidValueError(format!(
                "System matrix {:?} incompatible with target of length {}",
                matrix.dim(),
                target.len()
            )));
        }
        let sol = conjugate_gradient(
            matrix,
            target,
            self.tolerance,
            self.iteration_cap(target.len()),
        );
        debug!(
            "CG alpha solve: {} iterations, residual {}",
            sol.n_iters,
            sol.residual
        );
        self.matrix = matrix.to_owned();
        self.alpha = sol.x;
        Ok(())
    }

    fn alpha(&self) -> ArrayView1<F> {
        self.alpha.view()
    }

    fn predict(&self, kernel_vectors: &ArrayView2<F>) -> Result<(Array1<F>, Array1<F>)> {
        if self.alpha.is_empty() {
            return Err(GpError::EmptyActiveSetError(
                "solve has to be called before predict".to_string(),
            ));
        }
        if kernel_vectors.nrows() != self.alpha.len() {
            return Err(GpError::InvalidValueError(format!(
                "Kernel vectors of length {} expected, got {}",
                self.alpha.len(),
                kernel_vectors.nrows()
            )));
        }
        let nb = kernel_vectors.ncols();
        let max_iters = self.iteration_cap(self.alpha.len());
        let mut mu = Array1::zeros(nb);
        let mut proxy = Array1::zeros(nb);
        Zip::from(&mut mu)
            .and(&mut proxy)
            .and(kernel_vectors.columns())
            .par_for_each(|m, v, kv| {
                let gamma = conjugate_gradient(&self.matrix, &kv, self.tolerance, max_iters);
                *m = self.alpha.dot(&kv);
                *v = gamma.x.dot(&kv);
            });
        Ok((mu, proxy))
    }
}
