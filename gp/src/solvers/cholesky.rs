use crate::errors::{GpError, Result};
use crate::solvers::LinearSolver;

use linfa::Float;
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Direct solver of the active set system based on the Cholesky factorization
/// `K + beta.I = L.L^T`.
///
/// The factorization is recomputed from scratch at each solve.
#[derive(Clone, Debug, Default)]
pub struct CholeskySolver<F: Float> {
    /// Lower triangular factor
    chol: Array2<F>,
    alpha: Array1<F>,
}

impl<F: Float> CholeskySolver<F> {
    /// Constructor
    pub fn new() -> Self {
        CholeskySolver {
            chol: Array2::zeros((0, 0)),
            alpha: Array1::zeros(0),
        }
    }

    /// Lower triangular Cholesky factor of the last solved system
    pub fn factor(&self) -> ArrayView2<F> {
        self.chol.view()
    }

    /// Posterior mean and variance proxy for a single kernel vector.
    ///
    /// The proxy is the norm `|L^-1 kv|`, not its square, as returned by
    /// [`LinearSolver::predict`].
    pub fn predict_one(&self, kernel_vector: &ArrayView1<F>) -> Result<(F, F)> {
        let kv = kernel_vector.view().insert_axis(Axis(1));
        let (mu, proxy) = self.predict(&kv)?;
        Ok((mu[0], proxy[0]))
    }
}

impl<F: Float> LinearSolver<F> for CholeskySolver<F> {
    fn name(&self) -> &'static str {
        "Cholesky"
    }

    fn solve(&mut self, matrix: &ArrayView2<F>, target: &ArrayView1<F>) -> Result<()> {
        if matrix.nrows() == 0 {
            return Err(GpError::EmptyActiveSetError("nothing to factorize".to_string()));
        }
        if !matrix.is_square() || matrix.nrows() != target.len() {
            return Err(GpError::InvalidValueError(format!(
                "System matrix {:?} incompatible with target of length {}",
                matrix.dim(),
                target.len()
            )));
        }
        let chol = matrix.cholesky()?;
        let rhs = target.to_owned().insert_axis(Axis(1));
        let y = chol.solve_triangular(&rhs, UPLO::Lower)?;
        let alpha = chol.t().solve_triangular(&y, UPLO::Upper)?;
        self.alpha = alpha.index_axis_move(Axis(1), 0);
        self.chol = chol;
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
        let gamma = self.chol.solve_triangular(kernel_vectors, UPLO::Lower)?;
        let mu = kernel_vectors.t().dot(&self.alpha);
        let proxy = gamma.map_axis(Axis(0), |col| col.dot(&col).sqrt());
        Ok((mu, proxy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::ConjugateGradientSolver;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4., 2.], [2., 3.]];
        let y = array![2., 1.];
        let mut solver = CholeskySolver::new();
        solver.solve(&a.view(), &y.view()).unwrap();
        assert_abs_diff_eq!(a.dot(&solver.alpha()), y, epsilon = 1e-12);
        let l = solver.factor();
        assert_abs_diff_eq!(l.dot(&l.t()), a, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_agrees_with_cg() {
        let a = array![[2., 0.5, 0.1], [0.5, 1.5, 0.3], [0.1, 0.3, 1.]];
        let y = array![0.4, -1.2, 2.];
        let mut chol = CholeskySolver::new();
        chol.solve(&a.view(), &y.view()).unwrap();
        let mut cg = ConjugateGradientSolver::new(1e-26);
        cg.solve(&a.view(), &y.view()).unwrap();
        assert_abs_diff_eq!(chol.alpha(), cg.alpha(), epsilon = 1e-8);

        let kv = array![[0.5, 0.1], [0.2, 0.9], [0.3, 0.4]];
        let (mu_chol, proxy_chol) = chol.predict(&kv.view()).unwrap();
        let (mu_cg, proxy_cg) = cg.predict(&kv.view()).unwrap();
        assert_abs_diff_eq!(mu_chol, mu_cg, epsilon = 1e-8);
        // |L^-1 kv|^2 = kv . A^-1 kv
        assert_abs_diff_eq!(proxy_chol.mapv(|v| v * v), proxy_cg, epsilon = 1e-8);
    }

    #[test]
    fn test_predict_one() {
        let a = array![[1.]];
        let mut solver = CholeskySolver::new();
        solver.solve(&a.view(), &array![3.].view()).unwrap();
        let (mu, proxy) = solver.predict_one(&array![0.5].view()).unwrap();
        assert_abs_diff_eq!(mu, 1.5);
        assert_abs_diff_eq!(proxy, 0.5);
    }

    #[test]
    fn test_predict_one_proxy_is_a_norm() {
        let a = array![[4., 2.], [2., 3.]];
        let mut solver = CholeskySolver::new();
        solver.solve(&a.view(), &array![2., 1.].view()).unwrap();
        let kv = array![1., 0.5];
        // kv . A^-1 kv = 0.25
        let (mu, proxy) = solver.predict_one(&kv.view()).unwrap();
        assert_abs_diff_eq!(mu, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(proxy, 0.5, epsilon = 1e-12);

        let (mus, proxies) = solver.predict(&kv.view().insert_axis(Axis(1))).unwrap();
        assert_abs_diff_eq!(mus[0], mu, epsilon = 1e-15);
        assert_abs_diff_eq!(proxies[0], proxy, epsilon = 1e-15);
    }

    #[test]
    fn test_not_positive_definite() {
        let a = array![[1., 2.], [2., 1.]];
        let mut solver = CholeskySolver::new();
        let res = solver.solve(&a.view(), &array![1., 1.].view());
        assert!(matches!(res, Err(GpError::LinalgError(_))));
    }

    #[test]
    fn test_empty_system() {
        let a = Array2::<f64>::zeros((0, 0));
        let mut solver = CholeskySolver::new();
        let res = solver.solve(&a.view(), &Array1::zeros(0).view());
        assert!(matches!(res, Err(GpError::EmptyActiveSetError(_))));
    }
}
