//! A module for correlation models used to build the covariance between two points.
//!
//! The following kernel is implemented:
//! * squared exponential: `k(x, y) = exp(-|x - y|^2 / (2 * sigma))`
//!
//! Note that `sigma` enters the denominator as is (it is not squared).

use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
use std::fmt;

/// A trait for using a correlation model in an active set gaussian process
pub trait CorrelationModel<F: Float>:
    Clone + Copy + Default + fmt::Debug + PartialEq + fmt::Display + Send + Sync
{
    /// Compute the covariance between `x` and `y` over their first `dim` components,
    /// `sigma` being the kernel bandwidth.
    fn value(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        dim: usize,
        sigma: F,
    ) -> F;

    /// Covariances between `x` and each row of `xs`
    fn values(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        xs: &ArrayBase<impl Data<Elem = F>, Ix2>,
        sigma: F,
    ) -> Array1<F> {
        let dim = x.len();
        xs.rows()
            .into_iter()
            .map(|row| self.value(x, &row, dim, sigma))
            .collect()
    }

    /// Symmetric covariance matrix between all rows of `xs`
    fn gram(&self, xs: &ArrayBase<impl Data<Elem = F>, Ix2>, sigma: F) -> Array2<F> {
        let (n, dim) = xs.dim();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let v = self.value(&xs.row(i), &xs.row(j), dim, sigma);
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
        }
        k
    }
}

/// Squared exponential correlation model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SquaredExponentialCorr();

impl<F: Float> CorrelationModel<F> for SquaredExponentialCorr {
    fn value(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        dim: usize,
        sigma: F,
    ) -> F {
        let d2 = x
            .iter()
            .zip(y.iter())
            .take(dim)
            .fold(F::zero(), |acc, (&a, &b)| acc + (a - b) * (a - b));
        (-d2 / (F::cast(2.) * sigma)).exp()
    }
}

impl fmt::Display for SquaredExponentialCorr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SquaredExponential")
    }
}

/// Squared exponential covariance between `x` and `y` over their first `dim` components
pub fn covariance<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    dim: usize,
    sigma: F,
) -> F {
    SquaredExponentialCorr().value(x, y, dim, sigma)
}
