use crate::correlation_models::{CorrelationModel, SquaredExponentialCorr};
use crate::errors::{GpError, Result};
use crate::parameters::GpValidParams;

use linfa::Float;
use ndarray::{
    s, Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Data, DataMut, Ix1, Ix2, Zip,
};

/// Points retained so far to condition the gaussian process on.
///
/// Storage is preallocated for `max_size` points, the kernel matrix between
/// active points being grown by one row and one column at each absorption.
/// Only the leading `len() x len()` block is meaningful.
#[derive(Clone, Debug)]
pub struct ActiveSet<F: Float, Corr: CorrelationModel<F> = SquaredExponentialCorr> {
    params: GpValidParams<F, Corr>,
    /// Indices of active points in the candidate pool, in absorption order
    indices: Vec<usize>,
    /// Active points (max_size, dim)
    inputs: Array2<F>,
    /// Observed targets at active points (max_size,)
    targets: Array1<F>,
    /// Kernel matrix between active points (max_size, max_size)
    kernel_matrix: Array2<F>,
}

impl<F: Float, Corr: CorrelationModel<F>> ActiveSet<F, Corr> {
    /// Create an empty active set of points in dimension `dim`
    /// able to hold at most `max_size` points.
    pub fn new(dim: usize, max_size: usize, params: GpValidParams<F, Corr>) -> Self {
        ActiveSet {
            params,
            indices: Vec::with_capacity(max_size),
            inputs: Array2::zeros((max_size, dim)),
            targets: Array1::zeros(max_size),
            kernel_matrix: Array2::zeros((max_size, max_size)),
        }
    }

    /// Gaussian process hyperparameters
    pub fn params(&self) -> &GpValidParams<F, Corr> {
        &self.params
    }

    /// Number of active points
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no point was absorbed yet
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether capacity is reached
    pub fn is_full(&self) -> bool {
        self.len() == self.max_size()
    }

    /// Capacity of the active set
    pub fn max_size(&self) -> usize {
        self.targets.len()
    }

    /// Input space dimension
    pub fn dim(&self) -> usize {
        self.inputs.ncols()
    }

    /// Candidate pool indices of the active points in absorption order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Active points (len, dim)
    pub fn inputs(&self) -> ArrayView2<F> {
        self.inputs.slice(s![..self.len(), ..])
    }

    /// Targets at active points (len,)
    pub fn targets(&self) -> ArrayView1<F> {
        self.targets.slice(s![..self.len()])
    }

    /// Kernel matrix between active points (len, len)
    pub fn kernel_matrix(&self) -> ArrayView2<F> {
        let k = self.len();
        self.kernel_matrix.slice(s![..k, ..k])
    }

    /// Matrix of the linear system solved for alpha: kernel matrix plus `beta` on its diagonal
    pub fn system_matrix(&self) -> Array2<F> {
        let mut mat = self.kernel_matrix().to_owned();
        let beta = self.params.beta();
        mat.diag_mut().mapv_inplace(|v| v + beta);
        mat
    }

    /// Write the system matrix in `out` which has to be (len, len)
    pub fn write_system_matrix(
        &self,
        out: &mut ArrayBase<impl DataMut<Elem = F>, Ix2>,
    ) -> Result<()> {
        let k = self.len();
        if out.dim() != (k, k) {
            return Err(GpError::InvalidValueError(format!(
                "System matrix of shape ({k}, {k}) expected, got {:?}",
                out.dim()
            )));
        }
        out.assign(&self.kernel_matrix());
        let beta = self.params.beta();
        out.diag_mut().mapv_inplace(|v| v + beta);
        Ok(())
    }

    /// Append the candidate `index` located at `x` with observed value `y`.
    ///
    /// The kernel matrix is extended with the covariances between `x` and
    /// the already active points, plus its self covariance.
    pub fn absorb(
        &mut self,
        index: usize,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: F,
    ) -> Result<()> {
        if self.is_full() {
            return Err(GpError::ActiveSetFullError(self.max_size()));
        }
        if x.len() != self.dim() {
            return Err(GpError::InvalidValueError(format!(
                "Point of dimension {} can not be absorbed in active set of dimension {}",
                x.len(),
                self.dim()
            )));
        }
        let k = self.len();
        let dim = self.dim();
        let sigma = self.params.sigma();
        let corr = *self.params.corr();

        self.inputs.row_mut(k).assign(x);
        self.targets[k] = y;
        for p in 0..k {
            let v = corr.value(&self.inputs.row(p), x, dim, sigma);
            self.kernel_matrix[[p, k]] = v;
            self.kernel_matrix[[k, p]] = v;
        }
        self.kernel_matrix[[k, k]] = corr.value(x, x, dim, sigma);
        self.indices.push(index);
        Ok(())
    }

    /// Covariances between `x` and each active point (len,)
    pub fn kernel_vector(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        let dim = self.dim();
        let sigma = self.params.sigma();
        let corr = self.params.corr();
        self.inputs()
            .rows()
            .into_iter()
            .map(|row| corr.value(&row, x, dim, sigma))
            .collect()
    }

    /// Covariances between each row of `xs` and each active point.
    ///
    /// Returns a (len, nrows(xs)) matrix, column `j` being the kernel vector of `xs` row `j`.
    pub fn kernel_vectors(&self, xs: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut kv = Array2::zeros((self.len(), xs.nrows()));
        Zip::from(kv.columns_mut())
            .and(xs.rows())
            .par_for_each(|mut col, x| col.assign(&self.kernel_vector(&x)));
        kv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation_models::covariance;
    use crate::parameters::GpParams;
    use approx::assert_abs_diff_eq;
    use linfa::ParamGuard;
    use ndarray::array;

    fn params(sigma: f64, beta: f64) -> GpValidParams<f64> {
        GpParams::new(sigma, beta).check().unwrap()
    }

    #[test]
    fn test_absorb_grows_kernel_matrix() {
        let mut active = ActiveSet::new(2, 3, params(1., 0.));
        assert!(active.is_empty());
        active.absorb(4, &array![0., 0.], 1.).unwrap();
        active.absorb(7, &array![1., 0.], 2.).unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active.indices(), &[4, 7]);
        assert_abs_diff_eq!(active.targets(), array![1., 2.]);
        let e = (-0.5f64).exp();
        assert_abs_diff_eq!(
            active.kernel_matrix(),
            array![[1., e], [e, 1.]],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_kernel_matrix_matches_gram() {
        let xs = array![[0., 0.], [0.5, 1.], [2., -1.], [1., 1.]];
        let mut active = ActiveSet::new(2, 4, params(0.8, 0.));
        for (i, x) in xs.rows().into_iter().enumerate() {
            active.absorb(i, &x, 0.).unwrap();
        }
        let expected = SquaredExponentialCorr().gram(&xs, 0.8);
        assert_abs_diff_eq!(active.kernel_matrix(), expected, epsilon = 1e-14);
        assert!(active.is_full());
    }

    #[test]
    fn test_absorb_beyond_capacity() {
        let mut active = ActiveSet::new(1, 1, params(1., 0.));
        active.absorb(0, &array![0.], 1.).unwrap();
        let res = active.absorb(1, &array![1.], 1.);
        assert!(matches!(res, Err(GpError::ActiveSetFullError(1))));
    }

    #[test]
    fn test_absorb_bad_dimension() {
        let mut active = ActiveSet::new(2, 2, params(1., 0.));
        let res = active.absorb(0, &array![0.], 1.);
        assert!(matches!(res, Err(GpError::InvalidValueError(_))));
        assert!(active.is_empty());
    }

    #[test]
    fn test_system_matrix_has_noise_on_diagonal() {
        let mut active = ActiveSet::new(1, 2, params(1., 0.25));
        active.absorb(0, &array![0.], 1.).unwrap();
        active.absorb(1, &array![1.], 1.).unwrap();
        let sys = active.system_matrix();
        assert_abs_diff_eq!(sys[[0, 0]], 1.25);
        assert_abs_diff_eq!(sys[[1, 1]], 1.25);
        assert_abs_diff_eq!(sys[[0, 1]], active.kernel_matrix()[[0, 1]]);
        // kernel matrix itself stays noise free
        assert_abs_diff_eq!(active.kernel_matrix()[[0, 0]], 1.);
    }

    #[test]
    fn test_write_system_matrix_in_buffer() {
        let mut active = ActiveSet::new(1, 3, params(1., 0.25));
        let mut buffer = Array2::from_elem((3, 3), f64::NAN);
        active.absorb(0, &array![0.], 1.).unwrap();
        active.absorb(1, &array![1.], 1.).unwrap();

        let mut block = buffer.slice_mut(s![..2, ..2]);
        active.write_system_matrix(&mut block).unwrap();
        assert_abs_diff_eq!(block, active.system_matrix(), epsilon = 1e-15);
        assert!(buffer[[2, 2]].is_nan());

        let res = active.write_system_matrix(&mut buffer);
        assert!(matches!(res, Err(GpError::InvalidValueError(_))));
    }

    #[test]
    fn test_kernel_vectors_columns() {
        let mut active = ActiveSet::new(2, 2, params(0.5, 0.));
        active.absorb(0, &array![0., 0.], 1.).unwrap();
        active.absorb(1, &array![1., 1.], 1.).unwrap();
        let xs = array![[0., 1.], [2., 2.], [0., 0.]];
        let kv = active.kernel_vectors(&xs);
        assert_eq!(kv.dim(), (2, 3));
        for (j, x) in xs.rows().into_iter().enumerate() {
            assert_abs_diff_eq!(kv.column(j), active.kernel_vector(&x), epsilon = 1e-15);
            assert_abs_diff_eq!(
                kv[[0, j]],
                covariance(&array![0., 0.], &x, 2, 0.5),
                epsilon = 1e-15
            );
        }
        assert_abs_diff_eq!(kv[[0, 2]], 1.);
    }
}
