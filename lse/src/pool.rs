use crate::errors::{LseError, Result};

use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Data, Ix1, Ix2};

/// All candidate points of a level set estimation run with their
/// observed targets and active flags.
#[derive(Clone, Debug)]
pub struct CandidatePool {
    /// Candidate points (n_points, dim)
    inputs: Array2<f64>,
    /// Target values (n_points,)
    targets: Array1<f64>,
    /// Whether point was moved into the active set
    active: Vec<bool>,
}

impl CandidatePool {
    /// Constructor from candidate points (n_points, dim) and their targets (n_points,)
    pub fn new(
        inputs: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        targets: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    ) -> Result<Self> {
        if inputs.nrows() == 0 || inputs.ncols() == 0 {
            return Err(LseError::InvalidValue(format!(
                "Candidate pool needs at least one point of dimension >= 1, got shape {:?}",
                inputs.dim()
            )));
        }
        if inputs.nrows() != targets.len() {
            return Err(LseError::InvalidValue(format!(
                "Inputs ({}) and targets ({}) should have the same number of points",
                inputs.nrows(),
                targets.len()
            )));
        }
        Ok(CandidatePool {
            inputs: inputs.to_owned(),
            targets: targets.to_owned(),
            active: vec![false; inputs.nrows()],
        })
    }

    /// Constructor from flat buffers where input component `c` of point `i`
    /// is stored at `inputs[i + c * n_points]`.
    ///
    /// Only scalar targets (`dim_out == 1`) are supported.
    pub fn from_flat(
        inputs: &[f64],
        targets: &[f64],
        dim_in: usize,
        dim_out: usize,
        n_points: usize,
    ) -> Result<Self> {
        if dim_out != 1 {
            return Err(LseError::InvalidValue(format!(
                "Only scalar targets are supported, got output dimension {dim_out}"
            )));
        }
        if inputs.len() != dim_in * n_points || targets.len() != n_points {
            return Err(LseError::InvalidValue(format!(
                "Flat buffers of lengths ({}, {}) do not match {} points of dimension {}",
                inputs.len(),
                targets.len(),
                n_points,
                dim_in
            )));
        }
        let xs = Array2::from_shape_fn((n_points, dim_in), |(i, c)| inputs[i + c * n_points]);
        let ys = Array1::from_vec(targets.to_vec());
        Self::new(&xs, &ys)
    }

    /// Number of candidate points
    pub fn n_points(&self) -> usize {
        self.targets.len()
    }

    /// Input space dimension
    pub fn dim(&self) -> usize {
        self.inputs.ncols()
    }

    /// All candidate points (n_points, dim)
    pub fn inputs(&self) -> ArrayView2<f64> {
        self.inputs.view()
    }

    /// Candidate point `index`
    pub fn input(&self, index: usize) -> ArrayView1<f64> {
        self.inputs.row(index)
    }

    /// All targets (n_points,)
    pub fn targets(&self) -> ArrayView1<f64> {
        self.targets.view()
    }

    /// Target of point `index`
    pub fn target(&self, index: usize) -> f64 {
        self.targets[index]
    }

    /// Active flags of all points
    pub fn active(&self) -> &[bool] {
        &self.active
    }

    /// Whether point `index` is active
    pub fn is_active(&self, index: usize) -> bool {
        self.active[index]
    }

    /// Number of active points
    pub fn n_active(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Flag point `index` as active
    pub fn activate(&mut self, index: usize) -> Result<()> {
        let n_points = self.n_points();
        match self.active.get_mut(index) {
            None => Err(LseError::InvalidValue(format!(
                "Point index {index} out of range (nb points = {n_points})"
            ))),
            Some(flag) if *flag => Err(LseError::InvalidValue(format!(
                "Point {index} is already active"
            ))),
            Some(flag) => {
                *flag = true;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pool_from_arrays() {
        let pool = CandidatePool::new(&array![[0., 0.], [1., 0.], [0., 1.]], &array![1., 2., 3.])
            .unwrap();
        assert_eq!(pool.n_points(), 3);
        assert_eq!(pool.dim(), 2);
        assert_abs_diff_eq!(pool.input(1), array![1., 0.]);
        assert_abs_diff_eq!(pool.target(2), 3.);
        assert_eq!(pool.n_active(), 0);
    }

    #[test]
    fn test_pool_from_flat_buffers() {
        // components stored one after the other
        let inputs = [0., 1., 2., 10., 11., 12.];
        let targets = [5., 6., 7.];
        let pool = CandidatePool::from_flat(&inputs, &targets, 2, 1, 3).unwrap();
        assert_abs_diff_eq!(pool.inputs(), array![[0., 10.], [1., 11.], [2., 12.]]);
        assert_abs_diff_eq!(pool.targets(), array![5., 6., 7.]);
    }

    #[test]
    fn test_pool_rejects_bad_shapes() {
        assert!(CandidatePool::new(&array![[0.], [1.]], &array![1.]).is_err());
        assert!(CandidatePool::new(&Array2::<f64>::zeros((0, 2)), &Array1::zeros(0)).is_err());
        assert!(CandidatePool::from_flat(&[0., 1.], &[1., 2.], 1, 2, 2).is_err());
        assert!(CandidatePool::from_flat(&[0., 1.], &[1.], 1, 1, 2).is_err());
    }

    #[test]
    fn test_activate() {
        let mut pool = CandidatePool::new(&array![[0.], [1.]], &array![1., 2.]).unwrap();
        pool.activate(1).unwrap();
        assert!(pool.is_active(1));
        assert!(!pool.is_active(0));
        assert_eq!(pool.active(), &[false, true]);
        assert!(matches!(pool.activate(1), Err(LseError::InvalidValue(_))));
        assert!(matches!(pool.activate(2), Err(LseError::InvalidValue(_))));
        assert_eq!(pool.n_active(), 1);
    }
}
