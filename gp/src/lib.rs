//! This library implements the [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process)
//! posterior computations needed to grow an active set of points in a level set estimation
//! procedure.
//!
//! The gaussian process uses a squared exponential kernel
//! `k(x, y) = exp(-|x - y|^2 / (2 * sigma))`, zero prior mean and is conditioned on the
//! points of an [ActiveSet] absorbed one at a time.
//! Weights `alpha` solving `(K + beta.I) alpha = y` are computed by a [LinearSolver]:
//! * [ConjugateGradientSolver], iterative,
//! * [CholeskySolver], direct, factorizing the system at each solve.
//!
//! Posterior mean and variance proxy at candidate points are computed by batches
//! with a [BatchPredictor].
//!
//! # Example
//!
//! ```
//! use lsebox_gp::{ActiveSet, BatchPredictor, CholeskySolver, GpParams, LinearSolver};
//! use linfa::ParamGuard;
//! use ndarray::array;
//!
//! let params = GpParams::new(1.0, 0.).check().expect("valid hyperparameters");
//! let mut active: ActiveSet<f64> = ActiveSet::new(1, 2, params);
//! active.absorb(0, &array![0.], 1.).expect("room for point");
//! active.absorb(3, &array![2.], -1.).expect("room for point");
//!
//! let mut solver = CholeskySolver::new();
//! solver.solve(&active.system_matrix().view(), &active.targets()).expect("SPD system");
//!
//! let xs = array![[0.], [1.], [2.]];
//! let (mu, _proxy) = BatchPredictor::default()
//!     .predict(&active, &solver, &xs)
//!     .expect("prediction");
//! assert!((mu[0] - 1.).abs() < 1e-8);
//! ```
mod active_set;
pub mod correlation_models;
mod errors;
mod parameters;
mod prediction;
pub mod solvers;

pub use active_set::*;
pub use errors::*;
pub use parameters::*;
pub use prediction::*;
pub use solvers::{CholeskySolver, ConjugateGradientSolver, LinearSolver};
