//! This library implements active set selection for level set estimation with
//! [Gaussian Processes](https://en.wikipedia.org/wiki/Gaussian_process).
//!
//! Given a pool of candidate points with known targets, it grows a small active set
//! the gaussian process is conditioned on so that every remaining point can be
//! classified as above or below a given level from its confidence interval
//! `mu -/+ sqrt(beta_k) * proxy`, where `beta_k` follows the schedule
//! `2 * ln(N * pi^2 * k^2 / (6 * tolerance))`.
//!
//! Each round:
//! * predicts the posterior at inactive unclassified candidates by batches,
//! * classifies them as upper, lower or ambiguous,
//! * activates the ambiguous candidate with the widest interval,
//! * solves the updated system with the configured linear solver.
//!
//! The run stops when the active set is full or no ambiguous point remains.
//!
//! # Example
//!
//! ```no_run
//! use lsebox_lse::{ActiveSetSelector, CandidatePool, LseConfig};
//! use ndarray::{Array1, Array2};
//!
//! let xs = Array2::from_shape_fn((100, 1), |(i, _)| i as f64 / 10.);
//! let ys: Array1<f64> = xs.column(0).mapv(|x| x.sin());
//! let mut pool = CandidatePool::new(&xs, &ys).expect("consistent pool");
//!
//! let config = LseConfig::default()
//!     .max_size(20)
//!     .sigma(0.5)
//!     .tolerance(0.05)
//!     .seed(42)
//!     .check()
//!     .expect("valid configuration");
//! let result = ActiveSetSelector::new(config, &mut pool)
//!     .expect("selector")
//!     .run()
//!     .expect("selection");
//! println!("{} active points, errors: {}", result.n_active(), result.errors);
//! ```
//!
//! # Logging
//!
//! Progress is logged with the `log` crate, the level being controlled by the
//! [LSEBOX_LOG] environment variable (default `info`).
mod beta;
mod classification;
mod config;
mod driver;
mod errors;
mod grid;
mod metrics;
mod pool;
mod report;
mod selector;
mod stopwatch;

pub use beta::*;
pub use classification::*;
pub use config::*;
pub use driver::*;
pub use errors::*;
pub use grid::*;
pub use metrics::*;
pub use pool::*;
pub use report::*;
pub use selector::*;
pub use stopwatch::*;

/// Env variable to enable logger
pub const LSEBOX_LOG: &str = "LSEBOX_LOG";
