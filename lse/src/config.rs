//! Active set selection configuration.
use crate::errors::{LseError, Result};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

/// Default threshold the target function is compared to
pub const DEFAULT_LEVEL: f64 = 0.;
/// Default classification tolerance (also used in the confidence schedule)
pub const DEFAULT_TOLERANCE: f64 = 1e-2;
/// Default number of candidate points predicted together
pub const DEFAULT_BATCH_SIZE: usize = lsebox_gp::DEFAULT_BATCH_SIZE;

/// Linear solver used to condition the gaussian process on the active set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Direct solve through a Cholesky factorization recomputed each round
    #[default]
    Cholesky,
    /// Iterative conjugate gradient solve
    ConjugateGradient,
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cholesky" | "chol" => Ok(SolverKind::Cholesky),
            "cg" | "conjugate-gradient" | "conjugategradient" => Ok(SolverKind::ConjugateGradient),
            _ => Err(format!("unknown solver '{s}', expected one of: cholesky, cg")),
        }
    }
}

impl std::fmt::Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SolverKind::Cholesky => write!(f, "cholesky"),
            SolverKind::ConjugateGradient => write!(f, "cg"),
        }
    }
}

/// Active set selection configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LseConfig {
    /// Maximum number of points in the active set, clamped to the number of candidates
    pub(crate) max_size: usize,
    /// Kernel bandwidth, used as is in `exp(-|x - y|^2 / (2 * sigma))`
    pub(crate) sigma: f64,
    /// Observation noise added to the kernel matrix diagonal when solving for alpha
    pub(crate) beta: f64,
    /// Threshold the target function is compared to
    pub(crate) level: f64,
    /// Classification slack, also drives the confidence schedule
    pub(crate) tolerance: f64,
    /// Number of candidates predicted together
    pub(crate) batch_size: usize,
    /// Linear solver
    pub(crate) solver: SolverKind,
    /// Convergence threshold of the conjugate gradient solver on the squared residual,
    /// the classification tolerance when not set
    pub(crate) cg_tolerance: Option<f64>,
    /// A random generator seed used to get reproducible seed point selection.
    pub(crate) seed: Option<u64>,
}

impl Default for LseConfig {
    fn default() -> Self {
        LseConfig {
            max_size: 100,
            sigma: 1.,
            beta: 0.,
            level: DEFAULT_LEVEL,
            tolerance: DEFAULT_TOLERANCE,
            batch_size: DEFAULT_BATCH_SIZE,
            solver: SolverKind::default(),
            cg_tolerance: None,
            seed: None,
        }
    }
}

impl LseConfig {
    /// Sets the maximum number of active points
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the kernel bandwidth
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Sets the observation noise
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the level to be estimated
    pub fn level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    /// Sets the classification tolerance, in ]0, 1[
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the prediction batch size
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the linear solver
    pub fn solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Sets a conjugate gradient convergence threshold distinct from the classification tolerance
    pub fn cg_tolerance(mut self, cg_tolerance: f64) -> Self {
        self.cg_tolerance = Some(cg_tolerance);
        self
    }

    /// Allow to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from a json file, missing fields taking default values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Save the configuration in a json file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Check configuration consistency
    pub fn check(self) -> Result<ValidLseConfig> {
        if self.max_size == 0 {
            return Err(LseError::InvalidConfigError("`max_size` should be at least 1".to_string()));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.) {
            return Err(LseError::InvalidConfigError(format!(
                "`sigma` should be strictly positive, got {}",
                self.sigma
            )));
        }
        if !(self.beta.is_finite() && self.beta >= 0.) {
            return Err(LseError::InvalidConfigError(format!(
                "`beta` should be positive, got {}",
                self.beta
            )));
        }
        if !self.level.is_finite() {
            return Err(LseError::InvalidConfigError(format!(
                "`level` should be finite, got {}",
                self.level
            )));
        }
        if !(self.tolerance > 0. && self.tolerance < 1.) {
            return Err(LseError::InvalidConfigError(format!(
                "`tolerance` should be in ]0, 1[, got {}",
                self.tolerance
            )));
        }
        if self.batch_size == 0 {
            return Err(LseError::InvalidConfigError(
                "`batch_size` should be at least 1".to_string(),
            ));
        }
        if let Some(cg_tolerance) = self.cg_tolerance {
            if !(cg_tolerance.is_finite() && cg_tolerance > 0.) {
                return Err(LseError::InvalidConfigError(format!(
                    "`cg_tolerance` should be strictly positive, got {}",
                    cg_tolerance
                )));
            }
        }
        Ok(ValidLseConfig(self))
    }
}

/// A checked [`LseConfig`]
#[derive(Clone, Debug, PartialEq)]
pub struct ValidLseConfig(LseConfig);

impl ValidLseConfig {
    /// Maximum number of active points
    pub fn max_size(&self) -> usize {
        self.0.max_size
    }

    /// Kernel bandwidth
    pub fn sigma(&self) -> f64 {
        self.0.sigma
    }

    /// Observation noise
    pub fn beta(&self) -> f64 {
        self.0.beta
    }

    /// Level to be estimated
    pub fn level(&self) -> f64 {
        self.0.level
    }

    /// Classification tolerance
    pub fn tolerance(&self) -> f64 {
        self.0.tolerance
    }

    /// Prediction batch size
    pub fn batch_size(&self) -> usize {
        self.0.batch_size
    }

    /// Linear solver
    pub fn solver(&self) -> SolverKind {
        self.0.solver
    }

    /// Conjugate gradient convergence threshold, defaults to the classification tolerance
    pub fn cg_tolerance(&self) -> f64 {
        self.0.cg_tolerance.unwrap_or(self.0.tolerance)
    }

    /// Random generator seed
    pub fn seed(&self) -> Option<u64> {
        self.0.seed
    }

    /// Unchecked configuration
    pub fn into_inner(self) -> LseConfig {
        self.0
    }
}

impl From<ValidLseConfig> for LseConfig {
    fn from(valid: ValidLseConfig) -> Self {
        valid.0
    }
}
