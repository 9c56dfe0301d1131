use crate::beta::confidence_beta;
use crate::classification::{classify_and_select, ClassificationStore, LevelRule, PointStatus};
use crate::config::{SolverKind, ValidLseConfig};
use crate::errors::{LseError, Result};
use crate::metrics::{evaluate_errors, PredictionError};
use crate::pool::CandidatePool;
use crate::stopwatch::Stopwatch;
use crate::LSEBOX_LOG;

use env_logger::{Builder, Env};
use linfa::ParamGuard;
use log::{debug, info, warn};
use lsebox_gp::{
    ActiveSet, BatchPredictor, CholeskySolver, ConjugateGradientSolver, GpParams, LinearSolver,
};
use ndarray::{s, Array1, Array2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Stage of a selection run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No point active yet
    Seed,
    /// Growing the active set
    Round,
    /// Active set complete, final predictions pending
    Finalize,
    /// Run over
    Done,
}

/// Summary of one selection round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number, starting at 1
    pub round: usize,
    /// Point activated at the end of the round, none when nothing was ambiguous
    pub selected: Option<usize>,
    /// Active set size at the end of the round
    pub active_size: usize,
    /// Confidence schedule value used to classify during the round
    pub beta: f64,
    /// Total number of points classified upper
    pub n_upper: usize,
    /// Total number of points classified lower
    pub n_lower: usize,
    /// Number of points found ambiguous during the round
    pub n_ambiguous: usize,
}

/// Outcome of a selection run
#[derive(Clone, Debug)]
pub struct SelectionResult {
    /// Candidate pool indices of the active points in activation order
    pub active_indices: Vec<usize>,
    /// Active points (k, dim)
    pub active_inputs: Array2<f64>,
    /// Targets at active points (k,)
    pub active_targets: Array1<f64>,
    /// Gaussian process weights solving `(K + beta.I) alpha = active_targets`
    pub alpha: Array1<f64>,
    /// Final posterior mean at every candidate point
    pub mu: Array1<f64>,
    /// Final variance proxy at every candidate point
    pub variance: Array1<f64>,
    /// Upper classification flags
    pub upper: Vec<bool>,
    /// Lower classification flags
    pub lower: Vec<bool>,
    /// Absolute prediction errors over never activated points
    pub errors: PredictionError,
    /// Per round summaries
    pub history: Vec<RoundRecord>,
    /// Solver used by the run
    pub solver: SolverKind,
    /// Run duration when a stopwatch was given
    pub elapsed: Option<Duration>,
}

impl SelectionResult {
    /// Number of active points
    pub fn n_active(&self) -> usize {
        self.active_indices.len()
    }

    /// Status of candidate point `index`
    pub fn status(&self, index: usize) -> PointStatus {
        if self.active_indices.contains(&index) {
            PointStatus::Active
        } else if self.upper[index] {
            PointStatus::Upper
        } else if self.lower[index] {
            PointStatus::Lower
        } else {
            PointStatus::Unclassified
        }
    }
}

/// Active set selector for level set estimation.
///
/// Starting from a random seed point, each round predicts the posterior at the
/// inactive unclassified candidates, classifies them against the level and activates
/// the widest ambiguous one, until the active set is full or nothing is ambiguous.
///
/// A run goes through the phases `Seed -> Round* -> Finalize -> Done`, either
/// step by step with [`seed`](Self::seed), [`round`](Self::round) and
/// [`finalize`](Self::finalize) or at once with [`run`](Self::run).
pub struct ActiveSetSelector<'a> {
    config: ValidLseConfig,
    pool: &'a mut CandidatePool,
    max_size: usize,
    active_set: ActiveSet<f64>,
    classes: ClassificationStore,
    solver: Box<dyn LinearSolver<f64>>,
    /// Scratch (max_size, max_size) buffer for the system matrix
    system: Array2<f64>,
    predictor: BatchPredictor,
    mu: Array1<f64>,
    proxy: Array1<f64>,
    beta: f64,
    round: usize,
    phase: Phase,
    history: Vec<RoundRecord>,
    rng: Xoshiro256Plus,
    stopwatch: Option<Box<dyn Stopwatch>>,
}

impl<'a> ActiveSetSelector<'a> {
    /// Constructor of a selection run over the candidate `pool` which should have no active point.
    ///
    /// The requested active set size is clamped to the number of candidates.
    pub fn new(config: ValidLseConfig, pool: &'a mut CandidatePool) -> Result<Self> {
        let env = Env::new().filter_or(LSEBOX_LOG, "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        if pool.n_active() > 0 {
            return Err(LseError::InvalidValue(format!(
                "Candidate pool already has {} active points",
                pool.n_active()
            )));
        }
        let n_points = pool.n_points();
        let max_size = if config.max_size() > n_points {
            warn!(
                "Active set size {} clamped to the number of candidates {}",
                config.max_size(),
                n_points
            );
            n_points
        } else {
            config.max_size()
        };

        let params = GpParams::new(config.sigma(), config.beta()).check()?;
        let solver: Box<dyn LinearSolver<f64>> = match config.solver() {
            SolverKind::Cholesky => Box::new(CholeskySolver::new()),
            SolverKind::ConjugateGradient => {
                Box::new(ConjugateGradientSolver::new(config.cg_tolerance()))
            }
        };
        let rng = if let Some(seed) = config.seed() {
            Xoshiro256Plus::seed_from_u64(seed)
        } else {
            Xoshiro256Plus::from_entropy()
        };

        Ok(ActiveSetSelector {
            max_size,
            active_set: ActiveSet::new(pool.dim(), max_size, params),
            classes: ClassificationStore::new(n_points),
            solver,
            system: Array2::zeros((max_size, max_size)),
            predictor: BatchPredictor::new(config.batch_size()),
            mu: Array1::zeros(n_points),
            proxy: Array1::zeros(n_points),
            beta: confidence_beta(n_points, config.tolerance(), 1),
            round: 0,
            phase: Phase::Seed,
            history: Vec::new(),
            rng,
            stopwatch: None,
            config,
            pool,
        })
    }

    /// Sets a stopwatch used to log stage timings
    pub fn stopwatch(mut self, stopwatch: Box<dyn Stopwatch>) -> Self {
        self.stopwatch = Some(stopwatch);
        self
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Active set size limit after clamping
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Current active set
    pub fn active_set(&self) -> &ActiveSet<f64> {
        &self.active_set
    }

    /// Current classification flags
    pub fn classification(&self) -> &ClassificationStore {
        &self.classes
    }

    /// Candidate pool
    pub fn pool(&self) -> &CandidatePool {
        &*self.pool
    }

    /// Weights of the last solve
    pub fn alpha(&self) -> Array1<f64> {
        self.solver.alpha().to_owned()
    }

    /// Confidence schedule value for the next round
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Number of rounds done
    pub fn n_rounds(&self) -> usize {
        self.round
    }

    /// Per round summaries so far
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// Status of candidate point `index`
    pub fn status(&self, index: usize) -> PointStatus {
        self.classes.status(self.pool, index)
    }

    /// Status of every candidate point
    pub fn statuses(&self) -> Vec<PointStatus> {
        (0..self.pool.n_points()).map(|i| self.status(i)).collect()
    }

    /// Activate a uniformly drawn candidate and solve the initial system.
    ///
    /// Returns the index of the seed point.
    pub fn seed(&mut self) -> Result<usize> {
        if self.phase != Phase::Seed {
            return Err(LseError::InvalidValue("seed point already selected".to_string()));
        }
        let index = self.rng.gen_range(0..self.pool.n_points());
        self.activate(index)?;
        self.checkpoint("seed");
        info!(
            "Seed point {} selected, {} solver, beta = {}",
            index,
            self.solver.name(),
            self.beta
        );
        self.phase = if self.active_set.len() < self.max_size {
            Phase::Round
        } else {
            Phase::Finalize
        };
        Ok(index)
    }

    /// Run one selection round.
    ///
    /// Returns whether another round may follow. Calling it once the active set
    /// is complete does nothing and returns `false`.
    pub fn round(&mut self) -> Result<bool> {
        match self.phase {
            Phase::Round => (),
            Phase::Seed => {
                return Err(LseError::InvalidValue(
                    "seed point has to be selected first".to_string(),
                ))
            }
            Phase::Finalize | Phase::Done => return Ok(false),
        }
        if self.active_set.len() >= self.max_size {
            self.phase = Phase::Finalize;
            return Ok(false);
        }
        let candidates = self.classes.unclassified(self.pool);
        if candidates.is_empty() {
            self.phase = Phase::Finalize;
            return Ok(false);
        }

        self.predictor.predict_into(
            &self.active_set,
            self.solver.as_ref(),
            &self.pool.inputs(),
            &candidates,
            &mut self.mu,
            &mut self.proxy,
        )?;
        self.checkpoint("prediction");

        let rule = LevelRule {
            level: self.config.level(),
            tolerance: self.config.tolerance(),
            beta: self.beta,
        };
        let selection =
            classify_and_select(self.pool, &mut self.classes, &self.mu, &self.proxy, &rule);
        self.checkpoint("classification");
        self.round += 1;

        let mut record = RoundRecord {
            round: self.round,
            selected: selection.next,
            active_size: self.active_set.len(),
            beta: self.beta,
            n_upper: self.classes.n_upper(),
            n_lower: self.classes.n_lower(),
            n_ambiguous: selection.n_ambiguous,
        };

        let next = match selection.next {
            Some(next) => next,
            None => {
                warn!(
                    "No ambiguous point left after {} rounds (active set size {})",
                    self.round,
                    self.active_set.len()
                );
                self.history.push(record);
                self.phase = Phase::Finalize;
                return Ok(false);
            }
        };
        self.activate(next)?;
        self.beta = confidence_beta(
            self.pool.n_points(),
            self.config.tolerance(),
            self.active_set.len(),
        );
        self.checkpoint("update");

        record.active_size = self.active_set.len();
        info!(
            "Round {}: point {} activated (size {}), upper={} lower={} ambiguous={} beta={:.4}",
            record.round,
            next,
            record.active_size,
            record.n_upper,
            record.n_lower,
            record.n_ambiguous,
            self.beta
        );
        self.history.push(record);

        if self.active_set.len() < self.max_size {
            Ok(true)
        } else {
            self.phase = Phase::Finalize;
            Ok(false)
        }
    }

    /// Predict at every candidate point with the final active set and compute
    /// prediction errors over never activated points.
    pub fn finalize(&mut self) -> Result<SelectionResult> {
        match self.phase {
            Phase::Seed => {
                return Err(LseError::InvalidValue(
                    "seed point has to be selected first".to_string(),
                ))
            }
            Phase::Done => {
                return Err(LseError::InvalidValue("run already finalized".to_string()))
            }
            Phase::Round | Phase::Finalize => (),
        }
        let all: Vec<usize> = (0..self.pool.n_points()).collect();
        self.predictor.predict_into(
            &self.active_set,
            self.solver.as_ref(),
            &self.pool.inputs(),
            &all,
            &mut self.mu,
            &mut self.proxy,
        )?;
        let errors = evaluate_errors(&self.mu, &self.pool.targets(), self.pool.active());
        self.checkpoint("final prediction");
        info!(
            "Active set of {} points, upper={} lower={}, errors: {}",
            self.active_set.len(),
            self.classes.n_upper(),
            self.classes.n_lower(),
            errors
        );
        self.phase = Phase::Done;

        Ok(SelectionResult {
            active_indices: self.active_set.indices().to_vec(),
            active_inputs: self.active_set.inputs().to_owned(),
            active_targets: self.active_set.targets().to_owned(),
            alpha: self.alpha(),
            mu: self.mu.clone(),
            variance: self.proxy.clone(),
            upper: self.classes.upper().to_vec(),
            lower: self.classes.lower().to_vec(),
            errors,
            history: self.history.clone(),
            solver: self.config.solver(),
            elapsed: self.stopwatch.as_ref().map(|sw| sw.elapsed()),
        })
    }

    /// Seed, run rounds until completion, then finalize
    pub fn run(mut self) -> Result<SelectionResult> {
        self.seed()?;
        while self.round()? {}
        self.finalize()
    }

    /// Move point `index` into the active set and solve the updated system
    fn activate(&mut self, index: usize) -> Result<()> {
        self.pool.activate(index)?;
        self.active_set
            .absorb(index, &self.pool.input(index), self.pool.target(index))?;
        let k = self.active_set.len();
        let mut system = self.system.slice_mut(s![..k, ..k]);
        self.active_set.write_system_matrix(&mut system)?;
        self.solver.solve(&system.view(), &self.active_set.targets())?;
        Ok(())
    }

    fn checkpoint(&mut self, stage: &str) {
        if let Some(sw) = self.stopwatch.as_mut() {
            debug!("{} time (sec): {:.6}", stage, sw.lap().as_secs_f64());
        }
    }
}
