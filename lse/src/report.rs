use crate::config::LseConfig;
use crate::errors::Result;
use crate::metrics::PredictionError;
use crate::selector::{RoundRecord, SelectionResult};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default file name of the selection report
pub const REPORT_FILE: &str = "selection_report.json";

/// Json summary of a selection run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SelectionReport {
    /// Producer name and version
    pub code_reference: String,
    /// Configuration of the run
    pub config: LseConfig,
    /// Number of candidate points
    pub n_points: usize,
    /// Candidate indices of active points in activation order
    pub active_indices: Vec<usize>,
    /// Active points, one vector per point
    pub active_inputs: Vec<Vec<f64>>,
    /// Targets at active points
    pub active_targets: Vec<f64>,
    /// Gaussian process weights
    pub alpha: Vec<f64>,
    /// Number of points classified upper
    pub n_upper: usize,
    /// Number of points classified lower
    pub n_lower: usize,
    /// Prediction errors over never activated points
    pub errors: PredictionError,
    /// Per round summaries
    pub history: Vec<RoundRecord>,
    /// Run duration in seconds if timed
    pub elapsed_secs: Option<f64>,
}

impl SelectionReport {
    /// Build the report of `result` obtained with `config`
    pub fn new(config: LseConfig, result: &SelectionResult) -> Self {
        let version = env!("CARGO_PKG_VERSION");
        let name = env!("CARGO_PKG_NAME");
        SelectionReport {
            code_reference: format!("{name} {version}"),
            config,
            n_points: result.mu.len(),
            active_indices: result.active_indices.clone(),
            active_inputs: result
                .active_inputs
                .rows()
                .into_iter()
                .map(|row| row.to_vec())
                .collect(),
            active_targets: result.active_targets.to_vec(),
            alpha: result.alpha.to_vec(),
            n_upper: result.upper.iter().filter(|&&f| f).count(),
            n_lower: result.lower.iter().filter(|&&f| f).count(),
            errors: result.errors,
            history: result.history.clone(),
            elapsed_secs: result.elapsed.map(|d| d.as_secs_f64()),
        }
    }

    /// Save the report as pretty printed json
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let out_json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, out_json)?;
        Ok(())
    }

    /// Load a report saved with [`save`](Self::save)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(BufReader::new(file))?;
        Ok(report)
    }
}
