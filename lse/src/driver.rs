use crate::config::ValidLseConfig;
use crate::errors::Result;
use crate::grid::{read_grid_csv, write_csv, GridSpec};
use crate::report::{SelectionReport, REPORT_FILE};
use crate::selector::{ActiveSetSelector, SelectionResult};
use crate::stopwatch::Stopwatch;

use log::info;
use ndarray::Axis;
use std::path::Path;

/// File name of the active points output
pub const INPUTS_FILE: &str = "inputs.csv";
/// File name of the active targets output
pub const TARGETS_FILE: &str = "targets.csv";
/// File name of the weights output
pub const ALPHA_FILE: &str = "alpha.csv";

/// Run an active set selection over the points of a grid csv file.
pub fn select_from_grid<P: AsRef<Path>>(
    csv_path: P,
    grid: &GridSpec,
    config: ValidLseConfig,
    stopwatch: Option<Box<dyn Stopwatch>>,
) -> Result<SelectionResult> {
    let mut pool = read_grid_csv(&csv_path, grid)?;
    let selector = ActiveSetSelector::new(config, &mut pool)?;
    info!(
        "{} candidate points read from {} ({}x{}x{} grid)",
        selector.pool().n_points(),
        csv_path.as_ref().display(),
        grid.width,
        grid.height,
        grid.depth
    );
    let selector = match stopwatch {
        Some(sw) => selector.stopwatch(sw),
        None => selector,
    };
    selector.run()
}

/// Write active inputs, targets and weights of `result` as csv files in `outdir`,
/// one line per active point, and the json report when `config` is given.
pub fn save_selection<P: AsRef<Path>>(
    outdir: P,
    result: &SelectionResult,
    config: Option<&ValidLseConfig>,
) -> Result<()> {
    let outdir = outdir.as_ref();
    std::fs::create_dir_all(outdir)?;
    write_csv(outdir.join(INPUTS_FILE), &result.active_inputs)?;
    write_csv(
        outdir.join(TARGETS_FILE),
        &result.active_targets.view().insert_axis(Axis(1)),
    )?;
    write_csv(
        outdir.join(ALPHA_FILE),
        &result.alpha.view().insert_axis(Axis(1)),
    )?;
    if let Some(config) = config {
        SelectionReport::new(config.clone().into(), result).save(outdir.join(REPORT_FILE))?;
    }
    info!("Selection saved in {}", outdir.display());
    Ok(())
}
