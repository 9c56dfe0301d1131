use anyhow::Result;
use clap::Parser;
use log::info;
use lsebox_lse::{
    save_selection, select_from_grid, GridSpec, InstantStopwatch, LseConfig, SolverKind,
};
use std::path::PathBuf;

/// Select an active set of grid points for gaussian process level set estimation.
///
/// Targets are read from a csv file of `depth` blocks of `height` lines of `width`
/// comma separated values. Active points, targets and weights are written as
/// inputs.csv, targets.csv and alpha.csv in the output directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grid csv file
    csv: PathBuf,
    /// Number of values per line
    #[arg(long)]
    width: usize,
    /// Number of lines per depth block
    #[arg(long)]
    height: usize,
    /// Number of depth blocks
    #[arg(long, default_value_t = 1)]
    depth: usize,
    /// Use the depth coordinate as third input component
    #[arg(long)]
    store_depth: bool,
    /// Json configuration file, overridden by the options below
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Maximum number of active points
    #[arg(short = 'n', long)]
    set_size: Option<usize>,
    /// Kernel bandwidth
    #[arg(long)]
    sigma: Option<f64>,
    /// Observation noise added to the kernel matrix diagonal
    #[arg(long)]
    beta: Option<f64>,
    /// Level the targets are compared to
    #[arg(long, allow_hyphen_values = true)]
    level: Option<f64>,
    /// Classification tolerance in ]0, 1[
    #[arg(short, long)]
    tolerance: Option<f64>,
    /// Number of candidates predicted together
    #[arg(short, long)]
    batch_size: Option<usize>,
    /// Linear solver: cholesky or cg
    #[arg(long)]
    solver: Option<SolverKind>,
    /// Conjugate gradient threshold on the squared residual, the tolerance by default
    #[arg(long)]
    cg_tolerance: Option<f64>,
    /// Random generator seed
    #[arg(long)]
    seed: Option<u64>,
    /// Output directory
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,
    /// Also save a json report of the run in the output directory
    #[arg(long)]
    report: bool,
}

impl Args {
    fn lse_config(&self) -> Result<LseConfig> {
        let mut config = match &self.config {
            Some(path) => LseConfig::from_json_file(path)?,
            None => LseConfig::default(),
        };
        if let Some(v) = self.set_size {
            config = config.max_size(v);
        }
        if let Some(v) = self.sigma {
            config = config.sigma(v);
        }
        if let Some(v) = self.beta {
            config = config.beta(v);
        }
        if let Some(v) = self.level {
            config = config.level(v);
        }
        if let Some(v) = self.tolerance {
            config = config.tolerance(v);
        }
        if let Some(v) = self.batch_size {
            config = config.batch_size(v);
        }
        if let Some(v) = self.solver {
            config = config.solver(v);
        }
        if let Some(v) = self.cg_tolerance {
            config = config.cg_tolerance(v);
        }
        if let Some(v) = self.seed {
            config = config.seed(v);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.lse_config()?.check()?;
    let grid = GridSpec::new(args.width, args.height)
        .depth(args.depth)
        .store_depth(args.store_depth);

    let result = select_from_grid(
        &args.csv,
        &grid,
        config.clone(),
        Some(Box::new(InstantStopwatch::new())),
    )?;
    save_selection(&args.outdir, &result, args.report.then_some(&config))?;

    if let Some(elapsed) = result.elapsed {
        info!("Selection done in {:.3} sec", elapsed.as_secs_f64());
    }
    println!("Active set size: {}", result.n_active());
    println!("Mean error: {}", result.errors.mean);
    println!("Std error: {}", result.errors.std);
    println!("Median error: {}", result.errors.median);
    println!("Min error: {}", result.errors.min);
    println!("Max error: {}", result.errors.max);
    Ok(())
}
