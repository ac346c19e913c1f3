use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};
use wmp_check::{load_config, run_batch, BatchPaths, NuclideOutcome, ValidationConfig};

use super::ctime;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory of multipole libraries.
    #[arg(short = 'w', long, default_value = "../WMP_Library")]
    pub wmp_directory: PathBuf,
    /// Validate a single multipole library instead of a directory.
    #[arg(short = 'f', long)]
    pub wmp_file: Option<PathBuf>,
    /// Directory of pointwise reference files named `<nuclide>.json`.
    #[arg(short = 'a', long, default_value = "../../njoy_293.75K")]
    pub ace_directory: PathBuf,
    /// Directory for reports, plots and the batch index.
    #[arg(short = 'o', long, default_value = "../WMP_Validation")]
    pub out_directory: PathBuf,
    /// Comparison temperature in kelvin [default: 293.75].
    #[arg(short = 't', long)]
    pub temperature: Option<f64>,
    /// YAML file with validation settings; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Energy grid size.
    #[arg(long)]
    pub points: Option<usize>,
    /// Absolute error (b) at or below which relative error is ignored.
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Skip plot rendering.
    #[arg(long)]
    pub no_plots: bool,
}

fn effective_config(args: &ValidateArgs) -> Result<ValidationConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ValidationConfig::default(),
    };
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(points) = args.points {
        config.grid_points = points;
    }
    if let Some(threshold) = args.threshold {
        config.abs_threshold = threshold;
    }
    if args.no_plots {
        config.plots = false;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let config = effective_config(args)?;
    let paths = BatchPaths::resolve(
        &args.wmp_directory,
        args.wmp_file.as_deref(),
        &args.ace_directory,
        &args.out_directory,
    )?;

    println!(
        "Start validating {} nuclides - {}",
        paths.libraries.len(),
        ctime()
    );
    info!(
        temperature = config.temperature,
        label = %config.temperature_label(),
        grid_points = config.grid_points,
        "batch configured"
    );
    let summary = run_batch(&paths, &config)?;
    for outcome in &summary.outcomes {
        match outcome {
            NuclideOutcome::Complete { nuclide, report, .. } => {
                println!("{nuclide}: {}", report.display());
            }
            NuclideOutcome::Failed(failure) => {
                warn!(nuclide = %failure.nuclide, "skipped");
                println!("{failure}");
            }
        }
    }
    println!(
        "{} completed, {} failed; index at {}",
        summary.completed,
        summary.failed,
        summary.index_path.display()
    );
    println!("Done! - {}", ctime());
    Ok(())
}
