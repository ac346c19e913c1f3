use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use tracing::warn;
use wmp_check::{summarize_directory, write_metadata_table};

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Directory of multipole libraries.
    #[arg(short = 'w', long, default_value = "../WMP_Library")]
    pub wmp_directory: PathBuf,
    /// Destination of the metadata table.
    #[arg(short = 'o', long, default_value = "../nuclides.md")]
    pub output: PathBuf,
}

pub fn run(args: &SummarizeArgs) -> Result<(), Box<dyn Error>> {
    if !args.wmp_directory.is_dir() {
        return Err(format!(
            "multipole library directory {} does not exist",
            args.wmp_directory.display()
        )
        .into());
    }
    let summary = summarize_directory(&args.wmp_directory)?;
    for (path, err) in &summary.skipped {
        warn!(path = %path.display(), error = %err, "not summarised");
    }
    write_metadata_table(&args.output, &summary.rows)?;
    println!(
        "Wrote {} rows to {}",
        summary.rows.len(),
        args.output.display()
    );
    Ok(())
}
