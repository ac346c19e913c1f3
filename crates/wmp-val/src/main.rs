use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    summarize::{self, SummarizeArgs},
    validate::{self, ValidateArgs},
};
use tracing::Level;

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "wmp-val",
    about = "Validate windowed multipole libraries against pointwise reference data"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Emit newline-delimited JSON log lines.
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare every multipole library against its reference and write reports.
    Validate(ValidateArgs),
    /// Write the library metadata table.
    Summarize(SummarizeArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    logging::init_tracing(cli.json_logs, level);
    match cli.command {
        Command::Validate(args) => validate::run(&args),
        Command::Summarize(args) => summarize::run(&args),
    }
}
