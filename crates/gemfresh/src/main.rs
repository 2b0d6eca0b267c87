use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod cache;
mod client;
mod commands;
mod reporters;

use commands::report::{self, ReportArgs};

#[derive(Parser)]
#[command(
    name = "gemfresh",
    version,
    about = "Dependency freshness and risk reports for Gemfile.lock"
)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a lockfile and report how far behind its dependencies are
    Report(ReportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.verbosity.tracing_level_filter().to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report(args) => report::run(args).await,
    }
}
