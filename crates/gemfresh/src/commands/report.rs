//! The `report` command: parse a lockfile, fetch version metadata for every
//! direct dependency, analyze, and render.

use std::collections::HashMap;
use std::fmt::Write;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use gemfresh_analyzer::{RiskSummary, VersionHistory, analyze};
use gemfresh_lockfile::SourceKind;
use miette::{Context, IntoDiagnostic, Result};
use tracing::{info, warn};

use crate::cache::ResponseCache;
use crate::client::{RubyGemsClient, releases_from_rows};
use crate::reporters::{ConsoleReporter, CsvReporter, JsonReporter, Reporter, TableReporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Verbose per-gem blocks
    Console,
    /// Outdated gems only, one line each
    Table,
    /// One CSV row per gem
    Csv,
    /// The full report as a JSON document
    Json,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Path to the Gemfile.lock to analyze
    pub lockfile: PathBuf,

    /// Ignore releases published after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for cached registry responses
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Always hit the registry, ignoring cached responses
    #[arg(long)]
    pub no_cache: bool,
}

pub async fn run(args: ReportArgs) -> Result<()> {
    let text = fs::read_to_string(&args.lockfile)
        .into_diagnostic()
        .wrap_err_with(|| format!("could not read lockfile at {}", args.lockfile.display()))?;

    let lockfile = gemfresh_lockfile::parse(&text);
    let names = lockfile.direct_dependency_names();
    info!(
        dependencies = names.len(),
        lockfile = %args.lockfile.display(),
        "analyzing direct dependencies"
    );

    let cache = (!args.no_cache).then(|| {
        let root = args
            .cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("gemfresh"));
        ResponseCache::new(root)
    });
    let client = RubyGemsClient::new(cache).into_diagnostic()?;

    let mut histories: HashMap<String, VersionHistory> = HashMap::new();
    for &name in &names {
        let Some((source, _)) = lockfile.find_spec(name) else {
            continue;
        };
        if source.kind != SourceKind::Rubygems {
            continue;
        }
        let Some(remote) = source.remote else {
            continue;
        };
        match client.fetch_versions(remote, name).await {
            Ok(rows) => {
                let releases = releases_from_rows(name, rows);
                histories.insert(
                    name.to_string(),
                    VersionHistory::build(releases, args.as_of),
                );
            }
            // Leave the gem without a history; the analyzer will report it
            // as metadata_unavailable rather than aborting the whole run.
            Err(err) => warn!(gem = name, "could not fetch version metadata: {err}"),
        }
    }

    let report = analyze(&lockfile, &names, &histories, args.as_of);

    let reporter: &dyn Reporter = match args.format {
        OutputFormat::Console => &ConsoleReporter,
        OutputFormat::Table => &TableReporter,
        OutputFormat::Csv => &CsvReporter,
        OutputFormat::Json => &JsonReporter,
    };

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("could not create {}", path.display()))?;
            reporter.generate(&report, &mut file).into_diagnostic()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            reporter.generate(&report, &mut out).into_diagnostic()?;
        }
    }

    // The summary goes to stdout even when the report itself went to a file.
    // JSON output already embeds the risk block and stays a single document.
    if args.format != OutputFormat::Json {
        print!("{}", summary_text(&report.risk));
    }
    Ok(())
}

fn summary_text(risk: &RiskSummary) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Rated gems: {} (low {}, moderate {}, high {}, very high {})",
        risk.rated, risk.low, risk.moderate, risk.high, risk.very_high
    );
    let _ = writeln!(
        text,
        "Moderate or worse: {:.1}%  High or worse: {:.1}%  Very high: {:.1}%",
        risk.cumulative_moderate_pct, risk.cumulative_high_pct, risk.cumulative_very_high_pct
    );
    let _ = writeln!(text, "Star rating: {}/5", risk.stars);
    text
}
