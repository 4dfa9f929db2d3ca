use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lintrate_core::MonthBucket;
use lintrate_runner::{Config, Overrides, Runner};

/// Per-CA, per-lint monthly success rates from a lint result database.
#[derive(Parser, Debug)]
#[command(name = "lintrate", version)]
struct Cli {
    /// Result database (default: lint_results.db)
    store: Option<PathBuf>,

    /// Config file (default: ./lintrate.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the rate report (default: lint_report.json)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write the raw per-cell counts here
    #[arg(long)]
    counts: Option<PathBuf>,

    /// Also write a per-lint / per-CA error breakdown here
    #[arg(long)]
    error_summary: Option<PathBuf>,

    /// First month to report, YYYY-MM (default: earliest issuance date)
    #[arg(long)]
    from: Option<MonthBucket>,

    /// Last month to report, YYYY-MM (default: latest issuance date)
    #[arg(long)]
    to: Option<MonthBucket>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    let (cfg, origin) = Config::discover(cli.config.as_deref(), &cwd)?;
    let settings = cfg.resolve(
        Overrides {
            store: cli.store,
            output: cli.output,
            counts: cli.counts,
            error_summary: cli.error_summary,
            from: cli.from,
            to: cli.to,
        },
        origin.as_deref(),
    )?;

    println!("{}", settings.store.display());

    let runner = Runner::new(settings);
    let summary = runner
        .run()
        .with_context(|| format!("report from {}", runner.settings.store.display()))?;

    tracing::info!(
        output = %summary.output.display(),
        cas = summary.cas,
        lints = summary.lints,
        months = summary.months,
        cells = summary.cells,
        counted = summary.counted,
        out_of_range = summary.out_of_range,
        "report written"
    );
    if !summary.anomalies.is_empty() {
        eprintln!(
            "warning: skipped {} row(s) with malformed issuance dates ({} certificate(s)) and {} row(s) with unknown outcomes ({} certificate(s))",
            summary.anomalies.malformed_date_rows,
            summary.anomalies.malformed_date_certificates.len(),
            summary.anomalies.unknown_outcome_rows,
            summary.anomalies.unknown_outcome_certificates.len(),
        );
    }

    println!("Done");
    Ok(())
}
