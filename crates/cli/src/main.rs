use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use peloton_core::{
    Document, FetchConfig, HttpFetcher, all_stage_results, fetch_file, fetch_stdin, fetch_url, one_day_results,
    race_calendar, rider_career, rider_career_by_season, rider_list, rider_seasons, rider_year_results, stage_list,
    stage_results, stage_results_by_stage, team_list,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract cycling race, rider and result tables as JSON
#[derive(Parser, Debug)]
#[command(name = "peloton")]
#[command(author = "Peloton Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Extract cycling race, rider and result tables as JSON", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output file (default: stdout)
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Delay between consecutive requests in milliseconds
    #[arg(long, global = true, default_value = "1000", value_name = "MS")]
    delay: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Page and driver commands. INPUT is a URL, a saved HTML file, or "-" for stdin.
#[derive(Subcommand, Debug)]
enum Command {
    /// Stage list of a stage race overview page
    Stages { input: String },
    /// Results of one stage of a stage race
    StageResults { input: String },
    /// Results of a one-day race
    OneDay { input: String },
    /// Season race calendar
    Races { input: String },
    /// Teams page, grouped by tier
    Teams { input: String },
    /// Rider list, e.g. a team roster
    Riders { input: String },
    /// One season of a rider's results
    RiderYear {
        input: String,
        /// Season the page belongs to
        #[arg(long)]
        year: u16,
    },
    /// Season years listed on a rider page
    Seasons { input: String },
    /// A rider's whole career, fetching every season page
    Career {
        /// Rider page URL
        url: String,
        /// Report each season separately instead of failing on the first error
        #[arg(long)]
        by_season: bool,
    },
    /// Results of every stage of a stage race
    StageRace {
        /// Stage race overview page URL
        url: String,
        /// Report each stage separately instead of failing on the first error
        #[arg(long)]
        by_stage: bool,
    },
}

/// Per-unit output of the multi-page commands.
#[derive(Serialize)]
struct UnitReport<K: Serialize, T: Serialize> {
    unit: K,
    results: Option<T>,
    error: Option<String>,
}

impl<K: Serialize, T: Serialize> UnitReport<K, T> {
    fn new(unit: K, outcome: &peloton_core::Result<T>) -> Self
    where
        T: Clone,
    {
        match outcome {
            Ok(results) => Self { unit, results: Some(results.clone()), error: None },
            Err(e) => {
                echo::print_warning(&e.to_string());
                Self { unit, results: None, error: Some(e.to_string()) }
            }
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "peloton_core=debug,peloton=debug" } else { "error" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Reads one page from a URL, a file, or stdin.
async fn load_page(input: &str, config: &FetchConfig, verbose: bool) -> anyhow::Result<String> {
    let html = if input == "-" {
        if verbose {
            echo::print_step(1, 2, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if is_url(input) {
        if verbose {
            echo::print_step(1, 2, &format!("Fetching from {}", input.bright_white().underline()));
        }
        fetch_url(input, config).await.context("Failed to fetch URL")?
    } else {
        if verbose {
            echo::print_step(1, 2, &format!("Reading from file {}", input.bright_white()));
        }
        fetch_file(input).with_context(|| format!("Failed to read file: {}", input))?
    };

    if verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
    }
    Ok(html)
}

/// Loads one page and runs a single-page extractor over it.
async fn extract_page<T: Serialize>(
    input: &str, config: &FetchConfig, verbose: bool, extract: impl FnOnce(&Document) -> peloton_core::Result<T>,
) -> anyhow::Result<Value> {
    let html = load_page(input, config, verbose).await?;

    if verbose {
        echo::print_step(2, 2, "Extracting records");
    }
    let doc = Document::parse(&html).context("Failed to parse HTML")?;
    let records = extract(&doc).context("Failed to extract records")?;

    Ok(serde_json::to_value(records)?)
}

fn require_url(url: &str) -> anyhow::Result<()> {
    if is_url(url) {
        Ok(())
    } else {
        anyhow::bail!("Multi-page commands need an http:// or https:// URL, got {}", url)
    }
}

async fn run(command: &Command, config: &FetchConfig, verbose: bool) -> anyhow::Result<Value> {
    match command {
        Command::Stages { input } => extract_page(input, config, verbose, stage_list).await,
        Command::StageResults { input } => extract_page(input, config, verbose, stage_results).await,
        Command::OneDay { input } => extract_page(input, config, verbose, one_day_results).await,
        Command::Races { input } => extract_page(input, config, verbose, race_calendar).await,
        Command::Teams { input } => extract_page(input, config, verbose, team_list).await,
        Command::Riders { input } => extract_page(input, config, verbose, rider_list).await,
        Command::RiderYear { input, year } => {
            extract_page(input, config, verbose, |doc| rider_year_results(doc, *year)).await
        }
        Command::Seasons { input } => extract_page(input, config, verbose, rider_seasons).await,
        Command::Career { url, by_season } => {
            require_url(url)?;
            let fetcher = HttpFetcher::new(config.clone()).context("Failed to build HTTP client")?;

            if *by_season {
                let seasons = rider_career_by_season(&fetcher, url).await.context("Failed to read rider page")?;
                let reports: Vec<_> = seasons.iter().map(|s| UnitReport::new(s.year, &s.results)).collect();
                if verbose {
                    let failed = reports.iter().filter(|r| r.failed()).count();
                    echo::print_units_summary("Seasons", reports.len() - failed, failed);
                }
                Ok(serde_json::to_value(reports)?)
            } else {
                let career = rider_career(&fetcher, url).await.context("Failed to extract rider career")?;
                Ok(serde_json::to_value(career)?)
            }
        }
        Command::StageRace { url, by_stage } => {
            require_url(url)?;
            let fetcher = HttpFetcher::new(config.clone()).context("Failed to build HTTP client")?;

            if *by_stage {
                let stages = stage_results_by_stage(&fetcher, url).await.context("Failed to read overview page")?;
                let reports: Vec<_> =
                    stages.iter().map(|s| UnitReport::new(&s.stage.stage_name, &s.results)).collect();
                if verbose {
                    let failed = reports.iter().filter(|r| r.failed()).count();
                    echo::print_units_summary("Stages", reports.len() - failed, failed);
                }
                Ok(serde_json::to_value(reports)?)
            } else {
                let tables = all_stage_results(&fetcher, url).await.context("Failed to extract stage results")?;
                Ok(serde_json::to_value(tables)?)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let mut builder = FetchConfig::builder().timeout(args.timeout).request_delay_ms(args.delay);
    if let Some(user_agent) = &args.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }
    let config = builder.build();
    tracing::debug!(?config, "fetch configuration");

    let value = run(&args.command, &config, args.verbose).await?;
    let output = if args.pretty { serde_json::to_string_pretty(&value)? } else { serde_json::to_string(&value)? };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
