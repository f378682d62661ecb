//! Platter CLI binary.
//!
//! Each subcommand renders one dashboard page as a table or as JSON.

mod logging;
mod render;

use clap::{Parser, Subcommand, ValueEnum};
use logging::{LogFormat, init_logging};
use platter::data::Dataset;
use platter::output::{ExportFormat, Exporter, ReportBuilder, ScoredBrands};
use platter::scoring::{Normalization, Weights};
use platter::{Dashboard, Session};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "platter")]
#[command(about = "Platter: restaurant-brand scoring and marketplace unit economics", long_about = None)]
#[command(version)]
struct Cli {
    /// Workbook (.xlsx, .xlsm, .xls, .ods) or CSV export of the brand sheet
    #[arg(long, global = true)]
    workbook: Option<PathBuf>,

    /// Session file with assumption overrides (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Tables
    Text,
    /// Pretty-printed JSON
    Json,
    /// CSV rows (score, simulate and economics only)
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NormalizationArg {
    /// (x - min) / (max - min)
    MinMax,
    /// Percentile rank
    PercentRank,
}

impl From<NormalizationArg> for Normalization {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::MinMax => Self::MinMax,
            NormalizationArg::PercentRank => Self::PercentRank,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the loaded columns, fill counts and load issues
    Inspect {
        /// Join brands to the demographic sheet on this column
        #[arg(long, value_name = "COLUMN")]
        join_key: Option<String>,
    },

    /// Score, rank and tier every brand
    Score {
        /// Show only the top N brands
        #[arg(long)]
        top: Option<usize>,

        /// Write every scored brand to a file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Write a Markdown report with the tier summary and methodology
        #[arg(long)]
        report: Option<PathBuf>,

        /// Override a metric weight, e.g. trip_volume=40 (repeatable)
        #[arg(long = "weight", value_name = "METRIC=WEIGHT")]
        weights: Vec<String>,

        /// Normalization method
        #[arg(long, value_enum)]
        normalization: Option<NormalizationArg>,
    },

    /// Simulate per-tier fee changes
    Simulate {
        /// Show only the first N brands
        #[arg(long, default_value = "20")]
        top: usize,

        /// Write every simulated brand to a file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Write the revenue-maximizing fee per brand to a file
        #[arg(long)]
        recommendations: Option<PathBuf>,
    },

    /// Revenue before and after the simulation, by tier
    Impact,

    /// Unit economics, platform P&L and customer lifetime value
    Economics {
        /// Show only the first N brands
        #[arg(long, default_value = "20")]
        top: usize,

        /// Write per-brand unit economics to a file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Compounded growth projections
    Growth {
        /// Show only the first N brands
        #[arg(long, default_value = "20")]
        top: usize,

        /// Number of periods to compound over
        #[arg(long)]
        periods: Option<u32>,
    },

    /// Print the scoring and simulation methodology
    Methodology,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let mut session = Session::load(cli.config.as_deref())?;
    if let Commands::Score {
        weights,
        normalization,
        ..
    } = &cli.command
    {
        apply_scoring_overrides(&mut session, weights, *normalization)?;
    }
    if let Commands::Growth {
        periods: Some(periods),
        ..
    } = &cli.command
    {
        session.growth.periods = *periods;
    }
    session.validate()?;

    if let Commands::Methodology = cli.command {
        let dashboard = Dashboard::new(Dataset::default(), session);
        return match cli.format {
            OutputFormat::Json => render::json(&dashboard.methodology()),
            _ => {
                println!("{}", dashboard.methodology());
                Ok(())
            }
        };
    }

    let workbook = cli
        .workbook
        .as_deref()
        .ok_or("no workbook given; pass --workbook PATH")?;
    let dataset = Dataset::load(workbook, &session.load)?;
    let dashboard = Dashboard::new(dataset, session);
    let format = cli.format;

    match cli.command {
        Commands::Inspect { join_key } => {
            let mut overview = dashboard.overview();
            if let Some(key) = &join_key {
                overview.join = Some(dashboard.demographic_join(key)?);
            }
            match format {
                OutputFormat::Json => render::json(&overview)?,
                OutputFormat::Text => render::overview(&overview, workbook),
                OutputFormat::Csv => return Err(csv_unsupported("inspect")),
            }
        }
        Commands::Score {
            top,
            export,
            report,
            ..
        } => {
            let page = dashboard.merchant_scoring()?;
            let scored = ScoredBrands::new(&page.board, dashboard.dataset().enterprise_threshold);
            if let Some(path) = &export {
                export_to(&scored, path, format)?;
            }
            if let Some(path) = &report {
                ReportBuilder::new()
                    .title("Merchant Scoring")
                    .source(workbook.display().to_string())
                    .section("Tiers", page.summary.to_markdown())
                    .section("Methodology", dashboard.methodology())
                    .data(serde_json::to_value(&page.summary)?)
                    .build()?
                    .write_markdown(path)?;
                eprintln!("Report written to {}", path.display());
            }
            match format {
                OutputFormat::Json => render::json(&page)?,
                OutputFormat::Csv => {
                    let n = top.unwrap_or(scored.rows.len());
                    print!("{}", scored.truncated(n).export_to_string(ExportFormat::Csv)?);
                }
                OutputFormat::Text => render::scoring(&page, top.unwrap_or(25)),
            }
        }
        Commands::Simulate {
            top,
            export,
            recommendations,
        } => {
            let page = dashboard.fee_simulator()?;
            if let Some(path) = &export {
                export_to(page.simulation.rows.as_slice(), path, format)?;
            }
            if let Some(path) = &recommendations {
                export_to(page.recommendations.as_slice(), path, format)?;
            }
            match format {
                OutputFormat::Json => render::json(&page)?,
                OutputFormat::Csv => {
                    print!("{}", page.simulation.rows.export_to_string(ExportFormat::Csv)?);
                }
                OutputFormat::Text => render::simulation(&page, top),
            }
        }
        Commands::Impact => {
            let page = dashboard.revenue_impact()?;
            match format {
                OutputFormat::Json => render::json(&page)?,
                OutputFormat::Text => render::impact(&page),
                OutputFormat::Csv => return Err(csv_unsupported("impact")),
            }
        }
        Commands::Economics { top, export } => {
            let page = dashboard.unit_economics()?;
            if let Some(path) = &export {
                export_to(page.units.as_slice(), path, format)?;
            }
            match format {
                OutputFormat::Json => render::json(&page)?,
                OutputFormat::Csv => print!("{}", page.units.export_to_string(ExportFormat::Csv)?),
                OutputFormat::Text => render::economics(&page, top),
            }
        }
        Commands::Growth { top, .. } => {
            let projections = dashboard.growth()?;
            match format {
                OutputFormat::Json => render::json(&projections)?,
                OutputFormat::Text => render::growth(&projections, dashboard.session().growth.periods, top),
                OutputFormat::Csv => return Err(csv_unsupported("growth")),
            }
        }
        Commands::Methodology => {}
    }

    Ok(())
}

fn apply_scoring_overrides(
    session: &mut Session,
    pairs: &[String],
    normalization: Option<NormalizationArg>,
) -> Result<(), Box<dyn Error>> {
    for pair in pairs {
        let (metric, weight) = Weights::parse_pair(pair)?;
        session.scoring.weights.set(metric, weight);
    }
    if let Some(method) = normalization {
        session.scoring.normalization = method.into();
    }
    Ok(())
}

/// File format for `--export`: `--format csv|json` wins, otherwise the extension decides.
fn export_to<E: Exporter + ?Sized>(
    data: &E,
    path: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let file_format = match format {
        OutputFormat::Csv => ExportFormat::Csv,
        OutputFormat::Json => ExportFormat::PrettyJson,
        OutputFormat::Text => ExportFormat::from_path(path),
    };
    data.export_to_file(path, file_format)?;
    tracing::info!(path = %path.display(), format = file_format.extension(), "exported");
    eprintln!("Exported to {}", path.display());
    Ok(())
}

fn csv_unsupported(command: &str) -> Box<dyn Error> {
    format!("csv output is not available for '{command}'; use --format text or json").into()
}
