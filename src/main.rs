use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use oceanstat::data::datetime::format_timestamp;
use oceanstat::data::loader::{self, LoadOptions};
use oceanstat::processing::{annotate, compute_all_stats_with, compute_stats_with, moving_average};
use oceanstat::state::parameters::{infer_unit, label_for};
use oceanstat::{Dataset, EngineConfig};

#[derive(Parser)]
#[command(name = "oceanstat")]
#[command(about = "Summary statistics and anomaly detection for buoy data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Input {
    /// Input file (CSV, XLS or XLSX)
    #[arg(short, long)]
    input: PathBuf,

    /// Engine config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep only rows of this station ID
    #[arg(short, long)]
    station: Option<String>,

    /// First year to include
    #[arg(long)]
    from: Option<i32>,

    /// Last year to include
    #[arg(long)]
    to: Option<i32>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary statistics per field
    Stats {
        #[command(flatten)]
        input: Input,

        /// Fields to summarize (default: every numeric column)
        #[arg(short, long)]
        field: Vec<String>,
    },

    /// Trailing moving average of one field
    MovingAverage {
        #[command(flatten)]
        input: Input,

        #[arg(short, long)]
        field: String,

        /// Window size in samples (default: from config, 24)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Rows of one field classified as moderate or extreme
    Anomalies {
        #[command(flatten)]
        input: Input,

        #[arg(short, long)]
        field: String,

        /// Print every row, including normal ones
        #[arg(long)]
        all: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load(input: &Input, fields: &[String]) -> anyhow::Result<(EngineConfig, Dataset)> {
    let config = match &input.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let options = LoadOptions {
        sentinels: config.missing_sentinels.clone(),
        fields: fields.to_vec(),
        station: input.station.clone(),
        from_year: input.from,
        to_year: input.to,
    };
    let dataset = loader::load_file(&input.input, &options)
        .with_context(|| format!("failed to load {}", input.input.display()))?;
    Ok((config, dataset))
}

fn time_label(ts: Option<f64>, index: usize) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| format!("#{index}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Stats { input, field } => {
            let (config, dataset) = load(&input, &field)?;
            let stats = compute_all_stats_with(&dataset.rows, &dataset.fields, &config.analysis());

            if input.json {
                return print_json(&stats);
            }
            println!("{} ({} rows)", display_name(&input.input), dataset.len());
            for (key, summary) in &stats {
                print!("{}", summary.report(&label_for(key), &infer_unit(key)));
            }
        }
        Commands::MovingAverage { input, field, window } => {
            let (config, dataset) = load(&input, std::slice::from_ref(&field))?;
            let window = window.unwrap_or(config.moving_average_window);
            let averages = moving_average(&dataset.rows, &field, window);
            let values = dataset.column(&field);
            let times = dataset.timestamps();

            if input.json {
                let points: Vec<_> = times
                    .iter()
                    .zip(&values)
                    .zip(&averages)
                    .map(|((ts, value), avg)| {
                        serde_json::json!({
                            "timestamp": ts,
                            "value": value,
                            "average": avg,
                        })
                    })
                    .collect();
                return print_json(&points);
            }
            for (i, ((ts, value), avg)) in times.iter().zip(&values).zip(&averages).enumerate() {
                println!("{}\t{}\t{}", time_label(*ts, i), fmt_value(*value), fmt_value(*avg));
            }
        }
        Commands::Anomalies { input, field, all } => {
            let (config, dataset) = load(&input, std::slice::from_ref(&field))?;
            let analysis = config.analysis();
            let summary = compute_stats_with(&dataset.rows, &field, &analysis);

            let flagged: Vec<_> = annotate(&dataset.rows, &field, &summary, &analysis.bands)
                .into_iter()
                .filter(|p| all || p.severity.is_anomaly())
                .collect();

            if input.json {
                return print_json(&flagged);
            }
            println!(
                "{}: {} anomalies ({} moderate, {} extreme)",
                label_for(&field),
                summary.anomaly_count,
                summary.moderate_count,
                summary.extreme_count
            );
            for p in &flagged {
                println!(
                    "{}\t{}\tz={}\t{}{}",
                    time_label(dataset.rows[p.index].timestamp, p.index),
                    fmt_value(p.value),
                    fmt_value(p.z),
                    p.severity.label(),
                    if p.above_threshold { "\tabove threshold" } else { "" }
                );
            }
        }
    }
    Ok(())
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
