//! TrainInsight CLI: generate training data, compute dashboard figures,
//! segment employees by performance and suggest courses.

mod commands;
mod dataset;
mod render;

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use traininsight_core::TrainingStatus;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// TrainInsight: HR training analytics and performance segmentation
#[derive(Parser, Debug)]
#[command(name = "traininsight", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (holds `.traininsight/config.toml`)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate synthetic training records
    Generate {
        /// Output file (.csv or .json)
        #[arg(short, long, default_value = "training_records.csv")]
        output: PathBuf,
        /// Number of employees
        #[arg(short, long)]
        employees: Option<usize>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Reference date for completion dates (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Cluster employees into ranked performance groups
    Segment {
        /// Input records (.csv or .json)
        input: PathBuf,
        /// Number of clusters
        #[arg(short = 'k', long)]
        clusters: Option<usize>,
        /// Comma-separated labels, best cluster first
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
        /// Seed for centroid initialization
        #[arg(long)]
        seed: Option<u64>,
        /// Iteration cap per partitioning run
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Members listed per cluster
        #[arg(long, default_value = "10")]
        show: usize,
        /// Write assignments (.csv) or the full report (.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show KPIs, department statistics, trends and top/bottom performers
    Summary {
        /// Input records (.csv or .json)
        input: PathBuf,
        /// Entries shown in top-N lists
        #[arg(long, default_value = "10")]
        top: usize,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Suggest catalog courses an employee has not taken yet
    Recommend {
        /// Input records (.csv or .json)
        input: PathBuf,
        /// Employee id to recommend for
        #[arg(short, long)]
        employee: String,
        /// Employee section, for section-targeted courses
        #[arg(long)]
        section: Option<String>,
        /// Number of suggestions (defaults to the configured top_n)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Append a manually entered training record to a file
    Add {
        /// Records file to append to (.csv or .json); created if missing
        file: PathBuf,
        #[arg(long)]
        employee_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        course: String,
        /// Completion date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        score: f64,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default configuration file in the workspace
    Init,
    /// Show the current merged configuration
    Show,
}

/// Record filters shared by analysis commands.
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Only records from this department
    #[arg(long)]
    department: Option<String>,
    /// Earliest completion date (inclusive)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Latest completion date (inclusive)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Only these statuses: completed, in-progress
    #[arg(long, value_enum)]
    status: Vec<StatusArg>,
    /// Case-insensitive match on employee name, id or course
    #[arg(long)]
    search: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StatusArg {
    Completed,
    InProgress,
}

impl From<StatusArg> for TrainingStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Completed => TrainingStatus::Completed,
            StatusArg::InProgress => TrainingStatus::InProgress,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Human-readable stderr plus JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = traininsight_core::config::project_dirs()
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "traininsight.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let output = commands::Output {
        json: cli.json,
        quiet: cli.quiet,
    };
    commands::handle_command(cli.command, &workspace, output).await
}
