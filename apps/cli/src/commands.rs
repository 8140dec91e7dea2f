//! CLI definition, tracing setup, and the export command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;
use ghdataset_core::pipeline::{ExportOptions, ExportSummary, ProgressReporter, export_dataset};
use ghdataset_shared::{AppConfig, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Convert a JSONL file of GitHub discussions into a Markdown dataset.
#[derive(Parser)]
#[command(
    name = "discussions-to-md",
    version,
    about = "Convert a JSONL file of GitHub discussions into a Markdown dataset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// JSONL input file, one discussion record per line.
    #[arg(required_unless_present_any = ["init_config", "show_config"])]
    pub input: Option<PathBuf>,

    /// Dataset output directory (defaults to the configured output_dir).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Config file to use instead of ~/.ghdataset/ghdataset.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a default config file and exit.
    #[arg(long, conflicts_with = "show_config")]
    pub init_config: bool,

    /// Print the resolved configuration and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// the conversion messages.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose)));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Directives for the library crates and for this binary, whose targets start
/// with its own crate name rather than `ghdataset`.
fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("ghdataset={level},{}={level}", env!("CARGO_CRATE_NAME"))
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI.
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    if cli.init_config {
        let path = init_config()?;
        println!("Config initialized at: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    // Checked before the config loads so a broken config file cannot mask it.
    let missing = cli
        .input
        .as_deref()
        .filter(|input| !cli.show_config && !input.exists());
    if let Some(input) = missing {
        println!("Input file not found: {}", input.display());
        return Ok(ExitCode::FAILURE);
    }

    let config = resolve_config(cli.config.as_deref())?;

    if cli.show_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    // clap guarantees the input is present when neither config flag is set.
    let Some(input) = cli.input else {
        return Ok(ExitCode::FAILURE);
    };

    let options = ExportOptions {
        input,
        output_root: output_root(cli.out, &config),
    };

    info!(
        input = %options.input.display(),
        output = %options.output_root.display(),
        "converting discussions"
    );

    let reporter = CliProgress::new();
    export_dataset(&options, &reporter)?;

    println!("Conversion completed successfully");
    Ok(ExitCode::SUCCESS)
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

/// `--out` wins over the config file.
fn output_root(out: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from(&config.export.output_dir))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner on stderr; skipped-line reports go to stdout.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn record_written(&self, relative_path: &str, count: usize) {
        self.spinner
            .set_message(format!("Writing [{count}] {relative_path}"));
    }

    fn line_skipped(&self, line: usize, error: &str, text: &str) {
        self.spinner.suspend(|| {
            for report in skipped_line_report(line, error, text) {
                println!("{report}");
            }
        });
    }

    fn done(&self, summary: &ExportSummary) {
        self.spinner.finish_and_clear();
        info!(
            records = summary.records_written,
            skipped = summary.lines_skipped,
            categories = summary.categories,
            mapping = %summary.mapping_path.display(),
            "dataset written"
        );
    }
}

/// The two stdout lines printed for a line that is not valid JSON.
fn skipped_line_report(line: usize, error: &str, text: &str) -> [String; 2] {
    [
        format!("Error decoding JSON on line {line}: {error}"),
        format!("Problematic line: {text}"),
    ]
}
