//! CLI binary for pdf-toolkit.
//!
//! A thin shim over the library crate that maps CLI flags to `ClientConfig`,
//! loads the input files and saves the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_toolkit::{
    build, process_with_progress, save_artifact, ClientConfig, FileHandle, FileSelection,
    Operation, ProgressCallback, SplitRange, SubmissionProgressCallback, DEFAULT_BASE_URL,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

fn human_bytes(n: usize) -> String {
    if n >= 1024 * 1024 {
        format!("{:.2} MB", n as f64 / 1024.0 / 1024.0)
    } else if n >= 1024 {
        format!("{:.1} KB", n as f64 / 1024.0)
    } else {
        format!("{n} B")
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that follows the submission lifecycle.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Instant,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Instant::now(),
        })
    }

    fn elapsed(&self) -> String {
        dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64()))
    }
}

impl SubmissionProgressCallback for CliProgressCallback {
    fn on_submit_start(&self, _id: u64, op: Operation, file_count: usize) {
        self.bar.set_prefix("Validating");
        self.bar.set_message(format!("{} with {file_count} file(s)", op.label()));
    }

    fn on_validation_failed(&self, _id: u64, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(message));
    }

    fn on_request_sent(&self, _id: u64, op: Operation, bytes: usize) {
        self.bar.set_prefix("Processing");
        self.bar.set_message(format!(
            "uploaded {} to {}, waiting for result…",
            human_bytes(bytes),
            op.endpoint()
        ));
    }

    fn on_succeeded(&self, _id: u64, filename: &str, bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} received  {}  {}",
            green("✔"),
            bold(filename),
            dim(&human_bytes(bytes)),
            self.elapsed()
        );
    }

    fn on_failed(&self, _id: u64, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}  {}", red("✘"), red(message), self.elapsed());
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Merge two or more PDFs (writes ./merged.pdf)
  pdf-toolkit merge a.pdf b.pdf c.pdf

  # Extract pages 3-5
  pdf-toolkit split report.pdf --start 3 --end 5 -o pages.pdf

  # Make a scanned PDF searchable
  pdf-toolkit ocr scan.pdf -o out/

  # Check inputs and show the request without sending it
  pdf-toolkit --dry-run merge a.pdf b.pdf

  # Talk to a remote service
  pdf-toolkit --base-url https://pdf.example.com ocr scan.pdf

ENDPOINTS:
  Operation  Path             Fields                 Result
  ─────────  ───────────────  ─────────────────────  ──────────────
  merge      /api/pdf/merge   files (≥2, repeated)   merged.pdf
  split      /api/pdf/split   file, start, end       split.pdf
  ocr        /api/pdf/ocr     file                   ocr_output.pdf

ENVIRONMENT VARIABLES:
  PDF_TOOLKIT_BASE_URL         Service base URL
  PDF_TOOLKIT_TIMEOUT          Request timeout in seconds
  PDF_TOOLKIT_CONNECT_TIMEOUT  Connect timeout in seconds
  PDF_TOOLKIT_OUTPUT           Output file or directory
  RUST_LOG                     Log filter (overrides -v / -q)
"#;

/// Merge, split and OCR PDFs using a PDF processing service.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-toolkit",
    version,
    about = "Merge, split and OCR PDFs using a PDF processing service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the processing service.
    #[arg(long, global = true, env = "PDF_TOOLKIT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Whole-request timeout in seconds.
    #[arg(long, global = true, env = "PDF_TOOLKIT_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Connect timeout in seconds.
    #[arg(long, global = true, env = "PDF_TOOLKIT_CONNECT_TIMEOUT", default_value_t = 10)]
    connect_timeout: u64,

    /// Output file, or a directory to place the suggested filename in.
    /// Default: the suggested filename in the current directory.
    #[arg(short, long, global = true, env = "PDF_TOOLKIT_OUTPUT")]
    output: Option<PathBuf>,

    /// Validate inputs and print the request fields without sending anything.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print a JSON summary instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, global = true, env = "PDF_TOOLKIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concatenate two or more PDFs.
    Merge {
        /// Input PDFs, in output order.
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
    /// Extract a page range from a PDF.
    Split {
        file: PathBuf,
        /// First page (1-based).
        #[arg(long, default_value_t = 1)]
        start: u32,
        /// Last page (inclusive).
        #[arg(long, default_value_t = 1)]
        end: u32,
    },
    /// Turn a scanned PDF into a searchable one.
    Ocr { file: PathBuf },
}

impl Command {
    fn operation(&self) -> Operation {
        match self {
            Command::Merge { .. } => Operation::Merge,
            Command::Split { .. } => Operation::Split,
            Command::Ocr { .. } => Operation::Ocr,
        }
    }

    fn paths(&self) -> Vec<&Path> {
        match self {
            Command::Merge { files } => files.iter().map(PathBuf::as_path).collect(),
            Command::Split { file, .. } | Command::Ocr { file } => vec![file.as_path()],
        }
    }

    fn range(&self) -> SplitRange {
        match self {
            Command::Split { start, end, .. } => SplitRange {
                start: *start,
                end: *end,
            },
            _ => SplitRange::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports each stage; keep library INFO logs out of
    // its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ClientConfig::builder()
        .base_url(&cli.base_url)
        .request_timeout_secs(cli.timeout)
        .connect_timeout_secs(cli.connect_timeout)
        .build()
        .context("Invalid configuration")?;

    let op = cli.command.operation();
    let range = cli.command.range();
    let files = load_files(&cli.command.paths()).await?;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        return dry_run(op, files, range, &config, cli.json);
    }

    // ── Submit ───────────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let artifact = process_with_progress(op, files, range, &config, progress)
        .await
        .with_context(|| format!("{} failed", op.label()))?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&artifact.filename));
    let written = save_artifact(&artifact, &output)
        .await
        .context("Failed to save result")?;

    if cli.json {
        let summary = serde_json::json!({
            "operation": op,
            "filename": artifact.filename,
            "bytes": artifact.len(),
            "path": written,
            "service": config.base_url,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  →  {}",
            cyan("◆"),
            dim(&human_bytes(artifact.len())),
            bold(&written.display().to_string())
        );
    }

    Ok(())
}

async fn load_files(paths: &[&Path]) -> Result<Vec<FileHandle>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let handle = FileHandle::from_path(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?;
        files.push(handle);
    }
    Ok(files)
}

/// Validate and describe the request without sending it.
fn dry_run(
    op: Operation,
    files: Vec<FileHandle>,
    range: SplitRange,
    config: &ClientConfig,
    json: bool,
) -> Result<()> {
    let selection = FileSelection::new(files);
    let payload = build(op, &selection, range).context("Validation failed")?;
    let url = config.endpoint_url(payload.endpoint);

    if json {
        let summary = serde_json::json!({
            "operation": op,
            "url": url,
            "fields": payload.describe(),
            "bytes": payload.content_bytes(),
            "output_filename": op.output_filename(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else {
        println!("Operation:  {}", op.label());
        println!("Request:    POST {url}");
        println!("Files:      {}", selection.summary());
        for line in payload.describe() {
            println!("  {line}");
        }
        println!("Result:     {}", op.output_filename());
    }
    Ok(())
}
