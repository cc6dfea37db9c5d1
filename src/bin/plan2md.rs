//! CLI binary for plan2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `BatchConfig`, runs the batch and prints the summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use plan2md::{
    load_manifest, probe_extractors, run_batch_with, BackendStatus, BatchConfig, BatchProgressCallback,
    BatchSummary, Extractors, NoopProgressCallback, PlanOutcome, PlanReport, SourceFormat,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar with one ✓/↷/✗ line per plan printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} plans  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.reset_eta();
    }

    fn on_plan_start(&self, _index: usize, _total: usize, document_code: &str) {
        self.bar.set_message(document_code.to_string());
    }

    fn on_plan_complete(&self, index: usize, total: usize, report: &PlanReport) {
        let line = match &report.outcome {
            PlanOutcome::Written { bytes, .. } => format!(
                "  {} {:>3}/{:<3}  {:<24}  {}",
                green("✓"),
                index,
                total,
                report.document_code,
                dim(&format!("{bytes} bytes")),
            ),
            PlanOutcome::AlreadyPresent { .. } => format!(
                "  {} {:>3}/{:<3}  {:<24}  {}",
                dim("↷"),
                index,
                total,
                report.document_code,
                dim("already converted"),
            ),
            PlanOutcome::Failed { error } => format!(
                "  {} {:>3}/{:<3}  {:<24}  {}",
                red("✗"),
                index,
                total,
                report.document_code,
                red(&truncate(&error.to_string(), 80)),
            ),
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _summary: &BatchSummary) {
        self.bar.finish_and_clear();
    }
}

/// Shorten long error messages to keep output tidy.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert everything listed in ./plans-manifest.json (raw/ → processed/)
  plan2md

  # Point at another data root
  plan2md --base-dir /srv/comp-plans

  # Explicit locations and company name
  plan2md --manifest plans.json --raw-dir in/ --out-dir out/ --company "Acme Dental"

  # Check which extraction backends are usable, then exit
  plan2md --check

  # Download PDFium on first run
  plan2md --fetch-pdfium

  # Machine-readable run report
  plan2md --json > report.json

LAYOUT (relative to --base-dir):
  plans-manifest.json   {"plans": [{"documentCode", "filename", "title", ...}]}
  raw/                  source .pdf / .docx / .doc files
  processed/            <documentCode>.md, existing files are never overwritten

EXTRACTION BACKENDS:
  PDF   pdfium        needs libpdfium (PDFIUM_LIB_PATH, --pdfium-lib or --fetch-pdfium)
  PDF   pdf-extract   pure Rust fallback, used when pdfium is missing or fails
  DOCX  docx-rs       .docx and .doc

ENVIRONMENT VARIABLES:
  PLAN2MD_BASE_DIR          Default for --base-dir
  PLAN2MD_COMPANY           Default for --company
  PDFIUM_LIB_PATH           Path to an existing libpdfium
  PDFIUM_LOCATE_CACHE_DIR   Override the PDFium cache directory
  RUST_LOG                  Log filter (overrides -v / -q)
"#;

/// Convert compensation plan documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "plan2md",
    version,
    about = "Convert compensation plan PDF/DOCX files listed in a manifest to Markdown",
    long_about = "Read a JSON manifest of compensation plans, extract the text of each source \
document (PDF or Word), clean it up, promote section headings, prepend a metadata header and \
write one <documentCode>.md per plan. Plans whose output already exists are skipped.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Data root holding plans-manifest.json, raw/ and processed/.
    #[arg(long, env = "PLAN2MD_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Directory of source documents [default: <base-dir>/raw].
    #[arg(long, env = "PLAN2MD_RAW_DIR")]
    raw_dir: Option<PathBuf>,

    /// Output directory [default: <base-dir>/processed].
    #[arg(short, long, env = "PLAN2MD_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Manifest file [default: <base-dir>/plans-manifest.json].
    #[arg(short, long, env = "PLAN2MD_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Company name printed in every header.
    #[arg(long, env = "PLAN2MD_COMPANY")]
    company: Option<String>,

    /// Path to the PDFium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Download PDFium into the cache when it is not found.
    #[arg(long, env = "PLAN2MD_FETCH_PDFIUM")]
    fetch_pdfium: bool,

    /// Print the dependency check and exit.
    #[arg(long)]
    check: bool,

    /// Print the run summary as JSON instead of text.
    #[arg(long, env = "PLAN2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PLAN2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PLAN2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary.
    #[arg(short, long, env = "PLAN2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level per-plan logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.check;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let text = !cli.json;

    if text && !cli.quiet {
        println!("{}", bold("Compensation Plan Document Processor"));
        println!("{}", "=".repeat(50));
    }

    // ── Ensure PDFium engine is available ────────────────────────────────
    #[cfg(feature = "pdfium")]
    if cli.fetch_pdfium && pdfium_locate::locate(config.pdfium_library.as_deref()).is_none() {
        fetch_pdfium(cli.quiet)?;
    }
    if let Some(notice) = unused_fetch_notice(cli.fetch_pdfium) {
        eprintln!("{} {}", yellow("⚠"), notice);
    }

    let extractors = probe_extractors(&config).await.context("Failed to probe extraction backends")?;

    if (text && !cli.quiet) || cli.check {
        print_dependency_check(&extractors);
    }
    if cli.check {
        return Ok(());
    }

    // ── Load manifest ────────────────────────────────────────────────────
    let manifest = load_manifest(&config.manifest_path)
        .await
        .context("Cannot run batch")?;

    if text && !cli.quiet {
        println!("Manifest: {}", config.manifest_path.display());
        println!("Found {} plans to process\n", manifest.len());
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let summary = if show_progress {
        let cb = CliProgressCallback::new();
        run_batch_with(&config, &manifest, &extractors, &cb).await
    } else {
        run_batch_with(&config, &manifest, &extractors, &NoopProgressCallback).await
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else {
        print_summary(&summary, cli.quiet);
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .base_dir(&cli.base_dir)
        .fetch_pdfium(cli.fetch_pdfium);

    if let Some(ref dir) = cli.raw_dir {
        builder = builder.raw_dir(dir);
    }
    if let Some(ref dir) = cli.out_dir {
        builder = builder.processed_dir(dir);
    }
    if let Some(ref path) = cli.manifest {
        builder = builder.manifest_path(path);
    }
    if let Some(ref company) = cli.company {
        builder = builder.company(company);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }

    builder.build().context("Invalid configuration")
}

/// Warning for `--fetch-pdfium` on a build that cannot use the download.
fn unused_fetch_notice(requested: bool) -> Option<&'static str> {
    (requested && !cfg!(feature = "pdfium"))
        .then_some("--fetch-pdfium ignored: this build has no PDFium backend (feature `pdfium`)")
}

/// Download PDFium with a byte-progress bar.
#[cfg(feature = "pdfium")]
fn fetch_pdfium(quiet: bool) -> Result<()> {
    if quiet {
        tokio::task::block_in_place(|| pdfium_locate::fetch(None)).context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_locate::fetch(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

fn print_dependency_check(extractors: &Extractors) {
    println!("Checking dependencies...");
    for status in extractors.statuses() {
        print_backend(status);
    }

    if !extractors.supports(SourceFormat::Pdf) {
        println!(
            "  {} No PDF backend: set PDFIUM_LIB_PATH, pass --fetch-pdfium, or build with --features pdf-text",
            yellow("⚠"),
        );
    }
    if !extractors.supports(SourceFormat::Docx) {
        println!("  {} No DOCX backend: build with --features docx", yellow("⚠"));
    }
    println!();
}

fn print_backend(status: &BackendStatus) {
    let mark = if status.available { green("✓") } else { red("✗") };
    let label = format!("{} ({})", status.name, status.format);
    match status.detail {
        Some(ref detail) => println!("  {mark} {label:<22} {}", dim(detail)),
        None => println!("  {mark} {label}"),
    }
}

fn print_summary(summary: &BatchSummary, quiet: bool) {
    if !quiet {
        for (report, error) in summary.failures() {
            println!("  {} {}: {}", red("✗"), report.document_code, error);
        }
    }

    println!("\n{}", "=".repeat(50));
    println!(
        "{} Successfully processed: {}",
        if summary.failed == 0 { green("✔") } else { cyan("⚠") },
        bold(&summary.succeeded.to_string())
    );
    if summary.skipped > 0 {
        println!("  {}", dim(&format!("({} already converted)", summary.skipped)));
    }
    println!("  Failed: {}", summary.failed);
    println!("  Total plans: {}", summary.total);
    println!("\nOutput directory: {}", summary.output_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_flag_warns_only_without_pdfium() {
        assert_eq!(unused_fetch_notice(false), None);
        assert_eq!(unused_fetch_notice(true).is_some(), !cfg!(feature = "pdfium"));
    }
}
