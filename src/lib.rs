//! # plan2md
//!
//! Batch-convert compensation plan documents (PDF, DOCX) into Markdown
//! files with a fixed metadata header.
//!
//! A JSON manifest lists the plans. For each one the source document is
//! read from the raw directory, its text is cleaned and sectioned, and the
//! result is written to `<documentCode>.md` in the processed directory.
//! Existing output files are never overwritten, so re-running a batch only
//! converts new plans.
//!
//! ## Pipeline Overview
//!
//! ```text
//! plans-manifest.json
//!  │
//!  ├─ 1. Skip     output already present → done
//!  ├─ 2. Extract  pdfium → pdf-extract fallback, or docx-rs (spawn_blocking)
//!  ├─ 3. Clean    drop page numbers, fold ligatures/dashes/quotes
//!  ├─ 4. Section  numbered / lettered / ALL-CAPS lines → ## / ###
//!  ├─ 5. Header   title + plan metadata + company
//!  └─ 6. Output   atomic write of <documentCode>.md
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plan2md::{run_batch, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .base_dir("data")          // data/raw, data/processed, data/plans-manifest.json
//!         .company("Henry Schein")
//!         .build()?;
//!     let summary = run_batch(&config).await?;
//!     eprintln!("{}/{} converted, {} failed", summary.succeeded, summary.total, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cli`      | on      | The `plan2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `pdfium`   | on      | Primary PDF backend; needs a PDFium shared library at runtime |
//! | `pdf-text` | on      | Pure-Rust PDF fallback (`pdf-extract`) |
//! | `docx`     | on      | Word backend (`docx-rs`) |
//!
//! A format whose backends are all disabled or unavailable fails per plan
//! with [`PlanError::MissingBackend`]; the rest of the batch still runs.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{probe_extractors, process_plan, run_batch, run_batch_sync, run_batch_with};
pub use config::{BatchConfig, BatchConfigBuilder, DEFAULT_COMPANY};
pub use error::{BackendError, BatchError, PlanError};
pub use manifest::{load_manifest, Manifest, PlanRecord};
pub use output::{BatchSummary, PlanOutcome, PlanReport};
pub use pipeline::extract::{BackendStatus, Extractors, SourceFormat, TextExtractor};
pub use progress::{BatchProgressCallback, NoopProgressCallback};
