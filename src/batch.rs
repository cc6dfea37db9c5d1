//! Batch entry points: manifest in, one markdown file per plan out.
//!
//! Plans are processed one after another in manifest order. A plan whose
//! output file already exists is skipped before its source is even
//! looked at, so re-running a batch only converts what is new.

use crate::config::BatchConfig;
use crate::error::{BatchError, PlanError};
use crate::manifest::{load_manifest, Manifest, PlanRecord};
use crate::output::{BatchSummary, PlanOutcome, PlanReport};
use crate::pipeline::assemble::assemble;
use crate::pipeline::extract::{Extractors, SourceFormat};
use crate::progress::{BatchProgressCallback, NoopProgressCallback};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load the manifest, probe backends and convert every plan.
///
/// # Errors
/// Returns `Err(BatchError)` only when the manifest cannot be read or
/// parsed. Per-plan failures are reported in the returned summary.
///
/// # Example
/// ```rust,no_run
/// use plan2md::{run_batch, BatchConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::builder().base_dir("data").build()?;
/// let summary = run_batch(&config).await?;
/// println!("{} of {} plans converted", summary.succeeded, summary.total);
/// # Ok(())
/// # }
/// ```
pub async fn run_batch(config: &BatchConfig) -> Result<BatchSummary, BatchError> {
    let manifest = load_manifest(&config.manifest_path).await?;
    let extractors = probe_extractors(config).await?;
    Ok(run_batch_with(config, &manifest, &extractors, &NoopProgressCallback).await)
}

/// Run a batch with an already-loaded manifest and backend set.
pub async fn run_batch_with(
    config: &BatchConfig,
    manifest: &Manifest,
    extractors: &Extractors,
    progress: &dyn BatchProgressCallback,
) -> BatchSummary {
    let total = manifest.len();
    info!("Processing {} plans into {}", total, config.processed_dir.display());
    progress.on_batch_start(total);

    let mut reports = Vec::with_capacity(total);
    for (i, plan) in manifest.plans.iter().enumerate() {
        progress.on_plan_start(i + 1, total, &plan.document_code);
        let report = process_plan(plan, extractors, config).await;

        match &report.outcome {
            PlanOutcome::Written { path, bytes } => {
                info!("{} → {} ({} bytes)", plan.document_code, path.display(), bytes)
            }
            PlanOutcome::AlreadyPresent { path } => {
                info!("{} already converted ({}), skipping", plan.document_code, path.display())
            }
            PlanOutcome::Failed { error } => warn!("{} failed: {}", plan.document_code, error),
        }

        progress.on_plan_complete(i + 1, total, &report);
        reports.push(report);
    }

    let summary = BatchSummary::from_reports(config.processed_dir.clone(), reports);
    info!(
        "Batch complete: {} succeeded ({} already present), {} failed, {} total",
        summary.succeeded, summary.skipped, summary.failed, summary.total
    );
    progress.on_batch_complete(&summary);
    summary
}

/// Synchronous wrapper around [`run_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_batch_sync(config: &BatchConfig) -> Result<BatchSummary, BatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BatchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run_batch(config))
}

/// Probe extraction backends off the async executor.
///
/// Binding PDFium may load a shared library or download one.
pub async fn probe_extractors(config: &BatchConfig) -> Result<Extractors, BatchError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || Extractors::probe(&config))
        .await
        .map_err(|e| BatchError::Internal(format!("Backend probe panicked: {}", e)))
}

/// Convert one plan. Never fails: errors land in the report.
pub async fn process_plan(plan: &PlanRecord, extractors: &Extractors, config: &BatchConfig) -> PlanReport {
    let source = config.source_path(&plan.filename);
    let outcome = match convert_plan(plan, &source, extractors, config).await {
        Ok(outcome) => outcome,
        Err(error) => PlanOutcome::Failed { error },
    };
    PlanReport {
        document_code: plan.document_code.clone(),
        source,
        outcome,
    }
}

async fn convert_plan(
    plan: &PlanRecord,
    source: &Path,
    extractors: &Extractors,
    config: &BatchConfig,
) -> Result<PlanOutcome, PlanError> {
    // ── Step 1: Skip existing output ─────────────────────────────────────
    let output = config.output_path(&plan.document_code);
    // An output path that cannot be checked cannot be written either.
    match tokio::fs::try_exists(&output).await {
        Ok(true) => return Ok(PlanOutcome::AlreadyPresent { path: output }),
        Ok(false) => {}
        Err(e) => {
            return Err(PlanError::OutputWriteFailed {
                path: output,
                detail: e.to_string(),
            })
        }
    }

    // ── Step 2: Resolve source ───────────────────────────────────────────
    let is_file = tokio::fs::metadata(source)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(PlanError::MissingSource {
            path: source.to_path_buf(),
        });
    }

    let format = SourceFormat::from_path(source)?;
    if !extractors.supports(format) {
        return Err(PlanError::MissingBackend {
            format: format.to_string(),
        });
    }

    // ── Step 3: Extract (blocking) ───────────────────────────────────────
    debug!("Extracting {} as {}", source.display(), format);
    let raw = {
        let extractors = extractors.clone();
        let path = source.to_path_buf();
        tokio::task::spawn_blocking(move || extractors.extract(&path, format))
            .await
            .map_err(|e| PlanError::ExtractionFailed {
                backend: format.to_string(),
                detail: format!("extraction task panicked: {}", e),
            })??
    };

    if raw.trim().is_empty() {
        return Err(PlanError::EmptyContent {
            path: source.to_path_buf(),
        });
    }

    // ── Step 4: Assemble & write ─────────────────────────────────────────
    let markdown = assemble(plan, &config.company, &raw);
    write_atomic(&output, &markdown).await?;

    Ok(PlanOutcome::Written {
        path: output,
        bytes: markdown.len(),
    })
}

/// Write via a sibling temp file and rename, so a crash never leaves a
/// partial `<code>.md` that the next run would mistake for finished work.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), PlanError> {
    let fail = |e: std::io::Error| PlanError::OutputWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(fail)?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(fail(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::tests::FakeExtractor;

    fn plan(code: &str, filename: &str) -> PlanRecord {
        PlanRecord {
            document_code: code.into(),
            filename: filename.into(),
            title: format!("{code} Plan"),
            division: "Dental".into(),
            role: "Rep".into(),
            effective_date: "2025-01-01".into(),
            plan_year: "2025".into(),
            version: "1".into(),
            status: "Active".into(),
        }
    }

    fn config(root: &Path) -> BatchConfig {
        BatchConfig::builder().base_dir(root).build().unwrap()
    }

    fn touch(config: &BatchConfig, filename: &str) {
        std::fs::create_dir_all(&config.raw_dir).unwrap();
        std::fs::write(config.source_path(filename), b"stub").unwrap();
    }

    #[tokio::test]
    async fn existing_output_wins_over_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        std::fs::create_dir_all(&config.processed_dir).unwrap();
        std::fs::write(config.output_path("A"), "done").unwrap();

        let report = process_plan(&plan("A", "gone.pdf"), &Extractors::new(), &config).await;
        assert!(matches!(report.outcome, PlanOutcome::AlreadyPresent { .. }));
    }

    #[tokio::test]
    async fn missing_source_checked_before_format() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let report = process_plan(&plan("A", "rates.xlsx"), &Extractors::new(), &config).await;
        assert!(matches!(
            report.outcome,
            PlanOutcome::Failed { error: PlanError::MissingSource { .. } }
        ));
    }

    #[tokio::test]
    async fn format_checked_before_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        touch(&config, "rates.xlsx");
        let report = process_plan(&plan("A", "rates.xlsx"), &Extractors::new(), &config).await;
        assert_eq!(
            report.outcome.error(),
            Some(&PlanError::UnsupportedFormat { extension: ".xlsx".into() })
        );
    }

    #[tokio::test]
    async fn missing_backend_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        touch(&config, "a.docx");
        let report = process_plan(&plan("A", "a.docx"), &Extractors::new(), &config).await;
        assert!(matches!(
            report.outcome,
            PlanOutcome::Failed { error: PlanError::MissingBackend { .. } }
        ));
    }

    #[tokio::test]
    async fn writes_assembled_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        touch(&config, "a.pdf");
        let extractors = Extractors::new().with_pdf_backend(FakeExtractor::ok("fake", "PURPOSE\nBody text."));

        let report = process_plan(&plan("A", "a.pdf"), &extractors, &config).await;
        let (path, bytes) = match &report.outcome {
            PlanOutcome::Written { path, bytes } => (path.clone(), *bytes),
            other => panic!("expected Written, got {other:?}"),
        };
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.len(), bytes);
        assert!(written.starts_with("# A Plan\n\n**Plan Code:** A\n"));
        assert!(written.ends_with("## Purpose\n\nBody text."));
        assert!(!path.with_extension("md.tmp").exists());
    }

    #[tokio::test]
    async fn unreadable_output_dir_fails_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be.
        std::fs::write(dir.path().join("processed"), b"").unwrap();
        let config = config(dir.path());
        touch(&config, "a.pdf");
        let fake = FakeExtractor::ok("fake", "text");
        let extractors = Extractors::new().with_pdf_backend(fake.clone());

        let report = process_plan(&plan("A", "a.pdf"), &extractors, &config).await;
        match &report.outcome {
            PlanOutcome::Failed { error: PlanError::OutputWriteFailed { path, .. } } => {
                assert_eq!(path, &config.output_path("A"));
            }
            other => panic!("expected OutputWriteFailed, got {other:?}"),
        }
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn sync_wrapper_surfaces_manifest_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_batch_sync(&config(dir.path())).unwrap_err();
        assert!(matches!(err, BatchError::ManifestRead { .. }));
    }
}
