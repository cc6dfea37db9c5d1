//! Result types returned by a batch run.
//!
//! Everything here is `Serialize` so the CLI's `--json` mode can print a
//! run report verbatim.

use crate::error::PlanError;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// A new markdown file was written.
    Written { path: PathBuf, bytes: usize },
    /// The output file already existed; nothing was read or written.
    AlreadyPresent { path: PathBuf },
    /// The plan failed; the batch moved on.
    Failed { error: PlanError },
}

impl PlanOutcome {
    /// `Written` and `AlreadyPresent` both count as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, PlanOutcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&PlanError> {
        match self {
            PlanOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Per-plan entry of a [`BatchSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub document_code: String,
    /// Source path as named by the manifest, resolved against the raw dir.
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: PlanOutcome,
}

/// Totals for one batch run.
///
/// `succeeded + failed == total` always holds; `skipped` is the subset of
/// `succeeded` whose output was already present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
    pub output_dir: PathBuf,
    /// One entry per manifest record, in manifest order.
    pub reports: Vec<PlanReport>,
}

impl BatchSummary {
    /// Build totals from per-plan reports.
    pub fn from_reports(output_dir: PathBuf, reports: Vec<PlanReport>) -> Self {
        let succeeded = reports.iter().filter(|r| r.outcome.is_success()).count();
        let skipped = reports
            .iter()
            .filter(|r| matches!(r.outcome, PlanOutcome::AlreadyPresent { .. }))
            .count();
        Self {
            succeeded,
            skipped,
            failed: reports.len() - succeeded,
            total: reports.len(),
            output_dir,
            reports,
        }
    }

    /// Reports whose outcome is `Failed`.
    pub fn failures(&self) -> impl Iterator<Item = (&PlanReport, &PlanError)> {
        self.reports
            .iter()
            .filter_map(|r| r.outcome.error().map(|e| (r, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(code: &str, outcome: PlanOutcome) -> PlanReport {
        PlanReport {
            document_code: code.into(),
            source: PathBuf::from(format!("raw/{code}.pdf")),
            outcome,
        }
    }

    #[test]
    fn totals_add_up() {
        let summary = BatchSummary::from_reports(
            PathBuf::from("processed"),
            vec![
                report("A", PlanOutcome::Written { path: "processed/A.md".into(), bytes: 10 }),
                report("B", PlanOutcome::AlreadyPresent { path: "processed/B.md".into() }),
                report(
                    "C",
                    PlanOutcome::Failed {
                        error: PlanError::MissingSource { path: "raw/C.pdf".into() },
                    },
                ),
            ],
        );
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn report_serialises_flat() {
        let r = report(
            "X",
            PlanOutcome::Failed {
                error: PlanError::EmptyContent { path: "raw/X.pdf".into() },
            },
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["document_code"], "X");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["kind"], "empty_content");
    }
}
