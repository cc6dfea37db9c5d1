//! Error types for the plan2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`] — **Fatal**: the batch cannot run at all (manifest
//!   unreadable, configuration incomplete). Returned as `Err(BatchError)`
//!   from [`crate::batch::run_batch`].
//!
//! * [`PlanError`] — **Non-fatal**: a single plan failed (missing source,
//!   extraction error, empty text) but the rest of the manifest is still
//!   processed. Stored inside [`crate::output::PlanReport`] so callers can
//!   inspect every failure after the run.
//!
//! [`BackendError`] is narrower still: one extraction backend failing on one
//! file. For PDFs it triggers the next backend; only when every backend has
//! been tried does it surface as [`PlanError::ExtractionFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the plan2md library.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The manifest file could not be read.
    #[error("Failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or lacks the `plans` array.
    #[error("Manifest '{path}' is malformed: {source}\nExpected {{\"plans\": [ {{\"documentCode\": …, \"filename\": …}} ]}}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single plan.
///
/// The batch records it and moves on to the next manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanError {
    /// No backend able to read this format is available in this build/host.
    #[error("No {format} extraction backend available")]
    MissingBackend { format: String },

    /// The manifest names a file that is not in the raw directory.
    #[error("Source file not found: '{path}'")]
    MissingSource { path: PathBuf },

    /// The file extension is not one of `.pdf`, `.docx`, `.doc`.
    #[error("Unsupported file type: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Every applicable backend failed on this file.
    #[error("Extraction failed ({backend}): {detail}")]
    ExtractionFailed { backend: String, detail: String },

    /// Extraction succeeded but produced only whitespace.
    #[error("No content extracted from '{path}'")]
    EmptyContent { path: PathBuf },

    /// Creating the output directory or writing the markdown failed.
    #[error("Failed to write '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },
}

/// One backend failing on one file.
#[derive(Debug, Clone, Error)]
#[error("{backend}: {detail}")]
pub struct BackendError {
    pub backend: &'static str,
    pub detail: String,
}

impl BackendError {
    pub fn new(backend: &'static str, detail: impl Into<String>) -> Self {
        Self {
            backend,
            detail: detail.into(),
        }
    }
}

impl From<BackendError> for PlanError {
    fn from(e: BackendError) -> Self {
        PlanError::ExtractionFailed {
            backend: e.backend.to_string(),
            detail: e.detail,
        }
    }
}
