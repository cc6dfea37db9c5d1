//! Configuration for a batch run.
//!
//! Every path the batch touches lives in [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Nothing is read from process-wide constants, so
//! tests can point a run at a temporary directory and two runs with
//! different roots can coexist in one process.

use crate::error::BatchError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Company name printed in every document header unless overridden.
pub const DEFAULT_COMPANY: &str = "Henry Schein";

/// Sub-directory of the base directory holding source documents.
pub const RAW_SUBDIR: &str = "raw";
/// Sub-directory of the base directory receiving markdown output.
pub const PROCESSED_SUBDIR: &str = "processed";
/// Manifest file name inside the base directory.
pub const MANIFEST_FILE: &str = "plans-manifest.json";

/// Configuration for one batch run.
///
/// # Example
/// ```rust
/// use plan2md::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .base_dir("/srv/comp-plans")
///     .company("Acme Dental")
///     .build()
///     .unwrap();
/// assert!(config.manifest_path.ends_with("plans-manifest.json"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory holding the source documents named by `filename`.
    pub raw_dir: PathBuf,

    /// Directory receiving `<documentCode>.md`. Created on first write.
    pub processed_dir: PathBuf,

    /// JSON manifest listing the plans.
    pub manifest_path: PathBuf,

    /// Value of the `**Company:**` header line. Default: [`DEFAULT_COMPANY`].
    pub company: String,

    /// Explicit PDFium shared library. When `None` the locator searches
    /// `PDFIUM_LIB_PATH` and its cache.
    pub pdfium_library: Option<PathBuf>,

    /// Download PDFium into the locator cache when no library is found.
    /// Default: false, in which case the pdfium backend is simply
    /// unavailable and PDFs go to the next backend.
    pub fetch_pdfium: bool,
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }

    /// Output path for a document code.
    pub fn output_path(&self, document_code: &str) -> PathBuf {
        self.processed_dir.join(format!("{document_code}.md"))
    }

    /// Source path for a manifest `filename`.
    pub fn source_path(&self, filename: &str) -> PathBuf {
        self.raw_dir.join(filename)
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug, Default)]
pub struct BatchConfigBuilder {
    base_dir: Option<PathBuf>,
    raw_dir: Option<PathBuf>,
    processed_dir: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    company: Option<String>,
    pdfium_library: Option<PathBuf>,
    fetch_pdfium: bool,
}

impl BatchConfigBuilder {
    /// Derive `raw/`, `processed/` and `plans-manifest.json` from one root.
    /// Explicit setters take precedence regardless of call order.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn raw_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = Some(dir.into());
        self
    }

    pub fn processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.processed_dir = Some(dir.into());
        self
    }

    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    pub fn company(mut self, name: impl Into<String>) -> Self {
        self.company = Some(name.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdfium_library = Some(path.into());
        self
    }

    pub fn fetch_pdfium(mut self, v: bool) -> Self {
        self.fetch_pdfium = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, BatchError> {
        let base = self.base_dir.as_deref();
        let derive = |explicit: Option<PathBuf>, name: &str| -> Result<PathBuf, BatchError> {
            explicit
                .or_else(|| base.map(|b: &Path| b.join(name)))
                .ok_or_else(|| {
                    BatchError::InvalidConfig(format!(
                        "{name} path is not set (pass a base directory or set it explicitly)"
                    ))
                })
        };

        let raw_dir = derive(self.raw_dir, RAW_SUBDIR)?;
        let processed_dir = derive(self.processed_dir, PROCESSED_SUBDIR)?;
        let manifest_path = derive(self.manifest_path, MANIFEST_FILE)?;

        let company = self.company.unwrap_or_else(|| DEFAULT_COMPANY.to_string());
        if company.trim().is_empty() {
            return Err(BatchError::InvalidConfig(
                "company name must not be blank".into(),
            ));
        }

        Ok(BatchConfig {
            raw_dir,
            processed_dir,
            manifest_path,
            company,
            pdfium_library: self.pdfium_library,
            fetch_pdfium: self.fetch_pdfium,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_derives_layout() {
        let c = BatchConfig::builder().base_dir("/plans").build().unwrap();
        assert_eq!(c.raw_dir, PathBuf::from("/plans/raw"));
        assert_eq!(c.processed_dir, PathBuf::from("/plans/processed"));
        assert_eq!(c.manifest_path, PathBuf::from("/plans/plans-manifest.json"));
        assert_eq!(c.company, DEFAULT_COMPANY);
        assert!(!c.fetch_pdfium);
    }

    #[test]
    fn explicit_paths_override_base() {
        let c = BatchConfig::builder()
            .processed_dir("/out")
            .base_dir("/plans")
            .build()
            .unwrap();
        assert_eq!(c.processed_dir, PathBuf::from("/out"));
        assert_eq!(c.raw_dir, PathBuf::from("/plans/raw"));
    }

    #[test]
    fn missing_paths_rejected() {
        let err = BatchConfig::builder()
            .raw_dir("/in")
            .processed_dir("/out")
            .build()
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidConfig(ref m) if m.contains("plans-manifest.json")));
    }

    #[test]
    fn blank_company_rejected() {
        let err = BatchConfig::builder().base_dir("/p").company("  ").build();
        assert!(err.is_err());
    }

    #[test]
    fn output_path_uses_document_code() {
        let c = BatchConfig::builder().base_dir("/p").build().unwrap();
        assert_eq!(c.output_path("HS-ISR-2025"), PathBuf::from("/p/processed/HS-ISR-2025.md"));
        assert_eq!(c.source_path("ISR Plan.pdf"), PathBuf::from("/p/raw/ISR Plan.pdf"));
    }
}
