//! Text extraction: source document → plain text.
//!
//! Every backend implements [`TextExtractor`]. [`Extractors`] holds the
//! backends available in this build and on this host, probed once per
//! batch:
//!
//! | Format | Rank | Backend | Crate feature |
//! |--------|------|---------|---------------|
//! | PDF    | 1    | [`pdfium`]   (`pdfium-render`) | `pdfium` |
//! | PDF    | 2    | [`pdf_text`] (`pdf-extract`)   | `pdf-text` |
//! | DOCX   | —    | [`docx`]     (`docx-rs`)       | `docx` |
//!
//! PDFs walk the ranked list until one backend returns non-blank text.
//! DOCX has a single backend and no fallback.

use crate::config::BatchConfig;
use crate::error::{BackendError, PlanError};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "docx")]
pub mod docx;
#[cfg(feature = "pdf-text")]
pub mod pdf_text;
#[cfg(feature = "pdfium")]
pub mod pdfium;

/// A backend that turns one file into plain text.
///
/// `Send + Sync` because extraction runs on Tokio's blocking pool.
pub trait TextExtractor: Send + Sync {
    /// Short backend name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Extract best-effort plain text. An empty string is a valid result.
    fn extract(&self, path: &Path) -> Result<String, BackendError>;
}

/// Document formats with an extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Pdf,
    /// `.docx`, and `.doc` handed to the same reader.
    Docx,
}

impl SourceFormat {
    /// Map a file extension (case-insensitive) to a format.
    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "docx" | "doc" => Ok(SourceFormat::Docx),
            _ => Err(PlanError::UnsupportedFormat {
                extension: if ext.is_empty() { String::new() } else { format!(".{ext}") },
            }),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Docx => "DOCX",
        })
    }
}

/// Probe result for one known backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub name: &'static str,
    pub format: SourceFormat,
    pub available: bool,
    /// Why the backend is unavailable, or where it was loaded from.
    pub detail: Option<String>,
}

/// The extraction backends usable for this batch, in rank order.
#[derive(Clone, Default)]
pub struct Extractors {
    pdf: Vec<Arc<dyn TextExtractor>>,
    docx: Option<Arc<dyn TextExtractor>>,
    statuses: Vec<BackendStatus>,
}

impl fmt::Debug for Extractors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractors")
            .field("pdf", &self.pdf.iter().map(|e| e.name()).collect::<Vec<_>>())
            .field("docx", &self.docx.as_ref().map(|e| e.name()))
            .finish()
    }
}

impl Extractors {
    /// An empty set: every extraction fails with `MissingBackend`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect which backends this build and host can use.
    #[cfg_attr(not(feature = "pdfium"), allow(unused_variables))]
    pub fn probe(config: &BatchConfig) -> Self {
        let mut found = Self::new();

        #[cfg(feature = "pdfium")]
        match pdfium::PdfiumExtractor::probe(config) {
            Ok(backend) => {
                let origin = backend.origin().to_string();
                found = found.with_pdf_backend(Arc::new(backend));
                found.annotate_last(origin);
            }
            Err(reason) => found.mark_unavailable(pdfium::NAME, SourceFormat::Pdf, reason),
        }
        #[cfg(not(feature = "pdfium"))]
        found.mark_unavailable("pdfium", SourceFormat::Pdf, "not compiled in (feature `pdfium`)");

        #[cfg(feature = "pdf-text")]
        {
            found = found.with_pdf_backend(Arc::new(pdf_text::PdfTextExtractor));
        }
        #[cfg(not(feature = "pdf-text"))]
        found.mark_unavailable("pdf-extract", SourceFormat::Pdf, "not compiled in (feature `pdf-text`)");

        #[cfg(feature = "docx")]
        {
            found = found.with_docx_backend(Arc::new(docx::DocxExtractor));
        }
        #[cfg(not(feature = "docx"))]
        found.mark_unavailable("docx-rs", SourceFormat::Docx, "not compiled in (feature `docx`)");

        debug!("Extraction backends: {:?}", found);
        found
    }

    /// Append a PDF backend after those already registered.
    pub fn with_pdf_backend(mut self, backend: Arc<dyn TextExtractor>) -> Self {
        self.statuses.push(BackendStatus {
            name: backend.name(),
            format: SourceFormat::Pdf,
            available: true,
            detail: None,
        });
        self.pdf.push(backend);
        self
    }

    /// Set the DOCX backend, replacing any previous one.
    pub fn with_docx_backend(mut self, backend: Arc<dyn TextExtractor>) -> Self {
        self.statuses.retain(|s| !(s.format == SourceFormat::Docx && s.available));
        self.statuses.push(BackendStatus {
            name: backend.name(),
            format: SourceFormat::Docx,
            available: true,
            detail: None,
        });
        self.docx = Some(backend);
        self
    }

    fn mark_unavailable(&mut self, name: &'static str, format: SourceFormat, reason: impl Into<String>) {
        self.statuses.push(BackendStatus {
            name,
            format,
            available: false,
            detail: Some(reason.into()),
        });
    }

    #[cfg_attr(not(feature = "pdfium"), allow(dead_code))]
    fn annotate_last(&mut self, detail: String) {
        if let Some(status) = self.statuses.last_mut() {
            status.detail = Some(detail);
        }
    }

    /// Availability of every known backend, in probe order.
    pub fn statuses(&self) -> &[BackendStatus] {
        &self.statuses
    }

    /// Whether at least one backend can read `format`.
    pub fn supports(&self, format: SourceFormat) -> bool {
        match format {
            SourceFormat::Pdf => !self.pdf.is_empty(),
            SourceFormat::Docx => self.docx.is_some(),
        }
    }

    /// Extract `path` as `format`. Blocking; call from a blocking context.
    pub fn extract(&self, path: &Path, format: SourceFormat) -> Result<String, PlanError> {
        match format {
            SourceFormat::Pdf => self.extract_pdf(path),
            SourceFormat::Docx => {
                let backend = self.docx.as_ref().ok_or(PlanError::MissingBackend {
                    format: format.to_string(),
                })?;
                backend.extract(path).map_err(PlanError::from)
            }
        }
    }

    /// Try each PDF backend in rank order.
    ///
    /// An error or a blank result moves on to the next backend. Blank text
    /// from some backend beats errors from all the others: the caller then
    /// reports the file as empty rather than unreadable.
    fn extract_pdf(&self, path: &Path) -> Result<String, PlanError> {
        let mut blank: Option<String> = None;
        let mut last_error: Option<BackendError> = None;

        for backend in &self.pdf {
            match backend.extract(path) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("{} extracted {} bytes from {}", backend.name(), text.len(), path.display());
                    return Ok(text);
                }
                Ok(text) => {
                    warn!("{} found no text in {}", backend.name(), path.display());
                    blank.get_or_insert(text);
                }
                Err(e) => {
                    warn!("PDF backend failed on {}: {}", path.display(), e);
                    last_error = Some(e);
                }
            }
        }

        match (blank, last_error) {
            (Some(text), _) => Ok(text),
            (None, Some(e)) => Err(e.into()),
            (None, None) => Err(PlanError::MissingBackend {
                format: SourceFormat::Pdf.to_string(),
            }),
        }
    }
}
