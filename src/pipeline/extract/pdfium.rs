//! Primary PDF backend: PDFium via `pdfium-render`.
//!
//! The library is bound once per probe and shared by every extraction in
//! the batch (`thread_safe` and `sync` features), so rebinding never
//! happens mid-run.

use super::TextExtractor;
use crate::config::BatchConfig;
use crate::error::BackendError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

pub const NAME: &str = "pdfium";

pub struct PdfiumExtractor {
    pdfium: Pdfium,
    origin: String,
}

impl PdfiumExtractor {
    /// Bind PDFium, searching in this order:
    ///
    /// 1. `config.pdfium_library`, `PDFIUM_LIB_PATH`, the locator cache
    /// 2. a fresh download, when `config.fetch_pdfium` is set
    /// 3. the system loader path
    ///
    /// The error string explains how to make the backend available.
    pub fn probe(config: &BatchConfig) -> Result<Self, String> {
        if let Some(found) = pdfium_locate::locate(config.pdfium_library.as_deref()) {
            let pdfium = pdfium_locate::bind(&found.path).map_err(|e| e.to_string())?;
            debug!("Bound PDFium from {} ({})", found.path.display(), found.source);
            return Ok(Self {
                pdfium,
                origin: format!("{} ({})", found.path.display(), found.source),
            });
        }

        if config.fetch_pdfium {
            info!("PDFium not found locally, downloading build {}", pdfium_locate::PDFIUM_VERSION);
            let path = pdfium_locate::fetch(None).map_err(|e| e.to_string())?;
            let pdfium = pdfium_locate::bind(&path).map_err(|e| e.to_string())?;
            return Ok(Self {
                pdfium,
                origin: format!("{} (downloaded)", path.display()),
            });
        }

        match pdfium_locate::bind_system() {
            Ok(pdfium) => Ok(Self {
                pdfium,
                origin: "system library".to_string(),
            }),
            Err(_) => Err(format!(
                "PDFium library not found; set {} or use --fetch-pdfium",
                pdfium_locate::LIB_PATH_VAR
            )),
        }
    }

    /// Where the bound library came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl TextExtractor for PdfiumExtractor {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Text of every non-empty page, each followed by a blank line.
    fn extract(&self, path: &Path) -> Result<String, BackendError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| BackendError::new(NAME, format!("{:?}", e)))?;

        let mut text = String::new();
        for (index, page) in document.pages().iter().enumerate() {
            let page_text = page
                .text()
                .map_err(|e| BackendError::new(NAME, format!("page {}: {:?}", index + 1, e)))?
                .all();
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push_str("\n\n");
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn extractor_can_be_shared_across_threads() {
        assert_send_sync::<PdfiumExtractor>();
    }
}
